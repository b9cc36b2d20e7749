use crate::types::clause::ConditionClause;

/// One selectable option in a lookup table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListEntry {
    pub value: String,
    pub label: Option<String>,
    /// When present, the entry is offered only while this clause holds and
    /// is excluded from the default option list.
    pub clause: Option<ConditionClause>,
    pub row: u32,
}

impl ListEntry {
    #[must_use]
    pub fn new(value: impl Into<String>, label: Option<String>, row: u32) -> Self {
        Self {
            value: value.into(),
            label,
            clause: None,
            row,
        }
    }

    #[must_use]
    pub fn conditional(mut self, clause: ConditionClause) -> Self {
        self.clause = Some(clause);
        self
    }

    #[must_use]
    pub fn is_conditional(&self) -> bool {
        self.clause.is_some()
    }
}

/// A named, insertion-ordered option list shared by multiple-choice
/// questions.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LookupTable {
    pub id: String,
    pub entries: Vec<ListEntry>,
}

impl LookupTable {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: ListEntry) {
        self.entries.push(entry);
    }

    /// Entries offered unconditionally, in insertion order.
    #[must_use]
    pub fn default_entries(&self) -> Vec<&ListEntry> {
        self.entries.iter().filter(|e| !e.is_conditional()).collect()
    }

    /// Entries guarded by a clause, in insertion order.
    #[must_use]
    pub fn conditional_entries(&self) -> Vec<&ListEntry> {
        self.entries.iter().filter(|e| e.is_conditional()).collect()
    }
}
