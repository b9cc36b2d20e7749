use std::fmt;

use crate::types::clause::ConditionClause;

/// What an element condition controls when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionKind {
    /// The element is shown / created while the condition holds.
    Inclusion,
    /// The owning question's answer is flagged invalid while it holds.
    Validation,
}

/// An ordered conjunction of clauses attached to one element.
///
/// The kind is fixed at creation. Page-governing conditions additionally
/// carry the page linkage used by branch records.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementCondition {
    pub id: String,
    pub kind: ConditionKind,
    /// Source row of the clause that opened this condition.
    pub row: u32,
    pub page_id: Option<String>,
    pub branch: bool,
    pub display_after: Option<String>,
    clauses: Vec<ConditionClause>,
}

impl ElementCondition {
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ConditionKind, row: u32) -> Self {
        Self {
            id: id.into(),
            kind,
            row,
            page_id: None,
            branch: false,
            display_after: None,
            clauses: Vec::new(),
        }
    }

    /// A condition governing a page's visibility.
    #[must_use]
    pub fn for_page(
        id: impl Into<String>,
        row: u32,
        page_id: impl Into<String>,
        branch: bool,
        display_after: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ConditionKind::Inclusion,
            row,
            page_id: Some(page_id.into()),
            branch,
            display_after,
            clauses: Vec::new(),
        }
    }

    pub fn push_clause(&mut self, clause: ConditionClause) {
        self.clauses.push(clause);
    }

    #[must_use]
    pub fn clauses(&self) -> &[ConditionClause] {
        &self.clauses
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Mark every clause as consumed. Returns `false` if any clause was
    /// already consumed by another condition.
    pub fn mark_processed(&mut self) -> bool {
        let mut fresh = true;
        for clause in &mut self.clauses {
            fresh &= clause.mark_processed();
        }
        fresh
    }
}

impl fmt::Display for ElementCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.id)?;
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " && ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::clause::ClauseOp;

    fn clause(subject: &str) -> ConditionClause {
        ConditionClause::new(subject, "answer", ClauseOp::Eq, Some("yes"))
    }

    #[test]
    fn clauses_keep_order() {
        let mut cond = ElementCondition::new("c1", ConditionKind::Inclusion, 3);
        cond.push_clause(clause("a"));
        cond.push_clause(clause("b"));
        assert_eq!(cond.clauses()[0].subject, "a");
        assert_eq!(cond.clauses()[1].subject, "b");
    }

    #[test]
    fn mark_processed_is_single_shot() {
        let mut cond = ElementCondition::new("c1", ConditionKind::Inclusion, 1);
        cond.push_clause(clause("a"));
        assert!(cond.mark_processed());
        assert!(!cond.mark_processed());
    }

    #[test]
    fn page_condition_carries_linkage() {
        let cond = ElementCondition::for_page("p1row4", 4, "p1", true, Some("intro".into()));
        assert_eq!(cond.page_id.as_deref(), Some("p1"));
        assert!(cond.branch);
        assert_eq!(cond.display_after.as_deref(), Some("intro"));
        assert_eq!(cond.kind, ConditionKind::Inclusion);
    }

    #[test]
    fn display_joins_clauses() {
        let mut cond = ElementCondition::new("c9", ConditionKind::Validation, 9);
        cond.push_clause(clause("a"));
        cond.push_clause(clause("b"));
        assert_eq!(cond.to_string(), "c9: a.answer == yes && b.answer == yes");
    }
}
