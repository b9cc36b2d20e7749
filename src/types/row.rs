//! Pre-mapped input records.
//!
//! Workbook reading and column mapping happen upstream; the compiler takes
//! rows whose cells are already assigned to their roles.

/// The condition cells of a row, exactly as written. Parsing into a typed
/// clause is deferred because a functional consequence row reuses these
/// cells for its aggregation spec.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClauseCells {
    pub subject: Option<String>,
    pub attribute: Option<String>,
    pub operation: Option<String>,
    pub value: Option<String>,
}

impl ClauseCells {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.attribute.is_none()
            && self.operation.is_none()
            && self.value.is_none()
    }
}

/// One row of the item section. A row without an id is a continuation row
/// and contributes only its clause cells (and labels) to the previous
/// element.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row {
    pub row: u32,
    pub id: Option<String>,
    pub depth: usize,
    pub type_keyword: Option<String>,
    pub required: Option<String>,
    pub field_type: Option<String>,
    pub pre_label: Option<String>,
    pub post_label: Option<String>,
    pub default_value: Option<String>,
    pub styles: Vec<String>,
    pub lookup_table: Option<String>,
    pub category: Option<String>,
    pub groups: Vec<String>,
    pub clause: ClauseCells,
}

impl Row {
    /// An element-defining row: id at the given indent depth plus a type
    /// keyword.
    #[must_use]
    pub fn element(row: u32, depth: usize, id: &str, type_keyword: &str) -> Self {
        Self {
            row,
            id: Some(id.to_owned()),
            depth,
            type_keyword: Some(type_keyword.to_owned()),
            ..Self::default()
        }
    }

    /// A continuation row carrying clause cells for the previous element.
    #[must_use]
    pub fn continuation(row: u32) -> Self {
        Self {
            row,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn required(mut self, value: &str) -> Self {
        self.required = Some(value.to_owned());
        self
    }

    #[must_use]
    pub fn field_type(mut self, value: &str) -> Self {
        self.field_type = Some(value.to_owned());
        self
    }

    #[must_use]
    pub fn pre_label(mut self, value: &str) -> Self {
        self.pre_label = Some(value.to_owned());
        self
    }

    #[must_use]
    pub fn post_label(mut self, value: &str) -> Self {
        self.post_label = Some(value.to_owned());
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_owned());
        self
    }

    #[must_use]
    pub fn style(mut self, value: &str) -> Self {
        self.styles.push(value.to_owned());
        self
    }

    #[must_use]
    pub fn lookup_table(mut self, value: &str) -> Self {
        self.lookup_table = Some(value.to_owned());
        self
    }

    #[must_use]
    pub fn category(mut self, value: &str) -> Self {
        self.category = Some(value.to_owned());
        self
    }

    #[must_use]
    pub fn group(mut self, value: &str) -> Self {
        self.groups.push(value.to_owned());
        self
    }

    /// Fill the condition cells. `operation == None` defaults to equality,
    /// `value == None` compares against "no answer".
    #[must_use]
    pub fn condition(
        mut self,
        subject: &str,
        attribute: &str,
        operation: Option<&str>,
        value: Option<&str>,
    ) -> Self {
        self.clause = ClauseCells {
            subject: Some(subject.to_owned()),
            attribute: Some(attribute.to_owned()),
            operation: operation.map(str::to_owned),
            value: value.map(str::to_owned),
        };
        self
    }
}

/// One row of the lookup-table section. A row with a `table_id` opens a new
/// table; subsequent rows are its entries.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableRow {
    pub row: u32,
    pub table_id: Option<String>,
    pub value: Option<String>,
    pub label: Option<String>,
    pub clause: ClauseCells,
}

impl TableRow {
    #[must_use]
    pub fn table(row: u32, table_id: &str) -> Self {
        Self {
            row,
            table_id: Some(table_id.to_owned()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn entry(row: u32, value: &str) -> Self {
        Self {
            row,
            value: Some(value.to_owned()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn label(mut self, value: &str) -> Self {
        self.label = Some(value.to_owned());
        self
    }

    #[must_use]
    pub fn condition(
        mut self,
        subject: &str,
        attribute: &str,
        operation: Option<&str>,
        value: Option<&str>,
    ) -> Self {
        self.clause = ClauseCells {
            subject: Some(subject.to_owned()),
            attribute: Some(attribute.to_owned()),
            operation: operation.map(str::to_owned),
            value: value.map(str::to_owned),
        };
        self
    }
}

/// Workbook-level metadata from the application section.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApplicationMeta {
    pub id: String,
    pub name: String,
    pub completion_action: Option<String>,
    pub active_page: Option<String>,
    pub note: Option<String>,
    pub imports: Vec<String>,
}

impl ApplicationMeta {
    #[must_use]
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            completion_action: None,
            active_page: None,
            note: None,
            imports: Vec::new(),
        }
    }

    #[must_use]
    pub fn completion_action(mut self, value: &str) -> Self {
        self.completion_action = Some(value.to_owned());
        self
    }

    #[must_use]
    pub fn active_page(mut self, value: &str) -> Self {
        self.active_page = Some(value.to_owned());
        self
    }

    #[must_use]
    pub fn note(mut self, value: &str) -> Self {
        self.note = Some(value.to_owned());
        self
    }

    #[must_use]
    pub fn import(mut self, value: &str) -> Self {
        self.imports.push(value.to_owned());
        self
    }
}
