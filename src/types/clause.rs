use std::fmt;
use std::str::FromStr;

/// Comparison operators supported in condition clauses.
///
/// The spreadsheet accepts both symbolic and word forms (`is`, `is not`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClauseOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl ClauseOp {
    /// Parse an operator keyword. `None` defaults to equality, matching the
    /// original loader. Returns `None` for unknown keywords so the caller can
    /// report the offending row.
    #[must_use]
    pub fn from_keyword(keyword: Option<&str>) -> Option<Self> {
        let Some(keyword) = keyword else {
            return Some(ClauseOp::Eq);
        };
        match keyword.trim().to_ascii_lowercase().as_str() {
            "is" | "==" | "=" | "equals" => Some(ClauseOp::Eq),
            "is not" | "!=" | "not equals" => Some(ClauseOp::Neq),
            ">" => Some(ClauseOp::Gt),
            ">=" => Some(ClauseOp::Gte),
            "<" => Some(ClauseOp::Lt),
            "<=" => Some(ClauseOp::Lte),
            _ => None,
        }
    }
}

impl fmt::Display for ClauseOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClauseOp::Eq => write!(f, "=="),
            ClauseOp::Neq => write!(f, "!="),
            ClauseOp::Gt => write!(f, ">"),
            ClauseOp::Gte => write!(f, ">="),
            ClauseOp::Lt => write!(f, "<"),
            ClauseOp::Lte => write!(f, "<="),
        }
    }
}

/// Aggregation operators for functional consequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AggregateOp {
    Max,
    Min,
    Average,
    Sum,
    Count,
}

impl FromStr for AggregateOp {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" => Ok(AggregateOp::Max),
            "min" => Ok(AggregateOp::Min),
            "average" | "avg" => Ok(AggregateOp::Average),
            "sum" => Ok(AggregateOp::Sum),
            "count" => Ok(AggregateOp::Count),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregateOp::Max => "max",
            AggregateOp::Min => "min",
            AggregateOp::Average => "average",
            AggregateOp::Sum => "sum",
            AggregateOp::Count => "count",
        };
        write!(f, "{name}")
    }
}

/// A single atomic predicate: subject item, attribute, operator, value.
///
/// `value == None` means the attribute is compared against "no answer"
/// (the spreadsheet's `EMPTY` keyword). `negated` inverts the whole clause
/// into an absence test, used only by emitted maintenance records.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionClause {
    pub subject: String,
    pub attribute: String,
    pub op: ClauseOp,
    pub value: Option<String>,
    pub negated: bool,
    /// Free-text annotation carried by alternate-consequence rows.
    pub explanation: Option<String>,
    processed: bool,
}

impl ConditionClause {
    #[must_use]
    pub fn new(subject: &str, attribute: &str, op: ClauseOp, value: Option<&str>) -> Self {
        Self {
            subject: subject.to_owned(),
            attribute: attribute.to_owned(),
            op,
            value: value.map(str::to_owned),
            negated: false,
            explanation: None,
            processed: false,
        }
    }

    /// Turn this clause into an absence test.
    #[must_use]
    pub fn negate(mut self) -> Self {
        self.negated = true;
        self
    }

    #[must_use]
    pub fn is_processed(&self) -> bool {
        self.processed
    }

    /// Mark the clause as consumed into a condition. Returns `false` if it
    /// was already consumed; each clause may be processed at most once.
    pub fn mark_processed(&mut self) -> bool {
        if self.processed {
            return false;
        }
        self.processed = true;
        true
    }
}

impl fmt::Display for ConditionClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value.as_deref().unwrap_or("null");
        if self.negated {
            write!(f, "not({}.{} {} {})", self.subject, self.attribute, self.op, value)
        } else {
            write!(f, "{}.{} {} {}", self.subject, self.attribute, self.op, value)
        }
    }
}
