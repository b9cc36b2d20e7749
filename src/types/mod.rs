//! Core data model: answers, clauses, conditions, elements, pages and the
//! compiled application, plus the pre-mapped input row records.

pub mod application;
pub mod clause;
pub mod condition;
pub mod element;
pub mod error;
pub mod lookup;
pub mod page;
pub mod row;
pub mod value;

pub use application::Application;
pub use clause::{AggregateOp, ClauseOp, ConditionClause};
pub use condition::{ConditionKind, ElementCondition};
pub use element::{ElementId, ElementType, PageElement};
pub use error::CompileError;
pub use lookup::{ListEntry, LookupTable};
pub use page::Page;
pub use row::{ApplicationMeta, ClauseCells, Row, TableRow};
pub use value::{Answer, AnswerKind};
