//! Compiles depth-annotated questionnaire rows into a typed page tree and
//! a flat list of declarative directives, and runs the session-side item
//! list and navigation stack those directives drive.

mod compile;
mod emit;
mod error;
mod runtime;
mod serial;
mod types;

pub use compile::compile;
pub use emit::{emit, Action, Directive, ElementSpec, RuntimeType, Trigger};
pub use error::FormflowError;
pub use runtime::{Questionnaire, StateError, COMPLETION_ACTION_RETURN};
pub use serial::{
    decode_ids, decode_options, encode_ids, encode_options, CodecError, PossibleOption,
};
pub use types::{
    AggregateOp, Answer, AnswerKind, Application, ApplicationMeta, ClauseCells, ClauseOp,
    CompileError, ConditionClause, ConditionKind, ElementCondition, ElementId, ElementType,
    ListEntry, LookupTable, Page, PageElement, Row, TableRow,
};
