use thiserror::Error;

/// Fatal compilation errors. Each carries the offending row where one
/// exists; compilation stops at the first error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("row {row}: id \"{id}\" contains whitespace")]
    WhitespaceId { id: String, row: u32 },

    #[error("row {row}: duplicate id \"{id}\" (first defined at row {first})")]
    DuplicateId { id: String, row: u32, first: u32 },

    #[error("row {row}: element \"{id}\" has no type")]
    MissingType { id: String, row: u32 },

    #[error("row {row}: unknown element type \"{keyword}\"")]
    UnknownType { keyword: String, row: u32 },

    #[error("row {row}: unknown operator \"{keyword}\"")]
    UnknownOperator { keyword: String, row: u32 },

    #[error("row {row}: invalid aggregation operation \"{keyword}\" for \"{element}\"")]
    InvalidAggregateOp {
        keyword: String,
        element: String,
        row: u32,
    },

    #[error("row {row}: consequence \"{id}\" has no condition and no ancestor to inherit one from")]
    UnconditionedConsequence { id: String, row: u32 },

    #[error("row {row}: validation \"{id}\" has no preceding question")]
    ValidationWithoutQuestion { id: String, row: u32 },

    #[error("row {row}: element \"{element}\" references unknown lookup table \"{table}\"")]
    UnknownLookupTable {
        table: String,
        element: String,
        row: u32,
    },

    #[error("lookup table \"{table}\" has no unconditional entries for \"{element}\"")]
    NoUnconditionalEntries { table: String, element: String },

    #[error("row {row}: depth {depth} cannot follow a tree only {have} deep")]
    DepthJump { depth: usize, have: usize, row: u32 },

    #[error("row {row}: condition already attached to \"{id}\"")]
    ConditionReattached { id: String, row: u32 },

    #[error("a questionnaire needs at least one page")]
    NoPages,

    #[error("a questionnaire needs at least one non-branch page to start on")]
    NoInitialPage,

    #[error("row {row}: cannot parse \"{raw}\" as a {kind} value for \"{id}\"")]
    InvalidValue {
        id: String,
        raw: String,
        kind: String,
        row: u32,
    },

    #[error("group \"{id}\" has no displayable children")]
    EmptyGroup { id: String },

    #[error("row {row}: repeating reference \"{id}\" resolves to no known element")]
    UnknownRepeatTarget { id: String, row: u32 },

    #[error("row {row}: table entry before any table header")]
    OrphanTableRow { row: u32 },

    #[error("row {row}: a table entry takes at most one condition clause")]
    MultiClauseTableEntry { row: u32 },
}
