//! Error types for sqlweave

use thiserror::Error;

/// Result type alias for sqlweave operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Errors raised while parsing models, building statements, or mapping rows.
///
/// Every variant is terminal for the call that produced it; nothing in the
/// crate retries or recovers internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrmError {
    /// The record type is not a struct with named fields.
    #[error("only named-field structs can be used as records, got `{0}`")]
    PointerOnly(String),

    /// A field annotation is not a `key=value` list.
    #[error("invalid tag content: `{0}`")]
    InvalidTagContent(String),

    /// Two fields of one model map to the same column.
    #[error("duplicate column: `{0}`")]
    DuplicateColumn(String),

    /// A record describes the same field name twice.
    #[error("duplicate field: `{0}`")]
    DuplicateField(String),

    /// A declared field name did not resolve against the model.
    #[error("unknown field: `{0}`")]
    UnknownField(String),

    /// A result column did not resolve against the model.
    #[error("unknown column: `{0}`")]
    UnknownColumn(String),

    /// A table reference was used where its kind is not valid.
    #[error("unsupported table reference: {0}")]
    UnsupportedTable(String),

    /// An expression node was used where its kind is not valid.
    #[error("unsupported expression type: {0}")]
    UnsupportedExpressionType(String),

    /// An upsert entry is neither an assignment nor a column of the inserted table.
    #[error("unsupported assignable type: {0}")]
    UnsupportedAssignableType(String),

    /// The row carries more columns than the model has fields.
    #[error("too many returned columns: got {got}, model has {expected} fields")]
    TooManyReturnedColumns { got: usize, expected: usize },

    /// INSERT was built without any record.
    #[error("insert requires at least one row")]
    EmptyInsert,

    /// The query matched nothing.
    #[error("no rows in result set")]
    NoRows,

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// The driver failed to run the statement.
    #[error("Driver error: {0}")]
    Driver(String),

    /// A query hook refused to run the statement.
    #[error("Query aborted by hook: {0}")]
    Aborted(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create an unknown field error.
    pub fn unknown_field(name: impl Into<String>) -> Self {
        Self::UnknownField(name.into())
    }

    /// Create an unknown column error.
    pub fn unknown_column(name: impl Into<String>) -> Self {
        Self::UnknownColumn(name.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a driver error.
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver(message.into())
    }

    /// Check if this is a no rows error
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows)
    }

    /// Check if this is an unknown field error
    pub fn is_unknown_field(&self) -> bool {
        matches!(self, Self::UnknownField(_))
    }

    /// Check if this error was produced by a query hook
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }
}
