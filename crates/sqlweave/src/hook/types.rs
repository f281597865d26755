use crate::query::Query;
use crate::value::Value;
use std::fmt;
use std::time::Duration;

/// The statement kind being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// SELECT query
    Select,
    /// INSERT statement, with or without upsert
    Insert,
    /// DELETE statement
    Delete,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Select => "SELECT",
            QueryType::Insert => "INSERT",
            QueryType::Delete => "DELETE",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context information about the statement being executed.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// Detected statement kind.
    pub query_type: QueryType,
    /// SQL that will be sent to the driver.
    pub sql: String,
    /// Bound arguments, aligned with the `?` placeholders.
    pub args: Vec<Value>,
    /// Record type the statement was built for.
    pub record: &'static str,
}

impl QueryContext {
    pub fn new(query_type: QueryType, query: Query, record: &'static str) -> Self {
        Self {
            query_type,
            sql: query.sql,
            args: query.args,
            record,
        }
    }
}

/// Maximum length for error messages in `QueryOutcome::Error`.
const MAX_ERROR_LEN: usize = 512;

/// Result of a statement for hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The driver returned a row cursor.
    Rows,
    /// The statement affected this many rows.
    Affected(u64),
    /// The driver failed (message truncated to 512 bytes).
    Error(String),
}

impl QueryOutcome {
    /// Create an error outcome, truncating long messages.
    pub fn error(msg: String) -> Self {
        if msg.len() > MAX_ERROR_LEN {
            Self::Error(format!("{}...", super::truncate_sql_bytes(&msg, MAX_ERROR_LEN)))
        } else {
            Self::Error(msg)
        }
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutcome::Rows => write!(f, "rows"),
            QueryOutcome::Affected(n) => write!(f, "{n} affected"),
            QueryOutcome::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Action to take after a hook inspects a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAction {
    /// Continue with the current SQL.
    Continue,
    /// Continue with this SQL instead. Arguments are kept.
    ModifySql(String),
    /// Refuse to run the statement.
    Abort(String),
}

/// Trait for hooking into statement execution.
///
/// Hooks run in registration order. Each sees the SQL as left by the hooks
/// before it.
pub trait QueryHook: Send + Sync {
    /// Called before the statement reaches the driver.
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let _ = ctx;
        HookAction::Continue
    }

    /// Called once the driver returned, successfully or not.
    fn after_query(&self, _ctx: &QueryContext, _duration: Duration, _outcome: &QueryOutcome) {}
}
