//! Compiled statements.

use crate::error::OrmResult;
use crate::value::Value;
use std::fmt;

/// SQL text with its positional arguments.
///
/// `args[i]` binds the `i`-th `?` placeholder of `sql`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Query {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Anything that compiles to a [`Query`].
pub trait QueryBuilder {
    /// Compile the accumulated configuration.
    ///
    /// Fails on the first unresolved name or misplaced node; no partial SQL is
    /// ever returned.
    fn build(&self) -> OrmResult<Query>;
}
