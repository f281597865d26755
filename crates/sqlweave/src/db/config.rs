use crate::accessor::AccessorKind;
use crate::dialect::{Dialect, MySql};
use crate::model::Registry;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Configuration of a [`Db`](super::Db).
///
/// Defaults: MySQL dialect, direct accessor, a fresh registry, no slow query
/// threshold.
#[derive(Clone)]
pub struct DbConfig {
    /// SQL dialect used by every builder.
    pub dialect: Arc<dyn Dialect>,
    /// Field accessor strategy.
    pub accessor: AccessorKind,
    /// Model cache. `None` gives the database its own registry.
    pub registry: Option<Arc<Registry>>,
    /// Statements slower than this emit a warning.
    pub slow_query_threshold: Option<Duration>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            dialect: Arc::new(MySql),
            accessor: AccessorKind::default(),
            registry: None,
            slow_query_threshold: None,
        }
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("dialect", &self.dialect.name())
            .field("accessor", &self.accessor)
            .field("shared_registry", &self.registry.is_some())
            .field("slow_query_threshold", &self.slow_query_threshold)
            .finish()
    }
}

impl DbConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SQL dialect.
    pub fn with_dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialect = Arc::new(dialect);
        self
    }

    /// Set the field accessor strategy.
    pub fn with_accessor(mut self, accessor: AccessorKind) -> Self {
        self.accessor = accessor;
        self
    }

    /// Share a model registry with other databases.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the slow query threshold.
    ///
    /// Statements exceeding this duration are reported through `tracing` at WARN.
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }
}
