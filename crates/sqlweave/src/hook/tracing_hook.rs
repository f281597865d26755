use super::truncate_sql_bytes;
use super::types::{HookAction, QueryContext, QueryHook, QueryOutcome};
use std::time::Duration;
use tracing::Level;

/// A `tracing`-based hook that emits every statement before it runs.
///
/// Failures are reported again after the driver returns, at WARN.
#[derive(Debug, Clone)]
pub struct TracingSqlHook {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Whether bound arguments are included in the event.
    pub log_args: bool,
}

impl Default for TracingSqlHook {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
            log_args: false,
        }
    }
}

impl TracingSqlHook {
    /// Create a new hook with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Include bound arguments in the event.
    pub fn with_args(mut self) -> Self {
        self.log_args = true;
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

impl QueryHook for TracingSqlHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.truncate_sql(&ctx.sql);
        if self.log_args {
            emit_at_level!(
                self.level,
                target: "sqlweave.sql",
                query_type = %ctx.query_type,
                record = ctx.record,
                param_count = ctx.args.len(),
                args = ?ctx.args,
                sql = %sql,
            );
        } else {
            emit_at_level!(
                self.level,
                target: "sqlweave.sql",
                query_type = %ctx.query_type,
                record = ctx.record,
                param_count = ctx.args.len(),
                sql = %sql,
            );
        }
        HookAction::Continue
    }

    fn after_query(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome) {
        if let QueryOutcome::Error(error) = outcome {
            tracing::warn!(
                target: "sqlweave.sql",
                query_type = %ctx.query_type,
                duration_ms = duration.as_millis() as u64,
                error = %error,
                sql = %self.truncate_sql(&ctx.sql),
                "statement failed"
            );
        }
    }
}
