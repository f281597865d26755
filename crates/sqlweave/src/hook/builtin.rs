use super::types::{HookAction, QueryContext, QueryHook, QueryOutcome, QueryType};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Rejects every DELETE statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyDeleteHook;

impl QueryHook for DenyDeleteHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        if ctx.query_type == QueryType::Delete {
            HookAction::Abort("DELETE statements are disabled".to_string())
        } else {
            HookAction::Continue
        }
    }
}

type LogFn = dyn Fn(&str, &[Value]) + Send + Sync;

/// Hands every statement and its arguments to a callback before it runs.
#[derive(Clone)]
pub struct QueryLogHook {
    log: Arc<LogFn>,
}

impl QueryLogHook {
    pub fn new(log: impl Fn(&str, &[Value]) + Send + Sync + 'static) -> Self {
        Self { log: Arc::new(log) }
    }
}

impl Default for QueryLogHook {
    /// Logs through `tracing` at DEBUG.
    fn default() -> Self {
        Self::new(|sql, args| {
            tracing::debug!(target: "sqlweave.sql", sql = %sql, args = ?args, "query");
        })
    }
}

impl fmt::Debug for QueryLogHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryLogHook").finish_non_exhaustive()
    }
}

impl QueryHook for QueryLogHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        (self.log)(&ctx.sql, &ctx.args);
        HookAction::Continue
    }
}

/// Runs several hooks as one, in order.
#[derive(Clone, Default)]
pub struct CompositeHook {
    hooks: Vec<Arc<dyn QueryHook>>,
}

impl CompositeHook {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn add_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for CompositeHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeHook")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl QueryHook for CompositeHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let mut current = ctx.clone();
        let mut modified = false;
        for hook in &self.hooks {
            match hook.before_query(&current) {
                HookAction::Continue => {}
                HookAction::ModifySql(sql) => {
                    current.sql = sql;
                    modified = true;
                }
                abort @ HookAction::Abort(_) => return abort,
            }
        }
        if modified {
            HookAction::ModifySql(current.sql)
        } else {
            HookAction::Continue
        }
    }

    fn after_query(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome) {
        for hook in &self.hooks {
            hook.after_query(ctx, duration, outcome);
        }
    }
}
