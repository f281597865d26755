//! Execution facade: builders bound to a driver, with hooks around every statement.
//!
//! ```rust,ignore
//! use sqlweave::{col, Db, DbConfig, Sqlite};
//!
//! let db = Db::with_config(driver, DbConfig::new().with_dialect(Sqlite));
//! let user: User = db.select::<User>().and_where(col("id").eq(1)).get(&db).await?;
//! ```

mod config;


pub use config::DbConfig;

use crate::accessor::Accessor;
use crate::builder::{Core, Deleter, Inserter, Selector};
use crate::error::{OrmError, OrmResult};
use crate::hook::{HookAction, QueryContext, QueryHook, QueryOutcome, QueryType};
use crate::model::{Entity, Registry};
use crate::query::{Query, QueryBuilder};
use crate::row::RowCursor;
use crate::value::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What a driver reports after running a statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Id generated by the last insert, when the backend reports one.
    pub last_insert_id: Option<i64>,
}

/// A database connection the facade sends compiled statements to.
pub trait Driver: Send + Sync {
    /// Cursor over the rows of one query.
    type Rows: RowCursor + Send;

    /// Run a statement that returns rows.
    fn query(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl Future<Output = OrmResult<Self::Rows>> + Send;

    /// Run a statement that returns no rows.
    fn exec(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl Future<Output = OrmResult<ExecResult>> + Send;
}

/// A driver plus everything needed to build statements for it.
pub struct Db<D> {
    core: Core,
    driver: D,
    hooks: Vec<Arc<dyn QueryHook>>,
    slow_query_threshold: Option<Duration>,
}

impl<D> fmt::Debug for Db<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("core", &self.core)
            .field("hooks", &self.hooks.len())
            .field("slow_query_threshold", &self.slow_query_threshold)
            .finish_non_exhaustive()
    }
}

impl<D: Driver> Db<D> {
    /// Wrap `driver` with the default configuration.
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, DbConfig::default())
    }

    pub fn with_config(driver: D, config: DbConfig) -> Self {
        let mut core = Core::new(config.dialect).with_accessor(config.accessor);
        if let Some(registry) = config.registry {
            core = core.with_registry(registry);
        }
        Self {
            core,
            driver,
            hooks: Vec::new(),
            slow_query_threshold: config.slow_query_threshold,
        }
    }

    /// Append a hook. Hooks run in the order they were added.
    pub fn with_hook<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Append a shared hook.
    pub fn with_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.core.registry()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// SELECT builder for `T`.
    pub fn select<T: Entity>(&self) -> Selector<'_, T> {
        Selector::new(&self.core)
    }

    /// INSERT builder for `T`.
    pub fn insert<T: Entity>(&self) -> Inserter<'_, T> {
        Inserter::new(&self.core)
    }

    /// DELETE builder for `T`.
    pub fn delete<T: Entity>(&self) -> Deleter<'_, T> {
        Deleter::new(&self.core)
    }

    /// Builders only run against the `Db` that created them.
    fn ensure_owns(&self, core: &Core) -> OrmResult<()> {
        if std::ptr::eq(core, &self.core) {
            Ok(())
        } else {
            Err(OrmError::Other(
                "statement was built by a different Db".to_string(),
            ))
        }
    }

    fn before(&self, ctx: &mut QueryContext) -> OrmResult<()> {
        for hook in &self.hooks {
            match hook.before_query(ctx) {
                HookAction::Continue => {}
                HookAction::ModifySql(sql) => ctx.sql = sql,
                HookAction::Abort(reason) => {
                    tracing::debug!(
                        target: "sqlweave.db",
                        query_type = %ctx.query_type,
                        reason = %reason,
                        "statement aborted by hook"
                    );
                    return Err(OrmError::Aborted(reason));
                }
            }
        }
        Ok(())
    }

    fn after(&self, ctx: &QueryContext, duration: Duration, outcome: &QueryOutcome) {
        for hook in &self.hooks {
            hook.after_query(ctx, duration, outcome);
        }
        if let Some(threshold) = self.slow_query_threshold {
            if duration > threshold {
                tracing::warn!(
                    target: "sqlweave.db",
                    query_type = %ctx.query_type,
                    duration_ms = duration.as_millis() as u64,
                    threshold_ms = threshold.as_millis() as u64,
                    sql = %ctx.sql,
                    "slow query"
                );
            }
        }
    }

    /// Run a row-returning statement through the hooks and the driver.
    pub(crate) async fn fetch<T: Entity>(
        &self,
        query_type: QueryType,
        query: Query,
    ) -> OrmResult<D::Rows> {
        let mut ctx = QueryContext::new(query_type, query, std::any::type_name::<T>());
        self.before(&mut ctx)?;

        let start = Instant::now();
        let result = self.driver.query(&ctx.sql, &ctx.args).await;
        let outcome = match &result {
            Ok(_) => QueryOutcome::Rows,
            Err(e) => QueryOutcome::error(e.to_string()),
        };
        self.after(&ctx, start.elapsed(), &outcome);
        result
    }

    /// Run a statement without rows through the hooks and the driver.
    pub(crate) async fn execute<T: Entity>(
        &self,
        query_type: QueryType,
        query: Query,
    ) -> OrmResult<ExecResult> {
        let mut ctx = QueryContext::new(query_type, query, std::any::type_name::<T>());
        self.before(&mut ctx)?;

        let start = Instant::now();
        let result = self.driver.exec(&ctx.sql, &ctx.args).await;
        let outcome = match &result {
            Ok(res) => QueryOutcome::Affected(res.rows_affected),
            Err(e) => QueryOutcome::error(e.to_string()),
        };
        self.after(&ctx, start.elapsed(), &outcome);
        result
    }
}

impl<T: Entity + Default> Selector<'_, T> {
    /// Run the query and map the first row.
    ///
    /// Fails with [`OrmError::NoRows`] when nothing matched.
    pub async fn get<D: Driver>(&self, db: &Db<D>) -> OrmResult<T> {
        db.ensure_owns(self.core)?;
        let query = self.build()?;
        let mut rows = db.fetch::<T>(QueryType::Select, query).await?;
        if !rows.next() {
            return Err(OrmError::NoRows);
        }
        let model = self.core.model::<T>()?;
        let mut record = T::default();
        self.core.accessor().populate(&model, &mut record, &mut rows)?;
        Ok(record)
    }

    /// Run the query and map every row.
    pub async fn get_multi<D: Driver>(&self, db: &Db<D>) -> OrmResult<Vec<T>> {
        db.ensure_owns(self.core)?;
        let query = self.build()?;
        let mut rows = db.fetch::<T>(QueryType::Select, query).await?;
        let model = self.core.model::<T>()?;
        let accessor = self.core.accessor();
        let mut records = Vec::new();
        while rows.next() {
            let mut record = T::default();
            accessor.populate(&model, &mut record, &mut rows)?;
            records.push(record);
        }
        Ok(records)
    }
}

impl<T: Entity> Inserter<'_, T> {
    /// Run the INSERT.
    pub async fn exec<D: Driver>(&self, db: &Db<D>) -> OrmResult<ExecResult> {
        db.ensure_owns(self.core)?;
        let query = self.build()?;
        db.execute::<T>(QueryType::Insert, query).await
    }
}

impl<T: Entity> Deleter<'_, T> {
    /// Run the DELETE.
    pub async fn exec<D: Driver>(&self, db: &Db<D>) -> OrmResult<ExecResult> {
        db.ensure_owns(self.core)?;
        let query = self.build()?;
        db.execute::<T>(QueryType::Delete, query).await
    }
}
