//! DELETE query builder.

use super::{Core, SqlBuilder};
use crate::error::{OrmError, OrmResult};
use crate::expr::Predicate;
use crate::model::Entity;
use crate::query::{Query, QueryBuilder};
use crate::table::TableReference;
use std::marker::PhantomData;

/// DELETE builder for record type `T`.
///
/// Without predicates the statement deletes every row; pair the execution
/// path with [`DenyDeleteHook`](crate::DenyDeleteHook) to forbid that.
pub struct Deleter<'a, T> {
    pub(crate) core: &'a Core,
    table: Option<TableReference>,
    wheres: Vec<Predicate>,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: Entity> Deleter<'a, T> {
    pub fn new(core: &'a Core) -> Self {
        Self {
            core,
            table: None,
            wheres: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Delete from this table instead of `T`'s own. Joins are rejected at build time.
    pub fn from(mut self, table: impl Into<TableReference>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add a WHERE predicate. Predicates are combined with AND in call order.
    pub fn and_where(mut self, pred: Predicate) -> Self {
        self.wheres.push(pred);
        self
    }

    /// Add several WHERE predicates.
    pub fn where_all(mut self, preds: impl IntoIterator<Item = Predicate>) -> Self {
        self.wheres.extend(preds);
        self
    }
}

impl<T: Entity> QueryBuilder for Deleter<'_, T> {
    fn build(&self) -> OrmResult<Query> {
        let model = self.core.model::<T>()?;
        let mut b = SqlBuilder::new(self.core, model);

        b.write_str("DELETE FROM ");
        match &self.table {
            None => b.build_table_reference(None)?,
            Some(TableReference::Table(table)) => b.build_table(table)?,
            Some(TableReference::Join(_)) => {
                return Err(OrmError::UnsupportedTable(
                    "DELETE target must be a single table".to_string(),
                ));
            }
        }

        if !self.wheres.is_empty() {
            b.write_str(" WHERE ");
            b.build_predicates(&self.wheres)?;
        }

        Ok(b.finish())
    }
}
