//! SELECT query builder.

use super::{Core, SqlBuilder, expect_column};
use crate::error::OrmResult;
use crate::expr::{Column, Expr, IntoExpr, Predicate, Selectable};
use crate::model::Entity;
use crate::query::{Query, QueryBuilder};
use crate::table::TableReference;
use std::marker::PhantomData;

/// SELECT builder for record type `T`.
///
/// `T` supplies the default FROM table and the model unqualified columns
/// resolve against.
pub struct Selector<'a, T> {
    pub(crate) core: &'a Core,
    columns: Vec<Selectable>,
    table: Option<TableReference>,
    wheres: Vec<Predicate>,
    group_by: Vec<Expr>,
    having: Vec<Predicate>,
    order_by: Vec<Column>,
    limit: i64,
    offset: i64,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: Entity> Selector<'a, T> {
    pub fn new(core: &'a Core) -> Self {
        Self {
            core,
            columns: Vec::new(),
            table: None,
            wheres: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            limit: 0,
            offset: 0,
            _marker: PhantomData,
        }
    }

    /// Add one item to the select list. An empty list selects `*`.
    pub fn select(mut self, item: impl Into<Selectable>) -> Self {
        self.columns.push(item.into());
        self
    }

    /// Replace the select list.
    pub fn columns<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selectable>,
    {
        self.columns = items.into_iter().map(Into::into).collect();
        self
    }

    /// Select from a table or join instead of `T`'s own table.
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

    /// Add a GROUP BY entry. Only columns are accepted at build time.
    pub fn group_by(mut self, expr: impl IntoExpr) -> Self {
        self.group_by.push(expr.into_expr());
        self
    }

    /// Add a HAVING predicate. Predicates are combined with AND in call order.
    pub fn having(mut self, pred: Predicate) -> Self {
        self.having.push(pred);
        self
    }

    /// Add an ORDER BY column; use [`Column::desc`] for descending order.
    pub fn order_by(mut self, column: Column) -> Self {
        self.order_by.push(column);
        self
    }

    /// LIMIT, omitted when not positive.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// OFFSET, omitted when not positive.
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

impl<T: Entity> QueryBuilder for Selector<'_, T> {
    fn build(&self) -> OrmResult<Query> {
        let model = self.core.model::<T>()?;
        let mut b = SqlBuilder::new(self.core, model);
        b.qualify_for(self.table.as_ref());

        b.write_str("SELECT ");
        if self.columns.is_empty() {
            b.write_char('*');
        } else {
            for (i, item) in self.columns.iter().enumerate() {
                if i > 0 {
                    b.write_char(',');
                }
                b.build_selectable(item)?;
            }
        }

        b.write_str(" FROM ");
        b.build_table_reference(self.table.as_ref())?;

        if !self.wheres.is_empty() {
            b.write_str(" WHERE ");
            b.build_predicates(&self.wheres)?;
        }

        if !self.group_by.is_empty() {
            b.write_str(" GROUP BY ");
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    b.write_char(',');
                }
                b.build_column(expect_column(expr, "GROUP BY")?)?;
            }
        }

        if !self.having.is_empty() {
            b.write_str(" HAVING ");
            b.build_predicates(&self.having)?;
        }

        if !self.order_by.is_empty() {
            b.write_str(" ORDER BY ");
            for (i, column) in self.order_by.iter().enumerate() {
                if i > 0 {
                    b.write_char(',');
                }
                b.build_column(column)?;
                b.write_char(' ');
                b.write_str(column.order.unwrap_or_default().as_str());
            }
        }

        if self.limit > 0 {
            b.write_str(" LIMIT ?");
            b.add_arg(self.limit.into());
        }

        if self.offset > 0 {
            b.write_str(" OFFSET ?");
            b.add_arg(self.offset.into());
        }

        Ok(b.finish())
    }
}
