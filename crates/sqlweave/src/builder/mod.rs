//! SQL builders for SELECT, INSERT (with upsert) and DELETE.
//!
//! Every builder borrows a [`Core`] (registry, dialect, accessor strategy),
//! accumulates configuration through chained calls and compiles with
//! [`QueryBuilder::build`](crate::QueryBuilder::build). Rendering shared by all
//! statements lives in [`SqlBuilder`], which dialects also write through.
//!
//! ```ignore
//! use sqlweave::{col, Core, QueryBuilder, Selector};
//!
//! let core = Core::default();
//! let query = Selector::<User>::new(&core)
//!     .and_where(col("age").gt(18))
//!     .limit(10)
//!     .build()?;
//! assert_eq!(query.sql, "SELECT * FROM `user` WHERE `age` > ? LIMIT ?;");
//! ```

mod delete;
mod insert;
mod select;

#[cfg(test)]
mod tests;

pub use delete::Deleter;
pub use insert::{Inserter, Upsert, UpsertBuilder};
pub use select::Selector;

use crate::accessor::AccessorKind;
use crate::dialect::{Dialect, MySql};
use crate::error::{OrmError, OrmResult};
use crate::expr::{Aggregate, Column, Expr, Op, Predicate, Selectable, fold_and};
use crate::model::{Entity, Model, Registry};
use crate::query::Query;
use crate::table::{JoinCondition, Table, TableReference};
use crate::value::Value;
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// Shared state every builder and the execution path run against.
#[derive(Clone)]
pub struct Core {
    registry: Arc<Registry>,
    dialect: Arc<dyn Dialect>,
    accessor: AccessorKind,
}

impl Default for Core {
    fn default() -> Self {
        Self::new(Arc::new(MySql))
    }
}

impl fmt::Debug for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Core")
            .field("dialect", &self.dialect.name())
            .field("accessor", &self.accessor)
            .field("models", &self.registry.len())
            .finish()
    }
}

impl Core {
    /// A core with its own empty registry and the direct accessor.
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self {
            registry: Arc::new(Registry::new()),
            dialect,
            accessor: AccessorKind::default(),
        }
    }

    /// Share an existing registry.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_accessor(mut self, accessor: AccessorKind) -> Self {
        self.accessor = accessor;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn accessor(&self) -> AccessorKind {
        self.accessor
    }

    /// Model of `T` from this core's registry.
    pub fn model<T: Entity>(&self) -> OrmResult<Arc<Model>> {
        self.registry.get::<T>()
    }
}

/// How columns without a [`Table`] are written.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Qualifier {
    /// Single-table statement: bare column names.
    Bare,
    /// Joined statement: prefixed with the primary table's alias or name.
    Table(String),
    /// Joined statement that does not contain the primary table.
    Missing,
}

/// Statement text and arguments under construction.
///
/// Column references resolve against the primary model unless they are
/// qualified by a [`Table`], in which case that table's own model is used.
/// Once the FROM target is a join every column is written table-qualified.
pub struct SqlBuilder<'a> {
    registry: &'a Registry,
    quote: char,
    model: Arc<Model>,
    qualifier: Qualifier,
    sql: String,
    args: Vec<Value>,
}

fn push_quoted(sql: &mut String, quote: char, ident: &str) {
    sql.push(quote);
    sql.push_str(ident);
    sql.push(quote);
}

impl<'a> SqlBuilder<'a> {
    pub(crate) fn new(core: &'a Core, model: Arc<Model>) -> Self {
        Self {
            registry: &core.registry,
            quote: core.dialect.quote_char(),
            model,
            qualifier: Qualifier::Bare,
            sql: String::with_capacity(128),
            args: Vec::new(),
        }
    }

    /// The primary model of the statement.
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn write_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    pub fn write_char(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Write `ident` surrounded by the dialect quote character.
    pub fn quote(&mut self, ident: &str) {
        push_quoted(&mut self.sql, self.quote, ident);
    }

    /// Qualify unqualified columns when `reference` is a join.
    ///
    /// They are prefixed with the first occurrence of the primary table in the
    /// join tree. Rendering one fails when the join does not contain it.
    pub(crate) fn qualify_for(&mut self, reference: Option<&TableReference>) {
        self.qualifier = match reference {
            Some(join @ TableReference::Join(_)) => {
                match find_table(join, self.model.type_id()) {
                    Some(table) => Qualifier::Table(match &table.alias {
                        Some(alias) => alias.clone(),
                        None => self.model.table_name().to_string(),
                    }),
                    None => Qualifier::Missing,
                }
            }
            _ => Qualifier::Bare,
        };
    }

    /// Append a bound argument. The caller writes the `?`.
    pub fn add_arg(&mut self, value: Value) {
        self.args.push(value);
    }

    /// Write the quoted column of the primary model's declared field `name`.
    pub fn quote_field(&mut self, name: &str) -> OrmResult<()> {
        let model = Arc::clone(&self.model);
        let field = model.resolve_field(name)?;
        self.quote(&field.column);
        Ok(())
    }

    /// Write a column reference without its alias.
    pub fn build_column(&mut self, column: &Column) -> OrmResult<()> {
        match &column.table {
            None => {
                let model = Arc::clone(&self.model);
                let field = model.resolve_field(&column.name)?;
                match &self.qualifier {
                    Qualifier::Bare => {}
                    Qualifier::Table(prefix) => {
                        push_quoted(&mut self.sql, self.quote, prefix);
                        self.sql.push('.');
                    }
                    Qualifier::Missing => {
                        return Err(OrmError::UnsupportedExpressionType(format!(
                            "unqualified column `{}` in a join without `{}`",
                            column.name,
                            model.table_name()
                        )));
                    }
                }
                self.quote(&field.column);
                Ok(())
            }
            Some(table) => {
                let model = table.entity.model(self.registry)?;
                let field = model.resolve_field(&column.name)?;
                match &table.alias {
                    Some(alias) => self.quote(alias),
                    None => self.quote(model.table_name()),
                }
                self.write_char('.');
                self.quote(&field.column);
                Ok(())
            }
        }
    }

    fn build_alias(&mut self, alias: Option<&str>) {
        if let Some(alias) = alias {
            self.write_str(" AS ");
            self.quote(alias);
        }
    }

    fn build_aggregate(&mut self, agg: &Aggregate, with_alias: bool) -> OrmResult<()> {
        self.write_str(agg.func.as_str());
        self.write_char('(');
        self.build_column(&agg.arg)?;
        self.write_char(')');
        if with_alias {
            self.build_alias(agg.alias.as_deref());
        }
        Ok(())
    }

    /// Write an expression in condition position. Aliases are not rendered.
    pub fn build_expr(&mut self, expr: &Expr) -> OrmResult<()> {
        match expr {
            Expr::Column(c) => self.build_column(c),
            Expr::Value(v) => {
                self.write_char('?');
                self.add_arg(v.clone());
                Ok(())
            }
            Expr::Raw(r) => {
                self.write_str(&r.sql);
                self.args.extend(r.args.iter().cloned());
                Ok(())
            }
            Expr::Aggregate(a) => self.build_aggregate(a, false),
            Expr::Predicate(p) => self.build_predicate(p),
        }
    }

    fn build_operand(&mut self, expr: &Expr) -> OrmResult<()> {
        if matches!(expr, Expr::Predicate(_)) {
            self.write_char('(');
            self.build_expr(expr)?;
            self.write_char(')');
            Ok(())
        } else {
            self.build_expr(expr)
        }
    }

    fn build_predicate(&mut self, p: &Predicate) -> OrmResult<()> {
        match (p.op, p.right.as_deref()) {
            (None, _) => self.build_operand(&p.left),
            (Some(Op::Not), None) => {
                self.write_str("NOT ");
                self.build_operand(&p.left)
            }
            (Some(op), right) => {
                self.build_operand(&p.left)?;
                self.write_char(' ');
                self.write_str(op.as_str());
                self.write_char(' ');
                match right {
                    Some(right) => self.build_operand(right),
                    None => Ok(()),
                }
            }
        }
    }

    /// AND-fold `preds` and write the result. Writes nothing for an empty list.
    pub(crate) fn build_predicates(&mut self, preds: &[Predicate]) -> OrmResult<()> {
        match fold_and(preds) {
            Some(p) => self.build_predicate(&p),
            None => Ok(()),
        }
    }

    pub(crate) fn build_selectable(&mut self, item: &Selectable) -> OrmResult<()> {
        match item {
            Selectable::Column(c) => {
                self.build_column(c)?;
                self.build_alias(c.alias.as_deref());
                Ok(())
            }
            Selectable::Aggregate(a) => self.build_aggregate(a, true),
            Selectable::Raw(r) => {
                self.write_str(&r.sql);
                self.args.extend(r.args.iter().cloned());
                Ok(())
            }
        }
    }

    /// Write a single table with its alias.
    pub(crate) fn build_table(&mut self, table: &Table) -> OrmResult<()> {
        let model = table.entity.model(self.registry)?;
        self.quote(model.table_name());
        self.build_alias(table.alias.as_deref());
        Ok(())
    }

    /// Write a FROM target. `None` is the primary model's table.
    pub(crate) fn build_table_reference(
        &mut self,
        reference: Option<&TableReference>,
    ) -> OrmResult<()> {
        match reference {
            None => {
                let model = Arc::clone(&self.model);
                self.quote(model.table_name());
                Ok(())
            }
            Some(TableReference::Table(table)) => self.build_table(table),
            Some(TableReference::Join(join)) => {
                self.write_char('(');
                self.build_table_reference(Some(&join.left))?;
                self.write_char(' ');
                self.write_str(join.kind.as_str());
                self.write_char(' ');
                self.build_table_reference(Some(&join.right))?;
                match &join.condition {
                    JoinCondition::Using(cols) if !cols.is_empty() => {
                        // USING names shared columns; resolve them on the left-most table.
                        let model = leftmost_table(&join.left).entity.model(self.registry)?;
                        self.write_str(" USING (");
                        for (i, name) in cols.iter().enumerate() {
                            if i > 0 {
                                self.write_char(',');
                            }
                            let field = model.resolve_field(name)?;
                            self.quote(&field.column);
                        }
                        self.write_char(')');
                    }
                    JoinCondition::On(preds) if !preds.is_empty() => {
                        self.write_str(" ON ");
                        self.build_predicates(preds)?;
                    }
                    _ => {}
                }
                self.write_char(')');
                Ok(())
            }
        }
    }

    /// Terminate the statement.
    pub(crate) fn finish(mut self) -> Query {
        self.sql.push(';');
        Query {
            sql: self.sql,
            args: self.args,
        }
    }
}

/// First table of record type `type_id`, searching left before right.
fn find_table(reference: &TableReference, type_id: TypeId) -> Option<&Table> {
    match reference {
        TableReference::Table(table) if table.entity.type_id() == type_id => Some(table),
        TableReference::Table(_) => None,
        TableReference::Join(join) => {
            find_table(&join.left, type_id).or_else(|| find_table(&join.right, type_id))
        }
    }
}

fn leftmost_table(reference: &TableReference) -> &Table {
    match reference {
        TableReference::Table(table) => table,
        TableReference::Join(join) => leftmost_table(&join.left),
    }
}

/// Reject anything but a column where only columns are allowed.
pub(crate) fn expect_column<'e>(expr: &'e Expr, clause: &str) -> OrmResult<&'e Column> {
    match expr {
        Expr::Column(c) => Ok(c),
        other => Err(OrmError::UnsupportedExpressionType(format!(
            "{} in {clause}",
            other.kind()
        ))),
    }
}
