//! Table references: a single record table or a binary join tree.

use crate::error::OrmResult;
use crate::expr::{Column, Predicate};
use crate::model::{Entity, Model, Registry};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// Type-erased handle to a record type, resolvable against a [`Registry`].
#[derive(Clone, Copy)]
pub struct EntityRef {
    type_id: TypeId,
    type_name: &'static str,
    resolve: fn(&Registry) -> OrmResult<Arc<Model>>,
}

impl EntityRef {
    pub fn of<T: Entity>() -> Self {
        EntityRef {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            resolve: Registry::get::<T>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Look up (or parse) the model of the referenced record type.
    pub fn model(&self, registry: &Registry) -> OrmResult<Arc<Model>> {
        (self.resolve)(registry)
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityRef").field(&self.type_name).finish()
    }
}

/// The table of one record type, optionally aliased.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub(crate) entity: EntityRef,
    pub(crate) alias: Option<String>,
}

impl Table {
    /// The table of record type `T`.
    pub fn of<T: Entity>() -> Self {
        Table {
            entity: EntityRef::of::<T>(),
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    /// A column of this table, by declared field name.
    pub fn c(&self, name: impl Into<String>) -> Column {
        Column::of_table(self.clone(), name)
    }

    pub fn join(self, right: impl Into<TableReference>) -> JoinBuilder {
        JoinBuilder::new(self.into(), right.into(), JoinKind::Inner)
    }

    pub fn left_join(self, right: impl Into<TableReference>) -> JoinBuilder {
        JoinBuilder::new(self.into(), right.into(), JoinKind::Left)
    }

    pub fn right_join(self, right: impl Into<TableReference>) -> JoinBuilder {
        JoinBuilder::new(self.into(), right.into(), JoinKind::Right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

/// How the two sides of a join are matched.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    /// `USING (cols)`, by declared field name.
    Using(Vec<String>),
    /// `ON p1 AND p2 ...`
    On(Vec<Predicate>),
}

/// A binary join of two table references.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub(crate) left: TableReference,
    pub(crate) right: TableReference,
    pub(crate) kind: JoinKind,
    pub(crate) condition: JoinCondition,
}

impl Join {
    pub fn join(self, right: impl Into<TableReference>) -> JoinBuilder {
        JoinBuilder::new(self.into(), right.into(), JoinKind::Inner)
    }

    pub fn left_join(self, right: impl Into<TableReference>) -> JoinBuilder {
        JoinBuilder::new(self.into(), right.into(), JoinKind::Left)
    }

    pub fn right_join(self, right: impl Into<TableReference>) -> JoinBuilder {
        JoinBuilder::new(self.into(), right.into(), JoinKind::Right)
    }
}

/// A join waiting for its condition.
#[derive(Debug, Clone)]
pub struct JoinBuilder {
    left: TableReference,
    right: TableReference,
    kind: JoinKind,
}

impl JoinBuilder {
    fn new(left: TableReference, right: TableReference, kind: JoinKind) -> Self {
        JoinBuilder { left, right, kind }
    }

    /// Match rows with the AND of `preds`.
    pub fn on(self, preds: impl IntoIterator<Item = Predicate>) -> Join {
        self.finish(JoinCondition::On(preds.into_iter().collect()))
    }

    /// Match rows on equally named columns.
    pub fn using<I, S>(self, cols: I) -> Join
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.finish(JoinCondition::Using(
            cols.into_iter().map(Into::into).collect(),
        ))
    }

    fn finish(self, condition: JoinCondition) -> Join {
        Join {
            left: self.left,
            right: self.right,
            kind: self.kind,
            condition,
        }
    }
}

/// Anything usable after FROM.
#[derive(Debug, Clone, PartialEq)]
pub enum TableReference {
    Table(Table),
    Join(Box<Join>),
}

impl From<Table> for TableReference {
    fn from(t: Table) -> Self {
        TableReference::Table(t)
    }
}

impl From<Join> for TableReference {
    fn from(j: Join) -> Self {
        TableReference::Join(Box::new(j))
    }
}
