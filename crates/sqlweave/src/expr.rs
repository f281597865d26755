//! Expression algebra for select lists, WHERE/HAVING/ON conditions and upsert actions.
//!
//! Nodes are plain values built with the free constructors ([`col`], [`raw`],
//! [`avg`], [`assign`], ...) and combined by value. Rendering happens later, in
//! the builders, against the model of the record type being queried.
//!
//! ```ignore
//! use sqlweave::{col, not};
//!
//! let p = col("age").gt(18).and(not(col("name").eq("tom")));
//! ```

use crate::table::Table;
use crate::value::Value;
use chrono::NaiveDateTime;
use std::fmt;
use uuid::Uuid;

/// Comparison and boolean operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Lt,
    Gt,
    And,
    Or,
    Not,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::And => "AND",
            Op::Or => "OR",
            Op::Not => "NOT",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction of an ORDER BY column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// Any expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(Column),
    Value(Value),
    Predicate(Predicate),
    Aggregate(Aggregate),
    Raw(RawExpr),
}

impl Expr {
    /// Short node name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Column(_) => "column",
            Expr::Value(_) => "value",
            Expr::Predicate(_) => "predicate",
            Expr::Aggregate(_) => "aggregate",
            Expr::Raw(_) => "raw expression",
        }
    }
}

/// A column referenced by declared field name.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
    pub(crate) table: Option<Table>,
    pub(crate) order: Option<Order>,
}

/// Reference a column of the queried record type by its declared field name.
pub fn col(name: impl Into<String>) -> Column {
    Column {
        name: name.into(),
        alias: None,
        table: None,
        order: None,
    }
}

impl Column {
    pub(crate) fn of_table(table: Table, name: impl Into<String>) -> Self {
        Column {
            table: Some(table),
            ..col(name)
        }
    }

    /// Declared field name this column refers to.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    /// Display alias in a select list. Ignored anywhere else.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Ascending sort, for ORDER BY.
    pub fn asc(mut self) -> Self {
        self.order = Some(Order::Asc);
        self
    }

    /// Descending sort, for ORDER BY.
    pub fn desc(mut self) -> Self {
        self.order = Some(Order::Desc);
        self
    }

    /// `column = arg`
    pub fn eq(self, arg: impl IntoExpr) -> Predicate {
        Predicate::binary(Expr::Column(self), Op::Eq, arg.into_expr())
    }

    /// `column < arg`
    pub fn lt(self, arg: impl IntoExpr) -> Predicate {
        Predicate::binary(Expr::Column(self), Op::Lt, arg.into_expr())
    }

    /// `column > arg`
    pub fn gt(self, arg: impl IntoExpr) -> Predicate {
        Predicate::binary(Expr::Column(self), Op::Gt, arg.into_expr())
    }

    /// Use the bare column as a boolean expression.
    pub fn as_predicate(self) -> Predicate {
        Predicate::unary(Expr::Column(self))
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        col(name)
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        col(name)
    }
}

/// A boolean expression tree.
///
/// `op == None` renders only `left`. `op == Some(Not)` with no right side is
/// the negation of `left`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub(crate) left: Box<Expr>,
    pub(crate) op: Option<Op>,
    pub(crate) right: Option<Box<Expr>>,
}

impl Predicate {
    fn binary(left: Expr, op: Op, right: Expr) -> Self {
        Predicate {
            left: Box::new(left),
            op: Some(op),
            right: Some(Box::new(right)),
        }
    }

    fn unary(left: Expr) -> Self {
        Predicate {
            left: Box::new(left),
            op: None,
            right: None,
        }
    }

    pub fn and(self, right: Predicate) -> Predicate {
        Predicate::binary(Expr::Predicate(self), Op::And, Expr::Predicate(right))
    }

    pub fn or(self, right: Predicate) -> Predicate {
        Predicate::binary(Expr::Predicate(self), Op::Or, Expr::Predicate(right))
    }
}

/// `NOT (p)`
pub fn not(p: Predicate) -> Predicate {
    Predicate {
        left: Box::new(Expr::Predicate(p)),
        op: Some(Op::Not),
        right: None,
    }
}

/// Left-fold predicates with AND, keeping their order.
pub(crate) fn fold_and(preds: &[Predicate]) -> Option<Predicate> {
    let (first, rest) = preds.split_first()?;
    Some(
        rest.iter()
            .cloned()
            .fold(first.clone(), |acc, p| acc.and(p)),
    )
}

/// Aggregate functions usable in select lists and HAVING.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    Avg,
    Max,
    Min,
    Count,
    Sum,
}

impl AggregateFn {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFn::Avg => "AVG",
            AggregateFn::Max => "MAX",
            AggregateFn::Min => "MIN",
            AggregateFn::Count => "COUNT",
            AggregateFn::Sum => "SUM",
        }
    }
}

/// `FN(column)`, optionally aliased in a select list.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub(crate) func: AggregateFn,
    pub(crate) arg: Column,
    pub(crate) alias: Option<String>,
}

fn aggregate(func: AggregateFn, arg: impl Into<Column>) -> Aggregate {
    Aggregate {
        func,
        arg: arg.into(),
        alias: None,
    }
}

pub fn avg(column: impl Into<Column>) -> Aggregate {
    aggregate(AggregateFn::Avg, column)
}

pub fn max(column: impl Into<Column>) -> Aggregate {
    aggregate(AggregateFn::Max, column)
}

pub fn min(column: impl Into<Column>) -> Aggregate {
    aggregate(AggregateFn::Min, column)
}

pub fn count(column: impl Into<Column>) -> Aggregate {
    aggregate(AggregateFn::Count, column)
}

pub fn sum(column: impl Into<Column>) -> Aggregate {
    aggregate(AggregateFn::Sum, column)
}

impl Aggregate {
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn eq(self, arg: impl IntoExpr) -> Predicate {
        Predicate::binary(Expr::Aggregate(self), Op::Eq, arg.into_expr())
    }

    pub fn lt(self, arg: impl IntoExpr) -> Predicate {
        Predicate::binary(Expr::Aggregate(self), Op::Lt, arg.into_expr())
    }

    pub fn gt(self, arg: impl IntoExpr) -> Predicate {
        Predicate::binary(Expr::Aggregate(self), Op::Gt, arg.into_expr())
    }

    pub fn as_predicate(self) -> Predicate {
        Predicate::unary(Expr::Aggregate(self))
    }
}

/// A literal SQL fragment with `?` placeholders and their arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExpr {
    pub(crate) sql: String,
    pub(crate) args: Vec<Value>,
}

/// Embed `sql` verbatim; `args` are appended to the statement arguments in order.
pub fn raw<I, V>(sql: impl Into<String>, args: I) -> RawExpr
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    RawExpr {
        sql: sql.into(),
        args: args.into_iter().map(Into::into).collect(),
    }
}

impl RawExpr {
    pub fn as_predicate(self) -> Predicate {
        Predicate::unary(Expr::Raw(self))
    }
}

/// Nodes allowed in a SELECT column list.
#[derive(Debug, Clone, PartialEq)]
pub enum Selectable {
    Column(Column),
    Aggregate(Aggregate),
    Raw(RawExpr),
}

impl From<Column> for Selectable {
    fn from(c: Column) -> Self {
        Selectable::Column(c)
    }
}

impl From<Aggregate> for Selectable {
    fn from(a: Aggregate) -> Self {
        Selectable::Aggregate(a)
    }
}

impl From<RawExpr> for Selectable {
    fn from(r: RawExpr) -> Self {
        Selectable::Raw(r)
    }
}

/// `column = value` inside an upsert action list.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub(crate) column: String,
    pub(crate) value: Value,
}

/// Nodes allowed in an upsert action list.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignable {
    /// Set the column to a bound value.
    Assignment(Assignment),
    /// Set the column to the value the rejected row carried.
    Column(Column),
}

/// Build an upsert action `column = value`.
pub fn assign(column: impl Into<String>, value: impl Into<Value>) -> Assignable {
    Assignable::Assignment(Assignment {
        column: column.into(),
        value: value.into(),
    })
}

impl From<Column> for Assignable {
    fn from(c: Column) -> Self {
        Assignable::Column(c)
    }
}

impl From<Assignment> for Assignable {
    fn from(a: Assignment) -> Self {
        Assignable::Assignment(a)
    }
}

/// Conversion into an expression operand.
///
/// Expression nodes pass through; scalars are wrapped as [`Expr::Value`].
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for Column {
    fn into_expr(self) -> Expr {
        Expr::Column(self)
    }
}

impl IntoExpr for Predicate {
    fn into_expr(self) -> Expr {
        Expr::Predicate(self)
    }
}

impl IntoExpr for Aggregate {
    fn into_expr(self) -> Expr {
        Expr::Aggregate(self)
    }
}

impl IntoExpr for RawExpr {
    fn into_expr(self) -> Expr {
        Expr::Raw(self)
    }
}

impl IntoExpr for Value {
    fn into_expr(self) -> Expr {
        Expr::Value(self)
    }
}

impl<T: Into<Value>> IntoExpr for Option<T> {
    fn into_expr(self) -> Expr {
        Expr::Value(self.into())
    }
}

macro_rules! impl_into_expr_scalar {
    ($($ty:ty),*) => {
        $(
            impl IntoExpr for $ty {
                fn into_expr(self) -> Expr {
                    Expr::Value(Value::from(self))
                }
            }
        )*
    };
}

impl_into_expr_scalar!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    String,
    &str,
    Vec<u8>,
    Uuid,
    NaiveDateTime,
    serde_json::Value
);
