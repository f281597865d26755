//! # sqlweave
//!
//! A model-first ORM core: typed query expressions compiled to dialect-aware SQL,
//! and result rows mapped back onto records.
//!
//! ## Features
//!
//! - **Model registry**: per-type metadata parsed once and shared (`Arc<Model>`)
//! - **Expression algebra**: columns, values, predicates, aggregates and raw fragments
//! - **SQL builders**: SELECT (joins, GROUP BY/HAVING, ORDER BY, LIMIT/OFFSET),
//!   INSERT with upsert, DELETE
//! - **Dialects**: MySQL and SQLite upsert syntax behind one [`Upsert`] value
//! - **Two field accessors**: serde-based introspection or a generated
//!   getter/setter table, with identical results
//! - **Hooks**: inspect, rewrite or refuse every statement before it runs
//!
//! ## Example
//!
//! ```ignore
//! use serde::{Deserialize, Serialize};
//! use sqlweave::{col, Core, Entity, QueryBuilder, Selector};
//!
//! #[derive(Debug, Default, Entity, Serialize, Deserialize)]
//! struct TestModel {
//!     id: i64,
//!     first_name: String,
//!     age: i8,
//! }
//!
//! let core = Core::default();
//! let query = Selector::<TestModel>::new(&core)
//!     .and_where(col("age").gt(18))
//!     .build()?;
//! assert_eq!(query.sql, "SELECT * FROM `test_model` WHERE `age` > ?;");
//! ```

// Lets `#[derive(Entity)]` output (which names `::sqlweave`) compile inside this crate.
extern crate self as sqlweave;

pub mod accessor;
pub mod builder;
pub mod db;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod hook;
pub mod model;
pub mod prelude;
pub mod query;
pub mod row;
pub mod table;
pub mod value;

pub use accessor::{Accessor, AccessorKind, DirectAccessor, ReflectAccessor};
pub use builder::{Core, Deleter, Inserter, Selector, SqlBuilder, Upsert, UpsertBuilder};
pub use db::{Db, DbConfig, Driver, ExecResult};
pub use dialect::{Dialect, MySql, Sqlite};
pub use error::{OrmError, OrmResult};
pub use expr::{
    Aggregate, AggregateFn, Assignable, Assignment, Column, Expr, IntoExpr, Op, Order, Predicate,
    RawExpr, Selectable, assign, avg, col, count, max, min, not, raw, sum,
};
pub use hook::{
    CompositeHook, DenyDeleteHook, HookAction, QueryContext, QueryHook, QueryLogHook,
    QueryOutcome, QueryType, TracingSqlHook,
};
pub use model::{
    Entity, EntityDescriptor, Field, FieldDescriptor, Model, ModelOpt, RecordShape, Registry,
    underscore_name,
};
pub use query::{Query, QueryBuilder};
pub use row::{MemoryRows, RowCursor, ScanDest};
pub use table::{Join, JoinBuilder, JoinKind, Table, TableReference};
pub use value::{FieldType, SqlType, Value, ValueError, ValueKind};

#[cfg(feature = "derive")]
pub use sqlweave_derive::Entity;
