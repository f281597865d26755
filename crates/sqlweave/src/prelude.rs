//! Convenient imports for typical `sqlweave` usage.
//!
//! ```ignore
//! use sqlweave::prelude::*;
//! ```
//!
//! The aggregate constructors (`avg`, `max`, ...) are left out so they do not
//! shadow local names; import them from the crate root.

pub use crate::{
    AccessorKind, Core, Db, DbConfig, Driver, ExecResult, MySql, OrmError, OrmResult, Query,
    QueryBuilder, Sqlite, Table, Upsert, Value,
};
pub use crate::{Entity, assign, col, not, raw};
