//! Statement hooks for the execution path.
//!
//! Hooks see every statement [`Db`](crate::Db) sends to its driver. They can
//! log it, rewrite its SQL or refuse it.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlweave::{Db, DenyDeleteHook, TracingSqlHook};
//!
//! let db = Db::new(driver)
//!     .with_hook(TracingSqlHook::new())
//!     .with_hook(DenyDeleteHook);
//! ```

mod builtin;
mod tracing_hook;
mod types;


pub use builtin::{CompositeHook, DenyDeleteHook, QueryLogHook};
pub use tracing_hook::TracingSqlHook;
pub use types::{HookAction, QueryContext, QueryHook, QueryOutcome, QueryType};

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
