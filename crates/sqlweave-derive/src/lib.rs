//! Derive macros for sqlweave
//!
//! Provides `#[derive(Entity)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod entity;

/// Derive the `Entity` descriptor for a struct.
///
/// # Example
///
/// ```ignore
/// use serde::{Deserialize, Serialize};
/// use sqlweave::Entity;
///
/// #[derive(Debug, Default, Entity, Serialize, Deserialize)]
/// #[orm(table = "users")]
/// struct User {
///     id: i64,
///     #[orm(column = "user_name")]
///     name: String,
///     #[orm("column=years")]
///     age: Option<i8>,
/// }
/// ```
///
/// # Generated
///
/// - `fn describe()` - field names, raw annotations, value type descriptors,
///   byte offsets, and a getter, setter and value check per field
/// - `fn table_name()` - only when `#[orm(table = "...")]` is present
///
/// # Attributes
///
/// - `#[orm(table = "name")]` - Override the table name
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm("key=value,...")]` - Raw annotation, parsed when the model is built
///
/// Every field type must implement `sqlweave::SqlType`.
#[proc_macro_derive(Entity, attributes(orm))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
