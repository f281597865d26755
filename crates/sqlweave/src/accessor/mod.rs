//! Record field access by declared name.
//!
//! Two interchangeable strategies back argument extraction (INSERT values) and
//! row population (SELECT results):
//!
//! - [`ReflectAccessor`] introspects the record through its serde
//!   representation.
//! - [`DirectAccessor`] calls the getter/setter table generated by
//!   `#[derive(Entity)]`, with no intermediate representation.
//!
//! Both produce the same record state for the same row.

mod direct;
mod reflect;


pub use direct::DirectAccessor;
pub use reflect::ReflectAccessor;

use crate::error::{OrmError, OrmResult};
use crate::model::{Entity, Field, Model};
use crate::row::RowCursor;
use crate::value::Value;

/// Reads and writes record fields using a record's [`Model`].
pub trait Accessor {
    /// Value of the field declared as `name`.
    fn field<T: Entity>(&self, model: &Model, record: &T, name: &str) -> OrmResult<Value>;

    /// Decode the cursor's current row into `record`, matching result columns
    /// to fields by column name. Fields without a column are left untouched.
    fn populate<T: Entity>(
        &self,
        model: &Model,
        record: &mut T,
        rows: &mut dyn RowCursor,
    ) -> OrmResult<()>;
}

/// Selects the accessor strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessorKind {
    /// Serde-based introspection.
    Reflect,
    /// Generated getter/setter table.
    #[default]
    Direct,
}

impl Accessor for AccessorKind {
    fn field<T: Entity>(&self, model: &Model, record: &T, name: &str) -> OrmResult<Value> {
        match self {
            AccessorKind::Reflect => ReflectAccessor.field(model, record, name),
            AccessorKind::Direct => DirectAccessor.field(model, record, name),
        }
    }

    fn populate<T: Entity>(
        &self,
        model: &Model,
        record: &mut T,
        rows: &mut dyn RowCursor,
    ) -> OrmResult<()> {
        match self {
            AccessorKind::Reflect => ReflectAccessor.populate(model, record, rows),
            AccessorKind::Direct => DirectAccessor.populate(model, record, rows),
        }
    }
}

/// Map every result column to its field, in result order.
fn resolve_columns<'m>(model: &'m Model, columns: &[String]) -> OrmResult<Vec<&'m Field>> {
    if columns.len() > model.fields().len() {
        return Err(OrmError::TooManyReturnedColumns {
            got: columns.len(),
            expected: model.fields().len(),
        });
    }
    columns
        .iter()
        .map(|column| model.resolve_column(column))
        .collect()
}
