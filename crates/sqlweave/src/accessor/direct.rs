use super::{Accessor, resolve_columns};
use crate::error::{OrmError, OrmResult};
use crate::model::{AccessorTable, Entity, Field, Model, Setter};
use crate::row::{RowCursor, ScanDest};
use crate::value::{FieldType, Value};

/// Accessor that calls the getter/setter table generated for the record type.
///
/// Row values are checked against their field types as the cursor decodes
/// them and written through the setters once the whole row decoded, so a
/// failing column leaves the record untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectAccessor;

fn table_of<'m, T: Entity>(model: &'m Model) -> OrmResult<&'m AccessorTable<T>> {
    model.accessors::<T>().ok_or_else(|| {
        OrmError::Other(format!(
            "model of `{}` used to access `{}`",
            model.type_name(),
            std::any::type_name::<T>()
        ))
    })
}

impl Accessor for DirectAccessor {
    fn field<T: Entity>(&self, model: &Model, record: &T, name: &str) -> OrmResult<Value> {
        let field = model.resolve_field(name)?;
        let get = table_of::<T>(model)?
            .get(field.index)
            .ok_or_else(|| OrmError::unknown_field(name))?;
        Ok(get(record))
    }

    fn populate<T: Entity>(
        &self,
        model: &Model,
        record: &mut T,
        rows: &mut dyn RowCursor,
    ) -> OrmResult<()> {
        let table = table_of::<T>(model)?;
        let fields = resolve_columns(model, rows.columns())?;

        let mut slots = Vec::with_capacity(fields.len());
        for field in fields {
            let set = table
                .set(field.index)
                .ok_or_else(|| OrmError::unknown_field(&field.name))?;
            slots.push(RecordSlot { field, set });
        }

        let mut dest = RowValues {
            model,
            values: vec![Value::Null; slots.len()],
            slots,
        };
        rows.scan(&mut dest)?;

        for (slot, value) in dest.slots.iter().zip(dest.values) {
            (slot.set)(record, value).map_err(|e| OrmError::decode(&slot.field.column, e.to_string()))?;
        }
        Ok(())
    }
}

struct RecordSlot<'m, T> {
    field: &'m Field,
    set: Setter<T>,
}

/// Checked values of one row, written into the record after the scan.
struct RowValues<'m, T> {
    model: &'m Model,
    slots: Vec<RecordSlot<'m, T>>,
    values: Vec<Value>,
}

impl<T> ScanDest for RowValues<'_, T> {
    fn len(&self) -> usize {
        self.slots.len()
    }

    fn field_type(&self, index: usize) -> FieldType {
        self.slots[index].field.field_type
    }

    fn put(&mut self, index: usize, value: Value) -> OrmResult<()> {
        let slot = self
            .slots
            .get(index)
            .ok_or_else(|| OrmError::Other(format!("scan slot {index} out of range")))?;
        self.model.check_value(slot.field, &value)?;
        self.values[index] = value;
        Ok(())
    }
}
