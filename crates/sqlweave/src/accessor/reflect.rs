use super::{Accessor, resolve_columns};
use crate::error::{OrmError, OrmResult};
use crate::model::{Entity, Field, Model};
use crate::row::{RowCursor, ScanDest};
use crate::value::{FieldType, Value, ValueError, ValueKind};
use serde_yaml::{Mapping, Value as Member};

/// Accessor that goes through the record's serde representation.
///
/// Reading serializes the record and picks the member named after the field.
/// Populating decodes the row into typed landing slots, writes them over the
/// serialized record and deserializes the result back in place. Field names
/// must therefore match the serde member names (no `#[serde(rename)]`).
///
/// Members are held as `serde_yaml` values: unlike JSON numbers they keep
/// NaN and infinite floats.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReflectAccessor;

impl Accessor for ReflectAccessor {
    fn field<T: Entity>(&self, model: &Model, record: &T, name: &str) -> OrmResult<Value> {
        let field = model.resolve_field(name)?;
        let members = members_of(model, record)?;
        let member = members
            .get(field.name.as_str())
            .ok_or_else(|| OrmError::decode(name, "field missing from serialized record"))?;
        value_of(member, field.field_type).map_err(|e| OrmError::decode(name, e.to_string()))
    }

    fn populate<T: Entity>(
        &self,
        model: &Model,
        record: &mut T,
        rows: &mut dyn RowCursor,
    ) -> OrmResult<()> {
        let fields = resolve_columns(model, rows.columns())?;
        let mut slots = LandingSlots::new(model, fields);
        rows.scan(&mut slots)?;

        let mut members = members_of(model, &*record)?;
        for (field, value) in slots.fields.iter().zip(&slots.values) {
            let member =
                member_of(value).map_err(|e| OrmError::decode(&field.column, e.to_string()))?;
            members.insert(Member::String(field.name.clone()), member);
        }

        *record = serde_yaml::from_value(Member::Mapping(members))
            .map_err(|e| OrmError::decode(model.type_name(), e.to_string()))?;
        Ok(())
    }
}

fn members_of<T: Entity>(model: &Model, record: &T) -> OrmResult<Mapping> {
    match serde_yaml::to_value(record) {
        Ok(Member::Mapping(members)) => Ok(members),
        Ok(_) => Err(OrmError::decode(
            model.type_name(),
            "record does not serialize as a map",
        )),
        Err(e) => Err(OrmError::decode(model.type_name(), e.to_string())),
    }
}

/// The serde form of `value`, as the field's Rust type would serialize it.
fn member_of(value: &Value) -> Result<Member, serde_yaml::Error> {
    Ok(match value {
        Value::Null => Member::Null,
        Value::Bool(b) => Member::Bool(*b),
        Value::Int(i) => Member::Number((*i).into()),
        Value::Float(f) => Member::Number((*f).into()),
        Value::Text(s) => Member::String(s.clone()),
        Value::Bytes(b) => Member::Sequence(b.iter().map(|byte| Member::Number((*byte).into())).collect()),
        Value::DateTime(dt) => serde_yaml::to_value(dt)?,
        Value::Uuid(u) => Member::String(u.to_string()),
        Value::Json(j) => serde_yaml::to_value(j)?,
    })
}

/// Read a serialized member back as a value of type `ty`.
fn value_of(member: &Member, ty: FieldType) -> Result<Value, ValueError> {
    if member.is_null() && ty.kind != ValueKind::Json {
        return Value::Null.coerce(ty);
    }
    let value = match ty.kind {
        ValueKind::Bool => member.as_bool().map(Value::Bool),
        ValueKind::Int => member
            .as_i64()
            .or_else(|| member.as_u64().and_then(|u| i64::try_from(u).ok()))
            .map(Value::Int),
        ValueKind::Float => member.as_f64().map(Value::Float),
        ValueKind::Text => member.as_str().map(|s| Value::Text(s.to_string())),
        ValueKind::Bytes => member
            .as_sequence()
            .and_then(|items| {
                items
                    .iter()
                    .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
                    .collect::<Option<Vec<u8>>>()
            })
            .map(Value::Bytes),
        ValueKind::DateTime => serde_yaml::from_value(member.clone()).ok().map(Value::DateTime),
        ValueKind::Uuid => serde_yaml::from_value(member.clone()).ok().map(Value::Uuid),
        ValueKind::Json => serde_yaml::from_value(member.clone()).ok().map(Value::Json),
    };
    value.ok_or_else(|| ValueError {
        expected: ty.to_string(),
        found: format!("{member:?}"),
    })
}

/// Freshly allocated, typed slots the cursor decodes into.
struct LandingSlots<'m> {
    model: &'m Model,
    fields: Vec<&'m Field>,
    values: Vec<Value>,
}

impl<'m> LandingSlots<'m> {
    fn new(model: &'m Model, fields: Vec<&'m Field>) -> Self {
        let values = vec![Value::Null; fields.len()];
        Self {
            model,
            fields,
            values,
        }
    }
}

impl ScanDest for LandingSlots<'_> {
    fn len(&self) -> usize {
        self.fields.len()
    }

    fn field_type(&self, index: usize) -> FieldType {
        self.fields[index].field_type
    }

    fn put(&mut self, index: usize, value: Value) -> OrmResult<()> {
        let field = self
            .fields
            .get(index)
            .ok_or_else(|| OrmError::Other(format!("scan slot {index} out of range")))?;
        self.model.check_value(field, &value)?;
        self.values[index] = value;
        Ok(())
    }
}
