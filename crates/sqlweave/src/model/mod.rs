//! Record metadata: the [`Entity`] contract, parsed [`Model`]s and the [`Registry`] cache.
//!
//! A record type describes itself once through [`Entity::describe`] (normally
//! generated by `#[derive(Entity)]`). The registry turns that description into
//! a [`Model`] holding the table name, the ordered fields and the
//! field-name/column-name lookups every builder and accessor relies on.

mod registry;


pub use registry::{ModelOpt, Registry, underscore_name};

use crate::error::{OrmError, OrmResult};
use crate::value::{FieldType, Value, ValueError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Reads one field of a record as a [`Value`].
pub type Getter<T> = fn(&T) -> Value;

/// Writes a decoded [`Value`] into one field of a record.
pub type Setter<T> = fn(&mut T, Value) -> Result<(), ValueError>;

/// Tells whether a decoded [`Value`] fits the field's Rust type.
pub type Check = fn(&Value) -> Result<(), ValueError>;

/// A record type that can be mapped to a table.
///
/// Implemented by `#[derive(Entity)]`. The serde bounds back the
/// introspective accessor; the descriptor backs everything else.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Describe the record layout.
    fn describe() -> EntityDescriptor<Self>;

    /// Table name override. An empty string means "derive from the type name".
    fn table_name() -> &'static str {
        ""
    }
}

/// Layout of the record type behind an [`Entity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// `struct User { id: i64 }`
    Named,
    /// `struct User(i64)`
    Tuple,
    /// `struct User;`
    Unit,
}

/// Self-description of a record type.
pub struct EntityDescriptor<T> {
    pub type_name: &'static str,
    pub shape: RecordShape,
    pub fields: Vec<FieldDescriptor<T>>,
}

/// One declared field of a record type.
pub struct FieldDescriptor<T> {
    /// Declared field name.
    pub name: &'static str,
    /// Raw `key=value[,key=value]*` annotation, empty when none was given.
    pub tag: &'static str,
    pub field_type: FieldType,
    /// Byte offset within the record, as computed by the compiler.
    pub offset: usize,
    pub get: Getter<T>,
    pub set: Setter<T>,
    pub check: Check,
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("field_type", &self.field_type)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

/// Metadata of one mapped field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Column name in the table.
    pub column: String,
    /// Declared field name in the record type.
    pub name: String,
    pub field_type: FieldType,
    /// Byte offset within the record.
    pub offset: usize,
    /// Position in declaration order.
    pub index: usize,
}

/// Getter and setter per field, indexed by [`Field::index`].
pub struct AccessorTable<T> {
    getters: Vec<Getter<T>>,
    setters: Vec<Setter<T>>,
}

impl<T> AccessorTable<T> {
    pub fn get(&self, index: usize) -> Option<Getter<T>> {
        self.getters.get(index).copied()
    }

    pub fn set(&self, index: usize) -> Option<Setter<T>> {
        self.setters.get(index).copied()
    }
}

/// Parsed, immutable metadata for one record type.
pub struct Model {
    table_name: String,
    type_id: TypeId,
    type_name: &'static str,
    fields: Vec<Field>,
    field_map: HashMap<String, usize>,
    column_map: HashMap<String, usize>,
    checks: Vec<Check>,
    accessors: Arc<dyn Any + Send + Sync>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("table_name", &self.table_name)
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl Model {
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type id of the record type this model describes.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by its declared name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.field_map.get(name).map(|&i| &self.fields[i])
    }

    /// Look up a field by its column name.
    pub fn field_by_column(&self, column: &str) -> Option<&Field> {
        self.column_map.get(column).map(|&i| &self.fields[i])
    }

    /// Like [`Model::field`], failing with [`OrmError::UnknownField`].
    pub fn resolve_field(&self, name: &str) -> OrmResult<&Field> {
        self.field(name).ok_or_else(|| OrmError::unknown_field(name))
    }

    /// Like [`Model::field_by_column`], failing with [`OrmError::UnknownColumn`].
    pub fn resolve_column(&self, column: &str) -> OrmResult<&Field> {
        self.field_by_column(column)
            .ok_or_else(|| OrmError::unknown_column(column))
    }

    /// Check that `value` can be written into `field`.
    ///
    /// Failures name the field's column.
    pub fn check_value(&self, field: &Field, value: &Value) -> OrmResult<()> {
        match self.checks.get(field.index) {
            Some(check) => check(value).map_err(|e| OrmError::decode(&field.column, e.to_string())),
            None => Err(OrmError::unknown_field(&field.name)),
        }
    }

    /// The accessor table of `T`, `None` when this model was built for another type.
    pub fn accessors<T: 'static>(&self) -> Option<&AccessorTable<T>> {
        if self.type_id != TypeId::of::<T>() {
            return None;
        }
        self.accessors.downcast_ref::<AccessorTable<T>>()
    }

    /// Recompute the column lookup. Two fields on one column are rejected.
    fn rebuild_column_map(&mut self) -> OrmResult<()> {
        let mut column_map = HashMap::with_capacity(self.fields.len());
        for field in &self.fields {
            if column_map.insert(field.column.clone(), field.index).is_some() {
                return Err(OrmError::DuplicateColumn(field.column.clone()));
            }
        }
        self.column_map = column_map;
        Ok(())
    }
}

/// Parse the descriptor of `T` into a [`Model`].
fn parse_model<T: Entity>() -> OrmResult<Model> {
    let desc = T::describe();
    if desc.shape != RecordShape::Named {
        return Err(OrmError::PointerOnly(desc.type_name.to_string()));
    }

    let mut fields = Vec::with_capacity(desc.fields.len());
    let mut getters = Vec::with_capacity(desc.fields.len());
    let mut setters = Vec::with_capacity(desc.fields.len());
    let mut checks = Vec::with_capacity(desc.fields.len());
    for (index, fd) in desc.fields.into_iter().enumerate() {
        let tags = parse_tag(fd.tag)?;
        let column = match tags.get(TAG_KEY_COLUMN) {
            Some(column) if !column.is_empty() => (*column).to_string(),
            _ => underscore_name(fd.name),
        };
        fields.push(Field {
            column,
            name: fd.name.to_string(),
            field_type: fd.field_type,
            offset: fd.offset,
            index,
        });
        getters.push(fd.get);
        setters.push(fd.set);
        checks.push(fd.check);
    }

    let table_name = match T::table_name() {
        "" => underscore_name(desc.type_name),
        name => name.to_string(),
    };

    let mut field_map = HashMap::with_capacity(fields.len());
    for field in &fields {
        if field_map.insert(field.name.clone(), field.index).is_some() {
            return Err(OrmError::DuplicateField(field.name.clone()));
        }
    }
    let mut model = Model {
        table_name,
        type_id: TypeId::of::<T>(),
        type_name: desc.type_name,
        fields,
        field_map,
        column_map: HashMap::new(),
        checks,
        accessors: Arc::new(AccessorTable { getters, setters }),
    };
    model.rebuild_column_map()?;

    tracing::debug!(
        target: "sqlweave.model",
        table = %model.table_name,
        record = model.type_name,
        fields = model.fields.len(),
        "parsed model"
    );
    Ok(model)
}

/// Annotation key supplying the column name.
const TAG_KEY_COLUMN: &str = "column";

/// Split a raw annotation into its key/value pairs.
fn parse_tag(tag: &str) -> OrmResult<HashMap<&str, &str>> {
    let mut res = HashMap::new();
    if tag.is_empty() {
        return Ok(res);
    }
    for pair in tag.split(',') {
        let kv: Vec<&str> = pair.split('=').collect();
        match kv.as_slice() {
            [key, value] => {
                res.insert(*key, *value);
            }
            _ => return Err(OrmError::InvalidTagContent(pair.to_string())),
        }
    }
    Ok(res)
}
