use super::{Entity, Model, parse_model};
use crate::error::OrmResult;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Adjustment applied by [`Registry::register`] on top of the parsed model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOpt {
    /// Map the declared field `field` to `column`.
    ColumnName { field: String, column: String },
    /// Override the table name.
    TableName(String),
}

impl ModelOpt {
    pub fn column_name(field: impl Into<String>, column: impl Into<String>) -> Self {
        Self::ColumnName {
            field: field.into(),
            column: column.into(),
        }
    }

    pub fn table_name(name: impl Into<String>) -> Self {
        Self::TableName(name.into())
    }

    fn apply(self, model: &mut Model) -> OrmResult<()> {
        match self {
            ModelOpt::ColumnName { field, column } => {
                let index = model.resolve_field(&field)?.index;
                model.fields[index].column = column;
            }
            ModelOpt::TableName(name) => model.table_name = name,
        }
        Ok(())
    }
}

/// Cache of parsed models keyed by record type.
///
/// Safe to share between threads. A model is computed at most once per type
/// unless [`Registry::register`] replaces it.
#[derive(Debug, Default)]
pub struct Registry {
    models: RwLock<HashMap<TypeId, Arc<Model>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the model of `T`, parsing it on first access.
    pub fn get<T: Entity>(&self) -> OrmResult<Arc<Model>> {
        let id = TypeId::of::<T>();
        if let Some(model) = self.read().get(&id) {
            return Ok(Arc::clone(model));
        }

        let mut models = self.write();
        // Another caller may have stored it while we waited for the lock.
        if let Some(model) = models.get(&id) {
            return Ok(Arc::clone(model));
        }
        let model = Arc::new(parse_model::<T>()?);
        models.insert(id, Arc::clone(&model));
        Ok(model)
    }

    /// Parse `T` again, apply `opts` in order and store the result.
    ///
    /// Replaces any model previously cached for `T`. Nothing is stored when an
    /// option fails or two fields end up on the same column.
    pub fn register<T: Entity>(
        &self,
        opts: impl IntoIterator<Item = ModelOpt>,
    ) -> OrmResult<Arc<Model>> {
        let mut model = parse_model::<T>()?;
        for opt in opts {
            opt.apply(&mut model)?;
        }
        model.rebuild_column_map()?;
        let model = Arc::new(model);
        self.write().insert(TypeId::of::<T>(), Arc::clone(&model));
        Ok(model)
    }

    /// Number of cached models.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // The map is only ever replaced entry by entry, so a poisoned lock still
    // guards a consistent map.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<TypeId, Arc<Model>>> {
        self.models.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TypeId, Arc<Model>>> {
        self.models.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Convert a CamelCase identifier to the column/table naming convention.
///
/// Every uppercase letter except a leading one is preceded by `_`, then
/// everything is lowercased: `FirstName` becomes `first_name`, `ID` becomes
/// `i_d`. Snake-case input passes through unchanged.
pub fn underscore_name(name: &str) -> String {
    let mut buf = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i != 0 {
                buf.push('_');
            }
            buf.extend(c.to_lowercase());
        } else {
            buf.push(c);
        }
    }
    buf
}

