//! INSERT query builder with dialect-rendered upsert.

use super::{Core, SqlBuilder};
use crate::accessor::Accessor;
use crate::error::{OrmError, OrmResult};
use crate::expr::Assignable;
use crate::model::Entity;
use crate::query::{Query, QueryBuilder};

/// Conflict handling appended to an INSERT.
///
/// The same value renders as `ON DUPLICATE KEY UPDATE` under MySQL and as
/// `ON CONFLICT ... DO UPDATE SET` under SQLite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Upsert {
    pub(crate) assigns: Vec<Assignable>,
    pub(crate) conflict_columns: Vec<String>,
}

impl Upsert {
    /// Upsert applying `assigns` on conflict.
    pub fn new<I, A>(assigns: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Assignable>,
    {
        Self {
            assigns: assigns.into_iter().map(Into::into).collect(),
            conflict_columns: Vec::new(),
        }
    }

    /// Conflict target, by declared field name. Ignored by MySQL.
    pub fn conflict_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conflict_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn assigns(&self) -> &[Assignable] {
        &self.assigns
    }

    pub fn conflict_target(&self) -> &[String] {
        &self.conflict_columns
    }
}

/// INSERT builder for record type `T`.
pub struct Inserter<'a, T> {
    pub(crate) core: &'a Core,
    values: Vec<T>,
    columns: Vec<String>,
    upsert: Option<Upsert>,
}

impl<'a, T: Entity> Inserter<'a, T> {
    pub fn new(core: &'a Core) -> Self {
        Self {
            core,
            values: Vec::new(),
            columns: Vec::new(),
            upsert: None,
        }
    }

    /// Add one record.
    pub fn value(mut self, record: T) -> Self {
        self.values.push(record);
        self
    }

    /// Add records; each becomes one `(?,...)` tuple.
    pub fn values(mut self, records: impl IntoIterator<Item = T>) -> Self {
        self.values.extend(records);
        self
    }

    /// Insert only these fields, by declared name, in this order.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Start describing the conflict action.
    pub fn on_duplicate_key(self) -> UpsertBuilder<'a, T> {
        UpsertBuilder {
            inserter: self,
            conflict_columns: Vec::new(),
        }
    }

    /// Attach a prepared upsert.
    pub fn upsert(mut self, upsert: Upsert) -> Self {
        self.upsert = Some(upsert);
        self
    }
}

impl<T: Entity> QueryBuilder for Inserter<'_, T> {
    fn build(&self) -> OrmResult<Query> {
        if self.values.is_empty() {
            return Err(OrmError::EmptyInsert);
        }

        let model = self.core.model::<T>()?;
        let fields = if self.columns.is_empty() {
            model.fields().iter().collect::<Vec<_>>()
        } else {
            self.columns
                .iter()
                .map(|name| model.resolve_field(name))
                .collect::<OrmResult<Vec<_>>>()?
        };

        let mut b = SqlBuilder::new(self.core, model.clone());
        b.write_str("INSERT INTO ");
        b.quote(model.table_name());
        b.write_char('(');
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                b.write_char(',');
            }
            b.quote(&field.column);
        }
        b.write_str(") VALUES ");

        let accessor = self.core.accessor();
        for (row, record) in self.values.iter().enumerate() {
            if row > 0 {
                b.write_char(',');
            }
            b.write_char('(');
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    b.write_char(',');
                }
                b.write_char('?');
                b.add_arg(accessor.field(&model, record, &field.name)?);
            }
            b.write_char(')');
        }

        if let Some(upsert) = &self.upsert {
            self.core.dialect().render_upsert(&mut b, upsert)?;
        }

        Ok(b.finish())
    }
}

/// Collects the conflict target before the update actions.
pub struct UpsertBuilder<'a, T> {
    inserter: Inserter<'a, T>,
    conflict_columns: Vec<String>,
}

impl<'a, T: Entity> UpsertBuilder<'a, T> {
    /// Conflict target, by declared field name. Ignored by MySQL.
    pub fn conflict_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conflict_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Finish the upsert with its update actions.
    pub fn update<I, A>(self, assigns: I) -> Inserter<'a, T>
    where
        I: IntoIterator<Item = A>,
        A: Into<Assignable>,
    {
        let upsert = Upsert::new(assigns).conflict_columns(self.conflict_columns);
        self.inserter.upsert(upsert)
    }
}
