//! SQL dialects.
//!
//! A dialect supplies the identifier quote character and renders the upsert
//! clause, the only statement part whose syntax differs between backends.

use crate::builder::{SqlBuilder, Upsert};
use crate::error::{OrmError, OrmResult};
use crate::expr::{Assignable, Column};

/// Backend-specific rendering.
pub trait Dialect: Send + Sync {
    /// Dialect name, used in logs.
    fn name(&self) -> &'static str;

    /// Character surrounding quoted identifiers.
    fn quote_char(&self) -> char;

    /// Append the conflict clause for `upsert` after `INSERT ... VALUES (...)`.
    fn render_upsert(&self, b: &mut SqlBuilder<'_>, upsert: &Upsert) -> OrmResult<()>;
}

/// MySQL / MariaDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

/// SQLite 3.24+.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

/// Resolve an upsert column entry to its column name.
///
/// Columns qualified by a table cannot be assigned in an upsert.
fn upsert_column(b: &SqlBuilder<'_>, column: &Column) -> OrmResult<String> {
    if column.table().is_some() {
        return Err(OrmError::UnsupportedAssignableType(format!(
            "column `{}` qualified by a table",
            column.name()
        )));
    }
    Ok(b.model().resolve_field(column.name())?.column.clone())
}

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn render_upsert(&self, b: &mut SqlBuilder<'_>, upsert: &Upsert) -> OrmResult<()> {
        b.write_str(" ON DUPLICATE KEY UPDATE ");
        for (i, assign) in upsert.assigns().iter().enumerate() {
            if i > 0 {
                b.write_char(',');
            }
            match assign {
                Assignable::Assignment(a) => {
                    b.quote_field(&a.column)?;
                    b.write_str("=?");
                    b.add_arg(a.value.clone());
                }
                Assignable::Column(c) => {
                    let column = upsert_column(b, c)?;
                    b.quote(&column);
                    b.write_str("=VALUES(");
                    b.quote(&column);
                    b.write_char(')');
                }
            }
        }
        Ok(())
    }
}

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn render_upsert(&self, b: &mut SqlBuilder<'_>, upsert: &Upsert) -> OrmResult<()> {
        b.write_str(" ON CONFLICT");
        let target = upsert.conflict_target();
        if !target.is_empty() {
            b.write_char('(');
            for (i, name) in target.iter().enumerate() {
                if i > 0 {
                    b.write_char(',');
                }
                b.quote_field(name)?;
            }
            b.write_char(')');
        }
        b.write_str(" DO UPDATE SET ");
        for (i, assign) in upsert.assigns().iter().enumerate() {
            if i > 0 {
                b.write_char(',');
            }
            match assign {
                Assignable::Assignment(a) => {
                    b.quote_field(&a.column)?;
                    b.write_str("=?");
                    b.add_arg(a.value.clone());
                }
                Assignable::Column(c) => {
                    let column = upsert_column(b, c)?;
                    b.quote(&column);
                    b.write_str("=excluded.");
                    b.quote(&column);
                }
            }
        }
        Ok(())
    }
}
