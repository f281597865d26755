//! Row cursor contract and an in-memory cursor.
//!
//! Drivers hand results to the accessors through [`RowCursor`]. The accessor
//! decides where decoded values land by passing a [`ScanDest`]; the cursor
//! decides how to decode, using each slot's [`FieldType`].

use crate::error::{OrmError, OrmResult};
use crate::value::{FieldType, Value};

/// A forward-only cursor over result rows.
pub trait RowCursor {
    /// Column names of every row, in result order.
    fn columns(&self) -> &[String];

    /// Advance to the next row. Returns `false` once the rows are exhausted.
    fn next(&mut self) -> bool;

    /// Decode the current row into `dest`, one slot per column, by position.
    fn scan(&mut self, dest: &mut dyn ScanDest) -> OrmResult<()>;
}

/// Destination slots for one row.
pub trait ScanDest {
    /// Number of slots.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type slot `index` expects.
    fn field_type(&self, index: usize) -> FieldType;

    /// Store the decoded value of slot `index`.
    fn put(&mut self, index: usize, value: Value) -> OrmResult<()>;
}

/// Rows held in memory.
///
/// Values are converted with [`Value::coerce`] to the type each slot expects,
/// so loosely typed results (text protocols, SQLite's dynamic typing) decode
/// the same way as exact ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryRows {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    position: Option<usize>,
}

impl MemoryRows {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            position: None,
        }
    }

    /// Append a row. Its length must match the column count at scan time.
    pub fn push_row<I, V>(&mut self, row: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Builder form of [`MemoryRows::push_row`].
    pub fn with_row<I, V>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push_row(row);
        self
    }

    /// Number of rows, independent of the cursor position.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn current(&self) -> OrmResult<&[Value]> {
        self.position
            .and_then(|i| self.rows.get(i))
            .map(Vec::as_slice)
            .ok_or_else(|| OrmError::Other("scan called without a current row".to_string()))
    }
}

impl RowCursor for MemoryRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next(&mut self) -> bool {
        let next = self.position.map_or(0, |i| i + 1);
        if next < self.rows.len() {
            self.position = Some(next);
            true
        } else {
            self.position = Some(self.rows.len());
            false
        }
    }

    fn scan(&mut self, dest: &mut dyn ScanDest) -> OrmResult<()> {
        let row = self.current()?;
        if dest.len() != self.columns.len() || row.len() != self.columns.len() {
            return Err(OrmError::Other(format!(
                "scan expects {} destinations for {} values, got {}",
                self.columns.len(),
                row.len(),
                dest.len()
            )));
        }
        for (i, (column, value)) in self.columns.iter().zip(row).enumerate() {
            let value = value
                .clone()
                .coerce(dest.field_type(i))
                .map_err(|e| OrmError::decode(column, e.to_string()))?;
            dest.put(i, value)?;
        }
        Ok(())
    }
}
