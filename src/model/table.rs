//! Table, Row, and Cell data structures

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime};

use super::schema::{CellType, Column};
use crate::error::{EtlError, Result};

static NULL_CELL: CellValue = CellValue::Null;

/// A cell value with type information
#[derive(Debug, Clone)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Cow<'static, str>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (CellValue::String(a), CellValue::String(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a == b,
            // Cross-type numeric comparison
            (CellValue::Int(a), CellValue::Float(b)) => (*a as f64) == *b,
            (CellValue::Float(a), CellValue::Int(b)) => *a == (*b as f64),
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl CellValue {
    /// Check if the value is missing. Float NaN counts as missing.
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Borrow the text of a string cell
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Type of this individual value
    pub fn cell_type(&self) -> CellType {
        match self {
            CellValue::Null => CellType::Null,
            CellValue::Bool(_) => CellType::Bool,
            CellValue::Int(_) => CellType::Int,
            CellValue::Float(_) => CellType::Float,
            CellValue::String(_) => CellType::String,
            CellValue::Date(_) => CellType::Date,
            CellValue::DateTime(_) => CellType::DateTime,
        }
    }

    /// Convert to a display string
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed("NULL"),
            CellValue::Bool(b) => Cow::Owned(b.to_string()),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Float(f) => Cow::Owned(f.to_string()),
            CellValue::String(s) => Cow::Borrowed(s.as_ref()),
            CellValue::Date(d) => Cow::Owned(d.to_string()),
            CellValue::DateTime(dt) => Cow::Owned(dt.to_string()),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(Cow::Owned(s.to_string()))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(Cow::Owned(s))
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

/// A row in the table
#[derive(Debug, Clone)]
pub struct Row {
    /// Cell values in column order
    pub cells: Vec<CellValue>,
}

impl Row {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// A table containing columns and rows
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// All rows in the table
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table with column definitions
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Add a row to the table, padding short rows with nulls
    pub fn add_row(&mut self, mut cells: Vec<CellValue>) {
        if cells.len() < self.column_count() {
            cells.resize(self.column_count(), CellValue::Null);
        }
        self.rows.push(Row::new(cells));
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Index of a column the caller cannot do without
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| EtlError::MissingColumn(name.to_string()))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Iterate over the values of one column
    pub fn values(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).unwrap_or(&NULL_CELL))
    }

    /// Append a column; `values` is truncated or null-padded to the row count
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<CellValue>) {
        let mut values = values.into_iter();
        for row in &mut self.rows {
            row.cells.push(values.next().unwrap_or(CellValue::Null));
        }
        self.columns.push(Column::new(name));
        self.infer_column_type(self.columns.len() - 1);
    }

    /// Replace a column's values in place, keeping its position
    pub fn set_column(&mut self, index: usize, values: Vec<CellValue>) {
        let mut values = values.into_iter();
        for row in &mut self.rows {
            if let Some(cell) = row.cells.get_mut(index) {
                *cell = values.next().unwrap_or(CellValue::Null);
            }
        }
        self.infer_column_type(index);
    }

    /// Remove every column whose name is in `names`; unknown names are ignored
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.iter().any(|n| n.as_ref() == c.name))
            .collect();
        if keep.iter().all(|k| *k) {
            return;
        }

        let mut idx = 0;
        self.columns.retain(|_| {
            idx += 1;
            keep[idx - 1]
        });
        for row in &mut self.rows {
            let mut idx = 0;
            row.cells.retain(|_| {
                idx += 1;
                keep.get(idx - 1).copied().unwrap_or(false)
            });
        }
    }

    /// Rename a column; returns false when `from` does not exist
    pub fn rename_column(&mut self, from: &str, to: impl Into<String>) -> bool {
        match self.columns.iter_mut().find(|c| c.name == from) {
            Some(column) => {
                column.name = to.into();
                true
            }
            None => false,
        }
    }

    /// Build a new table holding only `names`, in the given order
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Table {
        let indices: Vec<usize> = names
            .iter()
            .filter_map(|n| self.column_index(n.as_ref()))
            .collect();

        let mut table = Table::new(indices.iter().map(|&i| self.columns[i].clone()).collect());
        for row in &self.rows {
            let cells = indices
                .iter()
                .map(|&i| row.get(i).cloned().unwrap_or(CellValue::Null))
                .collect();
            table.rows.push(Row::new(cells));
        }
        table
    }

    /// Append the rows of `other`, matching cells by column name.
    /// Columns missing from `other` are filled with nulls.
    pub fn append(&mut self, other: Table) {
        let mapping: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|c| other.column_index(&c.name))
            .collect();

        for row in other.rows {
            let mut source: Vec<Option<CellValue>> = row.cells.into_iter().map(Some).collect();
            let cells = mapping
                .iter()
                .map(|m| {
                    m.and_then(|i| source.get_mut(i).and_then(Option::take))
                        .unwrap_or(CellValue::Null)
                })
                .collect();
            self.rows.push(Row::new(cells));
        }
        self.infer_column_types();
    }

    /// Recompute the inferred type of one column from its data
    pub fn infer_column_type(&mut self, index: usize) {
        let inferred = self
            .values(index)
            .fold(CellType::Null, |acc, cell| {
                let cell_type = if cell.is_null() {
                    CellType::Null
                } else {
                    cell.cell_type()
                };
                acc.widen(cell_type)
            });

        if let Some(col) = self.columns.get_mut(index) {
            col.inferred_type = inferred;
        }
    }

    /// Recompute every column's inferred type
    pub fn infer_column_types(&mut self) {
        for col_idx in 0..self.column_count() {
            self.infer_column_type(col_idx);
        }
    }
}
