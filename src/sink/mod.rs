//! Destination stores for cleaned tables

mod sqlite;

use std::path::Path;

use crate::error::Result;
use crate::model::Table;

pub use sqlite::SqliteSink;

/// Trait for stores that receive a finished table
pub trait TableSink {
    /// Replace `table_name` with the contents of `table`; returns rows written
    fn write(&mut self, table: &Table, table_name: &str) -> Result<usize>;
}

/// Write `table` into `table_name` of the SQLite database at `store`
pub fn save(table: &Table, store: &Path, table_name: &str) -> Result<usize> {
    SqliteSink::open(store)?.write(table, table_name)
}
