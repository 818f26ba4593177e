//! Parser layer for reading tabular input files

mod csv;

use std::path::Path;

use crate::error::Result;
use crate::model::Table;

pub use self::csv::CsvParser;

/// Trait for parsing tabular data files
pub trait Parser {
    /// Parse a file and return a Table
    fn parse(&self, path: &Path) -> Result<Table>;
}

/// Read a CSV export into a table
pub fn read_table(path: &Path) -> Result<Table> {
    CsvParser.parse(path)
}
