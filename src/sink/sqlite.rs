//! SQLite table sink

use std::path::Path;

use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use crate::error::Result;
use crate::model::{CellType, CellValue, Table};

use super::TableSink;

/// Writes tables into a SQLite database, replacing same-named tables
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Open or create the database file at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl TableSink for SqliteSink {
    fn write(&mut self, table: &Table, table_name: &str) -> Result<usize> {
        let name = quote_identifier(table_name);
        let column_defs: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_identifier(&c.name), sql_type(c.inferred_type)))
            .collect();
        let placeholders = vec!["?"; table.column_count()].join(", ");

        let tx = self.conn.transaction()?;
        tx.execute(&format!("DROP TABLE IF EXISTS {}", name), [])?;
        tx.execute(
            &format!("CREATE TABLE {} ({})", name, column_defs.join(", ")),
            [],
        )?;
        {
            let mut insert =
                tx.prepare(&format!("INSERT INTO {} VALUES ({})", name, placeholders))?;
            for row in &table.rows {
                insert.execute(params_from_iter(row.cells.iter()))?;
            }
        }
        tx.commit()?;

        debug!(table = table_name, rows = table.row_count(), "table replaced");
        Ok(table.row_count())
    }
}

/// Column affinity for an inferred cell type
fn sql_type(cell_type: CellType) -> &'static str {
    match cell_type {
        CellType::Int | CellType::Bool => "INTEGER",
        CellType::Float | CellType::Null => "REAL",
        CellType::Date => "DATE",
        CellType::DateTime => "TIMESTAMP",
        CellType::String | CellType::Mixed => "TEXT",
    }
}

/// Double-quote an identifier, doubling embedded quotes
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl ToSql for CellValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            CellValue::Null => Value::Null,
            CellValue::Bool(b) => Value::Integer(*b as i64),
            CellValue::Int(i) => Value::Integer(*i),
            CellValue::Float(f) if f.is_nan() => Value::Null,
            CellValue::Float(f) => Value::Real(*f),
            CellValue::String(s) => return Ok(ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes()))),
            CellValue::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
            CellValue::DateTime(dt) => Value::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        };
        Ok(ToSqlOutput::Owned(value))
    }
}
