//! CSV file parser

use std::borrow::Cow;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{EtlError, Result};
use crate::model::{CellType, CellValue, Column, Table};

use super::Parser;

/// Tokens read as missing values
const NULL_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A",
];

/// Parser for comma-separated files with a header row
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path) -> Result<Table> {
        let input_error = |source: csv::Error| EtlError::InputRead {
            path: path.to_path_buf(),
            source: source.into(),
        };
        let malformed = |reason: String| EtlError::InputRead {
            path: path.to_path_buf(),
            source: reason.into(),
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(input_error)?;

        // Read headers
        let headers = csv_reader.headers().map_err(input_error)?.clone();
        if headers.is_empty() {
            return Err(malformed("no columns to parse".to_string()));
        }

        let columns: Vec<Column> = unique_headers(headers.iter())
            .into_iter()
            .map(Column::new)
            .collect();
        let width = columns.len();

        let mut table = Table::new(columns);

        // Read rows; short rows are padded, long rows are an error
        let mut records = Vec::new();
        for result in csv_reader.records() {
            let record = result.map_err(input_error)?;
            if record.len() > width {
                let line = record.position().map_or(0, |p| p.line());
                return Err(malformed(format!(
                    "expected {} fields in line {}, saw {}",
                    width,
                    line,
                    record.len()
                )));
            }

            table.add_row(record.iter().map(parse_cell_value).collect());
            records.push(record);
        }

        table.infer_column_types();
        restore_text_columns(&mut table, &records);

        Ok(table)
    }
}

/// Columns that hold any text keep every present cell as its raw text,
/// so a value like `02134` next to `02134-1234` is not read as a number.
fn restore_text_columns(table: &mut Table, records: &[csv::StringRecord]) {
    let text_columns: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c.inferred_type, CellType::String | CellType::Mixed))
        .map(|(i, _)| i)
        .collect();

    for index in text_columns {
        let values = table
            .values(index)
            .zip(records)
            .map(|(cell, record)| match record.get(index) {
                Some(raw) if !cell.is_null() => CellValue::from(raw),
                _ => cell.clone(),
            })
            .collect();
        table.set_column(index, values);
    }
}

/// Suffix repeated header names with `.1`, `.2`, ... so every column stays addressable
fn unique_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let headers: Vec<&str> = headers.collect();
    let mut used: FxHashSet<String> = FxHashSet::default();
    let mut repeats: FxHashMap<&str, usize> = FxHashMap::default();
    let mut names = Vec::with_capacity(headers.len());

    for header in headers {
        let mut name = header.to_string();
        if used.contains(&name) {
            let count = repeats.entry(header).or_insert(0);
            loop {
                *count += 1;
                name = format!("{}.{}", header, count);
                if !used.contains(&name) {
                    break;
                }
            }
        }
        used.insert(name.clone());
        names.push(name);
    }
    names
}

/// Parse a string value into a CellValue with type inference
fn parse_cell_value(s: &str) -> CellValue {
    let trimmed = s.trim();

    // Check for empty/null
    if trimmed.is_empty() || NULL_TOKENS.contains(&trimmed) {
        return CellValue::Null;
    }

    // Try parsing as boolean
    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }

    // Try parsing as integer
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }

    // Try parsing as float
    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float(f);
    }

    // Keep the raw text; coercions match on exact field content
    CellValue::String(Cow::Owned(s.to_string()))
}
