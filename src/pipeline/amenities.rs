//! Indicator expansion of brace-delimited multi-value columns

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::CollisionPolicy;
use crate::error::{EtlError, Result};
use crate::model::{CellValue, Table};

static LIST_DELIMITERS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[{}"]"#).unwrap());

const TOKEN_SEPARATOR: char = ',';

/// Remove braces and quotes: `{"Wifi","Kitchen"}` becomes `Wifi,Kitchen`
pub fn strip_list_delimiters(text: &str) -> String {
    LIST_DELIMITERS.replace_all(text, "").into_owned()
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(TOKEN_SEPARATOR).filter(|t| !t.is_empty())
}

/// Append one 0/1 indicator column per distinct token of `column`.
///
/// The source column keeps its delimiter-stripped text unless `drop_source`
/// is set. Indicators are appended in token order; missing source values
/// get 0 everywhere. Returns the names of the appended columns.
pub fn expand_indicators(
    table: &mut Table,
    column: &str,
    policy: CollisionPolicy,
    drop_source: bool,
) -> Result<Vec<String>> {
    let index = table.require_column(column)?;

    let cleaned: Vec<Option<String>> = table
        .values(index)
        .map(|cell| (!cell.is_null()).then(|| strip_list_delimiters(&cell.display())))
        .collect();

    let distinct: BTreeSet<&str> = cleaned.iter().flatten().flat_map(|t| tokens(t)).collect();

    let mut names = Vec::with_capacity(distinct.len());
    let mut indicators = Vec::with_capacity(distinct.len());
    for token in &distinct {
        let name = indicator_name(table, &names, token, policy)?;
        let values = cleaned
            .iter()
            .map(|text| {
                let present = text.as_deref().is_some_and(|t| tokens(t).any(|x| x == *token));
                CellValue::Int(present as i64)
            })
            .collect::<Vec<_>>();
        names.push(name);
        indicators.push(values);
    }

    let source = cleaned
        .iter()
        .map(|text| CellValue::from(text.clone()))
        .collect();
    table.set_column(index, source);

    for (name, values) in names.iter().zip(indicators) {
        table.push_column(name.clone(), values);
    }
    if drop_source {
        table.drop_columns(&[column]);
    }

    debug!(column, indicators = names.len(), "expanded indicator columns");
    Ok(names)
}

/// Pick a free column name for `token` according to `policy`
fn indicator_name(
    table: &Table,
    pending: &[String],
    token: &str,
    policy: CollisionPolicy,
) -> Result<String> {
    // SQLite column names are case-insensitive
    let taken = |name: &str| {
        table
            .column_names()
            .into_iter()
            .chain(pending.iter().map(String::as_str))
            .any(|existing| existing.eq_ignore_ascii_case(name))
    };

    if !taken(token) {
        return Ok(token.to_string());
    }

    match policy {
        CollisionPolicy::Error => Err(EtlError::ColumnCollision(token.to_string())),
        CollisionPolicy::Rename => {
            let mut suffix = 1;
            loop {
                let candidate = format!("{}.{}", token, suffix);
                if !taken(&candidate) {
                    warn!(token, renamed = %candidate, "indicator column renamed to avoid collision");
                    return Ok(candidate);
                }
                suffix += 1;
            }
        }
    }
}
