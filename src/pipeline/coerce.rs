//! Type coercions for text-encoded booleans, percentages and prices

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;

use crate::error::{EtlError, Result};
use crate::model::{CellValue, Table};

static CURRENCY_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[$, ]").unwrap());
static ALPHABETIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]").unwrap());

/// Parse `"$1,234.50"` style text
pub fn parse_currency(text: &str) -> Option<f64> {
    CURRENCY_NOISE.replace_all(text, "").trim().parse().ok()
}

/// Parse `"45.0%"` style text into a fraction
pub fn parse_percentage(text: &str) -> Option<f64> {
    text.replace('%', "").trim().parse::<f64>().ok().map(|v| v / 100.0)
}

/// Whether the column's distinct values include both `t` and `f`
pub fn has_boolean_letters(table: &Table, index: usize) -> bool {
    let distinct: FxHashSet<&str> = table.values(index).filter_map(CellValue::as_str).collect();
    distinct.contains("t") && distinct.contains("f")
}

/// Replace `t` with 1 and `f` with 0, leaving every other value as is
pub fn coerce_boolean_letters(table: &mut Table, index: usize) {
    let values = table
        .values(index)
        .map(|cell| match cell.as_str() {
            Some("t") => CellValue::Int(1),
            Some("f") => CellValue::Int(0),
            _ => cell.clone(),
        })
        .collect();
    table.set_column(index, values);
}

/// Whether a text column holds prices: some value mentions `$` and no
/// value contains a letter.
pub fn is_price_column(table: &Table, index: usize) -> bool {
    let mut has_dollar = false;
    for text in table.values(index).filter_map(CellValue::as_str) {
        if ALPHABETIC.is_match(text) {
            return false;
        }
        has_dollar |= text.contains('$');
    }
    has_dollar
}

/// Convert `"$N,NNN.NN"` text to floats
pub fn coerce_currency(table: &mut Table, index: usize) -> Result<()> {
    map_text_cells(table, index, parse_currency)
}

/// Convert `"NN%"` text to fractions in [0, 1]
pub fn coerce_percentage(table: &mut Table, index: usize) -> Result<()> {
    map_text_cells(table, index, parse_percentage)
}

/// Re-parse every text value of a column through `parse`.
/// Cells that already hold numbers are kept as they are, whatever else the
/// column holds, so an all-numeric column passes through unchanged.
fn map_text_cells<F>(table: &mut Table, index: usize, mut parse: F) -> Result<()>
where
    F: FnMut(&str) -> Option<f64>,
{
    let column = &table.columns[index];
    if column.inferred_type.is_numeric() {
        return Ok(());
    }
    let name = column.name.clone();

    let values = table
        .values(index)
        .map(|cell| {
            if cell.is_null() {
                return Ok(CellValue::Null);
            }
            if cell.as_f64().is_some() {
                return Ok(cell.clone());
            }
            let text = cell.display();
            parse(&text)
                .map(CellValue::Float)
                .ok_or_else(|| EtlError::InvalidNumber {
                    column: name.clone(),
                    value: text.into_owned(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    table.set_column(index, values);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellType, Column};

    fn single_column(name: &str, values: Vec<CellValue>) -> Table {
        let mut table = Table::new(vec![Column::new(name)]);
        for value in values {
            table.add_row(vec![value]);
        }
        table.infer_column_types();
        table
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("$1,234.50"), Some(1234.50));
        assert_eq!(parse_currency("$0"), Some(0.0));
        assert_eq!(parse_currency("$ 85.00"), Some(85.0));
        assert_eq!(parse_currency("call host"), None);
    }

    #[test]
    fn test_parse_percentage() {
        assert_eq!(parse_percentage("45.0%"), Some(0.45));
        assert_eq!(parse_percentage("100%"), Some(1.0));
        assert_eq!(parse_percentage("n/a"), None);
    }

    #[test]
    fn test_boolean_letters_need_both() {
        let both = single_column("b", vec!["t".into(), "f".into(), CellValue::Null]);
        assert!(has_boolean_letters(&both, 0));

        let only_t = single_column("b", vec!["t".into(), "t".into()]);
        assert!(!has_boolean_letters(&only_t, 0));

        let mixed = single_column("b", vec!["t".into(), "f".into(), "maybe".into()]);
        assert!(has_boolean_letters(&mixed, 0));
    }

    #[test]
    fn test_coerce_boolean_letters() {
        let mut table = single_column("b", vec!["t".into(), "f".into(), CellValue::Null]);
        coerce_boolean_letters(&mut table, 0);
        let values: Vec<_> = table.values(0).cloned().collect();
        assert_eq!(values, vec![CellValue::Int(1), CellValue::Int(0), CellValue::Null]);
        assert_eq!(table.columns[0].inferred_type, CellType::Int);

        // Second pass over a numeric column changes nothing
        assert!(!has_boolean_letters(&table, 0));
        coerce_boolean_letters(&mut table, 0);
        let again: Vec<_> = table.values(0).cloned().collect();
        assert_eq!(again, values);
    }

    #[test]
    fn test_price_detection() {
        let prices = single_column("p", vec!["$1,000.00".into(), CellValue::Null, "$5".into()]);
        assert!(is_price_column(&prices, 0));

        let prose = single_column("d", vec!["Costs $5 per night".into(), "$5".into()]);
        assert!(!is_price_column(&prose, 0));

        let no_dollar = single_column("z", vec!["12 34".into()]);
        assert!(!is_price_column(&no_dollar, 0));
    }

    #[test]
    fn test_coerce_currency_and_errors() {
        let mut table = single_column("price", vec!["$1,234.50".into(), CellValue::Null]);
        coerce_currency(&mut table, 0).unwrap();
        assert_eq!(table.rows[0].cells[0], CellValue::Float(1234.5));
        assert!(table.rows[1].cells[0].is_null());
        assert_eq!(table.columns[0].inferred_type, CellType::Float);

        let mut bad = single_column("price", vec!["$12".into(), "$1.2.3".into()]);
        let err = coerce_currency(&mut bad, 0).unwrap_err();
        assert!(matches!(err, EtlError::InvalidNumber { ref column, .. } if column == "price"));
    }

    #[test]
    fn test_coerce_percentage() {
        let mut table = single_column(
            "host_response_rate",
            vec!["45.0%".into(), "100%".into(), CellValue::Null],
        );
        coerce_percentage(&mut table, 0).unwrap();
        let values: Vec<_> = table.values(0).cloned().collect();
        assert_eq!(
            values,
            vec![CellValue::Float(0.45), CellValue::Float(1.0), CellValue::Null]
        );
    }

    #[test]
    fn test_numeric_column_untouched() {
        let mut table = single_column("review_scores_rating", vec![95i64.into(), 80i64.into()]);
        coerce_percentage(&mut table, 0).unwrap();
        assert_eq!(table.rows[0].cells[0], CellValue::Int(95));
    }

    #[test]
    fn test_numbers_in_text_column_untouched() {
        let mut table = single_column("host_response_rate", vec!["45%".into(), 45i64.into()]);
        coerce_percentage(&mut table, 0).unwrap();
        let values: Vec<_> = table.values(0).cloned().collect();
        assert_eq!(values, vec![CellValue::Float(0.45), CellValue::Int(45)]);
        assert_eq!(table.columns[0].inferred_type, CellType::Float);
    }
}
