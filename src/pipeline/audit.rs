//! Null-ratio auditing

use tabled::settings::Style;
use tabled::{Table as TextTable, Tabled};

use crate::model::Table;

/// Default threshold of the public audit entry point
pub const DEFAULT_DROP_THRESHOLD: f64 = 0.98;

/// Threshold the listings cleaner prunes with
pub const LISTINGS_DROP_THRESHOLD: f64 = 0.95;

/// Null fraction of a single column
#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct NullRatio {
    #[tabled(rename = "Col. Name")]
    pub column: String,
    #[tabled(rename = "Null Percent", display_with = "format_fraction")]
    pub fraction: f64,
}

fn format_fraction(fraction: &f64) -> String {
    format!("{:.6}", fraction)
}

/// Per-column null fractions, highest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NullReport {
    pub entries: Vec<NullRatio>,
}

impl NullReport {
    /// Columns whose fraction strictly exceeds `threshold`
    pub fn columns_above(&self, threshold: f64) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.fraction > threshold)
            .map(|e| e.column.clone())
            .collect()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.column == column)
            .map(|e| e.fraction)
    }

    /// Render as a text table
    pub fn render(&self) -> String {
        let mut table = TextTable::new(&self.entries);
        table.with(Style::psql());
        table.to_string()
    }
}

impl std::fmt::Display for NullReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Compute the null report of `table` without modifying it
pub fn null_report(table: &Table) -> NullReport {
    let rows = table.row_count();
    let mut entries: Vec<NullRatio> = table
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let missing = table.values(idx).filter(|v| v.is_null()).count();
            let fraction = if rows == 0 {
                0.0
            } else {
                missing as f64 / rows as f64
            };
            NullRatio {
                column: column.name.clone(),
                fraction,
            }
        })
        .collect();

    // Stable: ties keep column order
    entries.sort_by(|a, b| b.fraction.total_cmp(&a.fraction));

    NullReport { entries }
}

/// Null report plus the columns that exceed `threshold`
pub fn audit(table: &Table, threshold: f64) -> (NullReport, Vec<String>) {
    let report = null_report(table);
    let to_drop = report.columns_above(threshold);
    (report, to_drop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, Column};

    fn sparse_table() -> Table {
        let mut table = Table::new(vec![
            Column::new("full"),
            Column::new("half"),
            Column::new("empty"),
            Column::new("also_half"),
        ]);
        table.add_row(vec![1i64.into(), CellValue::Null, CellValue::Null, "x".into()]);
        table.add_row(vec![2i64.into(), 3i64.into(), CellValue::Null, CellValue::Null]);
        table.infer_column_types();
        table
    }

    #[test]
    fn test_report_sorted_descending_and_stable() {
        let report = null_report(&sparse_table());
        let order: Vec<&str> = report.entries.iter().map(|e| e.column.as_str()).collect();
        assert_eq!(order, vec!["empty", "half", "also_half", "full"]);
        assert_eq!(report.get("half"), Some(0.5));
        assert_eq!(report.get("full"), Some(0.0));
    }

    #[test]
    fn test_threshold_is_strict() {
        let table = sparse_table();
        let (_, dropped) = audit(&table, 0.5);
        assert_eq!(dropped, vec!["empty"]);

        let (_, dropped) = audit(&table, DEFAULT_DROP_THRESHOLD);
        assert_eq!(dropped, vec!["empty"]);

        let (_, dropped) = audit(&table, 0.49);
        assert_eq!(dropped, vec!["empty", "half", "also_half"]);
    }

    #[test]
    fn test_lower_threshold_never_drops_fewer() {
        let table = sparse_table();
        let mut previous = 0;
        for threshold in [1.0, 0.98, 0.75, 0.5, 0.25, 0.0, -0.1] {
            let (_, dropped) = audit(&table, threshold);
            assert!(dropped.len() >= previous);
            previous = dropped.len();
        }
        assert_eq!(previous, 4);
    }

    #[test]
    fn test_audit_does_not_mutate() {
        let table = sparse_table();
        let before = table.clone();
        let _ = audit(&table, 0.0);
        assert_eq!(table.column_names(), before.column_names());
        assert_eq!(table.rows.len(), before.rows.len());
        for (a, b) in table.rows.iter().zip(&before.rows) {
            assert_eq!(a.cells, b.cells);
        }
    }

    #[test]
    fn test_empty_table_reports_zero() {
        let table = Table::new(vec![Column::new("a")]);
        let (report, dropped) = audit(&table, 0.0);
        assert_eq!(report.get("a"), Some(0.0));
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_render_contains_headers() {
        let rendered = null_report(&sparse_table()).render();
        assert!(rendered.contains("Col. Name"));
        assert!(rendered.contains("empty"));
    }
}
