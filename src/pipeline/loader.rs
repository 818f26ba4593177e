//! Loading and merging the two city exports

use std::path::Path;

use indexmap::IndexSet;
use tracing::{debug, info};

use crate::error::Result;
use crate::model::{CellValue, Table};
use crate::parser::read_table;

/// Column holding each row's source dataset label
pub const DATASET_COLUMN: &str = "Dataset";

/// Label every row with its source dataset, overwriting an existing label column
pub fn tag_dataset(mut table: Table, label: &str) -> Table {
    let values = vec![CellValue::from(label); table.row_count()];
    match table.column_index(DATASET_COLUMN) {
        Some(index) => table.set_column(index, values),
        None => table.push_column(DATASET_COLUMN, values),
    }
    table
}

/// Concatenate two tables over the columns they share.
/// Column order follows `first`; rows are not deduplicated.
pub fn merge(first: Table, second: Table) -> Table {
    let first_columns: IndexSet<&str> = first.column_names().into_iter().collect();
    let second_columns: IndexSet<&str> = second.column_names().into_iter().collect();
    let shared: Vec<String> = first_columns
        .intersection(&second_columns)
        .map(|name| name.to_string())
        .collect();

    let dropped = first_columns.symmetric_difference(&second_columns).count();
    if dropped > 0 {
        debug!(dropped, "columns not shared by both inputs");
    }

    let mut merged = first.select(&shared);
    merged.append(second.select(&shared));
    merged
}

/// Read both exports, tag them with their labels and merge them
pub fn load(
    first_path: &Path,
    second_path: &Path,
    first_label: &str,
    second_label: &str,
) -> Result<Table> {
    let first = tag_dataset(read_table(first_path)?, first_label);
    info!(path = %first_path.display(), rows = first.row_count(), label = first_label, "read input");

    let second = tag_dataset(read_table(second_path)?, second_label);
    info!(path = %second_path.display(), rows = second.row_count(), label = second_label, "read input");

    let merged = merge(first, second);
    info!(
        rows = merged.row_count(),
        columns = merged.column_count(),
        "merged inputs"
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::model::Column;

    fn table(columns: &[&str], rows: usize) -> Table {
        let mut table = Table::new(columns.iter().map(|c| Column::new(*c)).collect());
        for r in 0..rows {
            let cells = (0..columns.len()).map(|c| CellValue::Int((r * 10 + c) as i64)).collect();
            table.add_row(cells);
        }
        table.infer_column_types();
        table
    }

    #[test]
    fn test_merge_keeps_intersection() {
        let a = table(&["id", "price", "unique_to_a", "rate"], 3);
        let b = table(&["rate", "id", "unique_to_b", "price"], 2);

        let merged = merge(a, b);
        assert_eq!(merged.column_names(), vec!["id", "price", "rate"]);
        assert_eq!(merged.row_count(), 5);
        // Second table's cells are realigned by name
        assert_eq!(
            merged.rows[3].cells,
            vec![CellValue::Int(1), CellValue::Int(3), CellValue::Int(0)]
        );
    }

    #[test]
    fn test_merge_disjoint() {
        let merged = merge(table(&["a"], 1), table(&["b"], 2));
        assert_eq!(merged.column_count(), 0);
        assert_eq!(merged.row_count(), 3);
    }

    #[test]
    fn test_tag_overwrites_existing_label() {
        let mut input = table(&["id"], 2);
        input.push_column(DATASET_COLUMN, vec!["old".into(), "old".into()]);

        let tagged = tag_dataset(input, "Boston");
        assert_eq!(tagged.column_names(), vec!["id", DATASET_COLUMN]);
        assert_eq!(tagged.rows[1].cells[1], CellValue::from("Boston"));
    }

    #[test]
    fn test_load_repeated_header() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        std::fs::write(&first, "x,x\n2,3\n").unwrap();
        std::fs::write(&second, "x\n9\n").unwrap();

        let merged = load(&first, &second, "Boston", "Seattle").unwrap();
        assert_eq!(merged.column_names(), vec!["x", DATASET_COLUMN]);
        assert_eq!(merged.rows[0].cells[0], CellValue::Int(2));
        assert_eq!(merged.rows[1].cells[0], CellValue::Int(9));
    }

    #[test]
    fn test_load_tags_rows() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("boston.csv");
        let second = dir.path().join("seattle.csv");
        let mut f = std::fs::File::create(&first).unwrap();
        writeln!(f, "id,only_boston\n1,x\n2,y").unwrap();
        let mut f = std::fs::File::create(&second).unwrap();
        writeln!(f, "only_seattle,id\nz,3").unwrap();

        let merged = load(&first, &second, "Boston", "Seattle").unwrap();
        assert_eq!(merged.column_names(), vec!["id", DATASET_COLUMN]);
        let labels: Vec<_> = merged.values(1).map(|v| v.display().into_owned()).collect();
        assert_eq!(labels, vec!["Boston", "Boston", "Seattle"]);
        assert_eq!(merged.rows[2].cells[0], CellValue::Int(3));
    }
}
