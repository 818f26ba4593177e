//! Cleaning rules for the calendar shape

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::info;

use crate::error::{EtlError, Result};
use crate::model::{CellValue, Table};

use super::coerce::{coerce_boolean_letters, coerce_currency};

pub const DATE_COLUMN: &str = "date";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse calendar date text, trying date-only formats first
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        })
}

/// Run every calendar step in order
pub fn clean_calendar(table: Table) -> Result<Table> {
    let table = parse_dates(table)?;
    let table = coerce_price(table)?;
    let table = coerce_available(table)?;
    let table = add_date_parts(table)?;

    info!(
        rows = table.row_count(),
        columns = table.column_count(),
        "calendar cleaned"
    );
    Ok(table)
}

/// `date` text becomes a timestamp; unparseable text aborts
pub fn parse_dates(mut table: Table) -> Result<Table> {
    let index = table.require_column(DATE_COLUMN)?;

    let values = table
        .values(index)
        .map(|cell| match cell {
            CellValue::Null => Ok(CellValue::Null),
            CellValue::DateTime(_) => Ok(cell.clone()),
            CellValue::Date(d) => Ok(CellValue::DateTime(d.and_time(NaiveTime::MIN))),
            other => {
                let text = other.display();
                parse_date(&text)
                    .map(CellValue::DateTime)
                    .ok_or_else(|| EtlError::DateParse {
                        value: text.into_owned(),
                    })
            }
        })
        .collect::<Result<Vec<_>>>()?;

    table.set_column(index, values);
    Ok(table)
}

pub fn coerce_price(mut table: Table) -> Result<Table> {
    let index = table.require_column("price")?;
    coerce_currency(&mut table, index)?;
    Ok(table)
}

pub fn coerce_available(mut table: Table) -> Result<Table> {
    let index = table.require_column("available")?;
    coerce_boolean_letters(&mut table, index);
    Ok(table)
}

/// Append `month`, `month_name`, `year` and `month-year` derived from `date`
pub fn add_date_parts(mut table: Table) -> Result<Table> {
    let index = table.require_column(DATE_COLUMN)?;

    let dates: Vec<Option<NaiveDateTime>> = table
        .values(index)
        .map(|cell| match cell {
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Date(d) => Some(d.and_time(NaiveTime::MIN)),
            _ => None,
        })
        .collect();

    let month = date_part(&dates, |d| CellValue::Int(d.month() as i64));
    let month_name = date_part(&dates, |d| CellValue::from(d.format("%B").to_string()));
    let year = date_part(&dates, |d| CellValue::Int(d.year() as i64));
    let month_year = date_part(&dates, |d| CellValue::from(d.format("%m-%Y").to_string()));

    table.push_column("month", month);
    table.push_column("month_name", month_name);
    table.push_column("year", year);
    table.push_column("month-year", month_year);
    Ok(table)
}

fn date_part<F>(dates: &[Option<NaiveDateTime>], part: F) -> Vec<CellValue>
where
    F: Fn(&NaiveDateTime) -> CellValue,
{
    dates
        .iter()
        .map(|d| d.as_ref().map(&part).unwrap_or(CellValue::Null))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellType, Column};

    fn calendar_table(dates: &[&str]) -> Table {
        let mut table = Table::new(vec![
            Column::new("listing_id"),
            Column::new("date"),
            Column::new("available"),
            Column::new("price"),
        ]);
        for (i, date) in dates.iter().enumerate() {
            let (available, price) = if i % 2 == 0 {
                ("t", CellValue::from("$1,020.00"))
            } else {
                ("f", CellValue::Null)
            };
            table.add_row(vec![(i as i64).into(), (*date).into(), available.into(), price]);
        }
        table.infer_column_types();
        table
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2020, 3, 15)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(parse_date("2020-03-15"), Some(expected));
        assert_eq!(parse_date("03/15/2020"), Some(expected));
        assert_eq!(parse_date("2020-03-15 00:00:00"), Some(expected));
        assert_eq!(parse_date("next tuesday"), None);
    }

    #[test]
    fn test_clean_calendar() {
        let table = clean_calendar(calendar_table(&["2020-03-15", "2016-12-01"])).unwrap();

        assert_eq!(
            table.column_names(),
            vec![
                "listing_id",
                "date",
                "available",
                "price",
                "month",
                "month_name",
                "year",
                "month-year"
            ]
        );
        let first = &table.rows[0].cells;
        assert_eq!(first[2], CellValue::Int(1));
        assert_eq!(first[3], CellValue::Float(1020.0));
        assert_eq!(first[4], CellValue::Int(3));
        assert_eq!(first[5], CellValue::from("March"));
        assert_eq!(first[6], CellValue::Int(2020));
        assert_eq!(first[7], CellValue::from("03-2020"));

        let second = &table.rows[1].cells;
        assert_eq!(second[2], CellValue::Int(0));
        assert!(second[3].is_null());
        assert_eq!(second[5], CellValue::from("December"));
        assert_eq!(second[7], CellValue::from("12-2016"));

        assert_eq!(table.column("date").unwrap().inferred_type, CellType::DateTime);
    }

    #[test]
    fn test_unparseable_date_fails() {
        let err = clean_calendar(calendar_table(&["2020-03-15", "soon"])).unwrap_err();
        assert!(matches!(err, EtlError::DateParse { ref value } if value == "soon"));
    }

    #[test]
    fn test_missing_date_stays_missing() {
        let mut table = calendar_table(&["2020-03-15", "2020-03-16"]);
        table.rows[1].cells[1] = CellValue::Null;
        let table = clean_calendar(table).unwrap();
        assert!(table.rows[1].cells[1].is_null());
        assert!(table.rows[1].cells[4].is_null());
        assert!(table.rows[1].cells[7].is_null());
    }
}
