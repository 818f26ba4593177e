//! Cleaning rules for the listings shape

use tracing::{debug, info, warn};

use crate::config::{CollisionPolicy, Config};
use crate::error::{EtlError, Result};
use crate::model::{CellValue, Table};

use super::amenities::expand_indicators;
use super::audit::{audit, LISTINGS_DROP_THRESHOLD};
use super::coerce::{
    coerce_boolean_letters, coerce_currency, coerce_percentage, has_boolean_letters,
    is_price_column,
};

/// Columns that are constant within each city or duplicate another column
pub const FIXED_DROP_COLUMNS: &[&str] = &[
    "scrape_id",
    "last_scraped",
    "experiences_offered",
    "neighbourhood_group_cleansed",
    "state",
    "country_code",
    "country",
    "has_availability",
    "calendar_last_scraped",
    "requires_license",
    "license",
    "jurisdiction_names",
    "host_total_listings_count",
    "neighbourhood",
];

pub const AMENITIES_COLUMN: &str = "amenities";
pub const PRICE_PER_ACCOMMODATE: &str = "price_per_accommodate";

/// Listings cleaning pipeline
#[derive(Debug, Clone)]
pub struct ListingsCleaner {
    pub drop_threshold: f64,
    pub collision_policy: CollisionPolicy,
    pub drop_amenities_source: bool,
}

impl Default for ListingsCleaner {
    fn default() -> Self {
        Self {
            drop_threshold: LISTINGS_DROP_THRESHOLD,
            collision_policy: CollisionPolicy::default(),
            drop_amenities_source: false,
        }
    }
}

impl ListingsCleaner {
    pub fn from_config(config: &Config) -> Self {
        Self {
            drop_threshold: config.drop_threshold,
            collision_policy: config.collision_policy,
            drop_amenities_source: config.drop_amenities_source,
        }
    }

    /// Run every step in order
    pub fn clean(&self, table: Table) -> Result<Table> {
        let table = coerce_boolean_columns(table);
        let table = coerce_rate_columns(table)?;
        let table = drop_fixed_columns(table)?;
        let table = rename_neighbourhood(table);
        let table = prune_sparse_columns(table, self.drop_threshold);
        let table = coerce_price_columns(table)?;
        let table = add_price_per_accommodate(table)?;
        let table = expand_amenities(table, self.collision_policy, self.drop_amenities_source)?;

        info!(
            rows = table.row_count(),
            columns = table.column_count(),
            "listings cleaned"
        );
        Ok(table)
    }
}

/// Clean with default options
pub fn clean_listings(table: Table) -> Result<Table> {
    ListingsCleaner::default().clean(table)
}

/// `t`/`f` text columns become 0/1
pub fn coerce_boolean_columns(mut table: Table) -> Table {
    let candidates: Vec<usize> = (0..table.column_count())
        .filter(|&i| !table.columns[i].inferred_type.is_numeric())
        .filter(|&i| has_boolean_letters(&table, i))
        .collect();

    for index in candidates {
        debug!(column = %table.columns[index].name, "boolean letters");
        coerce_boolean_letters(&mut table, index);
    }
    table
}

/// Every column named like `*rate*` holds percentages
pub fn coerce_rate_columns(mut table: Table) -> Result<Table> {
    let rate_columns: Vec<usize> = (0..table.column_count())
        .filter(|&i| table.columns[i].name.contains("rate"))
        .collect();

    for index in rate_columns {
        debug!(column = %table.columns[index].name, "percentage");
        coerce_percentage(&mut table, index)?;
    }
    Ok(table)
}

pub fn drop_fixed_columns(mut table: Table) -> Result<Table> {
    if let Some(missing) = FIXED_DROP_COLUMNS.iter().find(|c| !table.has_column(c)) {
        return Err(EtlError::MissingColumn(missing.to_string()));
    }
    table.drop_columns(FIXED_DROP_COLUMNS);
    Ok(table)
}

/// `neighbourhood_cleansed` takes over the dropped `neighbourhood` name
pub fn rename_neighbourhood(mut table: Table) -> Table {
    if !table.rename_column("neighbourhood_cleansed", "neighbourhood") {
        debug!("no neighbourhood_cleansed column to rename");
    }
    table
}

/// Drop columns whose null fraction exceeds `threshold`
pub fn prune_sparse_columns(mut table: Table, threshold: f64) -> Table {
    let (_, to_drop) = audit(&table, threshold);
    if !to_drop.is_empty() {
        debug!(columns = ?to_drop, threshold, "dropping sparse columns");
        table.drop_columns(&to_drop);
    }
    table
}

/// Text columns that look like prices become floats
pub fn coerce_price_columns(mut table: Table) -> Result<Table> {
    let price_columns: Vec<usize> = (0..table.column_count())
        .filter(|&i| !table.columns[i].inferred_type.is_numeric())
        .filter(|&i| is_price_column(&table, i))
        .collect();

    for index in price_columns {
        debug!(column = %table.columns[index].name, "currency");
        coerce_currency(&mut table, index)?;
    }
    Ok(table)
}

/// `price / accommodates`; zero capacity yields a non-finite value
pub fn add_price_per_accommodate(mut table: Table) -> Result<Table> {
    let price = table.require_column("price")?;
    let accommodates = table.require_column("accommodates")?;

    let mut zero_capacity = 0usize;
    let values = table
        .rows
        .iter()
        .map(|row| {
            let numerator = numeric_operand(&table, row.get(price), price)?;
            let denominator = numeric_operand(&table, row.get(accommodates), accommodates)?;
            Ok(match (numerator, denominator) {
                (Some(p), Some(a)) => {
                    if a == 0.0 {
                        zero_capacity += 1;
                    }
                    CellValue::Float(p / a)
                }
                _ => CellValue::Null,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if zero_capacity > 0 {
        warn!(rows = zero_capacity, "listings with zero accommodates");
    }
    table.push_column(PRICE_PER_ACCOMMODATE, values);
    Ok(table)
}

/// Missing operands give `None`; anything else must already be a number
fn numeric_operand(
    table: &Table,
    cell: Option<&CellValue>,
    index: usize,
) -> Result<Option<f64>> {
    match cell {
        None => Ok(None),
        Some(cell) if cell.is_null() => Ok(None),
        Some(cell) => cell.as_f64().map(Some).ok_or_else(|| EtlError::InvalidNumber {
            column: table.columns[index].name.clone(),
            value: cell.display().into_owned(),
        }),
    }
}

pub fn expand_amenities(
    mut table: Table,
    policy: CollisionPolicy,
    drop_source: bool,
) -> Result<Table> {
    expand_indicators(&mut table, AMENITIES_COLUMN, policy, drop_source)?;
    Ok(table)
}
