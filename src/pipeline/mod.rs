//! Load, clean and save stages

pub mod amenities;
pub mod audit;
pub mod calendar;
pub mod coerce;
pub mod listings;
pub mod loader;

use tracing::{debug, info, warn};

use crate::config::{Config, Shape};
use crate::error::{EtlError, Result};
use crate::model::Table;
use crate::sink::save;

pub use audit::{audit, null_report, NullReport, DEFAULT_DROP_THRESHOLD};
pub use calendar::clean_calendar;
pub use listings::{clean_listings, ListingsCleaner};
pub use loader::load;

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub shape: Shape,
    pub rows: usize,
    pub columns: usize,
}

/// Apply the cleaning rules of `shape`
pub fn clean(table: Table, shape: Shape, config: &Config) -> Result<Table> {
    match shape {
        Shape::Listings => ListingsCleaner::from_config(config).clean(table),
        Shape::Calendar => clean_calendar(table),
        Shape::Raw => {
            warn!("raw shape: saving merged data without cleaning");
            Ok(table)
        }
    }
}

/// Run load, clean and save for `config`.
///
/// Nothing touches the destination store until cleaning has succeeded.
pub fn run(config: &Config) -> Result<RunSummary> {
    let shape = config
        .resolve_shape()
        .ok_or_else(|| EtlError::UnknownShape(config.first_file.clone()))?;

    info!(
        first = %config.first_file.display(),
        second = %config.second_file.display(),
        "Loading data"
    );
    let table = load(
        &config.first_file,
        &config.second_file,
        &config.first_label,
        &config.second_label,
    )?;

    let report = null_report(&table);
    debug!("null ratios after merge:\n{}", report);
    if config.show_null_report {
        println!("{}", report);
    }

    info!(%shape, "Cleaning data");
    let table = clean(table, shape, config)?;

    info!(
        database = %config.database.display(),
        table = %config.table_name,
        "Saving data"
    );
    let rows = save(&table, &config.database, &config.table_name)?;
    info!(rows, "Cleaned data saved to database");

    Ok(RunSummary {
        shape,
        rows,
        columns: table.column_count(),
    })
}
