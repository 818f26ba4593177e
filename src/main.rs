//! housing-etl - Merge, clean and load city housing exports

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use housing_etl::config::{CollisionPolicy, Config, Shape};
use housing_etl::pipeline::run;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliShape {
    Listings,
    Calendar,
    Raw,
}

impl From<CliShape> for Shape {
    fn from(s: CliShape) -> Self {
        match s {
            CliShape::Listings => Shape::Listings,
            CliShape::Calendar => Shape::Calendar,
            CliShape::Raw => Shape::Raw,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCollision {
    Rename,
    Error,
}

impl From<CliCollision> for CollisionPolicy {
    fn from(c: CliCollision) -> Self {
        match c {
            CliCollision::Rename => CollisionPolicy::Rename,
            CliCollision::Error => CollisionPolicy::Error,
        }
    }
}

/// Merge two city housing exports (listings or calendar), clean them and
/// save the result into a SQLite table.
///
/// Example: housing-etl Boston/listings.csv Seattle/listings.csv BostonSeattle.db cleanedListings
#[derive(Parser, Debug)]
#[command(name = "housing-etl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// First city's export (labelled "Boston" by default)
    first_file: PathBuf,

    /// Second city's export (labelled "Seattle" by default)
    second_file: PathBuf,

    /// SQLite database to write to
    database: PathBuf,

    /// Table to create or replace
    table_name: String,

    /// Input shape; inferred from the first file name when omitted
    #[arg(short, long, value_enum)]
    shape: Option<CliShape>,

    /// Dataset label for the first file
    #[arg(long, default_value = "Boston")]
    first_label: String,

    /// Dataset label for the second file
    #[arg(long, default_value = "Seattle")]
    second_label: String,

    /// Null fraction above which listings columns are dropped
    #[arg(long)]
    drop_threshold: Option<f64>,

    /// What to do when an amenity indicator name is already a column
    #[arg(long, value_enum, default_value = "rename")]
    on_collision: CliCollision,

    /// Remove the amenities column after expanding it
    #[arg(long)]
    drop_amenities: bool,

    /// Print the null-ratio report of the merged data
    #[arg(long)]
    show_nulls: bool,

    /// Log debug details
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn execute(cli: Cli) -> Result<()> {
    let mut config = Config::new(cli.first_file, cli.second_file, cli.database, cli.table_name)
        .with_labels(cli.first_label, cli.second_label)
        .with_collision_policy(cli.on_collision.into())
        .with_drop_amenities_source(cli.drop_amenities)
        .with_show_null_report(cli.show_nulls);

    if let Some(shape) = cli.shape {
        config = config.with_shape(shape.into());
    }
    if let Some(threshold) = cli.drop_threshold {
        config = config.with_drop_threshold(threshold);
    }

    let summary = run(&config).with_context(|| {
        format!(
            "Failed to process {} and {}",
            config.first_file.display(),
            config.second_file.display()
        )
    })?;

    println!(
        "Saved {} rows x {} columns ({}) to {}/{}",
        summary.rows,
        summary.columns,
        summary.shape,
        config.database.display(),
        config.table_name
    );
    Ok(())
}
