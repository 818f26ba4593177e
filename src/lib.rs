//! housing-etl - Merge and clean city housing exports
//!
//! Loads two city-specific listings or calendar CSV exports, keeps the columns
//! they share, normalizes text-encoded values and replaces a SQLite table with
//! the result.

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod sink;

pub use config::{CollisionPolicy, Config, Shape};
pub use error::{EtlError, Result};
pub use model::Table;
pub use pipeline::{run, RunSummary};
