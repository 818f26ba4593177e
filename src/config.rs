//! Configuration handling for housing-etl

use std::path::{Path, PathBuf};

use crate::pipeline::audit::LISTINGS_DROP_THRESHOLD;

/// Structural category of the input tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Listings,
    Calendar,
    /// Merge and save without cleaning
    Raw,
}

impl Shape {
    /// Classify a path by the legacy filename convention: the path text up to
    /// the first `.` must contain `listing` or `calendar` after its first byte.
    pub fn detect(path: &Path) -> Option<Shape> {
        let text = path.to_str()?;
        let stem = text.split('.').next().unwrap_or("");

        let found_after_start = |needle: &str| stem.find(needle).is_some_and(|pos| pos > 0);

        if found_after_start("listing") {
            Some(Shape::Listings)
        } else if found_after_start("calendar") {
            Some(Shape::Calendar)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Listings => write!(f, "listings"),
            Shape::Calendar => write!(f, "calendar"),
            Shape::Raw => write!(f, "raw"),
        }
    }
}

/// What to do when an indicator column name is already taken
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Suffix the indicator with `.1`, `.2`, ... until the name is free
    #[default]
    Rename,
    /// Abort the run
    Error,
}

/// Configuration for a pipeline run
#[derive(Debug, Clone)]
pub struct Config {
    /// First city's export
    pub first_file: PathBuf,
    /// Second city's export
    pub second_file: PathBuf,
    /// Dataset label for rows from the first file
    pub first_label: String,
    /// Dataset label for rows from the second file
    pub second_label: String,
    /// SQLite database file
    pub database: PathBuf,
    /// Destination table name
    pub table_name: String,
    /// Explicit shape; inferred from `first_file` when unset
    pub shape: Option<Shape>,
    /// Null fraction above which listings columns are dropped
    pub drop_threshold: f64,
    pub collision_policy: CollisionPolicy,
    /// Remove the amenities column once indicators are appended
    pub drop_amenities_source: bool,
    /// Print the null-ratio report after loading
    pub show_null_report: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            first_file: PathBuf::new(),
            second_file: PathBuf::new(),
            first_label: "Boston".to_string(),
            second_label: "Seattle".to_string(),
            database: PathBuf::new(),
            table_name: String::new(),
            shape: None,
            drop_threshold: LISTINGS_DROP_THRESHOLD,
            collision_policy: CollisionPolicy::default(),
            drop_amenities_source: false,
            show_null_report: false,
        }
    }
}

impl Config {
    /// Create a new Config from the four positional inputs
    pub fn new(
        first_file: PathBuf,
        second_file: PathBuf,
        database: PathBuf,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            first_file,
            second_file,
            database,
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Set the shape explicitly
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Set the dataset labels for the first and second file
    pub fn with_labels(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.first_label = first.into();
        self.second_label = second.into();
        self
    }

    pub fn with_drop_threshold(mut self, threshold: f64) -> Self {
        self.drop_threshold = threshold;
        self
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    pub fn with_drop_amenities_source(mut self, drop: bool) -> Self {
        self.drop_amenities_source = drop;
        self
    }

    pub fn with_show_null_report(mut self, show: bool) -> Self {
        self.show_null_report = show;
        self
    }

    /// Explicit shape, or the one implied by the first file name
    pub fn resolve_shape(&self) -> Option<Shape> {
        self.shape.or_else(|| Shape::detect(&self.first_file))
    }
}
