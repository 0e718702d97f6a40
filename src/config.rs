//! Configuration for FolioDB
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::table::PageCapacity;

/// Main configuration for a FolioDB instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files.
    /// Internal structure:
    ///   {data_dir}/
    ///     └── tables/
    ///         └── {table}/
    ///             ├── meta.tbl            (table metadata + pages)
    ///             ├── page_000000.bin     (one blob per page)
    ///             └── index_{column}.idx  (one blob per bitmap index)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Table Configuration
    // -------------------------------------------------------------------------
    /// Page capacity used by `create_table` when none is given explicitly
    pub default_page_capacity: PageCapacity,

    /// Whether inserts verify tuple arity against the table schema
    pub arity_check: ArityCheck,
}

/// Tuple arity validation policy on insert
///
/// The storage layer itself is schema-agnostic: a tuple whose field count
/// differs from the column list is stored as-is under `Ignore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityCheck {
    /// Reject tuples whose field count differs from the schema
    Enforce,

    /// Store tuples without checking field count (legacy behavior)
    Ignore,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./foliodb_data"),
            default_page_capacity: PageCapacity::Bounded(200),
            arity_check: ArityCheck::Ignore,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the default page capacity for new tables
    pub fn default_page_capacity(mut self, capacity: PageCapacity) -> Self {
        self.config.default_page_capacity = capacity;
        self
    }

    /// Set the tuple arity validation policy
    pub fn arity_check(mut self, policy: ArityCheck) -> Self {
        self.config.arity_check = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
