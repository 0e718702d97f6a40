//! Engine Module
//!
//! The top-level `Database` object that coordinates all components.
//!
//! ## Responsibilities
//! - Own the persistence backend and per-table state (index registry, trace)
//! - Orchestrate insert: base append, index maintenance, two-phase persist
//! - Dispatch selects through the query planner
//! - Run the page-loss validation/recovery protocol
//!
//! ## Consistency Model
//! Single logical writer, synchronous execution. A failed store during
//! insert does not roll back the in-memory mutation; the default policy is
//! log-and-continue, with every failed sub-write enumerated in the returned
//! [`InsertOutcome`] so callers can retry or roll forward.

use std::collections::HashMap;
use std::fs;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::{ArityCheck, Config};
use crate::error::{FolioError, Result};
use crate::index::BitmapIndex;
use crate::query::{self, Constraint, Selection};
use crate::storage::FileBackend;
use crate::table::{PageCapacity, Table, Tuple};
use crate::trace::TraceEvent;

/// Per-table bookkeeping: index registry and audit trace
///
/// Bundled here instead of living in process-wide maps so every operation
/// works against explicit state owned by the database instance.
#[derive(Debug, Default)]
struct TableState {
    /// Columns with a registered bitmap index. Repeated builds append
    /// repeated entries; coverage checks are membership tests, so the
    /// duplicates are harmless but visible.
    indexed_columns: Vec<String>,

    /// Rendered trace entries, append-only
    trace: Vec<String>,
}

/// One persistence sub-write that failed during an insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailedWrite {
    /// The landing page blob
    Page(usize),

    /// The table metadata blob
    TableMeta,

    /// A bitmap index blob, by column name
    Index(String),
}

/// Result of an insert: where the tuple landed, plus any sub-writes that
/// failed to persist
#[derive(Debug, Clone)]
pub struct InsertOutcome {
    pub page_number: usize,
    pub global_index: usize,
    pub failed_writes: Vec<FailedWrite>,
}

impl InsertOutcome {
    /// True when every sub-write reached durable storage
    pub fn is_clean(&self) -> bool {
        self.failed_writes.is_empty()
    }
}

/// Result of a validation pass
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Page numbers the backend could not retrieve
    pub missing_pages: Vec<usize>,

    /// In-memory tuples of the missing pages. Not lost: the table blob
    /// still holds them, and recovery replays from there.
    pub at_risk: Vec<Tuple>,
}

/// Result of a recovery pass
#[derive(Debug, Clone)]
pub struct RecoveryReport {
    /// Page numbers re-persisted from the in-memory table structure
    pub restored_pages: Vec<usize>,
}

/// The embedded database instance
pub struct Database {
    config: Config,
    backend: FileBackend,
    states: RwLock<HashMap<String, TableState>>,
}

impl Database {
    /// Open or create a database rooted at the configured data directory
    ///
    /// Bootstraps the workspace and rebuilds per-table state from what the
    /// backend holds: every index blob found on disk re-registers its
    /// column.
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        let backend = FileBackend::open(&config.data_dir)?;

        let mut states = HashMap::new();
        for name in backend.table_names()? {
            let indexed_columns = backend.index_columns(&name)?;
            if !indexed_columns.is_empty() {
                debug!(table = %name, columns = ?indexed_columns, "re-registered indexes");
            }
            states.insert(
                name,
                TableState {
                    indexed_columns,
                    trace: Vec::new(),
                },
            );
        }

        info!(data_dir = %config.data_dir.display(), tables = states.len(), "database opened");
        Ok(Self {
            config,
            backend,
            states: RwLock::new(states),
        })
    }

    /// Open with default config at the given path (convenience)
    pub fn open_path(path: impl Into<std::path::PathBuf>) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    // =========================================================================
    // DDL
    // =========================================================================

    /// Create a table with the configured default page capacity
    pub fn create_table(&self, name: &str, columns: &[&str]) -> Result<()> {
        self.create_table_with_capacity(name, self.config.default_page_capacity, columns)
    }

    /// Create a table with an explicit page capacity
    ///
    /// Rejects blank names, empty or duplicated column lists, and names
    /// already present in the backend, all before anything is persisted.
    pub fn create_table_with_capacity(
        &self,
        name: &str,
        capacity: PageCapacity,
        columns: &[&str],
    ) -> Result<()> {
        if self.backend.load_table(name)?.is_some() {
            return Err(FolioError::TableExists(name.to_string()));
        }

        let column_names: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let table = Table::create(name, capacity, column_names.clone())?;
        self.backend.store_table(name, &table)?;

        self.states.write().insert(name.to_string(), TableState::default());
        self.record(name, TraceEvent::Created { columns: column_names });
        debug!(table = name, "created table");
        Ok(())
    }

    /// Build a bitmap index on a column from the table's current contents
    ///
    /// Registers the column and persists the index. Building twice for the
    /// same column duplicates the registry entry; the index contents stay
    /// correct.
    pub fn create_index(&self, table_name: &str, column: &str) -> Result<()> {
        let started = Instant::now();
        let table = self.load_table(table_name)?;
        let position = table.column_index(column)?;

        let mut index = BitmapIndex::new(table_name, column);
        index.build(&table.all_tuples(), position);
        let distinct = index.distinct_values();
        self.backend.store_index(table_name, column, &index)?;

        self.states
            .write()
            .entry(table_name.to_string())
            .or_default()
            .indexed_columns
            .push(column.to_string());

        self.record(
            table_name,
            TraceEvent::IndexBuilt {
                column: column.to_string(),
                distinct_values: distinct,
                elapsed: started.elapsed(),
            },
        );
        debug!(table = table_name, column, distinct, "built bitmap index");
        Ok(())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert a tuple
    ///
    /// Sequence per tuple: base append (assigns the global index), then
    /// incremental update of every registered index, then the persist
    /// phase. Base-append happens-before index update because the update
    /// needs the assigned global index.
    pub fn insert(&self, table_name: &str, tuple: Tuple) -> Result<InsertOutcome> {
        let started = Instant::now();
        let mut table = self.load_table(table_name)?;

        if self.config.arity_check == ArityCheck::Enforce
            && tuple.len() != table.column_names().len()
        {
            return Err(FolioError::ArityMismatch {
                expected: table.column_names().len(),
                got: tuple.len(),
            });
        }

        let (page_number, global_index) = table.insert(tuple.clone())?;

        // Update each registered index in memory before persisting anything.
        let indexed = self.indexed_columns(table_name);
        let mut updated_indexes: Vec<(String, BitmapIndex)> = Vec::new();
        let mut failed_writes = Vec::new();
        for column in &indexed {
            let position = table.column_index(column)?;
            match self.backend.load_index(table_name, column) {
                Ok(Some(mut index)) => {
                    if let Some(value) = tuple.get(position) {
                        index.insert_one(value, global_index);
                    }
                    updated_indexes.push((column.clone(), index));
                }
                Ok(None) => {
                    warn!(table = table_name, column = %column,
                          "registered index missing from backend, skipping update");
                    failed_writes.push(FailedWrite::Index(column.clone()));
                }
                Err(e) => {
                    warn!(table = table_name, column = %column, error = %e,
                          "failed to load index for update");
                    failed_writes.push(FailedWrite::Index(column.clone()));
                }
            }
        }

        // Persist phase: each sub-write attempted independently, failures
        // enumerated rather than rolled back (log-and-continue policy).
        let landing_page = table
            .page(page_number)
            .ok_or_else(|| FolioError::PageUnavailable {
                table: table_name.to_string(),
                page: page_number,
            })?;
        if let Err(e) = self.backend.store_page(table_name, page_number, landing_page) {
            warn!(table = table_name, page = page_number, error = %e, "page store failed");
            failed_writes.push(FailedWrite::Page(page_number));
        }
        if let Err(e) = self.backend.store_table(table_name, &table) {
            warn!(table = table_name, error = %e, "table meta store failed");
            failed_writes.push(FailedWrite::TableMeta);
        }
        for (column, index) in &updated_indexes {
            if let Err(e) = self.backend.store_index(table_name, column, index) {
                warn!(table = table_name, column = %column, error = %e, "index store failed");
                failed_writes.push(FailedWrite::Index(column.clone()));
            }
        }

        self.record(
            table_name,
            TraceEvent::Inserted {
                tuple,
                page_number,
                global_index,
                elapsed: started.elapsed(),
            },
        );

        Ok(InsertOutcome {
            page_number,
            global_index,
            failed_writes,
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All tuples of a table in global-index order
    pub fn select_all(&self, table_name: &str) -> Result<Vec<Tuple>> {
        let started = Instant::now();
        let table = self.load_table(table_name)?;
        let tuples = table.all_tuples();
        self.record(
            table_name,
            TraceEvent::SelectedAll {
                count: tuples.len(),
                elapsed: started.elapsed(),
            },
        );
        Ok(tuples)
    }

    /// Positional select: the tuple at (page, offset), if any
    pub fn select_at(
        &self,
        table_name: &str,
        page_number: usize,
        offset: usize,
    ) -> Result<Option<Tuple>> {
        let table = self.load_table(table_name)?;
        let tuple = table
            .page(page_number)
            .and_then(|page| page.get(offset))
            .cloned();
        self.record(
            table_name,
            TraceEvent::SelectedAt {
                page_number,
                offset,
                found: tuple.is_some(),
            },
        );
        Ok(tuple)
    }

    /// Planned select over an equality predicate
    ///
    /// `cols` and `vals` correspond pairwise. The planner classifies the
    /// predicate against the index registry and picks the cheapest of the
    /// four access paths.
    pub fn select_where(
        &self,
        table_name: &str,
        cols: &[&str],
        vals: &[&str],
    ) -> Result<Selection> {
        if cols.len() != vals.len() {
            return Err(FolioError::InvalidSchema(format!(
                "predicate has {} columns but {} values",
                cols.len(),
                vals.len()
            )));
        }

        let table = self.load_table(table_name)?;
        let constraints: Vec<Constraint> = cols
            .iter()
            .zip(vals)
            .map(|(c, v)| Constraint::new(*c, *v))
            .collect();
        let indexed = self.indexed_columns(table_name);

        let selection = query::execute(&table, &self.backend, &constraints, &indexed)?;
        self.record(table_name, TraceEvent::Selected(selection.report.clone()));
        Ok(selection)
    }

    /// The tuple at a global index, loaded fresh through the backend
    pub fn tuple_at(&self, table_name: &str, global_index: usize) -> Result<Tuple> {
        let table = self.load_table(table_name)?;
        let result = table.tuple_at_global_index(global_index, &self.backend);
        self.record(
            table_name,
            TraceEvent::TupleFetched {
                global_index,
                found: result.is_ok(),
            },
        );
        result
    }

    /// Render the bitmap of `value` on an indexed column against the
    /// table's current row count
    pub fn bits_for_value(&self, table_name: &str, column: &str, value: &str) -> Result<String> {
        let table = self.load_table(table_name)?;
        table.column_index(column)?;
        let index = self
            .backend
            .load_index(table_name, column)?
            .ok_or_else(|| FolioError::IndexMissing {
                table: table_name.to_string(),
                column: column.to_string(),
            })?;
        let length = table.tuple_count();
        self.record(
            table_name,
            TraceEvent::BitsRendered {
                column: column.to_string(),
                value: value.to_string(),
                length,
            },
        );
        Ok(index.bits_for_value(value, length))
    }

    // =========================================================================
    // Validation & Recovery
    // =========================================================================

    /// Detect pages the backend has lost
    ///
    /// Asks the backend for every page the table believes it has; pages
    /// that come back absent are missing, and their in-memory tuples are
    /// reported as the at-risk set.
    pub fn validate(&self, table_name: &str) -> Result<ValidationReport> {
        let table = self.load_table(table_name)?;
        let missing_pages = self.missing_pages(&table)?;

        let mut at_risk = Vec::new();
        for &page_number in &missing_pages {
            if let Some(page) = table.page(page_number) {
                at_risk.extend(page.iter().cloned());
            }
        }

        if !missing_pages.is_empty() {
            warn!(table = table_name, pages = ?missing_pages, "backend lost pages");
        }
        self.record(
            table_name,
            TraceEvent::Validated {
                missing_pages: missing_pages.clone(),
                at_risk_tuples: at_risk.len(),
            },
        );
        Ok(ValidationReport {
            missing_pages,
            at_risk,
        })
    }

    /// Restore pages the backend has lost from the in-memory table
    /// structure
    ///
    /// Re-detects missing pages rather than trusting a previous validation
    /// report, then rewrites each from the table blob's copy. Recovers
    /// backend loss only: if the table blob itself is gone there is
    /// nothing to replay from.
    pub fn recover(&self, table_name: &str) -> Result<RecoveryReport> {
        let table = self.load_table(table_name)?;
        let missing_pages = self.missing_pages(&table)?;

        let mut restored_pages = Vec::new();
        for &page_number in &missing_pages {
            let page = table
                .page(page_number)
                .ok_or(FolioError::PageUnavailable {
                    table: table_name.to_string(),
                    page: page_number,
                })?;
            self.backend.store_page(table_name, page_number, page)?;
            restored_pages.push(page_number);
        }

        if !restored_pages.is_empty() {
            info!(table = table_name, pages = ?restored_pages, "restored pages");
        }
        self.record(
            table_name,
            TraceEvent::Recovered {
                restored_pages: restored_pages.clone(),
            },
        );
        Ok(RecoveryReport { restored_pages })
    }

    // =========================================================================
    // Traces & Maintenance
    // =========================================================================

    /// Full trace of a table, one line per operation
    pub fn full_trace(&self, table_name: &str) -> String {
        let states = self.states.read();
        match states.get(table_name) {
            Some(state) if !state.trace.is_empty() => state.trace.join("\n"),
            _ => format!("No traces found for table {}", table_name),
        }
    }

    /// The most recent trace entry of a table
    pub fn last_trace(&self, table_name: &str) -> String {
        let states = self.states.read();
        match states.get(table_name).and_then(|s| s.trace.last()) {
            Some(line) => line.clone(),
            None => format!("No traces found for table {}", table_name),
        }
    }

    /// What the backend currently holds (diagnostic)
    pub fn backend_trace(&self) -> Result<String> {
        self.backend.trace()
    }

    /// Clear all durable state and in-memory bookkeeping
    pub fn reset(&self) -> Result<()> {
        self.backend.reset()?;
        self.states.write().clear();
        info!("workspace reset");
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The persistence backend (tests use this to inject page loss)
    pub fn backend(&self) -> &FileBackend {
        &self.backend
    }

    /// The configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registered index columns for a table (duplicates preserved)
    pub fn indexed_columns(&self, table_name: &str) -> Vec<String> {
        self.states
            .read()
            .get(table_name)
            .map(|s| s.indexed_columns.clone())
            .unwrap_or_default()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn load_table(&self, name: &str) -> Result<Table> {
        self.backend
            .load_table(name)?
            .ok_or_else(|| FolioError::TableNotFound(name.to_string()))
    }

    /// Page numbers the backend can no longer retrieve
    fn missing_pages(&self, table: &Table) -> Result<Vec<usize>> {
        let mut missing = Vec::new();
        for page in table.pages() {
            if self
                .backend
                .load_page(table.name(), page.page_number())?
                .is_none()
            {
                missing.push(page.page_number());
            }
        }
        Ok(missing)
    }

    fn record(&self, table_name: &str, event: TraceEvent) {
        self.states
            .write()
            .entry(table_name.to_string())
            .or_default()
            .trace
            .push(event.to_string());
    }
}
