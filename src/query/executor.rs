//! Strategy execution
//!
//! Runs the access path chosen by [`classify`] and produces the matching
//! tuples plus a structured execution report. Results always ascend in
//! global-index order: posting sets iterate ascending, and the scan path
//! walks pages front to back.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::error::{FolioError, Result};
use crate::index::BitmapIndex;
use crate::storage::FileBackend;
use crate::table::{Table, Tuple};

use super::planner::{classify, AccessPath, Constraint};

/// Structured summary of one select execution
#[derive(Debug, Clone)]
pub struct SelectReport {
    /// Which of the four strategies ran
    pub path: &'static str,

    /// All constrained columns, in predicate order
    pub columns: Vec<String>,

    /// The subset covered by bitmap indexes
    pub indexed_columns: Vec<String>,

    /// The subset checked by linear filtering
    pub residual_columns: Vec<String>,

    /// Cardinality of the candidate set after the indexed portion
    /// (`None` for the pure scan path, which has no candidate step)
    pub candidate_count: Option<usize>,

    /// Number of tuples in the final result
    pub result_count: usize,

    /// Wall-clock execution time
    pub elapsed: Duration,
}

/// Result of a planned select: tuples plus the execution report
#[derive(Debug, Clone)]
pub struct Selection {
    pub tuples: Vec<Tuple>,
    pub report: SelectReport,
}

/// Execute an equality predicate against a table
///
/// Column-existence validation happens before classification; an unknown
/// column aborts without touching any index. A column the registry claims
/// is indexed but whose blob the backend cannot load is a hard
/// `IndexMissing` error (registry/backend desynchronization).
pub fn execute(
    table: &Table,
    backend: &FileBackend,
    constraints: &[Constraint],
    indexed_columns: &[String],
) -> Result<Selection> {
    let started = Instant::now();

    // Every constrained column must exist in the schema.
    let positions: Vec<usize> = constraints
        .iter()
        .map(|c| table.column_index(&c.column))
        .collect::<Result<_>>()?;

    let path = classify(constraints, indexed_columns);

    let (tuples, candidate_count) = match &path {
        AccessPath::FullScan => {
            let all: Vec<usize> = (0..constraints.len()).collect();
            let tuples: Vec<Tuple> = table
                .all_tuples()
                .into_iter()
                .filter(|t| matches_at(t, constraints, &positions, &all))
                .collect();
            (tuples, None)
        }

        AccessPath::AllIndexed { indexed } => {
            let candidates = intersect_indexed(table, backend, constraints, indexed)?;
            let count = candidates.as_ref().map(BTreeSet::len).unwrap_or(0);
            let tuples = match candidates {
                Some(set) => fetch_candidates(table, backend, &set, constraints, &positions, &[]),
                None => Vec::new(),
            };
            (tuples, Some(count))
        }

        AccessPath::SingleIndexed { indexed, residual } => {
            // One raw-set lookup; no intersection needed.
            let constraint = &constraints[*indexed];
            let index = load_required_index(backend, table.name(), &constraint.column)?;
            let candidates = index.raw_set(&constraint.value).cloned();
            let count = candidates.as_ref().map(BTreeSet::len).unwrap_or(0);
            let tuples = match candidates {
                Some(set) => {
                    fetch_candidates(table, backend, &set, constraints, &positions, residual)
                }
                None => Vec::new(),
            };
            (tuples, Some(count))
        }

        AccessPath::PartiallyIndexed { indexed, residual } => {
            let candidates = intersect_indexed(table, backend, constraints, indexed)?;
            let count = candidates.as_ref().map(BTreeSet::len).unwrap_or(0);
            let tuples = match candidates {
                Some(set) => {
                    fetch_candidates(table, backend, &set, constraints, &positions, residual)
                }
                None => Vec::new(),
            };
            (tuples, Some(count))
        }
    };

    let (indexed_cols, residual_cols) = split_columns(constraints, &path);
    let report = SelectReport {
        path: path.name(),
        columns: constraints.iter().map(|c| c.column.clone()).collect(),
        indexed_columns: indexed_cols,
        residual_columns: residual_cols,
        candidate_count,
        result_count: tuples.len(),
        elapsed: started.elapsed(),
    };

    Ok(Selection { tuples, report })
}

// =============================================================================
// Strategy Building Blocks
// =============================================================================

/// Load an index the registry claims exists
fn load_required_index(
    backend: &FileBackend,
    table_name: &str,
    column_name: &str,
) -> Result<BitmapIndex> {
    backend
        .load_index(table_name, column_name)?
        .ok_or_else(|| FolioError::IndexMissing {
            table: table_name.to_string(),
            column: column_name.to_string(),
        })
}

/// Fold AND across the posting sets of the indexed constraints
///
/// `Ok(None)` means some value was absent from its index, or the running
/// intersection emptied out: the result is empty and no further sets need
/// to be consulted.
fn intersect_indexed(
    table: &Table,
    backend: &FileBackend,
    constraints: &[Constraint],
    indexed: &[usize],
) -> Result<Option<BTreeSet<usize>>> {
    let mut combined: Option<BTreeSet<usize>> = None;

    for &i in indexed {
        let constraint = &constraints[i];
        let index = load_required_index(backend, table.name(), &constraint.column)?;
        let set = match index.raw_set(&constraint.value) {
            Some(set) => set.clone(),
            // Value never indexed: the AND is empty, stop here.
            None => return Ok(None),
        };

        combined = Some(match combined {
            Some(acc) => acc.intersection(&set).copied().collect(),
            None => set,
        });

        if combined.as_ref().map(BTreeSet::is_empty).unwrap_or(false) {
            return Ok(None);
        }
    }

    Ok(combined)
}

/// Fetch candidate tuples by global index and apply the residual filter
///
/// A candidate whose page fails to load is skipped with a warning, not a
/// query failure.
fn fetch_candidates(
    table: &Table,
    backend: &FileBackend,
    candidates: &BTreeSet<usize>,
    constraints: &[Constraint],
    positions: &[usize],
    residual: &[usize],
) -> Vec<Tuple> {
    let mut tuples = Vec::new();
    for &g in candidates {
        match table.tuple_at_global_index(g, backend) {
            Ok(tuple) => {
                if matches_at(&tuple, constraints, positions, residual) {
                    tuples.push(tuple);
                }
            }
            Err(e) => {
                warn!(table = table.name(), global_index = g, error = %e,
                      "skipping candidate tuple that failed to load");
            }
        }
    }
    tuples
}

/// Test the constraints at `which` positions against a tuple
fn matches_at(
    tuple: &Tuple,
    constraints: &[Constraint],
    positions: &[usize],
    which: &[usize],
) -> bool {
    which.iter().all(|&i| {
        tuple
            .get(positions[i])
            .map(|field| field == &constraints[i].value)
            .unwrap_or(false)
    })
}

/// Split constraint columns into indexed and residual lists for reporting
fn split_columns(constraints: &[Constraint], path: &AccessPath) -> (Vec<String>, Vec<String>) {
    let pick = |ids: &[usize]| -> Vec<String> {
        ids.iter()
            .map(|&i| constraints[i].column.clone())
            .collect()
    };
    match path {
        AccessPath::FullScan => (
            Vec::new(),
            constraints.iter().map(|c| c.column.clone()).collect(),
        ),
        AccessPath::AllIndexed { indexed } => (pick(indexed), Vec::new()),
        AccessPath::SingleIndexed { indexed, residual } => (pick(&[*indexed]), pick(residual)),
        AccessPath::PartiallyIndexed { indexed, residual } => (pick(indexed), pick(residual)),
    }
}
