//! Bitmap index implementation
//!
//! `value → set of global indices` for one (table, column) pair. Sets are
//! kept as `BTreeSet<usize>` so iteration ascends in global-index order,
//! which is what makes planner output deterministic.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::table::Tuple;

/// A bitmap index for a single column of a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitmapIndex {
    table_name: String,
    column_name: String,
    postings: HashMap<String, BTreeSet<usize>>,
}

impl BitmapIndex {
    /// Create an empty index for the given table and column
    pub fn new(table_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
            postings: HashMap::new(),
        }
    }

    /// Get the name of the indexed table
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Get the name of the indexed column
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// Build the index from a full scan of `tuples`
    ///
    /// Single deterministic pass: position `i` is added to the set for
    /// `tuples[i][column_position]`. Replaces any previous contents.
    pub fn build(&mut self, tuples: &[Tuple], column_position: usize) {
        self.postings.clear();
        for (i, tuple) in tuples.iter().enumerate() {
            if let Some(value) = tuple.get(column_position) {
                self.postings.entry(value.clone()).or_default().insert(i);
            }
        }
    }

    /// Record that `value` occurs at `global_index`
    ///
    /// Called exactly once per base-table insert for every indexed column,
    /// after the base append assigned the global index and before the index
    /// is persisted.
    pub fn insert_one(&mut self, value: &str, global_index: usize) {
        self.postings
            .entry(value.to_string())
            .or_default()
            .insert(global_index);
    }

    /// Render the bitmap for `value` as a fixed-length bit string
    ///
    /// `length` must be the table's row count at query time, not at build
    /// time: bits past the indexed range read as zero, so a stale index
    /// still renders correctly against a newer row count. A value never
    /// indexed renders as all zeroes.
    pub fn bits_for_value(&self, value: &str, length: usize) -> String {
        match self.postings.get(value) {
            Some(set) => (0..length)
                .map(|i| if set.contains(&i) { '1' } else { '0' })
                .collect(),
            None => "0".repeat(length),
        }
    }

    /// The raw posting set for `value`, if any occurrence was indexed
    ///
    /// Used by the planner for AND-combination without string
    /// materialization.
    pub fn raw_set(&self, value: &str) -> Option<&BTreeSet<usize>> {
        self.postings.get(value)
    }

    /// Number of distinct values in the index
    pub fn distinct_values(&self) -> usize {
        self.postings.len()
    }
}
