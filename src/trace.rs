//! Per-table audit trace
//!
//! Every core operation appends one structured entry to the owning table's
//! trace log. The structure is the contract; the rendered text is
//! presentation only.

use std::fmt;
use std::time::Duration;

use crate::query::SelectReport;
use crate::table::Tuple;

/// One structured trace entry
#[derive(Debug, Clone)]
pub enum TraceEvent {
    /// Table created with the given columns
    Created { columns: Vec<String> },

    /// Tuple inserted, landing on `page_number`
    Inserted {
        tuple: Tuple,
        page_number: usize,
        global_index: usize,
        elapsed: Duration,
    },

    /// Whole-table select
    SelectedAll { count: usize, elapsed: Duration },

    /// Positional select by (page, offset)
    SelectedAt {
        page_number: usize,
        offset: usize,
        found: bool,
    },

    /// Planned select with its execution report
    Selected(SelectReport),

    /// Global-index lookup through the backend
    TupleFetched { global_index: usize, found: bool },

    /// Bitmap rendered for a value on an indexed column
    BitsRendered {
        column: String,
        value: String,
        length: usize,
    },

    /// Bitmap index built on a column
    IndexBuilt {
        column: String,
        distinct_values: usize,
        elapsed: Duration,
    },

    /// Validation pass: which pages the backend has lost
    Validated {
        missing_pages: Vec<usize>,
        at_risk_tuples: usize,
    },

    /// Recovery pass: which pages were re-persisted
    Recovered { restored_pages: Vec<usize> },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Created { columns } => {
                write!(f, "Created table with columns: {}", columns.join(", "))
            }
            TraceEvent::Inserted {
                tuple,
                page_number,
                global_index,
                elapsed,
            } => write!(
                f,
                "Inserted: [{}], page: {}, global index: {}, execution time (ms): {}",
                tuple.join(", "),
                page_number,
                global_index,
                elapsed.as_millis()
            ),
            TraceEvent::SelectedAll { count, elapsed } => write!(
                f,
                "Selected all: {} tuples, execution time (ms): {}",
                count,
                elapsed.as_millis()
            ),
            TraceEvent::SelectedAt {
                page_number,
                offset,
                found,
            } => write!(
                f,
                "Selected at page {} offset {}: {}",
                page_number,
                offset,
                if *found { "hit" } else { "miss" }
            ),
            TraceEvent::Selected(report) => {
                write!(
                    f,
                    "Selected [{}] via {}: indexed [{}], residual [{}]",
                    report.columns.join(", "),
                    report.path,
                    report.indexed_columns.join(", "),
                    report.residual_columns.join(", "),
                )?;
                if let Some(candidates) = report.candidate_count {
                    write!(f, ", candidates: {}", candidates)?;
                }
                write!(
                    f,
                    ", results: {}, execution time (ms): {}",
                    report.result_count,
                    report.elapsed.as_millis()
                )
            }
            TraceEvent::TupleFetched {
                global_index,
                found,
            } => write!(
                f,
                "Fetched global index {}: {}",
                global_index,
                if *found { "hit" } else { "miss" }
            ),
            TraceEvent::BitsRendered {
                column,
                value,
                length,
            } => write!(
                f,
                "Rendered bitmap of '{}' on '{}' over {} rows",
                value, column, length
            ),
            TraceEvent::IndexBuilt {
                column,
                distinct_values,
                elapsed,
            } => write!(
                f,
                "Built bitmap index on '{}': {} distinct values, execution time (ms): {}",
                column,
                distinct_values,
                elapsed.as_millis()
            ),
            TraceEvent::Validated {
                missing_pages,
                at_risk_tuples,
            } => write!(
                f,
                "Validated: {} missing pages {:?}, {} tuples at risk",
                missing_pages.len(),
                missing_pages,
                at_risk_tuples
            ),
            TraceEvent::Recovered { restored_pages } => {
                write!(f, "Recovered pages {:?}", restored_pages)
            }
        }
    }
}
