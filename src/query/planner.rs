//! Predicate classification
//!
//! A pure function from (constraint columns, indexed columns) to one of
//! four access paths. Keeping classification separate from execution makes
//! each case testable in isolation.

/// One equality constraint: `column == value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub column: String,
    pub value: String,
}

impl Constraint {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// The chosen execution strategy for a predicate
///
/// Positions refer to indices into the constraint list handed to
/// [`classify`], split into the index-covered part and the residual part
/// that must be checked linearly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPath {
    /// Every constrained column is indexed; pure set algebra
    AllIndexed { indexed: Vec<usize> },

    /// Exactly one constrained column is indexed; single raw-set lookup,
    /// no intersection, then a residual filter
    SingleIndexed { indexed: usize, residual: Vec<usize> },

    /// More than one but not all constrained columns are indexed
    PartiallyIndexed {
        indexed: Vec<usize>,
        residual: Vec<usize>,
    },

    /// No constrained column is indexed; direct scan
    FullScan,
}

impl AccessPath {
    /// Short human-readable name, used in trace entries
    pub fn name(&self) -> &'static str {
        match self {
            AccessPath::AllIndexed { .. } => "all-indexed",
            AccessPath::SingleIndexed { .. } => "single-indexed",
            AccessPath::PartiallyIndexed { .. } => "partially-indexed",
            AccessPath::FullScan => "full-scan",
        }
    }
}

/// Classify a predicate against the set of indexed columns
///
/// Duplicate entries in the registry (from repeated index builds) do not
/// affect classification; coverage is a membership test.
pub fn classify(constraints: &[Constraint], indexed_columns: &[String]) -> AccessPath {
    let indexed: Vec<usize> = constraints
        .iter()
        .enumerate()
        .filter(|(_, c)| indexed_columns.iter().any(|name| name == &c.column))
        .map(|(i, _)| i)
        .collect();
    let residual: Vec<usize> = (0..constraints.len())
        .filter(|i| !indexed.contains(i))
        .collect();

    if indexed.is_empty() {
        AccessPath::FullScan
    } else if residual.is_empty() {
        AccessPath::AllIndexed { indexed }
    } else if indexed.len() == 1 {
        AccessPath::SingleIndexed {
            indexed: indexed[0],
            residual,
        }
    } else {
        AccessPath::PartiallyIndexed { indexed, residual }
    }
}
