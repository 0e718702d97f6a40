//! Query Module
//!
//! Index-aware selection over multi-column equality predicates.
//!
//! ## Pipeline
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌───────────────┐
//! │  validate  │──▶│   classify   │──▶│    execute    │
//! │  columns   │   │ (pure, four  │   │ (one strategy │
//! │            │   │   variants)  │   │   per case)   │
//! └────────────┘   └──────────────┘   └───────────────┘
//! ```
//!
//! ## The Four Access Paths
//! 1. **AllIndexed**: every constrained column has a bitmap index. AND the
//!    raw posting sets, fetch survivors by global index.
//! 2. **SingleIndexed**: exactly one constrained column is indexed. One
//!    raw-set lookup (no intersection), then a linear residual filter.
//! 3. **PartiallyIndexed**: intersection over the indexed subset, then a
//!    linear residual filter.
//! 4. **FullScan**: no index covers any constraint. Scan every tuple with
//!    no index I/O at all.
//!
//! Indexing changes performance and trace shape, never the result set.

mod executor;
mod planner;

pub use executor::{execute, Selection, SelectReport};
pub use planner::{classify, AccessPath, Constraint};
