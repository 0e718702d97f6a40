//! # FolioDB
//!
//! An embedded, single-process table store with:
//! - Paginated, append-only tuple storage with deterministic global addressing
//! - Secondary bitmap indexes with set-algebra query evaluation
//! - An index-aware planner choosing among four access paths
//! - Page-loss detection and recovery from the table's durable metadata
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Database                              │
//! │        (index registry + per-table audit trace)              │
//! └─────────┬──────────────────┬───────────────────┬────────────┘
//!           │                  │                   │
//!           ▼                  ▼                   ▼
//!    ┌─────────────┐    ┌─────────────┐    ┌──────────────┐
//!    │    Table    │    │ BitmapIndex │    │   Planner    │
//!    │  (Pages)    │    │ (value→set) │    │ (4 paths)    │
//!    └──────┬──────┘    └──────┬──────┘    └──────┬───────┘
//!           │                  │                   │
//!           └──────────────────┴───────────────────┘
//!                              │
//!                              ▼
//!                      ┌──────────────┐
//!                      │ FileBackend  │
//!                      │ (blob/unit)  │
//!                      └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod table;
pub mod index;
pub mod query;
pub mod storage;
pub mod trace;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{ArityCheck, Config};
pub use engine::{Database, FailedWrite, InsertOutcome, RecoveryReport, ValidationReport};
pub use error::{FolioError, Result};
pub use index::BitmapIndex;
pub use query::{AccessPath, Constraint, Selection};
pub use table::{Page, PageCapacity, Table, Tuple};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of FolioDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
