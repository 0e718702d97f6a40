//! Index Module
//!
//! Secondary bitmap indexes over single table columns.
//!
//! ## Responsibilities
//! - Map each distinct column value to the set of global indices holding it
//! - Full builds from a table scan, incremental maintenance on insert
//! - Render fixed-length bit strings for diagnostics and clients
//!
//! An index is a derived structure: losing it never loses data, only the
//! fast access path.

mod bitmap;

pub use bitmap::BitmapIndex;
