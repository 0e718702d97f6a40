//! Table Module
//!
//! Paginated tuple storage with deterministic global addressing.
//!
//! ## Responsibilities
//! - Fixed-capacity pages as the unit of physical storage
//! - Append-only table growth (new page when the last one fills up)
//! - Global-index ↔ (page, offset) arithmetic
//! - Fresh-from-backend page loads for loss detection
//!
//! ## Addressing
//! A tuple's **global index** `g` is its 0-based rank when all pages are
//! concatenated in page order. For a bounded capacity `c`:
//! ```text
//! page_number = g / c
//! offset      = g % c
//! ```
//! The mapping stays valid even for a page regenerated by recovery, because
//! page numbers are assigned at creation and never change.

mod page;
mod table;

pub use page::{Page, PageCapacity};
pub use table::Table;

/// A stored record: ordered, fixed-arity sequence of string fields.
/// Arity and field order are fixed by the owning table's column list.
pub type Tuple = Vec<String>;
