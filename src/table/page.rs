//! Page implementation
//!
//! A page is a fixed-capacity ordered sequence of tuples, the unit of
//! physical storage and of backend persistence.

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

use super::Tuple;

/// Maximum number of tuples a page may hold
///
/// `Unbounded` exists for the legacy "single unbounded page" mode: page 0 is
/// never full and the global index equals the offset. The general
/// `g / capacity` arithmetic is only defined for `Bounded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageCapacity {
    /// At most this many tuples per page (must be non-zero)
    Bounded(usize),

    /// A single page 0 that never fills up
    Unbounded,
}

impl PageCapacity {
    /// Interpret a signed capacity value: non-positive means unbounded.
    pub fn from_raw(raw: i64) -> Self {
        if raw > 0 {
            PageCapacity::Bounded(raw as usize)
        } else {
            PageCapacity::Unbounded
        }
    }
}

/// A page within a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 0-based identifier, assigned at creation, stable for the page's lifetime
    page_number: usize,

    /// Capacity shared by every page of the owning table
    capacity: PageCapacity,

    /// Ordered, append-only tuple storage
    tuples: Vec<Tuple>,
}

impl Page {
    /// Create a new empty page
    pub fn new(capacity: PageCapacity, page_number: usize) -> Self {
        Self {
            page_number,
            capacity,
            tuples: Vec::new(),
        }
    }

    /// Get the page number
    pub fn page_number(&self) -> usize {
        self.page_number
    }

    /// Check whether the page has reached its capacity
    pub fn is_full(&self) -> bool {
        match self.capacity {
            PageCapacity::Bounded(c) => self.tuples.len() >= c,
            PageCapacity::Unbounded => false,
        }
    }

    /// Append a tuple to the page
    ///
    /// The insert algorithm checks `is_full` before calling in, so
    /// `CapacityExceeded` only fires for callers that skip that check.
    pub fn append(&mut self, tuple: Tuple) -> Result<()> {
        if self.is_full() {
            let capacity = match self.capacity {
                PageCapacity::Bounded(c) => c,
                PageCapacity::Unbounded => unreachable!("unbounded pages are never full"),
            };
            return Err(FolioError::CapacityExceeded {
                page: self.page_number,
                capacity,
            });
        }
        self.tuples.push(tuple);
        Ok(())
    }

    /// Get the tuple at `offset`, or `None` if out of range
    pub fn get(&self, offset: usize) -> Option<&Tuple> {
        self.tuples.get(offset)
    }

    /// Number of tuples currently on the page
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// Check whether the page holds no tuples
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Iterate over the page's tuples in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.iter()
    }
}
