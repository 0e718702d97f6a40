//! Table implementation
//!
//! Ordered sequence of pages plus column metadata. The table blob persisted
//! by the backend carries its pages, which is what recovery replays from
//! when an individual page blob disappears out-of-band.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::storage::FileBackend;

use super::{Page, PageCapacity, Tuple};

/// A table: name, schema, and an append-only list of pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    name: String,
    column_names: Vec<String>,
    page_capacity: PageCapacity,
    pages: Vec<Page>,
}

impl Table {
    /// Create a new table with zero pages
    ///
    /// Fails with `InvalidName` if the name is empty or blank, and with
    /// `InvalidSchema` if the column list is empty or contains duplicates,
    /// or if the capacity is `Bounded(0)`. A zero bound would make every
    /// page permanently full and break the `g / capacity` addressing;
    /// callers wanting "no bound" use `PageCapacity::Unbounded`.
    pub fn create(
        name: impl Into<String>,
        page_capacity: PageCapacity,
        column_names: Vec<String>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FolioError::InvalidName(name));
        }
        if page_capacity == PageCapacity::Bounded(0) {
            return Err(FolioError::InvalidSchema(
                "page capacity must be non-zero; use PageCapacity::Unbounded for a single unbounded page"
                    .to_string(),
            ));
        }
        if column_names.is_empty() {
            return Err(FolioError::InvalidSchema(
                "column list must not be empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for column in &column_names {
            if !seen.insert(column.as_str()) {
                return Err(FolioError::InvalidSchema(format!(
                    "duplicate column '{}'",
                    column
                )));
            }
        }

        Ok(Self {
            name,
            column_names,
            page_capacity,
            pages: Vec::new(),
        })
    }

    /// Get the table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the ordered column names
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Get the page capacity
    pub fn page_capacity(&self) -> PageCapacity {
        self.page_capacity
    }

    /// Get all pages in creation order
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Get a page by number
    pub fn page(&self, page_number: usize) -> Option<&Page> {
        self.pages.get(page_number)
    }

    /// Insert a tuple, creating a new page if the last one is full
    ///
    /// Returns `(page_number, global_index)` of the landing position. This
    /// layer does not validate tuple arity; the engine applies the
    /// configured `ArityCheck` policy before calling in.
    pub fn insert(&mut self, tuple: Tuple) -> Result<(usize, usize)> {
        let global_index = self.tuple_count();

        if self.pages.is_empty() {
            self.pages.push(Page::new(self.page_capacity, 0));
        }
        if self.pages.last().map(Page::is_full).unwrap_or(false) {
            let next_number = self.pages.len();
            self.pages.push(Page::new(self.page_capacity, next_number));
        }

        // Last page exists and is not full at this point.
        let last_idx = self.pages.len() - 1;
        let last = &mut self.pages[last_idx];
        last.append(tuple)?;

        Ok((last.page_number(), global_index))
    }

    /// All tuples in global-index order, freshly materialized
    pub fn all_tuples(&self) -> Vec<Tuple> {
        self.pages
            .iter()
            .flat_map(|page| page.iter().cloned())
            .collect()
    }

    /// Total number of tuples across all pages
    pub fn tuple_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    /// Position of a column in the schema
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.column_names
            .iter()
            .position(|name| name == column)
            .ok_or_else(|| FolioError::UnknownColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// Map a global index to its `(page_number, offset)` address
    pub fn locate(&self, global_index: usize) -> (usize, usize) {
        match self.page_capacity {
            PageCapacity::Bounded(c) => (global_index / c, global_index % c),
            // Single unbounded page: global index is the offset.
            PageCapacity::Unbounded => (0, global_index),
        }
    }

    /// Fetch the tuple at a global index, loading its page fresh from the
    /// backend
    ///
    /// This deliberately bypasses the in-memory `pages` list: reading the
    /// durable copy is how indexed lookups and validation detect pages the
    /// backend has lost. Returns `PageUnavailable` when the backend has no
    /// such page, and `TupleNotFound` when the offset is out of range for
    /// what the page currently holds.
    pub fn tuple_at_global_index(
        &self,
        global_index: usize,
        backend: &FileBackend,
    ) -> Result<Tuple> {
        let (page_number, offset) = self.locate(global_index);
        if page_number >= self.pages.len() {
            return Err(FolioError::TupleNotFound(global_index));
        }

        let page = backend
            .load_page(&self.name, page_number)?
            .ok_or(FolioError::PageUnavailable {
                table: self.name.clone(),
                page: page_number,
            })?;

        page.get(offset)
            .cloned()
            .ok_or(FolioError::TupleNotFound(global_index))
    }
}
