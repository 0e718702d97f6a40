//! Storage Module
//!
//! Durable persistence backend: one retrievable blob per unit.
//!
//! ## Responsibilities
//! - Store/load table metadata, pages, and bitmap indexes by name
//! - Reflect true on-disk state (loss detection reads go through here)
//! - Checksum every blob for corruption detection
//! - Workspace reset and diagnostics
//!
//! ## Blob Format
//! ```text
//! ┌───────────┬──────────────────────────┐
//! │ CRC32 (4) │   bincode payload        │
//! └───────────┴──────────────────────────┘
//! ```
//!
//! ## Directory Layout
//! ```text
//! {data_dir}/tables/{table}/
//!   ├── meta.tbl            table metadata + pages
//!   ├── page_000000.bin     one blob per page
//!   └── index_{column}.idx  one blob per bitmap index
//! ```

mod backend;

pub use backend::FileBackend;
