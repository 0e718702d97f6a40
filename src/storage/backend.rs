//! File-based persistence backend
//!
//! Each table, page, and index is one independently retrievable blob on
//! disk, keyed by (table) / (table, page number) / (table, column). Loads
//! always read the current on-disk state; there is no caching layer here,
//! so a blob deleted out-of-band reads back as absent.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{FolioError, Result};
use crate::index::BitmapIndex;
use crate::table::{Page, Table};

const TABLES_DIR: &str = "tables";
const META_FILENAME: &str = "meta.tbl";

/// File-per-blob persistence backend
#[derive(Debug)]
pub struct FileBackend {
    /// Directory holding one subdirectory per table
    tables_dir: PathBuf,
}

impl FileBackend {
    /// Open or create a backend rooted at `data_dir`
    pub fn open(data_dir: &Path) -> Result<Self> {
        let tables_dir = data_dir.join(TABLES_DIR);
        fs::create_dir_all(&tables_dir)?;
        Ok(Self { tables_dir })
    }

    // =========================================================================
    // Table Blobs
    // =========================================================================

    /// Load a table's metadata blob, or `None` if absent
    pub fn load_table(&self, name: &str) -> Result<Option<Table>> {
        read_blob(&self.table_dir(name).join(META_FILENAME), name)
    }

    /// Store a table's metadata blob (create or overwrite)
    pub fn store_table(&self, name: &str, table: &Table) -> Result<()> {
        let dir = self.table_dir(name);
        fs::create_dir_all(&dir)?;
        write_blob(&dir.join(META_FILENAME), table)
    }

    // =========================================================================
    // Page Blobs
    // =========================================================================

    /// Load one page fresh from disk, or `None` if absent
    pub fn load_page(&self, table_name: &str, page_number: usize) -> Result<Option<Page>> {
        let path = self.page_path(table_name, page_number);
        read_blob(&path, &format!("{}/page {}", table_name, page_number))
    }

    /// Store one page (create or overwrite)
    pub fn store_page(&self, table_name: &str, page_number: usize, page: &Page) -> Result<()> {
        let dir = self.table_dir(table_name);
        fs::create_dir_all(&dir)?;
        write_blob(&self.page_path(table_name, page_number), page)
    }

    /// Remove a page blob, returning whether it existed
    ///
    /// Failure-injection hook: simulates out-of-band page loss for the
    /// validation/recovery protocol.
    pub fn delete_page(&self, table_name: &str, page_number: usize) -> Result<bool> {
        let path = self.page_path(table_name, page_number);
        if path.exists() {
            fs::remove_file(&path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    // =========================================================================
    // Index Blobs
    // =========================================================================

    /// Load a column's bitmap index, or `None` if absent
    pub fn load_index(&self, table_name: &str, column_name: &str) -> Result<Option<BitmapIndex>> {
        let path = self.index_path(table_name, column_name);
        read_blob(&path, &format!("{}/index {}", table_name, column_name))
    }

    /// Store a column's bitmap index (create or overwrite)
    pub fn store_index(
        &self,
        table_name: &str,
        column_name: &str,
        index: &BitmapIndex,
    ) -> Result<()> {
        let dir = self.table_dir(table_name);
        fs::create_dir_all(&dir)?;
        write_blob(&self.index_path(table_name, column_name), index)
    }

    // =========================================================================
    // Discovery / Maintenance
    // =========================================================================

    /// Names of all tables with a metadata blob on disk
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.tables_dir)? {
            let entry = entry?;
            if entry.path().is_dir() && entry.path().join(META_FILENAME).exists() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Columns of `table_name` that have an index blob on disk
    pub fn index_columns(&self, table_name: &str) -> Result<Vec<String>> {
        let dir = self.table_dir(table_name);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut columns = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if let Some(column) = name
                .strip_prefix("index_")
                .and_then(|rest| rest.strip_suffix(".idx"))
            {
                columns.push(column.to_string());
            }
        }
        columns.sort();
        Ok(columns)
    }

    /// Clear all durable table state (workspace reinitialization)
    pub fn reset(&self) -> Result<()> {
        if self.tables_dir.exists() {
            fs::remove_dir_all(&self.tables_dir)?;
        }
        fs::create_dir_all(&self.tables_dir)?;
        Ok(())
    }

    /// Human-readable listing of what the backend currently holds
    /// (diagnostic only)
    pub fn trace(&self) -> Result<String> {
        let mut lines = Vec::new();
        for table in self.table_names()? {
            let dir = self.table_dir(&table);
            let mut files: Vec<String> = fs::read_dir(&dir)?
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect();
            files.sort();
            lines.push(format!("{}: [{}]", table, files.join(", ")));
        }
        if lines.is_empty() {
            lines.push("<empty>".to_string());
        }
        Ok(lines.join("\n"))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn table_dir(&self, table_name: &str) -> PathBuf {
        self.tables_dir.join(table_name)
    }

    fn page_path(&self, table_name: &str, page_number: usize) -> PathBuf {
        self.table_dir(table_name)
            .join(format!("page_{:06}.bin", page_number))
    }

    fn index_path(&self, table_name: &str, column_name: &str) -> PathBuf {
        self.table_dir(table_name)
            .join(format!("index_{}.idx", column_name))
    }
}

// =============================================================================
// Blob I/O
// =============================================================================

/// Serialize `value` and write it with a CRC32 prefix
fn write_blob<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let payload = bincode::serialize(value)?;
    let crc = crc32fast::hash(&payload);

    let mut blob = Vec::with_capacity(4 + payload.len());
    blob.extend_from_slice(&crc.to_le_bytes());
    blob.extend_from_slice(&payload);

    fs::write(path, blob)?;
    Ok(())
}

/// Read a blob, verify its checksum, and deserialize
///
/// Absence is `Ok(None)`; a checksum mismatch is `Corruption`.
fn read_blob<T: DeserializeOwned>(path: &Path, what: &str) -> Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if bytes.len() < 4 {
        return Err(FolioError::Corruption(what.to_string()));
    }
    let stored_crc = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let payload = &bytes[4..];
    if crc32fast::hash(payload) != stored_crc {
        return Err(FolioError::Corruption(what.to_string()));
    }

    Ok(Some(bincode::deserialize(payload)?))
}
