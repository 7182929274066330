//! Persistence port and reference stores.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;

use super::types::LocationRecord;

/// Errors from a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt record at {path}:{line}: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Record not found")]
    NotFound,
}

/// Where committed records go.
pub trait PersistencePort: Send + Sync {
    /// Commit one record.
    fn save(&self, record: &LocationRecord) -> Result<(), StoreError>;

    /// All records, in commit order.
    fn list(&self) -> Result<Vec<LocationRecord>, StoreError>;

    /// Overwrite the first stored record equal to `existing`.
    fn replace(
        &self,
        existing: &LocationRecord,
        updated: &LocationRecord,
    ) -> Result<(), StoreError>;

    /// All records sorted by timestamp, oldest first. Ties keep commit order.
    fn list_by_date(&self) -> Result<Vec<LocationRecord>, StoreError> {
        let mut records = self.list()?;
        records.sort_by_key(|record| record.timestamp);
        Ok(records)
    }

    /// First photo id not used by any stored record.
    fn next_photo_id(&self) -> Result<u64, StoreError> {
        Ok(self
            .list()?
            .iter()
            .filter_map(|record| record.photo_id)
            .max()
            .map_or(0, |max| max + 1))
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<LocationRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl PersistencePort for MemoryStore {
    fn save(&self, record: &LocationRecord) -> Result<(), StoreError> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<LocationRecord>, StoreError> {
        Ok(self.records.lock().clone())
    }

    fn replace(
        &self,
        existing: &LocationRecord,
        updated: &LocationRecord,
    ) -> Result<(), StoreError> {
        let mut records = self.records.lock();
        let index = records
            .iter()
            .position(|record| record == existing)
            .ok_or(StoreError::NotFound)?;
        records[index] = updated.clone();
        Ok(())
    }
}

/// Append-only JSON-lines file, one record per line.
#[derive(Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<LocationRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(fs::File::open(&self.path)?);
        let mut records = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                line: index + 1,
                source,
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

impl PersistencePort for JsonLinesStore {
    fn save(&self, record: &LocationRecord) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(record).map_err(StoreError::Encode)?;
        line.push('\n');

        let _guard = self.write_lock.lock();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;

        tracing::debug!(path = %self.path.display(), category = %record.category, "Record saved");
        Ok(())
    }

    fn list(&self) -> Result<Vec<LocationRecord>, StoreError> {
        self.read_all()
    }

    fn replace(
        &self,
        existing: &LocationRecord,
        updated: &LocationRecord,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut records = self.read_all()?;
        let index = records
            .iter()
            .position(|record| record == existing)
            .ok_or(StoreError::NotFound)?;
        records[index] = updated.clone();

        let mut content = String::new();
        for record in &records {
            content.push_str(&serde_json::to_string(record).map_err(StoreError::Encode)?);
            content.push('\n');
        }

        // Staged next to the store, then renamed over it
        let staging = self.path.with_extension("jsonl.tmp");
        fs::write(&staging, content)?;
        fs::rename(&staging, &self.path)?;

        tracing::debug!(path = %self.path.display(), "Record updated");
        Ok(())
    }
}
