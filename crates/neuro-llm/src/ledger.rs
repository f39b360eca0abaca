//! Append-only log of generation attempts.
//!
//! Records live in memory behind a mutex so concurrent appends are never
//! lost or torn. A ledger opened with a journal also writes each record as
//! one JSON line under the same lock, so the file order matches the
//! in-memory order.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use neuro_core::models::usage::{AggregateUsageStats, GenerationAttemptRecord};
use tracing::warn;

use crate::error::LedgerError;

#[derive(Default)]
struct Inner {
    records: Vec<GenerationAttemptRecord>,
    journal: Option<(PathBuf, File)>,
}

#[derive(Default)]
pub struct UsageLedger {
    inner: Mutex<Inner>,
}

impl UsageLedger {
    /// In-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger that also appends every record to a JSON Lines file, creating
    /// it (and its parent directory) if needed. Existing lines are kept.
    pub fn with_journal(path: &Path) -> Result<Self, LedgerError> {
        let io_err = |source| LedgerError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;

        Ok(Self {
            inner: Mutex::new(Inner {
                records: Vec::new(),
                journal: Some((path.to_path_buf(), file)),
            }),
        })
    }

    /// Rebuild a read-only ledger from a journal file.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LedgerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut records = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(line).map_err(|source| LedgerError::Parse {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })?;
            records.push(record);
        }

        Ok(Self {
            inner: Mutex::new(Inner {
                records,
                journal: None,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic elsewhere while holding the lock cannot leave a torn
        // record: pushes and line writes are single calls.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append one attempt. Journal write failures are logged, never
    /// returned: losing the journal line must not fail the generation.
    pub fn append(&self, record: GenerationAttemptRecord) {
        let mut inner = self.lock();
        if let Some((path, file)) = inner.journal.as_mut() {
            let written = serde_json::to_string(&record)
                .map_err(std::io::Error::other)
                .and_then(|line| writeln!(file, "{line}"));
            if let Err(e) = written {
                warn!(path = %path.display(), error = %e, "failed to journal usage record");
            }
        }
        inner.records.push(record);
    }

    /// Aggregate over every record, or only those matching `filter`.
    pub fn summary(
        &self,
        filter: Option<&dyn Fn(&GenerationAttemptRecord) -> bool>,
    ) -> AggregateUsageStats {
        let inner = self.lock();
        match filter {
            Some(keep) => inner.records.iter().filter(|r| keep(r)).collect(),
            None => inner.records.iter().collect(),
        }
    }

    /// Snapshot of all records in append order.
    pub fn records(&self) -> Vec<GenerationAttemptRecord> {
        self.lock().records.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
