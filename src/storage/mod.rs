//! Persistence layer.
//!
//! An append-only, line-oriented audit log. Each completed session appends
//! one small line group; existing content is never rewritten.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;

use crate::types::SessionRecord;

/// Append-only session audit log.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append the record's line group in a single write.
    pub fn append(&self, record: &SessionRecord) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(record.to_log_lines().as_bytes())?;
        file.flush()?;

        debug!(
            path = %self.path.display(),
            outcome = record.outcome.label(),
            "Audit entry appended"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
