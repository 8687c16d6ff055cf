// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Membership operations journal.
//!
//! The apply executor's writes are appended as JSON lines to a journal the
//! session-holding helper replays against Telegram. One line per
//! operation, flushed immediately, so a crashed run loses at most the
//! operation in flight.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tgsort_core::{ApplyMode, FolderWriter, TgsortError};
use tracing::debug;

/// Default journal file name under the data directory.
pub const OPS_JOURNAL: &str = "membership_ops.jsonl";

/// One journaled membership operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub ts: DateTime<Utc>,
    pub chat_id: i64,
    pub folder_id: i64,
    pub mode: ApplyMode,
}

/// [`FolderWriter`] appending one JSON line per operation.
#[derive(Debug, Clone)]
pub struct JournalFolderWriter {
    path: PathBuf,
}

impl JournalFolderWriter {
    /// Open the journal for appending, creating parent directories.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, TgsortError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TgsortError::Telegram {
                message: format!("creating journal directory {}", parent.display()),
                transient: false,
                source: Some(Box::new(e)),
            })?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back all journaled operations, oldest first.
    pub fn entries(&self) -> Result<Vec<JournalEntry>, TgsortError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(&self.path).map_err(|e| TgsortError::Telegram {
            message: format!("reading journal {}", self.path.display()),
            transient: false,
            source: Some(Box::new(e)),
        })?;
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| TgsortError::Telegram {
                    message: format!("malformed journal line in {}", self.path.display()),
                    transient: false,
                    source: Some(Box::new(e)),
                })
            })
            .collect()
    }
}

#[async_trait]
impl FolderWriter for JournalFolderWriter {
    async fn set_membership(
        &self,
        chat_id: i64,
        folder_id: i64,
        mode: ApplyMode,
    ) -> Result<(), TgsortError> {
        let entry = JournalEntry {
            ts: Utc::now(),
            chat_id,
            folder_id,
            mode,
        };
        let line = serde_json::to_string(&entry).map_err(|e| TgsortError::Telegram {
            message: "serializing journal entry".into(),
            transient: false,
            source: Some(Box::new(e)),
        })?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| TgsortError::Telegram {
                message: format!("opening journal {}", self.path.display()),
                transient: false,
                source: Some(Box::new(e)),
            })?;
        writeln!(file, "{line}").map_err(|e| TgsortError::Telegram {
            message: format!("appending to journal {}", self.path.display()),
            transient: false,
            source: Some(Box::new(e)),
        })?;

        debug!(chat_id, folder_id, mode = %mode, "membership operation journaled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn operations_append_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let writer = JournalFolderWriter::new(dir.path().join(OPS_JOURNAL)).unwrap();

        writer.set_membership(1, 10, ApplyMode::Clear).await.unwrap();
        writer.set_membership(2, 10, ApplyMode::Clear).await.unwrap();
        writer.set_membership(3, 20, ApplyMode::Append).await.unwrap();

        let entries = writer.entries().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].chat_id, 1);
        assert_eq!(entries[2].folder_id, 20);
        assert_eq!(entries[2].mode, ApplyMode::Append);
    }

    #[tokio::test]
    async fn empty_journal_reads_as_no_entries() {
        let dir = tempfile::tempdir().unwrap();
        let writer = JournalFolderWriter::new(dir.path().join(OPS_JOURNAL)).unwrap();
        assert!(writer.entries().unwrap().is_empty());
    }

    #[test]
    fn nested_journal_path_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep/nested/ops.jsonl");
        let writer = JournalFolderWriter::new(&path).unwrap();
        assert_eq!(writer.path(), path);
        assert!(path.parent().unwrap().exists());
    }
}
