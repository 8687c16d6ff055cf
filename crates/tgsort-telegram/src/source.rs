// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache-file backed chat and folder sources.
//!
//! A separate collector with a live Telegram session writes these caches;
//! the pipeline only ever reads them. Refreshing the cache is the
//! caller's decision, never this crate's.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tgsort_core::{ChatRecord, ChatSource, FolderRecord, FolderSource, TgsortError};
use tracing::info;

/// Default chat cache file name under the data directory.
pub const CHATS_CACHE: &str = "chats_info.json";
/// Default folder cache file name under the data directory.
pub const FOLDERS_CACHE: &str = "folders_info.json";

/// On-disk shape of the chat cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCacheDocument {
    pub timestamp: DateTime<Utc>,
    pub total_chats: usize,
    pub chats: Vec<ChatRecord>,
}

/// On-disk shape of the folder cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderCacheDocument {
    pub timestamp: DateTime<Utc>,
    pub total_folders: usize,
    pub folders: Vec<FolderRecord>,
}

/// [`ChatSource`] reading the collector's chat cache.
#[derive(Debug, Clone)]
pub struct CachedChatSource {
    path: PathBuf,
}

impl CachedChatSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

#[async_trait]
impl ChatSource for CachedChatSource {
    async fn list_chats(&self) -> Result<Vec<ChatRecord>, TgsortError> {
        let doc: ChatCacheDocument = read_json(&self.path)?;
        info!(
            path = %self.path.display(),
            chats = doc.chats.len(),
            cached_at = %doc.timestamp,
            "chat cache loaded"
        );
        Ok(doc.chats)
    }
}

/// [`FolderSource`] reading the collector's folder cache.
#[derive(Debug, Clone)]
pub struct CachedFolderSource {
    path: PathBuf,
}

impl CachedFolderSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

#[async_trait]
impl FolderSource for CachedFolderSource {
    async fn list_folders(&self) -> Result<Vec<FolderRecord>, TgsortError> {
        let doc: FolderCacheDocument = read_json(&self.path)?;
        info!(
            path = %self.path.display(),
            folders = doc.folders.len(),
            cached_at = %doc.timestamp,
            "folder cache loaded"
        );
        Ok(doc.folders)
    }
}

/// Write the chat cache in the shape [`CachedChatSource`] reads.
pub fn save_chat_cache(path: &Path, chats: &[ChatRecord]) -> Result<(), TgsortError> {
    let doc = ChatCacheDocument {
        timestamp: Utc::now(),
        total_chats: chats.len(),
        chats: chats.to_vec(),
    };
    write_json(path, &doc)
}

/// Write the folder cache in the shape [`CachedFolderSource`] reads.
pub fn save_folder_cache(path: &Path, folders: &[FolderRecord]) -> Result<(), TgsortError> {
    let doc = FolderCacheDocument {
        timestamp: Utc::now(),
        total_folders: folders.len(),
        folders: folders.to_vec(),
    };
    write_json(path, &doc)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, TgsortError> {
    let text = std::fs::read_to_string(path).map_err(|e| TgsortError::Telegram {
        message: format!("reading cache {}", path.display()),
        transient: false,
        source: Some(Box::new(e)),
    })?;
    serde_json::from_str(&text).map_err(|e| TgsortError::Telegram {
        message: format!("malformed cache {}", path.display()),
        transient: false,
        source: Some(Box::new(e)),
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), TgsortError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| TgsortError::Telegram {
        message: "serializing cache".into(),
        transient: false,
        source: Some(Box::new(e)),
    })?;
    std::fs::write(path, text).map_err(|e| TgsortError::Telegram {
        message: format!("writing cache {}", path.display()),
        transient: false,
        source: Some(Box::new(e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgsort_core::ChatKind;

    #[tokio::test]
    async fn chat_cache_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CHATS_CACHE);
        let chats = vec![
            ChatRecord::new(1, "Rust", ChatKind::Group),
            ChatRecord::new(2, "News", ChatKind::Channel),
        ];

        save_chat_cache(&path, &chats).unwrap();
        let loaded = CachedChatSource::new(&path).list_chats().await.unwrap();
        assert_eq!(loaded, chats);
    }

    #[tokio::test]
    async fn folder_cache_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FOLDERS_CACHE);
        let folders = vec![FolderRecord::new(10, "Tech")];

        save_folder_cache(&path, &folders).unwrap();
        let loaded = CachedFolderSource::new(&path).list_folders().await.unwrap();
        assert_eq!(loaded, folders);
    }

    #[tokio::test]
    async fn missing_cache_is_an_error() {
        let source = CachedChatSource::new("/nonexistent/chats_info.json");
        assert!(!source.exists());
        assert!(source.list_chats().await.is_err());
    }

    #[tokio::test]
    async fn malformed_cache_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CHATS_CACHE);
        std::fs::write(&path, "{not json").unwrap();
        assert!(CachedChatSource::new(&path).list_chats().await.is_err());
    }
}
