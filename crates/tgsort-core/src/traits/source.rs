// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only sources for the run's immutable inputs.

use async_trait::async_trait;

use crate::error::TgsortError;
use crate::types::{ChatRecord, FolderRecord};

/// Source of the user's chat list, in a stable order.
///
/// Cache invalidation and refresh are the caller's decision; the core never
/// asks a source to re-fetch.
#[async_trait]
pub trait ChatSource: Send + Sync {
    async fn list_chats(&self) -> Result<Vec<ChatRecord>, TgsortError>;
}

/// Source of the user's existing folders.
#[async_trait]
pub trait FolderSource: Send + Sync {
    async fn list_folders(&self) -> Result<Vec<FolderRecord>, TgsortError>;
}
