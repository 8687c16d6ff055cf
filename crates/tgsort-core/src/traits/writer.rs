// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folder membership writer, the only mutating collaborator.

use async_trait::async_trait;

use crate::error::TgsortError;
use crate::types::ApplyMode;

/// Capability that places one chat into one folder.
///
/// Invoked exclusively by the apply executor, and only for a sealed draft.
/// A failure affects that chat alone; the executor records it and moves on.
#[async_trait]
pub trait FolderWriter: Send + Sync {
    async fn set_membership(
        &self,
        chat_id: i64,
        folder_id: i64,
        mode: ApplyMode,
    ) -> Result<(), TgsortError>;
}
