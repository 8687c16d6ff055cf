// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classifier trait for AI provider integrations (OpenAI, Gemini).

use async_trait::async_trait;

use crate::error::TgsortError;
use crate::types::{ChatRecord, ClassificationEntry, FolderRecord};

/// Capability that assigns a batch of chats to existing folders.
///
/// Implementations must be idempotent-safe to retry: repeated calls with
/// the same batch may waste quota but must not corrupt anything. Transport
/// failures worth retrying are reported with
/// [`TgsortError::is_transient`] returning true; the caller owns the retry
/// loop.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Provider name for logs and error messages.
    fn name(&self) -> &str;

    /// Classify one batch of chats against the available folder catalog.
    ///
    /// Returns categorized entries only for chats the provider was
    /// confident about; omitted chats stay unassigned. The caller validates
    /// every returned entry, so implementations may be lenient when parsing
    /// provider output.
    async fn classify_batch(
        &self,
        chats: &[ChatRecord],
        folders: &[FolderRecord],
    ) -> Result<Vec<ClassificationEntry>, TgsortError>;
}
