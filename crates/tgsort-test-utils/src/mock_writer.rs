// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock folder writer recording membership operations.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tgsort_core::{ApplyMode, FolderWriter, TgsortError};

/// One recorded `set_membership` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipOp {
    pub chat_id: i64,
    pub folder_id: i64,
    pub mode: ApplyMode,
}

/// A folder writer that records every successful operation and fails
/// (permanently) for chat ids registered via [`fail_chat`].
///
/// [`fail_chat`]: MockFolderWriter::fail_chat
pub struct MockFolderWriter {
    ops: Arc<Mutex<Vec<MembershipOp>>>,
    failing: Arc<Mutex<HashSet<i64>>>,
}

impl MockFolderWriter {
    pub fn new() -> Self {
        Self {
            ops: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Make `set_membership` fail for this chat id.
    pub async fn fail_chat(&self, chat_id: i64) {
        self.failing.lock().await.insert(chat_id);
    }

    /// All successfully recorded operations, in call order.
    pub async fn operations(&self) -> Vec<MembershipOp> {
        self.ops.lock().await.clone()
    }
}

impl Default for MockFolderWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FolderWriter for MockFolderWriter {
    async fn set_membership(
        &self,
        chat_id: i64,
        folder_id: i64,
        mode: ApplyMode,
    ) -> Result<(), TgsortError> {
        if self.failing.lock().await.contains(&chat_id) {
            return Err(TgsortError::telegram(format!(
                "injected failure for chat {chat_id}"
            )));
        }
        self.ops.lock().await.push(MembershipOp {
            chat_id,
            folder_id,
            mode,
        });
        Ok(())
    }
}
