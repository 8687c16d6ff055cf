// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The run's immutable inputs: chat and folder catalogs with id lookup.

use std::collections::HashMap;

use tgsort_core::{ChatRecord, FolderRecord, TgsortError};

/// Immutable chat and folder lists for one run.
///
/// Chat input order is the canonical order for everything downstream:
/// batch planning, draft entries, exports, and the apply pass all follow it.
#[derive(Debug, Clone)]
pub struct Catalog {
    chats: Vec<ChatRecord>,
    folders: Vec<FolderRecord>,
    chat_index: HashMap<i64, usize>,
    folder_index: HashMap<i64, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate chat or folder ids.
    pub fn new(chats: Vec<ChatRecord>, folders: Vec<FolderRecord>) -> Result<Self, TgsortError> {
        let mut chat_index = HashMap::with_capacity(chats.len());
        for (i, chat) in chats.iter().enumerate() {
            if chat_index.insert(chat.chat_id, i).is_some() {
                return Err(TgsortError::Internal(format!(
                    "duplicate chat_id {} in chat list",
                    chat.chat_id
                )));
            }
        }

        let mut folder_index = HashMap::with_capacity(folders.len());
        for (i, folder) in folders.iter().enumerate() {
            if folder_index.insert(folder.folder_id, i).is_some() {
                return Err(TgsortError::Internal(format!(
                    "duplicate folder_id {} in folder list",
                    folder.folder_id
                )));
            }
        }

        Ok(Self {
            chats,
            folders,
            chat_index,
            folder_index,
        })
    }

    /// All chats, in canonical input order.
    pub fn chats(&self) -> &[ChatRecord] {
        &self.chats
    }

    /// All folders, in input order.
    pub fn folders(&self) -> &[FolderRecord] {
        &self.folders
    }

    pub fn chat(&self, chat_id: i64) -> Option<&ChatRecord> {
        self.chat_index.get(&chat_id).map(|&i| &self.chats[i])
    }

    pub fn folder(&self, folder_id: i64) -> Option<&FolderRecord> {
        self.folder_index.get(&folder_id).map(|&i| &self.folders[i])
    }

    pub fn contains_chat(&self, chat_id: i64) -> bool {
        self.chat_index.contains_key(&chat_id)
    }

    pub fn contains_folder(&self, folder_id: i64) -> bool {
        self.folder_index.contains_key(&folder_id)
    }

    pub fn chat_count(&self) -> usize {
        self.chats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }
}
