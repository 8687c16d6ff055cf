// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram-side adapters at the pipeline's interface boundary.
//!
//! The MTProto session layer is external to this workspace. These
//! adapters speak to it through files: the collector's chat/folder caches
//! on the way in, and a membership operations journal on the way out.

pub mod source;
pub mod writer;

pub use source::{
    CHATS_CACHE, CachedChatSource, CachedFolderSource, FOLDERS_CACHE, save_chat_cache,
    save_folder_cache,
};
pub use writer::{JournalEntry, JournalFolderWriter, OPS_JOURNAL};
