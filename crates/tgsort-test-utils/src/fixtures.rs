// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ready-made catalogs for engine and adapter tests.

use tgsort_core::{ChatKind, ChatRecord, FolderRecord};
use tgsort_engine::Catalog;

/// Five classifiable chats and two folders; with batch size 2 this plans
/// batches of sizes [2, 2, 1].
pub fn five_chat_catalog() -> Catalog {
    let chats = vec![
        chat(1, "Rust Developers", ChatKind::Group, Some("rustdevs")),
        chat(2, "Kernel Digest", ChatKind::Channel, None),
        chat(3, "Daily World News", ChatKind::Channel, Some("worldnews")),
        chat(4, "Meme Factory", ChatKind::Group, None),
        chat(5, "Compiler Club", ChatKind::Supergroup, None),
    ];
    let folders = vec![
        FolderRecord::new(10, "Tech"),
        FolderRecord::new(20, "News"),
    ];
    Catalog::new(chats, folders).expect("fixture ids are unique")
}

/// A small catalog with one chat per kind, including unclassifiable ones.
pub fn mixed_kind_catalog() -> Catalog {
    let chats = vec![
        chat(1, "Group Chat", ChatKind::Group, None),
        chat(2, "Broadcast", ChatKind::Channel, None),
        chat(3, "Big Group", ChatKind::Supergroup, None),
        chat(4, "Alice", ChatKind::Private, Some("alice")),
        chat(5, "Helper Bot", ChatKind::Bot, Some("helperbot")),
    ];
    let folders = vec![FolderRecord::new(1, "Everything")];
    Catalog::new(chats, folders).expect("fixture ids are unique")
}

fn chat(chat_id: i64, title: &str, kind: ChatKind, username: Option<&str>) -> ChatRecord {
    let mut record = ChatRecord::new(chat_id, title, kind);
    record.username = username.map(str::to_string);
    record
}
