// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tgsort status` command implementation.
//!
//! Reports on the committed classification and the operations journal
//! without touching the classifier or Telegram.

use std::collections::HashMap;

use colored::Colorize;
use tgsort_config::TgsortConfig;
use tgsort_core::TgsortError;
use tgsort_engine::{DraftStore, GroupsDocument};
use tgsort_telegram::source::ChatCacheDocument;
use tgsort_telegram::{CHATS_CACHE, JournalFolderWriter, OPS_JOURNAL};

pub fn run_status(config: &TgsortConfig) -> Result<(), TgsortError> {
    let store = DraftStore::new(config.data_dir())?;

    let final_path = store.final_json_path();
    if !final_path.exists() {
        println!("no committed classification at {}", final_path.display());
        println!("run {} to produce one", "tgsort run".bold());
        return Ok(());
    }

    let text = std::fs::read_to_string(&final_path)
        .map_err(|e| TgsortError::store(format!("reading {}", final_path.display()), e))?;
    let doc: GroupsDocument = serde_json::from_str(&text)
        .map_err(|e| TgsortError::store(format!("malformed {}", final_path.display()), e))?;

    let titles = chat_titles(config);
    println!("{} {}", "committed:".bold(), final_path.display());
    let mut assigned = 0usize;
    for group in &doc.categorized {
        assigned += group.chats.len();
        println!(
            "  {:>4}  {} (id {}){}",
            group.chats.len(),
            group.folder_title,
            group.folder_id,
            example_titles(&group.chats, &titles)
        );
    }
    println!("  assigned:   {assigned}");
    println!("  unassigned: {}", doc.unassigned.len());

    let draft_path = store.draft_json_path();
    if draft_path.exists() {
        println!("draft present: {}", draft_path.display());
    }

    let journal = JournalFolderWriter::new(config.data_dir().join(OPS_JOURNAL))?;
    if journal.path().exists() {
        let entries = journal.entries()?;
        println!("journal: {} operations in {}", entries.len(), journal.path().display());
    } else {
        println!("journal: empty (no apply has run)");
    }
    Ok(())
}

/// Chat id to title mapping from the collector's cache, if present.
/// Missing or stale caches degrade to id-only output.
fn chat_titles(config: &TgsortConfig) -> HashMap<i64, String> {
    let path = config.data_dir().join(CHATS_CACHE);
    let Ok(text) = std::fs::read_to_string(&path) else {
        return HashMap::new();
    };
    let Ok(doc) = serde_json::from_str::<ChatCacheDocument>(&text) else {
        return HashMap::new();
    };
    doc.chats
        .into_iter()
        .map(|chat| (chat.chat_id, chat.title))
        .collect()
}

/// Up to three example chat titles for a folder line.
fn example_titles(
    chats: &[tgsort_engine::store::GroupChat],
    titles: &HashMap<i64, String>,
) -> String {
    let examples: Vec<&str> = chats
        .iter()
        .filter_map(|chat| titles.get(&chat.chat_id))
        .map(String::as_str)
        .take(3)
        .collect();
    if examples.is_empty() {
        String::new()
    } else {
        format!("  e.g. {}", examples.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgsort_core::{ChatKind, ChatRecord, FolderRecord};
    use tgsort_engine::store::encode_json;
    use tgsort_engine::{Catalog, Draft};

    #[test]
    fn status_reads_a_committed_document() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(
            vec![ChatRecord::new(1, "Rust Developers", ChatKind::Group)],
            vec![FolderRecord::new(10, "Tech")],
        )
        .unwrap();
        let store = DraftStore::new(dir.path()).unwrap();
        store
            .commit(&Draft::unassigned_for(&catalog), &catalog)
            .unwrap();

        let mut config = TgsortConfig::default();
        config.paths.data_dir = dir.path().to_string_lossy().into_owned();
        run_status(&config).unwrap();

        let doc = encode_json(&Draft::unassigned_for(&catalog), &catalog);
        assert!(doc.categorized.is_empty());
        assert_eq!(doc.unassigned.len(), 1);
    }

    #[test]
    fn example_titles_come_from_the_chat_cache() {
        let titles: HashMap<i64, String> = [(1, "Rust Developers".to_string())].into();
        let chats = vec![
            tgsort_engine::store::GroupChat {
                chat_id: 1,
                kind: ChatKind::Group,
                reason: None,
            },
            tgsort_engine::store::GroupChat {
                chat_id: 99,
                kind: ChatKind::Group,
                reason: None,
            },
        ];
        assert_eq!(example_titles(&chats, &titles), "  e.g. Rust Developers");
        assert_eq!(example_titles(&chats, &HashMap::new()), "");
    }
}
