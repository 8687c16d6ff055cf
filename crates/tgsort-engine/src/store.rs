// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dual-format draft persistence.
//!
//! One canonical in-memory [`Draft`] with two stateless codecs: a grouped
//! JSON document for machines and a flat CSV for spreadsheet review. Both
//! decode back to the same canonical model, and import is atomic: any
//! violation rejects the whole document and the prior draft stays
//! untouched.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tgsort_core::{ChatKind, ClassificationEntry, Disposition, TgsortError};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::draft::Draft;

/// Live draft file, exported after classification and re-read on import.
pub const DRAFT_JSON: &str = "groups.draft.json";
/// Final committed draft, written by the phase-1 commit.
pub const FINAL_JSON: &str = "groups.json";
/// Tabular review file for spreadsheet editing.
pub const REVIEW_CSV: &str = "classification_review.csv";

const CSV_HEADER: [&str; 8] = [
    "status",
    "folder_id",
    "folder_title",
    "chat_id",
    "chat_title",
    "chat_type",
    "username",
    "reason",
];

/// The JSON draft document: folder groups plus the unassigned list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupsDocument {
    pub categorized: Vec<FolderGroup>,
    #[serde(default)]
    pub unassigned: Vec<GroupChat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderGroup {
    pub folder_id: i64,
    pub folder_title: String,
    pub chats: Vec<GroupChat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupChat {
    pub chat_id: i64,
    #[serde(rename = "type", default)]
    pub kind: ChatKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Which on-disk representation an import reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftFormat {
    Json,
    Csv,
}

/// Draft persistence rooted at the run's data directory.
#[derive(Debug, Clone)]
pub struct DraftStore {
    data_dir: PathBuf,
}

impl DraftStore {
    /// Open a store, creating the data directory if needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, TgsortError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| TgsortError::store(format!("creating {}", data_dir.display()), e))?;
        Ok(Self { data_dir })
    }

    pub fn draft_json_path(&self) -> PathBuf {
        self.data_dir.join(DRAFT_JSON)
    }

    pub fn final_json_path(&self) -> PathBuf {
        self.data_dir.join(FINAL_JSON)
    }

    pub fn review_csv_path(&self) -> PathBuf {
        self.data_dir.join(REVIEW_CSV)
    }

    /// Write the live draft in both formats for operator editing.
    pub fn export(&self, draft: &Draft, catalog: &Catalog) -> Result<(), TgsortError> {
        self.write_json(&self.draft_json_path(), draft, catalog)?;
        let csv = encode_csv(draft, catalog)?;
        write_file(&self.review_csv_path(), &csv)?;
        debug!(dir = %self.data_dir.display(), "draft exported in both formats");
        Ok(())
    }

    /// Re-read the edited draft from disk in the chosen format.
    ///
    /// Returns a fresh draft; the caller replaces its working draft only
    /// on success, so a rejected document leaves prior state untouched.
    pub fn import(&self, format: DraftFormat, catalog: &Catalog) -> Result<Draft, TgsortError> {
        let draft = match format {
            DraftFormat::Json => {
                let text = read_file(&self.draft_json_path())?;
                let doc: GroupsDocument = serde_json::from_str(&text)
                    .map_err(|e| TgsortError::Import(format!("malformed JSON: {e}")))?;
                decode_json(&doc, catalog)?
            }
            DraftFormat::Csv => {
                let text = read_file(&self.review_csv_path())?;
                decode_csv(&text, catalog)?
            }
        };
        info!(
            format = ?format,
            categorized = draft.categorized_count(),
            unassigned = draft.unassigned_count(),
            "draft imported"
        );
        Ok(draft)
    }

    /// Load a previously committed final draft, if one exists.
    pub fn load_final(&self, catalog: &Catalog) -> Result<Option<Draft>, TgsortError> {
        let path = self.final_json_path();
        if !path.exists() {
            return Ok(None);
        }
        let text = read_file(&path)?;
        let doc: GroupsDocument = serde_json::from_str(&text)
            .map_err(|e| TgsortError::Import(format!("malformed JSON in {FINAL_JSON}: {e}")))?;
        Ok(Some(decode_json(&doc, catalog)?))
    }

    /// Phase-1 commit: persist the draft in both formats plus a
    /// never-overwritten timestamped backup. Returns the backup path.
    ///
    /// A failure here is fatal to the run; the confirmation prompt must
    /// not be offered without a durable copy on disk.
    pub fn commit(&self, draft: &Draft, catalog: &Catalog) -> Result<PathBuf, TgsortError> {
        self.write_json(&self.final_json_path(), draft, catalog)?;
        self.write_json(&self.draft_json_path(), draft, catalog)?;
        let csv = encode_csv(draft, catalog)?;
        write_file(&self.review_csv_path(), &csv)?;

        let backup = self.backup_path();
        self.write_json(&backup, draft, catalog)?;
        info!(backup = %backup.display(), "draft committed with backup");
        Ok(backup)
    }

    fn write_json(&self, path: &Path, draft: &Draft, catalog: &Catalog) -> Result<(), TgsortError> {
        let doc = encode_json(draft, catalog);
        let text = serde_json::to_string_pretty(&doc)
            .map_err(|e| TgsortError::store("serializing draft JSON", e))?;
        write_file(path, &text)
    }

    /// First free `YYYYMMDD_HHMMSS-groups.json` name; an existing file is
    /// never overwritten.
    fn backup_path(&self) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let base = self.data_dir.join(format!("{stamp}-groups.json"));
        if !base.exists() {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = self.data_dir.join(format!("{stamp}-groups-{n}.json"));
            if !candidate.exists() {
                return candidate;
            }
            n += 1;
        }
    }
}

fn read_file(path: &Path) -> Result<String, TgsortError> {
    std::fs::read_to_string(path)
        .map_err(|e| TgsortError::store(format!("reading {}", path.display()), e))
}

fn write_file(path: &Path, content: &str) -> Result<(), TgsortError> {
    std::fs::write(path, content)
        .map_err(|e| TgsortError::store(format!("writing {}", path.display()), e))
}

/// Encode the canonical draft as the grouped JSON document.
pub fn encode_json(draft: &Draft, catalog: &Catalog) -> GroupsDocument {
    let categorized = draft
        .folder_groups(catalog)
        .into_iter()
        .map(|(folder, members)| FolderGroup {
            folder_id: folder.folder_id,
            folder_title: folder.title.clone(),
            chats: members.iter().map(|e| group_chat(e, catalog)).collect(),
        })
        .collect();

    let unassigned = draft
        .unassigned()
        .map(|e| group_chat(e, catalog))
        .collect();

    GroupsDocument {
        categorized,
        unassigned,
    }
}

fn group_chat(entry: &ClassificationEntry, catalog: &Catalog) -> GroupChat {
    GroupChat {
        chat_id: entry.chat_id,
        kind: catalog
            .chat(entry.chat_id)
            .map(|c| c.kind)
            .unwrap_or_default(),
        reason: entry.reason.clone(),
    }
}

/// Decode the grouped JSON document back into a draft.
///
/// Atomic: any unknown id, duplicate chat, or inconsistency rejects the
/// whole document. Chats the document does not mention become unassigned.
pub fn decode_json(doc: &GroupsDocument, catalog: &Catalog) -> Result<Draft, TgsortError> {
    let mut entries = Vec::new();

    for group in &doc.categorized {
        if !catalog.contains_folder(group.folder_id) {
            return Err(TgsortError::Import(format!(
                "unknown folder_id {} in categorized groups",
                group.folder_id
            )));
        }
        for chat in &group.chats {
            if !catalog.contains_chat(chat.chat_id) {
                return Err(TgsortError::Import(format!(
                    "unknown chat_id {} in folder {}",
                    chat.chat_id, group.folder_id
                )));
            }
            entries.push(ClassificationEntry::categorized(
                chat.chat_id,
                group.folder_id,
                chat.reason.clone(),
            ));
        }
    }

    for chat in &doc.unassigned {
        if !catalog.contains_chat(chat.chat_id) {
            return Err(TgsortError::Import(format!(
                "unknown chat_id {} in unassigned list",
                chat.chat_id
            )));
        }
        entries.push(ClassificationEntry::unassigned(
            chat.chat_id,
            chat.reason.clone(),
        ));
    }

    Draft::from_entries(catalog, entries)
}

/// Encode the canonical draft as the flat CSV review document.
pub fn encode_csv(draft: &Draft, catalog: &Catalog) -> Result<String, TgsortError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_HEADER)
        .map_err(|e| TgsortError::store("writing CSV header", e))?;

    for entry in draft.entries() {
        let chat = catalog
            .chat(entry.chat_id)
            .ok_or_else(|| TgsortError::UnknownChat(entry.chat_id))?;
        let (folder_id, folder_title) = match entry.folder_id.and_then(|id| catalog.folder(id)) {
            Some(folder) => (folder.folder_id.to_string(), folder.title.clone()),
            None => (String::new(), String::new()),
        };
        let status = entry.status.to_string();
        let chat_id = chat.chat_id.to_string();
        let kind = chat.kind.to_string();
        writer
            .write_record([
                status.as_str(),
                folder_id.as_str(),
                folder_title.as_str(),
                chat_id.as_str(),
                chat.title.as_str(),
                kind.as_str(),
                chat.username.as_deref().unwrap_or(""),
                entry.reason.as_deref().unwrap_or(""),
            ])
            .map_err(|e| TgsortError::store("writing CSV row", e))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TgsortError::store("flushing CSV", e))?;
    String::from_utf8(bytes).map_err(|e| TgsortError::store("encoding CSV", e))
}

/// Decode the flat CSV review document back into a draft.
///
/// Atomic like the JSON decoder. A `categorized` row without a valid
/// folder id is malformed and rejects the whole document.
pub fn decode_csv(text: &str, catalog: &Catalog) -> Result<Draft, TgsortError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    {
        let headers = reader
            .headers()
            .map_err(|e| TgsortError::Import(format!("malformed CSV: {e}")))?;
        let got: Vec<&str> = headers.iter().collect();
        if got != CSV_HEADER {
            return Err(TgsortError::Import(format!(
                "unexpected CSV header: {}",
                got.join(",")
            )));
        }
    }

    let mut entries = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| TgsortError::Import(format!("malformed CSV row {}: {e}", line + 2)))?;
        let row = line + 2; // header is line 1

        let status = Disposition::from_str(&record[0])
            .map_err(|_| TgsortError::Import(format!("row {row}: invalid status `{}`", &record[0])))?;
        let chat_id: i64 = record[3]
            .parse()
            .map_err(|_| TgsortError::Import(format!("row {row}: invalid chat_id `{}`", &record[3])))?;
        if !catalog.contains_chat(chat_id) {
            return Err(TgsortError::Import(format!(
                "row {row}: unknown chat_id {chat_id}"
            )));
        }

        let reason = match &record[7] {
            "" => None,
            r => Some(r.to_string()),
        };

        let entry = match status {
            Disposition::Categorized => {
                let folder_id: i64 = record[1].parse().map_err(|_| {
                    TgsortError::Import(format!(
                        "row {row}: categorized row has invalid folder_id `{}`",
                        &record[1]
                    ))
                })?;
                if !catalog.contains_folder(folder_id) {
                    return Err(TgsortError::Import(format!(
                        "row {row}: unknown folder_id {folder_id}"
                    )));
                }
                ClassificationEntry::categorized(chat_id, folder_id, reason)
            }
            Disposition::Unassigned => ClassificationEntry::unassigned(chat_id, reason),
        };
        entries.push(entry);
    }

    Draft::from_entries(catalog, entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgsort_core::{ChatRecord, FolderRecord};

    fn catalog() -> Catalog {
        let mut chat = ChatRecord::new(1, "Rust Devs", ChatKind::Group);
        chat.username = Some("rustdevs".into());
        Catalog::new(
            vec![
                chat,
                ChatRecord::new(2, "Daily News", ChatKind::Channel),
                ChatRecord::new(999, "Wildcard", ChatKind::Group),
            ],
            vec![FolderRecord::new(10, "Tech"), FolderRecord::new(42, "Media")],
        )
        .unwrap()
    }

    fn sample_draft(catalog: &Catalog) -> Draft {
        let mut draft = Draft::unassigned_for(catalog);
        draft
            .set(catalog, ClassificationEntry::categorized(1, 10, Some("code talk".into())))
            .unwrap();
        draft
    }

    #[test]
    fn json_round_trip_preserves_entries() {
        let catalog = catalog();
        let draft = sample_draft(&catalog);

        let doc = encode_json(&draft, &catalog);
        let restored = decode_json(&doc, &catalog).unwrap();
        assert_eq!(restored.entries(), draft.entries());
    }

    #[test]
    fn csv_round_trip_preserves_entries() {
        let catalog = catalog();
        let draft = sample_draft(&catalog);

        let csv = encode_csv(&draft, &catalog).unwrap();
        let restored = decode_csv(&csv, &catalog).unwrap();
        assert_eq!(restored.entries(), draft.entries());
    }

    #[test]
    fn csv_header_is_exact() {
        let catalog = catalog();
        let draft = Draft::unassigned_for(&catalog);
        let csv = encode_csv(&draft, &catalog).unwrap();
        assert!(csv.starts_with(
            "status,folder_id,folder_title,chat_id,chat_title,chat_type,username,reason"
        ));
    }

    #[test]
    fn unassigned_rows_have_blank_folder_columns() {
        let catalog = catalog();
        let draft = Draft::unassigned_for(&catalog);
        let csv = encode_csv(&draft, &catalog).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("unassigned,,,1,"));
    }

    #[test]
    fn csv_edit_moves_chat_into_folder() {
        let catalog = catalog();
        let draft = sample_draft(&catalog);
        let csv = encode_csv(&draft, &catalog).unwrap();

        // Operator edit: move chat 999 from unassigned to folder 42.
        let edited = csv.replace("unassigned,,,999,", "categorized,42,Media,999,");
        let restored = decode_csv(&edited, &catalog).unwrap();

        let moved = restored.entry(999).unwrap();
        assert!(moved.is_categorized());
        assert_eq!(moved.folder_id, Some(42));
        // All other entries unchanged from before the edit.
        assert_eq!(restored.entry(1), draft.entry(1));
        assert_eq!(restored.entry(2), draft.entry(2));
    }

    #[test]
    fn unknown_folder_rejects_whole_document() {
        let catalog = catalog();
        let doc = GroupsDocument {
            categorized: vec![FolderGroup {
                folder_id: 777,
                folder_title: "Ghost".into(),
                chats: vec![GroupChat {
                    chat_id: 1,
                    kind: ChatKind::Group,
                    reason: None,
                }],
            }],
            unassigned: vec![],
        };
        let err = decode_json(&doc, &catalog).unwrap_err();
        assert!(matches!(err, TgsortError::Import(_)));
    }

    #[test]
    fn categorized_row_without_folder_is_malformed() {
        let catalog = catalog();
        let csv = "status,folder_id,folder_title,chat_id,chat_title,chat_type,username,reason\n\
                   categorized,,,1,Rust Devs,GROUP,rustdevs,\n";
        let err = decode_csv(csv, &catalog).unwrap_err();
        assert!(matches!(err, TgsortError::Import(_)));
    }

    #[test]
    fn duplicate_chat_rows_rejected() {
        let catalog = catalog();
        let csv = "status,folder_id,folder_title,chat_id,chat_title,chat_type,username,reason\n\
                   unassigned,,,1,Rust Devs,GROUP,rustdevs,\n\
                   unassigned,,,1,Rust Devs,GROUP,rustdevs,\n";
        let err = decode_csv(csv, &catalog).unwrap_err();
        assert!(matches!(err, TgsortError::Import(_)));
    }

    #[test]
    fn import_is_idempotent() {
        let catalog = catalog();
        let draft = sample_draft(&catalog);
        let doc = encode_json(&draft, &catalog);

        let once = decode_json(&doc, &catalog).unwrap();
        let twice = decode_json(&encode_json(&once, &catalog), &catalog).unwrap();
        assert_eq!(once.entries(), twice.entries());
    }

    #[test]
    fn store_export_import_and_commit() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(dir.path()).unwrap();
        let catalog = catalog();
        let draft = sample_draft(&catalog);

        store.export(&draft, &catalog).unwrap();
        let from_json = store.import(DraftFormat::Json, &catalog).unwrap();
        assert_eq!(from_json.entries(), draft.entries());
        let from_csv = store.import(DraftFormat::Csv, &catalog).unwrap();
        assert_eq!(from_csv.entries(), draft.entries());

        let backup = store.commit(&draft, &catalog).unwrap();
        assert!(backup.exists());
        assert!(store.final_json_path().exists());
        let reloaded = store.load_final(&catalog).unwrap().unwrap();
        assert_eq!(reloaded.entries(), draft.entries());
    }
}
