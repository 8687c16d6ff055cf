// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The canonical classification decision set.
//!
//! A [`Draft`] holds exactly one [`ClassificationEntry`] per catalog chat,
//! in catalog order. That total-function invariant is enforced at every
//! construction and mutation site; the store's importers, the orchestrator,
//! and the review loop all go through this module.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tgsort_core::{ClassificationEntry, FolderRecord, TgsortError};

use crate::catalog::Catalog;

/// Provenance metadata for a draft: when it was last reconciled and how
/// the classification run that produced it went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub reconciled_at: DateTime<Utc>,
    pub total_batches: usize,
    pub failed_batches: usize,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            reconciled_at: Utc::now(),
            total_batches: 0,
            failed_batches: 0,
        }
    }
}

/// The canonical, in-memory classification decision set for all known chats.
#[derive(Debug, Clone)]
pub struct Draft {
    entries: Vec<ClassificationEntry>,
    index: HashMap<i64, usize>,
    provenance: Provenance,
}

impl Draft {
    /// A draft where every catalog chat is unassigned with no reason.
    /// This is the starting state of every classification run.
    pub fn unassigned_for(catalog: &Catalog) -> Self {
        let entries: Vec<ClassificationEntry> = catalog
            .chats()
            .iter()
            .map(|c| ClassificationEntry::unassigned(c.chat_id, None))
            .collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.chat_id, i))
            .collect();
        Self {
            entries,
            index,
            provenance: Provenance::default(),
        }
    }

    /// Build a draft from a complete entry set.
    ///
    /// The entries must cover the catalog's chats exactly once; they are
    /// reordered into catalog order. Unknown chat ids, duplicates, and
    /// missing chats are rejected without producing a partial draft.
    pub fn from_entries(
        catalog: &Catalog,
        entries: Vec<ClassificationEntry>,
    ) -> Result<Self, TgsortError> {
        let mut by_id: HashMap<i64, ClassificationEntry> = HashMap::with_capacity(entries.len());
        for entry in entries {
            if !catalog.contains_chat(entry.chat_id) {
                return Err(TgsortError::UnknownChat(entry.chat_id));
            }
            let chat_id = entry.chat_id;
            if by_id.insert(chat_id, entry).is_some() {
                return Err(TgsortError::Import(format!("duplicate chat_id {chat_id}")));
            }
        }

        let mut draft = Self::unassigned_for(catalog);
        for (id, entry) in by_id {
            let i = draft.index[&id];
            draft.entries[i] = entry;
        }
        Ok(draft)
    }

    /// Replace one chat's disposition. The entry's folder, if any, must
    /// exist in the catalog.
    pub fn set(&mut self, catalog: &Catalog, entry: ClassificationEntry) -> Result<(), TgsortError> {
        let Some(&i) = self.index.get(&entry.chat_id) else {
            return Err(TgsortError::UnknownChat(entry.chat_id));
        };
        if let Some(folder_id) = entry.folder_id {
            if !catalog.contains_folder(folder_id) {
                return Err(TgsortError::UnknownFolder(folder_id));
            }
        }
        self.entries[i] = entry;
        Ok(())
    }

    pub fn entry(&self, chat_id: i64) -> Option<&ClassificationEntry> {
        self.index.get(&chat_id).map(|&i| &self.entries[i])
    }

    /// All entries, in catalog order.
    pub fn entries(&self) -> &[ClassificationEntry] {
        &self.entries
    }

    /// Unassigned entries, in catalog order.
    pub fn unassigned(&self) -> impl Iterator<Item = &ClassificationEntry> {
        self.entries.iter().filter(|e| !e.is_categorized())
    }

    /// Categorized entries, in catalog order.
    pub fn categorized(&self) -> impl Iterator<Item = &ClassificationEntry> {
        self.entries.iter().filter(|e| e.is_categorized())
    }

    pub fn unassigned_count(&self) -> usize {
        self.unassigned().count()
    }

    pub fn categorized_count(&self) -> usize {
        self.categorized().count()
    }

    /// Categorized entries grouped by folder, in catalog folder order.
    /// Folders with no members are omitted.
    pub fn folder_groups<'a>(
        &'a self,
        catalog: &'a Catalog,
    ) -> Vec<(&'a FolderRecord, Vec<&'a ClassificationEntry>)> {
        let mut groups = Vec::new();
        for folder in catalog.folders() {
            let members: Vec<&ClassificationEntry> = self
                .entries
                .iter()
                .filter(|e| e.folder_id == Some(folder.folder_id))
                .collect();
            if !members.is_empty() {
                groups.push((folder, members));
            }
        }
        groups
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn set_provenance(&mut self, provenance: Provenance) {
        self.provenance = provenance;
    }

    /// Refresh the reconciliation timestamp, e.g. after an import.
    pub fn touch(&mut self) {
        self.provenance.reconciled_at = Utc::now();
    }
}

/// A draft sealed by the confirmation gate. Read-only; the apply executor
/// accepts nothing else.
#[derive(Debug)]
pub struct SealedDraft {
    draft: Draft,
}

impl SealedDraft {
    pub(crate) fn new(draft: Draft) -> Self {
        Self { draft }
    }

    pub fn entries(&self) -> &[ClassificationEntry] {
        self.draft.entries()
    }

    pub fn categorized(&self) -> impl Iterator<Item = &ClassificationEntry> {
        self.draft.categorized()
    }

    pub fn unassigned_count(&self) -> usize {
        self.draft.unassigned_count()
    }
}
