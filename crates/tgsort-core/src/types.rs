// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types for the classification draft lifecycle.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Kind of Telegram chat, as reported by the chat source.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ChatKind {
    Group,
    Channel,
    Supergroup,
    Private,
    Bot,
    #[default]
    Unknown,
}

impl ChatKind {
    /// Whether this kind of chat is eligible for folder classification.
    /// Private chats and bots are listed but never batched.
    pub fn is_classifiable(self) -> bool {
        matches!(self, Self::Group | Self::Channel | Self::Supergroup)
    }
}

/// One chat from the user's dialog list. Immutable input for a run.
///
/// `description` and `last_message` are optional context the collector
/// gathers for the classifier prompt; they never influence the draft model
/// itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub chat_id: i64,
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: ChatKind,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
}

impl ChatRecord {
    pub fn new(chat_id: i64, title: impl Into<String>, kind: ChatKind) -> Self {
        Self {
            chat_id,
            title: title.into(),
            kind,
            username: None,
            description: None,
            last_message: None,
        }
    }
}

/// One existing Telegram folder. Immutable input for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRecord {
    pub folder_id: i64,
    pub title: String,
}

impl FolderRecord {
    pub fn new(folder_id: i64, title: impl Into<String>) -> Self {
        Self {
            folder_id,
            title: title.into(),
        }
    }
}

/// The two possible dispositions of a chat in the draft.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Disposition {
    Categorized,
    Unassigned,
}

/// One chat's disposition in the canonical draft.
///
/// Invariant: `folder_id` is `Some` iff `status` is [`Disposition::Categorized`],
/// and `reason` is never `Some("")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    pub chat_id: i64,
    pub status: Disposition,
    #[serde(default)]
    pub folder_id: Option<i64>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ClassificationEntry {
    pub fn categorized(chat_id: i64, folder_id: i64, reason: Option<String>) -> Self {
        Self {
            chat_id,
            status: Disposition::Categorized,
            folder_id: Some(folder_id),
            reason: normalize_reason(reason),
        }
    }

    pub fn unassigned(chat_id: i64, reason: Option<String>) -> Self {
        Self {
            chat_id,
            status: Disposition::Unassigned,
            folder_id: None,
            reason: normalize_reason(reason),
        }
    }

    pub fn is_categorized(&self) -> bool {
        self.status == Disposition::Categorized
    }
}

fn normalize_reason(reason: Option<String>) -> Option<String> {
    reason.filter(|r| !r.trim().is_empty())
}

/// Outcome of classifying one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The classifier returned entries (possibly empty) for this batch.
    Classified(Vec<ClassificationEntry>),
    /// Retries were exhausted; the message is the final error rendering.
    Failed(String),
}

/// Transient per-batch result, recorded into draft provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub batch_index: usize,
    pub outcome: BatchOutcome,
}

/// Run-level policy for the apply phase, decided once at run start.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplyMode {
    /// Replace prior folder membership with the draft's assignment.
    Clear,
    /// Add the draft's assignment on top of prior membership.
    Append,
}

/// Per-chat result of the apply executor. Never stored in the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub chat_id: i64,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn chat_kind_round_trips_through_strings() {
        for kind in [
            ChatKind::Group,
            ChatKind::Channel,
            ChatKind::Supergroup,
            ChatKind::Private,
            ChatKind::Bot,
            ChatKind::Unknown,
        ] {
            let s = kind.to_string();
            assert_eq!(ChatKind::from_str(&s).unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(serde_json::from_str::<ChatKind>(&json).unwrap(), kind);
        }
        assert_eq!(ChatKind::Supergroup.to_string(), "SUPERGROUP");
    }

    #[test]
    fn only_groups_and_channels_are_classifiable() {
        assert!(ChatKind::Group.is_classifiable());
        assert!(ChatKind::Channel.is_classifiable());
        assert!(ChatKind::Supergroup.is_classifiable());
        assert!(!ChatKind::Private.is_classifiable());
        assert!(!ChatKind::Bot.is_classifiable());
        assert!(!ChatKind::Unknown.is_classifiable());
    }

    #[test]
    fn disposition_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Disposition::Categorized).unwrap(),
            "\"categorized\""
        );
        assert_eq!(Disposition::from_str("unassigned").unwrap(), Disposition::Unassigned);
    }

    #[test]
    fn entry_constructors_uphold_invariants() {
        let e = ClassificationEntry::categorized(1, 42, Some("tech chat".into()));
        assert_eq!(e.folder_id, Some(42));
        assert!(e.is_categorized());

        let e = ClassificationEntry::unassigned(2, Some("  ".into()));
        assert_eq!(e.folder_id, None);
        assert_eq!(e.reason, None);

        let e = ClassificationEntry::categorized(3, 7, Some(String::new()));
        assert_eq!(e.reason, None);
    }

    #[test]
    fn chat_record_deserializes_with_sparse_fields() {
        let record: ChatRecord =
            serde_json::from_str(r#"{"chat_id": 5, "title": "Rust", "type": "GROUP"}"#).unwrap();
        assert_eq!(record.kind, ChatKind::Group);
        assert_eq!(record.username, None);
        assert_eq!(record.description, None);
    }
}
