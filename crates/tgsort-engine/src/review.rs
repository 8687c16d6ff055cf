// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive resolution of unassigned chats, as an explicit state machine.
//!
//! The session owns a cursor over the draft's ordered unassigned chats;
//! every operator command is a named transition, so the control flow is
//! testable without driving a real console.

use std::collections::HashSet;

use tgsort_core::{ChatRecord, ClassificationEntry, FolderRecord, TgsortError};

use crate::catalog::Catalog;
use crate::draft::Draft;

const REASON_MANUAL: &str = "manual review";
const REASON_BULK: &str = "bulk manual assignment";

/// Operator commands driving the review loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewCommand {
    /// Leave the current chat unassigned and advance.
    Ignore,
    /// Assign the current chat to the given folder and advance.
    Manual(i64),
    /// Assign every remaining unassigned chat to the given folder.
    ManualAll(i64),
    /// Re-display the folder catalog; cursor unchanged.
    List,
    /// Terminate, leaving remaining chats unassigned.
    Quit,
}

impl ReviewCommand {
    /// Parse an operator input line. Accepts short and long forms:
    /// `i`/`ignore`, `m <id>`/`manual <id>`, `a <id>`/`all <id>`,
    /// `l`/`list`, `q`/`quit`.
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.split_whitespace();
        let verb = parts.next()?;
        let arg = parts.next();
        if parts.next().is_some() {
            return None;
        }

        match (verb, arg) {
            ("i" | "ignore", None) => Some(Self::Ignore),
            ("l" | "list", None) => Some(Self::List),
            ("q" | "quit", None) => Some(Self::Quit),
            ("m" | "manual", Some(id)) => id.parse().ok().map(Self::Manual),
            ("a" | "all", Some(id)) => id.parse().ok().map(Self::ManualAll),
            _ => None,
        }
    }
}

/// How the review loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewExit {
    /// Cursor reached the end of the unassigned list.
    Exhausted,
    /// `ManualAll` categorized this many remaining chats.
    BulkAssigned(usize),
    /// Operator quit; remaining chats stay unassigned.
    Quit,
}

/// Result of applying one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStep {
    /// Cursor moved to the next unassigned chat.
    Advanced,
    /// Informational command; cursor unchanged.
    Listed,
    /// The loop terminated.
    Finished(ReviewExit),
}

/// A cursor-driven pass over the draft's unassigned chats.
///
/// The pending list is captured at construction in draft order; chats
/// categorized outside the loop beforehand are never visited, and the loop
/// never touches entries it was not asked to change.
pub struct ReviewSession<'a> {
    draft: &'a mut Draft,
    pending: Vec<i64>,
    cursor: usize,
}

impl<'a> ReviewSession<'a> {
    pub fn new(draft: &'a mut Draft) -> Self {
        let pending = draft.unassigned().map(|e| e.chat_id).collect();
        Self {
            draft,
            pending,
            cursor: 0,
        }
    }

    /// Chat id under the cursor, or `None` when the list is exhausted.
    pub fn current(&self) -> Option<i64> {
        self.pending.get(self.cursor).copied()
    }

    /// Chats not yet visited, including the current one.
    pub fn remaining(&self) -> usize {
        self.pending.len().saturating_sub(self.cursor)
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.pending.len()
    }

    /// Apply one operator command at the current cursor position.
    pub fn apply(
        &mut self,
        catalog: &Catalog,
        command: ReviewCommand,
    ) -> Result<ReviewStep, TgsortError> {
        match command {
            ReviewCommand::List => Ok(ReviewStep::Listed),
            ReviewCommand::Quit => Ok(ReviewStep::Finished(ReviewExit::Quit)),
            ReviewCommand::Ignore => Ok(self.advance()),
            ReviewCommand::Manual(folder_id) => {
                let Some(chat_id) = self.current() else {
                    return Ok(ReviewStep::Finished(ReviewExit::Exhausted));
                };
                self.draft.set(
                    catalog,
                    ClassificationEntry::categorized(
                        chat_id,
                        folder_id,
                        Some(REASON_MANUAL.to_string()),
                    ),
                )?;
                Ok(self.advance())
            }
            ReviewCommand::ManualAll(folder_id) => {
                if !catalog.contains_folder(folder_id) {
                    return Err(TgsortError::UnknownFolder(folder_id));
                }
                let remaining: Vec<i64> = self.pending[self.cursor..].to_vec();
                for chat_id in &remaining {
                    self.draft.set(
                        catalog,
                        ClassificationEntry::categorized(
                            *chat_id,
                            folder_id,
                            Some(REASON_BULK.to_string()),
                        ),
                    )?;
                }
                self.cursor = self.pending.len();
                Ok(ReviewStep::Finished(ReviewExit::BulkAssigned(
                    remaining.len(),
                )))
            }
        }
    }

    fn advance(&mut self) -> ReviewStep {
        self.cursor += 1;
        if self.cursor >= self.pending.len() {
            ReviewStep::Finished(ReviewExit::Exhausted)
        } else {
            ReviewStep::Advanced
        }
    }
}

/// Suggest a folder for a chat by keyword overlap between the folder title
/// and the chat's title, description, and last message.
pub fn suggest_folder<'a>(
    chat: &ChatRecord,
    folders: &'a [FolderRecord],
) -> Option<&'a FolderRecord> {
    let haystack: HashSet<String> = [
        Some(chat.title.as_str()),
        chat.description.as_deref(),
        chat.last_message.as_deref(),
    ]
    .into_iter()
    .flatten()
    .flat_map(tokenize)
    .collect();

    folders
        .iter()
        .map(|folder| {
            let score = tokenize(&folder.title)
                .filter(|token| haystack.contains(token))
                .count();
            (folder, score)
        })
        .filter(|(_, score)| *score > 0)
        .max_by_key(|(_, score)| *score)
        .map(|(folder, _)| folder)
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgsort_core::ChatKind;

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                ChatRecord::new(1, "Rust", ChatKind::Group),
                ChatRecord::new(2, "News", ChatKind::Channel),
                ChatRecord::new(3, "Memes", ChatKind::Group),
            ],
            vec![FolderRecord::new(10, "Tech"), FolderRecord::new(20, "Fun")],
        )
        .unwrap()
    }

    #[test]
    fn parse_accepts_short_and_long_forms() {
        assert_eq!(ReviewCommand::parse("i"), Some(ReviewCommand::Ignore));
        assert_eq!(ReviewCommand::parse("ignore"), Some(ReviewCommand::Ignore));
        assert_eq!(ReviewCommand::parse("m 10"), Some(ReviewCommand::Manual(10)));
        assert_eq!(ReviewCommand::parse("all 20"), Some(ReviewCommand::ManualAll(20)));
        assert_eq!(ReviewCommand::parse("q"), Some(ReviewCommand::Quit));
        assert_eq!(ReviewCommand::parse("m"), None);
        assert_eq!(ReviewCommand::parse("m ten"), None);
        assert_eq!(ReviewCommand::parse("i extra"), None);
        assert_eq!(ReviewCommand::parse(""), None);
    }

    #[test]
    fn ignore_advances_and_exhausts() {
        let catalog = catalog();
        let mut draft = Draft::unassigned_for(&catalog);
        let mut session = ReviewSession::new(&mut draft);

        assert_eq!(session.current(), Some(1));
        assert_eq!(session.apply(&catalog, ReviewCommand::Ignore).unwrap(), ReviewStep::Advanced);
        assert_eq!(session.current(), Some(2));
        assert_eq!(session.apply(&catalog, ReviewCommand::Ignore).unwrap(), ReviewStep::Advanced);
        assert_eq!(
            session.apply(&catalog, ReviewCommand::Ignore).unwrap(),
            ReviewStep::Finished(ReviewExit::Exhausted)
        );
        assert_eq!(draft.unassigned_count(), 3);
    }

    #[test]
    fn manual_assigns_with_reason_and_advances() {
        let catalog = catalog();
        let mut draft = Draft::unassigned_for(&catalog);
        let mut session = ReviewSession::new(&mut draft);

        session.apply(&catalog, ReviewCommand::Manual(10)).unwrap();
        assert_eq!(session.current(), Some(2));

        let entry = draft.entry(1).unwrap();
        assert_eq!(entry.folder_id, Some(10));
        assert_eq!(entry.reason.as_deref(), Some("manual review"));
    }

    #[test]
    fn manual_rejects_unknown_folder_without_advancing() {
        let catalog = catalog();
        let mut draft = Draft::unassigned_for(&catalog);
        let mut session = ReviewSession::new(&mut draft);

        let err = session.apply(&catalog, ReviewCommand::Manual(999)).unwrap_err();
        assert!(matches!(err, TgsortError::UnknownFolder(999)));
        assert_eq!(session.current(), Some(1));
        assert!(!draft.entry(1).unwrap().is_categorized());
    }

    #[test]
    fn manual_all_categorizes_from_cursor_to_end() {
        let catalog = catalog();
        let mut draft = Draft::unassigned_for(&catalog);
        let mut session = ReviewSession::new(&mut draft);

        // Resolve chat 1 first, then bulk-assign the remainder.
        session.apply(&catalog, ReviewCommand::Manual(10)).unwrap();
        let step = session.apply(&catalog, ReviewCommand::ManualAll(20)).unwrap();
        assert_eq!(step, ReviewStep::Finished(ReviewExit::BulkAssigned(2)));

        assert_eq!(draft.entry(1).unwrap().folder_id, Some(10));
        assert_eq!(draft.entry(1).unwrap().reason.as_deref(), Some("manual review"));
        for chat_id in [2, 3] {
            let entry = draft.entry(chat_id).unwrap();
            assert_eq!(entry.folder_id, Some(20));
            assert_eq!(entry.reason.as_deref(), Some("bulk manual assignment"));
        }
    }

    #[test]
    fn list_does_not_move_cursor() {
        let catalog = catalog();
        let mut draft = Draft::unassigned_for(&catalog);
        let mut session = ReviewSession::new(&mut draft);

        assert_eq!(session.apply(&catalog, ReviewCommand::List).unwrap(), ReviewStep::Listed);
        assert_eq!(session.current(), Some(1));
    }

    #[test]
    fn quit_leaves_remaining_unassigned() {
        let catalog = catalog();
        let mut draft = Draft::unassigned_for(&catalog);
        let mut session = ReviewSession::new(&mut draft);

        session.apply(&catalog, ReviewCommand::Ignore).unwrap();
        let step = session.apply(&catalog, ReviewCommand::Quit).unwrap();
        assert_eq!(step, ReviewStep::Finished(ReviewExit::Quit));
        assert_eq!(draft.unassigned_count(), 3);
    }

    #[test]
    fn session_skips_already_categorized_chats() {
        let catalog = catalog();
        let mut draft = Draft::unassigned_for(&catalog);
        draft
            .set(&catalog, ClassificationEntry::categorized(2, 10, None))
            .unwrap();

        let session = ReviewSession::new(&mut draft);
        assert_eq!(session.total(), 2);
        assert_eq!(session.current(), Some(1));
    }

    #[test]
    fn suggest_folder_by_title_overlap() {
        let mut chat = ChatRecord::new(1, "Tech Talk Berlin", ChatKind::Group);
        chat.description = Some("programming and tech news".into());
        let folders = vec![FolderRecord::new(10, "Tech"), FolderRecord::new(20, "Travel")];

        let suggestion = suggest_folder(&chat, &folders);
        assert_eq!(suggestion.map(|f| f.folder_id), Some(10));

        let no_overlap = ChatRecord::new(2, "Cooking", ChatKind::Group);
        assert!(suggest_folder(&no_overlap, &folders).is_none());
    }
}
