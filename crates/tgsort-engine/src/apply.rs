// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Converts a sealed draft into per-chat folder membership operations.
//!
//! Failures are isolated per chat: a remote error on one chat is recorded
//! and the pass continues. The same bounded-retry policy used for
//! classification governs each membership write.

use tgsort_core::{ApplyMode, ApplyOutcome, FolderWriter, RetryPolicy};
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::draft::SealedDraft;

/// Executes the apply pass for a sealed draft.
#[derive(Debug, Clone, Copy)]
pub struct ApplyExecutor {
    mode: ApplyMode,
    retry: RetryPolicy,
}

/// Aggregated result of one apply pass. Rendered for the operator and the
/// run log; never stored in the draft.
#[derive(Debug, Clone)]
pub struct ApplyReport {
    pub mode: ApplyMode,
    pub outcomes: Vec<ApplyOutcome>,
    pub unassigned: usize,
}

impl ApplyReport {
    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ApplyOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }

    /// Operator-visible summary, one line per fact.
    pub fn summary_lines(&self, catalog: &Catalog) -> Vec<String> {
        let mut lines = vec![
            format!("Apply complete (mode: {})", self.mode),
            format!("  assigned: {}", self.succeeded_count()),
            format!("  failed:   {}", self.failed_count()),
            format!("  unassigned (skipped): {}", self.unassigned),
        ];
        for outcome in self.failures() {
            let title = catalog
                .chat(outcome.chat_id)
                .map(|c| c.title.as_str())
                .unwrap_or("<unknown>");
            lines.push(format!(
                "  FAILED {} ({}): {}",
                outcome.chat_id,
                title,
                outcome.error.as_deref().unwrap_or("unknown error")
            ));
        }
        lines
    }
}

impl ApplyExecutor {
    pub fn new(mode: ApplyMode, retry: RetryPolicy) -> Self {
        Self { mode, retry }
    }

    pub fn mode(&self) -> ApplyMode {
        self.mode
    }

    /// Request folder membership for every categorized entry, in draft
    /// order. One chat's failure never aborts the pass.
    pub async fn apply(&self, sealed: &SealedDraft, writer: &dyn FolderWriter) -> ApplyReport {
        let mut outcomes = Vec::new();

        for entry in sealed.categorized() {
            // Sealed drafts uphold the folder invariant; this is total.
            let Some(folder_id) = entry.folder_id else {
                continue;
            };
            let chat_id = entry.chat_id;
            let label = format!("set membership for chat {chat_id}");

            let outcome = match self
                .retry
                .run(&label, || writer.set_membership(chat_id, folder_id, self.mode))
                .await
            {
                Ok(()) => {
                    info!(chat_id, folder_id, "membership applied");
                    ApplyOutcome {
                        chat_id,
                        succeeded: true,
                        error: None,
                    }
                }
                Err(err) => {
                    warn!(chat_id, folder_id, error = %err, "membership write failed");
                    ApplyOutcome {
                        chat_id,
                        succeeded: false,
                        error: Some(err.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        let report = ApplyReport {
            mode: self.mode,
            outcomes,
            unassigned: sealed.unassigned_count(),
        };
        info!(
            assigned = report.succeeded_count(),
            failed = report.failed_count(),
            unassigned = report.unassigned,
            "apply pass complete"
        );
        report
    }
}
