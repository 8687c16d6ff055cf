// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drives the classifier over planned batches and merges results into a
//! draft.
//!
//! Batches run sequentially so retry delays and provider rate limits are
//! respected deterministically. One batch exhausting its retries never
//! aborts the run; its chats are recorded unassigned and the run moves on.

use tgsort_core::{
    BatchOutcome, BatchResult, ChatRecord, ClassificationEntry, Classifier, RetryPolicy,
};
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::draft::{Draft, Provenance};
use crate::planner::BatchPlanner;

const REASON_BATCH_FAILED: &str = "classification failed";
const REASON_INVALID_RESPONSE: &str = "invalid AI response";

/// Sequentially classifies planned batches and accumulates one draft.
#[derive(Debug, Clone, Copy)]
pub struct Orchestrator {
    retry: RetryPolicy,
    planner: BatchPlanner,
}

impl Orchestrator {
    pub fn new(retry: RetryPolicy, batch_size: usize) -> Self {
        Self {
            retry,
            planner: BatchPlanner::new(batch_size),
        }
    }

    /// Classify every catalog chat.
    ///
    /// The returned draft covers the input chat set exactly once, no
    /// matter how many batches failed; provenance records the batch
    /// coverage. Per-batch outcomes are also returned for reporting.
    pub async fn classify(
        &self,
        catalog: &Catalog,
        classifier: &dyn Classifier,
    ) -> (Draft, Vec<BatchResult>) {
        let mut draft = Draft::unassigned_for(catalog);
        let mut results = Vec::new();
        let total_batches = self.planner.batch_count(catalog);

        for (batch_index, batch) in self.planner.plan(catalog).enumerate() {
            let label = format!("classify batch {}/{total_batches}", batch_index + 1);
            info!(
                provider = classifier.name(),
                batch = batch_index + 1,
                total = total_batches,
                chats = batch.len(),
                "classifying batch"
            );

            let outcome = match self
                .retry
                .run(&label, || classifier.classify_batch(batch, catalog.folders()))
                .await
            {
                Ok(entries) => {
                    let accepted = self.merge_batch(catalog, &mut draft, batch, entries);
                    BatchOutcome::Classified(accepted)
                }
                Err(err) => {
                    warn!(
                        batch = batch_index + 1,
                        error = %err,
                        "batch failed after retries, marking chats unassigned"
                    );
                    for chat in batch {
                        let entry = ClassificationEntry::unassigned(
                            chat.chat_id,
                            Some(REASON_BATCH_FAILED.to_string()),
                        );
                        // Unassigned entries carry no folder id; set cannot fail here.
                        let _ = draft.set(catalog, entry);
                    }
                    BatchOutcome::Failed(err.to_string())
                }
            };

            results.push(BatchResult {
                batch_index,
                outcome,
            });
        }

        let failed_batches = results
            .iter()
            .filter(|r| matches!(r.outcome, BatchOutcome::Failed(_)))
            .count();
        draft.set_provenance(Provenance {
            reconciled_at: chrono::Utc::now(),
            total_batches,
            failed_batches,
        });

        info!(
            categorized = draft.categorized_count(),
            unassigned = draft.unassigned_count(),
            failed_batches,
            total_batches,
            "classification run complete"
        );

        (draft, results)
    }

    /// Validate and apply one batch's entries to the draft.
    ///
    /// Entries for chats outside the batch are discarded. An entry naming
    /// an unknown folder, or categorized without a folder, reverts its chat
    /// to unassigned with reason "invalid AI response". Chats the response
    /// omits keep their unassigned default.
    fn merge_batch(
        &self,
        catalog: &Catalog,
        draft: &mut Draft,
        batch: &[ChatRecord],
        entries: Vec<ClassificationEntry>,
    ) -> Vec<ClassificationEntry> {
        let mut accepted = Vec::with_capacity(entries.len());

        for entry in entries {
            if !batch.iter().any(|c| c.chat_id == entry.chat_id) {
                warn!(
                    chat_id = entry.chat_id,
                    "classifier returned a chat outside the batch, discarding"
                );
                continue;
            }

            let valid = match entry.folder_id {
                Some(folder_id) => entry.is_categorized() && catalog.contains_folder(folder_id),
                None => !entry.is_categorized(),
            };

            let resolved = if valid {
                entry
            } else {
                warn!(
                    chat_id = entry.chat_id,
                    folder_id = entry.folder_id,
                    "invalid classifier entry, reverting chat to unassigned"
                );
                ClassificationEntry::unassigned(
                    entry.chat_id,
                    Some(REASON_INVALID_RESPONSE.to_string()),
                )
            };

            // Chat and folder were checked above; set cannot fail.
            let _ = draft.set(catalog, resolved.clone());
            accepted.push(resolved);
        }

        accepted
    }
}
