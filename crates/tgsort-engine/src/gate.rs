// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-phase confirmation guarding the transition from draft to apply.
//!
//! Phase 1 commits the draft to durable storage before any prompt is
//! issued, so an aborted or crashed session always leaves the last
//! reviewed state recoverable. Phase 2 asks the operator inside a bounded
//! window; anything other than a timely affirmative denies the apply.

use std::future::Future;
use std::time::Duration;

use tgsort_core::TgsortError;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::draft::{Draft, SealedDraft};
use crate::store::DraftStore;

/// Why the gate refused to release the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDenial {
    /// The operator answered negatively.
    Declined,
    /// No answer arrived inside the confirmation window.
    TimedOut,
}

/// Outcome of the two-phase protocol.
#[derive(Debug)]
pub enum GateDecision {
    /// Affirmed in time; the sealed draft may be applied.
    Approved(SealedDraft),
    /// The draft stays committed on disk, unapplied.
    Denied(GateDenial),
}

/// The gate between "satisfied with the classification" and "approve
/// mutating real folder structure".
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationGate {
    timeout: Duration,
}

impl ConfirmationGate {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run both phases.
    ///
    /// `ask` resolves to the operator's yes/no answer. A phase-1 commit
    /// failure is returned as an error and the prompt is never shown.
    /// Only `Ok(true)` strictly inside the window seals the draft.
    pub async fn run<F, Fut>(
        &self,
        draft: Draft,
        store: &DraftStore,
        catalog: &Catalog,
        ask: F,
    ) -> Result<GateDecision, TgsortError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<bool, TgsortError>>,
    {
        let backup = store.commit(&draft, catalog)?;
        info!(backup = %backup.display(), "phase-1 commit complete, requesting confirmation");

        match tokio::time::timeout(self.timeout, ask()).await {
            Ok(Ok(true)) => {
                info!("apply confirmed, sealing draft");
                Ok(GateDecision::Approved(SealedDraft::new(draft)))
            }
            Ok(Ok(false)) => {
                info!("apply declined, draft left committed on disk");
                Ok(GateDecision::Denied(GateDenial::Declined))
            }
            Ok(Err(err)) => Err(err),
            Err(_) => {
                warn!(timeout = ?self.timeout, "confirmation window elapsed, denying apply");
                Ok(GateDecision::Denied(GateDenial::TimedOut))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgsort_core::{ChatKind, ChatRecord, FolderRecord};

    fn fixtures() -> (Catalog, DraftStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(dir.path()).unwrap();
        let catalog = Catalog::new(
            vec![ChatRecord::new(1, "Rust", ChatKind::Group)],
            vec![FolderRecord::new(10, "Tech")],
        )
        .unwrap();
        (catalog, store, dir)
    }

    #[tokio::test]
    async fn affirmative_seals_the_draft() {
        let (catalog, store, _dir) = fixtures();
        let gate = ConfirmationGate::new(Duration::from_secs(5));
        let draft = Draft::unassigned_for(&catalog);

        let decision = gate
            .run(draft, &store, &catalog, || async { Ok(true) })
            .await
            .unwrap();

        assert!(matches!(decision, GateDecision::Approved(_)));
        assert!(store.final_json_path().exists());
    }

    #[tokio::test]
    async fn decline_denies_but_keeps_commit() {
        let (catalog, store, _dir) = fixtures();
        let gate = ConfirmationGate::new(Duration::from_secs(5));
        let draft = Draft::unassigned_for(&catalog);

        let decision = gate
            .run(draft, &store, &catalog, || async { Ok(false) })
            .await
            .unwrap();

        assert!(matches!(decision, GateDecision::Denied(GateDenial::Declined)));
        assert!(store.final_json_path().exists());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_denies_the_apply() {
        let (catalog, store, _dir) = fixtures();
        let gate = ConfirmationGate::new(Duration::from_secs(1));
        let draft = Draft::unassigned_for(&catalog);

        let decision = gate
            .run(draft, &store, &catalog, || async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(true)
            })
            .await
            .unwrap();

        assert!(matches!(decision, GateDecision::Denied(GateDenial::TimedOut)));
        assert!(store.final_json_path().exists());
    }
}
