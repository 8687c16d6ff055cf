// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock classifier with scripted per-call outcomes.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use tgsort_core::{ChatRecord, ClassificationEntry, Classifier, FolderRecord, TgsortError};

/// What one `classify_batch` call should produce.
///
/// Errors are scripted as messages rather than `TgsortError` values
/// because the error type is not `Clone`.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Return these entries.
    Entries(Vec<ClassificationEntry>),
    /// Fail transiently (retryable).
    Transient(String),
    /// Fail permanently.
    Permanent(String),
}

/// A classifier whose responses are scripted in call order.
///
/// Once the script runs out, further calls return an empty entry list,
/// leaving the batch's chats unassigned.
pub struct MockClassifier {
    script: Arc<Mutex<VecDeque<ScriptedOutcome>>>,
    calls: AtomicUsize,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_script(outcomes: impl IntoIterator<Item = ScriptedOutcome>) -> Self {
        let mock = Self::new();
        {
            let script = mock.script.clone();
            let mut outcomes: VecDeque<ScriptedOutcome> = outcomes.into_iter().collect();
            // Mutex is uncontended here; try_lock cannot fail.
            script.try_lock().unwrap().append(&mut outcomes);
        }
        mock
    }

    /// Append one outcome to the script.
    pub async fn push(&self, outcome: ScriptedOutcome) {
        self.script.lock().await.push_back(outcome);
    }

    /// Number of `classify_batch` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn classify_batch(
        &self,
        _chats: &[ChatRecord],
        _folders: &[FolderRecord],
    ) -> Result<Vec<ClassificationEntry>, TgsortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().await.pop_front() {
            Some(ScriptedOutcome::Entries(entries)) => Ok(entries),
            Some(ScriptedOutcome::Transient(msg)) => Err(TgsortError::classifier_transient(msg)),
            Some(ScriptedOutcome::Permanent(msg)) => Err(TgsortError::classifier(msg)),
            None => Ok(Vec::new()),
        }
    }
}
