// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the tgsort classification pipeline.
//!
//! This crate provides the foundational domain types, the error type, the
//! collaborator trait seams, the shared bounded-retry policy, and the
//! provider-agnostic classification wire protocol. Everything else in the
//! workspace builds on these definitions.

pub mod error;
pub mod protocol;
pub mod retry;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TgsortError;
pub use retry::RetryPolicy;
pub use traits::{ChatSource, Classifier, FolderSource, FolderWriter};
pub use types::{
    ApplyMode, ApplyOutcome, BatchOutcome, BatchResult, ChatKind, ChatRecord,
    ClassificationEntry, Disposition, FolderRecord,
};
