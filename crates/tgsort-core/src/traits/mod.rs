// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions for the tgsort pipeline.
//!
//! The draft lifecycle engine only ever talks to the outside world through
//! these seams. All traits use `#[async_trait]` for dynamic dispatch.

pub mod classifier;
pub mod source;
pub mod writer;

pub use classifier::Classifier;
pub use source::{ChatSource, FolderSource};
pub use writer::FolderWriter;
