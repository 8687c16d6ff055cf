// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for tgsort integration tests.
//!
//! Provides mock collaborators and catalog fixtures for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockClassifier`] - scripted classifier with per-call outcomes
//! - [`MockFolderWriter`] - records membership operations, can inject failures
//! - [`fixtures`] - ready-made chat/folder catalogs

pub mod fixtures;
pub mod mock_classifier;
pub mod mock_writer;

pub use mock_classifier::{MockClassifier, ScriptedOutcome};
pub use mock_writer::{MembershipOp, MockFolderWriter};
