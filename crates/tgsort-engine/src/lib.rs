// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The classification draft lifecycle.
//!
//! Sequential pipeline: batch planning, fault-tolerant classification
//! orchestration, a canonical in-memory draft with dual on-disk codecs
//! (JSON + CSV), an interactive review loop for unassigned chats, a
//! two-phase confirmation gate, and the apply executor. Each stage owns
//! the draft exclusively while it is active; ownership transfers at stage
//! boundaries.

pub mod apply;
pub mod catalog;
pub mod draft;
pub mod gate;
pub mod orchestrator;
pub mod planner;
pub mod review;
pub mod store;

pub use apply::{ApplyExecutor, ApplyReport};
pub use catalog::Catalog;
pub use draft::{Draft, Provenance, SealedDraft};
pub use gate::{ConfirmationGate, GateDecision, GateDenial};
pub use orchestrator::Orchestrator;
pub use planner::BatchPlanner;
pub use review::{ReviewCommand, ReviewExit, ReviewSession, ReviewStep, suggest_folder};
pub use store::{DraftFormat, DraftStore, GroupsDocument};
