// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across the tgsort workspace.

use thiserror::Error;

/// The primary error type used across collaborator traits and the draft
/// lifecycle engine.
#[derive(Debug, Error)]
pub enum TgsortError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// AI classifier errors (API failure, rate limiting, unusable response).
    ///
    /// `transient` marks errors worth retrying with backoff (network
    /// failures, 429, 5xx). A well-formed HTTP reply carrying an unparsable
    /// classification is permanent.
    #[error("classifier error: {message}")]
    Classifier {
        message: String,
        transient: bool,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Telegram boundary errors (cache files, membership operations).
    #[error("telegram error: {message}")]
    Telegram {
        message: String,
        transient: bool,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Draft persistence errors (cannot read or write a draft artifact).
    #[error("draft storage error: {message}")]
    Store {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A draft document failed validation. The whole import is rejected and
    /// the canonical draft is left untouched.
    #[error("invalid draft document: {0}")]
    Import(String),

    /// An id referenced a chat that is not part of the current run.
    #[error("unknown chat id: {0}")]
    UnknownChat(i64),

    /// An id referenced a folder that does not exist.
    #[error("unknown folder id: {0}")]
    UnknownFolder(i64),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TgsortError {
    /// Permanent classifier error without a source.
    pub fn classifier(message: impl Into<String>) -> Self {
        Self::Classifier {
            message: message.into(),
            transient: false,
            source: None,
        }
    }

    /// Transient classifier error worth retrying with backoff.
    pub fn classifier_transient(message: impl Into<String>) -> Self {
        Self::Classifier {
            message: message.into(),
            transient: true,
            source: None,
        }
    }

    /// Permanent telegram-boundary error without a source.
    pub fn telegram(message: impl Into<String>) -> Self {
        Self::Telegram {
            message: message.into(),
            transient: false,
            source: None,
        }
    }

    /// Storage error wrapping an I/O or serialization source.
    pub fn store(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Store {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether a bounded-retry loop should try this operation again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Classifier { transient: true, .. } | Self::Telegram { transient: true, .. }
        )
    }
}
