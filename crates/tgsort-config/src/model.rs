// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for tgsort.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level tgsort configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with `TGSORT_*`
/// environment variable overrides. All sections are optional and default
/// to sensible values; only the active provider's API key is mandatory,
/// and that is enforced when the provider is constructed.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TgsortConfig {
    /// Classification run settings.
    #[serde(default)]
    pub ai: AiConfig,

    /// OpenAI-compatible provider settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Gemini provider settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Runtime directory layout.
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Which AI provider classifies chats. Run-level configuration, not a
/// class hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Openai,
    Gemini,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Openai => f.write_str("openai"),
            Self::Gemini => f.write_str("gemini"),
        }
    }
}

/// Classification run configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AiConfig {
    /// Active classifier provider.
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,

    /// Number of chats submitted to the classifier per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Total attempts per external call (first try included).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential retry backoff, in seconds.
    #[serde(default = "default_retry_backoff_seconds")]
    pub retry_backoff_seconds: f64,

    /// Bounded wait for the confirmation gate's operator prompt, in seconds.
    #[serde(default = "default_confirm_timeout_seconds")]
    pub confirm_timeout_seconds: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            retry_backoff_seconds: default_retry_backoff_seconds(),
            confirm_timeout_seconds: default_confirm_timeout_seconds(),
        }
    }
}

fn default_provider() -> ProviderKind {
    ProviderKind::Openai
}

fn default_batch_size() -> usize {
    200
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_seconds() -> f64 {
    1.0
}

fn default_confirm_timeout_seconds() -> u64 {
    120
}

/// OpenAI-compatible provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. `None` falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Model identifier.
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_provider_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            timeout_seconds: default_provider_timeout_seconds(),
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_provider_timeout_seconds() -> u64 {
    45
}

/// Gemini provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. `None` falls back to the `GEMINI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the Generative Language API.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Model identifier.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_provider_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            timeout_seconds: default_provider_timeout_seconds(),
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

/// Runtime directory layout, relative to the working directory unless absolute.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory holding draft artifacts, caches, and backups.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Directory holding the run log.
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            logs_dir: default_logs_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_logs_dir() -> String {
    "logs".to_string()
}

impl TgsortConfig {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.data_dir)
    }

    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.logs_dir)
    }

    /// Model identifier of the active provider, for the startup summary.
    pub fn active_model(&self) -> &str {
        match self.ai.provider {
            ProviderKind::Openai => &self.openai.model,
            ProviderKind::Gemini => &self.gemini.model,
        }
    }

    /// Base URL of the active provider, for the startup summary.
    pub fn active_base_url(&self) -> &str {
        match self.ai.provider {
            ProviderKind::Openai => &self.openai.base_url,
            ProviderKind::Gemini => &self.gemini.base_url,
        }
    }

    /// Configured API key of the active provider, if any.
    pub fn active_api_key(&self) -> Option<&str> {
        match self.ai.provider {
            ProviderKind::Openai => self.openai.api_key.as_deref(),
            ProviderKind::Gemini => self.gemini.api_key.as_deref(),
        }
    }
}

/// Mask a secret for display: short secrets are fully starred, longer ones
/// keep the first and last four characters.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "<empty>".to_string();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
