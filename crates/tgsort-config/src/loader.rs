// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./tgsort.toml` > `~/.config/tgsort/tgsort.toml`
//! > `/etc/tgsort/tgsort.toml` with environment variable overrides via the
//! `TGSORT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TgsortConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tgsort/tgsort.toml` (system-wide)
/// 3. `~/.config/tgsort/tgsort.toml` (user XDG config)
/// 4. `./tgsort.toml` (local directory)
/// 5. `TGSORT_*` environment variables
pub fn load_config() -> Result<TgsortConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<TgsortConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TgsortConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TgsortConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TgsortConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TgsortConfig::default()))
        .merge(Toml::file("/etc/tgsort/tgsort.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("tgsort/tgsort.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("tgsort.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider with explicit section mapping.
///
/// Uses prefix matching rather than `Env::split("_")` so that key names
/// containing underscores survive: `TGSORT_AI_CONFIRM_TIMEOUT_SECONDS`
/// must map to `ai.confirm_timeout_seconds`, not `ai.confirm.timeout.seconds`.
/// `openai_` and `gemini_` are checked before `ai_` because of the shared
/// suffix.
fn env_provider() -> Env {
    Env::prefixed("TGSORT_").map(|key| {
        let key_str = key.as_str();
        for section in ["openai", "gemini", "paths", "ai"] {
            let prefix = format!("{section}_");
            if let Some(rest) = key_str.strip_prefix(&prefix) {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.to_string().into()
    })
}
