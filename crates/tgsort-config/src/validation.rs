// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as positive batch sizes and well-formed provider URLs.

use crate::diagnostic::ConfigError;
use crate::model::TgsortConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &TgsortConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.ai.batch_size < 1 {
        errors.push(ConfigError::Validation {
            message: "ai.batch_size must be at least 1".to_string(),
        });
    }

    if config.ai.max_retries < 1 {
        errors.push(ConfigError::Validation {
            message: "ai.max_retries must be at least 1".to_string(),
        });
    }

    if config.ai.retry_backoff_seconds < 0.1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "ai.retry_backoff_seconds must be at least 0.1, got {}",
                config.ai.retry_backoff_seconds
            ),
        });
    }

    if config.ai.confirm_timeout_seconds < 1 {
        errors.push(ConfigError::Validation {
            message: "ai.confirm_timeout_seconds must be at least 1".to_string(),
        });
    }

    validate_base_url("openai.base_url", &config.openai.base_url, &mut errors);
    validate_base_url("gemini.base_url", &config.gemini.base_url, &mut errors);

    // A Gemini key pasted from an OpenAI account is a common mistake;
    // catch it before the first request fails confusingly.
    if let Some(key) = &config.gemini.api_key {
        if key.starts_with("sk-") {
            errors.push(ConfigError::Validation {
                message: "gemini.api_key looks like an OpenAI key (`sk-` prefix); \
                          Gemini keys usually start with `AIza`"
                    .to_string(),
            });
        }
    }

    if config.paths.data_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "paths.data_dir must not be empty".to_string(),
        });
    }

    if config.paths.logs_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "paths.logs_dir must not be empty".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn validate_base_url(key: &str, url: &str, errors: &mut Vec<ConfigError>) {
    let trimmed = url.trim();
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() => {}
        _ => errors.push(ConfigError::Validation {
            message: format!(
                "{key} must be an absolute http(s) URL (e.g. https://api.openai.com/v1), got `{trimmed}`"
            ),
        }),
    }
}
