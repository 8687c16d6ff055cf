// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini classifier adapter.
//!
//! Implements [`Classifier`] over the Generative Language API's
//! `generateContent` endpoint, requesting a JSON response mime type so the
//! model replies with the grouped classification document directly.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use tgsort_config::model::GeminiConfig;
use tgsort_core::protocol::{build_prompts, parse_response};
use tgsort_core::{ChatRecord, ClassificationEntry, Classifier, FolderRecord, TgsortError};
use tracing::{debug, info};

use crate::client::GeminiClient;

/// Classifier backed by the Generative Language API.
///
/// API key resolution order: config -> `GEMINI_API_KEY` env var -> error.
pub struct GeminiClassifier {
    client: GeminiClient,
}

impl GeminiClassifier {
    pub fn new(config: &GeminiConfig) -> Result<Self, TgsortError> {
        let api_key = resolve_api_key(config.api_key.as_deref())?;
        let client = GeminiClient::new(
            &api_key,
            &config.base_url,
            &config.model,
            Duration::from_secs(config.timeout_seconds),
        )?;

        info!(model = %config.model, base_url = %config.base_url, "Gemini classifier initialized");
        Ok(Self { client })
    }
}

fn resolve_api_key(configured: Option<&str>) -> Result<String, TgsortError> {
    if let Some(key) = configured {
        if !key.trim().is_empty() {
            return Ok(key.to_string());
        }
    }
    std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            TgsortError::Config(
                "no Gemini API key: set gemini.api_key or the GEMINI_API_KEY env var".into(),
            )
        })
}

#[async_trait]
impl Classifier for GeminiClassifier {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn classify_batch(
        &self,
        chats: &[ChatRecord],
        folders: &[FolderRecord],
    ) -> Result<Vec<ClassificationEntry>, TgsortError> {
        let prompts = build_prompts(chats, folders);
        let text = self.client.generate(&prompts).await?;
        debug!(chars = text.len(), "classifier response received");
        parse_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: Some("AIza-test".into()),
            base_url: base_url.to_string(),
            model: "gemini-2.0-flash".into(),
            timeout_seconds: 5,
        }
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let err = resolve_api_key(None).unwrap_err();
        assert!(matches!(err, TgsortError::Config(_)));
    }

    #[tokio::test]
    async fn classify_batch_parses_grouped_response() {
        let server = MockServer::start().await;

        let grouped = r#"{"categorized":[{"folder_id":20,"folder_title":"News",
            "chats":[{"chat_id":2,"type":"CHANNEL","reason":"daily digest"}]}]}"#;
        let body = serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": grouped}]}}]
        });
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let classifier = GeminiClassifier::new(&config(&server.uri())).unwrap();
        let entries = classifier
            .classify_batch(
                &[ChatRecord::new(2, "Daily News", tgsort_core::ChatKind::Channel)],
                &[FolderRecord::new(20, "News")],
            )
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].folder_id, Some(20));
        assert_eq!(entries[0].reason.as_deref(), Some("daily digest"));
    }
}
