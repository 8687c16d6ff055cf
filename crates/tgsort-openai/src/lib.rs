// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible classifier adapter.
//!
//! Implements [`Classifier`] over any chat-completions endpoint that
//! speaks the OpenAI wire format. The adapter never retries on its own;
//! the orchestrator's shared retry policy does.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use tgsort_config::model::OpenAiConfig;
use tgsort_core::protocol::{build_prompts, parse_response};
use tgsort_core::{ChatRecord, ClassificationEntry, Classifier, FolderRecord, TgsortError};
use tracing::{debug, info};

use crate::client::OpenAiClient;

/// Classifier backed by a chat-completions endpoint.
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var -> error.
pub struct OpenAiClassifier {
    client: OpenAiClient,
}

impl OpenAiClassifier {
    pub fn new(config: &OpenAiConfig) -> Result<Self, TgsortError> {
        let api_key = resolve_api_key(config.api_key.as_deref())?;
        let client = OpenAiClient::new(
            &api_key,
            &config.base_url,
            &config.model,
            Duration::from_secs(config.timeout_seconds),
        )?;

        info!(model = %config.model, base_url = %config.base_url, "OpenAI classifier initialized");
        Ok(Self { client })
    }
}

fn resolve_api_key(configured: Option<&str>) -> Result<String, TgsortError> {
    if let Some(key) = configured {
        if !key.trim().is_empty() {
            return Ok(key.to_string());
        }
    }
    std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            TgsortError::Config(
                "no OpenAI API key: set openai.api_key or the OPENAI_API_KEY env var".into(),
            )
        })
}

#[async_trait]
impl Classifier for OpenAiClassifier {
    fn name(&self) -> &str {
        "openai"
    }

    async fn classify_batch(
        &self,
        chats: &[ChatRecord],
        folders: &[FolderRecord],
    ) -> Result<Vec<ClassificationEntry>, TgsortError> {
        let prompts = build_prompts(chats, folders);
        let text = self.client.complete(&prompts).await?;
        debug!(chars = text.len(), "classifier response received");
        parse_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> OpenAiConfig {
        OpenAiConfig {
            api_key: Some("test-key".into()),
            base_url: base_url.to_string(),
            model: "gpt-4o-mini".into(),
            timeout_seconds: 5,
        }
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let err = resolve_api_key(None).unwrap_err();
        assert!(matches!(err, TgsortError::Config(_)));

        let err = resolve_api_key(Some("  ")).unwrap_err();
        assert!(matches!(err, TgsortError::Config(_)));
    }

    #[tokio::test]
    async fn classify_batch_parses_grouped_response() {
        let server = MockServer::start().await;

        let grouped = r#"{"categorized":[{"folder_id":10,"folder_title":"Tech",
            "chats":[{"chat_id":1,"type":"GROUP","reason":"rust"}]}]}"#;
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": grouped}}]
        });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let classifier = OpenAiClassifier::new(&config(&server.uri())).unwrap();
        let entries = classifier
            .classify_batch(
                &[ChatRecord::new(1, "Rust", tgsort_core::ChatKind::Group)],
                &[FolderRecord::new(10, "Tech")],
            )
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].folder_id, Some(10));
    }

    #[tokio::test]
    async fn unusable_response_is_permanent() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "I cannot help with that."}}]
        });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let classifier = OpenAiClassifier::new(&config(&server.uri())).unwrap();
        let err = classifier
            .classify_batch(
                &[ChatRecord::new(1, "Rust", tgsort_core::ChatKind::Group)],
                &[FolderRecord::new(10, "Tech")],
            )
            .await
            .unwrap_err();
        assert!(!err.is_transient());
    }
}
