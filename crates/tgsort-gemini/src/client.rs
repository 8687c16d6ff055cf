// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! One request per call; the orchestrator's shared retry policy owns all
//! retrying. HTTP 429/5xx and transport failures are transient; a blocked
//! prompt or an empty candidate list is permanent.

use std::time::Duration;

use reqwest::StatusCode;
use tgsort_core::TgsortError;
use tgsort_core::protocol::Prompts;
use tracing::debug;

use crate::types::{
    ApiErrorResponse, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};

const TEMPERATURE: f64 = 0.1;

/// HTTP client for one Generative Language API endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, TgsortError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TgsortError::Classifier {
                message: format!("failed to build HTTP client: {e}"),
                transient: false,
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one generation request and return the joined candidate text.
    pub async fn generate(&self, prompts: &Prompts) -> Result<String, TgsortError> {
        let request = GenerateContentRequest {
            system_instruction: Content::text(None, &prompts.system),
            contents: vec![Content::text(Some("user"), &prompts.user)],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                response_mime_type: "application/json".into(),
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TgsortError::Classifier {
                message: format!("HTTP request failed: {e}"),
                transient: true,
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "generation response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "API error ({}): {}",
                    api_err.error.status.as_deref().unwrap_or("unknown"),
                    api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(TgsortError::Classifier {
                message,
                transient: is_transient_status(status),
                source: None,
            });
        }

        let body: GenerateContentResponse =
            response.json().await.map_err(|e| TgsortError::Classifier {
                message: format!("failed to parse API response: {e}"),
                transient: false,
                source: Some(Box::new(e)),
            })?;

        if let Some(feedback) = &body.prompt_feedback {
            if let Some(reason) = &feedback.block_reason {
                return Err(TgsortError::classifier(format!(
                    "prompt blocked by provider: {reason}"
                )));
            }
        }

        let text: String = body
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(TgsortError::classifier("response contained no candidates"));
        }
        Ok(text)
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> GeminiClient {
        GeminiClient::new("AIza-test", base_url, "gemini-2.0-flash", Duration::from_secs(5))
            .unwrap()
    }

    fn test_prompts() -> Prompts {
        Prompts {
            system: "system".into(),
            user: "user".into(),
        }
    }

    #[tokio::test]
    async fn generate_joins_candidate_parts() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [
                {"text": "{\"categorized\""},
                {"text": ":[]}"}
            ]}}]
        });
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(query_param("key", "AIza-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let text = test_client(&server.uri())
            .generate(&test_prompts())
            .await
            .unwrap();
        assert_eq!(text, "{\"categorized\"\n:[]}");
    }

    #[tokio::test]
    async fn blocked_prompt_is_permanent() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "candidates": [],
            "promptFeedback": {"blockReason": "SAFETY"}
        });
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .generate(&test_prompts())
            .await
            .unwrap_err();
        assert!(!err.is_transient());
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .respond_with(ResponseTemplate::new(500).set_body_json(
                serde_json::json!({"error": {"message": "internal", "status": "INTERNAL"}}),
            ))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .generate(&test_prompts())
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert!(err.to_string().contains("INTERNAL"));
    }

    #[tokio::test]
    async fn empty_candidates_is_permanent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .generate(&test_prompts())
            .await
            .unwrap_err();
        assert!(!err.is_transient());
    }
}
