// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible chat-completions endpoints.
//!
//! The client performs exactly one request per call; the orchestrator's
//! shared retry policy owns all retrying. Transport failures and HTTP
//! 429/5xx are reported as transient, anything else as permanent.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tgsort_core::TgsortError;
use tgsort_core::protocol::Prompts;
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Sampling temperature for classification; low, for stable output.
const TEMPERATURE: f64 = 0.1;

/// HTTP client for one OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, TgsortError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| TgsortError::Config(format!("invalid API key header value: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
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
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one completion request and return the assistant's text.
    pub async fn complete(&self, prompts: &Prompts) -> Result<String, TgsortError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: prompts.system.clone(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: prompts.user.clone(),
                },
            ],
            temperature: TEMPERATURE,
        };

        let url = format!("{}/chat/completions", self.base_url);
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
        debug!(status = %status, model = %self.model, "completion response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "API error ({}): {}",
                    api_err.error.type_.as_deref().unwrap_or("unknown"),
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

        let body: ChatCompletionResponse =
            response.json().await.map_err(|e| TgsortError::Classifier {
                message: format!("failed to parse API response: {e}"),
                transient: false,
                source: Some(Box::new(e)),
            })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.into_text())
            .ok_or_else(|| TgsortError::classifier("response contained no choices"))
    }
}

/// HTTP status codes worth retrying with backoff.
fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> OpenAiClient {
        OpenAiClient::new("test-key", base_url, "gpt-4o-mini", Duration::from_secs(5)).unwrap()
    }

    fn test_prompts() -> Prompts {
        Prompts {
            system: "system".into(),
            user: "user".into(),
        }
    }

    #[tokio::test]
    async fn complete_returns_assistant_text() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"categorized\":[]}"}}]
        });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(
                serde_json::json!({"model": "gpt-4o-mini", "temperature": 0.1}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let text = test_client(&server.uri())
            .complete(&test_prompts())
            .await
            .unwrap();
        assert_eq!(text, "{\"categorized\":[]}");
    }

    #[tokio::test]
    async fn content_parts_are_joined() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "choices": [{"message": {"content": [
                {"type": "text", "text": "{\"categorized\""},
                {"type": "text", "text": ":[]}"}
            ]}}]
        });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let text = test_client(&server.uri())
            .complete(&test_prompts())
            .await
            .unwrap();
        assert_eq!(text, "{\"categorized\":[]}");
    }

    #[tokio::test]
    async fn rate_limit_is_transient() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(
                serde_json::json!({"error": {"type": "rate_limit", "message": "slow down"}}),
            ))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .complete(&test_prompts())
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert!(err.to_string().contains("slow down"));
    }

    #[tokio::test]
    async fn bad_request_is_permanent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(
                serde_json::json!({"error": {"type": "invalid_request_error", "message": "bad model"}}),
            ))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .complete(&test_prompts())
            .await
            .unwrap_err();
        assert!(!err.is_transient());
        assert!(err.to_string().contains("invalid_request_error"));
    }

    #[tokio::test]
    async fn empty_choices_is_permanent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .complete(&test_prompts())
            .await
            .unwrap_err();
        assert!(!err.is_transient());
    }
}
