use crate::config::ComponentConfig;
use crate::domain::ports::Completion;
use crate::utils::error::{ComponentError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Model parameters are fixed for every request; only the prompt and the
// per-run credential vary.
const MODEL_NAME: &str = "text-davinci-003";
const MODEL_BASE_TEMPERATURE: f64 = 0.7;
const MODEL_BASE_MAX_TOKENS: u32 = 512;
const MODEL_BASE_TOP_P: f64 = 1.0;
const MODEL_BASE_FREQUENCY_PENALTY: f64 = 0.0;
const MODEL_BASE_PRESENCE_PENALTY: f64 = 0.0;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
    frequency_penalty: f64,
    presence_penalty: f64,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

/// Completion-service client holding its own credential. One outbound call
/// per `complete`, no caching, no retries.
#[derive(Debug)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_base: String,
    api_token: String,
}

impl OpenAiClient {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self::with_api_base(api_token, DEFAULT_API_BASE)
    }

    pub fn with_api_base(api_token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
        }
    }

    /// Bounds every request. Without it the call blocks until the service
    /// answers, which matches the platform's observed behavior.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn from_config(config: &ComponentConfig) -> Result<Self> {
        let api_token = config.api_token()?.clone();

        let client = match &config.parameters.api_base {
            Some(api_base) => Self::with_api_base(api_token, api_base),
            None => Self::new(api_token),
        };

        match config.parameters.request_timeout_seconds {
            Some(seconds) => client.with_timeout(Duration::from_secs(seconds)),
            None => Ok(client),
        }
    }
}

#[async_trait]
impl Completion for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/completions", self.api_base);
        let request = CompletionRequest {
            model: MODEL_NAME,
            prompt,
            temperature: MODEL_BASE_TEMPERATURE,
            max_tokens: MODEL_BASE_MAX_TOKENS,
            top_p: MODEL_BASE_TOP_P,
            frequency_penalty: MODEL_BASE_FREQUENCY_PENALTY,
            presence_penalty: MODEL_BASE_PRESENCE_PENALTY,
        };

        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ComponentError::ApiResponseError {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        let completion: CompletionResponse = response.json().await?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ComponentError::ProcessingError {
                message: "Completion response contained no choices".to_string(),
            })?;

        Ok(choice.text)
    }
}

/// The service wraps failures as `{"error": {"message": ...}}`; fall back
/// to the raw body when it does not.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_complete_returns_first_choice_text() {
        let server = MockServer::start();

        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/completions")
                .header("authorization", "Bearer sk-test")
                .json_body_partial(
                    r#"{
                        "model": "text-davinci-003",
                        "temperature": 0.7,
                        "max_tokens": 512,
                        "top_p": 1.0,
                        "frequency_penalty": 0.0,
                        "presence_penalty": 0.0
                    }"#,
                );
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "choices": [
                        {"text": "{\"sentiment\": \"positive\"}"},
                        {"text": "{\"sentiment\": \"negative\"}"}
                    ]
                }));
        });

        let client = OpenAiClient::with_api_base("sk-test", server.base_url());
        let text = client.complete("Echo\n\"\"\"hello\"\"\"").await.unwrap();

        api_mock.assert();
        assert_eq!(text, "{\"sentiment\": \"positive\"}");
    }

    #[tokio::test]
    async fn test_prompt_is_sent_verbatim() {
        let server = MockServer::start();

        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/completions")
                .json_body_partial(r#"{"prompt": "Echo\n\"\"\"hello\"\"\""}"#);
            then.status(200)
                .json_body(json!({"choices": [{"text": "null"}]}));
        });

        let client = OpenAiClient::with_api_base("sk-test", server.base_url());
        client.complete("Echo\n\"\"\"hello\"\"\"").await.unwrap();

        api_mock.assert();
    }

    #[tokio::test]
    async fn test_service_error_message_is_surfaced() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/completions");
            then.status(401)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "error": {"message": "Incorrect API key provided"}
                }));
        });

        let client = OpenAiClient::with_api_base("sk-bad", server.base_url());
        let err = client.complete("Echo").await.unwrap_err();

        match err {
            ComponentError::ApiResponseError { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body_falls_back_to_raw_text() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/completions");
            then.status(502).body("Bad Gateway");
        });

        let client = OpenAiClient::with_api_base("sk-test", server.base_url());
        let err = client.complete("Echo").await.unwrap_err();

        match err {
            ComponentError::ApiResponseError { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_a_processing_error() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/completions");
            then.status(200).json_body(json!({"choices": []}));
        });

        let client = OpenAiClient::with_api_base("sk-test", server.base_url());
        let err = client.complete("Echo").await.unwrap_err();

        assert!(matches!(err, ComponentError::ProcessingError { .. }));
    }

    #[test]
    fn test_from_config_uses_api_base_override() {
        let mut config = ComponentConfig::default();
        config.parameters.api_token = Some("sk-test".to_string());
        config.parameters.api_base = Some("http://localhost:9999/".to_string());
        config.parameters.request_timeout_seconds = Some(30);

        let client = OpenAiClient::from_config(&config).unwrap();
        assert_eq!(client.api_base, "http://localhost:9999");
    }

    #[test]
    fn test_from_config_requires_the_token() {
        let config = ComponentConfig::default();
        let err = OpenAiClient::from_config(&config).unwrap_err();
        assert!(matches!(err, ComponentError::MissingConfigError { .. }));
    }
}
