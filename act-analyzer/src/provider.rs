//! OpenAI-compatible chat-completions client implementing [`LlmProvider`].
//!
//! Requests go to `POST {base_url}/chat/completions` with bearer auth. Structured
//! tasks attach a strict `json_schema` response format. The message content of
//! the first choice is returned verbatim; parsing happens in the core invoker.

use std::time::Duration;

use act_analyzer_core::contract::{CompletionRequest, LlmProvider};
use act_analyzer_core::error::ProviderError;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::load_config::ProviderSection;

pub struct OpenAiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionBody<'a> {
    pub model: &'a str,
    pub messages: [ChatMessage<'a>; 2],
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
pub struct JsonSchemaFormat<'a> {
    pub name: &'a str,
    pub strict: bool,
    pub schema: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Builds the client once; the underlying connection pool is reused for every task.
    pub fn new(settings: &ProviderSection, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;
        info!(
            base_url = %settings.base_url,
            model = %settings.model,
            timeout_secs = settings.timeout_secs,
            api_key_set = !api_key.is_empty(),
            "[PROVIDER] Initialised OpenAI-compatible client"
        );
        Ok(OpenAiClient {
            http,
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub fn request_body<'a>(&'a self, request: &'a CompletionRequest) -> ChatCompletionBody<'a> {
        ChatCompletionBody {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            response_format: request.schema.as_ref().map(|schema| ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: schema.name,
                    strict: true,
                    schema: &schema.schema,
                },
            }),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let url = self.endpoint();
        let body = self.request_body(&request);
        info!(
            task = %request.task,
            model = %self.model,
            url = %url,
            "[PROVIDER] Sending chat completion request"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(task = %request.task, error = %e, "[PROVIDER][ERROR] Request failed");
                ProviderError::Transport(e.to_string())
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!(task = %request.task, error = %e, "[PROVIDER][ERROR] Failed to read response body");
            ProviderError::Transport(e.to_string())
        })?;

        if !status.is_success() {
            error!(
                task = %request.task,
                status = status.as_u16(),
                "[PROVIDER][ERROR] Provider returned a non-success status"
            );
            return Err(ProviderError::from_status(status.as_u16(), text));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text).map_err(|e| {
            error!(task = %request.task, error = %e, "[PROVIDER][ERROR] Malformed completion payload");
            ProviderError::Api {
                status: status.as_u16(),
                body: format!("Malformed completion payload: {e}"),
            }
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyResponse)?;
        info!(
            task = %request.task,
            content_len = content.len(),
            "[PROVIDER] Received completion"
        );
        Ok(content)
    }
}
