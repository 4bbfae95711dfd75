//! Text-generation capability seam and the Groq-backed client.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

/// Sampling parameters for one generation call.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenerationParams {
    pub temperature: Option<f32>,
}

/// Opaque provider of one function: system instruction plus user text in,
/// generated text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, user: &str, params: GenerationParams)
        -> Result<String>;
}

/// Chat-completions client for Groq's OpenAI-compatible API.
///
/// One attempt per call: callers that can absorb a failure fall back
/// locally, and the retrieval path treats a failed call as final for the
/// request.
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl ChatCompletionsClient {
    pub fn new(api_key: String, base_url: String, model: String, timeout: Duration) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing LLM API key");
        anyhow::ensure!(!model.trim().is_empty(), "missing LLM model name");
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).context("invalid LLM API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build LLM HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model,
        })
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        params: GenerationParams,
    ) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            temperature: params.temperature,
            messages: [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .context("failed to call chat completions")?;

        let status = response.status();
        if !status.is_success() {
            let text =
                response.text().await.unwrap_or_else(|_| "<body unavailable>".to_string());
            anyhow::bail!("chat completions request failed ({status}): {text}");
        }

        let parsed: ChatResponse =
            response.json().await.context("failed to parse chat completions response")?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();
        Ok(reply)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}
