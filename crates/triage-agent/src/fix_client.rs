//! Fix suggestion client: one chat completion per prompt.

use crate::config::EndpointConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const SYSTEM_PROMPT: &str = "You are a Java debugging expert who provides EXACT, EXECUTABLE code fixes. \
Always specify the exact file path, line number, current code, and replacement code. \
Focus on providing actionable fixes that can be directly applied to resolve test failures.";

/// Returned as the reply text when the endpoint answers without choices.
pub const EMPTY_REPLY: &str = "No response received from the AI model";

#[derive(Debug, thiserror::Error)]
pub enum FixClientError {
    #[error("no API key configured (set TRIAGE_API_KEY or endpoint.api_key)")]
    MissingApiKey,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode completion response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Turns a prompt into a model reply.
pub trait FixSuggester {
    fn suggest(&self, prompt: &str) -> Result<String, FixClientError>;

    /// Model identifier recorded in the output metadata.
    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionsClient {
    http: reqwest::blocking::Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_completion_tokens: u32,
}

impl ChatCompletionsClient {
    pub fn from_config(config: &EndpointConfig) -> Result<Self, FixClientError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(FixClientError::MissingApiKey)?;
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FixClientError::Client)?;

        Ok(Self {
            http,
            url: format!("{}/chat/completions", config.url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_completion_tokens: config.max_completion_tokens,
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_completion_tokens: self.max_completion_tokens,
        }
    }
}

impl FixSuggester for ChatCompletionsClient {
    fn suggest(&self, prompt: &str) -> Result<String, FixClientError> {
        tracing::info!(url = %self.url, model = %self.model, prompt_chars = prompt.len(), "Requesting fix suggestions");

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .map_err(|source| FixClientError::Request {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response.text().map_err(|source| FixClientError::Request {
            url: self.url.clone(),
            source,
        })?;
        if !status.is_success() {
            return Err(FixClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_completion(&body)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Content of the first choice of a completion response body.
pub fn parse_completion(body: &str) -> Result<String, FixClientError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    Ok(response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_else(|| EMPTY_REPLY.to_string()))
}
