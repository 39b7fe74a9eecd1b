use serde::Serialize;
use reqwest::{Client, ClientBuilder};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::{usable_api_key, Config};
use crate::extract::truncate_chars;

const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.3;
const ERROR_BODY_CHARS: usize = 300;

pub const SYSTEM_PROMPT: &str = "Answer the user's question based only on the provided text. Be concise.";
pub const NO_RESPONSE: &str = "(No response)";
pub const MISSING_KEY_MESSAGE: &str = "FEATHERLESS_API_KEY is not set in .env";

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No usable credential; raised before any network traffic.
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    RequestFailure(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::RequestFailure(err.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

pub fn build_request(model: &str, content: &str, question: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.into(),
        messages: vec![
            ChatMessage {
                role: "system".into(),
                content: SYSTEM_PROMPT.into(),
            },
            ChatMessage {
                role: "user".into(),
                content: format!("Text:\n{}\n\nQuestion: {}", content, question),
            },
        ],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}

/// Pull `choices[0].message.content` out of a completion response.
pub fn parse_answer(json: &serde_json::Value) -> String {
    let reply = json["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_default()
        .trim();

    if reply.is_empty() {
        NO_RESPONSE.to_string()
    } else {
        reply.to_string()
    }
}

#[derive(Clone)]
pub struct AnswerClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl AnswerClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let client = ClientBuilder::new().timeout(COMPLETION_TIMEOUT).build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: config.completion_url.clone(),
            model: config.model.clone(),
        })
    }

    pub async fn ask(&self, content: &str, question: &str) -> Result<String, LlmError> {
        let api_key = usable_api_key(self.api_key.as_deref())
            .ok_or_else(|| LlmError::Configuration(MISSING_KEY_MESSAGE.to_string()))?;

        let body = build_request(&self.model, content, question);
        let start = Instant::now();

        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            warn!(%status, "completion endpoint returned an error");
            let detail = truncate_chars(detail.trim(), ERROR_BODY_CHARS);
            return Err(LlmError::RequestFailure(if detail.is_empty() {
                format!("HTTP {}", status)
            } else {
                format!("HTTP {}: {}", status, detail)
            }));
        }

        let json: serde_json::Value = res.json().await?;
        info!(
            model = %self.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "completion received"
        );

        Ok(parse_answer(&json))
    }
}
