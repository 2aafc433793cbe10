use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::ModerationConfig;

/// Outcome of a moderation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Clean,
    Inappropriate,
}

/// Any reason the filter could not produce a verdict.
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("DEEPSEEK_API_KEY is not set")]
    MissingApiKey,
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("moderation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("moderation API returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("moderation API error: {0}")]
    Api(String),
    #[error("moderation API returned no choices")]
    EmptyResponse,
}

/// Decides whether a post may be published.
#[async_trait]
pub trait ContentFilter: Send + Sync {
    async fn check(&self, title: &str, content: &str) -> Result<Verdict, ModerationError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

fn prompt(title: &str, content: &str) -> String {
    format!(
        "You are a content moderator. Analyze the following text for inappropriate content \
         including profanity, hate speech, explicit content, or offensive language.\n\n\
         Title: {title}\n\
         Content: {content}\n\n\
         Respond with only \"CLEAN\" if the content is appropriate, or \"INAPPROPRIATE\" if it \
         contains any offensive language, swear words, or inappropriate content. \
         Do not provide explanations."
    )
}

/// Chat-completions backed filter (DeepSeek by default, any OpenAI-compatible
/// endpoint works).
#[derive(Clone)]
pub struct DeepSeekFilter {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

impl DeepSeekFilter {
    pub fn new(config: &ModerationConfig) -> Result<Self, ModerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ModerationError::Client)?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ContentFilter for DeepSeekFilter {
    #[instrument(skip(self, title, content), fields(model = %self.model))]
    async fn check(&self, title: &str, content: &str) -> Result<Verdict, ModerationError> {
        let api_key = self.api_key.as_deref().ok_or(ModerationError::MissingApiKey)?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".into(),
                content: prompt(title, content),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "moderation API returned non-200");
            return Err(ModerationError::Status { status, body });
        }

        let parsed: ChatResponse = response.json().await?;
        if let Some(err) = parsed.error {
            return Err(ModerationError::Api(err.message));
        }
        let answer = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(ModerationError::EmptyResponse)?
            .message
            .content;

        debug!(answer = %answer.trim(), "moderation verdict");
        if answer.trim() == "CLEAN" {
            Ok(Verdict::Clean)
        } else {
            Ok(Verdict::Inappropriate)
        }
    }
}
