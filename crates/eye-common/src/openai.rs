use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::VisionError;
use crate::prompt::DIAGNOSTIC_PROMPT;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings for the OpenAI-compatible chat-completions endpoint.
///
/// Built explicitly by the caller and handed to [`VisionClient::new`].
#[derive(Clone, Debug)]
pub struct VisionClientConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Sent as `HTTP-Referer` (OpenRouter app attribution).
    pub referer: Option<String>,
    /// Sent as `X-Title` (OpenRouter app attribution).
    pub title: Option<String>,
    pub max_error_body_bytes: usize,
}

impl VisionClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            referer: Some("http://localhost:5000".to_string()),
            title: Some("Eye Disease Analyzer".to_string()),
            max_error_body_bytes: 8 * 1024,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Clone)]
pub struct VisionClient {
    config: VisionClientConfig,
    http: reqwest::Client,
}

impl VisionClient {
    pub fn new(config: VisionClientConfig) -> Result<Self, VisionError> {
        let http = reqwest::Client::builder()
            .user_agent("eye-analyzer")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &VisionClientConfig {
        &self.config
    }

    /// Send a JPEG image with the diagnostic prompt and return the first completion's
    /// text verbatim. Makes exactly one request; nothing is retried.
    pub async fn analyze(&self, image_jpeg: &[u8]) -> Result<String, VisionError> {
        let request = ChatCompletionRequest::with_image(
            &self.config.model,
            DIAGNOSTIC_PROMPT,
            &jpeg_data_url(image_jpeg),
        );
        let response = self.chat_completions(&request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(VisionError::MissingContent)
    }

    pub async fn chat_completions(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, VisionError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        debug!(url = %url, model = %request.model, "sending chat completion");

        let mut builder = self
            .http
            .post(&url)
            .timeout(self.config.timeout)
            .bearer_auth(&self.config.api_key)
            .json(request);
        if let Some(referer) = &self.config.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.config.title {
            builder = builder.header("X-Title", title);
        }

        let resp = builder.send().await.map_err(|e| self.classify(e))?;
        if !resp.status().is_success() {
            return Err(to_upstream_error(resp, self.config.max_error_body_bytes).await);
        }
        let body = resp.bytes().await.map_err(|e| self.classify(e))?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn classify(&self, err: reqwest::Error) -> VisionError {
        if err.is_timeout() {
            VisionError::Timeout(self.config.timeout)
        } else {
            VisionError::Request(err)
        }
    }
}

/// Encode JPEG bytes as a `data:` URL suitable for an `image_url` content part.
pub fn jpeg_data_url(image_jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(image_jpeg))
}

async fn to_upstream_error(resp: reqwest::Response, max_error_body_bytes: usize) -> VisionError {
    let status = resp.status();
    let body = read_limited_text(resp, max_error_body_bytes).await;
    if let Ok(parsed) = serde_json::from_str::<OpenAiErrorEnvelope>(&body) {
        let message = parsed
            .error
            .message
            .unwrap_or_else(|| "unknown upstream error".to_string());
        return VisionError::Upstream { status, message };
    }
    VisionError::UpstreamBody { status, body }
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read upstream error body");
            "<failed to read error body>".to_string()
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorEnvelope {
    error: OpenAiErrorObject,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorObject {
    message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
}

impl ChatCompletionRequest {
    /// A single user turn carrying a text instruction followed by one image.
    pub fn with_image(model: &str, prompt: &str, image_url: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_url.to_string(),
                        },
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    pub choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChoice {
    pub index: Option<u32>,
    pub message: ChatCompletionMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionMessage {
    pub role: Option<String>,
    pub content: Option<String>,
}
