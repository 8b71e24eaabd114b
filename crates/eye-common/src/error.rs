//! Error types shared by every front end of the eye analyzer.
//!
//! `VisionError` covers the outbound inference call, `ExtractError` covers turning the
//! model's free text into a structured record. Service crates convert both into their own error enums.

use std::time::Duration;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned error: status={status} message={message}")]
    Upstream { status: StatusCode, message: String },

    #[error("upstream returned non-JSON error: status={status} body={body}")]
    UpstreamBody { status: StatusCode, body: String },

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("upstream response has no choices[0].message.content")]
    MissingContent,
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no JSON object found in model response")]
    NoObject,

    #[error("invalid JSON returned by model: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
