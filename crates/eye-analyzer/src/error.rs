use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use eye_common::error::{ExtractError, VisionError};
use tracing::warn;

/// Failure kinds of the analysis flow.
///
/// Each kind maps to its own status code; the body is always plain text `Error: <message>`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("no image provided")]
    NoImageProvided,

    #[error("{0}")]
    UpstreamTimeout(VisionError),

    #[error("{0}")]
    Upstream(VisionError),

    #[error("malformed model response: {0}")]
    MalformedResponse(#[from] ExtractError),

    #[error("could not decode image: {0}")]
    ImageDecode(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl From<VisionError> for AppError {
    fn from(err: VisionError) -> Self {
        match err {
            VisionError::Timeout(_) => AppError::UpstreamTimeout(err),
            other => AppError::Upstream(other),
        }
    }
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NoImageProvided => "no_image_provided",
            AppError::UpstreamTimeout(_) => "upstream_timeout",
            AppError::Upstream(_) => "upstream_error",
            AppError::MalformedResponse(_) => "malformed_response",
            AppError::ImageDecode(_) => "image_decode_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::Io(_) => "io_error",
            AppError::Config(_) => "config_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NoImageProvided => StatusCode::SEE_OTHER,
            AppError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Upstream(_) | AppError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            AppError::ImageDecode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Io(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::NoImageProvided = self {
            return Redirect::to("/").into_response();
        }
        warn!(kind = self.kind(), error = %self, "analysis failed");
        (self.status(), format!("Error: {self}")).into_response()
    }
}
