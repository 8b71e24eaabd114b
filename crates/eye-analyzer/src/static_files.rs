//! Serves stored eye images back to the result page.

use std::path::Path;

use axum::{
    extract::{Path as AxumPath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::capture::sanitize_filename;
use crate::server::AppState;

/// GET /static/{filename}
pub async fn serve_image(
    AxumPath(filename): AxumPath<String>,
    State(state): State<AppState>,
) -> Response {
    let Ok(filename) = sanitize_filename(&filename) else {
        warn!(filename = %filename, "rejected suspicious image path");
        return (StatusCode::BAD_REQUEST, "Invalid filename").into_response();
    };

    let path = state.config.upload_dir.join(&filename);
    debug!(path = %path.display(), "serving image");

    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, image_mime_type(&path)),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            bytes,
        )
            .into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "Image not found").into_response()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read image");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read image").into_response()
        }
    }
}

/// Content type by file extension; anything unrecognised is served as opaque bytes.
pub fn image_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tiff" | "tif" => "image/tiff",
        _ => "application/octet-stream",
    }
}
