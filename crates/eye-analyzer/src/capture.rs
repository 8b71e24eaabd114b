//! Image input collection: uploaded files and browser camera captures.
//!
//! Both sources end up as raw bytes written under the upload directory. Uploads keep the
//! client's file name, camera captures always land in `captured.jpg`, so repeated
//! submissions overwrite each other.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::debug;

use crate::error::AppError;

pub const CAMERA_FILENAME: &str = "captured.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Upload,
    Camera,
}

#[derive(Debug, Clone)]
pub struct ImageInput {
    pub source: ImageSource,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ImageInput {
    pub fn upload(filename: &str, bytes: Vec<u8>) -> Result<Self, AppError> {
        Ok(Self {
            source: ImageSource::Upload,
            filename: sanitize_filename(filename)?,
            bytes,
        })
    }

    /// Build an input from a `data:<mime>;base64,<data>` string.
    pub fn camera(data_url: &str) -> Result<Self, AppError> {
        Ok(Self {
            source: ImageSource::Camera,
            filename: CAMERA_FILENAME.to_string(),
            bytes: decode_camera_capture(data_url)?,
        })
    }

    /// Write the raw bytes into `dir` and return the full path.
    pub async fn persist(&self, dir: &Path) -> Result<PathBuf, AppError> {
        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.bytes).await?;
        debug!(
            path = %path.display(),
            bytes = self.bytes.len(),
            source = ?self.source,
            "stored image"
        );
        Ok(path)
    }
}

/// Strip the `data:...;base64,` header and decode the remainder.
pub fn decode_camera_capture(data_url: &str) -> Result<Vec<u8>, AppError> {
    let (_header, encoded) = data_url.split_once(',').ok_or_else(|| {
        AppError::ImageDecode("camera capture is not a data URL".to_string())
    })?;
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| AppError::ImageDecode(format!("camera capture is not valid base64: {e}")))
}

/// Reduce a client-supplied file name to a single safe path component.
pub fn sanitize_filename(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.contains("..")
        || trimmed.contains('\0')
    {
        return Err(AppError::BadRequest(format!("invalid file name: {name:?}")));
    }
    Ok(trimmed.to_string())
}
