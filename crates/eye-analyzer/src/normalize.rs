use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::error::AppError;

const JPEG_QUALITY: u8 = 75;

/// Decode an image of any supported format, drop alpha/palette, and re-encode as JPEG.
pub fn to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| AppError::ImageDecode(e.to_string()))?;
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| AppError::ImageDecode(e.to_string()))?;
    Ok(out.into_inner())
}

/// Re-read a stored image from disk and normalize it on the blocking pool.
pub async fn load_as_jpeg(path: &Path) -> Result<Vec<u8>, AppError> {
    let bytes = tokio::fs::read(path).await?;
    tokio::task::spawn_blocking(move || to_jpeg(&bytes))
        .await
        .map_err(|e| AppError::ImageDecode(format!("image worker failed: {e}")))?
}
