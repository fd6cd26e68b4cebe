//! Capture pipeline
//!
//! Turns a camera frame or an uploaded file into an embedded image, then
//! attaches a one-shot position. Location failures never block a capture:
//! the error travels with the result so the controller can tell the user.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::device::camera::StreamHandle;
use crate::device::location::{self, LocationError, Locator, PositionOptions};
use crate::state::data::{now_millis, GeoLocation};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CaptureError {
    #[error("could not read file: {0}")]
    Read(String),

    #[error("not a supported image: {0}")]
    Decode(String),

    #[error("could not encode frame: {0}")]
    Encode(String),

    #[error("camera frame unavailable: {0}")]
    Camera(String),
}

/// An encoded image ready to be stored in an artifact
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    /// `data:` URL holding the encoded bytes
    pub data_url: String,
}

/// A finished capture: image, position outcome and the instant it completed
#[derive(Debug, Clone)]
pub struct Capture {
    pub image: CapturedImage,
    pub location: Result<GeoLocation, LocationError>,
    pub timestamp: DateTime<Utc>,
}

/// Build a `data:` URL for `bytes`
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Split a base64 `data:` URL into its MIME type and decoded bytes
pub fn from_data_url(url: &str) -> Option<(&str, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((mime, bytes))
}

/// Encode a camera frame as JPEG
pub fn encode_frame(frame: &RgbaImage, quality: u8) -> Result<CapturedImage, CaptureError> {
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgba8(frame.clone()).to_rgb8();

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;

    tracing::debug!(
        "📸 Encoded {}x{} frame ({} KB)",
        frame.width(),
        frame.height(),
        bytes.len() / 1024
    );

    Ok(CapturedImage {
        data_url: to_data_url(ImageFormat::Jpeg.to_mime_type(), &bytes),
    })
}

/// Encode a frame off the UI thread
pub async fn encode_frame_async(frame: RgbaImage, quality: u8) -> Result<CapturedImage, CaptureError> {
    // Spawn blocking because JPEG encoding is CPU-intensive
    tokio::task::spawn_blocking(move || encode_frame(&frame, quality))
        .await
        .map_err(|e| CaptureError::Encode(format!("Task join error: {}", e)))?
}

/// Take the current frame, release the camera and encode the frame
pub async fn capture_frame(stream: StreamHandle, quality: u8) -> Result<CapturedImage, CaptureError> {
    let frame = stream.next_frame().await;
    stream.stop();

    let frame = frame.map_err(|e| CaptureError::Camera(e.to_string()))?;
    encode_frame_async(frame, quality).await
}

/// Embed image bytes unchanged, after checking they decode
pub fn embed_image(bytes: &[u8]) -> Result<CapturedImage, CaptureError> {
    let format = image::guess_format(bytes).map_err(|e| CaptureError::Decode(e.to_string()))?;
    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| CaptureError::Decode(e.to_string()))?;

    Ok(CapturedImage {
        data_url: to_data_url(format.to_mime_type(), bytes),
    })
}

/// Read an uploaded image file
pub async fn read_upload(path: PathBuf) -> Result<CapturedImage, CaptureError> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| CaptureError::Read(e.to_string()))?;

    tracing::info!("📂 Read upload {} ({} KB)", path.display(), bytes.len() / 1024);

    tokio::task::spawn_blocking(move || embed_image(&bytes))
        .await
        .map_err(|e| CaptureError::Decode(format!("Task join error: {}", e)))?
}

/// Ask for one position and bundle it with the image
pub async fn attach_location(
    image: CapturedImage,
    locator: Arc<dyn Locator>,
    options: PositionOptions,
) -> Capture {
    let location = location::locate(locator, options).await;

    Capture {
        image,
        location,
        timestamp: now_millis(),
    }
}
