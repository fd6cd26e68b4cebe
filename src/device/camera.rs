//! Camera acquisition
//!
//! A [`Camera`] hands out a [`StreamHandle`] once the device is opened;
//! frames are pulled from the handle for the live preview and for the
//! capture itself. Stopping the handle releases the device.

use async_trait::async_trait;
use image::imageops::FilterType;
use image::RgbaImage;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::settings::CameraSettings;

/// Which way the requested camera should face
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Rear camera, pointing away from the user
    #[default]
    Environment,
    User,
}

/// What the stream is asked for. Width and height are preferences, not
/// requirements: frames larger than this are scaled down to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub facing: Facing,
    pub width: u32,
    pub height: u32,
}

impl StreamConstraints {
    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self {
            facing: settings.facing,
            width: settings.width,
            height: settings.height,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera available")]
    NoDevice,

    #[error("camera stream stopped")]
    Stopped,

    #[error("could not read frame: {0}")]
    Frame(String),
}

/// An open video stream
pub trait VideoStream: Send {
    /// Current frame as an RGBA raster
    fn frame(&mut self) -> Result<RgbaImage, CameraError>;

    /// Release the device. Further frames fail with [`CameraError::Stopped`].
    fn stop(&mut self);

    fn is_live(&self) -> bool;
}

/// Device capability that opens video streams
#[async_trait]
pub trait Camera: Send + Sync {
    async fn start(&self, constraints: &StreamConstraints) -> Result<StreamHandle, CameraError>;
}

/// Cloneable handle to an open stream, so it can travel inside UI messages
#[derive(Clone)]
pub struct StreamHandle(Arc<Mutex<Box<dyn VideoStream>>>);

impl StreamHandle {
    pub fn new(stream: impl VideoStream + 'static) -> Self {
        Self(Arc::new(Mutex::new(Box::new(stream))))
    }

    pub fn frame(&self) -> Result<RgbaImage, CameraError> {
        self.0.lock().frame()
    }

    /// Pull a frame on a blocking thread. Snapshot sources read and decode
    /// a file per frame, which must not run on the UI thread.
    pub async fn next_frame(&self) -> Result<RgbaImage, CameraError> {
        let handle = self.clone();
        tokio::task::spawn_blocking(move || handle.frame())
            .await
            .map_err(|e| CameraError::Frame(format!("Task join error: {}", e)))?
    }

    pub fn stop(&self) {
        self.0.lock().stop();
    }

    pub fn is_live(&self) -> bool {
        self.0.lock().is_live()
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("live", &self.is_live())
            .finish()
    }
}

/// Camera backed by an image file that an external capture tool keeps
/// refreshing (webcam snapshot daemons, tethering software).
#[derive(Debug, Clone)]
pub struct SnapshotCamera {
    path: PathBuf,
}

impl SnapshotCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Camera for SnapshotCamera {
    async fn start(&self, constraints: &StreamConstraints) -> Result<StreamHandle, CameraError> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(CameraError::NoDevice),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(CameraError::PermissionDenied)
            }
            Err(_) => return Err(CameraError::NoDevice),
        }

        tracing::info!(
            "📷 Camera stream opened from {} ({:?})",
            self.path.display(),
            constraints.facing
        );

        Ok(StreamHandle::new(SnapshotStream {
            path: self.path.clone(),
            constraints: *constraints,
            live: true,
        }))
    }
}

struct SnapshotStream {
    path: PathBuf,
    constraints: StreamConstraints,
    live: bool,
}

impl VideoStream for SnapshotStream {
    fn frame(&mut self) -> Result<RgbaImage, CameraError> {
        if !self.live {
            return Err(CameraError::Stopped);
        }

        let img = image::open(&self.path).map_err(|e| CameraError::Frame(e.to_string()))?;
        Ok(fit_frame(img.to_rgba8(), &self.constraints))
    }

    fn stop(&mut self) {
        if self.live {
            tracing::debug!("Camera stream stopped");
        }
        self.live = false;
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

/// Device without a camera
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCamera;

#[async_trait]
impl Camera for NoCamera {
    async fn start(&self, _constraints: &StreamConstraints) -> Result<StreamHandle, CameraError> {
        Err(CameraError::NoDevice)
    }
}

/// Scale a frame down to fit the preferred resolution, keeping its aspect
pub fn fit_frame(frame: RgbaImage, constraints: &StreamConstraints) -> RgbaImage {
    if frame.width() <= constraints.width && frame.height() <= constraints.height {
        return frame;
    }

    image::DynamicImage::ImageRgba8(frame)
        .resize(constraints.width, constraints.height, FilterType::Triangle)
        .to_rgba8()
}

/// Pick the camera described by the settings
pub fn from_settings(settings: &CameraSettings) -> Arc<dyn Camera> {
    match &settings.snapshot_path {
        Some(path) => Arc::new(SnapshotCamera::new(path.clone())),
        None => Arc::new(NoCamera),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn constraints() -> StreamConstraints {
        StreamConstraints {
            facing: Facing::Environment,
            width: 1920,
            height: 1080,
        }
    }

    #[test]
    fn test_small_frame_is_untouched() {
        let frame = RgbaImage::from_pixel(640, 480, Rgba([1, 2, 3, 255]));

        let fitted = fit_frame(frame.clone(), &constraints());

        assert_eq!(fitted, frame);
    }

    #[test]
    fn test_large_frame_fits_preferred_resolution() {
        let frame = RgbaImage::new(3840, 2160);

        let fitted = fit_frame(frame, &constraints());

        assert_eq!(fitted.dimensions(), (1920, 1080));
    }

    #[tokio::test]
    async fn test_snapshot_camera_reads_frames_until_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("webcam.png");
        RgbaImage::from_pixel(32, 16, Rgba([200, 10, 10, 255]))
            .save(&path)
            .unwrap();

        let handle = SnapshotCamera::new(&path).start(&constraints()).await.unwrap();

        assert!(handle.is_live());
        assert_eq!(handle.next_frame().await.unwrap().dimensions(), (32, 16));

        handle.stop();

        assert!(!handle.is_live());
        assert_eq!(handle.frame().unwrap_err(), CameraError::Stopped);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_no_device() {
        let camera = SnapshotCamera::new("/nonexistent/webcam.jpg");

        let result = camera.start(&constraints()).await;

        assert_eq!(result.unwrap_err(), CameraError::NoDevice);
    }

    #[tokio::test]
    async fn test_no_camera() {
        let camera = from_settings(&CameraSettings::default());

        assert_eq!(
            camera.start(&constraints()).await.unwrap_err(),
            CameraError::NoDevice
        );
    }
}
