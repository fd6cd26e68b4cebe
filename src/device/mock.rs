//! Scriptable device capabilities for tests.

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::camera::{Camera, CameraError, StreamConstraints, StreamHandle, VideoStream};
use super::feedback::{Dialogs, Haptics, Notice};
use super::location::{LocationError, Locator, PositionOptions};
use super::share::NoShare;
use super::Devices;
use crate::state::data::GeoLocation;

pub struct MockLocator {
    result: Result<GeoLocation, LocationError>,
    delay: Option<Duration>,
}

impl MockLocator {
    pub fn answering(result: Result<GeoLocation, LocationError>) -> Self {
        Self { result, delay: None }
    }

    pub fn delayed(position: GeoLocation, delay: Duration) -> Self {
        Self {
            result: Ok(position),
            delay: Some(delay),
        }
    }
}

#[async_trait]
impl Locator for MockLocator {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<GeoLocation, LocationError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }
}

/// Camera producing a solid-colour frame
pub struct MockCamera {
    pub error: Option<CameraError>,
    /// Set once the stream handed out has been stopped
    pub stopped: Arc<AtomicBool>,
}

impl MockCamera {
    pub fn working() -> Self {
        Self {
            error: None,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn failing(error: CameraError) -> Self {
        Self {
            error: Some(error),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Open a stream synchronously, bypassing the async start
    pub fn open(&self) -> StreamHandle {
        StreamHandle::new(MockStream {
            stopped: self.stopped.clone(),
        })
    }
}

#[async_trait]
impl Camera for MockCamera {
    async fn start(&self, _constraints: &StreamConstraints) -> Result<StreamHandle, CameraError> {
        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(self.open()),
        }
    }
}

struct MockStream {
    stopped: Arc<AtomicBool>,
}

impl VideoStream for MockStream {
    fn frame(&mut self) -> Result<RgbaImage, CameraError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(CameraError::Stopped);
        }
        Ok(RgbaImage::from_pixel(8, 6, Rgba([90, 120, 30, 255])))
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct CountingHaptics {
    pub pulses: Mutex<Vec<Duration>>,
}

impl Haptics for CountingHaptics {
    fn pulse(&self, duration: Duration) {
        self.pulses.lock().push(duration);
    }
}

/// Records notices and answers prompts from preset values
#[derive(Default)]
pub struct RecordingDialogs {
    pub notices: Mutex<Vec<(Notice, String)>>,
    pub confirmations: Mutex<Vec<String>>,
    pub confirm_answer: AtomicBool,
    pub image: Option<PathBuf>,
    pub backup: Option<PathBuf>,
    pub save_to: Option<PathBuf>,
}

impl RecordingDialogs {
    pub fn answering(confirm: bool) -> Self {
        Self {
            confirm_answer: AtomicBool::new(confirm),
            ..Self::default()
        }
    }

    pub fn last_notice(&self) -> Option<String> {
        self.notices.lock().last().map(|(_, m)| m.clone())
    }
}

impl Dialogs for RecordingDialogs {
    fn notify(&self, level: Notice, message: &str) {
        self.notices.lock().push((level, message.to_string()));
    }

    fn confirm(&self, message: &str) -> bool {
        self.confirmations.lock().push(message.to_string());
        self.confirm_answer.load(Ordering::SeqCst)
    }

    fn pick_image(&self) -> Option<PathBuf> {
        self.image.clone()
    }

    fn pick_backup(&self) -> Option<PathBuf> {
        self.backup.clone()
    }

    fn save_backup(&self, file_name: &str) -> Option<PathBuf> {
        self.save_to.as_ref().map(|dir| dir.join(file_name))
    }
}

/// Mock devices with handles kept for assertions
pub struct MockDevices {
    pub camera: Arc<MockCamera>,
    pub haptics: Arc<CountingHaptics>,
    pub dialogs: Arc<RecordingDialogs>,
    pub devices: Devices,
}

impl MockDevices {
    pub fn new(location: Result<GeoLocation, LocationError>, dialogs: RecordingDialogs) -> Self {
        let camera = Arc::new(MockCamera::working());
        let haptics = Arc::new(CountingHaptics::default());
        let dialogs = Arc::new(dialogs);

        let devices = Devices {
            camera: camera.clone(),
            locator: Arc::new(MockLocator::answering(location)),
            sharer: Arc::new(NoShare),
            haptics: haptics.clone(),
            dialogs: dialogs.clone(),
        };

        Self {
            camera,
            haptics,
            dialogs,
            devices,
        }
    }
}
