/// Device capabilities
///
/// Everything the app needs from the machine it runs on sits behind a trait
/// so the controller can be driven by mocks in tests:
/// - Camera streams (camera.rs)
/// - One-shot geolocation (location.rs)
/// - Native share (share.rs)
/// - Dialogs and haptics (feedback.rs)

pub mod camera;
pub mod feedback;
pub mod location;
pub mod share;

#[cfg(test)]
pub mod mock;

use std::sync::Arc;

use crate::settings::Settings;
use camera::Camera;
use feedback::{Dialogs, Haptics, NativeDialogs, NoHaptics};
use location::Locator;
use share::{NoShare, Sharer};

/// The set of capabilities handed to the app
#[derive(Clone)]
pub struct Devices {
    pub camera: Arc<dyn Camera>,
    pub locator: Arc<dyn Locator>,
    pub sharer: Arc<dyn Sharer>,
    pub haptics: Arc<dyn Haptics>,
    pub dialogs: Arc<dyn Dialogs>,
}

impl Devices {
    /// Capabilities of the desktop this process runs on
    pub fn desktop(settings: &Settings) -> Self {
        Self {
            camera: camera::from_settings(&settings.camera),
            locator: location::from_settings(&settings.location),
            sharer: Arc::new(NoShare),
            haptics: Arc::new(NoHaptics),
            dialogs: Arc::new(NativeDialogs),
        }
    }
}

impl std::fmt::Debug for Devices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Devices").finish_non_exhaustive()
    }
}
