//! User-facing feedback: blocking notices, confirmations, file pickers and
//! haptic pulses.

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::path::PathBuf;
use std::time::Duration;

/// Severity of a blocking notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Info,
    Warning,
    Error,
}

/// Modal interactions with the user
pub trait Dialogs: Send + Sync {
    /// Show a blocking notice
    fn notify(&self, level: Notice, message: &str);

    /// Ask a yes/no question; false when the user declines or dismisses
    fn confirm(&self, message: &str) -> bool;

    /// Choose an image to upload
    fn pick_image(&self) -> Option<PathBuf>;

    /// Choose a backup document to import
    fn pick_backup(&self) -> Option<PathBuf>;

    /// Choose where to write a backup, suggesting `file_name`
    fn save_backup(&self, file_name: &str) -> Option<PathBuf>;
}

/// Native dialogs
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeDialogs;

const TITLE: &str = "Artifact Scanner";

impl Dialogs for NativeDialogs {
    fn notify(&self, level: Notice, message: &str) {
        let level = match level {
            Notice::Info => MessageLevel::Info,
            Notice::Warning => MessageLevel::Warning,
            Notice::Error => MessageLevel::Error,
        };

        MessageDialog::new()
            .set_level(level)
            .set_title(TITLE)
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }

    fn confirm(&self, message: &str) -> bool {
        let result = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title(TITLE)
            .set_description(message)
            .set_buttons(MessageButtons::YesNo)
            .show();

        result == MessageDialogResult::Yes
    }

    fn pick_image(&self) -> Option<PathBuf> {
        FileDialog::new()
            .set_title("Select Photo")
            .add_filter("Images", &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"])
            .pick_file()
    }

    fn pick_backup(&self) -> Option<PathBuf> {
        FileDialog::new()
            .set_title("Import Backup")
            .add_filter("JSON", &["json"])
            .pick_file()
    }

    fn save_backup(&self, file_name: &str) -> Option<PathBuf> {
        let mut dialog = FileDialog::new()
            .set_title("Export Backup")
            .set_file_name(file_name)
            .add_filter("JSON", &["json"]);

        if let Some(downloads) = dirs::download_dir() {
            dialog = dialog.set_directory(downloads);
        }

        dialog.save_file()
    }
}

/// Vibration motor
pub trait Haptics: Send + Sync {
    fn pulse(&self, duration: Duration);
}

/// Desktops have nothing to vibrate
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn pulse(&self, duration: Duration) {
        tracing::trace!("Haptic pulse of {:?} skipped", duration);
    }
}
