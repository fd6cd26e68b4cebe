use chrono::Utc;
use iced::widget::image::Handle;
use iced::widget::{column, container, text};
use iced::{Element, Length, Subscription, Task, Theme};
use std::path::PathBuf;
use std::time::Duration;

use crate::capture::{self, Capture, CaptureError, CapturedImage};
use crate::device::camera::{CameraError, StreamConstraints, StreamHandle};
use crate::device::feedback::Notice;
use crate::device::share::{ShareError, SharePayload};
use crate::device::Devices;
use crate::export::{self, ExportError};
use crate::scanner::Scanner;
use crate::settings::Settings;
use crate::state::collection::NoteError;
use crate::state::data::{now_millis, ArtifactId, CollectionState};
use crate::state::screen::{Screen, Transition};
use crate::state::store::{DiscardStore, KvStore, Store};
use crate::ui;
use crate::ui::thumbnail::{self, frame_handle, DecodedImage, ImageCache};

pub const DELETE_PROMPT: &str =
    "Are you sure you want to delete this artifact? This cannot be undone.";
pub const CAMERA_UNAVAILABLE: &str =
    "Camera access denied or unavailable. Please use upload instead.";
pub const SAVED_LOCATED: &str = "✓ Artifact scanned and saved successfully!";
pub const SAVED_UNLOCATED: &str = "✓ Artifact saved (location unavailable)";
pub const SHARE_UNSUPPORTED: &str = "Sharing not supported on this device";

/// Vibration on a located capture
const HAPTIC_PULSE: Duration = Duration::from_millis(200);

/// Full-size picture of the artifact open on the Map or Notes screen
#[derive(Debug)]
struct Detail {
    id: ArtifactId,
    fingerprint: u64,
    picture: Option<Handle>,
}

/// Main application state
pub struct App {
    /// Collection, active screen and store
    scanner: Scanner,
    devices: Devices,
    settings: Settings,
    /// Open camera stream, while the scan screen shows the live preview
    camera: Option<StreamHandle>,
    preview: Option<Handle>,
    /// A preview frame is being fetched
    preview_pending: bool,
    images: ImageCache,
    detail: Option<Detail>,
    /// Text typed into the notes composer
    draft: String,
    /// Status message to display to the user
    status: String,
    /// A capture is being encoded or located
    capturing: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    Navigate(Transition),
    StartCamera,
    CameraStarted(Result<StreamHandle, CameraError>),
    StopCamera,
    PreviewTick,
    PreviewFrame(Result<Handle, CameraError>),
    CapturePhoto,
    UploadPhoto,
    /// Encoded frame or uploaded file, before location lookup
    ImageReady(Result<CapturedImage, CaptureError>),
    Captured(Capture),
    ThumbnailsReady(Vec<DecodedImage>),
    DeleteArtifact(ArtifactId),
    ShareArtifact(ArtifactId),
    Shared(Result<(), ShareError>),
    DraftChanged(String),
    SendNote,
    CopyMapLink(String),
    ExportBackup,
    Exported(Result<PathBuf, ExportError>),
    ImportBackup,
    BackupRead(Result<CollectionState, ExportError>),
}

impl App {
    /// Create the application on this machine's devices
    pub fn new(settings: Settings) -> (Self, Task<Message>) {
        let store: Box<dyn Store> =
            match KvStore::open(&settings.storage.path, &settings.storage.key) {
                Ok(store) => Box::new(store),
                Err(e) => {
                    tracing::error!(
                        "❌ Could not open store at {}: {}. Changes will not be kept.",
                        settings.storage.path.display(),
                        e
                    );
                    Box::new(DiscardStore)
                }
            };

        let devices = Devices::desktop(&settings);
        let mut app = Self::with_parts(Scanner::open(store), devices, settings);

        tracing::info!(
            "🎨 Artifact Scanner initialized with {} artifacts",
            app.scanner.state().artifacts.len()
        );

        let thumbnails = app.refresh_images();
        (app, thumbnails)
    }

    /// Assemble the app without decoding any images yet
    pub fn with_parts(scanner: Scanner, devices: Devices, settings: Settings) -> Self {
        let status = format!(
            "Ready. {} artifacts in collection.",
            scanner.state().artifacts.len()
        );

        Self {
            scanner,
            devices,
            settings,
            camera: None,
            preview: None,
            preview_pending: false,
            images: ImageCache::default(),
            detail: None,
            draft: String::new(),
            status,
            capturing: false,
        }
    }

    /// Handle application messages and update state
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Navigate(transition) => {
                if self.scanner.navigate(transition) && *self.scanner.screen() != Screen::Scan {
                    self.stop_camera();
                }
                self.refresh_detail();
                Task::none()
            }
            Message::StartCamera => {
                if self.camera.is_some() || self.capturing {
                    return Task::none();
                }

                let camera = self.devices.camera.clone();
                let constraints = StreamConstraints::from_settings(&self.settings.camera);
                self.status = "Opening camera...".to_string();

                Task::perform(
                    async move { camera.start(&constraints).await },
                    Message::CameraStarted,
                )
            }
            Message::CameraStarted(Ok(handle)) => {
                // The user may have left the scan screen while the camera opened
                if *self.scanner.screen() != Screen::Scan || self.camera.is_some() {
                    handle.stop();
                    return Task::none();
                }

                self.camera = Some(handle);
                self.status = "Camera ready.".to_string();
                self.fetch_preview()
            }
            Message::CameraStarted(Err(e)) => {
                tracing::error!("Camera error: {}", e);
                self.notify(Notice::Warning, CAMERA_UNAVAILABLE);
                Task::none()
            }
            Message::StopCamera => {
                self.stop_camera();
                Task::none()
            }
            Message::PreviewTick => self.fetch_preview(),
            Message::PreviewFrame(result) => {
                self.preview_pending = false;
                if self.camera.is_none() {
                    return Task::none();
                }

                match result {
                    Ok(frame) => self.preview = Some(frame),
                    Err(e) => tracing::debug!("Preview frame skipped: {}", e),
                }
                Task::none()
            }
            Message::CapturePhoto => {
                if self.capturing {
                    return Task::none();
                }
                let Some(handle) = self.camera.take() else {
                    return Task::none();
                };

                // The capture task stops the stream once it has the frame
                self.preview = None;
                self.capturing = true;
                self.status = "Saving capture...".to_string();

                Task::perform(
                    capture::capture_frame(handle, self.settings.camera.jpeg_quality),
                    Message::ImageReady,
                )
            }
            Message::UploadPhoto => {
                if self.capturing {
                    return Task::none();
                }

                match self.devices.dialogs.pick_image() {
                    Some(path) => {
                        self.capturing = true;
                        self.status = format!("Reading {}...", path.display());
                        Task::perform(capture::read_upload(path), Message::ImageReady)
                    }
                    None => Task::none(),
                }
            }
            Message::ImageReady(Ok(image)) => {
                self.status = "Getting location...".to_string();
                Task::perform(
                    capture::attach_location(
                        image,
                        self.devices.locator.clone(),
                        self.settings.location.position_options(),
                    ),
                    Message::Captured,
                )
            }
            Message::ImageReady(Err(e)) => {
                self.capturing = false;
                tracing::error!("Image error: {}", e);
                self.notify(Notice::Error, &format!("Could not read photo: {}", e));
                Task::none()
            }
            Message::Captured(capture) => {
                self.capturing = false;
                self.record(capture);
                self.refresh_images()
            }
            Message::ThumbnailsReady(decoded) => {
                self.images.insert(decoded);
                Task::none()
            }
            Message::DeleteArtifact(id) => {
                if !self.scanner.state().contains(&id) {
                    return Task::none();
                }

                if self.devices.dialogs.confirm(DELETE_PROMPT) {
                    if let Some(removed) = self.scanner.delete(&id) {
                        self.status = format!("Deleted {}.", removed.name);
                    }
                    self.refresh_detail();
                    self.refresh_images()
                } else {
                    tracing::debug!("Delete of {} cancelled", id);
                    Task::none()
                }
            }
            Message::ShareArtifact(id) => {
                let Some(artifact) = self.scanner.state().artifact(&id) else {
                    return Task::none();
                };

                let payload = SharePayload::for_artifact(artifact);
                self.status = format!("Sharing {}...", artifact.name);
                let sharer = self.devices.sharer.clone();
                Task::perform(async move { sharer.share(payload).await }, Message::Shared)
            }
            Message::Shared(result) => {
                match result {
                    Ok(()) => self.status = "Shared.".to_string(),
                    Err(ShareError::Unsupported) => self.notify(Notice::Info, SHARE_UNSUPPORTED),
                }
                Task::none()
            }
            Message::DraftChanged(draft) => {
                self.draft = draft;
                Task::none()
            }
            Message::SendNote => {
                let Some(id) = self.scanner.screen().selected().cloned() else {
                    return Task::none();
                };

                match self.scanner.add_note(&id, &self.draft, now_millis()) {
                    Ok(_) => self.draft.clear(),
                    Err(NoteError::Empty) => {}
                    Err(e) => tracing::warn!("Note not added: {}", e),
                }
                Task::none()
            }
            Message::CopyMapLink(url) => {
                self.status = format!("Copied {}", url);
                iced::clipboard::write(url)
            }
            Message::ExportBackup => {
                let file_name = export::backup_file_name(Utc::now().date_naive());
                let Some(path) = self.devices.dialogs.save_backup(&file_name) else {
                    return Task::none();
                };

                match export::to_document(self.scanner.state()) {
                    Ok(document) => {
                        self.status = format!("Saving backup to {}...", path.display());
                        Task::perform(export::write_backup(path, document), Message::Exported)
                    }
                    Err(e) => {
                        self.notify(Notice::Error, &format!("Export failed: {}", e));
                        Task::none()
                    }
                }
            }
            Message::Exported(Ok(path)) => {
                self.status = format!("✅ Backup saved to {}", path.display());
                Task::none()
            }
            Message::Exported(Err(e)) => {
                tracing::error!("Export failed: {}", e);
                self.notify(Notice::Error, &format!("Export failed: {}", e));
                Task::none()
            }
            Message::ImportBackup => match self.devices.dialogs.pick_backup() {
                Some(path) => {
                    self.status = format!("Reading backup {}...", path.display());
                    Task::perform(export::read_backup(path), Message::BackupRead)
                }
                None => Task::none(),
            },
            Message::BackupRead(Ok(state)) => {
                let question = format!(
                    "Replace the current collection ({} artifacts) with the backup ({} artifacts)?",
                    self.scanner.state().artifacts.len(),
                    state.artifacts.len()
                );

                if !self.devices.dialogs.confirm(&question) {
                    return Task::none();
                }

                self.scanner.replace(state);
                self.status = format!(
                    "✅ Imported {} artifacts.",
                    self.scanner.state().artifacts.len()
                );
                self.refresh_detail();
                self.refresh_images()
            }
            Message::BackupRead(Err(e)) => {
                tracing::error!("Import failed: {}", e);
                self.notify(Notice::Error, &format!("Could not import backup: {}", e));
                Task::none()
            }
        }
    }

    /// Append a finished capture and tell the user how it went
    fn record(&mut self, capture: Capture) {
        let location = match capture.location {
            Ok(location) => Some(location),
            Err(e) => {
                tracing::warn!("Saving without location: {}", e);
                None
            }
        };

        self.scanner
            .record_capture(capture.image.data_url, location, capture.timestamp);

        if location.is_some() {
            self.devices.haptics.pulse(HAPTIC_PULSE);
            self.notify(Notice::Info, SAVED_LOCATED);
        } else {
            self.notify(Notice::Info, SAVED_UNLOCATED);
        }
    }

    /// Decode thumbnails for new or changed artifacts in the background
    fn refresh_images(&mut self) -> Task<Message> {
        let pending = self.images.sync(self.scanner.state());
        if pending.is_empty() {
            return Task::none();
        }

        tracing::debug!("Decoding {} thumbnails", pending.len());
        Task::perform(thumbnail::decode_async(pending), Message::ThumbnailsReady)
    }

    /// Keep the full-size picture in step with the selected artifact
    fn refresh_detail(&mut self) {
        let Some(artifact) = self.scanner.selected() else {
            self.detail = None;
            return;
        };

        let fingerprint = thumbnail::fingerprint(&artifact.image);
        let current = self
            .detail
            .as_ref()
            .is_some_and(|d| d.id == artifact.id && d.fingerprint == fingerprint);

        if !current {
            self.detail = Some(Detail {
                id: artifact.id.clone(),
                fingerprint,
                picture: thumbnail::full_image(&artifact.image),
            });
        }
    }

    /// Fetch one preview frame off the UI thread, unless one is in flight
    fn fetch_preview(&mut self) -> Task<Message> {
        let Some(handle) = self.camera.clone() else {
            return Task::none();
        };
        if self.preview_pending {
            return Task::none();
        }

        self.preview_pending = true;
        Task::perform(
            async move { handle.next_frame().await.map(frame_handle) },
            Message::PreviewFrame,
        )
    }

    fn stop_camera(&mut self) {
        if let Some(handle) = self.camera.take() {
            handle.stop();
        }
        self.preview = None;
    }

    fn notify(&mut self, level: Notice, message: &str) {
        self.status = message.to_string();
        self.devices.dialogs.notify(level, message);
    }

    /// Build the user interface
    pub fn view(&self) -> Element<'_, Message> {
        let screen = self.scanner.screen();
        let picture = self.detail.as_ref().and_then(|d| d.picture.as_ref());

        let body: Element<Message> = match screen {
            Screen::Scan => ui::scan::view(ui::scan::ScanView {
                camera_active: self.camera.is_some(),
                preview: self.preview.as_ref(),
                has_artifacts: !self.scanner.state().artifacts.is_empty(),
                capturing: self.capturing,
            }),
            Screen::Collection => ui::collection::view(self.scanner.state(), &self.images),
            Screen::Map(_) | Screen::Notes(_) => match self.scanner.selected() {
                Some(artifact) if matches!(screen, Screen::Map(_)) => {
                    ui::map::view(artifact, picture)
                }
                Some(artifact) => ui::notes::view(
                    artifact,
                    self.scanner.state().notes(&artifact.id),
                    picture,
                    &self.draft,
                ),
                None => ui::empty_state("Artifact not found", "It may have been deleted"),
            },
        };

        column![
            ui::header(),
            container(body).width(Length::Fill).height(Length::Fill),
            container(text(&self.status).size(13)).padding([4, 12]),
            ui::nav_bar(screen.nav_item()),
        ]
        .into()
    }

    /// Refresh the live preview while the camera is open
    pub fn subscription(&self) -> Subscription<Message> {
        if self.camera.is_some() {
            let period = Duration::from_millis(self.settings.camera.preview_interval_ms.max(33));
            iced::time::every(period).map(|_| Message::PreviewTick)
        } else {
            Subscription::none()
        }
    }

    /// Set the application theme
    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::camera::Camera;
    use crate::device::location::LocationError;
    use crate::device::mock::{MockCamera, MockDevices, RecordingDialogs};
    use crate::state::data::GeoLocation;
    use crate::state::store::MemoryStore;
    use crate::ui::thumbnail::PendingImage;
    use image::{Rgba, RgbaImage};
    use std::sync::atomic::Ordering;

    fn jpeg(size: u32) -> CapturedImage {
        let frame = RgbaImage::from_pixel(size, size, Rgba([120, 90, 60, 255]));
        capture::encode_frame(&frame, 90).unwrap()
    }

    fn capture_with(location: Result<GeoLocation, LocationError>) -> Message {
        Message::Captured(Capture {
            image: jpeg(12),
            location,
            timestamp: now_millis(),
        })
    }

    fn app(dialogs: RecordingDialogs) -> (App, MockDevices, MemoryStore) {
        let store = MemoryStore::default();
        let mocks = MockDevices::new(Ok(GeoLocation::new(10.0, 20.0, 5.0)), dialogs);
        let app = App::with_parts(
            Scanner::open(Box::new(store.clone())),
            mocks.devices.clone(),
            Settings::default(),
        );
        (app, mocks, store)
    }

    /// Run the thumbnail decode that `refresh_images` hands to the runtime
    fn finish_thumbnails(app: &mut App) {
        let pending = app
            .scanner
            .state()
            .artifacts
            .iter()
            .map(|a| PendingImage {
                id: a.id.clone(),
                fingerprint: thumbnail::fingerprint(&a.image),
                data_url: a.image.clone(),
            })
            .collect();
        let _ = app.update(Message::ThumbnailsReady(thumbnail::decode(pending)));
    }

    fn first_id(app: &App) -> ArtifactId {
        app.scanner.state().artifacts[0].id.clone()
    }

    #[test]
    fn test_scan_note_delete_flow() {
        let (mut app, mocks, store) = app(RecordingDialogs::answering(true));
        let location = GeoLocation::new(10.0, 20.0, 5.0);

        let _ = app.update(capture_with(Ok(location)));

        assert_eq!(app.scanner.state().artifacts.len(), 1);
        let id = first_id(&app);
        assert_eq!(app.scanner.state().artifacts[0].location, Some(location));
        assert_eq!(mocks.dialogs.last_notice().as_deref(), Some(SAVED_LOCATED));
        assert_eq!(*mocks.haptics.pulses.lock(), vec![HAPTIC_PULSE]);

        let _ = app.update(Message::Navigate(Transition::ShowCollection));
        let _ = app.update(Message::Navigate(Transition::OpenNotes(id.clone())));
        let _ = app.update(Message::DraftChanged("test".to_string()));
        let _ = app.update(Message::SendNote);

        let notes = app.scanner.state().notes(&id);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].text, "test");
        assert!(app.draft.is_empty());

        let _ = app.update(Message::Navigate(Transition::Close));
        let _ = app.update(Message::DeleteArtifact(id.clone()));

        assert!(app.scanner.state().artifacts.is_empty());
        assert!(!app.scanner.state().chat_messages.contains_key(&id));
        assert_eq!(*mocks.dialogs.confirmations.lock(), vec![DELETE_PROMPT.to_string()]);
        assert_eq!(store.saved(), Some(CollectionState::default()));
    }

    #[test]
    fn test_thumbnails_arrive_from_background_decode() {
        let (mut app, _, _) = app(RecordingDialogs::default());

        let _ = app.update(capture_with(Ok(GeoLocation::new(1.0, 2.0, 3.0))));
        let id = first_id(&app);
        assert!(app.images.get(&id).is_none());

        finish_thumbnails(&mut app);

        assert!(app.images.get(&id).is_some());
    }

    #[test]
    fn test_capture_without_location_is_saved() {
        let (mut app, mocks, _) = app(RecordingDialogs::default());

        let _ = app.update(capture_with(Err(LocationError::Timeout(Duration::from_secs(10)))));

        assert_eq!(app.scanner.state().artifacts.len(), 1);
        assert_eq!(app.scanner.state().artifacts[0].location, None);
        assert_eq!(mocks.dialogs.last_notice().as_deref(), Some(SAVED_UNLOCATED));
        assert!(mocks.haptics.pulses.lock().is_empty());
        assert!(!app.capturing);
    }

    #[test]
    fn test_declined_delete_keeps_artifact() {
        let (mut app, mocks, _) = app(RecordingDialogs::answering(false));
        let _ = app.update(capture_with(Ok(GeoLocation::new(1.0, 2.0, 3.0))));

        let _ = app.update(Message::DeleteArtifact(first_id(&app)));

        assert_eq!(app.scanner.state().artifacts.len(), 1);
        assert_eq!(mocks.dialogs.confirmations.lock().len(), 1);
    }

    #[test]
    fn test_delete_unknown_does_not_prompt() {
        let (mut app, mocks, _) = app(RecordingDialogs::answering(true));

        let _ = app.update(Message::DeleteArtifact(ArtifactId::new("missing")));

        assert!(mocks.dialogs.confirmations.lock().is_empty());
    }

    #[test]
    fn test_start_camera_sets_status() {
        let (mut app, _, _) = app(RecordingDialogs::default());

        let _ = app.update(Message::StartCamera);

        assert_eq!(app.status, "Opening camera...");
    }

    #[test]
    fn test_start_camera_ignored_while_capturing() {
        let (mut app, _, _) = app(RecordingDialogs::default());
        app.capturing = true;
        let before = app.status.clone();

        let _ = app.update(Message::StartCamera);

        assert_eq!(app.status, before);
        assert!(app.camera.is_none());
    }

    #[test]
    fn test_open_camera_requests_preview_frame() {
        let (mut app, mocks, _) = app(RecordingDialogs::default());

        let _ = app.update(Message::CameraStarted(Ok(mocks.camera.open())));

        assert!(app.camera.is_some());
        assert!(app.preview_pending);
        assert!(app.preview.is_none());

        let frame = frame_handle(RgbaImage::new(4, 3));
        let _ = app.update(Message::PreviewFrame(Ok(frame.clone())));

        assert!(!app.preview_pending);
        assert_eq!(app.preview, Some(frame));
    }

    #[test]
    fn test_preview_frame_after_stop_is_dropped() {
        let (mut app, mocks, _) = app(RecordingDialogs::default());
        let _ = app.update(Message::CameraStarted(Ok(mocks.camera.open())));
        let _ = app.update(Message::StopCamera);

        let _ = app.update(Message::PreviewFrame(Ok(frame_handle(RgbaImage::new(4, 3)))));

        assert!(app.preview.is_none());
        assert!(!app.preview_pending);
    }

    #[test]
    fn test_preview_ticks_do_not_pile_up() {
        let (mut app, mocks, _) = app(RecordingDialogs::default());
        let _ = app.update(Message::CameraStarted(Ok(mocks.camera.open())));
        assert!(app.preview_pending);

        let _ = app.update(Message::PreviewTick);
        let _ = app.update(Message::PreviewFrame(Err(CameraError::Stopped)));

        assert!(!app.preview_pending);
        assert!(app.preview.is_none());
    }

    #[test]
    fn test_leaving_scan_stops_camera() {
        let (mut app, mocks, _) = app(RecordingDialogs::default());
        let _ = app.update(Message::CameraStarted(Ok(mocks.camera.open())));

        let _ = app.update(Message::Navigate(Transition::ShowCollection));

        assert!(app.camera.is_none());
        assert!(mocks.camera.stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_camera_opened_after_leaving_scan_is_released() {
        let (mut app, mocks, _) = app(RecordingDialogs::default());
        let _ = app.update(Message::Navigate(Transition::ShowCollection));

        let _ = app.update(Message::CameraStarted(Ok(mocks.camera.open())));

        assert!(app.camera.is_none());
        assert!(mocks.camera.stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_capture_hands_stream_to_capture_task() {
        let (mut app, mocks, _) = app(RecordingDialogs::default());
        let _ = app.update(Message::CameraStarted(Ok(mocks.camera.open())));

        let _ = app.update(Message::CapturePhoto);

        assert!(app.camera.is_none());
        assert!(app.preview.is_none());
        assert!(app.capturing);

        let _ = app.update(Message::StartCamera);
        assert_eq!(app.status, "Saving capture...");
    }

    #[tokio::test]
    async fn test_denied_camera_start_notifies() {
        let (mut app, mocks, _) = app(RecordingDialogs::default());
        let camera = MockCamera::failing(CameraError::PermissionDenied);
        let constraints = StreamConstraints::from_settings(&app.settings.camera);

        let result = camera.start(&constraints).await;
        let _ = app.update(Message::CameraStarted(result));

        assert!(app.camera.is_none());
        assert_eq!(app.scanner.screen(), &Screen::Scan);
        assert_eq!(mocks.dialogs.last_notice().as_deref(), Some(CAMERA_UNAVAILABLE));
    }

    #[test]
    fn test_failed_capture_clears_capturing() {
        let (mut app, mocks, _) = app(RecordingDialogs::default());
        app.capturing = true;

        let _ = app.update(Message::ImageReady(Err(CaptureError::Camera("stopped".into()))));

        assert!(!app.capturing);
        assert!(mocks
            .dialogs
            .last_notice()
            .is_some_and(|n| n.starts_with("Could not read photo")));
    }

    #[test]
    fn test_upload_cancel_is_noop() {
        let (mut app, _, _) = app(RecordingDialogs::default());
        let before = app.status.clone();

        let _ = app.update(Message::UploadPhoto);

        assert!(!app.capturing);
        assert_eq!(app.status, before);
    }

    #[test]
    fn test_upload_reads_chosen_file() {
        let (mut app, _, _) = app(RecordingDialogs {
            image: Some(PathBuf::from("/photos/find.jpg")),
            ..RecordingDialogs::default()
        });

        let _ = app.update(Message::UploadPhoto);

        assert!(app.capturing);
        assert_eq!(app.status, "Reading /photos/find.jpg...");

        app.status.clear();
        let _ = app.update(Message::UploadPhoto);
        assert!(app.status.is_empty());
    }

    #[test]
    fn test_blank_note_is_ignored() {
        let (mut app, _, _) = app(RecordingDialogs::default());
        let _ = app.update(capture_with(Ok(GeoLocation::new(1.0, 2.0, 3.0))));
        let id = first_id(&app);
        let _ = app.update(Message::Navigate(Transition::ShowCollection));
        let _ = app.update(Message::Navigate(Transition::OpenNotes(id.clone())));

        let _ = app.update(Message::DraftChanged("   ".to_string()));
        let _ = app.update(Message::SendNote);

        assert!(app.scanner.state().notes(&id).is_empty());
        assert_eq!(app.draft, "   ");
    }

    #[test]
    fn test_share_known_artifact() {
        let (mut app, mocks, _) = app(RecordingDialogs::default());
        let _ = app.update(capture_with(Ok(GeoLocation::new(1.0, 2.0, 3.0))));

        let _ = app.update(Message::ShareArtifact(first_id(&app)));
        assert_eq!(app.status, "Sharing Artifact 1...");

        let _ = app.update(Message::Shared(Err(ShareError::Unsupported)));
        assert_eq!(mocks.dialogs.last_notice().as_deref(), Some(SHARE_UNSUPPORTED));
    }

    #[test]
    fn test_share_unknown_artifact_is_noop() {
        let (mut app, mocks, _) = app(RecordingDialogs::default());
        let before = app.status.clone();

        let _ = app.update(Message::ShareArtifact(ArtifactId::new("missing")));

        assert_eq!(app.status, before);
        assert!(mocks.dialogs.notices.lock().is_empty());
    }

    #[test]
    fn test_export_cancel_is_noop() {
        let (mut app, mocks, _) = app(RecordingDialogs::default());
        let before = app.status.clone();

        let _ = app.update(Message::ExportBackup);

        assert_eq!(app.status, before);
        assert!(mocks.dialogs.notices.lock().is_empty());
    }

    #[test]
    fn test_export_targets_dated_file_in_chosen_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _, _) = app(RecordingDialogs {
            save_to: Some(dir.path().to_path_buf()),
            ..RecordingDialogs::default()
        });

        let _ = app.update(Message::ExportBackup);

        let expected = dir
            .path()
            .join(export::backup_file_name(Utc::now().date_naive()));
        assert_eq!(app.status, format!("Saving backup to {}...", expected.display()));

        let _ = app.update(Message::Exported(Ok(expected.clone())));
        assert_eq!(app.status, format!("✅ Backup saved to {}", expected.display()));
    }

    #[test]
    fn test_import_cancel_is_noop() {
        let (mut app, _, _) = app(RecordingDialogs::default());
        let before = app.status.clone();

        let _ = app.update(Message::ImportBackup);

        assert_eq!(app.status, before);
    }

    #[test]
    fn test_import_reads_chosen_file() {
        let (mut app, _, _) = app(RecordingDialogs {
            backup: Some(PathBuf::from("/backups/dig.json")),
            ..RecordingDialogs::default()
        });

        let _ = app.update(Message::ImportBackup);

        assert_eq!(app.status, "Reading backup /backups/dig.json...");
    }

    #[test]
    fn test_confirmed_import_replaces_collection() {
        let (mut app, _, store) = app(RecordingDialogs::answering(true));
        let mut backup = CollectionState::default();
        let artifact = backup.new_artifact(jpeg(12).data_url, None, now_millis());
        backup.append(artifact);

        let _ = app.update(Message::BackupRead(Ok(backup.clone())));

        assert_eq!(app.scanner.state(), &backup);
        assert_eq!(store.saved(), Some(backup));
    }

    #[test]
    fn test_declined_import_keeps_collection() {
        let (mut app, _, _) = app(RecordingDialogs::answering(false));
        let _ = app.update(capture_with(Ok(GeoLocation::new(1.0, 2.0, 3.0))));

        let _ = app.update(Message::BackupRead(Ok(CollectionState::default())));

        assert_eq!(app.scanner.state().artifacts.len(), 1);
    }

    #[test]
    fn test_import_with_same_id_refreshes_pictures() {
        let (mut app, _, _) = app(RecordingDialogs::answering(true));
        let _ = app.update(capture_with(Ok(GeoLocation::new(1.0, 2.0, 3.0))));
        finish_thumbnails(&mut app);
        let id = first_id(&app);
        let _ = app.update(Message::Navigate(Transition::ShowCollection));
        let _ = app.update(Message::Navigate(Transition::OpenMap(id.clone())));

        let old_thumbnail = app.images.get(&id).cloned();
        let old_picture = app.detail.as_ref().and_then(|d| d.picture.clone());
        assert!(old_thumbnail.is_some());
        assert!(old_picture.is_some());

        let mut backup = app.scanner.state().clone();
        backup.artifacts[0].image = jpeg(40).data_url;
        let _ = app.update(Message::BackupRead(Ok(backup)));

        assert_eq!(app.scanner.screen(), &Screen::Map(id.clone()));
        assert!(app.images.get(&id).is_none());
        let new_picture = app.detail.as_ref().and_then(|d| d.picture.clone());
        assert!(new_picture.is_some());
        assert_ne!(new_picture, old_picture);

        finish_thumbnails(&mut app);
        assert!(app.images.get(&id).is_some());
        assert_ne!(app.images.get(&id).cloned(), old_thumbnail);
    }

    #[test]
    fn test_detail_picture_follows_selection() {
        let (mut app, _, _) = app(RecordingDialogs::default());
        let _ = app.update(capture_with(Ok(GeoLocation::new(1.0, 2.0, 3.0))));
        let id = first_id(&app);
        let _ = app.update(Message::Navigate(Transition::ShowCollection));

        let _ = app.update(Message::Navigate(Transition::OpenNotes(id.clone())));
        assert_eq!(app.detail.as_ref().map(|d| &d.id), Some(&id));

        let _ = app.update(Message::Navigate(Transition::Close));
        assert!(app.detail.is_none());
    }

    #[test]
    fn test_failed_import_leaves_state() {
        let (mut app, mocks, _) = app(RecordingDialogs::answering(true));
        let _ = app.update(capture_with(Ok(GeoLocation::new(1.0, 2.0, 3.0))));

        let _ = app.update(Message::BackupRead(Err(ExportError::Decode("bad".into()))));

        assert_eq!(app.scanner.state().artifacts.len(), 1);
        assert!(mocks
            .dialogs
            .last_notice()
            .is_some_and(|n| n.starts_with("Could not import backup")));
    }
}
