use iced::widget::image::Handle;
use image::imageops::FilterType;
use image::RgbaImage;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::capture::from_data_url;
use crate::state::data::{ArtifactId, CollectionState};

/// Size of generated thumbnails (square bound)
const THUMBNAIL_SIZE: u32 = 256;

/// Identifies the exact image a handle was built from
pub fn fingerprint(data_url: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    data_url.hash(&mut hasher);
    hasher.finish()
}

/// Decode an artifact's embedded image into a card thumbnail.
/// Returns None if the data URL or the image inside it is unreadable.
pub fn thumbnail_for(data_url: &str) -> Option<Handle> {
    let (_, bytes) = from_data_url(data_url)?;

    let img = image::load_from_memory(&bytes).ok()?;
    let thumbnail = img
        .resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3)
        .to_rgba8();

    Some(frame_handle(thumbnail))
}

/// Full-size handle for the detail screens. Only the base64 payload is
/// decoded here; the renderer decodes the image itself.
pub fn full_image(data_url: &str) -> Option<Handle> {
    let (_, bytes) = from_data_url(data_url)?;
    Some(Handle::from_bytes(bytes))
}

/// Wrap a raw frame for display
pub fn frame_handle(frame: RgbaImage) -> Handle {
    let (width, height) = frame.dimensions();
    Handle::from_rgba(width, height, frame.into_raw())
}

/// An artifact image waiting to be decoded
#[derive(Debug, Clone)]
pub struct PendingImage {
    pub id: ArtifactId,
    pub fingerprint: u64,
    pub data_url: String,
}

/// Result of decoding a [`PendingImage`]
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub id: ArtifactId,
    pub fingerprint: u64,
    pub thumbnail: Option<Handle>,
}

/// Decode a batch of thumbnails. CPU-bound; call from a blocking thread.
pub fn decode(pending: Vec<PendingImage>) -> Vec<DecodedImage> {
    pending
        .into_iter()
        .map(|p| DecodedImage {
            thumbnail: thumbnail_for(&p.data_url),
            id: p.id,
            fingerprint: p.fingerprint,
        })
        .collect()
}

/// Decode a batch off the UI thread
pub async fn decode_async(pending: Vec<PendingImage>) -> Vec<DecodedImage> {
    let count = pending.len();
    match tokio::task::spawn_blocking(move || decode(pending)).await {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::error!("Thumbnail task failed for {} images: {}", count, e);
            Vec::new()
        }
    }
}

#[derive(Debug)]
struct Entry {
    fingerprint: u64,
    /// None when the image could not be decoded
    thumbnail: Option<Handle>,
}

/// Card thumbnails for every artifact, keyed by id and by the image they
/// were built from
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<ArtifactId, Entry>,
    /// Decodes in flight
    pending: HashMap<ArtifactId, u64>,
}

impl ImageCache {
    pub fn get(&self, id: &ArtifactId) -> Option<&Handle> {
        self.entries.get(id).and_then(|e| e.thumbnail.as_ref())
    }

    /// Forget removed or changed artifacts and return the images that
    /// still need decoding. Images already in flight are not returned again.
    pub fn sync(&mut self, state: &CollectionState) -> Vec<PendingImage> {
        let current: HashMap<&ArtifactId, u64> = state
            .artifacts
            .iter()
            .map(|a| (&a.id, fingerprint(&a.image)))
            .collect();

        self.entries
            .retain(|id, e| current.get(id) == Some(&e.fingerprint));
        self.pending
            .retain(|id, fp| current.get(id) == Some(fp));

        let mut missing = Vec::new();
        for artifact in &state.artifacts {
            let fp = current[&artifact.id];
            if self.entries.contains_key(&artifact.id) || self.pending.contains_key(&artifact.id) {
                continue;
            }
            self.pending.insert(artifact.id.clone(), fp);
            missing.push(PendingImage {
                id: artifact.id.clone(),
                fingerprint: fp,
                data_url: artifact.image.clone(),
            });
        }
        missing
    }

    /// Store finished decodes. Results for images that changed or were
    /// removed while decoding are dropped.
    pub fn insert(&mut self, decoded: Vec<DecodedImage>) {
        for image in decoded {
            if self.pending.get(&image.id) != Some(&image.fingerprint) {
                tracing::debug!("Dropping stale thumbnail for {}", image.id);
                continue;
            }
            self.pending.remove(&image.id);

            if image.thumbnail.is_none() {
                tracing::warn!("⚠️  Could not decode image of {}", image.id);
            }
            self.entries.insert(
                image.id,
                Entry {
                    fingerprint: image.fingerprint,
                    thumbnail: image.thumbnail,
                },
            );
        }
    }
}
