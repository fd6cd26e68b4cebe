//! Native share sheet.

use async_trait::async_trait;
use thiserror::Error;

use crate::state::data::Artifact;

/// Text handed to the share sheet
pub const SHARE_TEXT: &str = "Check out this artifact I found!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: Option<String>,
}

impl SharePayload {
    /// Metadata shared for one artifact; the map link stands in for a page URL
    pub fn for_artifact(artifact: &Artifact) -> Self {
        Self {
            title: artifact.name.clone(),
            text: SHARE_TEXT.to_string(),
            url: artifact.location.map(|l| l.maps_url()),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShareError {
    #[error("sharing not supported on this device")]
    Unsupported,
}

#[async_trait]
pub trait Sharer: Send + Sync {
    async fn share(&self, payload: SharePayload) -> Result<(), ShareError>;
}

/// Desktop platforms offer no share intent
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShare;

#[async_trait]
impl Sharer for NoShare {
    async fn share(&self, _payload: SharePayload) -> Result<(), ShareError> {
        Err(ShareError::Unsupported)
    }
}
