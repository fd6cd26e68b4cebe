//! One-shot position lookup.
//!
//! A capture asks for a single fix; there is no tracking and no retry.
//! [`locate`] applies the request timeout around whichever [`Locator`] the
//! device provides.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::settings::LocationSettings;
use crate::state::data::GeoLocation;

/// Parameters of a position request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached reading accepted; zero asks for a fresh fix
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("geolocation not supported")]
    Unsupported,

    #[error("no position within {0:?}")]
    Timeout(Duration),
}

/// Device capability answering a single position query
#[async_trait]
pub trait Locator: Send + Sync {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<GeoLocation, LocationError>;
}

/// Ask `locator` for one fix, giving up after `options.timeout`
pub async fn locate(
    locator: Arc<dyn Locator>,
    options: PositionOptions,
) -> Result<GeoLocation, LocationError> {
    tracing::debug!(
        "📍 Requesting position (high accuracy: {}, max age: {:?}, timeout: {:?})",
        options.high_accuracy,
        options.maximum_age,
        options.timeout
    );

    let result = tokio::time::timeout(options.timeout, locator.current_position(&options)).await;

    match result {
        Ok(Ok(position)) => {
            tracing::debug!("📍 Position {:.6}, {:.6}", position.lat, position.lng);
            Ok(position)
        }
        Ok(Err(e)) => {
            tracing::warn!("Location error: {}", e);
            Err(e)
        }
        Err(_) => {
            tracing::warn!("Location request timed out after {:?}", options.timeout);
            Err(LocationError::Timeout(options.timeout))
        }
    }
}

/// Reports the same configured position for every request
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator {
    position: GeoLocation,
}

impl FixedLocator {
    pub fn new(position: GeoLocation) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Locator for FixedLocator {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<GeoLocation, LocationError> {
        Ok(self.position)
    }
}

/// Device without any positioning hardware
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedLocator;

#[async_trait]
impl Locator for UnsupportedLocator {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<GeoLocation, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Pick the locator described by the settings
pub fn from_settings(settings: &LocationSettings) -> Arc<dyn Locator> {
    match settings.fixed {
        Some(position) => Arc::new(FixedLocator::new(position)),
        None => Arc::new(UnsupportedLocator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockLocator;

    #[tokio::test]
    async fn test_fixed_locator_reports_position() {
        let position = GeoLocation::new(10.0, 20.0, 5.0);
        let locator: Arc<dyn Locator> = Arc::new(FixedLocator::new(position));

        let result = locate(locator, PositionOptions::default()).await;

        assert_eq!(result, Ok(position));
    }

    #[tokio::test]
    async fn test_unsupported_locator() {
        let result = locate(Arc::new(UnsupportedLocator), PositionOptions::default()).await;

        assert_eq!(result, Err(LocationError::Unsupported));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_locator_times_out() {
        let locator = MockLocator::delayed(
            GeoLocation::new(1.0, 2.0, 3.0),
            Duration::from_secs(30),
        );
        let options = PositionOptions::default();

        let result = locate(Arc::new(locator), options).await;

        assert_eq!(result, Err(LocationError::Timeout(Duration::from_secs(10))));
    }

    #[tokio::test]
    async fn test_from_settings() {
        let mut settings = LocationSettings::default();
        let none = from_settings(&settings);
        assert_eq!(
            none.current_position(&PositionOptions::default()).await,
            Err(LocationError::Unsupported)
        );

        settings.fixed = Some(GeoLocation::new(48.85, 2.35, 20.0));
        let fixed = from_settings(&settings);
        assert_eq!(
            fixed.current_position(&PositionOptions::default()).await,
            Ok(GeoLocation::new(48.85, 2.35, 20.0))
        );
    }
}
