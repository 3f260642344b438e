//! Location resolution for a report photo.
//!
//! Sources are tried in a fixed order, photo EXIF then device geolocation,
//! and the first coordinate obtained is checked against the service boundary.
//! An out-of-bounds coordinate is final for that attempt: the resolver never
//! falls through to the next source, the user has to pin the spot manually.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use geo_boundary::{BoundaryCheck, Coordinate, ServiceBoundary};
use tracing::{debug, info, warn};

use crate::constants::GEOLOCATION_TIMEOUT;
use crate::draft::{LocationSource, LocationState};
use crate::error::IntakeError;

#[derive(Debug, Clone, PartialEq)]
pub enum GeolocationError {
    PermissionDenied,
    Unavailable(String),
}

impl fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "Location permission denied"),
            Self::Unavailable(msg) => write!(f, "Position unavailable: {}", msg),
        }
    }
}

impl std::error::Error for GeolocationError {}

/// The device's own position service
#[async_trait]
pub trait DeviceLocator: Send + Sync {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError>;
}

/// Locator answering with a fixed position, or refusing like a denied prompt
#[derive(Debug, Clone, Default)]
pub struct StaticLocator {
    position: Option<Coordinate>,
}

impl StaticLocator {
    pub fn at(position: Coordinate) -> Self {
        Self {
            position: Some(position),
        }
    }

    pub fn denied() -> Self {
        Self { position: None }
    }
}

#[async_trait]
impl DeviceLocator for StaticLocator {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        self.position.ok_or(GeolocationError::PermissionDenied)
    }
}

#[derive(Clone)]
pub struct LocationResolver {
    boundary: ServiceBoundary,
    locator: Arc<dyn DeviceLocator>,
    geolocation_timeout: Duration,
}

impl LocationResolver {
    pub fn new(boundary: ServiceBoundary, locator: Arc<dyn DeviceLocator>) -> Self {
        Self {
            boundary,
            locator,
            geolocation_timeout: GEOLOCATION_TIMEOUT,
        }
    }

    pub fn with_geolocation_timeout(mut self, timeout: Duration) -> Self {
        self.geolocation_timeout = timeout;
        self
    }

    pub fn boundary(&self) -> &ServiceBoundary {
        &self.boundary
    }

    /// Resolve automatically from the photo, then the device.
    ///
    /// Returns `Unresolved` when neither yields a coordinate.
    pub async fn resolve(&self, image: &[u8]) -> LocationState {
        if let Some(coord) = exif_coordinate(image) {
            return self.check(LocationSource::Exif(coord));
        }

        match self.device_position().await {
            Some(coord) => self.check(LocationSource::Browser(coord)),
            None => {
                info!("No automatic location available, manual pin required");
                LocationState::Unresolved
            }
        }
    }

    /// Validate a map pin. Out-of-bounds pins are rejected outright rather
    /// than recorded as an invalid state.
    pub fn resolve_manual(
        &self,
        coord: Coordinate,
        address: Option<String>,
    ) -> Result<LocationState, IntakeError> {
        let address = address.filter(|a| !a.trim().is_empty());
        match self.check(LocationSource::Manual(coord, address)) {
            LocationState::Invalid { reason, .. } => Err(IntakeError::OutOfBounds(reason)),
            state => Ok(state),
        }
    }

    fn check(&self, source: LocationSource) -> LocationState {
        match self.boundary.validate(&source.coordinate()) {
            BoundaryCheck::Inside => {
                info!(source = source.kind(), "Location resolved");
                LocationState::Resolved(source)
            }
            BoundaryCheck::OutOfBounds { reason } => {
                warn!(source = source.kind(), reason = %reason, "Location outside service area");
                LocationState::Invalid { source, reason }
            }
        }
    }

    async fn device_position(&self) -> Option<Coordinate> {
        match tokio::time::timeout(self.geolocation_timeout, self.locator.current_position()).await
        {
            Ok(Ok(coord)) => Some(coord),
            Ok(Err(e)) => {
                info!(error = %e, "Device geolocation unavailable");
                None
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.geolocation_timeout.as_millis() as u64,
                    "Device geolocation timed out"
                );
                None
            }
        }
    }
}

/// GPS position from the photo, if any. Parse failures count as "none".
fn exif_coordinate(image: &[u8]) -> Option<Coordinate> {
    match exif_gps::read_gps(image) {
        Ok(coord) => Some(coord),
        Err(e) => {
            debug!(error = %e, "No usable EXIF GPS position");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_boundary, CountingLocator, HangingLocator};
    use exif_gps::testing::gps_tiff;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[tokio::test]
    async fn test_exif_wins_without_touching_device() {
        let locator = Arc::new(CountingLocator::at(coord(26.41, 87.21)));
        let resolver = LocationResolver::new(sample_boundary(), locator.clone());

        let state = resolver.resolve(&gps_tiff(26.45, 87.27)).await;

        match state {
            LocationState::Resolved(LocationSource::Exif(c)) => {
                assert!((c.lat() - 26.45).abs() < 1e-6);
                assert!((c.lng() - 87.27).abs() < 1e-6);
            }
            other => panic!("Expected Resolved(Exif), got {other:?}"),
        }
        assert_eq!(locator.calls(), 0);
    }

    #[tokio::test]
    async fn test_device_used_when_photo_has_no_gps() {
        let locator = Arc::new(CountingLocator::at(coord(26.48, 87.30)));
        let resolver = LocationResolver::new(sample_boundary(), locator.clone());

        let state = resolver.resolve(b"\xff\xd8 no exif here").await;

        assert_eq!(
            state,
            LocationState::Resolved(LocationSource::Browser(coord(26.48, 87.30)))
        );
        assert_eq!(locator.calls(), 1);
    }

    #[tokio::test]
    async fn test_out_of_bounds_exif_does_not_fall_back() {
        let locator = Arc::new(CountingLocator::at(coord(26.45, 87.27)));
        let resolver = LocationResolver::new(sample_boundary(), locator.clone());

        let state = resolver.resolve(&gps_tiff(27.70, 85.32)).await;

        match state {
            LocationState::Invalid {
                source: LocationSource::Exif(_),
                reason,
            } => assert!(reason.contains("outside the service area")),
            other => panic!("Expected Invalid(Exif), got {other:?}"),
        }
        assert_eq!(locator.calls(), 0);
    }

    #[tokio::test]
    async fn test_out_of_bounds_device_is_invalid() {
        let resolver = LocationResolver::new(
            sample_boundary(),
            Arc::new(StaticLocator::at(coord(27.70, 85.32))),
        );
        let state = resolver.resolve(b"plain bytes").await;
        assert!(matches!(
            state,
            LocationState::Invalid {
                source: LocationSource::Browser(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_denied_geolocation_is_unresolved() {
        let resolver =
            LocationResolver::new(sample_boundary(), Arc::new(StaticLocator::denied()));
        assert_eq!(
            resolver.resolve(b"plain bytes").await,
            LocationState::Unresolved
        );
    }

    #[tokio::test]
    async fn test_geolocation_timeout_is_unresolved() {
        let resolver = LocationResolver::new(sample_boundary(), Arc::new(HangingLocator))
            .with_geolocation_timeout(Duration::from_millis(50));
        assert_eq!(
            resolver.resolve(b"plain bytes").await,
            LocationState::Unresolved
        );
    }

    #[test]
    fn test_manual_pin_in_bounds() {
        let resolver =
            LocationResolver::new(sample_boundary(), Arc::new(StaticLocator::denied()));
        let state = resolver
            .resolve_manual(coord(26.50, 87.25), Some("Rani bazaar".to_string()))
            .unwrap();
        assert_eq!(
            state,
            LocationState::Resolved(LocationSource::Manual(
                coord(26.50, 87.25),
                Some("Rani bazaar".to_string())
            ))
        );
    }

    #[test]
    fn test_manual_pin_out_of_bounds_rejected() {
        let resolver =
            LocationResolver::new(sample_boundary(), Arc::new(StaticLocator::denied()));
        match resolver.resolve_manual(coord(26.60, 87.27), None) {
            Err(IntakeError::OutOfBounds(reason)) => {
                assert!(reason.contains(&sample_boundary().to_string()));
            }
            other => panic!("Expected OutOfBounds, got {other:?}"),
        }
    }
}
