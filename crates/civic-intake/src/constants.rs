use std::time::Duration;

use geo_boundary::ServiceBoundary;

// --- Service area ---

/// Operating rectangle of the municipality (Biratnagar Metropolitan City).
/// Fixed at build time; reports outside it are never accepted.
pub const SERVICE_BOUNDARY: ServiceBoundary = ServiceBoundary::new(26.55, 26.40, 87.35, 87.20);

// --- Location resolution ---

/// How long to wait for the device's current position before treating it as
/// unavailable.
pub const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(5);

// --- Classification ---

/// Raw label sent when neither the classifier nor the user picked a type.
pub const DEFAULT_RAW_LABEL: &str = "other";

// --- Wire format ---

/// Decimal places used for `location_lat` / `location_lng`.
pub const WIRE_COORDINATE_DECIMALS: usize = 4;

/// Request timeout for the classifier service.
pub const CLASSIFIER_TIMEOUT: Duration = Duration::from_secs(20);

/// Request timeout for the report submission endpoint.
pub const SUBMISSION_TIMEOUT: Duration = Duration::from_secs(60);
