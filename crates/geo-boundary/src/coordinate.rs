use serde::Serialize;
use ts_rs::TS;

use crate::error::{CoordinateError, Result};

/// A WGS84 point in decimal degrees.
///
/// Construct through [`Coordinate::new`], which rejects NaN/infinite values and
/// anything outside `lat ∈ [-90, 90]`, `lng ∈ [-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_extremes() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert_eq!(
            Coordinate::new(90.0001, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(90.0001))
        );
        assert_eq!(
            Coordinate::new(0.0, -180.5),
            Err(CoordinateError::LongitudeOutOfRange(-180.5))
        );
    }

    #[test]
    fn test_new_rejects_nan() {
        assert_eq!(
            Coordinate::new(f64::NAN, 10.0),
            Err(CoordinateError::NotFinite)
        );
        assert_eq!(
            Coordinate::new(10.0, f64::INFINITY),
            Err(CoordinateError::NotFinite)
        );
    }

    #[test]
    fn test_serializes_as_lat_lng() {
        let coord = Coordinate::new(26.45, 87.27).unwrap();
        let json = serde_json::to_value(coord).unwrap();
        assert_eq!(json["lat"], 26.45);
        assert_eq!(json["lng"], 87.27);
    }
}
