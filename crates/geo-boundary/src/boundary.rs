use std::fmt;

use serde::Serialize;
use ts_rs::TS;

use crate::coordinate::Coordinate;

/// Axis-aligned rectangle (decimal degrees) describing the area a
/// municipality accepts reports for. Edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ServiceBoundary {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// Outcome of checking a coordinate against a [`ServiceBoundary`]
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryCheck {
    Inside,
    OutOfBounds { reason: String },
}

impl BoundaryCheck {
    pub fn is_inside(&self) -> bool {
        matches!(self, Self::Inside)
    }
}

impl ServiceBoundary {
    pub const fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    pub fn contains(&self, coord: &Coordinate) -> bool {
        (self.south..=self.north).contains(&coord.lat())
            && (self.west..=self.east).contains(&coord.lng())
    }

    /// Check a coordinate, producing a user-displayable reason on failure.
    pub fn validate(&self, coord: &Coordinate) -> BoundaryCheck {
        if self.contains(coord) {
            return BoundaryCheck::Inside;
        }
        BoundaryCheck::OutOfBounds {
            reason: format!(
                "Location ({:.4}, {:.4}) is outside the service area ({})",
                coord.lat(),
                coord.lng(),
                self
            ),
        }
    }
}

impl fmt::Display for ServiceBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "latitude {} to {}, longitude {} to {}",
            self.south, self.north, self.west, self.east
        )
    }
}

/// Free-function form of [`ServiceBoundary::validate`].
pub fn validate(coord: &Coordinate, boundary: &ServiceBoundary) -> BoundaryCheck {
    boundary.validate(coord)
}
