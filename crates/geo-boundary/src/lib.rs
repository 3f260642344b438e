//! Service Area Boundaries
//!
//! Coordinate value type plus the point-in-rectangle test used to decide
//! whether a reported location falls inside a municipality's operating area.
//! The rectangle is axis-aligned in plain degrees; no geodesic correction.

mod boundary;
mod coordinate;
mod error;

pub use boundary::{validate, BoundaryCheck, ServiceBoundary};
pub use coordinate::Coordinate;
pub use error::{CoordinateError, Result};
