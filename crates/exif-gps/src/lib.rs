//! EXIF GPS Extraction
//!
//! Reads `GPSLatitude`/`GPSLongitude` (with their hemisphere refs) from the
//! EXIF block embedded in a photo and converts them to a decimal
//! [`Coordinate`](geo_boundary::Coordinate).

mod error;
mod reader;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::{ExifGpsError, Result};
pub use reader::{dms_to_decimal, read_gps};
