//! Error types for EXIF GPS extraction

use std::fmt;

use geo_boundary::CoordinateError;

#[derive(Debug)]
pub enum ExifGpsError {
    /// The container could not be read or carries no EXIF block
    Metadata(exif::Error),
    MissingTag(&'static str),
    InvalidValue { tag: &'static str, detail: String },
    /// `GPSStatus` reports the measurement as void
    NoFix,
    Coordinate(CoordinateError),
}

impl fmt::Display for ExifGpsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata(err) => write!(f, "EXIF metadata error: {}", err),
            Self::MissingTag(tag) => write!(f, "Missing EXIF tag: {}", tag),
            Self::InvalidValue { tag, detail } => {
                write!(f, "Invalid value for EXIF tag {}: {}", tag, detail)
            }
            Self::NoFix => write!(f, "GPS measurement is void"),
            Self::Coordinate(err) => write!(f, "Invalid GPS coordinate: {}", err),
        }
    }
}

impl std::error::Error for ExifGpsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Metadata(err) => Some(err),
            Self::Coordinate(err) => Some(err),
            _ => None,
        }
    }
}

impl From<exif::Error> for ExifGpsError {
    fn from(err: exif::Error) -> Self {
        Self::Metadata(err)
    }
}

impl From<CoordinateError> for ExifGpsError {
    fn from(err: CoordinateError) -> Self {
        Self::Coordinate(err)
    }
}

pub type Result<T> = std::result::Result<T, ExifGpsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tag_display() {
        let err = ExifGpsError::MissingTag("GPSLatitude");
        assert_eq!(format!("{}", err), "Missing EXIF tag: GPSLatitude");
    }

    #[test]
    fn test_invalid_value_display() {
        let err = ExifGpsError::InvalidValue {
            tag: "GPSLatitudeRef",
            detail: "expected N or S".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Invalid value for EXIF tag GPSLatitudeRef: expected N or S"
        );
    }

    #[test]
    fn test_coordinate_error_has_source() {
        use std::error::Error;
        let err = ExifGpsError::from(CoordinateError::LatitudeOutOfRange(95.0));
        assert!(err.source().is_some());
    }
}
