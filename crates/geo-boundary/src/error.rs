use std::fmt;

/// Errors from constructing a coordinate
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateError {
    NotFinite,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFinite => write!(f, "Coordinate components must be finite numbers"),
            Self::LatitudeOutOfRange(lat) => {
                write!(f, "Latitude {lat} is outside [-90, 90]")
            }
            Self::LongitudeOutOfRange(lng) => {
                write!(f, "Longitude {lng} is outside [-180, 180]")
            }
        }
    }
}

impl std::error::Error for CoordinateError {}

pub type Result<T> = std::result::Result<T, CoordinateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latitude_out_of_range_display() {
        let err = CoordinateError::LatitudeOutOfRange(91.5);
        assert_eq!(format!("{}", err), "Latitude 91.5 is outside [-90, 90]");
    }

    #[test]
    fn test_not_finite_display() {
        let err = CoordinateError::NotFinite;
        assert!(format!("{}", err).contains("finite"));
    }
}
