use std::io::Cursor;

use exif::{Exif, In, Rational, Tag, Value};
use geo_boundary::Coordinate;
use tracing::debug;

use crate::error::{ExifGpsError, Result};

/// Extract the GPS position recorded in a photo's EXIF block.
///
/// Accepts any container `kamadak-exif` understands (JPEG, TIFF, HEIF, PNG,
/// WebP). Missing hemisphere refs default to north/east.
pub fn read_gps(image: &[u8]) -> Result<Coordinate> {
    let exif = exif::Reader::new().read_from_container(&mut Cursor::new(image))?;

    if let Some(status) = ascii_tag(&exif, Tag::GPSStatus, "GPSStatus")? {
        if status.eq_ignore_ascii_case(&b'V') {
            return Err(ExifGpsError::NoFix);
        }
    }

    let lat = dms_tag(&exif, Tag::GPSLatitude, "GPSLatitude")?;
    let lng = dms_tag(&exif, Tag::GPSLongitude, "GPSLongitude")?;

    let lat_ref = ascii_tag(&exif, Tag::GPSLatitudeRef, "GPSLatitudeRef")?.unwrap_or(b'N');
    let lng_ref = ascii_tag(&exif, Tag::GPSLongitudeRef, "GPSLongitudeRef")?.unwrap_or(b'E');

    let lat = match lat_ref.to_ascii_uppercase() {
        b'N' => lat,
        b'S' => -lat,
        other => {
            return Err(ExifGpsError::InvalidValue {
                tag: "GPSLatitudeRef",
                detail: format!("expected N or S, got {:?}", other as char),
            })
        }
    };
    let lng = match lng_ref.to_ascii_uppercase() {
        b'E' => lng,
        b'W' => -lng,
        other => {
            return Err(ExifGpsError::InvalidValue {
                tag: "GPSLongitudeRef",
                detail: format!("expected E or W, got {:?}", other as char),
            })
        }
    };

    let coord = Coordinate::new(lat, lng)?;
    debug!(lat = coord.lat(), lng = coord.lng(), "Read GPS position from EXIF");
    Ok(coord)
}

/// Convert degrees/minutes/seconds to unsigned decimal degrees
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

fn dms_tag(exif: &Exif, tag: Tag, name: &'static str) -> Result<f64> {
    let field = exif
        .get_field(tag, In::PRIMARY)
        .ok_or(ExifGpsError::MissingTag(name))?;

    let parts = match field.value {
        Value::Rational(ref v) if !v.is_empty() => v,
        _ => {
            return Err(ExifGpsError::InvalidValue {
                tag: name,
                detail: "expected 1-3 rationals".to_string(),
            })
        }
    };

    let mut dms = [0.0f64; 3];
    for (slot, part) in dms.iter_mut().zip(parts.iter()) {
        *slot = rational(part, name)?;
    }
    Ok(dms_to_decimal(dms[0], dms[1], dms[2]))
}

fn rational(value: &Rational, name: &'static str) -> Result<f64> {
    if value.denom == 0 {
        return Err(ExifGpsError::InvalidValue {
            tag: name,
            detail: "zero denominator".to_string(),
        });
    }
    Ok(value.to_f64())
}

/// First byte of a single-character ASCII tag, if the tag is present
fn ascii_tag(exif: &Exif, tag: Tag, name: &'static str) -> Result<Option<u8>> {
    let Some(field) = exif.get_field(tag, In::PRIMARY) else {
        return Ok(None);
    };
    match field.value {
        Value::Ascii(ref strings) => Ok(strings.first().and_then(|s| s.first()).copied()),
        _ => Err(ExifGpsError::InvalidValue {
            tag: name,
            detail: "expected ASCII".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gps_tiff, gps_tiff_with_status, TiffGps};

    #[test]
    fn test_dms_to_decimal() {
        assert!((dms_to_decimal(26.0, 27.0, 0.0) - 26.45).abs() < 1e-12);
        assert!((dms_to_decimal(87.0, 16.0, 12.0) - 87.27).abs() < 1e-12);
    }

    #[test]
    fn test_read_gps_northern_eastern() {
        let image = gps_tiff(26.45, 87.27);
        let coord = read_gps(&image).unwrap();
        assert!((coord.lat() - 26.45).abs() < 1e-6);
        assert!((coord.lng() - 87.27).abs() < 1e-6);
    }

    #[test]
    fn test_read_gps_southern_western() {
        let image = gps_tiff(-33.8688, -70.6693);
        let coord = read_gps(&image).unwrap();
        assert!((coord.lat() + 33.8688).abs() < 1e-6);
        assert!((coord.lng() + 70.6693).abs() < 1e-6);
    }

    #[test]
    fn test_void_status_is_no_fix() {
        let image = gps_tiff_with_status(26.45, 87.27, b'V');
        assert!(matches!(read_gps(&image), Err(ExifGpsError::NoFix)));
    }

    #[test]
    fn test_active_status_is_read() {
        let image = gps_tiff_with_status(26.45, 87.27, b'A');
        assert!(read_gps(&image).is_ok());
    }

    #[test]
    fn test_missing_longitude() {
        let image = TiffGps {
            lat: Some(26.45),
            lng: None,
            status: None,
        }
        .encode();
        assert!(matches!(
            read_gps(&image),
            Err(ExifGpsError::MissingTag("GPSLongitude"))
        ));
    }

    #[test]
    fn test_not_an_image() {
        let result = read_gps(b"definitely not a photo");
        assert!(matches!(result, Err(ExifGpsError::Metadata(_))));
    }

    #[test]
    fn test_empty_input() {
        assert!(read_gps(&[]).is_err());
    }
}
