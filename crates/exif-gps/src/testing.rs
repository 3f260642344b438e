//! Minimal little-endian TIFF writer carrying only a GPS IFD.
//!
//! Enough structure for `kamadak-exif` to parse; used to fabricate photos with
//! known coordinates in tests.

/// GPS tags to encode. `None` omits the tag (and its ref) entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiffGps {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub status: Option<u8>,
}

enum Payload {
    Ascii(u8),
    Rationals([(u32, u32); 3]),
}

const TYPE_ASCII: u16 = 2;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;
const TAG_GPS_IFD_POINTER: u16 = 0x8825;
// Header (8) + IFD0 with a single entry (2 + 12 + 4)
const GPS_IFD_OFFSET: u32 = 26;

impl TiffGps {
    pub fn encode(&self) -> Vec<u8> {
        let mut entries: Vec<(u16, Payload)> = Vec::new();
        if let Some(lat) = self.lat {
            let hemisphere = if lat < 0.0 { b'S' } else { b'N' };
            entries.push((0x0001, Payload::Ascii(hemisphere)));
            entries.push((0x0002, Payload::Rationals(to_dms(lat.abs()))));
        }
        if let Some(lng) = self.lng {
            let hemisphere = if lng < 0.0 { b'W' } else { b'E' };
            entries.push((0x0003, Payload::Ascii(hemisphere)));
            entries.push((0x0004, Payload::Rationals(to_dms(lng.abs()))));
        }
        if let Some(status) = self.status {
            entries.push((0x0009, Payload::Ascii(status)));
        }

        let data_start = GPS_IFD_OFFSET + 2 + 12 * entries.len() as u32 + 4;

        let mut out = Vec::new();
        out.extend_from_slice(b"II");
        out.extend_from_slice(&42u16.to_le_bytes());
        out.extend_from_slice(&8u32.to_le_bytes());

        // IFD0: only the GPS pointer
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&TAG_GPS_IFD_POINTER.to_le_bytes());
        out.extend_from_slice(&TYPE_LONG.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&GPS_IFD_OFFSET.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());

        let mut data = Vec::new();
        out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        for (tag, payload) in &entries {
            out.extend_from_slice(&tag.to_le_bytes());
            match payload {
                Payload::Ascii(c) => {
                    out.extend_from_slice(&TYPE_ASCII.to_le_bytes());
                    out.extend_from_slice(&2u32.to_le_bytes());
                    out.extend_from_slice(&[*c, 0, 0, 0]);
                }
                Payload::Rationals(parts) => {
                    out.extend_from_slice(&TYPE_RATIONAL.to_le_bytes());
                    out.extend_from_slice(&3u32.to_le_bytes());
                    out.extend_from_slice(&(data_start + data.len() as u32).to_le_bytes());
                    for (num, denom) in parts {
                        data.extend_from_slice(&num.to_le_bytes());
                        data.extend_from_slice(&denom.to_le_bytes());
                    }
                }
            }
        }
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&data);
        out
    }
}

/// TIFF image whose EXIF GPS block records `(lat, lng)`
pub fn gps_tiff(lat: f64, lng: f64) -> Vec<u8> {
    TiffGps {
        lat: Some(lat),
        lng: Some(lng),
        status: None,
    }
    .encode()
}

pub fn gps_tiff_with_status(lat: f64, lng: f64, status: u8) -> Vec<u8> {
    TiffGps {
        lat: Some(lat),
        lng: Some(lng),
        status: Some(status),
    }
    .encode()
}

fn to_dms(value: f64) -> [(u32, u32); 3] {
    let degrees = value.trunc();
    let minutes_total = (value - degrees) * 60.0;
    let minutes = minutes_total.trunc();
    let seconds = (minutes_total - minutes) * 60.0;
    [
        (degrees as u32, 1),
        (minutes as u32, 1),
        ((seconds * 10_000.0).round() as u32, 10_000),
    ]
}
