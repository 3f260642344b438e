use std::sync::Arc;

use civic_intake_protocol::Urgency;
use geo_boundary::Coordinate;

use crate::classification::ClassificationState;

/// Photo handed over by the camera widget or file picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

impl ImageBlob {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Where a coordinate came from. Manual pins carry the picker's address, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSource {
    /// GPS tags embedded in the photo
    Exif(Coordinate),
    /// Device geolocation (browser Geolocation API or OS location service)
    Browser(Coordinate),
    /// Pin dropped on the map picker
    Manual(Coordinate, Option<String>),
}

impl LocationSource {
    pub fn coordinate(&self) -> Coordinate {
        match self {
            Self::Exif(c) | Self::Browser(c) | Self::Manual(c, _) => *c,
        }
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Manual(_, address) => address.as_deref(),
            _ => None,
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, Self::Manual(..))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Exif(_) => "exif",
            Self::Browser(_) => "browser",
            Self::Manual(..) => "manual",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LocationState {
    #[default]
    Unresolved,
    Resolved(LocationSource),
    /// A coordinate was obtained but falls outside the service area
    Invalid { source: LocationSource, reason: String },
}

impl LocationState {
    pub fn source(&self) -> Option<&LocationSource> {
        match self {
            Self::Unresolved => None,
            Self::Resolved(source) | Self::Invalid { source, .. } => Some(source),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// The in-progress report. One live draft per session.
#[derive(Debug, Clone, Default)]
pub struct ReportDraft {
    pub image: Option<Arc<ImageBlob>>,
    pub location: LocationState,
    /// Reverse-geocoded address for the resolved coordinate
    pub geocoded_address: Option<String>,
    pub classification: ClassificationState,
    pub description: String,
    pub urgency: Urgency,
    pub contact: String,
}

impl ReportDraft {
    /// Address to report: the picker's address for manual pins, otherwise the
    /// geocoded one.
    pub fn address(&self) -> Option<&str> {
        let not_blank = |a: &&str| !a.trim().is_empty();
        self.location
            .source()
            .and_then(LocationSource::address)
            .filter(not_blank)
            .or_else(|| self.geocoded_address.as_deref().filter(not_blank))
    }
}
