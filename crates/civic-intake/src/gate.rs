//! Submission gate: decides whether a draft may be sent and builds the
//! outbound record.

use std::fmt;
use std::sync::Arc;

use civic_intake_protocol::{fields, Category, Urgency};
use geo_boundary::ServiceBoundary;

use crate::constants::WIRE_COORDINATE_DECIMALS;
use crate::draft::{ImageBlob, LocationSource, LocationState, ReportDraft};

/// One unmet submission requirement, phrased for the reporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    MissingImage,
    LocationUnresolved,
    /// The located coordinate is outside the service area
    LocationInvalid(String),
    /// Manually pinned reports must describe the problem
    DescriptionRequired,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingImage => write!(f, "Add a photo of the issue"),
            Self::LocationUnresolved => {
                write!(f, "Location unknown: drop a pin on the map")
            }
            Self::LocationInvalid(reason) => {
                write!(f, "{}: drop a pin inside the service area", reason)
            }
            Self::DescriptionRequired => write!(
                f,
                "Describe the issue: a description is required for manually pinned locations"
            ),
        }
    }
}

/// Every requirement the draft currently fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocked {
    pub reasons: Vec<BlockReason>,
}

impl fmt::Display for Blocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons: Vec<String> = self.reasons.iter().map(ToString::to_string).collect();
        write!(f, "{}", reasons.join("; "))
    }
}

impl std::error::Error for Blocked {}

/// A draft that passed [`SubmissionGate::can_submit`]. Only obtainable from
/// the gate, so a payload can never be assembled from an unchecked draft.
#[derive(Debug)]
pub struct VerifiedDraft<'a> {
    draft: &'a ReportDraft,
    image: &'a Arc<ImageBlob>,
    source: &'a LocationSource,
}

/// Record handed to the submission endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundPayload {
    pub image: Arc<ImageBlob>,
    pub location_lat: String,
    pub location_lng: String,
    pub address: String,
    pub description: String,
    pub urgency: Urgency,
    pub contact: String,
    pub classification: String,
    pub category: Category,
}

impl OutboundPayload {
    /// Text fields of the multipart form, in wire order
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            (fields::LOCATION_LAT, self.location_lat.clone()),
            (fields::LOCATION_LNG, self.location_lng.clone()),
            (fields::ADDRESS, self.address.clone()),
            (fields::DESCRIPTION, self.description.clone()),
            (fields::URGENCY, self.urgency.as_str().to_string()),
            (fields::CONTACT, self.contact.clone()),
            (fields::CLASSIFICATION, self.classification.clone()),
            (fields::CATEGORY, self.category.as_str().to_string()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionGate {
    boundary: ServiceBoundary,
}

impl SubmissionGate {
    pub fn new(boundary: ServiceBoundary) -> Self {
        Self { boundary }
    }

    /// Check every requirement, collecting all failures instead of stopping
    /// at the first. Urgency and contact never block.
    pub fn can_submit<'a>(&self, draft: &'a ReportDraft) -> Result<VerifiedDraft<'a>, Blocked> {
        let mut reasons = Vec::new();

        let image = draft.image.as_ref();
        if image.is_none() {
            reasons.push(BlockReason::MissingImage);
        }

        let source = match &draft.location {
            LocationState::Unresolved => {
                reasons.push(BlockReason::LocationUnresolved);
                None
            }
            LocationState::Invalid { reason, .. } => {
                reasons.push(BlockReason::LocationInvalid(reason.clone()));
                None
            }
            LocationState::Resolved(source) => {
                if let geo_boundary::BoundaryCheck::OutOfBounds { reason } =
                    self.boundary.validate(&source.coordinate())
                {
                    reasons.push(BlockReason::LocationInvalid(reason));
                }
                Some(source)
            }
        };

        let manual = draft.location.source().is_some_and(LocationSource::is_manual);
        if manual && draft.description.trim().is_empty() {
            reasons.push(BlockReason::DescriptionRequired);
        }

        match (image, source) {
            (Some(image), Some(source)) if reasons.is_empty() => Ok(VerifiedDraft {
                draft,
                image,
                source,
            }),
            _ => Err(Blocked { reasons }),
        }
    }

    /// Build the outbound record. Pure: the same draft always yields the same
    /// payload.
    pub fn assemble(&self, verified: &VerifiedDraft<'_>) -> OutboundPayload {
        let draft = verified.draft;
        let coord = verified.source.coordinate();
        let classification = draft.classification.resolve();

        OutboundPayload {
            image: Arc::clone(verified.image),
            location_lat: format!("{:.*}", WIRE_COORDINATE_DECIMALS, coord.lat()),
            location_lng: format!("{:.*}", WIRE_COORDINATE_DECIMALS, coord.lng()),
            address: draft.address().unwrap_or_default().to_string(),
            description: draft.description.trim().to_string(),
            urgency: draft.urgency,
            contact: draft.contact.trim().to_string(),
            classification: classification.raw_label,
            category: classification.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_boundary, sample_image};
    use geo_boundary::Coordinate;

    fn gate() -> SubmissionGate {
        SubmissionGate::new(sample_boundary())
    }

    fn manual_draft(description: &str) -> ReportDraft {
        ReportDraft {
            image: Some(Arc::new(sample_image())),
            location: LocationState::Resolved(LocationSource::Manual(
                Coordinate::new(26.47, 87.28).unwrap(),
                None,
            )),
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_draft_lists_every_reason() {
        let blocked = gate().can_submit(&ReportDraft::default()).unwrap_err();
        assert_eq!(
            blocked.reasons,
            vec![BlockReason::MissingImage, BlockReason::LocationUnresolved]
        );
    }

    #[test]
    fn test_manual_pin_requires_description() {
        let draft = manual_draft("   ");
        let blocked = gate().can_submit(&draft).unwrap_err();
        assert_eq!(blocked.reasons, vec![BlockReason::DescriptionRequired]);

        let draft = manual_draft("Overflowing bin next to the school gate");
        assert!(gate().can_submit(&draft).is_ok());
    }

    #[test]
    fn test_exif_location_allows_empty_description() {
        let draft = ReportDraft {
            image: Some(Arc::new(sample_image())),
            location: LocationState::Resolved(LocationSource::Exif(
                Coordinate::new(26.45, 87.27).unwrap(),
            )),
            ..Default::default()
        };
        assert!(gate().can_submit(&draft).is_ok());
    }

    #[test]
    fn test_invalid_location_blocks_with_reason() {
        let draft = ReportDraft {
            image: Some(Arc::new(sample_image())),
            location: LocationState::Invalid {
                source: LocationSource::Exif(Coordinate::new(27.7, 85.3).unwrap()),
                reason: "Location (27.7000, 85.3000) is outside the service area".to_string(),
            },
            ..Default::default()
        };
        let blocked = gate().can_submit(&draft).unwrap_err();
        assert_eq!(blocked.reasons.len(), 1);
        assert!(blocked.reasons[0]
            .to_string()
            .contains("drop a pin inside the service area"));
    }

    #[test]
    fn test_resolved_but_outside_boundary_is_blocked() {
        let draft = ReportDraft {
            image: Some(Arc::new(sample_image())),
            location: LocationState::Resolved(LocationSource::Browser(
                Coordinate::new(26.60, 87.27).unwrap(),
            )),
            ..Default::default()
        };
        let blocked = gate().can_submit(&draft).unwrap_err();
        assert!(matches!(
            blocked.reasons.as_slice(),
            [BlockReason::LocationInvalid(_)]
        ));
    }

    #[test]
    fn test_assemble_formats_wire_fields() {
        let mut draft = manual_draft("  Deep pothole near the culvert ");
        draft.classification.set_manual("road_damage");
        draft.urgency = Urgency::High;
        draft.contact = " 98XXXXXXXX ".to_string();

        let gate = gate();
        let verified = gate.can_submit(&draft).unwrap();
        let payload = gate.assemble(&verified);

        assert_eq!(payload.location_lat, "26.4700");
        assert_eq!(payload.location_lng, "87.2800");
        assert_eq!(payload.address, "");
        assert_eq!(payload.description, "Deep pothole near the culvert");
        assert_eq!(payload.contact, "98XXXXXXXX");
        assert_eq!(payload.classification, "road_damage");
        assert_eq!(payload.category, Category::Pothole);

        let fields = payload.text_fields();
        assert!(fields.contains(&("category", "pothole".to_string())));
        assert!(fields.contains(&("urgency", "high".to_string())));
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let mut draft = manual_draft("Broken streetlight");
        draft.classification.set_automatic("streetlight");

        let gate = gate();
        let verified = gate.can_submit(&draft).unwrap();
        let first = gate.assemble(&verified);
        let second = gate.assemble(&verified);

        assert_eq!(first, second);
        assert_eq!(first.text_fields(), second.text_fields());
        assert_eq!(first.image.bytes, second.image.bytes);
    }
}
