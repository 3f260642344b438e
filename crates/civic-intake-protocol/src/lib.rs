//! Wire types for civic issue reports.
//!
//! The backend accepts a fixed three-bucket [`Category`] taxonomy; the
//! classifier speaks a finer label vocabulary ([`CLASSIFIER_LABELS`]). Field
//! names of the outbound multipart form live in [`fields`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Taxonomy bucket accepted by the report backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Category {
    Pothole,
    Garbage,
    Others,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pothole => "pothole",
            Self::Garbage => "garbage",
            Self::Others => "others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown urgency '{other}' (expected low, medium or high)")),
        }
    }
}

/// Labels the classifier service may return
pub const CLASSIFIER_LABELS: &[&str] = &[
    "pothole",
    "garbage",
    "streetlight",
    "water",
    "drainage",
    "traffic",
    "noise",
    "construction",
    "other",
];

/// Multipart field names of the outbound report
pub mod fields {
    pub const IMAGE: &str = "image";
    pub const LOCATION_LAT: &str = "location_lat";
    pub const LOCATION_LNG: &str = "location_lng";
    pub const ADDRESS: &str = "address";
    pub const DESCRIPTION: &str = "description";
    pub const URGENCY: &str = "urgency";
    pub const CONTACT: &str = "contact";
    pub const CLASSIFICATION: &str = "classification";
    pub const CATEGORY: &str = "category";
}

/// Response body of the classifier's `/classify` endpoint
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClassifyResponse {
    pub label: String,
    #[ts(optional)]
    pub confidence: Option<f32>,
}

/// Acknowledgement returned by the report backend. Treated as opaque apart
/// from the optional id and message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SubmissionAck {
    #[serde(default)]
    #[ts(optional)]
    pub id: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_strings() {
        assert_eq!(Category::Pothole.as_str(), "pothole");
        assert_eq!(Category::Garbage.as_str(), "garbage");
        assert_eq!(Category::Others.as_str(), "others");
        assert_eq!(
            serde_json::to_string(&Category::Others).unwrap(),
            "\"others\""
        );
    }

    #[test]
    fn test_urgency_default_is_medium() {
        assert_eq!(Urgency::default(), Urgency::Medium);
    }

    #[test]
    fn test_urgency_from_str() {
        assert_eq!("HIGH".parse::<Urgency>().unwrap(), Urgency::High);
        assert_eq!(" low ".parse::<Urgency>().unwrap(), Urgency::Low);
        assert!("urgent".parse::<Urgency>().is_err());
    }

    #[test]
    fn test_classify_response_without_confidence() {
        let resp: ClassifyResponse = serde_json::from_str(r#"{"label":"water"}"#).unwrap();
        assert_eq!(resp.label, "water");
        assert!(resp.confidence.is_none());
    }

    #[test]
    fn test_submission_ack_tolerates_extra_fields() {
        let ack: SubmissionAck =
            serde_json::from_str(r#"{"id":"r-17","status":"queued"}"#).unwrap();
        assert_eq!(ack.id.as_deref(), Some("r-17"));
        assert!(ack.message.is_none());
    }
}
