//! Intake pipeline for citizen issue reports.
//!
//! A report starts from a photo. Its location is resolved from EXIF GPS
//! tags, then the device position, then a manual map pin, and must fall
//! inside the municipality's [`SERVICE_BOUNDARY`]. The issue type comes from
//! an automatic classifier unless the reporter picks one. The
//! [`SubmissionGate`] decides when the draft can be sent and builds the
//! multipart payload; [`IntakeController`] drives the whole flow.

pub mod classification;
pub mod classifier;
pub mod constants;
pub mod controller;
pub mod draft;
pub mod error;
pub mod gate;
pub mod geocoding;
pub mod location;
pub mod submission;

#[cfg(test)]
mod test_support;

pub use civic_intake_protocol::{Category, Urgency};
pub use classification::{
    arbitrate, category_for_label, issue_type, ClassificationResolution, ClassificationState,
    IssueTypeOption, ISSUE_TYPE_OPTIONS,
};
pub use classifier::{Classifier, ClassifierError, HttpClassifier, NoClassifier};
pub use constants::SERVICE_BOUNDARY;
pub use controller::{DraftTicket, IntakeController, IntakeFailure, IntakePhase, SubmissionReceipt};
pub use draft::{ImageBlob, LocationSource, LocationState, ReportDraft};
pub use error::{IntakeError, Result};
pub use gate::{BlockReason, Blocked, OutboundPayload, SubmissionGate, VerifiedDraft};
pub use geocoding::AddressLookup;
pub use location::{DeviceLocator, GeolocationError, LocationResolver, StaticLocator};
pub use submission::{HttpSubmitter, SubmissionError, Submitter};
