//! Error types for the intake pipeline

use std::fmt;

use geo_boundary::CoordinateError;

use crate::gate::Blocked;
use crate::submission::SubmissionError;

#[derive(Debug)]
pub enum IntakeError {
    /// The action needs a photo and none is selected
    NoImage,
    InvalidCoordinate(CoordinateError),
    /// A manual pin landed outside the service area
    OutOfBounds(String),
    /// The draft is not submittable yet
    Blocked(Blocked),
    SubmissionInProgress,
    AlreadySubmitted,
    /// A completion arrived for a draft that has since been replaced
    StaleDraft,
    Submission(SubmissionError),
}

impl fmt::Display for IntakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoImage => write!(f, "Select a photo first"),
            Self::InvalidCoordinate(err) => write!(f, "Invalid coordinate: {}", err),
            Self::OutOfBounds(reason) => write!(f, "{}", reason),
            Self::Blocked(blocked) => write!(f, "Report cannot be submitted yet: {}", blocked),
            Self::SubmissionInProgress => write!(f, "A submission is already in progress"),
            Self::AlreadySubmitted => write!(f, "This report has already been submitted"),
            Self::StaleDraft => write!(f, "The draft changed while the request was in flight"),
            Self::Submission(err) => write!(f, "Submission failed: {}", err),
        }
    }
}

impl std::error::Error for IntakeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidCoordinate(err) => Some(err),
            Self::Blocked(err) => Some(err),
            Self::Submission(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CoordinateError> for IntakeError {
    fn from(err: CoordinateError) -> Self {
        Self::InvalidCoordinate(err)
    }
}

impl From<Blocked> for IntakeError {
    fn from(err: Blocked) -> Self {
        Self::Blocked(err)
    }
}

impl From<SubmissionError> for IntakeError {
    fn from(err: SubmissionError) -> Self {
        Self::Submission(err)
    }
}

pub type Result<T> = std::result::Result<T, IntakeError>;
