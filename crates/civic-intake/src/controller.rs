//! The intake state machine.
//!
//! The controller owns the single live [`ReportDraft`] and reacts to events:
//! user actions arrive as method calls, async completions (location,
//! classifier label, geocoded address, submission result) arrive as explicit
//! values tagged with the [`DraftTicket`] they were started under. A
//! completion whose ticket no longer matches the current draft is dropped.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use civic_intake_protocol::{Category, SubmissionAck, Urgency};
use geo_boundary::Coordinate;
use tracing::{debug, info, warn};

use crate::classifier::{Classifier, ClassifierError};
use crate::draft::{ImageBlob, LocationSource, LocationState, ReportDraft};
use crate::error::{IntakeError, Result};
use crate::gate::{OutboundPayload, SubmissionGate};
use crate::geocoding::AddressLookup;
use crate::location::LocationResolver;
use crate::submission::{SubmissionError, Submitter};

/// Identity of a draft generation. Bumped whenever the draft is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftTicket(u64);

/// Recoverable failure shown to the reporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeFailure {
    BoundaryViolation(String),
    SubmissionFailed(String),
}

impl IntakeFailure {
    pub fn message(&self) -> &str {
        match self {
            Self::BoundaryViolation(msg) | Self::SubmissionFailed(msg) => msg,
        }
    }

    pub fn next_action(&self) -> &'static str {
        match self {
            Self::BoundaryViolation(_) => {
                "Drop a pin inside the service area, or retake the photo on site"
            }
            Self::SubmissionFailed(_) => "Check your connection and submit again",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakePhase {
    Empty,
    ImageCaptured,
    LocationPending,
    LocationResolved,
    ReadyToSubmit,
    Submitting,
    Submitted,
    Error(IntakeFailure),
}

impl IntakePhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::ImageCaptured => "image_captured",
            Self::LocationPending => "location_pending",
            Self::LocationResolved => "location_resolved",
            Self::ReadyToSubmit => "ready_to_submit",
            Self::Submitting => "submitting",
            Self::Submitted => "submitted",
            Self::Error(_) => "error",
        }
    }
}

/// What the backend accepted
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub ack: SubmissionAck,
    pub category: Category,
    /// Raw label sent alongside the category
    pub classification: String,
    pub submitted_at: DateTime<Utc>,
}

pub struct IntakeController {
    resolver: LocationResolver,
    gate: SubmissionGate,
    classifier: Arc<dyn Classifier>,
    submitter: Arc<dyn Submitter>,
    geocoder: Option<Arc<dyn AddressLookup>>,
    draft: ReportDraft,
    phase: IntakePhase,
    generation: u64,
    /// Automatic resolution finished without a usable location
    awaiting_pin: bool,
    in_flight: Option<OutboundPayload>,
}

impl IntakeController {
    pub fn new(
        resolver: LocationResolver,
        classifier: Arc<dyn Classifier>,
        submitter: Arc<dyn Submitter>,
    ) -> Self {
        let gate = SubmissionGate::new(*resolver.boundary());
        Self {
            resolver,
            gate,
            classifier,
            submitter,
            geocoder: None,
            draft: ReportDraft::default(),
            phase: IntakePhase::Empty,
            generation: 0,
            awaiting_pin: false,
            in_flight: None,
        }
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn AddressLookup>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn draft(&self) -> &ReportDraft {
        &self.draft
    }

    pub fn phase(&self) -> &IntakePhase {
        &self.phase
    }

    pub fn ticket(&self) -> DraftTicket {
        DraftTicket(self.generation)
    }

    pub fn gate(&self) -> &SubmissionGate {
        &self.gate
    }

    // --- Image ---

    /// Start a new draft for `image`. Nothing from the previous draft is kept.
    pub fn select_image(&mut self, image: ImageBlob) -> DraftTicket {
        self.draft = ReportDraft {
            image: Some(Arc::new(image)),
            ..Default::default()
        };
        self.replace_generation();
        self.transition(IntakePhase::ImageCaptured);
        self.ticket()
    }

    /// Discard the whole draft
    pub fn remove_image(&mut self) {
        self.draft = ReportDraft::default();
        self.replace_generation();
        self.transition(IntakePhase::Empty);
    }

    /// Select `image` and run automatic location, classification and address
    /// lookup for it.
    pub async fn capture(&mut self, image: ImageBlob) -> DraftTicket {
        let ticket = self.select_image(image);

        let Some(image) = self.draft.image.clone() else {
            return ticket;
        };
        let resolver = self.resolver.clone();
        let classifier = Arc::clone(&self.classifier);

        let (location, label) = futures::join!(
            resolver.resolve(&image.bytes),
            classifier.classify(&image)
        );

        self.apply_location(ticket, location);
        self.apply_classification(ticket, label);
        self.fill_address().await;
        ticket
    }

    // --- Async completions ---

    /// Deliver the automatic resolver's result. Never replaces a manual pin.
    pub fn apply_location(&mut self, ticket: DraftTicket, state: LocationState) -> bool {
        if !self.is_current(ticket, "location") {
            return false;
        }
        if self
            .draft
            .location
            .source()
            .is_some_and(LocationSource::is_manual)
        {
            debug!("Manual pin already set, ignoring automatic location");
            return false;
        }

        self.awaiting_pin = !state.is_resolved();
        self.draft.location = state;
        self.draft.geocoded_address = None;
        self.settle();
        true
    }

    pub fn apply_classification(
        &mut self,
        ticket: DraftTicket,
        label: std::result::Result<String, ClassifierError>,
    ) -> bool {
        if !self.is_current(ticket, "classification") {
            return false;
        }
        match label {
            Ok(label) => {
                let kept = self.draft.classification.set_automatic(&label);
                if kept {
                    info!(label = %label, "Automatic classification received");
                }
                kept
            }
            Err(ClassifierError::Unavailable) => false,
            Err(e) => {
                warn!(error = %e, "Classifier failed, leaving report unclassified");
                false
            }
        }
    }

    /// Deliver a geocoded address for `coord`. Dropped if the draft has moved
    /// to another coordinate meanwhile.
    pub fn apply_address(
        &mut self,
        ticket: DraftTicket,
        coord: Coordinate,
        address: Option<String>,
    ) -> bool {
        if !self.is_current(ticket, "address") {
            return false;
        }
        match &self.draft.location {
            LocationState::Resolved(source) if source.coordinate() == coord => {
                self.draft.geocoded_address = address;
                true
            }
            _ => {
                debug!("Location changed before address arrived, ignoring");
                false
            }
        }
    }

    /// Look up a display address for the resolved coordinate, unless the
    /// picker already supplied one or no geocoder is configured.
    pub async fn fill_address(&mut self) {
        let Some(geocoder) = self.geocoder.clone() else {
            return;
        };
        let coord = match &self.draft.location {
            LocationState::Resolved(source) if source.address().is_none() => source.coordinate(),
            _ => return,
        };

        let ticket = self.ticket();
        let address = geocoder.lookup(coord).await;
        self.apply_address(ticket, coord, address);
    }

    // --- User edits ---

    /// Place a manual map pin. An out-of-bounds pin is rejected and the
    /// previous location stays. Only a draft waiting for a pin moves to `Error`;
    /// an already located draft keeps its phase.
    pub fn pin_location(&mut self, lat: f64, lng: f64, address: Option<String>) -> Result<()> {
        if self.draft.image.is_none() {
            return Err(IntakeError::NoImage);
        }
        let coord = Coordinate::new(lat, lng)?;

        match self.resolver.resolve_manual(coord, address) {
            Ok(state) => {
                self.draft.location = state;
                self.draft.geocoded_address = None;
                self.settle();
                Ok(())
            }
            Err(IntakeError::OutOfBounds(reason)) => {
                if self.phase == IntakePhase::LocationPending {
                    self.transition(IntakePhase::Error(IntakeFailure::BoundaryViolation(
                        reason.clone(),
                    )));
                }
                Err(IntakeError::OutOfBounds(reason))
            }
            Err(e) => Err(e),
        }
    }

    /// Choose an issue type from the dropdown; `""` reverts to the automatic label.
    pub fn set_manual_issue_type(&mut self, key: &str) {
        self.draft.classification.set_manual(key);
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
        self.settle();
    }

    pub fn set_urgency(&mut self, urgency: Urgency) {
        self.draft.urgency = urgency;
    }

    pub fn set_contact(&mut self, contact: impl Into<String>) {
        self.draft.contact = contact.into();
    }

    // --- Submission ---

    /// Gate the draft and move to `Submitting`. Returns the payload to send
    /// and the ticket to hand back to [`Self::finish_submit`]. A blocked
    /// draft leaves the phase unchanged.
    pub fn begin_submit(&mut self) -> Result<(DraftTicket, OutboundPayload)> {
        match self.phase {
            IntakePhase::Submitting => return Err(IntakeError::SubmissionInProgress),
            IntakePhase::Submitted if self.draft.image.is_none() => {
                return Err(IntakeError::AlreadySubmitted)
            }
            _ => {}
        }

        let payload = match self.gate.can_submit(&self.draft) {
            Ok(verified) => self.gate.assemble(&verified),
            Err(blocked) => {
                info!(reasons = %blocked, "Submission blocked");
                return Err(blocked.into());
            }
        };

        self.in_flight = Some(payload.clone());
        self.transition(IntakePhase::Submitting);
        Ok((self.ticket(), payload))
    }

    /// Deliver the submission endpoint's answer
    pub fn finish_submit(
        &mut self,
        ticket: DraftTicket,
        result: std::result::Result<SubmissionAck, SubmissionError>,
    ) -> Result<SubmissionReceipt> {
        if !self.is_current(ticket, "submission") {
            return Err(IntakeError::StaleDraft);
        }
        let Some(payload) = self.in_flight.take() else {
            return Err(IntakeError::StaleDraft);
        };

        match result {
            Ok(ack) => {
                info!(
                    category = %payload.category,
                    classification = %payload.classification,
                    id = ?ack.id,
                    "Report accepted"
                );
                self.draft = ReportDraft::default();
                self.replace_generation();
                self.transition(IntakePhase::Submitted);
                Ok(SubmissionReceipt {
                    ack,
                    category: payload.category,
                    classification: payload.classification,
                    submitted_at: Utc::now(),
                })
            }
            Err(e) => {
                warn!(error = %e, "Report submission failed");
                self.transition(IntakePhase::Error(IntakeFailure::SubmissionFailed(
                    e.to_string(),
                )));
                Err(e.into())
            }
        }
    }

    pub async fn submit(&mut self) -> Result<SubmissionReceipt> {
        let (ticket, payload) = self.begin_submit()?;
        let submitter = Arc::clone(&self.submitter);
        let result = submitter.submit(&payload).await;
        self.finish_submit(ticket, result)
    }

    // --- Internals ---

    fn replace_generation(&mut self) {
        self.generation += 1;
        self.awaiting_pin = false;
        self.in_flight = None;
    }

    fn is_current(&self, ticket: DraftTicket, what: &'static str) -> bool {
        let current = self.ticket();
        if ticket != current {
            debug!(
                what,
                stale = ticket.0,
                current = current.0,
                "Ignoring result for a replaced draft"
            );
            return false;
        }
        true
    }

    /// Re-derive the phase from the draft
    fn settle(&mut self) {
        match self.phase {
            IntakePhase::Submitting => return,
            IntakePhase::Submitted if self.draft.image.is_none() => return,
            _ => {}
        }

        let next = if self.draft.image.is_none() {
            IntakePhase::Empty
        } else {
            match &self.draft.location {
                LocationState::Resolved(_) => {
                    if self.gate.can_submit(&self.draft).is_ok() {
                        IntakePhase::ReadyToSubmit
                    } else {
                        IntakePhase::LocationResolved
                    }
                }
                LocationState::Invalid { .. } => IntakePhase::LocationPending,
                LocationState::Unresolved if self.awaiting_pin => IntakePhase::LocationPending,
                LocationState::Unresolved => IntakePhase::ImageCaptured,
            }
        };
        self.transition(next);
    }

    fn transition(&mut self, next: IntakePhase) {
        if self.phase != next {
            info!(from = self.phase.name(), to = next.name(), "Intake phase changed");
            self.phase = next;
        }
    }
}
