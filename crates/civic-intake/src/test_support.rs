//! Shared fakes for unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use civic_intake_protocol::SubmissionAck;
use geo_boundary::{Coordinate, ServiceBoundary};

use crate::classifier::{Classifier, ClassifierError};
use crate::draft::ImageBlob;
use crate::gate::OutboundPayload;
use crate::location::{DeviceLocator, GeolocationError};
use crate::submission::{SubmissionError, Submitter};

pub fn sample_boundary() -> ServiceBoundary {
    ServiceBoundary::new(26.55, 26.40, 87.35, 87.20)
}

pub fn sample_image() -> ImageBlob {
    ImageBlob::new(b"\xff\xd8\xff\xe0 not really a jpeg".to_vec(), "issue.jpg", "image/jpeg")
}

pub struct CountingLocator {
    position: Coordinate,
    calls: AtomicUsize,
}

impl CountingLocator {
    pub fn at(position: Coordinate) -> Self {
        Self {
            position,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceLocator for CountingLocator {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.position)
    }
}

/// Never answers, like a permission prompt the user ignores
pub struct HangingLocator;

#[async_trait]
impl DeviceLocator for HangingLocator {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(GeolocationError::Unavailable("gave up".to_string()))
    }
}

pub struct FixedClassifier(pub &'static str);

#[async_trait]
impl Classifier for FixedClassifier {
    async fn classify(&self, _image: &ImageBlob) -> Result<String, ClassifierError> {
        Ok(self.0.to_string())
    }
}

/// Records every payload; fails while `failures_left` is non-zero
#[derive(Default)]
pub struct RecordingSubmitter {
    payloads: Mutex<Vec<OutboundPayload>>,
    failures_left: AtomicUsize,
}

impl RecordingSubmitter {
    pub fn failing(times: usize) -> Self {
        Self {
            payloads: Mutex::default(),
            failures_left: AtomicUsize::new(times),
        }
    }

    pub fn payloads(&self) -> Vec<OutboundPayload> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Submitter for RecordingSubmitter {
    async fn submit(&self, payload: &OutboundPayload) -> Result<SubmissionAck, SubmissionError> {
        self.payloads.lock().unwrap().push(payload.clone());
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SubmissionError::Rejected {
                status: 503,
                message: Some("Service unavailable".to_string()),
            });
        }
        Ok(SubmissionAck {
            id: Some("r-1".to_string()),
            message: None,
        })
    }
}
