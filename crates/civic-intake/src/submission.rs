//! Delivery of an assembled report to the backend endpoint.

use std::fmt;

use async_trait::async_trait;
use civic_intake_protocol::{fields, SubmissionAck};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::{error, info};

use crate::constants::SUBMISSION_TIMEOUT;
use crate::gate::OutboundPayload;

#[derive(Debug)]
pub enum SubmissionError {
    Http(reqwest::Error),
    /// The endpoint answered with a non-success status
    Rejected { status: u16, message: Option<String> },
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "HTTP error: {}", e),
            Self::Rejected {
                status,
                message: Some(message),
            } => write!(f, "Server rejected the report ({}): {}", status, message),
            Self::Rejected {
                status,
                message: None,
            } => write!(f, "Server rejected the report ({})", status),
        }
    }
}

impl std::error::Error for SubmissionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Rejected { .. } => None,
        }
    }
}

impl From<reqwest::Error> for SubmissionError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, payload: &OutboundPayload) -> Result<SubmissionAck, SubmissionError>;
}

/// Posts reports as `multipart/form-data` to a single endpoint
pub struct HttpSubmitter {
    client: Client,
    endpoint: String,
}

impl HttpSubmitter {
    pub fn new(endpoint: &str) -> Self {
        let client = Client::builder()
            .timeout(SUBMISSION_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    fn form(payload: &OutboundPayload) -> Result<Form, SubmissionError> {
        let image = Part::bytes(payload.image.bytes.clone())
            .file_name(payload.image.file_name.clone())
            .mime_str(&payload.image.mime_type)?;

        let form = payload
            .text_fields()
            .into_iter()
            .fold(Form::new().part(fields::IMAGE, image), |form, (name, value)| {
                form.text(name, value)
            });
        Ok(form)
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, payload: &OutboundPayload) -> Result<SubmissionAck, SubmissionError> {
        let form = Self::form(payload)?;
        let resp = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = rejection_message(&body);
            error!(status = %status, message = ?message, "Report submission rejected");
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        info!(status = %status, category = %payload.category, "Report submitted");
        Ok(parse_ack(&body))
    }
}

/// Success bodies are opaque; anything that isn't an ack object becomes its message.
fn parse_ack(body: &str) -> SubmissionAck {
    serde_json::from_str(body).unwrap_or_else(|_| SubmissionAck {
        id: None,
        message: Some(body.trim().to_string()).filter(|m| !m.is_empty()),
    })
}

/// Server-provided reason, from a JSON `message`/`error`/`detail` field or the raw text
fn rejection_message(body: &str) -> Option<String> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(Value::String(msg)) = map.get(key) {
                if !msg.trim().is_empty() {
                    return Some(msg.trim().to_string());
                }
            }
        }
    }
    let text = body.trim();
    (!text.is_empty()).then(|| text.to_string())
}
