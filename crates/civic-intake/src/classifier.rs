//! Client for the image classification service.
//!
//! The classifier is an untrusted, best-effort signal: any failure simply
//! leaves the draft without an automatic label.

use std::fmt;

use async_trait::async_trait;
use civic_intake_protocol::{fields, ClassifyResponse};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

use crate::constants::CLASSIFIER_TIMEOUT;
use crate::draft::ImageBlob;

#[derive(Debug)]
pub enum ClassifierError {
    Http(reqwest::Error),
    Status(u16),
    /// No classifier is configured
    Unavailable,
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Classifier HTTP error: {}", e),
            Self::Status(status) => write!(f, "Classifier returned status {}", status),
            Self::Unavailable => write!(f, "No classifier configured"),
        }
    }
}

impl std::error::Error for ClassifierError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClassifierError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

/// Produces a lowercase issue label for a photo
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image: &ImageBlob) -> Result<String, ClassifierError>;
}

/// Stand-in used when no classifier service is deployed
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClassifier;

#[async_trait]
impl Classifier for NoClassifier {
    async fn classify(&self, _image: &ImageBlob) -> Result<String, ClassifierError> {
        Err(ClassifierError::Unavailable)
    }
}

/// HTTP client for the classifier service (`POST {base}/classify`)
pub struct HttpClassifier {
    client: Client,
    base_url: String,
}

impl HttpClassifier {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(CLASSIFIER_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, image: &ImageBlob) -> Result<String, ClassifierError> {
        let url = format!("{}/classify", self.base_url);
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)?;
        let form = Form::new().part(fields::IMAGE, part);

        let resp = self.client.post(&url).multipart(form).send().await?;
        if !resp.status().is_success() {
            return Err(ClassifierError::Status(resp.status().as_u16()));
        }

        let body: ClassifyResponse = resp.json().await?;
        debug!(label = %body.label, confidence = ?body.confidence, "Classifier responded");
        Ok(body.label.trim().to_ascii_lowercase())
    }
}
