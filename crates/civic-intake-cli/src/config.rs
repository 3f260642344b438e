use std::env;

use url::Url;

use crate::error::{CliError, Result};

const DEFAULT_SUBMISSION_URL: &str = "http://localhost:3004/api/reports";

/// Deployment settings parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub submission_url: Url,
    /// Classifier service base URL; reports stay unclassified without it
    pub classifier_url: Option<Url>,
    /// Nominatim base URL; enables reverse geocoding when set
    pub nominatim_url: Option<Url>,
    pub geocoder_user_agent: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let submission_url = parse_url(
            "SUBMISSION_URL",
            &var("SUBMISSION_URL").unwrap_or_else(|| DEFAULT_SUBMISSION_URL.to_string()),
        )?;
        let classifier_url = var("CLASSIFIER_URL")
            .map(|v| parse_url("CLASSIFIER_URL", &v))
            .transpose()?;
        let nominatim_url = var("NOMINATIM_URL")
            .map(|v| parse_url("NOMINATIM_URL", &v))
            .transpose()?;
        let geocoder_user_agent = var("GEOCODER_USER_AGENT");

        Ok(Self {
            submission_url,
            classifier_url,
            nominatim_url,
            geocoder_user_agent,
        })
    }
}

fn parse_url(var: &'static str, value: &str) -> Result<Url> {
    Url::parse(value.trim()).map_err(|source| CliError::InvalidUrl { var, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.submission_url.as_str(), DEFAULT_SUBMISSION_URL);
        assert!(config.classifier_url.is_none());
        assert!(config.nominatim_url.is_none());
        assert!(config.geocoder_user_agent.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("SUBMISSION_URL", "https://reports.example.org/api/reports"),
            ("CLASSIFIER_URL", "http://classifier:8000"),
            ("NOMINATIM_URL", "http://nominatim:8080"),
            ("GEOCODER_USER_AGENT", "biratnagar-intake/1.0"),
        ])
        .unwrap();
        assert_eq!(config.submission_url.host_str(), Some("reports.example.org"));
        assert_eq!(
            config.classifier_url.as_ref().and_then(Url::port),
            Some(8000)
        );
        assert!(config.nominatim_url.is_some());
        assert_eq!(
            config.geocoder_user_agent.as_deref(),
            Some("biratnagar-intake/1.0")
        );
    }

    #[test]
    fn test_blank_optional_is_unset() {
        let config = config(&[("CLASSIFIER_URL", "  ")]).unwrap();
        assert!(config.classifier_url.is_none());
    }

    #[test]
    fn test_invalid_url_names_variable() {
        let err = config(&[("CLASSIFIER_URL", "not a url")]).unwrap_err();
        assert!(err.to_string().starts_with("CLASSIFIER_URL is not a valid URL"));
    }
}
