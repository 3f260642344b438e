use std::fmt;
use std::path::PathBuf;

use civic_intake::IntakeError;

#[derive(Debug)]
pub enum CliError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    InvalidUrl {
        var: &'static str,
        source: url::ParseError,
    },
    LogFilter(tracing_subscriber::filter::ParseError),
    Intake(IntakeError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "Cannot read {}: {}", path.display(), source),
            Self::InvalidUrl { var, source } => write!(f, "{} is not a valid URL: {}", var, source),
            Self::LogFilter(e) => write!(f, "Invalid log filter: {}", e),
            Self::Intake(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidUrl { source, .. } => Some(source),
            Self::LogFilter(e) => Some(e),
            Self::Intake(e) => Some(e),
        }
    }
}

impl From<IntakeError> for CliError {
    fn from(err: IntakeError) -> Self {
        Self::Intake(err)
    }
}

impl From<tracing_subscriber::filter::ParseError> for CliError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        Self::LogFilter(err)
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
