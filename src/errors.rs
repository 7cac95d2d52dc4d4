// src/errors.rs
use thiserror::Error;

use crate::payload::FieldError;

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Prediction service responded with status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown form field '{0}'")]
    UnknownField(String),

    #[error("'{value}' is not a valid choice for {field}")]
    InvalidChoice { field: String, value: String },

    #[error("Form has {} invalid field(s)", .0.len())]
    Validation(Vec<FieldError>),
}

pub type Result<T> = std::result::Result<T, PredictError>;

/// Coarse classification of a failed prediction call, used for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request never produced a response (DNS, refused connection, reset).
    Transport,
    Timeout,
    /// The service answered with a non-2xx status.
    Status(u16),
    /// The response arrived but its body was not a prediction.
    Decode,
    /// Anything that is not a transport concern (config, validation, local IO).
    Local,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Transport => write!(f, "transport"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Status(code) => write!(f, "status {}", code),
            FailureKind::Decode => write!(f, "decode"),
            FailureKind::Local => write!(f, "local"),
        }
    }
}

impl PredictError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            PredictError::Request(e) if e.is_timeout() => FailureKind::Timeout,
            PredictError::Request(e) if e.is_decode() => FailureKind::Decode,
            PredictError::Request(_) => FailureKind::Transport,
            PredictError::ApiError { status, .. } => FailureKind::Status(*status),
            PredictError::JsonParse(_) => FailureKind::Decode,
            _ => FailureKind::Local,
        }
    }
}
