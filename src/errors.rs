use reqwest::StatusCode;
use thiserror::Error as ThisError;
use tracing::error;

use crate::models::draft::FieldErrors;

pub type Result<T> = core::result::Result<T, Error>;

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// The three buckets a view cares about when it decides how to show a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Logic,
    Validation,
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Server answered with HTTP {0}")]
    Status(StatusCode),
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Request rejected by the server (statusCode {status_code:?})")]
    Logic {
        status_code: Option<i64>,
        message: Option<String>,
    },
    #[error("Invalid draft: {0}")]
    Validation(FieldErrors),
    #[error("A bearer token is required")]
    Unauthorized,
    #[error("Invalid page number {0}")]
    InvalidPage(u32),
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error("Session storage error: {0}")]
    Session(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Logic { .. } => ErrorKind::Logic,
            Self::Validation(_) => ErrorKind::Validation,
            _ => ErrorKind::Transport,
        }
    }

    /// Banner text for the view.
    pub fn user_message(&self) -> String {
        match self {
            Self::Logic {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Self::Validation(errors) => errors.to_string(),
            Self::Unauthorized => "Please sign in to continue.".to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        error!("Response decode error: {:?}", err);
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(FieldErrors::from(&errors))
    }
}
