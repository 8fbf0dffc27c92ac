//! Errors returned by the cloud API.

use thiserror::Error;

/// Errors from calls against the cloud API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The addressed resource (or its parent) does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The API rejected the request.
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// The request did not complete.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns true if the API reported the resource as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Converts lookups so that an absent resource becomes `None`.
pub trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, ApiError>;
}

impl<T> OptionalExt<T> for Result<T, ApiError> {
    fn optional(self) -> Result<Option<T>, ApiError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}
