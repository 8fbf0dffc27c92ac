//! Error types for provider ID parsing and validation.

use thiserror::Error;

/// Errors that can occur when decoding a provider ID or one of its components.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The provider ID is not a parseable URI.
    #[error("provider ID given is malformed: {0}")]
    MalformedIdentity(String),

    /// The provider ID uses a scheme other than the expected one.
    #[error("provider ID given contains an unsupported URL scheme: expected '{expected}', got '{actual}'")]
    UnsupportedScheme {
        expected: &'static str,
        actual: String,
    },

    /// The provider ID path does not split into exactly two non-empty segments.
    #[error("provider ID given contains an invalid URL: {0}")]
    IncompleteIdentity(String),

    /// A component is not a well-formed unique identifier.
    #[error("{component} ID found is invalid: {reason}")]
    InvalidComponent {
        component: &'static str,
        value: String,
        reason: String,
    },
}
