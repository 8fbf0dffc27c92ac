//! Driver error taxonomy.

use std::fmt;

use ionos_mcm_cloud::ApiError;
use ionos_mcm_networking::AttachError;
use ionos_mcm_reconcile::WaitError;
use thiserror::Error;

/// Status code reported to the orchestrating host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    /// Malformed identity, malformed specification, or create on an existing machine.
    InvalidArgument,
    /// The machine does not exist.
    NotFound,
    /// Missing user data, labelling failures, polling exhaustion.
    Internal,
    /// Cloud API failures.
    Unavailable,
    /// A start or stop command was rejected.
    Aborted,
    /// The request was cancelled, or the datacenter was rejected.
    Canceled,
    /// The operation is not supported by this provider.
    Unimplemented,
}

impl Code {
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::InvalidArgument => "InvalidArgument",
            Code::NotFound => "NotFound",
            Code::Internal => "Internal",
            Code::Unavailable => "Unavailable",
            Code::Aborted => "Aborted",
            Code::Canceled => "Canceled",
            Code::Unimplemented => "Unimplemented",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by driver operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct DriverError {
    code: Code,
    message: String,
}

impl DriverError {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Code::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Code::Internal, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(Code::Unavailable, message)
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        Self::new(Code::Aborted, message)
    }

    pub fn canceled(message: impl Into<String>) -> Self {
        Self::new(Code::Canceled, message)
    }

    pub fn unimplemented(operation: &str) -> Self {
        Self::new(
            Code::Unimplemented,
            format!("{operation} is not supported by the IONOS provider"),
        )
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Maps a failed create call.
    ///
    /// A create rejected as not found means the datacenter does not exist.
    pub(crate) fn from_create(err: ApiError) -> Self {
        if err.is_not_found() {
            Self::canceled(format!("datacenter rejected: {err}"))
        } else {
            Self::unavailable(err.to_string())
        }
    }
}

impl From<WaitError<ApiError>> for DriverError {
    fn from(err: WaitError<ApiError>) -> Self {
        match err {
            WaitError::Exhausted { .. } => Self::internal(err.to_string()),
            WaitError::Canceled { .. } => Self::canceled(err.to_string()),
            WaitError::Access(err) => Self::unavailable(err.to_string()),
        }
    }
}

impl From<AttachError> for DriverError {
    fn from(err: AttachError) -> Self {
        match err {
            AttachError::Wait(err) => err.into(),
            other => Self::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_error_mapping() {
        let exhausted: DriverError = WaitError::<ApiError>::Exhausted {
            resource: "server",
            polls: 20,
        }
        .into();
        assert_eq!(exhausted.code(), Code::Internal);

        let canceled: DriverError = WaitError::<ApiError>::Canceled { resource: "volume" }.into();
        assert_eq!(canceled.code(), Code::Canceled);

        let access: DriverError =
            WaitError::Access(ApiError::Transport("connection refused".into())).into();
        assert_eq!(access.code(), Code::Unavailable);
    }

    #[test]
    fn test_unimplemented_names_the_operation() {
        let err = DriverError::unimplemented("GetVolumeIDs");
        assert_eq!(err.code(), Code::Unimplemented);
        assert_eq!(
            err.to_string(),
            "Unimplemented: GetVolumeIDs is not supported by the IONOS provider"
        );
    }

    #[test]
    fn test_attach_error_mapping() {
        let exhausted: DriverError = AttachError::PoolExhausted {
            pool_id: "pool".into(),
        }
        .into();
        assert_eq!(exhausted.code(), Code::Internal);

        let canceled: DriverError =
            AttachError::Wait(WaitError::Canceled { resource: "NIC" }).into();
        assert_eq!(canceled.code(), Code::Canceled);
    }

    #[test]
    fn test_create_rejection() {
        let err = DriverError::from_create(ApiError::NotFound("datacenter".into()));
        assert_eq!(err.code(), Code::Canceled);

        let err = DriverError::from_create(ApiError::Status {
            status: 500,
            message: "boom".into(),
        });
        assert_eq!(err.code(), Code::Unavailable);
    }

    #[test]
    fn test_display() {
        let err = DriverError::not_found("VM machine-1 does not exist");
        assert_eq!(err.to_string(), "NotFound: VM machine-1 does not exist");
    }
}
