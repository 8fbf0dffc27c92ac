//! Settlement polling primitives.
//!
//! The cloud API accepts mutations asynchronously and only exposes their
//! progress through a `BUSY` resource state. This library provides:
//!
//! - **ResourceState**: the parsed, closed form of that state.
//! - **RequestContext**: the caller's cancellation signal and deadline.
//! - **wait_until_settled**: the polling loop shared by every resource kind.
//!
//! # Invariants
//!
//! - Only settlement is retried; failing lookups are surfaced immediately
//! - A resource that disappears counts as settled
//! - Every sleep observes the request's cancellation and deadline

use std::time::Duration;

use thiserror::Error;

mod context;
mod state;
mod wait;

pub use context::RequestContext;
pub use state::{ResourceState, Settling};
pub use wait::wait_until_settled;

/// Default time to wait between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Default number of polls before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 20;

/// Errors returned while waiting for a resource to settle.
#[derive(Debug, Error)]
pub enum WaitError<E> {
    /// Every allowed poll reported the resource as busy.
    #[error("maximum number of retries exceeded waiting for {resource} modifications ({polls} polls)")]
    Exhausted { resource: &'static str, polls: u32 },

    /// The request was cancelled or ran past its deadline.
    #[error("waiting for {resource} modifications was canceled")]
    Canceled { resource: &'static str },

    /// Looking up the resource failed.
    #[error(transparent)]
    Access(E),
}

impl<E> WaitError<E> {
    /// Returns true if the wait was cancelled by the caller.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled { .. })
    }
}

/// Polling behaviour shared by all waits of a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Interval between polls.
    pub interval: Duration,

    /// Maximum number of polls per wait.
    pub max_retries: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}
