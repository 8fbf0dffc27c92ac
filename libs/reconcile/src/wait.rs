//! Polling until a cloud resource has settled.

use std::future::Future;

use tracing::debug;

use crate::context::RequestContext;
use crate::state::Settling;
use crate::{PollConfig, WaitError};

/// Poll `fetch` until the resource it returns is no longer busy.
///
/// `fetch` reports `Ok(Some(resource))` for a resource it found,
/// `Ok(None)` if the resource does not exist, or an error for any other
/// failure. The loop ends when:
/// - the resource is gone (`Ok(None)`, a vanished resource is not pending),
/// - the resource reports a non-busy state (`Ok(Some(resource))`),
/// - `fetch` fails (the error is returned without retrying),
/// - `config.max_retries` polls all reported busy (`WaitError::Exhausted`),
/// - the request is cancelled or times out (`WaitError::Canceled`).
///
/// Consecutive polls are separated by `config.interval`.
pub async fn wait_until_settled<T, E, F, Fut>(
    ctx: &RequestContext,
    config: &PollConfig,
    resource: &'static str,
    mut fetch: F,
) -> Result<Option<T>, WaitError<E>>
where
    T: Settling,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let max_polls = config.max_retries.max(1);
    let mut polls = 0;

    loop {
        if ctx.is_done() {
            return Err(WaitError::Canceled { resource });
        }

        polls += 1;

        let current = match fetch().await.map_err(WaitError::Access)? {
            None => {
                debug!(resource, polls, "Resource no longer exists, treating as settled");
                return Ok(None);
            }
            Some(current) => current,
        };

        if !current.state().is_busy() {
            debug!(resource, polls, state = %current.state(), "Resource settled");
            return Ok(Some(current));
        }

        if polls >= max_polls {
            return Err(WaitError::Exhausted { resource, polls });
        }

        debug!(
            resource,
            polls,
            interval = ?config.interval,
            "Resource busy, polling again"
        );

        tokio::select! {
            _ = ctx.done() => return Err(WaitError::Canceled { resource }),
            _ = tokio::time::sleep(config.interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::ResourceState;

    #[derive(Debug)]
    struct Probe(ResourceState);

    impl Settling for Probe {
        fn state(&self) -> &ResourceState {
            &self.0
        }
    }

    fn config(max_retries: u32) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(15),
            max_retries,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_busy_exhausts_after_max_retries() {
        let ctx = RequestContext::new();
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let started = Instant::now();

        let result: Result<Option<Probe>, WaitError<String>> =
            wait_until_settled(&ctx, &config(5), "server", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Some(Probe(ResourceState::Busy)))
            })
            .await;

        match result {
            Err(WaitError::Exhausted { resource, polls }) => {
                assert_eq!(resource, "server");
                assert_eq!(polls, 5);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(started.elapsed(), Duration::from_secs(15 * 4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settles_on_nth_call() {
        let ctx = RequestContext::new();
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<Option<Probe>, WaitError<String>> =
            wait_until_settled(&ctx, &config(20), "volume", move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Ok(Some(Probe(ResourceState::Busy)))
                } else {
                    Ok(Some(Probe(ResourceState::Available)))
                }
            })
            .await;

        let settled = result.unwrap().unwrap();
        assert_eq!(settled.0, ResourceState::Available);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_state_is_terminal() {
        let ctx = RequestContext::new();

        let result: Result<Option<Probe>, WaitError<String>> =
            wait_until_settled(&ctx, &config(3), "NIC", || async {
                Ok(Some(Probe(ResourceState::parse("PROVISIONING_DONE"))))
            })
            .await;

        assert!(result.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_not_found_is_settled() {
        let ctx = RequestContext::new();

        let result: Result<Option<Probe>, WaitError<String>> =
            wait_until_settled(&ctx, &config(3), "server", || async { Ok(None) }).await;

        assert!(result.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_access_error_is_not_retried() {
        let ctx = RequestContext::new();
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<Option<Probe>, WaitError<String>> =
            wait_until_settled(&ctx, &config(3), "server", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("connection reset".to_string())
            })
            .await;

        assert!(matches!(result, Err(WaitError::Access(ref e)) if e == "connection reset"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_poll() {
        let ctx = RequestContext::new();
        ctx.cancel();
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<Option<Probe>, WaitError<String>> =
            wait_until_settled(&ctx, &config(3), "volume", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Some(Probe(ResourceState::Busy)))
            })
            .await;

        assert!(matches!(result, Err(WaitError::Canceled { resource: "volume" })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_interrupts_sleep() {
        let ctx = RequestContext::new().with_timeout(Duration::from_secs(20));
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let started = Instant::now();

        let result: Result<Option<Probe>, WaitError<String>> =
            wait_until_settled(&ctx, &config(20), "server", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Some(Probe(ResourceState::Busy)))
            })
            .await;

        assert!(matches!(result, Err(WaitError::Canceled { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }
}
