use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures::future::{select, Either};
use futures::pin_mut;

/// Returned by [`with_timeout`] when the deadline elapses first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeoutError {
    pub elapsed: Duration,
}

impl fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation timed out after {:?}", self.elapsed)
    }
}

impl std::error::Error for TimeoutError {}

/// Asynchronously waits for the provided duration in a platform-compatible way.
pub async fn sleep(duration: Duration) {
    if duration.is_zero() {
        return;
    }

    sleep_impl(duration).await;
}

/// Races `future` against a timer. The future is dropped if the timer wins.
pub async fn with_timeout<F>(future: F, duration: Duration) -> Result<F::Output, TimeoutError>
where
    F: Future,
{
    let timer = sleep(duration);
    pin_mut!(future);
    pin_mut!(timer);

    match select(future, timer).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(((), _)) => Err(TimeoutError { elapsed: duration }),
    }
}

#[cfg(target_arch = "wasm32")]
async fn sleep_impl(duration: Duration) {
    use gloo_timers::future::sleep;
    sleep(duration).await;
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep_impl(duration: Duration) {
    use tokio::time::sleep;
    sleep(duration).await;
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[tokio::test(flavor = "current_thread")]
    async fn completes_before_deadline() {
        let result = with_timeout(async { 42 }, Duration::from_millis(50)).await;
        assert_eq!(result, Ok(42));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn times_out_pending_future() {
        let err = with_timeout(futures::future::pending::<()>(), Duration::from_millis(10))
            .await
            .unwrap_err();
        assert_eq!(err.elapsed, Duration::from_millis(10));
    }
}
