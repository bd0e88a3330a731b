//! Bounded polling of remote state

use std::{future::Future, time::Duration};

use snafu::{Snafu, ensure};
use strum::{EnumDiscriminants, IntoStaticStr};
use tokio::time::Instant;

#[derive(Snafu, Debug, EnumDiscriminants)]
#[strum_discriminants(derive(IntoStaticStr))]
pub enum Error {
    #[snafu(display("timed out after {timeout:?} waiting for {description}"))]
    Timeout {
        description: String,
        timeout: Duration,
    },
}

type Result<T, E = Error> = std::result::Result<T, E>;

/// Polls until `poll` yields a value or the timeout expires
///
/// `poll` returns `Ok(Some(value))` when done and `Ok(None)` to keep waiting. Errors are logged
/// and the polling continues, because the remote APIs are expected to fail transiently.
pub async fn wait_for<T, E, F, Fut>(
    description: &str,
    timeout: Duration,
    poll_interval: Duration,
    mut poll: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<Option<T>, E>>,
    E: std::error::Error + 'static,
{
    let deadline = Instant::now() + timeout;

    loop {
        match poll().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => tracing::debug!(description, "Not there yet"),
            Err(error) => {
                tracing::warn!(
                    error = &error as &dyn std::error::Error,
                    description,
                    "Polling failed, retrying"
                );
            }
        }

        ensure!(
            Instant::now() < deadline,
            TimeoutSnafu {
                description,
                timeout
            }
        );
        tokio::time::sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use super::{ErrorDiscriminants, wait_for};

    #[derive(Debug)]
    struct TransientError;

    impl std::fmt::Display for TransientError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("transient")
        }
    }

    impl std::error::Error for TransientError {}

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_ready() {
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        let result = wait_for(
            "the third call",
            Duration::from_secs(10),
            Duration::from_secs(1),
            move || async move {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 => Err(TransientError),
                    1 => Ok(None),
                    call => Ok(Some(call)),
                }
            },
        )
        .await;

        assert_eq!(Ok(2), result.map_err(ErrorDiscriminants::from));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let result = wait_for(
            "something which never happens",
            Duration::from_secs(5),
            Duration::from_secs(1),
            || async { Ok::<Option<()>, TransientError>(None) },
        )
        .await;

        let error = result.expect_err("should time out");
        assert_eq!(
            "timed out after 5s waiting for something which never happens",
            error.to_string()
        );
    }
}
