use std::future::Future;
use std::time::{Duration, Instant};

use eyre::Result;
use log::{debug, warn};

/// Polls `check` until it reports `Ok(true)` or `max_wait` elapses.
///
/// Errors returned by `check` are logged and polling continues.
///
/// # Returns
/// * `Ok(true)` - Condition was met within `max_wait`
/// * `Ok(false)` - `max_wait` elapsed first
pub async fn poll_until<F, Fut>(
    check: F,
    max_wait: Duration,
    poll_interval: Duration,
    operation_name: &str,
) -> Result<bool>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();

    loop {
        match check().await {
            Ok(true) => {
                debug!("{} completed after {:?}", operation_name, start.elapsed());
                return Ok(true);
            }
            Ok(false) => {}
            Err(e) => {
                warn!("Error checking {} status while waiting: {}", operation_name, e);
            }
        }

        let elapsed = start.elapsed();
        if elapsed >= max_wait {
            warn!(
                "Timed out after {:?} waiting for {}",
                elapsed, operation_name
            );
            return Ok(false);
        }

        tokio::time::sleep(poll_interval.min(max_wait - elapsed)).await;
    }
}
