// Transport retry policy
//
// Renaming prompts are large and the oracle endpoint sheds load under
// pressure, so transient failures are retried with exponential backoff
// before a transport error is allowed to abort the run.

use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Run an oracle request, retrying transient failures with backoff
pub async fn with_retry<F, Fut, T>(request: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut backoff = Duration::from_millis(INITIAL_BACKOFF_MS);

    for attempt in 1..=MAX_ATTEMPTS {
        match request().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < MAX_ATTEMPTS => {
                tracing::warn!(
                    "Oracle request failed (attempt {}/{}), retrying in {:?}: {:#}",
                    attempt,
                    MAX_ATTEMPTS,
                    backoff,
                    e
                );
                sleep(backoff).await;
                backoff *= 2;
            }
            Err(e) => return Err(e),
        }
    }

    unreachable!("retry loop returns on the final attempt")
}
