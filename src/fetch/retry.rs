use std::time::Duration;

use tokio::time;
use tracing::debug;

use crate::error::FetchError;
use crate::fetch::FetchClient;
use crate::types::{CommitRecord, CommitRef};

/// Bounded retry with linearly increasing delay for transient failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 means a single attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retrying after the given zero-based failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * (attempt + 1)
    }
}

/// Fetch one commit's detail, retrying transient failures up to the policy
/// bound. Each individual attempt is capped by `per_call_timeout` so one slow
/// commit cannot stall unrelated fetches. Permanent failures (not-found)
/// return immediately.
pub async fn fetch_with_retry<C: FetchClient + ?Sized>(
    client: &C,
    commit: &CommitRef,
    policy: &RetryPolicy,
    per_call_timeout: Duration,
) -> std::result::Result<CommitRecord, FetchError> {
    let mut attempt = 0;
    loop {
        let outcome = match time::timeout(per_call_timeout, client.fetch_detail(commit)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(per_call_timeout)),
        };

        match outcome {
            Ok(record) => return Ok(record),
            Err(err) if err.is_transient() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                debug!(id = %commit.id, attempt, ?delay, error = %err, "retrying detail fetch");
                time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn delay_increases_with_attempts() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(300));
    }
}
