use std::future::Future;
use std::time::Duration;

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub attempts: u32,
    /// Delay after the first failed attempt, doubled after each further one.
    pub delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: 10,
            delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// No sleeping between attempts.
    pub fn immediate(attempts: u32) -> Self {
        RetryPolicy {
            attempts,
            delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// How long to wait after the `attempt`-th (1-based) failure.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        match self.delay.checked_mul(factor) {
            Some(d) => d.min(self.max_delay),
            None => self.max_delay,
        }
    }
}

/// Run `op` until it succeeds or `policy.attempts` is reached.
///
/// Every failed attempt is logged. When the attempts are exhausted the last
/// error is returned to the caller, with `what` added as context.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy, what: &str, mut op: F,
) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if attempt >= attempts => {
                log::error!(
                    "{} failed after {} attempts: {:#}",
                    what,
                    attempts,
                    e
                );
                return Err(e.context(format!(
                    "{} failed after {} attempts",
                    what, attempts
                )));
            }
            Err(e) => {
                let delay = policy.backoff(attempt);
                log::warn!(
                    "{} failed (attempt {}/{}), retrying in {:?}: {:#}",
                    what,
                    attempt,
                    attempts,
                    delay,
                    e
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
        }
    }
}
