//! Retry policy for provider calls
//!
//! The policy is a plain value - {max attempts, base delay, backoff
//! multiplier} - injected where it is used and executed with a caller-
//! supplied sleeper, so schedules are unit-testable without a real clock.
//! Transient failures retry with exponential backoff; non-transient
//! failures surface immediately.

use std::time::Duration;
use tracing::warn;

/// Exponential-backoff retry policy
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1)
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            backoff_multiplier: 2.0,
        }
    }
}

/// Outcome of a failed retried operation
#[derive(Debug, Clone, PartialEq)]
pub struct RetryFailure<E> {
    /// The last underlying error observed
    pub error: E,
    /// Attempts actually made before giving up
    pub attempts: u32,
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    /// Delay before attempt `attempt + 1`, given 1-based failed `attempt`
    ///
    /// `delay_for(1)` is the base delay; each further attempt multiplies it.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        self.base_delay.mul_f64(factor.max(0.0))
    }

    /// Run `call` under this policy, sleeping via `sleep` between attempts
    ///
    /// Retries only while `is_transient` holds for the observed error.
    /// `op` labels tracing output.
    pub fn run<T, E: std::fmt::Display>(
        &self,
        op: &str,
        mut sleep: impl FnMut(Duration),
        mut call: impl FnMut() -> Result<T, E>,
        is_transient: impl Fn(&E) -> bool,
    ) -> Result<T, RetryFailure<E>> {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match call() {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if !is_transient(&error) || attempt >= max_attempts {
                        return Err(RetryFailure { error, attempts: attempt });
                    }
                    let delay = self.delay_for(attempt);
                    warn!(
                        target: "reco::retry",
                        op,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "transient failure, backing off"
                    );
                    sleep(delay);
                }
            }
        }
    }

    /// Like [`run`](Self::run), sleeping on the current thread
    pub fn run_blocking<T, E: std::fmt::Display>(
        &self,
        op: &str,
        call: impl FnMut() -> Result<T, E>,
        is_transient: impl Fn(&E) -> bool,
    ) -> Result<T, RetryFailure<E>> {
        self.run(op, std::thread::sleep, call, is_transient)
    }
}
