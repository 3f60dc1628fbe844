//! Bounded retry with a global failure ceiling
//!
//! Every remote call runs through [`RetryController::run`]:
//!
//! ```text
//! Attempting --ok--> Success
//!     |
//!   error, attempts < max --> RetryPending --backoff--> Attempting
//!     |
//!   error, attempts == max --> Exhausted
//! ```
//!
//! An exhausted call is recoverable: the caller moves on to the next page or
//! URL. Each exhaustion also counts against the run-wide ceiling, and once
//! that ceiling is exceeded every further call fails with
//! [`ScraperError::FailureCeiling`].

use crate::config::CrawlerConfig;
use crate::ScraperError;
use std::future::Future;
use std::time::Duration;

/// Read-only retry policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryBudget {
    /// Attempts per call, including the first one
    pub max_attempts_per_call: u32,
    /// Wait between two attempts of the same call
    pub backoff_delay: Duration,
    /// Exhausted calls tolerated before the run is aborted
    pub global_failure_ceiling: u32,
}

impl RetryBudget {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_attempts_per_call: config.max_attempts.max(1),
            backoff_delay: config.backoff(),
            global_failure_ceiling: config.failure_ceiling,
        }
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Where a single call currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// Attempt `n` (1-based) is in flight
    Attempting(u32),
    /// Attempt `n` failed and the backoff is running
    RetryPending(u32),
    Success,
    Exhausted,
}

/// Drives calls through the retry state machine and tracks exhaustions
#[derive(Debug)]
pub struct RetryController {
    budget: RetryBudget,
    global_failures: u32,
    last_state: Option<CallState>,
}

impl RetryController {
    pub fn new(budget: RetryBudget) -> Self {
        Self {
            budget,
            global_failures: 0,
            last_state: None,
        }
    }

    /// Number of calls that exhausted their attempts so far
    pub fn global_failures(&self) -> u32 {
        self.global_failures
    }

    /// Last state the most recent call reached
    pub fn last_state(&self) -> Option<CallState> {
        self.last_state
    }

    pub fn ceiling_exceeded(&self) -> bool {
        self.global_failures > self.budget.global_failure_ceiling
    }

    fn ceiling_error(&self) -> ScraperError {
        ScraperError::FailureCeiling {
            failures: self.global_failures,
            ceiling: self.budget.global_failure_ceiling,
        }
    }

    /// Runs `op` until it succeeds or its attempts are used up
    ///
    /// Errors that cannot succeed on a second try exhaust the call at once.
    /// Fatal errors are passed through untouched and do not count.
    pub async fn run<T, F, Fut>(&mut self, label: &str, mut op: F) -> Result<T, ScraperError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScraperError>>,
    {
        if self.ceiling_exceeded() {
            return Err(self.ceiling_error());
        }

        let max_attempts = self.budget.max_attempts_per_call;
        let mut attempt = 1;

        loop {
            self.last_state = Some(CallState::Attempting(attempt));
            match op().await {
                Ok(value) => {
                    self.last_state = Some(CallState::Success);
                    return Ok(value);
                }
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) if error.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(
                        "Error fetching {} (Attempt {}/{}): {}",
                        label,
                        attempt,
                        max_attempts,
                        error
                    );
                    self.last_state = Some(CallState::RetryPending(attempt));
                    tracing::debug!("Retrying {} in {:?}", label, self.budget.backoff_delay);
                    if !self.budget.backoff_delay.is_zero() {
                        tokio::time::sleep(self.budget.backoff_delay).await;
                    }
                    attempt += 1;
                }
                Err(error) => return Err(self.exhaust(label, attempt, error)),
            }
        }
    }

    fn exhaust(&mut self, label: &str, attempts: u32, error: ScraperError) -> ScraperError {
        self.last_state = Some(CallState::Exhausted);
        self.global_failures += 1;
        tracing::warn!(
            "Maximum retries reached for {} after {} attempts, moving on",
            label,
            attempts
        );

        if self.ceiling_exceeded() {
            tracing::error!(
                "Too many failed calls ({} > {}), stopping",
                self.global_failures,
                self.budget.global_failure_ceiling
            );
            return self.ceiling_error();
        }

        ScraperError::Exhausted {
            label: label.to_string(),
            attempts,
            source: Box::new(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn budget(max_attempts: u32, ceiling: u32) -> RetryBudget {
        RetryBudget {
            max_attempts_per_call: max_attempts,
            backoff_delay: Duration::ZERO,
            global_failure_ceiling: ceiling,
        }
    }

    fn timeout() -> ScraperError {
        ScraperError::Timeout {
            url: "https://example.com/x".to_string(),
        }
    }

    #[tokio::test]
    async fn test_always_failing_call_is_attempted_max_times() {
        let mut controller = RetryController::new(budget(3, 10));
        let calls = Cell::new(0);

        let result: Result<(), _> = controller
            .run("page 1", || {
                calls.set(calls.get() + 1);
                async { Err(timeout()) }
            })
            .await;

        assert_eq!(calls.get(), 3);
        assert!(matches!(
            result,
            Err(ScraperError::Exhausted { attempts: 3, .. })
        ));
        assert_eq!(controller.last_state(), Some(CallState::Exhausted));
        assert_eq!(controller.global_failures(), 1);
    }

    #[tokio::test]
    async fn test_success_after_retry() {
        let mut controller = RetryController::new(budget(3, 10));
        let calls = Cell::new(0);

        let result = controller
            .run("page 1", || {
                calls.set(calls.get() + 1);
                let attempt = calls.get();
                async move {
                    if attempt < 2 {
                        Err(timeout())
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(controller.last_state(), Some(CallState::Success));
        assert_eq!(controller.global_failures(), 0);
    }

    #[tokio::test]
    async fn test_single_attempt_budget() {
        let mut controller = RetryController::new(budget(1, 10));
        let calls = Cell::new(0);

        let ok = controller
            .run("page 1", || {
                calls.set(calls.get() + 1);
                async { Ok(7) }
            })
            .await;
        assert_eq!(ok.unwrap(), 7);
        assert_eq!(controller.last_state(), Some(CallState::Success));

        let failed: Result<(), _> = controller
            .run("page 2", || {
                calls.set(calls.get() + 1);
                async { Err(timeout()) }
            })
            .await;
        assert!(matches!(failed, Err(ScraperError::Exhausted { attempts: 1, .. })));
        assert_eq!(controller.last_state(), Some(CallState::Exhausted));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_error_exhausts_immediately() {
        let mut controller = RetryController::new(budget(3, 10));
        let calls = Cell::new(0);

        let result: Result<(), _> = controller
            .run("bad url", || {
                calls.set(calls.get() + 1);
                async { Err(ScraperError::UnknownCategory("x".to_string())) }
            })
            .await;

        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(ScraperError::Exhausted { attempts: 1, .. })));
    }

    #[tokio::test]
    async fn test_ceiling_exceeded_is_fatal() {
        let mut controller = RetryController::new(budget(1, 1));

        let first: Result<(), _> = controller.run("a", || async { Err(timeout()) }).await;
        assert!(matches!(first, Err(ScraperError::Exhausted { .. })));

        let second: Result<(), _> = controller.run("b", || async { Err(timeout()) }).await;
        let second = second.unwrap_err();
        assert!(matches!(
            second,
            ScraperError::FailureCeiling {
                failures: 2,
                ceiling: 1
            }
        ));
        assert!(second.is_fatal());

        // No further calls are issued once the ceiling is exceeded
        let calls = Cell::new(0);
        let third: Result<(), _> = controller
            .run("c", || {
                calls.set(calls.get() + 1);
                async { Ok(()) }
            })
            .await;
        assert_eq!(calls.get(), 0);
        assert!(matches!(third, Err(ScraperError::FailureCeiling { .. })));
    }

    #[test]
    fn test_budget_from_config() {
        let budget = RetryBudget::from_config(&CrawlerConfig::default());
        assert_eq!(budget.max_attempts_per_call, 3);
        assert_eq!(budget.backoff_delay, Duration::from_secs(5));
        assert_eq!(budget.global_failure_ceiling, 10);
    }
}
