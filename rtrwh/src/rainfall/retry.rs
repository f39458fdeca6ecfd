//! Retry policy for rainfall archive requests.
//!
//! The client asks the policy after every failed attempt whether (and when) to try again, so the
//! retry behaviour can change without touching the request code.

use std::{fmt, time::Duration};

use super::RainfallError;
use crate::config::RetryConfig;

pub trait RetryPolicy: fmt::Debug + Send + Sync {
    /// Delay before the next attempt, or `None` to give up.
    ///
    /// `attempts` is the number of attempts already made (1 after the first failure).
    fn next_delay(&self, attempts: u32, error: &RainfallError) -> Option<Duration>;
}

/// Retries transient failures after a constant pause, up to a total attempt budget.
#[derive(Debug, Clone)]
pub struct FixedBackoff {
    max_attempts: u32,
    backoff: Duration,
}

impl FixedBackoff {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self { max_attempts, backoff }
    }
}

impl From<&RetryConfig> for FixedBackoff {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.backoff)
    }
}

impl RetryPolicy for FixedBackoff {
    fn next_delay(&self, attempts: u32, error: &RainfallError) -> Option<Duration> {
        (attempts < self.max_attempts && error.is_transient()).then_some(self.backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn status(code: StatusCode) -> RainfallError {
        RainfallError::Status { status: code }
    }

    #[test]
    fn test_single_attempt_never_retries() {
        let policy = FixedBackoff::from(&RetryConfig::default());

        assert_eq!(policy.next_delay(1, &RainfallError::Timeout), None);
        assert_eq!(policy.next_delay(1, &status(StatusCode::SERVICE_UNAVAILABLE)), None);
    }

    #[test]
    fn test_transient_errors_retry_until_budget_spent() {
        let policy = FixedBackoff::new(3, Duration::from_millis(250));

        assert_eq!(policy.next_delay(1, &RainfallError::Timeout), Some(Duration::from_millis(250)));
        assert_eq!(policy.next_delay(2, &status(StatusCode::BAD_GATEWAY)), Some(Duration::from_millis(250)));
        assert_eq!(policy.next_delay(2, &status(StatusCode::TOO_MANY_REQUESTS)), Some(Duration::from_millis(250)));
        assert_eq!(policy.next_delay(3, &RainfallError::Timeout), None);
    }

    #[test]
    fn test_client_errors_are_not_retried() {
        let policy = FixedBackoff::new(5, Duration::from_millis(10));

        assert_eq!(policy.next_delay(1, &status(StatusCode::BAD_REQUEST)), None);
        assert_eq!(policy.next_delay(1, &status(StatusCode::NOT_FOUND)), None);
    }
}
