use std::time::Duration;

/// Limits and timing for retrying one logical quote lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Maximum source attempts per lookup, including the first call.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound for the exponential delay (before jitter).
    pub max_backoff: Duration,
    /// Additive jitter as a fraction of the base delay, in `[0, 1)`.
    pub jitter_ratio: f64,
    /// Total budget for all attempts and sleeps.
    pub max_elapsed: Duration,
    /// Deadline for a single attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(5),
            jitter_ratio: 0.2,
            max_elapsed: Duration::from_secs(15),
            attempt_timeout: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn effective_max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Base delay before retry `retry` (1-based): `initial * 2^(retry-1)`,
    /// capped at `max_backoff`.
    pub fn base_delay(&self, retry: u32) -> Duration {
        let exponent = 2_u32.saturating_pow(retry.saturating_sub(1));
        let base_ms = u64::try_from(self.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
    }

    /// Deadline for the next attempt given what is left of the budget.
    pub fn attempt_deadline(&self, elapsed: Duration) -> Duration {
        self.attempt_timeout
            .min(self.max_elapsed.saturating_sub(elapsed))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if !(0.0..1.0).contains(&self.jitter_ratio) {
            return Err(format!(
                "jitter_ratio must be in [0, 1), got {}",
                self.jitter_ratio
            ));
        }
        if self.initial_backoff > self.max_backoff {
            return Err("initial_backoff must not exceed max_backoff".to_string());
        }
        if self.attempt_timeout.is_zero() || self.max_elapsed.is_zero() {
            return Err("attempt_timeout and max_elapsed must be positive".to_string());
        }
        Ok(())
    }
}
