//! Runtime seams for the retry loop: sleeping and jitter.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Async clock-independent sleeping abstraction for retries.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Retry backoff jitter abstraction.
pub trait Jitter: Send + Sync {
    /// Return the delay to wait given the exponential base delay.
    fn jittered_delay(&self, base: Duration, ratio: f64) -> Duration;
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Adds a uniformly random extra in `[0, ratio * base]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl Jitter for RandomJitter {
    fn jittered_delay(&self, base: Duration, ratio: f64) -> Duration {
        if ratio.is_nan() || ratio <= 0.0 || base.is_zero() {
            return base;
        }
        let factor = rand::thread_rng().gen_range(0.0..=ratio.min(1.0));
        base.saturating_add(base.mul_f64(factor))
    }
}

/// Returns the base delay unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn jittered_delay(&self, base: Duration, _ratio: f64) -> Duration {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_jitter_stays_in_range() {
        let base = Duration::from_millis(1000);
        for _ in 0..200 {
            let delay = RandomJitter.jittered_delay(base, 0.2);
            assert!(delay >= base);
            assert!(delay <= Duration::from_millis(1200));
        }
    }

    #[test]
    fn test_zero_ratio_is_exact() {
        let base = Duration::from_millis(750);
        assert_eq!(RandomJitter.jittered_delay(base, 0.0), base);
        assert_eq!(NoJitter.jittered_delay(base, 0.5), base);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_sleeper_advances_virtual_time() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(2)).await;
        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
