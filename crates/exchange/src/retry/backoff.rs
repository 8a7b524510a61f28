//! Retry state machine for one logical lookup.
//!
//! ```text
//! begin_attempt -> (attempt fails) -> on_failure -> Retry { delay } -> sleep -> begin_attempt
//!                                               \-> Stop(reason)
//! ```

use std::time::Duration;

use super::policy::RetryPolicy;
use super::runtime::Jitter;
use crate::errors::RetryClass;

/// State of the current attempt. Lives for one lookup only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RetryAttempt {
    /// 1-based number of the attempt in progress (0 before the first).
    pub number: u32,
    /// Offset from the start of the lookup at which the next attempt may run.
    pub next_eligible_after: Option<Duration>,
    /// Classification of the most recent failure.
    pub last_class: Option<RetryClass>,
}

/// Why the engine stopped retrying.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StopReason {
    /// The failure will not go away by retrying.
    NonRetriable,
    /// All allowed attempts were used.
    AttemptsExhausted,
    /// Waiting for the next attempt would overrun the elapsed budget.
    BudgetExhausted,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RetryDecision {
    Retry { delay: Duration },
    Stop(StopReason),
}

pub struct Backoff<'a> {
    policy: &'a RetryPolicy,
    jitter: &'a dyn Jitter,
    attempt: RetryAttempt,
}

impl<'a> Backoff<'a> {
    pub fn new(policy: &'a RetryPolicy, jitter: &'a dyn Jitter) -> Self {
        Self {
            policy,
            jitter,
            attempt: RetryAttempt::default(),
        }
    }

    pub fn attempt(&self) -> &RetryAttempt {
        &self.attempt
    }

    /// Marks the start of the next attempt and returns its number.
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempt.number += 1;
        self.attempt.next_eligible_after = None;
        self.attempt.number
    }

    /// Decides what follows a failed attempt.
    ///
    /// `elapsed` is the time spent on the lookup so far. For rate-limited
    /// failures the delay is the larger of `retry_after` and the backoff.
    pub fn on_failure(
        &mut self,
        class: RetryClass,
        retry_after: Option<Duration>,
        elapsed: Duration,
    ) -> RetryDecision {
        self.attempt.last_class = Some(class);

        if class == RetryClass::NonRetriable {
            return RetryDecision::Stop(StopReason::NonRetriable);
        }
        if self.attempt.number >= self.policy.effective_max_attempts() {
            return RetryDecision::Stop(StopReason::AttemptsExhausted);
        }

        let base = self.policy.base_delay(self.attempt.number);
        let mut delay = self.jitter.jittered_delay(base, self.policy.jitter_ratio);
        if class == RetryClass::RateLimited {
            if let Some(server_delay) = retry_after {
                delay = delay.max(server_delay);
            }
        }

        let resume_at = elapsed.saturating_add(delay);
        if resume_at > self.policy.max_elapsed {
            return RetryDecision::Stop(StopReason::BudgetExhausted);
        }

        self.attempt.next_eligible_after = Some(resume_at);
        RetryDecision::Retry { delay }
    }
}
