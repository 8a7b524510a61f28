//! Retry/backoff engine used by the exchange client.

mod backoff;
mod policy;
mod runtime;

pub use backoff::{Backoff, RetryAttempt, RetryDecision, StopReason};
pub use policy::RetryPolicy;
pub use runtime::{Jitter, NoJitter, RandomJitter, Sleeper, TokioSleeper};
