/// Classification for retry policy.
///
/// Used by the retry engine to decide what to do after a failed attempt.
///
/// # Behavior Summary
///
/// | Class | Retry? | Delay |
/// |-------|--------|-------|
/// | `Retriable` | Yes, while attempts and budget remain | Exponential backoff |
/// | `RateLimited` | Yes, while attempts and budget remain | Larger of `Retry-After` and backoff |
/// | `NonRetriable` | No | - |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Transient failure: timeouts, connection failures and resets, 5xx responses.
    Retriable,

    /// The request or the answer is wrong and will stay wrong.
    /// 4xx (except 429), malformed payloads, invalid rates, unsupported pairs.
    NonRetriable,

    /// The service asked us to slow down (HTTP 429).
    RateLimited,
}

impl RetryClass {
    pub fn is_retriable(&self) -> bool {
        !matches!(self, Self::NonRetriable)
    }
}
