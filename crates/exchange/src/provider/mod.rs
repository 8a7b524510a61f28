//! Rate sources: one HTTP round trip per call, no retries.

pub mod hnb;
mod http;
pub mod json_api;
mod traits;

pub use hnb::HnbRateSource;
pub use json_api::JsonApiRateSource;
pub use traits::{RateSource, RawRate};
