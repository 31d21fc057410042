//! Request guards: basic auth for the static site, per-IP rate limits for
//! the write endpoints that can be abused.

pub mod basic;
pub mod rate_limit;

pub use basic::{BasicCredentials, basic_auth};
pub use rate_limit::RateLimiter;
