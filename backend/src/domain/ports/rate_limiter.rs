//! Driven port for request throttling.
//!
//! The limiter owns per-key request history. Keys are built by the access
//! gate from the throttle scope and the caller identity.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ThrottleRate;

use super::define_port_error;

define_port_error! {
    /// Errors raised by rate limiters.
    pub enum RateLimiterError {
        /// Limiter state could not be read or updated.
        Backend { message: String } =>
            "rate limiter failed: {message}",
    }
}

/// Outcome of one throttle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// The request was admitted and recorded.
    Allow,
    /// The request exceeds the rate; retry after the given delay.
    Deny {
        /// Delay until the next request would be admitted.
        retry_after: Duration,
    },
}

/// Port for counting requests against a rate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Admit or refuse one request for `key` under `rate`. Admitted
    /// requests count towards later decisions; refused ones do not.
    async fn throttle(
        &self,
        key: &str,
        rate: ThrottleRate,
    ) -> Result<ThrottleDecision, RateLimiterError>;
}

/// Limiter that admits everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRateLimiter;

#[async_trait]
impl RateLimiter for FixtureRateLimiter {
    async fn throttle(
        &self,
        _key: &str,
        _rate: ThrottleRate,
    ) -> Result<ThrottleDecision, RateLimiterError> {
        Ok(ThrottleDecision::Allow)
    }
}
