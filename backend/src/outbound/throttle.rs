//! GCRA rate limiter backed by `governor`.
//!
//! One keyed governor limiter exists per configured [`ThrottleRate`]; keys
//! name the throttle scope and the caller. A rate of `n/period` becomes a
//! quota replenishing one cell every `period / n` with a burst of `n`.
//! Keys that have fully replenished are evicted every [`PRUNE_EVERY`]
//! checks so idle peers do not accumulate.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::keyed::DashMapStateStore;
use governor::{Quota, RateLimiter as Governor};
use tracing::debug;

use crate::domain::ThrottleRate;
use crate::domain::ports::{RateLimiter, RateLimiterError, ThrottleDecision};

/// Checks between sweeps of idle keys.
pub const PRUNE_EVERY: u64 = 1_024;

type KeyedGovernor<C> =
    Governor<String, DashMapStateStore<String>, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Governor quota equivalent to `rate`.
fn quota_for(rate: ThrottleRate) -> Option<Quota> {
    let burst = NonZeroU32::new(rate.requests())?;
    let interval = rate.period().checked_div(rate.requests())?;
    Quota::with_period(interval).map(|quota| quota.allow_burst(burst))
}

/// Keyed limiter set, one governor per distinct rate.
pub struct GovernorRateLimiter<C: Clock = DefaultClock> {
    clock: C,
    limiters: Mutex<HashMap<ThrottleRate, Arc<KeyedGovernor<C>>>>,
    checks: AtomicU64,
}

impl GovernorRateLimiter<DefaultClock> {
    /// Limiter on the monotonic system clock.
    pub fn new() -> Self {
        Self::with_clock(DefaultClock::default())
    }
}

impl Default for GovernorRateLimiter<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> GovernorRateLimiter<C> {
    /// Limiter reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            limiters: Mutex::new(HashMap::new()),
            checks: AtomicU64::new(0),
        }
    }

    fn limiter_for(&self, rate: ThrottleRate) -> Result<Arc<KeyedGovernor<C>>, RateLimiterError> {
        let mut limiters = self
            .limiters
            .lock()
            .map_err(|_| RateLimiterError::backend("limiter table lock poisoned"))?;
        if let Some(limiter) = limiters.get(&rate) {
            return Ok(Arc::clone(limiter));
        }
        let quota = quota_for(rate)
            .ok_or_else(|| RateLimiterError::backend(format!("rate {rate} has no usable quota")))?;
        let limiter = Arc::new(KeyedGovernor::dashmap_with_clock(quota, &self.clock));
        limiters.insert(rate, Arc::clone(&limiter));
        Ok(limiter)
    }

    /// Drop keys whose quota has fully replenished.
    pub fn retain_recent(&self) -> Result<(), RateLimiterError> {
        let limiters = self
            .limiters
            .lock()
            .map_err(|_| RateLimiterError::backend("limiter table lock poisoned"))?;
        for limiter in limiters.values() {
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
        debug!(tracked = limiters.values().map(|l| l.len()).sum::<usize>(), "throttle keys pruned");
        Ok(())
    }

    /// Keys currently holding limiter state.
    pub fn tracked_keys(&self) -> Result<usize, RateLimiterError> {
        let limiters = self
            .limiters
            .lock()
            .map_err(|_| RateLimiterError::backend("limiter table lock poisoned"))?;
        Ok(limiters.values().map(|limiter| limiter.len()).sum())
    }

    fn prune_periodically(&self) -> Result<(), RateLimiterError> {
        if self.checks.fetch_add(1, Ordering::Relaxed).saturating_add(1) < PRUNE_EVERY {
            return Ok(());
        }
        self.checks.store(0, Ordering::Relaxed);
        self.retain_recent()
    }
}

#[async_trait]
impl<C> RateLimiter for GovernorRateLimiter<C>
where
    C: Clock + Send + Sync + 'static,
    C::Instant: Send + Sync,
{
    async fn throttle(
        &self,
        key: &str,
        rate: ThrottleRate,
    ) -> Result<ThrottleDecision, RateLimiterError> {
        let limiter = self.limiter_for(rate)?;
        let decision = match limiter.check_key(&key.to_owned()) {
            Ok(_) => ThrottleDecision::Allow,
            Err(not_until) => ThrottleDecision::Deny {
                retry_after: not_until.wait_time_from(self.clock.now()),
            },
        };
        self.prune_periodically()?;
        Ok(decision)
    }
}
