//! Access control chain run before every endpoint handler.
//!
//! Each endpoint declares an [`AccessPolicy`]: the capabilities a caller
//! must hold and the throttles that apply. [`AccessGate::admit`] evaluates
//! the chain in a fixed order (authentication, then capabilities in
//! declaration order, then throttles in declaration order) and stops at the
//! first denial.

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

use super::auth::{AuthToken, INSTRUCTORS_GROUP, Principal};
use super::error::Error;
use super::ports::{
    Authenticator, AuthenticatorError, RateLimiter, RateLimiterError, ThrottleDecision,
};

/// Requirement a caller must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Always satisfied.
    Anonymous,
    /// A valid token was presented.
    Authenticated,
    /// The authenticated caller belongs to the named group.
    Group(&'static str),
}

/// Rate-limit rule bound to an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottlePolicy {
    /// Applies to anonymous callers only, keyed by peer address.
    Anonymous,
    /// Applies to every caller, keyed by username or peer address.
    User,
    /// Applies to every caller under a configured named rate.
    Named(&'static str),
}

impl ThrottlePolicy {
    fn scope(self) -> &'static str {
        match self {
            Self::Anonymous => "anon",
            Self::User => "user",
            Self::Named(name) => name,
        }
    }
}

/// Error raised when a rate string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rate `{raw}` must look like `<requests>/<second|minute|hour|day>`")]
pub struct ThrottleRateParseError {
    raw: String,
}

/// Number of requests admitted per period.
///
/// Parsed from `"<n>/<period>"`; only the first letter of the period is
/// significant, so `10/min` and `10/minute` are equal.
///
/// # Examples
/// ```
/// use course_catalogue::domain::ThrottleRate;
/// use std::time::Duration;
///
/// let rate: ThrottleRate = "10/minute".parse().unwrap();
/// assert_eq!(rate.requests(), 10);
/// assert_eq!(rate.period(), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThrottleRate {
    requests: NonZeroU32,
    period: Duration,
}

impl ThrottleRate {
    /// `requests` admitted per `period`.
    pub const fn new(requests: NonZeroU32, period: Duration) -> Self {
        Self { requests, period }
    }

    /// Requests admitted per period.
    pub const fn requests(&self) -> u32 {
        self.requests.get()
    }

    /// Window the requests are spread over.
    pub const fn period(&self) -> Duration {
        self.period
    }

    const fn per_minute(requests: NonZeroU32) -> Self {
        Self::new(requests, Duration::from_secs(60))
    }
}

impl FromStr for ThrottleRate {
    type Err = ThrottleRateParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let error = || ThrottleRateParseError {
            raw: raw.to_owned(),
        };
        let (count, period) = raw.trim().split_once('/').ok_or_else(error)?;
        let requests: NonZeroU32 = count.trim().parse().map_err(|_| error())?;
        let seconds = match period.trim().chars().next() {
            Some('s') => 1,
            Some('m') => 60,
            Some('h') => 3_600,
            Some('d') => 86_400,
            _ => return Err(error()),
        };
        Ok(Self::new(requests, Duration::from_secs(seconds)))
    }
}

impl fmt::Display for ThrottleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let period = match self.period.as_secs() {
            1 => "second",
            60 => "minute",
            3_600 => "hour",
            _ => "day",
        };
        write!(f, "{}/{period}", self.requests)
    }
}

/// Scope name of the stricter authenticated throttle.
pub const TEN_PER_MINUTE_SCOPE: &str = "ten";

const DEFAULT_ANON_RATE: ThrottleRate = ThrottleRate::per_minute(NonZeroU32::MIN.saturating_add(19));
const DEFAULT_USER_RATE: ThrottleRate = ThrottleRate::per_minute(NonZeroU32::MIN.saturating_add(59));
const DEFAULT_TEN_RATE: ThrottleRate = ThrottleRate::per_minute(NonZeroU32::MIN.saturating_add(9));

/// Configured rates for every throttle scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleRates {
    anonymous: ThrottleRate,
    user: ThrottleRate,
    named: BTreeMap<String, ThrottleRate>,
}

impl Default for ThrottleRates {
    fn default() -> Self {
        Self {
            anonymous: DEFAULT_ANON_RATE,
            user: DEFAULT_USER_RATE,
            named: BTreeMap::from([(TEN_PER_MINUTE_SCOPE.to_owned(), DEFAULT_TEN_RATE)]),
        }
    }
}

impl ThrottleRates {
    /// Rates with no named scopes.
    pub fn new(anonymous: ThrottleRate, user: ThrottleRate) -> Self {
        Self {
            anonymous,
            user,
            named: BTreeMap::new(),
        }
    }

    /// Replace the anonymous rate.
    pub fn with_anonymous(mut self, rate: ThrottleRate) -> Self {
        self.anonymous = rate;
        self
    }

    /// Replace the per-user rate.
    pub fn with_user(mut self, rate: ThrottleRate) -> Self {
        self.user = rate;
        self
    }

    /// Register or replace a named scope.
    pub fn with_named(mut self, scope: impl Into<String>, rate: ThrottleRate) -> Self {
        self.named.insert(scope.into(), rate);
        self
    }

    /// Rate for `policy`, if configured.
    pub fn rate_for(&self, policy: ThrottlePolicy) -> Option<ThrottleRate> {
        match policy {
            ThrottlePolicy::Anonymous => Some(self.anonymous),
            ThrottlePolicy::User => Some(self.user),
            ThrottlePolicy::Named(name) => self.named.get(name).copied(),
        }
    }
}

/// Capabilities and throttles declared by one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    capabilities: &'static [Capability],
    throttles: &'static [ThrottlePolicy],
}

impl AccessPolicy {
    /// Policy requiring `capabilities` and applying `throttles`.
    pub const fn new(
        capabilities: &'static [Capability],
        throttles: &'static [ThrottlePolicy],
    ) -> Self {
        Self {
            capabilities,
            throttles,
        }
    }

    /// No requirements and no throttling.
    pub const PUBLIC: Self = Self::new(&[Capability::Anonymous], &[]);
    /// Open to anyone, throttled per anonymous peer and per user.
    pub const BROWSING: Self = Self::new(
        &[Capability::Anonymous],
        &[ThrottlePolicy::Anonymous, ThrottlePolicy::User],
    );
    /// Any authenticated caller.
    pub const AUTHENTICATED: Self = Self::new(&[Capability::Authenticated], &[]);
    /// Authenticated members of the instructors group.
    pub const INSTRUCTORS: Self = Self::new(
        &[
            Capability::Authenticated,
            Capability::Group(INSTRUCTORS_GROUP),
        ],
        &[],
    );
    /// Open to anyone, throttled per anonymous peer.
    pub const ANONYMOUS_THROTTLED: Self =
        Self::new(&[Capability::Anonymous], &[ThrottlePolicy::Anonymous]);
    /// Authenticated callers under the `ten` named rate.
    pub const AUTHENTICATED_TEN: Self = Self::new(
        &[Capability::Authenticated],
        &[ThrottlePolicy::Named(TEN_PER_MINUTE_SCOPE)],
    );

    /// Capabilities checked in order.
    pub fn capabilities(&self) -> &[Capability] {
        self.capabilities
    }

    /// Throttles checked in order.
    pub fn throttles(&self) -> &[ThrottlePolicy] {
        self.throttles
    }
}

/// Reason the chain refused a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDenial {
    /// The endpoint needs a token and none was sent.
    NotAuthenticated,
    /// The presented token is not recognised.
    InvalidToken,
    /// The caller lacks group membership.
    MissingGroup {
        /// Group the endpoint requires.
        group: &'static str,
    },
    /// A throttle refused the request.
    RateLimited {
        /// Delay until the next request would be admitted.
        retry_after: Duration,
    },
}

fn whole_seconds(delay: Duration) -> u64 {
    let seconds = delay.as_secs();
    if delay.subsec_nanos() > 0 {
        seconds.saturating_add(1)
    } else {
        seconds
    }
}

impl From<AccessDenial> for Error {
    fn from(denial: AccessDenial) -> Self {
        match denial {
            AccessDenial::NotAuthenticated => {
                Error::unauthorized("Authentication credentials were not provided.")
            }
            AccessDenial::InvalidToken => Error::unauthorized("Invalid token."),
            AccessDenial::MissingGroup { group } => {
                Error::forbidden("You do not have permission to perform this action.")
                    .with_details(json!({ "requiredGroup": group }))
            }
            AccessDenial::RateLimited { retry_after } => {
                let seconds = whole_seconds(retry_after);
                Error::too_many_requests(format!(
                    "Request was throttled. Expected available in {seconds} seconds."
                ))
                .with_details(json!({ "retryAfter": seconds }))
            }
        }
    }
}

/// Identity of an admitted caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    principal: Option<Principal>,
    peer: String,
}

impl Caller {
    /// Caller without a token.
    pub fn anonymous(peer: impl Into<String>) -> Self {
        Self {
            principal: None,
            peer: peer.into(),
        }
    }

    /// Caller identified by a token.
    pub fn authenticated(principal: Principal, peer: impl Into<String>) -> Self {
        Self {
            principal: Some(principal),
            peer: peer.into(),
        }
    }

    /// Authenticated identity, if any.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Remote address.
    pub fn peer(&self) -> &str {
        self.peer.as_str()
    }

    /// Identity used for throttle keys.
    fn throttle_ident(&self) -> &str {
        self.principal
            .as_ref()
            .map_or(self.peer.as_str(), Principal::username)
    }
}

/// Interceptor chain guarding endpoint handlers.
#[derive(Clone)]
pub struct AccessGate {
    authenticator: Arc<dyn Authenticator>,
    limiter: Arc<dyn RateLimiter>,
    rates: ThrottleRates,
}

impl AccessGate {
    /// Gate checking tokens with `authenticator` and rates with `limiter`.
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        limiter: Arc<dyn RateLimiter>,
        rates: ThrottleRates,
    ) -> Self {
        Self {
            authenticator,
            limiter,
            rates,
        }
    }

    /// Authenticator backing the gate, also used by the token endpoint.
    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    /// Run the chain for one request.
    pub async fn admit(
        &self,
        policy: &AccessPolicy,
        token: Option<&AuthToken>,
        peer: &str,
    ) -> Result<Caller, Error> {
        let caller = self.authenticate(token, peer).await?;
        check_capabilities(policy, &caller)?;
        self.check_throttles(policy, &caller).await?;
        Ok(caller)
    }

    async fn authenticate(&self, token: Option<&AuthToken>, peer: &str) -> Result<Caller, Error> {
        let Some(token) = token else {
            return Ok(Caller::anonymous(peer));
        };
        match self.authenticator.resolve(token).await {
            Ok(principal) => Ok(Caller::authenticated(principal, peer)),
            Err(AuthenticatorError::UnknownToken | AuthenticatorError::InvalidCredentials) => {
                debug!(peer, "rejected unknown token");
                Err(AccessDenial::InvalidToken.into())
            }
            Err(AuthenticatorError::Backend { message }) => {
                warn!(%message, "authenticator unavailable");
                Err(Error::service_unavailable("authentication is temporarily unavailable"))
            }
        }
    }

    async fn check_throttles(&self, policy: &AccessPolicy, caller: &Caller) -> Result<(), Error> {
        for throttle in policy.throttles() {
            if *throttle == ThrottlePolicy::Anonymous && caller.principal().is_some() {
                continue;
            }
            let rate = self.rates.rate_for(*throttle).ok_or_else(|| {
                Error::internal(format!(
                    "no rate configured for throttle scope `{}`",
                    throttle.scope()
                ))
            })?;
            let key = format!("throttle_{}_{}", throttle.scope(), caller.throttle_ident());
            match self.limiter.throttle(&key, rate).await {
                Ok(ThrottleDecision::Allow) => {}
                Ok(ThrottleDecision::Deny { retry_after }) => {
                    debug!(%key, ?retry_after, "request throttled");
                    return Err(AccessDenial::RateLimited { retry_after }.into());
                }
                Err(RateLimiterError::Backend { message }) => {
                    warn!(%message, "rate limiter unavailable");
                    return Err(Error::service_unavailable(
                        "rate limiting is temporarily unavailable",
                    ));
                }
            }
        }
        Ok(())
    }
}

fn check_capabilities(policy: &AccessPolicy, caller: &Caller) -> Result<(), AccessDenial> {
    for capability in policy.capabilities() {
        match (capability, caller.principal()) {
            (Capability::Anonymous, _) => {}
            (Capability::Authenticated | Capability::Group(_), None) => {
                return Err(AccessDenial::NotAuthenticated);
            }
            (Capability::Authenticated, Some(_)) => {}
            (Capability::Group(group), Some(principal)) => {
                if !principal.in_group(group) {
                    return Err(AccessDenial::MissingGroup { group: *group });
                }
            }
        }
    }
    Ok(())
}
