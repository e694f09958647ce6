//! Service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `CATALOGUE_*` environment variables and
//! configuration files, in OrthoConfig's usual precedence. Unset optional
//! values fall back to the defaults below.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{TEN_PER_MINUTE_SCOPE, ThrottleRate, ThrottleRateParseError, ThrottleRates};
use crate::outbound::auth::{AccountList, AccountSpecError, DEFAULT_ACCOUNTS};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address did not parse.
    #[error("bind address `{raw}` is not a socket address")]
    BindAddr {
        /// Configured value.
        raw: String,
    },
    /// A throttle rate did not parse.
    #[error("invalid {scope} throttle rate: {source}")]
    Rate {
        /// Throttle scope the rate belongs to.
        scope: &'static str,
        /// Parse failure.
        #[source]
        source: ThrottleRateParseError,
    },
    /// The account list did not parse.
    #[error("invalid account list: {0}")]
    Accounts(#[from] AccountSpecError),
}

/// Runtime configuration for the catalogue service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CATALOGUE")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Rate applied to anonymous callers, e.g. `20/minute`.
    pub anon_rate: Option<String>,
    /// Rate applied to every caller on throttled listings.
    pub user_rate: Option<String>,
    /// Rate of the named `ten` scope.
    pub ten_rate: Option<String>,
    /// Accounts as `user:password:Group+Group` entries separated by `;`.
    pub accounts: Option<String>,
    /// Create a handful of demo categories when the store is empty.
    #[ortho_config(default = false)]
    pub seed_demo_data: bool,
}

fn parse_rate(raw: &str, scope: &'static str) -> Result<ThrottleRate, SettingsError> {
    raw.parse()
        .map_err(|source| SettingsError::Rate { scope, source })
}

impl AppSettings {
    /// Socket address to bind, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::BindAddr {
            raw: raw.to_owned(),
        })
    }

    /// Pool size, defaulting to eight connections.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Throttle rates with configured overrides applied.
    pub fn throttle_rates(&self) -> Result<ThrottleRates, SettingsError> {
        let mut rates = ThrottleRates::default();
        if let Some(raw) = self.anon_rate.as_deref() {
            rates = rates.with_anonymous(parse_rate(raw, "anon")?);
        }
        if let Some(raw) = self.user_rate.as_deref() {
            rates = rates.with_user(parse_rate(raw, "user")?);
        }
        if let Some(raw) = self.ten_rate.as_deref() {
            rates = rates.with_named(TEN_PER_MINUTE_SCOPE, parse_rate(raw, TEN_PER_MINUTE_SCOPE)?);
        }
        Ok(rates)
    }

    /// Parsed account list, defaulting to a single instructor.
    pub fn accounts(&self) -> Result<AccountList, SettingsError> {
        Ok(self.accounts.as_deref().unwrap_or(DEFAULT_ACCOUNTS).parse()?)
    }
}
