//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use course_catalogue::domain::ThrottleRates;
use course_catalogue::outbound::auth::AccountList;
use course_catalogue::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) accounts: AccountList,
    pub(crate) rates: ThrottleRates,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) seed_demo_data: bool,
}

impl ServerConfig {
    /// Configuration backed by the in-memory store.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, accounts: AccountList, rates: ThrottleRates) -> Self {
        Self {
            bind_addr,
            accounts,
            rates,
            db_pool: None,
            seed_demo_data: false,
        }
    }

    /// Serve the catalogue from PostgreSQL instead of process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Create demo categories at startup when the store is empty.
    #[must_use]
    pub fn with_demo_seed(mut self, enabled: bool) -> Self {
        self.seed_demo_data = enabled;
        self
    }
}
