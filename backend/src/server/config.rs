//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use recipe_backend::domain::{PasswordHashing, PasswordPolicy};
use recipe_backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) policy: PasswordPolicy,
    pub(crate) hashing: PasswordHashing,
}

impl ServerConfig {
    /// In-memory storage unless a pool is attached.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, policy: PasswordPolicy, hashing: PasswordHashing) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            policy,
            hashing,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
