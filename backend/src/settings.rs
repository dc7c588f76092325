//! Application settings loaded via OrthoConfig.
//!
//! Values layer CLI flags over `RECIPE_*` environment variables over an
//! optional config file.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{DEFAULT_MIN_PASSWORD_LENGTH, PasswordHashing, PasswordHashError, PasswordPolicy};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ARGON2_MEMORY_KIB: u32 = 19_456;
const DEFAULT_ARGON2_ITERATIONS: u32 = 2;
const DEFAULT_ARGON2_PARALLELISM: u32 = 1;

/// Server configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECIPE")]
pub struct AppSettings {
    /// Socket address to listen on.
    #[ortho_config(default = String::from(DEFAULT_BIND_ADDR))]
    pub bind_addr: String,
    /// PostgreSQL URL. In-memory storage is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    #[ortho_config(default = DEFAULT_DB_MAX_CONNECTIONS)]
    pub db_max_connections: u32,
    /// Shortest accepted password.
    #[ortho_config(default = DEFAULT_MIN_PASSWORD_LENGTH)]
    pub min_password_length: usize,
    #[ortho_config(default = DEFAULT_ARGON2_MEMORY_KIB)]
    pub argon2_memory_kib: u32,
    #[ortho_config(default = DEFAULT_ARGON2_ITERATIONS)]
    pub argon2_iterations: u32,
    #[ortho_config(default = DEFAULT_ARGON2_PARALLELISM)]
    pub argon2_parallelism: u32,
    /// Administrator created at startup when missing.
    pub superuser_email: Option<String>,
    pub superuser_password: Option<String>,
}

/// Superuser credentials read from settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperuserSeed {
    pub email: String,
    pub password: String,
}

impl AppSettings {
    /// Parsed bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.bind_addr.trim().parse()
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy::new(self.min_password_length)
    }

    /// Argon2id parameters; invalid combinations are rejected.
    pub fn password_hashing(&self) -> Result<PasswordHashing, PasswordHashError> {
        PasswordHashing::new(
            self.argon2_memory_kib,
            self.argon2_iterations,
            self.argon2_parallelism,
        )
    }

    /// Bootstrap credentials when both email and password are set.
    pub fn superuser(&self) -> Option<SuperuserSeed> {
        match (&self.superuser_email, &self.superuser_password) {
            (Some(email), Some(password)) if !email.trim().is_empty() => Some(SuperuserSeed {
                email: email.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}
