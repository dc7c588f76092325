//! PostgreSQL adapters built on Diesel.
//!
//! Repositories here only translate between row structs and domain types;
//! validation and ownership rules live in the domain services. Connections
//! come from a `bb8` pool via `diesel-async`.
//!
//! ```ignore
//! use recipe_backend::outbound::persistence::{DbPool, DieselAccountRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/recipes")).await?;
//! let accounts = DieselAccountRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_helpers;
mod diesel_named_record_repository;
mod diesel_recipe_repository;
mod diesel_token_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_named_record_repository::{DieselIngredientRepository, DieselTagRepository};
pub use diesel_recipe_repository::DieselRecipeRepository;
pub use diesel_token_repository::DieselTokenRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations, run_migrations_blocking};
pub use pool::{DbPool, PoolConfig, PoolError};
