//! Driven port for account persistence.

use async_trait::async_trait;

use crate::domain::{Account, AccountId, Email};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "account repository query failed: {message}",
        /// Another account already uses the normalized email.
        DuplicateEmail { email: String } =>
            "an account with email {email} already exists",
        /// Update targeted an account that does not exist.
        Missing { id: String } =>
            "account {id} does not exist",
    }
}

/// Storage for [`Account`] records.
///
/// Implementations must enforce email uniqueness atomically: of two concurrent
/// inserts with the same email exactly one succeeds and the other fails with
/// [`AccountRepositoryError::DuplicateEmail`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Persist a new account.
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError>;

    /// Overwrite the mutable fields of an existing account.
    async fn update(&self, account: &Account) -> Result<(), AccountRepositoryError>;

    /// Look up an account by id.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError>;

    /// Look up an account by normalized email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, AccountRepositoryError>;
}
