//! Driven port for API token storage.

use async_trait::async_trait;

use crate::domain::{AccountId, TokenDigest};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token repository adapters.
    pub enum TokenRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "token repository query failed: {message}",
    }
}

/// Maps token digests to the accounts they authenticate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Remember `digest` as a credential for `account_id`.
    async fn store(
        &self,
        digest: &TokenDigest,
        account_id: &AccountId,
    ) -> Result<(), TokenRepositoryError>;

    /// Resolve a digest to its account, if any.
    async fn find_account(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<AccountId>, TokenRepositoryError>;
}
