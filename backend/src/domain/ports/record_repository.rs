//! Driven port for owner-scoped record storage.
//!
//! Every read is keyed by owner; there is deliberately no way to fetch a
//! record without naming the account it belongs to.

use async_trait::async_trait;

use crate::domain::{AccountId, OwnedRecord, RecordId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by record repository adapters.
    pub enum RecordRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "record repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "record repository query failed: {message}",
        /// Update targeted a record that does not exist for the owner.
        Missing { id: String } =>
            "record {id} does not exist",
    }
}

/// Storage for one record kind.
#[async_trait]
pub trait RecordRepository<R: OwnedRecord>: Send + Sync {
    /// Records owned by `owner`, sorted by display name descending then id.
    async fn list_by_owner(&self, owner: &AccountId) -> Result<Vec<R>, RecordRepositoryError>;

    /// The record with `id` if `owner` owns it.
    async fn find_owned(
        &self,
        owner: &AccountId,
        id: &RecordId,
    ) -> Result<Option<R>, RecordRepositoryError>;

    /// Persist a new record.
    async fn insert(&self, record: &R) -> Result<(), RecordRepositoryError>;

    /// Overwrite an existing record of the same owner.
    async fn update(&self, record: &R) -> Result<(), RecordRepositoryError>;
}
