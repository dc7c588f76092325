//! Driving ports for owner-scoped records.

use async_trait::async_trait;

use crate::domain::{AccountId, Error, OwnedRecord, Recipe, RecipeDetail, RecipeFilter, RecordId};

/// Read use-cases for one record kind.
#[async_trait]
pub trait RecordQuery<R: OwnedRecord>: Send + Sync {
    /// The caller's records in listing order.
    async fn list(&self, owner: &AccountId) -> Result<Vec<R>, Error>;

    /// One of the caller's records. Other owners' records are not found.
    async fn fetch(&self, owner: &AccountId, id: &RecordId) -> Result<R, Error>;
}

/// Write use-cases for one record kind.
#[async_trait]
pub trait RecordCommand<R: OwnedRecord>: Send + Sync {
    /// Create a record owned by the caller.
    async fn create(&self, owner: &AccountId, draft: R::Draft) -> Result<R, Error>;

    /// Partially update one of the caller's records.
    async fn update(&self, owner: &AccountId, id: &RecordId, patch: R::Patch) -> Result<R, Error>;
}

/// Recipe reads with association filtering and resolution.
#[async_trait]
pub trait RecipeQuery: Send + Sync {
    /// The caller's recipes matching `filter`, in listing order.
    async fn list_filtered(
        &self,
        owner: &AccountId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, Error>;

    /// One recipe with its tags and ingredients resolved.
    async fn fetch_detail(&self, owner: &AccountId, id: &RecordId) -> Result<RecipeDetail, Error>;
}
