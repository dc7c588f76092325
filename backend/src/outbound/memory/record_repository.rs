//! In-memory record repository, generic over the record kind.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{RecordRepository, RecordRepositoryError};
use crate::domain::{AccountId, OwnedRecord, RecordId, sort_for_listing};

use super::lock;

/// Records of one kind held in insertion order.
#[derive(Debug)]
pub struct InMemoryRecordRepository<R> {
    records: Mutex<Vec<R>>,
}

impl<R> Default for InMemoryRecordRepository<R> {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }
}

impl<R> InMemoryRecordRepository<R> {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(message: String) -> RecordRepositoryError {
    RecordRepositoryError::query(format!("record store lock poisoned: {message}"))
}

#[async_trait]
impl<R: OwnedRecord> RecordRepository<R> for InMemoryRecordRepository<R> {
    async fn list_by_owner(&self, owner: &AccountId) -> Result<Vec<R>, RecordRepositoryError> {
        let mut owned: Vec<R> = lock(&self.records, poisoned)?
            .iter()
            .filter(|record| record.owner() == *owner)
            .cloned()
            .collect();
        sort_for_listing(&mut owned);
        Ok(owned)
    }

    async fn find_owned(
        &self,
        owner: &AccountId,
        id: &RecordId,
    ) -> Result<Option<R>, RecordRepositoryError> {
        Ok(lock(&self.records, poisoned)?
            .iter()
            .find(|record| record.owner() == *owner && record.id() == *id)
            .cloned())
    }

    async fn insert(&self, record: &R) -> Result<(), RecordRepositoryError> {
        lock(&self.records, poisoned)?.push(record.clone());
        Ok(())
    }

    async fn update(&self, record: &R) -> Result<(), RecordRepositoryError> {
        let mut records = lock(&self.records, poisoned)?;
        let slot = records
            .iter_mut()
            .find(|existing| existing.id() == record.id() && existing.owner() == record.owner())
            .ok_or_else(|| RecordRepositoryError::missing(record.id().to_string()))?;
        *slot = record.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NamedRecord, RecordName, Tag};
    use rstest::rstest;

    fn tag(owner: AccountId, name: &str) -> Tag {
        Tag::create(RecordId::random(), owner, RecordName::new(name).expect("valid"))
    }

    #[rstest]
    #[tokio::test]
    async fn list_by_owner_scopes_and_sorts() {
        let repo = InMemoryRecordRepository::<Tag>::new();
        let owner = AccountId::random();
        let other = AccountId::random();
        for record in [
            tag(owner, "Breakfast"),
            tag(other, "Vegan"),
            tag(owner, "Dessert"),
        ] {
            repo.insert(&record).await.expect("insert succeeds");
        }

        let listed = repo.list_by_owner(&owner).await.expect("list succeeds");
        let names: Vec<_> = listed.iter().map(|t| t.name.as_ref()).collect();
        assert_eq!(names, ["Dessert", "Breakfast"]);
    }

    #[rstest]
    #[tokio::test]
    async fn update_cannot_cross_owners() {
        let repo = InMemoryRecordRepository::<Tag>::new();
        let original = tag(AccountId::random(), "Mine");
        repo.insert(&original).await.expect("insert succeeds");

        let mut hijacked = original.clone();
        hijacked.owner = AccountId::random();
        let err = repo.update(&hijacked).await.expect_err("update fails");
        assert!(matches!(err, RecordRepositoryError::Missing { .. }));
    }
}
