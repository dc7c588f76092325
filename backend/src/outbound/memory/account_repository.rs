//! In-memory account repository.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{Account, AccountId, Email};

use super::lock;

/// Accounts keyed by id with a secondary email index.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    state: Mutex<AccountTables>,
}

#[derive(Debug, Default)]
struct AccountTables {
    by_id: HashMap<AccountId, Account>,
    by_email: HashMap<Email, AccountId>,
}

impl InMemoryAccountRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(message: String) -> AccountRepositoryError {
    AccountRepositoryError::query(format!("account store lock poisoned: {message}"))
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut tables = lock(&self.state, poisoned)?;
        if tables.by_email.contains_key(&account.email) {
            return Err(AccountRepositoryError::duplicate_email(account.email.as_ref()));
        }
        tables.by_email.insert(account.email.clone(), account.id);
        tables.by_id.insert(account.id, account.clone());
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut tables = lock(&self.state, poisoned)?;
        let Some(previous_email) = tables.by_id.get(&account.id).map(|existing| existing.email.clone())
        else {
            return Err(AccountRepositoryError::missing(account.id.to_string()));
        };
        if previous_email != account.email {
            if tables.by_email.contains_key(&account.email) {
                return Err(AccountRepositoryError::duplicate_email(account.email.as_ref()));
            }
            tables.by_email.remove(&previous_email);
            tables.by_email.insert(account.email.clone(), account.id);
        }
        tables.by_id.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        let tables = lock(&self.state, poisoned)?;
        Ok(tables.by_id.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, AccountRepositoryError> {
        let tables = lock(&self.state, poisoned)?;
        Ok(tables
            .by_email
            .get(email)
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{AccountName, PasswordDigest};
    use rstest::rstest;

    fn account(email: &str) -> Account {
        Account::new(
            Email::normalize(email).expect("valid email"),
            AccountName::default(),
            PasswordDigest::Unusable,
        )
    }

    #[rstest]
    #[tokio::test]
    async fn finds_inserted_accounts_by_id_and_email() {
        let repo = InMemoryAccountRepository::new();
        let stored = account("chef@example.com");
        repo.insert(&stored).await.expect("insert succeeds");

        assert_eq!(
            repo.find_by_id(&stored.id).await.expect("lookup succeeds"),
            Some(stored.clone())
        );
        let email = Email::normalize("chef@EXAMPLE.com").expect("valid email");
        assert_eq!(
            repo.find_by_email(&email).await.expect("lookup succeeds"),
            Some(stored)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_duplicate_normalized_email() {
        let repo = InMemoryAccountRepository::new();
        repo.insert(&account("a@B.com")).await.expect("first insert");

        let err = repo
            .insert(&account("a@b.com"))
            .await
            .expect_err("second insert collides");
        assert_eq!(err, AccountRepositoryError::duplicate_email("a@b.com"));
    }

    #[rstest]
    #[tokio::test]
    async fn concurrent_duplicate_inserts_yield_one_winner() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.insert(&account("race@example.com")).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.expect("task completes").is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn update_requires_existing_account() {
        let repo = InMemoryAccountRepository::new();
        let missing = account("ghost@example.com");
        let err = repo.update(&missing).await.expect_err("update fails");
        assert!(matches!(err, AccountRepositoryError::Missing { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn update_overwrites_flags() {
        let repo = InMemoryAccountRepository::new();
        let mut stored = account("admin@example.com");
        repo.insert(&stored).await.expect("insert succeeds");
        stored.is_staff = true;
        stored.is_superuser = true;
        repo.update(&stored).await.expect("update succeeds");

        let reloaded = repo
            .find_by_id(&stored.id)
            .await
            .expect("lookup succeeds")
            .expect("account exists");
        assert!(reloaded.is_staff && reloaded.is_superuser);
    }
}
