//! In-memory token repository.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{TokenRepository, TokenRepositoryError};
use crate::domain::{AccountId, TokenDigest};

use super::lock;

/// Token digests mapped to account ids.
#[derive(Debug, Default)]
pub struct InMemoryTokenRepository {
    tokens: Mutex<HashMap<TokenDigest, AccountId>>,
}

impl InMemoryTokenRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(message: String) -> TokenRepositoryError {
    TokenRepositoryError::query(format!("token store lock poisoned: {message}"))
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn store(
        &self,
        digest: &TokenDigest,
        account_id: &AccountId,
    ) -> Result<(), TokenRepositoryError> {
        lock(&self.tokens, poisoned)?.insert(digest.clone(), *account_id);
        Ok(())
    }

    async fn find_account(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<AccountId>, TokenRepositoryError> {
        Ok(lock(&self.tokens, poisoned)?.get(digest).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ApiToken;

    #[tokio::test]
    async fn resolves_stored_digests_only() {
        let repo = InMemoryTokenRepository::new();
        let account_id = AccountId::random();
        let token = ApiToken::generate();
        repo.store(&token.digest(), &account_id)
            .await
            .expect("store succeeds");

        assert_eq!(
            repo.find_account(&token.digest()).await.expect("lookup"),
            Some(account_id)
        );
        assert_eq!(
            repo.find_account(&ApiToken::generate().digest())
                .await
                .expect("lookup"),
            None
        );
    }
}
