//! PostgreSQL-backed `TokenRepository`.
//!
//! Only the SHA-256 digest reaches the database; the raw token is returned to
//! the client once and never stored.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{TokenRepository, TokenRepositoryError};
use crate::domain::{AccountId, TokenDigest};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::NewAuthTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::auth_tokens;

/// Diesel implementation of [`TokenRepository`].
#[derive(Clone)]
pub struct DieselTokenRepository {
    pool: DbPool,
}

impl DieselTokenRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TokenRepositoryError {
    TokenRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> TokenRepositoryError {
    match classify_diesel_error(error, operation) {
        DieselFailure::Connection(message) => TokenRepositoryError::connection(message),
        DieselFailure::UniqueViolation { .. } => TokenRepositoryError::query("token digest collision"),
        DieselFailure::Query(message) => TokenRepositoryError::query(message),
    }
}

#[async_trait]
impl TokenRepository for DieselTokenRepository {
    async fn store(
        &self,
        digest: &TokenDigest,
        account_id: &AccountId,
    ) -> Result<(), TokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewAuthTokenRow {
            digest: digest.as_ref(),
            account_id: *account_id.as_uuid(),
        };

        diesel::insert_into(auth_tokens::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "store token"))
    }

    async fn find_account(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<AccountId>, TokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let account_id: Option<Uuid> = auth_tokens::table
            .find(digest.as_ref())
            .select(auth_tokens::account_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find token"))?;
        Ok(account_id.map(AccountId::from_uuid))
    }
}
