//! PostgreSQL-backed `AccountRepository`.
//!
//! Email uniqueness rests on the `accounts_email_key` constraint, so two
//! concurrent registrations race inside PostgreSQL and the loser surfaces as
//! [`AccountRepositoryError::DuplicateEmail`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{AccountRepository, AccountRepositoryError};
use crate::domain::{Account, AccountId, AccountName, Email, PasswordDigest};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{AccountChangeset, AccountRow, NewAccountRow};
use super::pool::{DbPool, PoolError};
use super::schema::accounts;

/// Diesel implementation of [`AccountRepository`].
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    AccountRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(
    error: diesel::result::Error,
    operation: &str,
    email: Option<&str>,
) -> AccountRepositoryError {
    match classify_diesel_error(error, operation) {
        DieselFailure::Connection(message) => AccountRepositoryError::connection(message),
        DieselFailure::UniqueViolation { constraint } => match email {
            Some(email) => AccountRepositoryError::duplicate_email(email),
            None => {
                warn!(?constraint, operation, "unexpected unique violation");
                AccountRepositoryError::query("unique constraint violated")
            }
        },
        DieselFailure::Query(message) => AccountRepositoryError::query(message),
    }
}

fn row_to_account(row: AccountRow) -> Result<Account, AccountRepositoryError> {
    let email = Email::try_from(row.email)
        .map_err(|err| AccountRepositoryError::query(format!("invalid stored email: {err}")))?;
    let name = AccountName::try_from(row.name)
        .map_err(|err| AccountRepositoryError::query(format!("invalid stored name: {err}")))?;
    Ok(Account {
        id: AccountId::from_uuid(row.id),
        email,
        name,
        password: PasswordDigest::from_stored(row.password),
        is_active: row.is_active,
        is_staff: row.is_staff,
        is_superuser: row.is_superuser,
        created_at: row.created_at,
    })
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewAccountRow {
            id: *account.id.as_uuid(),
            email: account.email.as_ref(),
            name: account.name.as_ref(),
            password: account.password.as_stored(),
            is_active: account.is_active,
            is_staff: account.is_staff,
            is_superuser: account.is_superuser,
            created_at: account.created_at,
        };

        diesel::insert_into(accounts::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "insert account", Some(account.email.as_ref())))
    }

    async fn update(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = AccountChangeset {
            email: account.email.as_ref(),
            name: account.name.as_ref(),
            password: account.password.as_stored(),
            is_active: account.is_active,
            is_staff: account.is_staff,
            is_superuser: account.is_superuser,
        };

        let updated = diesel::update(accounts::table.find(account.id.as_uuid()))
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "update account", Some(account.email.as_ref())))?;

        if updated == 0 {
            return Err(AccountRepositoryError::missing(account.id.to_string()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = accounts::table
            .find(id.as_uuid())
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find account by id", None))?;
        row.map(row_to_account).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = accounts::table
            .filter(accounts::email.eq(email.as_ref()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find account by email", None))?;
        row.map(row_to_account).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(err, AccountRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn unique_violation_on_write_is_a_duplicate_email() {
        let err = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        );

        let mapped = map_diesel_error(err, "insert account", Some("chef@example.com"));

        assert_eq!(
            mapped,
            AccountRepositoryError::duplicate_email("chef@example.com")
        );
    }

    #[rstest]
    fn stored_rows_round_trip_into_accounts() {
        let row = AccountRow {
            id: Uuid::new_v4(),
            email: "chef@example.com".to_owned(),
            name: "Chef".to_owned(),
            password: "!".to_owned(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: Utc::now(),
        };

        let account = row_to_account(row.clone()).expect("row converts");

        assert_eq!(account.id.as_uuid(), &row.id);
        assert_eq!(account.email.as_ref(), "chef@example.com");
        assert!(!account.password.is_usable());
    }
}
