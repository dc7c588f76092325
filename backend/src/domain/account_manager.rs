//! Account factory.
//!
//! [`AccountManager`] is the only path that constructs [`Account`] values. It
//! is built once at startup and handed to whoever needs to create accounts,
//! so normalization and hashing cannot be bypassed.

use std::sync::Arc;

use tracing::info;
use zeroize::Zeroizing;

use super::ports::{AccountRepository, AccountRepositoryError};
use super::{
    Account, AccountName, AccountValidationError, Email, PasswordHashError, PasswordHashing,
};

/// Optional fields merged into a new account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountExtras {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl AccountExtras {
    /// Extras carrying only a display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Failures from [`AccountManager`] operations. No account is persisted when
/// one of these is returned from `create_user`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountCreationError {
    #[error("users must have an email address")]
    MissingEmail,
    #[error("invalid account: {0}")]
    InvalidAccount(AccountValidationError),
    #[error("an account with email {email} already exists")]
    DuplicateEmail { email: String },
    #[error("no account with email {email}")]
    UnknownAccount { email: String },
    #[error(transparent)]
    Hashing(#[from] PasswordHashError),
    #[error(transparent)]
    Repository(AccountRepositoryError),
}

impl From<AccountRepositoryError> for AccountCreationError {
    fn from(value: AccountRepositoryError) -> Self {
        match value {
            AccountRepositoryError::DuplicateEmail { email } => Self::DuplicateEmail { email },
            other => Self::Repository(other),
        }
    }
}

/// Factory for [`Account`] records.
#[derive(Clone)]
pub struct AccountManager {
    accounts: Arc<dyn AccountRepository>,
    hashing: PasswordHashing,
}

impl AccountManager {
    /// Bind the manager to its repository and hasher.
    pub fn new(accounts: Arc<dyn AccountRepository>, hashing: PasswordHashing) -> Self {
        Self { accounts, hashing }
    }

    /// Hasher used for new passwords.
    pub fn hashing(&self) -> &PasswordHashing {
        &self.hashing
    }

    /// Create and persist an account.
    ///
    /// The email domain is lowercased; a `None`, empty or blank email fails
    /// with [`AccountCreationError::MissingEmail`]. A `None` password yields
    /// an account that cannot log in with a password.
    pub async fn create_user(
        &self,
        email: Option<&str>,
        password: Option<&str>,
        extras: AccountExtras,
    ) -> Result<Account, AccountCreationError> {
        let email = match email.map(Email::normalize) {
            None | Some(Err(AccountValidationError::EmptyEmail)) => {
                return Err(AccountCreationError::MissingEmail);
            }
            Some(Err(other)) => return Err(AccountCreationError::InvalidAccount(other)),
            Some(Ok(email)) => email,
        };
        let name = AccountName::new(extras.name.unwrap_or_default())
            .map_err(AccountCreationError::InvalidAccount)?;

        let digest = self
            .hashing
            .hash_blocking(password.map(|raw| Zeroizing::new(raw.to_owned())))
            .await?;

        let mut account = Account::new(email, name, digest);
        if let Some(is_active) = extras.is_active {
            account.is_active = is_active;
        }
        if let Some(is_staff) = extras.is_staff {
            account.is_staff = is_staff;
        }
        if let Some(is_superuser) = extras.is_superuser {
            account.is_superuser = is_superuser;
        }

        self.accounts.insert(&account).await?;
        info!(account_id = %account.id, "account created");
        Ok(account)
    }

    /// Create an account, then grant staff and superuser status.
    pub async fn create_superuser(
        &self,
        email: Option<&str>,
        password: &str,
    ) -> Result<Account, AccountCreationError> {
        let mut account = self
            .create_user(email, Some(password), AccountExtras::default())
            .await?;
        account.is_staff = true;
        account.is_superuser = true;
        self.accounts.update(&account).await?;
        info!(account_id = %account.id, "account elevated to superuser");
        Ok(account)
    }

    /// Grant staff and superuser status to an existing account.
    ///
    /// Accounts that already hold both flags are returned without a write.
    pub async fn grant_superuser(&self, email: &str) -> Result<Account, AccountCreationError> {
        let email = match Email::normalize(email) {
            Err(AccountValidationError::EmptyEmail) => {
                return Err(AccountCreationError::MissingEmail);
            }
            Err(other) => return Err(AccountCreationError::InvalidAccount(other)),
            Ok(email) => email,
        };
        let mut account = self.accounts.find_by_email(&email).await?.ok_or_else(|| {
            AccountCreationError::UnknownAccount {
                email: email.to_string(),
            }
        })?;
        if account.is_staff && account.is_superuser {
            return Ok(account);
        }
        account.is_staff = true;
        account.is_superuser = true;
        self.accounts.update(&account).await?;
        info!(account_id = %account.id, "account elevated to superuser");
        Ok(account)
    }
}
