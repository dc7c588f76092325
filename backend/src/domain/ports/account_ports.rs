//! Driving ports for account use-cases.
//!
//! Inbound adapters call these traits; the domain services implement them.
//! Handler tests can substitute doubles without wiring persistence.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::{Account, AccountId, AccountName, ApiToken, Email, Error, LoginCredentials};

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountProfile {
    pub email: Email,
    pub name: AccountName,
}

impl From<&Account> for AccountProfile {
    fn from(account: &Account) -> Self {
        Self {
            email: account.email.clone(),
            name: account.name.clone(),
        }
    }
}

/// Raw self-registration input.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub email: String,
    pub password: Zeroizing<String>,
    pub name: String,
}

/// Partial profile update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password: Option<Zeroizing<String>>,
}

/// Self-registration use-case.
#[async_trait]
pub trait AccountRegistration: Send + Sync {
    /// Validate and create an account.
    async fn register(&self, request: RegistrationRequest) -> Result<AccountProfile, Error>;
}

/// Token issuance use-case.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify credentials and issue a new token.
    async fn issue_token(&self, credentials: &LoginCredentials) -> Result<ApiToken, Error>;
}

/// Token verification use-case.
#[async_trait]
pub trait TokenAuthenticator: Send + Sync {
    /// Resolve a presented token to an active account.
    async fn authenticate(&self, token: &ApiToken) -> Result<Account, Error>;
}

/// Read access to the caller's own profile.
#[async_trait]
pub trait AccountProfileQuery: Send + Sync {
    /// Profile of `account_id`.
    async fn fetch_profile(&self, account_id: &AccountId) -> Result<AccountProfile, Error>;
}

/// Write access to the caller's own profile.
#[async_trait]
pub trait AccountProfileCommand: Send + Sync {
    /// Apply a partial update and return the new profile.
    async fn update_profile(
        &self,
        account_id: &AccountId,
        update: ProfileUpdate,
    ) -> Result<AccountProfile, Error>;
}
