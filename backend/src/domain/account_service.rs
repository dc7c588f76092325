//! Account use-cases: registration, tokens and the caller's profile.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use super::ports::{
    AccountProfile, AccountProfileCommand, AccountProfileQuery, AccountRegistration,
    AccountRepository, AccountRepositoryError, LoginService, ProfileUpdate, RegistrationRequest,
    TokenAuthenticator, TokenRepository, TokenRepositoryError,
};
use super::{
    Account, AccountCreationError, AccountExtras, AccountId, AccountManager, AccountName,
    AccountValidationError, ApiToken, Email, Error, LoginCredentials, PasswordHashing,
    PasswordPolicy, PasswordPolicyViolation,
};

const INVALID_CREDENTIALS: &str = "unable to authenticate with provided credentials";

/// Service implementing every account driving port.
#[derive(Clone)]
pub struct AccountService {
    manager: Arc<AccountManager>,
    accounts: Arc<dyn AccountRepository>,
    tokens: Arc<dyn TokenRepository>,
    policy: PasswordPolicy,
}

impl AccountService {
    /// Wire the service to its collaborators.
    pub fn new(
        manager: Arc<AccountManager>,
        accounts: Arc<dyn AccountRepository>,
        tokens: Arc<dyn TokenRepository>,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            manager,
            accounts,
            tokens,
            policy,
        }
    }

    async fn load(&self, account_id: &AccountId) -> Result<Account, Error> {
        self.accounts
            .find_by_id(account_id)
            .await
            .map_err(map_account_repository_error)?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))
    }

    fn check_policy(&self, password: &str) -> Result<(), Error> {
        self.policy
            .check(password)
            .map_err(|violation| map_policy_violation(violation, self.policy))
    }
}

fn field_error(message: impl Into<String>, field: &str, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

fn map_policy_violation(violation: PasswordPolicyViolation, policy: PasswordPolicy) -> Error {
    match violation {
        PasswordPolicyViolation::TooShort { .. } => Error::invalid_request(violation.to_string())
            .with_details(json!({
                "field": "password",
                "code": "password_too_short",
                "minLength": policy.min_length(),
            })),
    }
}

fn map_account_validation_error(err: AccountValidationError) -> Error {
    let message = err.to_string();
    match err {
        AccountValidationError::EmptyEmail => field_error(message, "email", "empty_email"),
        AccountValidationError::EmailTooLong { .. } => {
            field_error(message, "email", "email_too_long")
        }
        AccountValidationError::InvalidEmailFormat => {
            field_error(message, "email", "invalid_email")
        }
        AccountValidationError::AccountNameTooLong { .. } => {
            field_error(message, "name", "name_too_long")
        }
        AccountValidationError::InvalidId => field_error(message, "id", "invalid_id"),
    }
}

fn map_account_repository_error(err: AccountRepositoryError) -> Error {
    debug!(error = %err, "account repository failure");
    match err {
        AccountRepositoryError::Connection { .. } => {
            Error::service_unavailable("account store unavailable")
        }
        AccountRepositoryError::DuplicateEmail { .. } => duplicate_email(),
        AccountRepositoryError::Query { .. } | AccountRepositoryError::Missing { .. } => {
            Error::internal(err.to_string())
        }
    }
}

fn map_token_repository_error(err: TokenRepositoryError) -> Error {
    debug!(error = %err, "token repository failure");
    match err {
        TokenRepositoryError::Connection { .. } => {
            Error::service_unavailable("token store unavailable")
        }
        TokenRepositoryError::Query { .. } => Error::internal(err.to_string()),
    }
}

fn duplicate_email() -> Error {
    field_error(
        "an account with this email already exists",
        "email",
        "duplicate_email",
    )
}

fn map_creation_error(err: AccountCreationError) -> Error {
    match err {
        AccountCreationError::MissingEmail => field_error(err.to_string(), "email", "empty_email"),
        AccountCreationError::InvalidAccount(inner) => map_account_validation_error(inner),
        AccountCreationError::DuplicateEmail { .. } => duplicate_email(),
        AccountCreationError::UnknownAccount { .. } => Error::not_found(err.to_string()),
        AccountCreationError::Hashing(inner) => Error::internal(inner.to_string()),
        AccountCreationError::Repository(inner) => map_account_repository_error(inner),
    }
}

#[async_trait]
impl AccountRegistration for AccountService {
    async fn register(&self, request: RegistrationRequest) -> Result<AccountProfile, Error> {
        let RegistrationRequest {
            email,
            password,
            name,
        } = request;

        let normalized = Email::normalize(&email).map_err(map_account_validation_error)?;
        normalized
            .require_valid_format()
            .map_err(map_account_validation_error)?;
        if name.trim().is_empty() {
            return Err(empty_name());
        }
        self.check_policy(password.as_str())?;

        let account = self
            .manager
            .create_user(
                Some(normalized.as_ref()),
                Some(password.as_str()),
                AccountExtras::named(name),
            )
            .await
            .map_err(map_creation_error)?;
        Ok(AccountProfile::from(&account))
    }
}

#[async_trait]
impl LoginService for AccountService {
    async fn issue_token(&self, credentials: &LoginCredentials) -> Result<ApiToken, Error> {
        let Ok(email) = Email::normalize(credentials.email()) else {
            return Err(field_error("email must not be empty", "email", "empty_email"));
        };
        let account = self
            .accounts
            .find_by_email(&email)
            .await
            .map_err(map_account_repository_error)?;

        let Some(account) = account else {
            // Hash anyway so response timing does not reveal unknown emails.
            let _ = self.manager.hashing().hash_blocking(Some(credentials.password_secret())).await;
            warn!("token request for unknown account");
            return Err(invalid_credentials());
        };

        let verified =
            PasswordHashing::verify_blocking(account.password.clone(), credentials.password_secret())
                .await;
        if !verified || !account.is_active {
            warn!(account_id = %account.id, active = account.is_active, "token request rejected");
            return Err(invalid_credentials());
        }

        let token = ApiToken::generate();
        self.tokens
            .store(&token.digest(), &account.id)
            .await
            .map_err(map_token_repository_error)?;
        info!(account_id = %account.id, "api token issued");
        Ok(token)
    }
}

fn empty_name() -> Error {
    field_error("name must not be empty", "name", "empty_name")
}

fn invalid_credentials() -> Error {
    Error::invalid_request(INVALID_CREDENTIALS)
        .with_details(json!({ "field": "credentials", "code": "invalid_credentials" }))
}

#[async_trait]
impl TokenAuthenticator for AccountService {
    async fn authenticate(&self, token: &ApiToken) -> Result<Account, Error> {
        let account_id = self
            .tokens
            .find_account(&token.digest())
            .await
            .map_err(map_token_repository_error)?
            .ok_or_else(|| Error::unauthorized("invalid token"))?;
        let account = self.load(&account_id).await?;
        if !account.is_active {
            return Err(Error::unauthorized("account is inactive"));
        }
        Ok(account)
    }
}

#[async_trait]
impl AccountProfileQuery for AccountService {
    async fn fetch_profile(&self, account_id: &AccountId) -> Result<AccountProfile, Error> {
        let account = self.load(account_id).await?;
        Ok(AccountProfile::from(&account))
    }
}

#[async_trait]
impl AccountProfileCommand for AccountService {
    async fn update_profile(
        &self,
        account_id: &AccountId,
        update: ProfileUpdate,
    ) -> Result<AccountProfile, Error> {
        let ProfileUpdate { name, password } = update;
        let mut account = self.load(account_id).await?;

        if let Some(name) = name {
            let name = AccountName::new(name).map_err(map_account_validation_error)?;
            if name.is_blank() {
                return Err(empty_name());
            }
            account.name = name;
        }
        if let Some(password) = password {
            self.check_policy(password.as_str())?;
            account.password = self
                .manager
                .hashing()
                .hash_blocking(Some(password))
                .await
                .map_err(|err| Error::internal(err.to_string()))?;
        }

        self.accounts
            .update(&account)
            .await
            .map_err(map_account_repository_error)?;
        info!(account_id = %account.id, "profile updated");
        Ok(AccountProfile::from(&account))
    }
}
