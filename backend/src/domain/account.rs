//! Account identity model.
//!
//! Accounts are only ever constructed through
//! [`AccountManager`](super::AccountManager), which normalizes the email and
//! hashes the password before anything is persisted.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PasswordDigest;

/// Maximum stored length of an email address.
pub const EMAIL_MAX: usize = 255;
/// Maximum stored length of an account display name.
pub const ACCOUNT_NAME_MAX: usize = 255;

/// Validation errors for account fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyEmail,
    EmailTooLong { max: usize },
    InvalidEmailFormat,
    AccountNameTooLong { max: usize },
    InvalidId,
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::InvalidEmailFormat => write!(f, "email must be a valid address"),
            Self::AccountNameTooLong { max } => {
                write!(f, "name must be at most {max} characters")
            }
            Self::InvalidId => write!(f, "account id must be a valid UUID"),
        }
    }
}

impl std::error::Error for AccountValidationError {}

/// Stable account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::str::FromStr for AccountId {
    type Err = AccountValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| AccountValidationError::InvalidId)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Email address with a lowercased domain.
///
/// # Examples
/// ```
/// use recipe_backend::domain::Email;
///
/// let email = Email::normalize("Chef@EXAMPLE.COM").expect("valid email");
/// assert_eq!(email.as_ref(), "Chef@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // One `@` and no whitespace; dotless domains pass.
        let pattern = r"^[^@\s]+@[^@\s]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

impl Email {
    /// Trim, then lowercase the part after the last `@`.
    ///
    /// The local part keeps its casing. Input without an `@` is kept as
    /// given; [`Email::require_valid_format`] rejects it where that matters.
    pub fn normalize(raw: &str) -> Result<Self, AccountValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AccountValidationError::EmptyEmail);
        }
        let normalized = match trimmed.rsplit_once('@') {
            Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
            None => trimmed.to_owned(),
        };
        if normalized.chars().count() > EMAIL_MAX {
            return Err(AccountValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        Ok(Self(normalized))
    }

    /// Reject addresses that are not shaped like `local@domain`.
    pub fn require_valid_format(&self) -> Result<(), AccountValidationError> {
        if email_regex().is_match(&self.0) {
            Ok(())
        } else {
            Err(AccountValidationError::InvalidEmailFormat)
        }
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalize(&value)
    }
}

/// Display name attached to an account. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountName(String);

impl AccountName {
    /// Validate and construct a name.
    pub fn new(name: impl Into<String>) -> Result<Self, AccountValidationError> {
        let name = name.into();
        if name.chars().count() > ACCOUNT_NAME_MAX {
            return Err(AccountValidationError::AccountNameTooLong {
                max: ACCOUNT_NAME_MAX,
            });
        }
        Ok(Self(name))
    }

    /// Whether the name is blank.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl AsRef<str> for AccountName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<AccountName> for String {
    fn from(value: AccountName) -> Self {
        value.0
    }
}

impl TryFrom<String> for AccountName {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Authenticatable identity record.
///
/// The password digest is deliberately not serializable.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub email: Email,
    pub name: AccountName,
    pub password: PasswordDigest,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Build a fresh active, unprivileged account.
    #[must_use]
    pub fn new(email: Email, name: AccountName, password: PasswordDigest) -> Self {
        Self {
            id: AccountId::random(),
            email,
            name,
            password,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: Utc::now(),
        }
    }

    /// Check a plaintext candidate against the stored digest.
    pub fn check_password(&self, candidate: &str) -> bool {
        self.password.verify(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("test@EMAIL.COM", "test@email.com")]
    #[case("Mixed.Case@Example.Org", "Mixed.Case@example.org")]
    #[case("  padded@Host.io  ", "padded@host.io")]
    #[case("quoted\"@\"local@DOMAIN.test", "quoted\"@\"local@domain.test")]
    #[case("no-at-sign", "no-at-sign")]
    fn normalize_lowercases_only_the_domain(#[case] raw: &str, #[case] expected: &str) {
        let email = Email::normalize(raw).expect("non-empty email normalizes");
        assert_eq!(email.as_ref(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn normalize_rejects_blank_input(#[case] raw: &str) {
        assert_eq!(Email::normalize(raw), Err(AccountValidationError::EmptyEmail));
    }

    #[rstest]
    fn normalize_rejects_overlong_input() {
        let raw = format!("{}@example.com", "a".repeat(EMAIL_MAX));
        assert_eq!(
            Email::normalize(&raw),
            Err(AccountValidationError::EmailTooLong { max: EMAIL_MAX })
        );
    }

    #[rstest]
    fn domain_case_variants_collide() {
        let first = Email::normalize("a@B.com").expect("valid");
        let second = Email::normalize("a@b.com").expect("valid");
        assert_eq!(first, second);
    }

    #[rstest]
    #[case("one", false)]
    #[case("two@", false)]
    #[case("white space@example.com", false)]
    #[case("chef@kitchen", true)]
    #[case("chef@example.com", true)]
    fn format_check(#[case] raw: &str, #[case] valid: bool) {
        let email = Email::normalize(raw).expect("non-empty");
        assert_eq!(email.require_valid_format().is_ok(), valid);
    }

    #[rstest]
    fn account_name_enforces_maximum() {
        assert!(AccountName::new("a".repeat(ACCOUNT_NAME_MAX)).is_ok());
        assert_eq!(
            AccountName::new("a".repeat(ACCOUNT_NAME_MAX + 1)),
            Err(AccountValidationError::AccountNameTooLong {
                max: ACCOUNT_NAME_MAX
            })
        );
    }

    #[rstest]
    fn new_accounts_are_active_and_unprivileged() {
        let account = Account::new(
            Email::normalize("chef@example.com").expect("valid"),
            AccountName::default(),
            PasswordDigest::Unusable,
        );
        assert!(account.is_active);
        assert!(!account.is_staff);
        assert!(!account.is_superuser);
        assert!(!account.check_password(""));
    }

    #[rstest]
    fn account_id_parses_uuid_strings() {
        let id = AccountId::random();
        let parsed: AccountId = id.to_string().parse().expect("round trip");
        assert_eq!(parsed, id);
        assert!("nope".parse::<AccountId>().is_err());
    }
}
