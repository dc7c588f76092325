//! Domain primitives, services and ports.
//!
//! Purpose: hold the account and record model plus the use-cases the inbound
//! adapters drive. Nothing in here knows about HTTP or SQL.
//!
//! Public surface:
//! - [`Account`], [`AccountManager`] and the account value objects.
//! - [`PasswordHashing`] and [`PasswordPolicy`].
//! - [`Tag`], [`Ingredient`], [`Recipe`] and the [`OwnedRecord`] trait.
//! - [`AccountService`], [`NamedRecordService`], [`RecipeService`].
//! - [`Error`] and [`ErrorCode`], the transport-agnostic failure payload.

pub mod account;
pub mod account_manager;
pub mod account_service;
pub mod auth;
pub mod error;
pub mod password;
pub mod ports;
pub mod record_service;
pub mod records;
pub mod trace_id;

pub use self::account::{
    ACCOUNT_NAME_MAX, Account, AccountId, AccountName, AccountValidationError, EMAIL_MAX, Email,
};
pub use self::account_manager::{AccountCreationError, AccountExtras, AccountManager};
pub use self::account_service::AccountService;
pub use self::auth::{ApiToken, LoginCredentials, LoginValidationError, TokenDigest};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::password::{
    DEFAULT_MIN_PASSWORD_LENGTH, PasswordDigest, PasswordHashError, PasswordHashing,
    PasswordPolicy, PasswordPolicyViolation,
};
pub use self::record_service::{NamedRecordService, RecipeService};
pub use self::records::{
    Ingredient, NamedRecord, NamedRecordDraft, NamedRecordPatch, OwnedRecord, PRICE_MAX, Price,
    RECORD_TEXT_MAX, Recipe, RecipeDetail, RecipeDraft, RecipeFilter, RecipeLink, RecipePatch,
    RecordId, RecordKind, RecordName, RecordValidationError, TIME_MINUTES_MAX, Tag, TimeMinutes,
    dedup_ids, listing_order, sort_for_listing,
};
pub use self::trace_id::TraceId;

/// Convenient result alias for domain use-cases.
pub type ApiResult<T> = Result<T, Error>;
