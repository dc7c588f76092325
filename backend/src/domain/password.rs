//! Password hashing and password policy.
//!
//! Passwords are hashed with argon2id using a fresh random salt per hash and
//! stored as PHC strings. Verification reads the cost parameters back out of
//! the stored string, so tuning the work factor never strands existing
//! accounts.

use std::fmt;

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use super::TraceId;

/// Marker persisted for accounts that cannot log in with a password.
pub const UNUSABLE_PASSWORD_MARKER: &str = "!";

/// Default minimum password length enforced at the API boundary.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 10;

/// Errors raised while configuring or running the password hasher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordHashError {
    #[error("invalid argon2 parameters: {message}")]
    InvalidParams { message: String },
    #[error("password hashing failed: {message}")]
    Hashing { message: String },
    #[error("password hashing task aborted: {message}")]
    Aborted { message: String },
}

/// Stored form of an account password.
///
/// Never holds plaintext. `Debug` output omits the hash itself.
#[derive(Clone, PartialEq, Eq)]
pub enum PasswordDigest {
    /// argon2 PHC string.
    Hashed(String),
    /// No password was supplied; password login is impossible.
    Unusable,
}

impl PasswordDigest {
    /// Rebuild a digest from its persisted representation.
    pub fn from_stored(stored: impl Into<String>) -> Self {
        let stored = stored.into();
        if stored.starts_with(UNUSABLE_PASSWORD_MARKER) {
            Self::Unusable
        } else {
            Self::Hashed(stored)
        }
    }

    /// Representation written to storage.
    pub fn as_stored(&self) -> &str {
        match self {
            Self::Hashed(phc) => phc.as_str(),
            Self::Unusable => UNUSABLE_PASSWORD_MARKER,
        }
    }

    /// Whether the digest can ever match a candidate.
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Hashed(_))
    }

    /// Check `candidate` against the digest.
    ///
    /// Malformed stored hashes never verify.
    pub fn verify(&self, candidate: &str) -> bool {
        let Self::Hashed(phc) = self else {
            return false;
        };
        PasswordHash::new(phc)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(candidate.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hashed(_) => f.write_str("PasswordDigest::Hashed(..)"),
            Self::Unusable => f.write_str("PasswordDigest::Unusable"),
        }
    }
}

/// argon2id hasher with a configurable work factor.
#[derive(Debug, Clone)]
pub struct PasswordHashing {
    params: Params,
}

impl Default for PasswordHashing {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordHashing {
    /// Build a hasher from explicit argon2 costs.
    ///
    /// # Errors
    /// Returns [`PasswordHashError::InvalidParams`] when argon2 rejects the
    /// combination (for example memory below `8 * parallelism` KiB).
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, PasswordHashError> {
        let params = Params::new(memory_kib, iterations, parallelism, None).map_err(|err| {
            PasswordHashError::InvalidParams {
                message: err.to_string(),
            }
        })?;
        Ok(Self { params })
    }

    /// Hash `password` on the calling thread.
    ///
    /// # Errors
    /// Returns [`PasswordHashError::Hashing`] when argon2 fails.
    pub fn hash(&self, password: &str) -> Result<PasswordDigest, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let phc = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordHashError::Hashing {
                message: err.to_string(),
            })?;
        Ok(PasswordDigest::Hashed(phc.to_string()))
    }

    /// Hash an optional password on the blocking pool.
    ///
    /// `None` yields [`PasswordDigest::Unusable`] without hashing.
    ///
    /// # Errors
    /// Propagates hashing failures and reports a panicked worker as
    /// [`PasswordHashError::Aborted`].
    pub async fn hash_blocking(
        &self,
        password: Option<Zeroizing<String>>,
    ) -> Result<PasswordDigest, PasswordHashError> {
        let Some(password) = password else {
            return Ok(PasswordDigest::Unusable);
        };
        let hashing = self.clone();
        TraceId::spawn_blocking(move || hashing.hash(password.as_str()))
            .await
            .map_err(|err| PasswordHashError::Aborted {
                message: err.to_string(),
            })?
    }

    /// Verify `candidate` against `digest` on the blocking pool.
    pub async fn verify_blocking(digest: PasswordDigest, candidate: Zeroizing<String>) -> bool {
        if !digest.is_usable() {
            return false;
        }
        TraceId::spawn_blocking(move || digest.verify(candidate.as_str()))
            .await
            .unwrap_or(false)
    }
}

/// Rejection produced by [`PasswordPolicy::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyViolation {
    TooShort { min: usize },
}

impl fmt::Display for PasswordPolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { min } => write!(f, "password must be at least {min} characters"),
        }
    }
}

impl std::error::Error for PasswordPolicyViolation {}

/// Rules a new password must satisfy before it is hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PASSWORD_LENGTH)
    }
}

impl PasswordPolicy {
    /// Policy requiring at least `min_length` characters.
    #[must_use]
    pub const fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Minimum accepted length in characters.
    #[must_use]
    pub const fn min_length(&self) -> usize {
        self.min_length
    }

    /// Validate a candidate password.
    ///
    /// # Errors
    /// Returns [`PasswordPolicyViolation::TooShort`] when the password has
    /// fewer characters than the configured minimum.
    pub fn check(&self, password: &str) -> Result<(), PasswordPolicyViolation> {
        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyViolation::TooShort {
                min: self.min_length,
            });
        }
        Ok(())
    }
}
