//! Password strength validation and hashing.
//!
//! Passwords enter as raw strings, get checked against [zxcvbn]'s strength
//! estimate, and are only ever stored as bcrypt hashes.

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use serde::{Deserialize, Serialize};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A raw password that passed the strength check.
///
/// The only way to hash a password is through this type, so weak passwords
/// cannot sneak into the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Validate `raw_password` against the zxcvbn strength estimate.
    ///
    /// # Errors
    /// Returns [Error::TooWeak] for passwords scoring below three out of
    /// four. The error message carries zxcvbn's feedback so the client can
    /// tell the user how to pick a stronger password.
    pub fn new(raw_password: &str) -> Result<Self, Error> {
        let analysis = zxcvbn(raw_password, &[]);

        match analysis.score() {
            Score::Three | Score::Four => Ok(Self(raw_password.to_string())),
            _ => Err(Error::TooWeak(
                analysis
                    .feedback()
                    .unwrap_or(&Feedback::default())
                    .to_string(),
            )),
        }
    }

    /// Wrap `raw_password` without checking its strength.
    ///
    /// Not `unsafe` since a weak password cannot break memory safety, but the
    /// caller takes responsibility for the password being acceptable.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_string())
    }
}

impl Display for ValidatedPassword {
    // Never print the raw password, not even in debug logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", str::repeat("*", 8))
    }
}

/// A salted bcrypt hash of a user's password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The recommended hashing cost.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash a validated password with the given bcrypt `cost`.
    ///
    /// Higher costs slow down both hashing and verification; use
    /// [PasswordHash::DEFAULT_COST] outside of tests.
    ///
    /// # Errors
    /// Returns [Error::HashingError] if bcrypt rejects the input.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap an existing hash string, e.g. one loaded from the database.
    ///
    /// The caller takes responsibility for the string being a valid bcrypt
    /// hash.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_string())
    }

    /// Validate and hash a raw password in one step.
    ///
    /// # Errors
    /// Returns [Error::TooWeak] or [Error::HashingError] as the two steps do.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        let validated = ValidatedPassword::new(raw_password)?;
        PasswordHash::new(validated, cost)
    }

    /// Check whether `raw_password` matches this hash.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }

    /// The hash as the string stored in the database.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
