//! Identity layer for delivery driver login accounts.
//!
//! Each driver is tied 1:1 to an email/password account. Provisioning the
//! account and inserting the driver row are independent writes: if the driver
//! insert fails afterwards, the account stays behind as an orphan (logged by
//! the caller, never rolled back).

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use thiserror::Error;

use terra_verde_core::{DriverAccountId, Email, EmailError};

use crate::db::is_unique_violation;

/// Minimum password length for driver accounts.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// An account with this email already exists.
    #[error("account already exists for this email")]
    EmailTaken,

    /// Wrong password or unknown account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Service for provisioning and verifying driver accounts.
#[derive(Clone)]
pub struct IdentityService {
    pool: PgPool,
}

impl IdentityService {
    /// Create the identity service on the shared pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Provision a new driver account with email/password credentials.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidEmail` or `IdentityError::WeakPassword`
    /// for rejected input, `IdentityError::EmailTaken` for a duplicate email,
    /// or `IdentityError::Database` if the insert fails.
    pub async fn provision(
        &self,
        email: &str,
        password: &str,
    ) -> Result<DriverAccountId, IdentityError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let row: (i32,) = sqlx::query_as(
            "INSERT INTO driver_accounts (email, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                IdentityError::EmailTaken
            } else {
                IdentityError::Database(e)
            }
        })?;

        Ok(DriverAccountId::new(row.0))
    }

    /// Verify email/password credentials against a stored account.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidCredentials` for an unknown email or a
    /// wrong password, or `IdentityError::Database` if the lookup fails.
    pub async fn verify(
        &self,
        email: &str,
        password: &str,
    ) -> Result<DriverAccountId, IdentityError> {
        let email = Email::parse(email)?;

        let row: Option<(i32, String)> =
            sqlx::query_as("SELECT id, password_hash FROM driver_accounts WHERE email = $1")
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await?;

        let (id, stored_hash) = row.ok_or(IdentityError::InvalidCredentials)?;
        verify_password(password, &stored_hash)?;

        Ok(DriverAccountId::new(id))
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), IdentityError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(IdentityError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| IdentityError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), IdentityError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| IdentityError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| IdentityError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").expect("hash");
        assert!(verify_password("correct horse battery", &hash).is_ok());
    }

    #[test]
    fn test_wrong_password_fails_verification() {
        let hash = hash_password("correct horse battery").expect("hash");
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same password").expect("hash");
        let second = hash_password("same password").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(IdentityError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-hash"),
            Err(IdentityError::InvalidCredentials)
        ));
    }
}
