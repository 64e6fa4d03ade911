//! Credential service — email normalization, password policy, Argon2
//! hashing, account registration and verification.
//!
//! ERROR HANDLING
//! ==============
//! `authenticate` collapses "no such email" and "wrong password" into one
//! `InvalidCredentials` variant so the login response never reveals which
//! half failed. Validation variants carry the messages the login form
//! shows inline.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Minimum password length accepted at registration and login.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

// =============================================================================
// VALIDATION
// =============================================================================

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return None;
    }
    let parts = normalized.split('@').collect::<Vec<_>>();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return None;
    }
    Some(normalized)
}

#[must_use]
pub fn password_long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

fn name_from_email(email: &str) -> String {
    let local = email
        .split('@')
        .next()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("vendor");
    local.to_owned()
}

// =============================================================================
// HASHING
// =============================================================================

/// Hash a password into a PHC string with a fresh OS-random salt.
///
/// # Errors
///
/// Returns `AuthError::Hash` if the hasher rejects the input.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a password against a stored PHC string.
#[must_use]
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// ACCOUNTS
// =============================================================================

/// Create a new account. Returns the user's UUID.
///
/// # Errors
///
/// Returns a validation error for a malformed email or short password,
/// `EmailTaken` when the address already has an account, or a database
/// error if the insert fails.
pub async fn register_user(
    pool: &PgPool,
    email: &str,
    password: &str,
    name: Option<&str>,
) -> Result<Uuid, AuthError> {
    let normalized = normalize_email(email).ok_or(AuthError::InvalidEmail)?;
    if !password_long_enough(password) {
        return Err(AuthError::PasswordTooShort);
    }

    let name = match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_owned(),
        _ => name_from_email(&normalized),
    };
    let password_hash = hash_password(password)?;

    let id = Uuid::new_v4();
    let row = sqlx::query(
        r"INSERT INTO users (id, email, name, password_hash)
          VALUES ($1, $2, $3, $4)
          ON CONFLICT (email) DO NOTHING
          RETURNING id",
    )
    .bind(id)
    .bind(&normalized)
    .bind(&name)
    .bind(&password_hash)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(r) => Ok(r.get("id")),
        None => Err(AuthError::EmailTaken),
    }
}

/// Verify an email/password pair. Returns the user's UUID.
///
/// # Errors
///
/// Returns `InvalidCredentials` for an unknown email or wrong password,
/// or a database error if the lookup fails.
pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> Result<Uuid, AuthError> {
    let normalized = normalize_email(email).ok_or(AuthError::InvalidCredentials)?;

    let row = sqlx::query("SELECT id, password_hash FROM users WHERE email = $1")
        .bind(&normalized)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Err(AuthError::InvalidCredentials);
    };

    let stored_hash: String = row.get("password_hash");
    if !verify_password(&stored_hash, password) {
        return Err(AuthError::InvalidCredentials);
    }

    Ok(row.get("id"))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
