//! Service catalog — the vendor's offered services.
//!
//! DESIGN
//! ======
//! A service record belongs to exactly one user; every query here is
//! scoped by `user_id` so a session can only ever see or touch its own
//! rows. Listing is newest-first. Records are written once: creation and
//! deletion only, no updates.

use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("service name must not be empty")]
    InvalidName,
    #[error("price must be a positive number")]
    InvalidPrice,
    #[error("service not found: {0}")]
    NotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One vendor-offered service, scoped to its owning user.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ServiceRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub price: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Trim and validate a service name.
#[must_use]
pub fn normalize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_owned())
}

/// A price must be a finite, strictly positive number.
#[must_use]
pub fn price_is_valid(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

// =============================================================================
// CRUD
// =============================================================================

/// Insert a new service for the given user.
///
/// # Errors
///
/// Returns a validation error for a blank name or non-positive price,
/// or a database error if the insert fails.
pub async fn create_service(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    price: f64,
) -> Result<ServiceRecord, CatalogError> {
    let name = normalize_name(name).ok_or(CatalogError::InvalidName)?;
    if !price_is_valid(price) {
        return Err(CatalogError::InvalidPrice);
    }

    let id = Uuid::new_v4();
    let row = sqlx::query(
        "INSERT INTO services (id, user_id, name, price) VALUES ($1, $2, $3, $4) RETURNING created_at",
    )
    .bind(id)
    .bind(user_id)
    .bind(&name)
    .bind(price)
    .fetch_one(pool)
    .await?;

    Ok(ServiceRecord { id, user_id, name, price, created_at: row.get("created_at") })
}

/// List the user's services, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_services(pool: &PgPool, user_id: Uuid) -> Result<Vec<ServiceRecord>, CatalogError> {
    let rows = sqlx::query_as::<_, (Uuid, Uuid, String, f64, OffsetDateTime)>(
        "SELECT id, user_id, name, price, created_at
         FROM services
         WHERE user_id = $1
         ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, user_id, name, price, created_at)| ServiceRecord { id, user_id, name, price, created_at })
        .collect())
}

/// Delete one of the user's services.
///
/// # Errors
///
/// Returns `NotFound` when the id does not exist or belongs to another
/// user, or a database error if the delete fails.
pub async fn delete_service(pool: &PgPool, user_id: Uuid, service_id: Uuid) -> Result<(), CatalogError> {
    let result = sqlx::query("DELETE FROM services WHERE id = $1 AND user_id = $2")
        .bind(service_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CatalogError::NotFound(service_id));
    }
    Ok(())
}

/// Count the user's services.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn count_services(pool: &PgPool, user_id: Uuid) -> Result<i64, CatalogError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM services WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
