//! Service catalog routes — list, create, delete, and the dashboard summary.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::event::ChangeEvent;
use crate::routes::auth::AuthUser;
use crate::services::catalog::{self, CatalogError, ServiceRecord};
use crate::services::realtime;
use crate::state::AppState;

pub(crate) fn catalog_error_response(err: &CatalogError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err {
        CatalogError::InvalidName | CatalogError::InvalidPrice => StatusCode::UNPROCESSABLE_ENTITY,
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /api/services` — list the authenticated user's services, newest first.
pub async fn list_services(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ServiceRecord>>, (StatusCode, Json<serde_json::Value>)> {
    let rows = catalog::list_services(&state.pool, auth.user.id)
        .await
        .map_err(|e| catalog_error_response(&e))?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct CreateServiceBody {
    pub name: String,
    pub price: f64,
}

/// `POST /api/services` — insert one service and notify the owner's subscribers.
pub async fn create_service(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateServiceBody>,
) -> Result<(StatusCode, Json<ServiceRecord>), (StatusCode, Json<serde_json::Value>)> {
    let record = catalog::create_service(&state.pool, auth.user.id, &body.name, body.price)
        .await
        .map_err(|e| catalog_error_response(&e))?;

    tracing::info!(user_id = %auth.user.id, service_id = %record.id, "service created");

    let payload = serde_json::to_value(&record).unwrap_or_default();
    realtime::publish(&state, &ChangeEvent::insert(auth.user.id, payload)).await;

    Ok((StatusCode::CREATED, Json(record)))
}

/// `DELETE /api/services/:id` — delete one of the user's services.
pub async fn delete_service(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(service_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    catalog::delete_service(&state.pool, auth.user.id, service_id)
        .await
        .map_err(|e| catalog_error_response(&e))?;

    tracing::info!(user_id = %auth.user.id, %service_id, "service deleted");
    realtime::publish(&state, &ChangeEvent::delete(auth.user.id, service_id)).await;

    Ok(Json(json!({ "ok": true })))
}

/// The dashboard's stats cards. Bookings and earnings have no backing
/// subsystem and are always zero.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub services: i64,
    pub bookings: i64,
    pub earnings: f64,
}

/// `GET /api/services/summary` — counts for the dashboard stats cards.
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<SummaryResponse>, (StatusCode, Json<serde_json::Value>)> {
    let services = catalog::count_services(&state.pool, auth.user.id)
        .await
        .map_err(|e| catalog_error_response(&e))?;

    Ok(Json(SummaryResponse { services, bookings: 0, earnings: 0.0 }))
}

#[cfg(test)]
#[path = "services_test.rs"]
mod tests;
