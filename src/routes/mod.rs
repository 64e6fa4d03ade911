//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the API + websocket endpoints under one Axum router.
//! The login and dashboard pages are static assets served as the fallback,
//! so the whole application ships as a single process.

pub mod auth;
pub mod services;
pub mod ws;

use std::path::PathBuf;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Resolve the directory holding the dashboard pages.
fn public_dir() -> PathBuf {
    std::env::var("PUBLIC_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public"))
}

/// API routes plus the static dashboard fallback.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let pages = ServeDir::new(public_dir()).append_index_html_on_directories(true);

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/ws-ticket", post(auth::ws_ticket))
        .route("/api/services", get(services::list_services).post(services::create_service))
        .route("/api/services/summary", get(services::summary))
        .route("/api/services/{id}", delete(services::delete_service))
        .route("/api/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
        .fallback_service(pages)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
