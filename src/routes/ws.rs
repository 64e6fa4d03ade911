//! WebSocket handler — the per-user change feed.
//!
//! LIFECYCLE
//! =========
//! 1. Client POSTs `/api/auth/ws-ticket`, then upgrades with `?ticket=...`
//! 2. Upgrade consumes the ticket → `subscribed` message with `client_id`
//! 3. Change events for the user flow until the socket closes
//! 4. Close → unsubscribe → user entry evicted when no clients remain
//!
//! Inbound messages are ignored: the feed is one-way, and clients react
//! to any event by refetching over REST.

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::event::{ChangeEvent, ServerMessage};
use crate::services::{realtime, session};
use crate::state::AppState;

/// Outgoing channel capacity per client.
const CLIENT_CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(ticket) = ticket_from_params(&params) else {
        return (StatusCode::UNAUTHORIZED, "ticket required").into_response();
    };

    let user_id = match session::consume_ws_ticket(&state.pool, ticket).await {
        Ok(Some(uid)) => uid,
        Ok(None) => return (StatusCode::UNAUTHORIZED, "invalid or expired ticket").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "ws ticket validation failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "ticket validation error").into_response();
        }
    };

    ws.on_upgrade(move |socket| run_ws(socket, state, user_id))
}

pub(crate) fn ticket_from_params(params: &HashMap<String, String>) -> Option<&str> {
    params.get("ticket").map(String::as_str).filter(|t| !t.is_empty())
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, user_id: Uuid) {
    let client_id = Uuid::new_v4();

    let (client_tx, mut client_rx) = mpsc::channel::<ChangeEvent>(CLIENT_CHANNEL_CAPACITY);
    realtime::subscribe(&state, user_id, client_id, client_tx).await;

    let welcome = ServerMessage::Subscribed { client_id, user_id };
    if send_message(&mut socket, &welcome).await.is_err() {
        realtime::unsubscribe(&state, user_id, client_id).await;
        return;
    }

    info!(%client_id, %user_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Close(_) => break,
                    // One-way feed: inbound text/binary is ignored.
                    _ => {}
                }
            }
            Some(event) = client_rx.recv() => {
                if send_message(&mut socket, &ServerMessage::Change(event)).await.is_err() {
                    break;
                }
            }
        }
    }

    realtime::unsubscribe(&state, user_id, client_id).await;
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// HELPERS
// =============================================================================

pub(crate) fn encode_message(message: &ServerMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(json) => Some(json),
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize message");
            None
        }
    }
}

async fn send_message(socket: &mut WebSocket, message: &ServerMessage) -> Result<(), ()> {
    let Some(json) = encode_message(message) else {
        return Err(());
    };
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
