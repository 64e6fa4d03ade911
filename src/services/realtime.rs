//! Realtime service — per-user change-event fan-out.
//!
//! DESIGN
//! ======
//! Each websocket client registers a bounded sender under its user's
//! entry. Publishing walks only that user's clients, so one vendor's
//! writes never reach another vendor's sockets. Delivery is best-effort
//! `try_send`: subscribers refetch on every event, so a dropped
//! notification is repaired by the next one.

use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::event::ChangeEvent;
use crate::state::AppState;

/// Register a client's event channel under its user.
pub async fn subscribe(state: &AppState, user_id: Uuid, client_id: Uuid, tx: mpsc::Sender<ChangeEvent>) {
    let mut subscribers = state.subscribers.write().await;
    subscribers.entry(user_id).or_default().insert(client_id, tx);
    info!(%user_id, %client_id, "realtime: client subscribed");
}

/// Remove a client. Evicts the user's entry when no clients remain.
pub async fn unsubscribe(state: &AppState, user_id: Uuid, client_id: Uuid) {
    let mut subscribers = state.subscribers.write().await;
    let Some(clients) = subscribers.get_mut(&user_id) else {
        return;
    };

    clients.remove(&client_id);
    info!(%user_id, %client_id, remaining = clients.len(), "realtime: client unsubscribed");

    if clients.is_empty() {
        subscribers.remove(&user_id);
    }
}

/// Deliver an event to every client of its owning user.
pub async fn publish(state: &AppState, event: &ChangeEvent) {
    let subscribers = state.subscribers.read().await;
    let Some(clients) = subscribers.get(&event.user_id) else {
        return;
    };

    for tx in clients.values() {
        // Best-effort: if a client's channel is full, skip it.
        let _ = tx.try_send(event.clone());
    }
}

/// Number of live clients for a user. Zero once the entry is evicted.
pub async fn subscriber_count(state: &AppState, user_id: Uuid) -> usize {
    let subscribers = state.subscribers.read().await;
    subscribers.get(&user_id).map_or(0, std::collections::HashMap::len)
}

#[cfg(test)]
#[path = "realtime_test.rs"]
mod tests;
