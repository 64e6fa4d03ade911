//! Change events — the wire types for the per-user notification feed.
//!
//! DESIGN
//! ======
//! Every write to a user's catalog produces one `ChangeEvent`. Subscribers
//! receive events for their own rows only; the dashboard reacts to any op
//! by refetching the list, so the payload carries the affected row as flat
//! JSON rather than a typed struct.
//!
//! Websocket frames are `ServerMessage`s: a `subscribed` handshake on
//! upgrade, then a stream of `change` messages until the socket closes.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Table name carried on catalog change events.
pub const SERVICES_TABLE: &str = "services";

// =============================================================================
// TYPES
// =============================================================================

/// Kind of row mutation a change event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// One row-level change, scoped to the owning user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub id: Uuid,
    /// Milliseconds since Unix epoch. Set automatically at construction.
    pub ts: i64,
    pub table: String,
    pub op: ChangeOp,
    pub user_id: Uuid,
    /// Flat JSON of the affected row. Deletes carry `{"id": ...}` only.
    pub record: serde_json::Value,
}

/// Outbound websocket message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once after upgrade, before any change events.
    Subscribed { client_id: Uuid, user_id: Uuid },
    Change(ChangeEvent),
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

/// Current time as milliseconds since Unix epoch.
fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

impl ChangeEvent {
    #[must_use]
    pub fn new(op: ChangeOp, user_id: Uuid, record: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            ts: now_ms(),
            table: SERVICES_TABLE.to_owned(),
            op,
            user_id,
            record,
        }
    }

    /// Event for a freshly inserted row.
    #[must_use]
    pub fn insert(user_id: Uuid, record: serde_json::Value) -> Self {
        Self::new(ChangeOp::Insert, user_id, record)
    }

    /// Event for a deleted row. Only the row id survives.
    #[must_use]
    pub fn delete(user_id: Uuid, row_id: Uuid) -> Self {
        Self::new(ChangeOp::Delete, user_id, serde_json::json!({ "id": row_id }))
    }
}

#[cfg(test)]
#[path = "event_test.rs"]
mod tests;
