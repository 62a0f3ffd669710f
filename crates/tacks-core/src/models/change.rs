//! Pending change model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ChangeAction, EntityKind};

/// A locally issued mutation not yet confirmed durable on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingChange {
    /// Which entity collection the change targets
    pub entity: EntityKind,
    /// Create, update, or delete
    pub action: ChangeAction,
    /// Target record id (client-generated for creates)
    pub id: Uuid,
    /// JSON body for create/update; absent for delete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Epoch ms when the change was queued
    pub queued_at: i64,
    /// Failed delivery attempts so far
    pub retry_count: u32,
}

impl PendingChange {
    /// Composite identity disambiguating multiple edits to the same id.
    #[must_use]
    pub const fn key(&self) -> ChangeKey {
        ChangeKey {
            id: self.id,
            queued_at: self.queued_at,
        }
    }
}

/// Caller-facing shape for queueing a change.
///
/// `queued_at` and `retry_count` are stamped on enqueue.
#[derive(Debug, Clone)]
pub struct ChangeDraft {
    pub entity: EntityKind,
    pub action: ChangeAction,
    pub id: Uuid,
    pub data: Option<serde_json::Value>,
}

/// Identity of a queued change: id plus queue timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeKey {
    pub id: Uuid,
    pub queued_at: i64,
}
