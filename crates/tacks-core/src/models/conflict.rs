//! Sync conflict model

use serde::Serialize;
use uuid::Uuid;

use super::EntityKind;

/// An unresolved ambiguity between local and remote copies of one record.
///
/// Produced when both copies share `version` and `lastModified` but differ
/// in content. Held until the caller picks a side; the remote copy is
/// adopted provisionally in the meantime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConflict {
    /// Entity collection the record belongs to
    pub entity: EntityKind,
    /// Record id shared by both copies
    pub item_id: Uuid,
    /// Full local copy at detection time
    pub local: serde_json::Value,
    /// Full remote copy at detection time
    pub remote: serde_json::Value,
    /// Epoch ms when the conflict was detected
    pub detected_at: i64,
}

/// Caller's verdict on a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    /// Push the local copy back to the server as an update
    KeepLocal,
    /// Accept the already-adopted remote copy
    KeepRemote,
}
