//! Shared sync metadata carried by every record that participates in merging.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sync bookkeeping tag on the local copy of a record.
///
/// Informational only; merge resolution never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Matches the last known server copy
    #[default]
    Synced,
    /// Has a local mutation not yet confirmed durable
    Pending,
    /// Involved in an unresolved merge conflict
    Conflict,
}

/// Entity kinds that flow through the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Task,
    Project,
    Tag,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task => write!(f, "task"),
            Self::Project => write!(f, "project"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

/// Mutation kinds a pending change can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
}

/// Records carrying the version/last-modified pair used for merge resolution.
///
/// `version` and `last_modified` are monotonically non-decreasing per id as
/// observed by one client; the merge engine never regresses either for a
/// kept record.
pub trait Syncable {
    /// Stable identity used to pair local and remote copies.
    fn merge_id(&self) -> Uuid;

    /// Server-incremented update counter, starting at 1.
    fn version(&self) -> i64;

    /// Epoch milliseconds of the latest known mutation.
    fn last_modified(&self) -> i64;
}
