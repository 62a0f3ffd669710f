//! Data models for Tacks

mod change;
mod conflict;
mod project;
mod record;
mod tag;
mod task;

pub use change::{ChangeDraft, ChangeKey, PendingChange};
pub use conflict::{ConflictResolution, SyncConflict};
pub use project::{is_hex_color, Project, ProjectDraft, ProjectId, ProjectPatch};
pub use record::{ChangeAction, EntityKind, SyncStatus, Syncable};
pub use tag::{Tag, TagDraft, TagId, TagPatch};
pub use task::{Priority, Task, TaskDraft, TaskId, TaskPatch, TaskStatus};
