//! Remote API seam between the sync engine and the HTTP route layer.
//!
//! The engine only ever sees this trait; the route layer, ORM, and auth
//! stack live behind it. Mutation bodies are JSON values because the
//! pending-change queue carries caller-supplied payloads verbatim.

mod http;
mod session;

pub use http::HttpApi;
pub use session::{Session, SessionHandle, SessionStatus};

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{Project, ProjectId, Tag, TagId, Task, TaskId};
use crate::Result;

/// Server operations the sync engine depends on.
///
/// Fetches are all-or-nothing per collection. Creates return the persisted
/// record including server-assigned fields; updates return the record with
/// an incremented version and fresh `lastModified`. Deletes are idempotent:
/// deleting an already-gone id succeeds.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Fetch the full task collection for the authenticated user.
    async fn fetch_tasks(&self) -> Result<Vec<Task>>;

    /// Fetch the full project collection.
    async fn fetch_projects(&self) -> Result<Vec<Project>>;

    /// Fetch the full tag collection.
    async fn fetch_tags(&self) -> Result<Vec<Tag>>;

    /// Create a task from a JSON payload.
    async fn create_task(&self, body: &Value) -> Result<Task>;

    /// Apply a partial update to a task.
    async fn update_task(&self, id: TaskId, body: &Value) -> Result<Task>;

    /// Delete a task.
    async fn delete_task(&self, id: TaskId) -> Result<()>;

    /// Create a project from a JSON payload.
    async fn create_project(&self, body: &Value) -> Result<Project>;

    /// Apply a partial update to a project.
    async fn update_project(&self, id: ProjectId, body: &Value) -> Result<Project>;

    /// Delete a project.
    async fn delete_project(&self, id: ProjectId) -> Result<()>;

    /// Create a tag from a JSON payload.
    async fn create_tag(&self, body: &Value) -> Result<Tag>;

    /// Apply a partial update to a tag.
    async fn update_tag(&self, id: TagId, body: &Value) -> Result<Tag>;

    /// Delete a tag.
    async fn delete_tag(&self, id: TagId) -> Result<()>;
}
