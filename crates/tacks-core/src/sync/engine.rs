//! Client-side synchronization engine.
//!
//! Owns the in-memory collections, the pending-change queue, and the
//! unresolved-conflict list for one authenticated session. All network
//! traffic goes through the injected [`RemoteApi`]; all collection state is
//! mutated only from this engine's own methods, behind one lock.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::{watch, Mutex};
use uuid::Uuid;

use crate::api::{RemoteApi, SessionStatus};
use crate::config::SyncSettings;
use crate::models::{
    is_hex_color, ChangeAction, ChangeDraft, ChangeKey, ConflictResolution, EntityKind,
    PendingChange, Project, ProjectDraft, ProjectId, ProjectPatch, SyncConflict, Syncable, Tag,
    TagDraft, TagId, TagPatch, Task, TaskDraft, TaskId, TaskPatch,
};
use crate::state::{EngineStatus, SyncPhase};
use crate::util::unix_timestamp_ms;
use crate::{Error, Result};

use super::merge;
use super::queue::{FailureOutcome, PendingQueue};

/// What a call to [`SyncEngine::load`] actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Fetches ran and the merge was applied
    Completed,
    /// Another load or drain held the guard; nothing was fetched
    AlreadyInFlight,
    /// No authenticated session; nothing was fetched
    NotAuthenticated,
}

/// Tally of one drain pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainReport {
    /// Changes confirmed durable and removed
    pub delivered: usize,
    /// Changes kept for a later pass
    pub requeued: usize,
    /// Changes dropped after exhausting retries
    pub abandoned: usize,
}

impl DrainReport {
    /// Total deliveries attempted during the pass.
    #[must_use]
    pub const fn attempted(&self) -> usize {
        self.delivered + self.requeued + self.abandoned
    }
}

#[derive(Default)]
struct EngineState {
    tasks: Vec<Task>,
    projects: Vec<Project>,
    tags: Vec<Tag>,
    queue: PendingQueue,
    conflicts: Vec<SyncConflict>,
    status: EngineStatus,
}

/// Synchronization engine for one session's task/project/tag collections.
pub struct SyncEngine<A> {
    api: Arc<A>,
    settings: SyncSettings,
    session: watch::Receiver<SessionStatus>,
    state: Mutex<EngineState>,
    // One token guards both reloads and drains so they never mutate the
    // collections in the same tick.
    sync_gate: Mutex<()>,
    queue_size: watch::Sender<usize>,
}

impl<A: RemoteApi> SyncEngine<A> {
    /// Create an engine over the given API, session signal, and settings.
    pub fn new(
        api: Arc<A>,
        session: watch::Receiver<SessionStatus>,
        settings: SyncSettings,
    ) -> Self {
        let (queue_size, _) = watch::channel(0);
        Self {
            api,
            settings,
            session,
            state: Mutex::new(EngineState::default()),
            sync_gate: Mutex::new(()),
            queue_size,
        }
    }

    /// Settings this engine was built with.
    #[must_use]
    pub const fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Fresh subscription to the session signal.
    #[must_use]
    pub fn session_watch(&self) -> watch::Receiver<SessionStatus> {
        self.session.clone()
    }

    /// Subscription to the queue size, for drain scheduling.
    #[must_use]
    pub fn queue_watch(&self) -> watch::Receiver<usize> {
        self.queue_size.subscribe()
    }

    /// Snapshot of the engine status.
    pub async fn status(&self) -> EngineStatus {
        self.state.lock().await.status.clone()
    }

    /// Whether the initial load attempt has settled.
    pub async fn has_loaded_once(&self) -> bool {
        self.state.lock().await.status.has_loaded_once
    }

    /// Copy of the task collection.
    pub async fn tasks(&self) -> Vec<Task> {
        self.state.lock().await.tasks.clone()
    }

    /// Copy of the project collection.
    pub async fn projects(&self) -> Vec<Project> {
        self.state.lock().await.projects.clone()
    }

    /// Copy of the tag collection.
    pub async fn tags(&self) -> Vec<Tag> {
        self.state.lock().await.tags.clone()
    }

    /// Copy of the unresolved conflicts.
    pub async fn conflicts(&self) -> Vec<SyncConflict> {
        self.state.lock().await.conflicts.clone()
    }

    /// Number of queued pending changes.
    pub async fn pending_changes(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    /// Hand over changes abandoned since the last call.
    pub async fn take_abandoned(&self) -> Vec<PendingChange> {
        self.state.lock().await.queue.take_abandoned()
    }

    /// Perform a full load: fetch all three collections and merge them into
    /// local state.
    ///
    /// A load arriving while another load or drain holds the guard is
    /// dropped, not queued; two rapid calls cost one round-trip per entity
    /// type. The initial load uses the tighter fetch timeout and drives the
    /// `Loading` phase.
    pub async fn load(&self, initial: bool) -> Result<LoadOutcome> {
        if !self.session.borrow().is_authenticated() {
            tracing::debug!("load skipped: no authenticated session");
            return Ok(LoadOutcome::NotAuthenticated);
        }
        let Ok(_gate) = self.sync_gate.try_lock() else {
            tracing::debug!("load skipped: a sync pass is already in flight");
            return Ok(LoadOutcome::AlreadyInFlight);
        };

        {
            let mut state = self.state.lock().await;
            if initial {
                state.status.phase = SyncPhase::Loading;
            }
            state.status.is_syncing = true;
            state.status.last_error = None;
        }

        let result = self.load_collections(initial).await;

        // Settle the attempt on every exit path so callers are never stuck
        // waiting on `Loading`.
        {
            let mut state = self.state.lock().await;
            state.status.phase = SyncPhase::Ready;
            state.status.is_syncing = false;
            state.status.has_loaded_once = true;
            if let Err(error) = &result {
                state.status.last_error = Some(error.to_string());
            }
        }

        result.map(|()| LoadOutcome::Completed)
    }

    async fn load_collections(&self, initial: bool) -> Result<()> {
        if !initial {
            let queued = self.state.lock().await.queue.len();
            if queued > 0 {
                self.drain_queue().await;
            }
        }

        let limit = if initial {
            self.settings.initial_fetch_timeout
        } else {
            self.settings.reload_fetch_timeout
        };

        let (tasks, projects, tags) = tokio::join!(
            timed(limit, self.api.fetch_tasks()),
            timed(limit, self.api.fetch_projects()),
            timed(limit, self.api.fetch_tags()),
        );

        // A task failure fails the whole load; project/tag failures degrade
        // to empty collections so tasks still render through a partial
        // backend outage.
        let remote_tasks = tasks?;
        let remote_projects = projects.unwrap_or_else(|error| {
            tracing::warn!(%error, "project fetch failed; merging empty collection");
            Vec::new()
        });
        let remote_tags = tags.unwrap_or_else(|error| {
            tracing::warn!(%error, "tag fetch failed; merging empty collection");
            Vec::new()
        });

        let mut state = self.state.lock().await;
        let mut fresh = Vec::new();
        merge_into(&mut state.tasks, remote_tasks, EntityKind::Task, &mut fresh)?;
        merge_into(
            &mut state.projects,
            remote_projects,
            EntityKind::Project,
            &mut fresh,
        )?;
        merge_into(&mut state.tags, remote_tags, EntityKind::Tag, &mut fresh)?;

        if !fresh.is_empty() {
            tracing::info!(count = fresh.len(), "merge surfaced conflicts");
            absorb_conflicts(&mut state.conflicts, fresh);
        }
        Ok(())
    }

    /// Queue a fire-and-forget mutation for retried delivery.
    pub async fn queue_change(&self, draft: ChangeDraft) -> ChangeKey {
        let (key, len) = {
            let mut state = self.state.lock().await;
            let key = state.queue.push(draft);
            (key, state.queue.len())
        };
        self.queue_size.send_replace(len);
        key
    }

    /// Attempt to deliver every queued change, in queue order.
    pub async fn drain_pending(&self) -> DrainReport {
        let _gate = self.sync_gate.lock().await;
        self.set_syncing(true).await;
        let report = self.drain_queue().await;
        self.set_syncing(false).await;
        report
    }

    async fn drain_queue(&self) -> DrainReport {
        let pass = self.state.lock().await.queue.snapshot();
        if pass.is_empty() {
            return DrainReport::default();
        }

        tracing::debug!(queued = pass.len(), "draining pending changes");
        let mut report = DrainReport::default();

        // Sequential on purpose: concurrent delivery could reorder edits to
        // the same record. A failure does not block the rest of the pass.
        for change in pass {
            let delivered = self.deliver(&change).await;
            let mut state = self.state.lock().await;
            match delivered {
                Ok(()) => {
                    state.queue.record_success(change.key());
                    report.delivered += 1;
                }
                Err(error) => {
                    tracing::debug!(
                        entity = %change.entity,
                        id = %change.id,
                        %error,
                        "pending change delivery failed"
                    );
                    match state
                        .queue
                        .record_failure(change.key(), self.settings.max_retries)
                    {
                        FailureOutcome::Requeued(_) => report.requeued += 1,
                        FailureOutcome::Abandoned => report.abandoned += 1,
                    }
                }
            }
        }

        let remaining = {
            let mut state = self.state.lock().await;
            state.queue.sweep();
            state.queue.len()
        };
        self.queue_size.send_replace(remaining);
        report
    }

    async fn deliver(&self, change: &PendingChange) -> Result<()> {
        match change.action {
            ChangeAction::Delete => match change.entity {
                EntityKind::Task => self.api.delete_task(TaskId::from(change.id)).await,
                EntityKind::Project => self.api.delete_project(ProjectId::from(change.id)).await,
                EntityKind::Tag => self.api.delete_tag(TagId::from(change.id)).await,
            },
            ChangeAction::Create => {
                let body = change_body(change)?;
                match change.entity {
                    EntityKind::Task => self.api.create_task(body).await.map(drop),
                    EntityKind::Project => self.api.create_project(body).await.map(drop),
                    EntityKind::Tag => self.api.create_tag(body).await.map(drop),
                }
            }
            ChangeAction::Update => {
                let body = change_body(change)?;
                match change.entity {
                    EntityKind::Task => self
                        .api
                        .update_task(TaskId::from(change.id), body)
                        .await
                        .map(drop),
                    EntityKind::Project => self
                        .api
                        .update_project(ProjectId::from(change.id), body)
                        .await
                        .map(drop),
                    EntityKind::Tag => self
                        .api
                        .update_tag(TagId::from(change.id), body)
                        .await
                        .map(drop),
                }
            }
        }
    }

    /// Create a task optimistically and splice the confirmed record in.
    pub async fn add_task(&self, draft: TaskDraft) -> Result<Task> {
        if draft.title.trim().is_empty() {
            return Err(Error::InvalidInput("task title cannot be empty".into()));
        }
        let mut payload = serde_json::to_value(&draft)?;
        stamp_create(&mut payload)?;
        let task = self.api.create_task(&payload).await?;
        self.state.lock().await.tasks.push(task.clone());
        Ok(task)
    }

    /// Apply a partial update to a task.
    pub async fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<Task> {
        let mut payload = serde_json::to_value(&patch)?;
        stamp_update(&mut payload)?;
        let task = self.api.update_task(id, &payload).await?;
        let mut state = self.state.lock().await;
        if let Some(slot) = state.tasks.iter_mut().find(|t| t.id == id) {
            *slot = task.clone();
        }
        Ok(task)
    }

    /// Delete a task.
    pub async fn delete_task(&self, id: TaskId) -> Result<()> {
        self.api.delete_task(id).await?;
        self.state.lock().await.tasks.retain(|t| t.id != id);
        Ok(())
    }

    /// Create a project optimistically.
    pub async fn add_project(&self, draft: ProjectDraft) -> Result<Project> {
        if draft.name.trim().is_empty() {
            return Err(Error::InvalidInput("project name cannot be empty".into()));
        }
        if !is_hex_color(&draft.color) {
            return Err(Error::InvalidInput(format!(
                "invalid project color: {}",
                draft.color
            )));
        }
        let mut payload = serde_json::to_value(&draft)?;
        stamp_create(&mut payload)?;
        let project = self.api.create_project(&payload).await?;
        self.state.lock().await.projects.push(project.clone());
        Ok(project)
    }

    /// Apply a partial update to a project.
    pub async fn update_project(&self, id: ProjectId, patch: ProjectPatch) -> Result<Project> {
        if let Some(color) = &patch.color {
            if !is_hex_color(color) {
                return Err(Error::InvalidInput(format!(
                    "invalid project color: {color}"
                )));
            }
        }
        let mut payload = serde_json::to_value(&patch)?;
        stamp_update(&mut payload)?;
        let project = self.api.update_project(id, &payload).await?;
        let mut state = self.state.lock().await;
        if let Some(slot) = state.projects.iter_mut().find(|p| p.id == id) {
            *slot = project.clone();
        }
        Ok(project)
    }

    /// Delete a project.
    pub async fn delete_project(&self, id: ProjectId) -> Result<()> {
        self.api.delete_project(id).await?;
        self.state.lock().await.projects.retain(|p| p.id != id);
        Ok(())
    }

    /// Create a tag optimistically.
    pub async fn add_tag(&self, draft: TagDraft) -> Result<Tag> {
        if draft.name.trim().is_empty() {
            return Err(Error::InvalidInput("tag name cannot be empty".into()));
        }
        if !is_hex_color(&draft.color) {
            return Err(Error::InvalidInput(format!(
                "invalid tag color: {}",
                draft.color
            )));
        }
        let mut payload = serde_json::to_value(&draft)?;
        stamp_create(&mut payload)?;
        let tag = self.api.create_tag(&payload).await?;
        self.state.lock().await.tags.push(tag.clone());
        Ok(tag)
    }

    /// Apply a partial update to a tag.
    pub async fn update_tag(&self, id: TagId, patch: TagPatch) -> Result<Tag> {
        if let Some(color) = &patch.color {
            if !is_hex_color(color) {
                return Err(Error::InvalidInput(format!("invalid tag color: {color}")));
            }
        }
        let mut payload = serde_json::to_value(&patch)?;
        stamp_update(&mut payload)?;
        let tag = self.api.update_tag(id, &payload).await?;
        let mut state = self.state.lock().await;
        if let Some(slot) = state.tags.iter_mut().find(|t| t.id == id) {
            *slot = tag.clone();
        }
        Ok(tag)
    }

    /// Delete a tag.
    pub async fn delete_tag(&self, id: TagId) -> Result<()> {
        self.api.delete_tag(id).await?;
        self.state.lock().await.tags.retain(|t| t.id != id);
        Ok(())
    }

    /// Resolve a held conflict.
    ///
    /// The entry is removed no matter what happens next; only `KeepLocal`
    /// needs a push to make the chosen copy durable again.
    pub async fn resolve_conflict(
        &self,
        item_id: Uuid,
        resolution: ConflictResolution,
    ) -> Result<()> {
        let conflict = {
            let mut state = self.state.lock().await;
            let Some(index) = state.conflicts.iter().position(|c| c.item_id == item_id) else {
                return Err(Error::NotFound(format!(
                    "no unresolved conflict for {item_id}"
                )));
            };
            state.conflicts.remove(index)
        };

        if resolution == ConflictResolution::KeepRemote {
            tracing::debug!(entity = %conflict.entity, id = %item_id, "conflict resolved to remote copy");
            return Ok(());
        }

        let mut payload = conflict.local.clone();
        stamp_update(&mut payload)?;
        match conflict.entity {
            EntityKind::Task => {
                let task = self.api.update_task(TaskId::from(item_id), &payload).await?;
                let mut state = self.state.lock().await;
                if let Some(slot) = state.tasks.iter_mut().find(|t| t.id == task.id) {
                    *slot = task;
                }
            }
            EntityKind::Project => {
                let project = self
                    .api
                    .update_project(ProjectId::from(item_id), &payload)
                    .await?;
                let mut state = self.state.lock().await;
                if let Some(slot) = state.projects.iter_mut().find(|p| p.id == project.id) {
                    *slot = project;
                }
            }
            EntityKind::Tag => {
                let tag = self.api.update_tag(TagId::from(item_id), &payload).await?;
                let mut state = self.state.lock().await;
                if let Some(slot) = state.tags.iter_mut().find(|t| t.id == tag.id) {
                    *slot = tag;
                }
            }
        }
        tracing::debug!(entity = %conflict.entity, id = %item_id, "conflict resolved to local copy");
        Ok(())
    }

    /// Discard all per-session state (sign-out teardown).
    pub async fn reset(&self) {
        {
            let mut state = self.state.lock().await;
            *state = EngineState::default();
        }
        self.queue_size.send_replace(0);
        tracing::info!("local sync state discarded");
    }

    async fn set_syncing(&self, syncing: bool) {
        self.state.lock().await.status.is_syncing = syncing;
    }
}

/// Race a fetch against its deadline; the loser is dropped.
async fn timed<T>(limit: Duration, fetch: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(limit, fetch).await {
        Ok(result) => result,
        Err(_elapsed) => Err(Error::Timeout(limit)),
    }
}

fn merge_into<T>(
    store: &mut Vec<T>,
    remote: Vec<T>,
    entity: EntityKind,
    sink: &mut Vec<SyncConflict>,
) -> Result<()>
where
    T: Syncable + Clone + PartialEq + Serialize,
{
    let outcome = merge::merge(store, &remote);
    *store = outcome.merged;
    for pair in outcome.conflicts {
        sink.push(SyncConflict {
            entity,
            item_id: pair.remote.merge_id(),
            local: serde_json::to_value(&pair.local)?,
            remote: serde_json::to_value(&pair.remote)?,
            detected_at: unix_timestamp_ms(),
        });
    }
    Ok(())
}

fn absorb_conflicts(held: &mut Vec<SyncConflict>, fresh: Vec<SyncConflict>) {
    for conflict in fresh {
        if let Some(existing) = held
            .iter_mut()
            .find(|c| c.entity == conflict.entity && c.item_id == conflict.item_id)
        {
            *existing = conflict;
        } else {
            held.push(conflict);
        }
    }
}

fn change_body(change: &PendingChange) -> Result<&Value> {
    change.data.as_ref().ok_or_else(|| {
        Error::InvalidInput(format!(
            "queued {} change for {} has no payload",
            change.entity, change.id
        ))
    })
}

fn stamp_create(payload: &mut Value) -> Result<()> {
    let object = payload_object(payload)?;
    object.insert("version".to_string(), json!(1));
    object.insert("lastModified".to_string(), json!(unix_timestamp_ms()));
    object.insert("syncStatus".to_string(), json!("pending"));
    Ok(())
}

fn stamp_update(payload: &mut Value) -> Result<()> {
    let object = payload_object(payload)?;
    object.insert("lastModified".to_string(), json!(unix_timestamp_ms()));
    object.insert("syncStatus".to_string(), json!("pending"));
    Ok(())
}

fn payload_object(payload: &mut Value) -> Result<&mut serde_json::Map<String, Value>> {
    payload
        .as_object_mut()
        .ok_or_else(|| Error::InvalidInput("mutation payload must be a JSON object".into()))
}
