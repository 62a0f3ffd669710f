//! Scriptable in-memory remote API for engine and scheduler tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::RemoteApi;
use crate::models::{Project, ProjectId, SyncStatus, Tag, TagId, Task, TaskId};
use crate::util::unix_timestamp_ms;
use crate::{Error, Result};

/// In-memory server double. Failure flags and fetch delays are scripted per
/// test; every call is recorded for ordering and reentrancy assertions.
#[derive(Default)]
pub struct MockApi {
    tasks: Mutex<Vec<Task>>,
    projects: Mutex<Vec<Project>>,
    tags: Mutex<Vec<Tag>>,
    task_fetch_fails: AtomicBool,
    project_fetch_fails: AtomicBool,
    tag_fetch_fails: AtomicBool,
    mutations_fail: AtomicBool,
    fetch_delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_task(&self, task: Task) {
        self.tasks.lock().unwrap().push(task);
    }

    pub fn seed_project(&self, project: Project) {
        self.projects.lock().unwrap().push(project);
    }

    pub fn seed_tag(&self, tag: Tag) {
        self.tags.lock().unwrap().push(tag);
    }

    /// Change a stored task's title without touching its sync counters,
    /// manufacturing an ambiguous-ordering tie against a local copy.
    pub fn rename_task(&self, id: TaskId, title: &str) {
        let mut tasks = self.tasks.lock().unwrap();
        if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
            task.title = title.to_string();
        }
    }

    pub fn fail_task_fetch(&self) {
        self.task_fetch_fails.store(true, Ordering::SeqCst);
    }

    pub fn fail_project_fetch(&self) {
        self.project_fetch_fails.store(true, Ordering::SeqCst);
    }

    pub fn fail_tag_fetch(&self) {
        self.tag_fetch_fails.store(true, Ordering::SeqCst);
    }

    pub fn fail_mutations(&self) {
        self.mutations_fail.store(true, Ordering::SeqCst);
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    async fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn scripted_failure() -> Error {
        Error::Api {
            status: 503,
            message: "scripted failure".to_string(),
        }
    }
}

#[async_trait]
impl RemoteApi for MockApi {
    async fn fetch_tasks(&self) -> Result<Vec<Task>> {
        self.record("fetch_tasks").await;
        if self.task_fetch_fails.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure());
        }
        Ok(self.tasks.lock().unwrap().clone())
    }

    async fn fetch_projects(&self) -> Result<Vec<Project>> {
        self.record("fetch_projects").await;
        if self.project_fetch_fails.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure());
        }
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn fetch_tags(&self) -> Result<Vec<Tag>> {
        self.record("fetch_tags").await;
        if self.tag_fetch_fails.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure());
        }
        Ok(self.tags.lock().unwrap().clone())
    }

    async fn create_task(&self, body: &Value) -> Result<Task> {
        let title = body
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("untitled")
            .to_string();
        self.record(format!("create_task:{title}")).await;
        if self.mutations_fail.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure());
        }
        let mut task = Task::new(&title);
        if let Some(version) = body.get("version").and_then(Value::as_i64) {
            task.version = version;
        }
        if let Some(modified) = body.get("lastModified").and_then(Value::as_i64) {
            task.last_modified = modified;
        }
        task.sync_status = SyncStatus::Synced;
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: TaskId, body: &Value) -> Result<Task> {
        self.record(format!("update_task:{id}")).await;
        if self.mutations_fail.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure());
        }
        let mut tasks = self.tasks.lock().unwrap();
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Err(Error::Api {
                status: 404,
                message: "task not found".to_string(),
            });
        };
        if let Some(title) = body.get("title").and_then(Value::as_str) {
            task.title = title.to_string();
        }
        if let Some(done) = body.get("isCompleted").and_then(Value::as_bool) {
            task.is_completed = done;
        }
        task.version += 1;
        task.last_modified = unix_timestamp_ms();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: TaskId) -> Result<()> {
        self.record(format!("delete_task:{id}")).await;
        if self.mutations_fail.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure());
        }
        // Idempotent: deleting an unknown id is still a success.
        self.tasks.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }

    async fn create_project(&self, body: &Value) -> Result<Project> {
        self.record("create_project").await;
        if self.mutations_fail.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure());
        }
        let mut project = Project::new(
            body.get("name").and_then(Value::as_str).unwrap_or("untitled"),
            body.get("color").and_then(Value::as_str).unwrap_or("#000000"),
        );
        project.sync_status = SyncStatus::Synced;
        self.projects.lock().unwrap().push(project.clone());
        Ok(project)
    }

    async fn update_project(&self, id: ProjectId, body: &Value) -> Result<Project> {
        self.record(format!("update_project:{id}")).await;
        if self.mutations_fail.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure());
        }
        let mut projects = self.projects.lock().unwrap();
        let Some(project) = projects.iter_mut().find(|p| p.id == id) else {
            return Err(Error::Api {
                status: 404,
                message: "project not found".to_string(),
            });
        };
        if let Some(name) = body.get("name").and_then(Value::as_str) {
            project.name = name.to_string();
        }
        if let Some(color) = body.get("color").and_then(Value::as_str) {
            project.color = color.to_string();
        }
        project.version += 1;
        project.last_modified = unix_timestamp_ms();
        Ok(project.clone())
    }

    async fn delete_project(&self, id: ProjectId) -> Result<()> {
        self.record(format!("delete_project:{id}")).await;
        if self.mutations_fail.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure());
        }
        self.projects.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn create_tag(&self, body: &Value) -> Result<Tag> {
        self.record("create_tag").await;
        if self.mutations_fail.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure());
        }
        let mut tag = Tag::new(
            body.get("name").and_then(Value::as_str).unwrap_or("untitled"),
            body.get("color").and_then(Value::as_str).unwrap_or("#000000"),
        );
        tag.sync_status = SyncStatus::Synced;
        self.tags.lock().unwrap().push(tag.clone());
        Ok(tag)
    }

    async fn update_tag(&self, id: TagId, body: &Value) -> Result<Tag> {
        self.record(format!("update_tag:{id}")).await;
        if self.mutations_fail.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure());
        }
        let mut tags = self.tags.lock().unwrap();
        let Some(tag) = tags.iter_mut().find(|t| t.id == id) else {
            return Err(Error::Api {
                status: 404,
                message: "tag not found".to_string(),
            });
        };
        if let Some(name) = body.get("name").and_then(Value::as_str) {
            tag.name = name.to_string();
        }
        if let Some(color) = body.get("color").and_then(Value::as_str) {
            tag.color = color.to_string();
        }
        tag.version += 1;
        tag.last_modified = unix_timestamp_ms();
        Ok(tag.clone())
    }

    async fn delete_tag(&self, id: TagId) -> Result<()> {
        self.record(format!("delete_tag:{id}")).await;
        if self.mutations_fail.load(Ordering::SeqCst) {
            return Err(Self::scripted_failure());
        }
        self.tags.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }
}
