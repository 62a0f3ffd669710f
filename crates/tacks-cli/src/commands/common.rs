use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tacks_core::api::{HttpApi, Session, SessionHandle};
use tacks_core::config::SyncSettings;
use tacks_core::models::{Priority, SyncConflict, TaskStatus};
use tacks_core::sync::SyncEngine;
use tacks_core::{Task, TaskId};

use crate::config::api_config_from_env;
use crate::error::CliError;

pub type CliEngine = Arc<SyncEngine<HttpApi>>;

/// Build an engine against the configured API, with a signed-in session.
///
/// The handle must stay alive as long as the engine; dropping it would end
/// the session signal.
pub fn open_engine() -> Result<(CliEngine, SessionHandle), CliError> {
    let config = api_config_from_env().ok_or(CliError::ApiNotConfigured)?;
    tracing::debug!(base_url = %config.base_url, "opening sync engine");

    let handle = SessionHandle::new();
    handle.sign_in(Session {
        email: config.email.clone(),
        access_token: config.token.clone(),
    });

    let api = HttpApi::new(&config.base_url, handle.subscribe())?;
    let engine = Arc::new(SyncEngine::new(
        Arc::new(api),
        handle.subscribe(),
        SyncSettings::default(),
    ));
    Ok((engine, handle))
}

/// Load the board and return the task collection.
pub async fn load_tasks(engine: &CliEngine) -> Result<Vec<Task>, CliError> {
    engine.load(true).await?;
    Ok(engine.tasks().await)
}

/// Resolve a task by exact id or unique id prefix.
pub async fn resolve_task(engine: &CliEngine, query: &str) -> Result<Task, CliError> {
    let tasks = load_tasks(engine).await?;
    select_task(&tasks, query)
}

/// Pick a task by exact id or unique id prefix from a loaded collection.
pub fn select_task(tasks: &[Task], query: &str) -> Result<Task, CliError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CliError::EmptyTaskId);
    }

    if let Ok(id) = query.parse::<TaskId>() {
        if let Some(task) = tasks.iter().find(|task| task.id == id) {
            return Ok(task.clone());
        }
    }

    let matches: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.id.as_str().starts_with(query))
        .collect();

    match matches.len() {
        0 => Err(CliError::TaskNotFound(query.to_string())),
        1 => Ok(matches[0].clone()),
        _ => {
            let options = matches
                .iter()
                .take(3)
                .map(|task| short_id(&task.id))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousTaskId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn short_id(id: &TaskId) -> String {
    id.as_str().chars().take(13).collect()
}

#[derive(Debug, Serialize)]
pub struct TaskListItem {
    pub id: String,
    pub title: String,
    pub status: String,
    pub priority: String,
    pub completed: bool,
    pub due_date: Option<String>,
    pub last_modified: i64,
    pub relative_time: String,
}

pub fn task_to_list_item(task: &Task) -> TaskListItem {
    let now_ms = Utc::now().timestamp_millis();
    TaskListItem {
        id: task.id.to_string(),
        title: task.title.clone(),
        status: status_name(task.status).to_string(),
        priority: priority_name(task.priority).to_string(),
        completed: task.is_completed,
        due_date: task.due_date.map(|date| date.format("%Y-%m-%d").to_string()),
        last_modified: task.last_modified,
        relative_time: format_relative_time(task.last_modified, now_ms),
    }
}

pub fn format_task_lines(tasks: &[Task]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    tasks
        .iter()
        .map(|task| {
            let id = short_id(&task.id);
            let marker = if task.is_completed { "[x]" } else { "[ ]" };
            let title = clip_title(&task.title, 40);
            let relative_time = format_relative_time(task.last_modified, now_ms);
            format!("{id:<13}  {marker} {title:<40}  {relative_time}")
        })
        .collect()
}

pub fn format_conflict_lines(conflicts: &[SyncConflict]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    conflicts
        .iter()
        .map(|conflict| {
            let id = conflict.item_id.to_string().chars().take(13).collect::<String>();
            let relative_time = format_relative_time(conflict.detected_at, now_ms);
            format!(
                "{:<8}  {id:<13}  detected {relative_time}",
                conflict.entity.to_string()
            )
        })
        .collect()
}

const fn status_name(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "todo",
        TaskStatus::InProgress => "in_progress",
        TaskStatus::Done => "done",
    }
}

const fn priority_name(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
    }
}

fn clip_title(title: &str, max_chars: usize) -> String {
    let collapsed = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}
