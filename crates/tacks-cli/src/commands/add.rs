use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tacks_core::models::TaskDraft;
use tacks_core::ProjectId;

use crate::cli::PriorityArg;
use crate::commands::common::open_engine;
use crate::error::CliError;

pub async fn run_add(
    title_parts: &[String],
    description: Option<String>,
    priority: PriorityArg,
    due: Option<&str>,
    project: Option<&str>,
) -> Result<(), CliError> {
    let title = title_parts.join(" ");
    let title = title.trim();
    if title.is_empty() {
        return Err(CliError::EmptyTitle);
    }

    let due_date = due.map(parse_due_date).transpose()?;
    let project_id = project
        .map(|raw| {
            raw.trim()
                .parse::<ProjectId>()
                .map_err(|_| CliError::InvalidId(raw.to_string()))
        })
        .transpose()?;

    let (engine, _session) = open_engine()?;
    let task = engine
        .add_task(TaskDraft {
            description,
            priority: priority.into(),
            due_date,
            project_id,
            ..TaskDraft::new(title)
        })
        .await?;

    println!("{}", task.id);
    Ok(())
}

fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, CliError> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CliError::InvalidDueDate(raw.to_string()))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| CliError::InvalidDueDate(raw.to_string()))?;
    Ok(Utc.from_utc_datetime(&midnight))
}
