use tacks_core::models::{TaskPatch, TaskStatus};

use crate::commands::common::{open_engine, resolve_task};
use crate::error::CliError;

pub async fn run_done(id: &str) -> Result<(), CliError> {
    let (engine, _session) = open_engine()?;
    let task = resolve_task(&engine, id).await?;

    let updated = engine
        .update_task(
            task.id,
            TaskPatch {
                is_completed: Some(true),
                status: Some(TaskStatus::Done),
                ..TaskPatch::default()
            },
        )
        .await?;

    println!("{}", updated.id);
    Ok(())
}
