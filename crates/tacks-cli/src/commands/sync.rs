use serde::Serialize;
use uuid::Uuid;

use crate::cli::KeepArg;
use crate::commands::common::{format_conflict_lines, open_engine};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct SyncSummary {
    tasks: usize,
    projects: usize,
    tags: usize,
    conflicts: usize,
}

pub async fn run_sync(as_json: bool) -> Result<(), CliError> {
    let (engine, _session) = open_engine()?;
    engine.load(true).await?;

    let summary = SyncSummary {
        tasks: engine.tasks().await.len(),
        projects: engine.projects().await.len(),
        tags: engine.tags().await.len(),
        conflicts: engine.conflicts().await.len(),
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "Sync completed: {} tasks, {} projects, {} tags",
        summary.tasks, summary.projects, summary.tags
    );
    if summary.conflicts > 0 {
        println!(
            "{} unresolved conflicts (see `tacks conflicts`)",
            summary.conflicts
        );
    }
    Ok(())
}

pub async fn run_conflicts(limit: usize, as_json: bool) -> Result<(), CliError> {
    let (engine, _session) = open_engine()?;
    engine.load(true).await?;

    let mut conflicts = engine.conflicts().await;
    conflicts.truncate(limit);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&conflicts)?);
        return Ok(());
    }

    if conflicts.is_empty() {
        println!("No unresolved sync conflicts.");
        return Ok(());
    }

    for line in format_conflict_lines(&conflicts) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_resolve(id: &str, keep: KeepArg) -> Result<(), CliError> {
    let item_id =
        Uuid::parse_str(id.trim()).map_err(|_| CliError::InvalidId(id.to_string()))?;

    let (engine, _session) = open_engine()?;
    engine.load(true).await?;
    engine.resolve_conflict(item_id, keep.into()).await?;

    println!("{item_id}");
    Ok(())
}
