use tacks_core::models::TaskStatus;

use crate::cli::StatusArg;
use crate::commands::common::{
    format_task_lines, load_tasks, open_engine, task_to_list_item, TaskListItem,
};
use crate::error::CliError;

pub async fn run_list(
    limit: usize,
    status: Option<StatusArg>,
    as_json: bool,
) -> Result<(), CliError> {
    let (engine, _session) = open_engine()?;
    let mut tasks = load_tasks(&engine).await?;

    if let Some(filter) = status {
        let filter: TaskStatus = filter.into();
        tasks.retain(|task| task.status == filter);
    }

    // Latest activity first, like the board.
    tasks.sort_by_key(|task| std::cmp::Reverse(task.last_modified));
    tasks.truncate(limit);

    if as_json {
        let items = tasks.iter().map(task_to_list_item).collect::<Vec<TaskListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for line in format_task_lines(&tasks) {
            println!("{line}");
        }
    }

    Ok(())
}
