use crate::commands::common::{open_engine, resolve_task};
use crate::error::CliError;

pub async fn run_delete(id: &str) -> Result<(), CliError> {
    let (engine, _session) = open_engine()?;
    let task = resolve_task(&engine, id).await?;

    engine.delete_task(task.id).await?;
    println!("{}", task.id);
    Ok(())
}
