use tacks_core::sync::SyncScheduler;

use crate::commands::common::open_engine;
use crate::error::CliError;

pub async fn run_watch() -> Result<(), CliError> {
    let (engine, session) = open_engine()?;
    let scheduler = SyncScheduler::spawn(engine.clone());
    println!("Watching for changes; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;

    scheduler.shutdown();
    let status = engine.status().await;
    if let Some(error) = status.last_error {
        eprintln!("Last sync error: {error}");
    }

    session.sign_out();
    Ok(())
}
