//! Tacks CLI - command-line client for the Tacks board
//!
//! Quick capture and sync from the terminal with minimal friction.

mod cli;
mod commands;
mod config;
mod error;

use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands, PriorityArg};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tacks=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Add {
            title,
            description,
            priority,
            due,
            project,
        }) => {
            commands::add::run_add(
                &title,
                description,
                priority,
                due.as_deref(),
                project.as_deref(),
            )
            .await?;
        }
        Some(Commands::List {
            limit,
            status,
            json,
        }) => commands::list::run_list(limit, status, json).await?,
        Some(Commands::Done { id }) => commands::done::run_done(&id).await?,
        Some(Commands::Delete { id }) => commands::delete::run_delete(&id).await?,
        Some(Commands::Sync { json }) => commands::sync::run_sync(json).await?,
        Some(Commands::Conflicts { limit, json }) => {
            commands::sync::run_conflicts(limit, json).await?;
        }
        Some(Commands::Resolve { id, keep }) => commands::sync::run_resolve(&id, keep).await?,
        Some(Commands::Watch) => commands::watch::run_watch().await?,
        None => {
            // Quick capture mode: tacks "pay the rent"
            if cli.title.is_empty() {
                Cli::command().print_help().map_err(CliError::Io)?;
                println!();
            } else {
                commands::add::run_add(&cli.title, None, PriorityArg::Medium, None, None).await?;
            }
        }
    }

    Ok(())
}
