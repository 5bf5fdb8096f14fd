use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tat_cli::commands::{add, audit, delete, history, records, start, status, stop, summary, watch};
use tat_cli::{Cli, Commands, Config};
use tat_core::Tracker;
use tat_db::Database;

/// Load config and open the tracker, ensuring the database directory exists.
fn open_tracker(config_path: Option<&Path>) -> Result<(Tracker<Database>, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    let tracker = Tracker::open(db).context("failed to read event log")?;
    Ok((tracker, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut tracker, config) = open_tracker(cli.config.as_deref())?;
    let mut stdout = std::io::stdout().lock();
    let now = Utc::now();

    match command {
        Commands::Start { name } => start::run(&mut stdout, &mut tracker, name, now, &Local)?,
        Commands::Stop => stop::run(&mut stdout, &mut tracker, now)?,
        Commands::Delete { id } => delete::run(&mut stdout, &mut tracker, *id)?,
        Commands::Add { task, action, at } => {
            add::run(
                &mut stdout,
                &mut tracker,
                task,
                (*action).into(),
                at,
                now,
                &Local,
            )?;
        }
        Commands::Summary { json } => summary::run(&mut stdout, &tracker, *json)?,
        Commands::Records { task, json } => {
            records::run(&mut stdout, &tracker, task, *json, &Local)?;
        }
        Commands::History { json } => history::run(&mut stdout, &tracker, *json, now, &Local)?,
        Commands::Status => {
            status::run(&mut stdout, &tracker, &config.database_path, now, &Local)?;
        }
        Commands::Audit { json } => audit::run(&mut stdout, &tracker, *json)?,
        Commands::Watch { ticks } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start ticker runtime")?;
            runtime.block_on(watch::run(&mut stdout, &tracker, *ticks))?;
        }
    }

    Ok(())
}
