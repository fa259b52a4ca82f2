mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use colored::*;
use dotenv::dotenv;
use save_warden::backup::entry::group_by_lineage;
use save_warden::save_file::display_time;
use save_warden::{AppConfig, BackupCycle, BackupStore, CycleSummary, DirStore, Scheduler};
use std::time::Duration;
use tracing::info;

fn main() -> Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();
    let config = save_warden::config::load_configuration(&args.overrides())
        .context("Error loading configuration")?;

    match args.command.unwrap_or(Commands::Run) {
        Commands::Run => run_forever(&config),
        Commands::Once => {
            let cycle = build_cycle(&config)?;
            report(&cycle.run());
            Ok(())
        }
        Commands::List => list_backups(&config),
        Commands::PrintConfig => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
    }
}

fn build_cycle(config: &AppConfig) -> Result<BackupCycle<DirStore>> {
    let save_dir = config.resolve_save_dir()?;
    let store = DirStore::open(&config.outdir)
        .with_context(|| format!("Error opening {}", config.outdir.display()))?;
    info!(
        "Backing up {} into {}",
        save_dir.display(),
        store.root().display()
    );
    Ok(BackupCycle::new(
        save_dir,
        &config.extension,
        config.num_saves,
        store,
    ))
}

fn run_forever(config: &AppConfig) -> Result<()> {
    info!("Initialising and creating initial save copies");
    let cycle = build_cycle(config)?;
    report(&cycle.run());
    info!("Successfully initialised.");
    info!(
        "Ongoing backup checks occurring every {} minutes",
        config.interval
    );

    let mut scheduler = Scheduler::new();
    scheduler.every(config.interval_duration(), "back up saves", move || {
        report(&cycle.run())
    });
    scheduler.run_forever(Duration::from_secs(1))
}

fn report(summary: &CycleSummary) {
    info!(
        "{} created, {} unmodified, {} pruned, {} skipped, {} failed",
        format!("{}", summary.created).green(),
        format!("{}", summary.unmodified).cyan(),
        format!("{}", summary.pruned).yellow(),
        format!("{}", summary.skipped).yellow(),
        format!("{}", summary.failed).red(),
    );
}

fn list_backups(config: &AppConfig) -> Result<()> {
    let store = DirStore::open(&config.outdir)
        .with_context(|| format!("Error opening {}", config.outdir.display()))?;
    let groups = group_by_lineage(&store.list()?);

    if groups.is_empty() {
        println!("No backups in {}", store.root().display());
        return Ok(());
    }

    for ((lineage_key, start_token), entries) in &groups {
        println!(
            "{}.{} ({} of {})",
            lineage_key.bold(),
            start_token,
            entries.len(),
            config.num_saves
        );
        for entry in entries {
            println!(
                "  {}  {}",
                display_time(entry.modified_at).cyan(),
                entry.file_name
            );
        }
    }

    Ok(())
}
