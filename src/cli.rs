use clap::{Parser, Subcommand};
use save_warden::config::Overrides;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "save-warden")]
#[command(
    about = "Backs up game saves while the game is running. Checks every 20 minutes unless told otherwise.",
    long_about = None
)]
pub struct Cli {
    /// Number of minutes between backup checks
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Number of backups to keep per save
    #[arg(long = "num_saves", global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub num_saves: Option<u64>,

    /// Directory to put backup saves in
    #[arg(long, global = true)]
    pub outdir: Option<PathBuf>,

    /// Directory holding the live saves, instead of the game's default
    #[arg(long, global = true)]
    pub save_dir: Option<PathBuf>,

    /// Extension of save files
    #[arg(long, global = true)]
    pub extension: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Commands {
    /// Back up all saves now, then keep checking every interval (default)
    Run,
    /// Back up all saves once and exit
    Once,
    /// List retained backups grouped by save
    List,
    /// Print configuration values
    PrintConfig,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            interval: self.interval,
            num_saves: self.num_saves,
            outdir: self.outdir.clone(),
            save_dir: self.save_dir.clone(),
            extension: self.extension.clone(),
        }
    }
}
