use crate::discovery;
use crate::error::{Error, Result};
use crate::save_file::DEFAULT_EXTENSION;
use config::{Config, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INTERVAL_MINUTES: i64 = 20;
pub const DEFAULT_NUM_SAVES: i64 = 5;
pub const DEFAULT_OUTDIR: &str = "wh2_backup";
/// One week.
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Minutes between backup checks.
    pub interval: u64,
    /// Backups kept per lineage.
    pub num_saves: usize,
    pub outdir: PathBuf,
    #[serde(default)]
    pub save_dir: Option<PathBuf>,
    pub extension: String,
}

/// Values given on the command line. They win over every other source.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub interval: Option<u64>,
    pub num_saves: Option<u64>,
    pub outdir: Option<PathBuf>,
    pub save_dir: Option<PathBuf>,
    pub extension: Option<String>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 || self.interval > MAX_INTERVAL_MINUTES {
            return Err(Error::Validation(format!(
                "interval must be between 1 and {} minutes, got {}",
                MAX_INTERVAL_MINUTES, self.interval
            )));
        }
        if self.num_saves == 0 {
            return Err(Error::Validation(
                "num_saves must be a positive number".to_string(),
            ));
        }
        if self.extension.is_empty() || self.extension.contains('.') {
            return Err(Error::Validation(format!(
                "extension '{}' must be non-empty and contain no dots",
                self.extension
            )));
        }
        Ok(())
    }

    pub fn interval_duration(&self) -> Duration {
        Duration::from_secs(self.interval.saturating_mul(60))
    }

    /// The configured save directory, or the game's default location.
    pub fn resolve_save_dir(&self) -> Result<PathBuf> {
        match &self.save_dir {
            Some(dir) => Ok(dir.clone()),
            None => discovery::default_save_dir(),
        }
    }
}

/// Loads settings from `Config.toml` (if present), `SAVE_WARDEN_*`
/// environment variables and `overrides`, in rising priority.
pub fn load_configuration(overrides: &Overrides) -> Result<AppConfig> {
    load_configuration_from("Config", overrides)
}

fn to_setting(key: &str, value: Option<u64>) -> Result<Option<i64>> {
    value
        .map(|v| {
            i64::try_from(v)
                .map_err(|_| Error::Validation(format!("{} value {} is too large", key, v)))
        })
        .transpose()
}

pub fn load_configuration_from(config_name: &str, overrides: &Overrides) -> Result<AppConfig> {
    let interval = to_setting("interval", overrides.interval)?;
    let num_saves = to_setting("num_saves", overrides.num_saves)?;

    let builder = Config::builder()
        .set_default("interval", DEFAULT_INTERVAL_MINUTES)?
        .set_default("num_saves", DEFAULT_NUM_SAVES)?
        .set_default("outdir", DEFAULT_OUTDIR)?
        .set_default("extension", DEFAULT_EXTENSION)?
        .add_source(ConfigFile::with_name(config_name).required(false))
        .add_source(Environment::with_prefix("SAVE_WARDEN"))
        .set_override_option("interval", interval)?
        .set_override_option("num_saves", num_saves)?
        .set_override_option(
            "outdir",
            overrides
                .outdir
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
        )?
        .set_override_option(
            "save_dir",
            overrides
                .save_dir
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
        )?
        .set_override_option("extension", overrides.extension.clone())?
        .build()?;

    let config = builder.try_deserialize::<AppConfig>()?;
    config.validate()?;
    Ok(config)
}
