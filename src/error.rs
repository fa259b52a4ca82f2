use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed file name '{file_name}': {reason}")]
    MalformedFileName { file_name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid setting: {0}")]
    Validation(String),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Could not resolve the save directory: {0}")]
    SaveDirUnresolved(String),
}

pub type Result<T> = std::result::Result<T, Error>;
