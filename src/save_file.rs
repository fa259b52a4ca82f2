use crate::error::{Error, Result};
use chrono::{DateTime, Local, Utc};
use std::fs;
use std::path::Path;

/// Two name tokens followed by a start token.
pub const MIN_TOKENS: usize = 3;

/// Extension given to backups of save files whose name carries none.
pub const DEFAULT_EXTENSION: &str = "save";

/// Dot-separated tokens of a live save file name, e.g.
/// `Campaign.Empire.turn5.save`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveName {
    pub lineage_key: String,
    pub start_token: String,
    /// Whatever follows the start token, extension last.
    pub trailing: Vec<String>,
}

impl SaveName {
    pub fn parse(file_name: &str) -> Result<SaveName> {
        let tokens: Vec<&str> = file_name.split('.').collect();
        if tokens.len() < MIN_TOKENS {
            return Err(Error::MalformedFileName {
                file_name: file_name.to_string(),
                reason: format!(
                    "expected at least {} dot-separated tokens, found {}",
                    MIN_TOKENS,
                    tokens.len()
                ),
            });
        }

        // The first two tokens are joined without a separator. Existing
        // backup directories depend on this exact key.
        let lineage_key = format!("{}{}", tokens[0], tokens[1]);
        if lineage_key.is_empty() {
            // The backup name would start with a dot and read as hidden.
            return Err(Error::MalformedFileName {
                file_name: file_name.to_string(),
                reason: "the save name tokens are empty".to_string(),
            });
        }

        Ok(SaveName {
            lineage_key,
            start_token: tokens[2].to_string(),
            trailing: tokens[3..].iter().map(|t| t.to_string()).collect(),
        })
    }

    pub fn extension(&self) -> Option<&str> {
        self.trailing.last().map(String::as_str)
    }
}

/// Identity of a live save file at the moment it was inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveIdentity {
    pub file_name: String,
    pub lineage_key: String,
    pub start_token: String,
    pub extension: String,
    /// Seconds since the Unix epoch.
    pub modified_at: i64,
}

impl SaveIdentity {
    pub fn new(file_name: &str, modified_at: i64) -> Result<SaveIdentity> {
        let name = SaveName::parse(file_name)?;
        let extension = name.extension().unwrap_or(DEFAULT_EXTENSION).to_string();

        Ok(SaveIdentity {
            file_name: file_name.to_string(),
            lineage_key: name.lineage_key,
            start_token: name.start_token,
            extension,
            modified_at,
        })
    }

    /// Reads the modification time of `path` and derives its identity.
    pub fn from_path(path: &Path) -> Result<SaveIdentity> {
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .ok_or_else(|| Error::MalformedFileName {
                file_name: path.to_string_lossy().into_owned(),
                reason: "not a valid UTF-8 file name".to_string(),
            })?;

        let metadata = fs::metadata(path)?;
        let modified_at = DateTime::<Utc>::from(metadata.modified()?).timestamp();

        SaveIdentity::new(file_name, modified_at)
    }

    pub fn lineage_prefix(&self) -> String {
        format!("{}.{}", self.lineage_key, self.start_token)
    }

    pub fn backup_file_name(&self) -> String {
        format!(
            "{}.{}.{}",
            self.lineage_prefix(),
            self.modified_at,
            self.extension
        )
    }
}

/// Renders epoch seconds as a local date-time for log and listing output.
pub fn display_time(epoch_secs: i64) -> String {
    match DateTime::<Utc>::from_timestamp(epoch_secs, 0) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => epoch_secs.to_string(),
    }
}
