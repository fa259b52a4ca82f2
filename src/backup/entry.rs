use crate::error::{Error, Result};
use crate::save_file::{SaveIdentity, MIN_TOKENS};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// One retained version, named `<lineageKey>.<startToken>.<modifiedAt>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub file_name: String,
    pub lineage_key: String,
    pub start_token: String,
    pub modified_at: i64,
}

impl BackupEntry {
    pub fn parse(file_name: &str) -> Result<BackupEntry> {
        let malformed = |reason: String| Error::MalformedFileName {
            file_name: file_name.to_string(),
            reason,
        };

        // In-flight copies are hidden until renamed into place.
        if file_name.starts_with('.') {
            return Err(malformed("hidden file".to_string()));
        }

        let tokens: Vec<&str> = file_name.split('.').collect();
        if tokens.len() < MIN_TOKENS {
            return Err(malformed(format!(
                "expected at least {} dot-separated tokens, found {}",
                MIN_TOKENS,
                tokens.len()
            )));
        }

        let modified_at = tokens[2]
            .parse::<i64>()
            .map_err(|_| malformed(format!("'{}' is not an epoch timestamp", tokens[2])))?;

        Ok(BackupEntry {
            file_name: file_name.to_string(),
            lineage_key: tokens[0].to_string(),
            start_token: tokens[1].to_string(),
            modified_at,
        })
    }

    pub fn belongs_to(&self, identity: &SaveIdentity) -> bool {
        self.lineage_key == identity.lineage_key && self.start_token == identity.start_token
    }
}

impl Ord for BackupEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.modified_at
            .cmp(&other.modified_at)
            .then_with(|| self.file_name.cmp(&other.file_name))
    }
}

impl PartialOrd for BackupEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Entries of `identity`'s lineage among `file_names`, oldest first.
/// Names that don't parse as backups are skipped.
pub fn lineage_entries(file_names: &[String], identity: &SaveIdentity) -> Vec<BackupEntry> {
    let mut entries: Vec<BackupEntry> = file_names
        .iter()
        .filter_map(|name| match BackupEntry::parse(name) {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!("Ignoring {}: {}", name, err);
                None
            }
        })
        .filter(|entry| entry.belongs_to(identity))
        .collect();

    entries.sort();
    entries
}

/// Groups every parseable backup by `(lineage_key, start_token)`, each
/// group oldest first.
pub fn group_by_lineage(file_names: &[String]) -> BTreeMap<(String, String), Vec<BackupEntry>> {
    let mut groups: BTreeMap<(String, String), Vec<BackupEntry>> = BTreeMap::new();

    for entry in file_names.iter().filter_map(|n| BackupEntry::parse(n).ok()) {
        groups
            .entry((entry.lineage_key.clone(), entry.start_token.clone()))
            .or_default()
            .push(entry);
    }

    for entries in groups.values_mut() {
        entries.sort();
    }

    groups
}
