use super::entry::{lineage_entries, BackupEntry};
use super::prune::{prune, PruneReport};
use super::store::BackupStore;
use crate::error::{Error, Result};
use crate::save_file::{display_time, SaveIdentity};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// A new version was written under `file_name`.
    Created { file_name: String },
    /// The live file matches the existing backup `matched`.
    Unmodified { matched: String },
}

#[derive(Debug)]
pub struct PassReport {
    pub outcome: PassOutcome,
    pub pruned: Vec<String>,
    pub prune_failure: Option<Error>,
    /// Entries held for the lineage once the pass finished.
    pub retained: usize,
}

/// Runs one backup pass for the live save at `source`.
pub fn back_up_save<S: BackupStore + ?Sized>(
    source: &Path,
    store: &S,
    retention_limit: usize,
) -> Result<PassReport> {
    let identity = SaveIdentity::from_path(source)?;
    back_up_identity(source, &identity, store, retention_limit)
}

/// Runs one backup pass for a save whose identity is already known.
///
/// The live file is unmodified when its timestamp matches any entry of its
/// lineage; the lineage is then only trimmed back to `retention_limit` if
/// it grew past it. Otherwise the oldest entries are pruned to make room
/// and the file is copied in under a name carrying its timestamp.
pub fn back_up_identity<S: BackupStore + ?Sized>(
    source: &Path,
    identity: &SaveIdentity,
    store: &S,
    retention_limit: usize,
) -> Result<PassReport> {
    if retention_limit == 0 {
        return Err(Error::Validation(
            "retention limit must be at least 1".to_string(),
        ));
    }

    let names = store.list()?;
    let mut entries: Vec<BackupEntry> = lineage_entries(&names, identity);
    debug!(
        "{} has {} backup(s) under {}",
        identity.file_name,
        entries.len(),
        identity.lineage_prefix()
    );

    if let Some(position) = entries
        .iter()
        .position(|entry| entry.modified_at == identity.modified_at)
    {
        let matched = entries.remove(position);
        info!("{} is unmodified since backup.", identity.file_name);

        // Still over the limit after a failed delete or a lowered limit.
        // The matching entry stays; the oldest of the rest go.
        let mut pruning = PruneReport::default();
        if entries.len() + 1 > retention_limit {
            pruning = prune(&mut entries, retention_limit, store);
        }

        return Ok(PassReport {
            outcome: PassOutcome::Unmodified {
                matched: matched.file_name,
            },
            pruned: pruning.removed,
            prune_failure: pruning.failure,
            retained: entries.len() + 1,
        });
    }

    let mut pruning = PruneReport::default();
    if entries.is_empty() {
        info!("Making a backup for {}", identity.file_name);
    } else {
        info!(
            "{} has been modified since last check ({})",
            identity.file_name,
            display_time(identity.modified_at)
        );
        if entries.len() > retention_limit - 1 {
            pruning = prune(&mut entries, retention_limit, store);
        }
    }

    let file_name = identity.backup_file_name();
    store.copy_in(source, &file_name)?;
    info!("Created backup {}", file_name);

    Ok(PassReport {
        outcome: PassOutcome::Created { file_name },
        pruned: pruning.removed,
        prune_failure: pruning.failure,
        retained: entries.len() + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::store::testing::MemoryStore;

    const LIVE: &str = "Campaign.Empire.turn5.save";

    fn pass(store: &MemoryStore, modified_at: i64, limit: usize) -> Result<PassReport> {
        let identity = SaveIdentity::new(LIVE, modified_at).unwrap();
        back_up_identity(Path::new(LIVE), &identity, store, limit)
    }

    #[test]
    fn test_bootstrap_creates_first_backup() {
        let store = MemoryStore::default();

        let report = pass(&store, 1000, 5).unwrap();

        assert_eq!(
            report.outcome,
            PassOutcome::Created {
                file_name: "CampaignEmpire.turn5.1000.save".to_string()
            }
        );
        assert_eq!(store.names(), vec!["CampaignEmpire.turn5.1000.save"]);
    }

    #[test]
    fn test_second_pass_without_change_is_a_no_op() {
        let store = MemoryStore::default();

        pass(&store, 1000, 5).unwrap();
        let report = pass(&store, 1000, 5).unwrap();

        assert!(matches!(report.outcome, PassOutcome::Unmodified { .. }));
        assert_eq!(store.names().len(), 1);
    }

    #[test]
    fn test_unmodified_at_limit_deletes_nothing() {
        let store = MemoryStore::with_files(&[
            "CampaignEmpire.turn5.1000.save",
            "CampaignEmpire.turn5.1500.save",
        ]);

        let report = pass(&store, 1500, 2).unwrap();

        assert_eq!(
            report.outcome,
            PassOutcome::Unmodified {
                matched: "CampaignEmpire.turn5.1500.save".to_string()
            }
        );
        assert!(report.pruned.is_empty());
        assert_eq!(store.names().len(), 2);
    }

    #[test]
    fn test_unmodified_over_limit_is_trimmed_back() {
        let store = MemoryStore::with_files(&[
            "CampaignEmpire.turn5.100.save",
            "CampaignEmpire.turn5.200.save",
            "CampaignEmpire.turn5.300.save",
        ]);

        for _ in 0..3 {
            let report = pass(&store, 300, 2).unwrap();
            assert!(matches!(report.outcome, PassOutcome::Unmodified { .. }));
            assert!(store.names().len() <= 2);
        }

        assert_eq!(
            store.names(),
            vec![
                "CampaignEmpire.turn5.200.save",
                "CampaignEmpire.turn5.300.save",
            ]
        );
    }

    #[test]
    fn test_unmodified_oldest_entry_is_kept_when_trimming() {
        let store = MemoryStore::with_files(&[
            "CampaignEmpire.turn5.100.save",
            "CampaignEmpire.turn5.200.save",
            "CampaignEmpire.turn5.300.save",
        ]);

        let report = pass(&store, 100, 2).unwrap();

        assert_eq!(report.pruned, vec!["CampaignEmpire.turn5.200.save"]);
        assert_eq!(report.retained, 2);
        assert_eq!(
            store.names(),
            vec![
                "CampaignEmpire.turn5.100.save",
                "CampaignEmpire.turn5.300.save",
            ]
        );
    }

    #[test]
    fn test_locked_entry_is_pruned_once_released() {
        let store = MemoryStore::with_files(&[
            "CampaignEmpire.turn5.100.save",
            "CampaignEmpire.turn5.200.save",
        ]);
        store.lock("CampaignEmpire.turn5.100.save");
        pass(&store, 300, 2).unwrap();
        assert_eq!(store.names().len(), 3);

        store.unlock("CampaignEmpire.turn5.100.save");
        let report = pass(&store, 300, 2).unwrap();

        assert!(matches!(report.outcome, PassOutcome::Unmodified { .. }));
        assert_eq!(report.pruned, vec!["CampaignEmpire.turn5.100.save"]);
        assert_eq!(store.names().len(), 2);
    }

    #[test]
    fn test_modified_file_adds_version_without_pruning() {
        let store = MemoryStore::with_files(&[
            "CampaignEmpire.turn5.1000.save",
            "CampaignEmpire.turn5.1500.save",
        ]);

        let report = pass(&store, 2000, 3).unwrap();

        assert!(report.pruned.is_empty());
        assert_eq!(report.retained, 3);
        assert_eq!(
            store.names(),
            vec![
                "CampaignEmpire.turn5.1000.save",
                "CampaignEmpire.turn5.1500.save",
                "CampaignEmpire.turn5.2000.save",
            ]
        );
    }

    #[test]
    fn test_prune_before_new_version() {
        let store = MemoryStore::with_files(&[
            "CampaignEmpire.turn5.100.save",
            "CampaignEmpire.turn5.200.save",
            "CampaignEmpire.turn5.300.save",
            "CampaignEmpire.turn5.400.save",
        ]);

        let report = pass(&store, 500, 2).unwrap();

        assert_eq!(report.pruned.len(), 3);
        assert_eq!(report.retained, 2);
        assert_eq!(
            store.names(),
            vec![
                "CampaignEmpire.turn5.400.save",
                "CampaignEmpire.turn5.500.save",
            ]
        );
    }

    #[test]
    fn test_other_lineages_are_untouched() {
        let store = MemoryStore::with_files(&[
            "CampaignEmpire.turn9.100.save",
            "CampaignEmpire.turn9.200.save",
            "CampaignEmpire.turn5.100.save",
        ]);

        pass(&store, 300, 1).unwrap();

        assert_eq!(
            store.names(),
            vec![
                "CampaignEmpire.turn5.300.save",
                "CampaignEmpire.turn9.100.save",
                "CampaignEmpire.turn9.200.save",
            ]
        );
    }

    #[test]
    fn test_failed_deletion_still_creates_version() {
        let store = MemoryStore::with_files(&[
            "CampaignEmpire.turn5.100.save",
            "CampaignEmpire.turn5.200.save",
        ]);
        store.lock("CampaignEmpire.turn5.100.save");

        let report = pass(&store, 300, 2).unwrap();

        assert!(report.prune_failure.is_some());
        assert!(matches!(report.outcome, PassOutcome::Created { .. }));
        // One over the limit until the locked file can be deleted.
        assert_eq!(store.names().len(), 3);
    }

    #[test]
    fn test_failed_copy_is_redetected_next_pass() {
        let store = MemoryStore::with_files(&["CampaignEmpire.turn5.100.save"]);
        store.set_failing_copies(true);

        assert!(matches!(pass(&store, 200, 3), Err(Error::Copy { .. })));
        assert_eq!(store.names(), vec!["CampaignEmpire.turn5.100.save"]);

        store.set_failing_copies(false);
        let report = pass(&store, 200, 3).unwrap();
        assert!(matches!(report.outcome, PassOutcome::Created { .. }));
        assert_eq!(store.names().len(), 2);
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let store = MemoryStore::default();
        assert!(matches!(pass(&store, 1, 0), Err(Error::Validation(_))));
    }
}
