use crate::backup::{back_up_save, BackupStore, PassOutcome};
use crate::discovery;
use crate::error::Error;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleSummary {
    pub created: usize,
    pub unmodified: usize,
    pub pruned: usize,
    /// Files whose names don't follow the save naming scheme.
    pub skipped: usize,
    pub failed: usize,
}

/// Runs a backup pass for each of `saves` in turn. A failing file is
/// logged and counted; it never stops the remaining passes.
pub fn run_passes<S: BackupStore + ?Sized>(
    saves: &[PathBuf],
    store: &S,
    retention_limit: usize,
) -> CycleSummary {
    let mut summary = CycleSummary::default();

    for save in saves {
        info!(
            "Checking if {} has been modified since last check.",
            save.display()
        );
        match back_up_save(save, store, retention_limit) {
            Ok(report) => {
                match report.outcome {
                    PassOutcome::Created { .. } => summary.created += 1,
                    PassOutcome::Unmodified { .. } => summary.unmodified += 1,
                }
                summary.pruned += report.pruned.len();
                if let Some(err) = report.prune_failure {
                    warn!(
                        "{} may hold more than {} backups until this clears: {}",
                        save.display(),
                        retention_limit,
                        err
                    );
                }
            }
            Err(err @ Error::MalformedFileName { .. }) => {
                warn!("Skipping {}: {}", save.display(), err);
                summary.skipped += 1;
            }
            Err(err) => {
                error!("Backup of {} failed: {}", save.display(), err);
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Everything needed to back up one save directory into one store.
pub struct BackupCycle<S> {
    save_dir: PathBuf,
    extension: String,
    retention_limit: usize,
    store: S,
}

impl<S: BackupStore> BackupCycle<S> {
    pub fn new(save_dir: PathBuf, extension: &str, retention_limit: usize, store: S) -> Self {
        Self {
            save_dir,
            extension: extension.to_string(),
            retention_limit,
            store,
        }
    }

    /// Rediscovers the saves and runs a pass over each. Saves created since
    /// the previous run are picked up here.
    pub fn run(&self) -> CycleSummary {
        match discovery::discover_saves(&self.save_dir, &self.extension) {
            Ok(saves) => run_passes(&saves, &self.store, self.retention_limit),
            Err(err) => {
                error!("Error listing saves: {}", err);
                CycleSummary::default()
            }
        }
    }
}
