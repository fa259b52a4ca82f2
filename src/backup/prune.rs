use super::entry::BackupEntry;
use super::store::BackupStore;
use crate::error::Error;
use tracing::{error, info};

#[derive(Debug, Default)]
pub struct PruneReport {
    pub removed: Vec<String>,
    /// Set when a deletion failed and pruning stopped early.
    pub failure: Option<Error>,
}

/// Deletes the oldest entries until at most `retention_limit - 1` remain,
/// leaving room for one new version. `entries` is left holding the
/// survivors, oldest first.
///
/// Stops at the first failed deletion; the caller carries on with what is
/// left and the next pass tries again.
pub fn prune<S: BackupStore + ?Sized>(
    entries: &mut Vec<BackupEntry>,
    retention_limit: usize,
    store: &S,
) -> PruneReport {
    let keep = retention_limit.saturating_sub(1);
    let mut report = PruneReport::default();

    entries.sort();

    if entries.len() > keep {
        info!(
            "Pruning {} old backup(s) to keep {}",
            entries.len() - keep,
            retention_limit
        );
    }

    while entries.len() > keep {
        let oldest = entries[0].file_name.clone();
        match store.remove(&oldest) {
            Ok(()) => {
                info!("Removed old backup {}", oldest);
                entries.remove(0);
                report.removed.push(oldest);
            }
            Err(err) => {
                error!("Stopped pruning: {}", err);
                report.failure = Some(err);
                break;
            }
        }
    }

    report
}
