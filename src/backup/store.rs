use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

const PARTIAL_SUFFIX: &str = ".partial";

fn is_partial(file_name: &str) -> bool {
    file_name.starts_with('.') && file_name.ends_with(PARTIAL_SUFFIX)
}

/// Read/write access to the directory holding backup entries.
///
/// The directory listing is the only state the retention logic keeps, so
/// every pass reads it fresh through this trait.
pub trait BackupStore {
    /// File names currently in the store, in no particular order.
    fn list(&self) -> Result<Vec<String>>;

    /// Duplicates the contents of `source` under `file_name`.
    fn copy_in(&self, source: &Path, file_name: &str) -> Result<()>;

    fn remove(&self, file_name: &str) -> Result<()>;
}

/// Backup store backed by a flat directory on disk.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Opens `root`, creating it and any missing parents. Copies left
    /// half-written by an earlier run are deleted.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<DirStore> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|err| {
            io::Error::new(
                err.kind(),
                format!("Error creating backup directory {}: {}", root.display(), err),
            )
        })?;

        let store = DirStore { root };
        store.remove_stale_partials()?;
        Ok(store)
    }

    fn remove_stale_partials(&self) -> Result<()> {
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            let is_stale = entry.file_type().is_file()
                && entry.file_name().to_str().map_or(false, is_partial);
            if !is_stale {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => info!("Removed interrupted copy {}", entry.path().display()),
                Err(err) => warn!(
                    "Could not remove interrupted copy {}: {}",
                    entry.path().display(),
                    err
                ),
            }
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BackupStore for DirStore {
    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        Ok(names)
    }

    fn copy_in(&self, source: &Path, file_name: &str) -> Result<()> {
        let destination = self.root.join(file_name);
        let partial = self.root.join(format!(".{}{}", file_name, PARTIAL_SUFFIX));

        if let Err(source_err) = fs::copy(source, &partial) {
            let _ = fs::remove_file(&partial);
            return Err(Error::Copy {
                from: source.to_path_buf(),
                to: destination,
                source: source_err,
            });
        }

        fs::rename(&partial, &destination).map_err(|err| {
            let _ = fs::remove_file(&partial);
            Error::Copy {
                from: source.to_path_buf(),
                to: destination.clone(),
                source: err,
            }
        })
    }

    fn remove(&self, file_name: &str) -> Result<()> {
        let path = self.root.join(file_name);
        fs::remove_file(&path).map_err(|source| Error::Remove { path, source })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_nested_directory() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("a").join("b");
        let store = DirStore::open(&root).unwrap();
        assert!(store.root().is_dir());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_copy_in_leaves_no_partial_file() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("Campaign.Empire.turn5.save");
        fs::write(&source, b"turn five").unwrap();

        let store = DirStore::open(tmp.path().join("backups")).unwrap();
        store
            .copy_in(&source, "CampaignEmpire.turn5.1000.save")
            .unwrap();

        assert_eq!(store.list().unwrap(), vec!["CampaignEmpire.turn5.1000.save"]);
        let copied = fs::read(store.root().join("CampaignEmpire.turn5.1000.save")).unwrap();
        assert_eq!(copied, b"turn five");
    }

    #[test]
    fn test_open_removes_interrupted_copies() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join(".A.b.100.save.partial"), b"half").unwrap();
        fs::write(tmp.path().join("A.b.100.save"), b"whole").unwrap();
        fs::write(tmp.path().join(".hidden"), b"keep").unwrap();

        DirStore::open(tmp.path()).unwrap();

        assert!(!tmp.path().join(".A.b.100.save.partial").exists());
        assert!(tmp.path().join("A.b.100.save").exists());
        assert!(tmp.path().join(".hidden").exists());
    }

    #[test]
    fn test_copy_in_missing_source_fails() {
        let tmp = tempdir().unwrap();
        let store = DirStore::open(tmp.path().join("backups")).unwrap();

        let result = store.copy_in(&tmp.path().join("gone.save"), "X.y.1.save");
        assert!(matches!(result, Err(Error::Copy { .. })));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_skips_directories() {
        let tmp = tempdir().unwrap();
        let store = DirStore::open(tmp.path()).unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("A.b.1.save"), b"").unwrap();

        assert_eq!(store.list().unwrap(), vec!["A.b.1.save"]);
    }

    #[test]
    fn test_remove_missing_file_fails() {
        let tmp = tempdir().unwrap();
        let store = DirStore::open(tmp.path()).unwrap();
        assert!(matches!(
            store.remove("A.b.1.save"),
            Err(Error::Remove { .. })
        ));
    }
}
