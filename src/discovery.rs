use crate::error::{Error, Result};
use glob::{glob, Pattern};
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Where the game keeps its saves, relative to the roaming app-data folder.
pub const SAVE_DIR_SEGMENTS: [&str; 3] = ["The Creative Assembly", "Warhammer2", "save_games"];

/// Resolves the live save directory from `%APPDATA%`.
pub fn default_save_dir() -> Result<PathBuf> {
    let appdata = env::var_os("APPDATA").ok_or_else(|| {
        Error::SaveDirUnresolved("APPDATA is not set; pass --save-dir instead".to_string())
    })?;

    let mut dir = PathBuf::from(appdata);
    dir.extend(SAVE_DIR_SEGMENTS);
    Ok(dir)
}

/// Lists files in `save_dir` ending in `.<extension>`, sorted by path.
pub fn discover_saves(save_dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !save_dir.is_dir() {
        return Err(Error::SaveDirUnresolved(format!(
            "{} is not a directory",
            save_dir.display()
        )));
    }

    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&save_dir.to_string_lossy()),
        Pattern::escape(extension)
    );

    let mut saves = Vec::new();
    for entry in glob(&pattern)? {
        match entry {
            Ok(path) if path.is_file() => saves.push(path),
            Ok(_) => {}
            Err(err) => warn!("Skipping unreadable entry: {}", err),
        }
    }

    saves.sort();
    Ok(saves)
}
