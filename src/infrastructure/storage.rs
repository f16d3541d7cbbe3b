//! Temp-directory transient storage
//!
//! Every unit is a fresh directory created by `tempfile` with a random
//! suffix, so concurrent runs never collide and no locking is needed.

use crate::ports::{TransientStore, TransientUnit};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the program inside each unit.
pub const SOURCE_FILE: &str = "main.rs";

pub struct TempDirStore {
    parent: Option<PathBuf>,
    prefix: String,
}

impl TempDirStore {
    /// Units under the system temp directory.
    pub fn new() -> Self {
        Self {
            parent: None,
            prefix: "rectrace-".to_string(),
        }
    }

    /// Units under `parent` instead of the system temp directory.
    pub fn in_dir(parent: &Path) -> Self {
        Self {
            parent: Some(parent.to_path_buf()),
            prefix: "rectrace-".to_string(),
        }
    }
}

impl Default for TempDirStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransientStore for TempDirStore {
    fn create(&self, contents: &str) -> io::Result<TransientUnit> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&self.prefix);
        let dir = match &self.parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        let source = dir.path().join(SOURCE_FILE);
        // Until `keep` the directory is still removed on drop, so a failed
        // write leaves nothing behind.
        fs::write(&source, contents)?;
        let root = dir.keep();
        tracing::debug!(path = %root.display(), "[Storage] created transient unit");
        Ok(TransientUnit { root, source })
    }

    fn remove(&self, unit: &TransientUnit) -> io::Result<()> {
        match fs::remove_dir_all(&unit.root) {
            Ok(()) => {
                tracing::debug!(path = %unit.root.display(), "[Storage] removed transient unit");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
