use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::core::errors::AppResult;

/// A per-document scratch directory, removed when dropped.
///
/// The directory name combines a millisecond timestamp with a random suffix,
/// so concurrent documents never share one.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScratchSpace {
    pub fn create(root: &Path) -> AppResult<Self> {
        std::fs::create_dir_all(root)?;
        let prefix = format!("docqa-{}-", Utc::now().format("%Y%m%d%H%M%S%3f"));
        let dir = tempfile::Builder::new().prefix(&prefix).tempdir_in(root)?;
        let path = dir.path().to_path_buf();
        debug!(path = %path.display(), "created scratch workspace");
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source_path(&self) -> PathBuf {
        self.path.join("source.pdf")
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.path.join("pages")
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!(path = %self.path.display(), "removed scratch workspace"),
                Err(err) => warn!(path = %self.path.display(), error = %err, "failed to remove scratch workspace"),
            }
        }
    }
}
