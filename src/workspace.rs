use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::TempDir;

use crate::error::Result;

/// Per-run scratch directory for aligned and masked rasters.
///
/// Removed when released or dropped, on success and error paths alike.
/// Removal failures are logged, never returned.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    pub fn create(parent: &Path, prefix: &str) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir_in(parent)?;
        let path = dir.path().to_path_buf();
        debug!("created workspace {}", path.display());

        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        self.path.join(name)
    }

    /// Best-effort removal; returns whether the directory is gone.
    pub fn release(mut self) -> bool {
        self.remove()
    }

    fn remove(&mut self) -> bool {
        let Some(dir) = self.dir.take() else {
            return true;
        };

        match dir.close() {
            Ok(()) => {
                debug!("removed workspace {}", self.path.display());
                true
            }
            Err(e) => {
                log_cleanup_failure(&self.path, &e);
                false
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.remove();
    }
}

fn log_cleanup_failure(path: &Path, err: &io::Error) {
    warn!(
        "unable to remove temp working dir: {} ({})",
        path.display(),
        err
    );
}
