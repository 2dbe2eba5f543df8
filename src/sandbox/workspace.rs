//! Per-invocation workspace directories
//!
//! Each submission gets a directory named `twelf-<uuid>` under the configured
//! root. Uuid-v4 names keep concurrent invocations collision-free without any
//! shared state. The directory never outlives its request: callers release it
//! explicitly, and `Drop` removes whatever is left if they could not.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};

/// An isolated working directory owned by a single invocation
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    released: bool,
}

impl Workspace {
    /// Create a fresh uniquely-named directory under `root`.
    ///
    /// The root itself is created if missing.
    pub async fn acquire(root: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(root).await.map_err(|e| {
            Error::Sandbox(format!(
                "Failed to create workspace root {}: {}",
                root.display(),
                e
            ))
        })?;

        let dir = root.join(format!("twelf-{}", Uuid::new_v4()));
        tokio::fs::create_dir(&dir).await.map_err(|e| {
            Error::Sandbox(format!("Failed to create workspace {}: {}", dir.display(), e))
        })?;

        debug!("Acquired workspace {}", dir.display());
        Ok(Workspace {
            dir,
            released: false,
        })
    }

    /// The workspace directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one input document verbatim at a fixed filename inside the
    /// workspace, returning the absolute path.
    pub async fn persist(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.dir.join(name);
        tokio::fs::write(&path, content).await.map_err(|e| {
            Error::Sandbox(format!("Failed to write {}: {}", path.display(), e))
        })?;
        Ok(path)
    }

    /// Recursively remove the directory and everything in it.
    ///
    /// Idempotent: a directory that is already gone is not an error.
    pub async fn release(mut self) {
        self.released = true;
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => debug!("Released workspace {}", self.dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to release workspace {}: {}", self.dir.display(), e),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        // Reached only when the owning request unwound before `release`.
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "Failed to remove workspace {} on drop: {}",
                    self.dir.display(),
                    e
                );
            }
        }
    }
}
