//! Checker subprocess invocation
//!
//! Runs the external checker behind its resource-limit wrapper and captures
//! everything needed for decoding: full stdout, full stderr, and a classified
//! exit disposition. The wrapper is the sole timeout/cancellation mechanism;
//! this layer never kills the child itself.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// How the checker process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDisposition {
    /// Exited successfully
    Clean,
    /// Terminated by the resource-limit wrapper's kill convention
    Killed,
    /// Any other abnormal exit, with the code when one exists
    Failed(Option<i32>),
}

/// Captured result of one checker run
#[derive(Debug, Clone)]
pub struct RawRun {
    /// Full standard output, possibly truncated mid-line on a killed run
    pub stdout: String,
    /// Full standard error
    pub stderr: String,
    /// Classified exit disposition
    pub disposition: ExitDisposition,
}

/// Trait for checker backends
///
/// The server is written against this seam so tests can substitute a stub
/// emitting canned transcripts.
#[async_trait]
pub trait Checker: Send + Sync {
    /// Run the checker on the two persisted documents
    async fn run(&self, prelude: &Path, view: &Path) -> Result<RawRun>;
}

/// The production checker: a wrapper script enforcing CPU/memory/time limits
/// around the real binary, invoked with two positional file paths.
pub struct UlimitChecker {
    command: PathBuf,
    kill_exit_code: i32,
}

impl UlimitChecker {
    /// Create a checker for the given wrapper command
    pub fn new(command: PathBuf, kill_exit_code: i32) -> Self {
        UlimitChecker {
            command,
            kill_exit_code,
        }
    }

    fn classify(&self, status: &std::process::ExitStatus) -> ExitDisposition {
        if status.success() {
            return ExitDisposition::Clean;
        }
        if status.code() == Some(self.kill_exit_code) {
            return ExitDisposition::Killed;
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            // SIGKILL delivered directly, before the shell could map it to 128+9
            if status.signal() == Some(9) {
                return ExitDisposition::Killed;
            }
        }
        ExitDisposition::Failed(status.code())
    }
}

#[async_trait]
impl Checker for UlimitChecker {
    async fn run(&self, prelude: &Path, view: &Path) -> Result<RawRun> {
        debug!(
            "Invoking {} on {} and {}",
            self.command.display(),
            prelude.display(),
            view.display()
        );

        let output = Command::new(&self.command)
            .arg(prelude)
            .arg(view)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                Error::Checker(format!(
                    "Failed to run {}: {}",
                    self.command.display(),
                    e
                ))
            })?;

        let disposition = self.classify(&output.status);
        debug!("Checker exited: {:?}", disposition);

        Ok(RawRun {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            disposition,
        })
    }
}
