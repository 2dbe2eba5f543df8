//! Evaluation pipeline - one submission, one isolated checker run
//!
//! Bridges the transport boundary to the sandbox and decoder: split the
//! request body into documents, persist them in a fresh workspace, run the
//! checker, classify the exit, decode the transcript, and always release the
//! workspace before returning.

use std::path::Path;

use tracing::warn;

use crate::config::TokenPlacement;
use crate::error::{Error, Result};
use crate::sandbox::{Checker, ExitDisposition, RawRun, Workspace};
use crate::transcript::{Decoder, EvalResponse, Outcome, ProtocolViolation};

/// Fixed filename of the prelude document inside a workspace
pub const PRELUDE_FILENAME: &str = "prelude.elf";

/// Fixed filename of the view document inside a workspace
pub const VIEW_FILENAME: &str = "view.elf";

/// One parsed submission: optional prelude (empty-string sentinel) plus view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub prelude: String,
    pub view: String,
}

impl Submission {
    /// Parse a request body: `view`, or `prelude NUL view`.
    ///
    /// More than one separator is malformed. Bytes are interpreted as lossy
    /// UTF-8, matching the service this one replaces.
    pub fn from_bytes(body: &[u8]) -> Result<Self> {
        let parts: Vec<&[u8]> = body.split(|b| *b == 0).collect();

        match parts.as_slice() {
            [view] => Ok(Submission {
                prelude: String::new(),
                view: String::from_utf8_lossy(view).into_owned(),
            }),
            [prelude, view] => Ok(Submission {
                prelude: String::from_utf8_lossy(prelude).into_owned(),
                view: String::from_utf8_lossy(view).into_owned(),
            }),
            _ => Err(Error::InvalidInput(
                "submission has more than two documents".to_string(),
            )),
        }
    }
}

/// Map an exit disposition and captured streams to a decode or a violation.
///
/// A resource-limit kill after useful partial output is a reportable result;
/// any other abnormal exit means the environment is broken and the transcript
/// is never decoded.
pub fn classify_and_decode(
    raw: &RawRun,
    decoder: &Decoder,
    prelude_path: &Path,
    view_path: &Path,
) -> std::result::Result<Outcome, ProtocolViolation> {
    match raw.disposition {
        ExitDisposition::Clean if !raw.stderr.is_empty() => {
            Err(ProtocolViolation::StderrNonEmpty)
        }
        ExitDisposition::Clean => decoder.decode(&raw.stdout, prelude_path, view_path, false),
        ExitDisposition::Killed => decoder.decode(&raw.stdout, prelude_path, view_path, true),
        ExitDisposition::Failed(code) => {
            warn!(
                ?code,
                stdout = %raw.stdout,
                stderr = %raw.stderr,
                "Checker failed outside the kill convention"
            );
            Err(ProtocolViolation::NotKilled)
        }
    }
}

/// Run one submission end to end.
///
/// The workspace is released on every control path; infrastructure failures
/// propagate as `Error` after cleanup, while violations and outcomes are
/// returned as values.
pub async fn evaluate(
    checker: &dyn Checker,
    workspace_root: &Path,
    placement: TokenPlacement,
    submission: &Submission,
) -> Result<EvalResponse> {
    let workspace = Workspace::acquire(workspace_root).await?;
    let reply = run_in_workspace(&workspace, checker, placement, submission).await;
    workspace.release().await;
    reply
}

async fn run_in_workspace(
    workspace: &Workspace,
    checker: &dyn Checker,
    placement: TokenPlacement,
    submission: &Submission,
) -> Result<EvalResponse> {
    let prelude_path = workspace
        .persist(PRELUDE_FILENAME, &submission.prelude)
        .await?;
    let view_path = workspace.persist(VIEW_FILENAME, &submission.view).await?;

    let raw = checker.run(&prelude_path, &view_path).await?;

    let decoder = Decoder::new(placement);
    Ok(
        match classify_and_decode(&raw, &decoder, &prelude_path, &view_path) {
            Ok(outcome) => outcome.into(),
            Err(violation) => violation.into(),
        },
    )
}
