//! Line-oriented transcript decoding
//!
//! The checker's transcript has a fixed prologue (header, two setup
//! acknowledgements, prelude-load acknowledgement) followed by one of two
//! tails: the view document's open/close markers bracketing the output, or —
//! when the prelude failed to load — raw output up to an abort marker.
//!
//! Decoding is a pure function of the transcript text, the two sandbox file
//! paths (used only for marker matching and redaction), the `killed` flag,
//! and the configured token placement. A killed run may legitimately truncate
//! the tail; every other deviation from the expected shape is a violation.

use std::path::Path;

use crate::config::TokenPlacement;
use crate::transcript::outcome::{Outcome, ProtocolViolation};

/// Header prefix identifying the tool; the full line is the version string
pub const HEADER_PREFIX: &str = "Twelf ";

/// Acknowledgement the checker prints after each successful server command
pub const OK_MARKER: &str = "%% OK %%";

/// Marker the checker prints when a load aborts
pub const ABORT_MARKER: &str = "%% ABORT %%";

fn opening_marker(path: &Path) -> String {
    format!("[Opening file {}]", path.display())
}

fn closing_marker(path: &Path) -> String {
    format!("[Closing file {}]", path.display())
}

/// Transcript decoder for a fixed token-placement convention
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    placement: TokenPlacement,
}

impl Decoder {
    /// Create a decoder for the given token-placement convention
    pub fn new(placement: TokenPlacement) -> Self {
        Decoder { placement }
    }

    /// Decode one captured stdout transcript.
    ///
    /// `killed` relaxes exactly one check: a missing closing marker on a
    /// truncated tail. Everything else is enforced identically for killed and
    /// clean runs.
    pub fn decode(
        &self,
        stdout: &str,
        prelude_path: &Path,
        view_path: &Path,
        killed: bool,
    ) -> Result<Outcome, ProtocolViolation> {
        let lines: Vec<&str> = stdout.trim().split('\n').collect();

        let header = lines.first().copied().unwrap_or("");
        if !header.starts_with(HEADER_PREFIX) {
            return Err(ProtocolViolation::MissingHeader);
        }
        let version = header.trim().to_string();

        // Line 1 acknowledges the server load, line 2 the initial chatter
        // change. Loose on purpose: rejected only when BOTH acknowledgements
        // are absent. Kept for parity with the deployed service.
        if lines.get(1).copied() != Some(OK_MARKER) && lines.get(2).copied() != Some(OK_MARKER) {
            return Err(ProtocolViolation::FirstChatterFailed);
        }

        let mut output: Vec<&str> = Vec::new();
        let prelude_loaded;
        let mut server = None;

        if lines.get(3).copied() == Some(OK_MARKER) {
            // Prelude loaded: the output is the view document's load result.
            prelude_loaded = true;

            if lines.get(4).copied() != Some(OK_MARKER) {
                return Err(ProtocolViolation::SecondChatterFailed);
            }

            let opening = opening_marker(view_path);
            if lines.get(5).copied() != Some(opening.as_str()) {
                return Err(ProtocolViolation::MissingOpenMarker);
            }

            let closing = closing_marker(view_path);
            let mut i = 6;
            while i < lines.len() && lines[i] != closing {
                output.push(lines[i]);
                i += 1;
            }

            if i == lines.len() {
                // A killed run may be truncated before the closing marker;
                // its partial output is reported without a server token.
                if !killed {
                    return Err(ProtocolViolation::MissingCloseMarker);
                }
            } else {
                match self.placement {
                    TokenPlacement::NextToLast => {
                        if i != lines.len() - 2 {
                            return Err(ProtocolViolation::CloseMarkerMisplaced);
                        }
                        server = Some(lines[i + 1].to_string());
                    }
                    TokenPlacement::FinalLine => {
                        if i == lines.len() - 1 {
                            return Err(ProtocolViolation::MissingServerToken);
                        }
                        output.extend_from_slice(&lines[i + 1..lines.len() - 1]);
                        server = Some(lines[lines.len() - 1].to_string());
                    }
                }
            }
        } else {
            // Prelude failed to load: the output is the prelude's load
            // result, up to the abort marker when one was reached.
            prelude_loaded = false;

            let mut i = 4;
            while i < lines.len() && lines[i] != ABORT_MARKER {
                output.push(lines[i]);
                i += 1;
            }
            if i < lines.len() {
                server = Some(ABORT_MARKER.to_string());
            }
        }

        let output = redact(output.join("\n"), prelude_path, view_path);

        Ok(Outcome {
            version,
            prelude_loaded,
            killed,
            server,
            output,
        })
    }
}

/// Replace every literal occurrence of either sandbox path with its fixed
/// basename, so no host filesystem path leaks to the caller.
fn redact(text: String, prelude_path: &Path, view_path: &Path) -> String {
    let mut text = text;
    for path in [prelude_path, view_path] {
        let literal = path.display().to_string();
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            text = text.replace(&literal, name);
        }
    }
    text
}
