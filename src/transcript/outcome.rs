//! Outcome and violation types
//!
//! Wire format matches the service this one replaces: a flat camelCase
//! outcome record on success, `{"error":true,"msg":...}` on violation.

use serde::Serialize;
use thiserror::Error;

/// Structured result of one conformant checker transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    /// Trimmed header line, e.g. `Twelf 1.7.1+ (built ...)`
    pub version: String,
    /// Whether the prelude document loaded successfully
    pub prelude_loaded: bool,
    /// Whether the run was terminated by the resource-limit wrapper
    pub killed: bool,
    /// Trailing server token, when the transcript carried one
    pub server: Option<String>,
    /// Checker output with sandbox paths redacted
    pub output: String,
}

/// A transcript shape that cannot be proven conformant.
///
/// Classification messages are fixed strings; callers must not synthesize
/// their own. Violations are recovered into an [`EvalResponse`], never
/// retried, and never treated as infrastructure errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("Unexpected response from Twelf: stderr was nonempty but process returned success.")]
    StderrNonEmpty,

    #[error("Unexpected response from Twelf: process returned failure but was not terminated by SIGKILL.")]
    NotKilled,

    #[error("Unexpected response from Twelf: standard header not provided")]
    MissingHeader,

    #[error("Unexpected response from Twelf: first chatter change was not successful")]
    FirstChatterFailed,

    #[error("Unexpected response from Twelf: second chatter change was not successful")]
    SecondChatterFailed,

    #[error("Unexpected response from Twelf: did not get expected 'opening file' message")]
    MissingOpenMarker,

    #[error("Unexpected response from Twelf: did not get expected 'closing file' message")]
    MissingCloseMarker,

    #[error("Unexpected response from Twelf: 'closing file' message was not the next-to-last line")]
    CloseMarkerMisplaced,

    #[error("Unexpected response from Twelf: no server token followed the 'closing file' message")]
    MissingServerToken,
}

/// What `POST /eval` serializes: a reportable outcome or a violation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EvalResponse {
    Report(Outcome),
    Violation(ViolationBody),
}

/// The `{"error":true,"msg":...}` violation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationBody {
    pub error: bool,
    pub msg: String,
}

impl From<Outcome> for EvalResponse {
    fn from(outcome: Outcome) -> Self {
        EvalResponse::Report(outcome)
    }
}

impl From<ProtocolViolation> for EvalResponse {
    fn from(violation: ProtocolViolation) -> Self {
        EvalResponse::Violation(ViolationBody {
            error: true,
            msg: violation.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_camel_case() {
        let outcome = Outcome {
            version: "Twelf 1.7.1".to_string(),
            prelude_loaded: true,
            killed: false,
            server: None,
            output: "OK.".to_string(),
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["preludeLoaded"], true);
        assert_eq!(json["server"], serde_json::Value::Null);
        assert_eq!(json["output"], "OK.");
    }

    #[test]
    fn test_violation_serializes_error_record() {
        let response = EvalResponse::from(ProtocolViolation::MissingHeader);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], true);
        assert_eq!(
            json["msg"],
            "Unexpected response from Twelf: standard header not provided"
        );
    }

    #[test]
    fn test_report_serializes_flat() {
        let response = EvalResponse::from(Outcome {
            version: "Twelf 1.7.1".to_string(),
            prelude_loaded: false,
            killed: true,
            server: Some("%% ABORT %%".to_string()),
            output: String::new(),
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["killed"], true);
        assert_eq!(json["server"], "%% ABORT %%");
        assert!(json.get("error").is_none());
    }
}
