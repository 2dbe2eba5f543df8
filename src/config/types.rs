//! Configuration types
//!
//! Serde-backed types with per-field defaults so a partial config file (or no
//! file at all) always yields a runnable configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Checker subprocess configuration
    #[serde(default)]
    pub checker: CheckerConfig,
    /// Transcript decoder configuration
    #[serde(default)]
    pub decoder: DecoderConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request body size ceiling in bytes, enforced while streaming
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: default_bind(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    250_000
}

/// Checker subprocess configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Resource-limit wrapper command, invoked with two positional file paths
    #[serde(default = "default_command")]
    pub command: PathBuf,
    /// Root directory under which per-invocation workspaces are created
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,
    /// Exit code the wrapper reports for a resource-limit kill (128 + SIGKILL)
    #[serde(default = "default_kill_exit_code")]
    pub kill_exit_code: i32,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            command: default_command(),
            workspace_root: default_workspace_root(),
            kill_exit_code: default_kill_exit_code(),
        }
    }
}

fn default_command() -> PathBuf {
    PathBuf::from("/twelf-ulimit.sh")
}

fn default_workspace_root() -> PathBuf {
    std::env::temp_dir()
}

fn default_kill_exit_code() -> i32 {
    137
}

/// Transcript decoder configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Trailing-token placement convention of the deployed checker build
    #[serde(default)]
    pub token_placement: TokenPlacement,
}

/// Where the checker's server token sits relative to the closing file marker.
///
/// The two conventions correspond to different checker builds and are never
/// inferred from a transcript at runtime: a transcript that does not match
/// the configured convention is a protocol violation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenPlacement {
    /// The closing marker is the second-to-last line; the final line is the
    /// server token. Matches the wrapper's deployed checker build.
    #[default]
    NextToLast,
    /// The final line is the server token; lines between the closing marker
    /// and the final line belong to the output.
    FinalLine,
}

impl std::str::FromStr for TokenPlacement {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "next-to-last" | "next_to_last" => Ok(TokenPlacement::NextToLast),
            "final-line" | "final_line" => Ok(TokenPlacement::FinalLine),
            _ => Err(crate::error::Error::Config(format!(
                "Invalid token placement: {}. Valid: next-to-last, final-line",
                s
            ))),
        }
    }
}

impl std::fmt::Display for TokenPlacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenPlacement::NextToLast => write!(f, "next-to-last"),
            TokenPlacement::FinalLine => write!(f, "final-line"),
        }
    }
}
