//! Configuration module
//!
//! Split into focused submodules:
//! - types.rs: configuration types (Config, ServerConfig, CheckerConfig, DecoderConfig)
//! - io.rs: loading, environment overrides, and startup validation

mod io;
mod types;

pub use types::{CheckerConfig, Config, DecoderConfig, ServerConfig, TokenPlacement};

pub use io::{apply_env_overrides, load_config, load_config_from_path, validate_config};
