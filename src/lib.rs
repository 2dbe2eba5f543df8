//! # Twelfbox
//!
//! A sandboxed execution service for the Twelf proof checker.
//!
//! ## Features
//!
//! - **Isolated Invocations:** Every submission runs in its own uniquely-named
//!   working directory, destroyed on every exit path
//! - **Resource-Limited Checking:** The checker runs behind a ulimit wrapper;
//!   a resource-limit kill is a reportable result, not an error
//! - **Strict Transcript Decoding:** The checker's line protocol is decoded
//!   deterministically; any shape that cannot be proven conformant is rejected
//!   with a fixed classification message
//! - **Bounded Ingestion:** Request bodies are read through a streaming
//!   accumulator that aborts the instant the size ceiling is crossed

pub mod config;
pub mod error;
pub mod eval;
pub mod sandbox;
pub mod server;
pub mod transcript;

pub use config::Config;
pub use error::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const NAME: &str = env!("CARGO_PKG_NAME");
