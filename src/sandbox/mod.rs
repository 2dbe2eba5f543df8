//! Sandbox module - Isolated checker invocations
//!
//! Two layers:
//! - workspace: a uniquely-named per-invocation directory, destroyed on every
//!   exit path
//! - invoker: the external checker subprocess, run behind its resource-limit
//!   wrapper with captured output and a classified exit disposition

mod invoker;
mod workspace;

pub use invoker::{Checker, ExitDisposition, RawRun, UlimitChecker};
pub use workspace::Workspace;
