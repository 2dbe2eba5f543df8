//! Transcript module - Decoding the checker's console protocol
//!
//! The checker emits a fixed line-oriented transcript on stdout. This module
//! turns one captured transcript into a structured outcome, or a classified
//! protocol violation when the shape cannot be proven conformant.

mod decoder;
mod outcome;

pub use decoder::{Decoder, ABORT_MARKER, HEADER_PREFIX, OK_MARKER};
pub use outcome::{EvalResponse, Outcome, ProtocolViolation, ViolationBody};
