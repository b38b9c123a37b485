//! Virtual machine execution
//!
//! This module provides the core execution logic:
//! - [`decode`]: Instruction word → opcode and addressing modes
//! - [`engine`]: Fetch-decode-execute loop with suspend/resume I/O
//! - [`errors`]: Runtime error types
//! - [`disasm`]: Listing of memory as instructions, for display
//!
//! # Execution Model
//!
//! An engine executes one instruction per step. Output and input starvation
//! are suspension points that return control to the caller without losing the
//! engine's place; see [`engine`] for the contract.

pub mod decode;
pub mod disasm;
pub mod engine;
pub mod errors;

pub use engine::{Engine, OutputEvent, RunStatus, Step};
pub use errors::RuntimeError;
