//! Runtime error types for the interpreter
//!
//! This module defines [`RuntimeError`], which represents every fatal condition
//! that can occur while an engine executes (as opposed to load-time
//! [`ProgramError`](crate::program::ProgramError)s).
//!
//! All runtime errors are fatal. The engine never mutates its state during a
//! failing step, so the instruction pointer, relative base and memory stay
//! frozen at the faulting instruction for inspection. Starvation on input is
//! *not* an error: it is reported through
//! [`OutputEvent::AwaitingInput`](crate::interpreter::engine::OutputEvent).

use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Negative address on read, write or jump
    #[error("address {address} is out of bounds")]
    OutOfBounds { address: i64 },

    /// Mode digit outside {0, 1, 2}
    #[error("unknown addressing mode {mode} in instruction {word} at ip {ip}")]
    UnknownMode { mode: i64, word: i64, ip: usize },

    /// Immediate mode used for a parameter the instruction writes to
    #[error("parameter {param} of instruction {word} at ip {ip} is a destination in immediate mode")]
    InvalidDestinationMode { param: usize, word: i64, ip: usize },

    /// Opcode not in the instruction set
    #[error("illegal opcode {opcode} (word {word}) at ip {ip}")]
    IllegalOpcode { opcode: i64, word: i64, ip: usize },

    /// Result does not fit in a 64-bit word
    #[error("integer overflow in {operation} at ip {ip}")]
    ArithmeticOverflow { operation: &'static str, ip: usize },

    /// Configured step ceiling reached without halting
    #[error("step limit of {limit} exceeded at ip {ip}")]
    StepLimitExceeded { limit: u64, ip: usize },
}

impl RuntimeError {
    /// Instruction pointer at which the fault happened, when known
    pub fn ip(&self) -> Option<usize> {
        match self {
            RuntimeError::OutOfBounds { .. } => None,
            RuntimeError::UnknownMode { ip, .. } => Some(*ip),
            RuntimeError::InvalidDestinationMode { ip, .. } => Some(*ip),
            RuntimeError::IllegalOpcode { ip, .. } => Some(*ip),
            RuntimeError::ArithmeticOverflow { ip, .. } => Some(*ip),
            RuntimeError::StepLimitExceeded { ip, .. } => Some(*ip),
        }
    }

    /// Faulting address for memory errors
    pub fn address(&self) -> Option<i64> {
        match self {
            RuntimeError::OutOfBounds { address } => Some(*address),
            _ => None,
        }
    }
}
