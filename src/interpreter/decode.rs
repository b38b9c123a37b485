//! Instruction decoding
//!
//! An instruction word packs an opcode into its two rightmost decimal digits
//! and one addressing-mode digit per parameter into the digits to the left,
//! least-significant first:
//!
//! ```text
//!   1002  ->  opcode 02, modes [Position, Immediate, Position]
//!   ^^^^
//!   |||+- opcode (two digits)
//!   ||+-- mode of parameter 1
//!   |+--- mode of parameter 2
//!   +---- mode of parameter 3 (missing digits default to Position)
//! ```
//!
//! Only as many mode digits as the opcode has parameters are inspected; any
//! further leading digits are ignored.

use crate::interpreter::errors::RuntimeError;
use std::fmt;
use thiserror::Error;

/// Largest parameter count of any opcode
pub const MAX_PARAMS: usize = 3;

/// Decode failure, before the instruction pointer is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("illegal opcode {opcode}")]
    IllegalOpcode { opcode: i64 },
    #[error("unknown addressing mode {mode}")]
    UnknownMode { mode: i64 },
}

impl DecodeError {
    /// Attach the faulting word and instruction pointer
    pub fn at(self, word: i64, ip: usize) -> RuntimeError {
        match self {
            DecodeError::IllegalOpcode { opcode } => RuntimeError::IllegalOpcode { opcode, word, ip },
            DecodeError::UnknownMode { mode } => RuntimeError::UnknownMode { mode, word, ip },
        }
    }
}

/// Per-parameter addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Parameter is an address to dereference
    #[default]
    Position,
    /// Parameter is the literal value
    Immediate,
    /// Parameter is an offset from the relative base
    Relative,
}

impl TryFrom<i64> for Mode {
    type Error = DecodeError;

    fn try_from(digit: i64) -> Result<Self, Self::Error> {
        match digit {
            0 => Ok(Mode::Position),
            1 => Ok(Mode::Immediate),
            2 => Ok(Mode::Relative),
            mode => Err(DecodeError::UnknownMode { mode }),
        }
    }
}

/// The instruction set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Multiply,
    Input,
    Output,
    JumpIfTrue,
    JumpIfFalse,
    LessThan,
    Equals,
    AdjustRelativeBase,
    Halt,
}

impl Opcode {
    /// Number of parameter words following the instruction word
    pub fn arity(self) -> usize {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => 3,
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => 2,
            Opcode::Input | Opcode::Output | Opcode::AdjustRelativeBase => 1,
            Opcode::Halt => 0,
        }
    }

    /// Index of the parameter the instruction writes to, if any
    pub fn destination(self) -> Option<usize> {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => Some(2),
            Opcode::Input => Some(0),
            _ => None,
        }
    }

    /// Numeric code as it appears in memory
    pub fn code(self) -> i64 {
        match self {
            Opcode::Add => 1,
            Opcode::Multiply => 2,
            Opcode::Input => 3,
            Opcode::Output => 4,
            Opcode::JumpIfTrue => 5,
            Opcode::JumpIfFalse => 6,
            Opcode::LessThan => 7,
            Opcode::Equals => 8,
            Opcode::AdjustRelativeBase => 9,
            Opcode::Halt => 99,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "add",
            Opcode::Multiply => "mul",
            Opcode::Input => "in",
            Opcode::Output => "out",
            Opcode::JumpIfTrue => "jnz",
            Opcode::JumpIfFalse => "jz",
            Opcode::LessThan => "lt",
            Opcode::Equals => "eq",
            Opcode::AdjustRelativeBase => "arb",
            Opcode::Halt => "halt",
        }
    }
}

impl TryFrom<i64> for Opcode {
    type Error = DecodeError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Opcode::Add),
            2 => Ok(Opcode::Multiply),
            3 => Ok(Opcode::Input),
            4 => Ok(Opcode::Output),
            5 => Ok(Opcode::JumpIfTrue),
            6 => Ok(Opcode::JumpIfFalse),
            7 => Ok(Opcode::LessThan),
            8 => Ok(Opcode::Equals),
            9 => Ok(Opcode::AdjustRelativeBase),
            99 => Ok(Opcode::Halt),
            opcode => Err(DecodeError::IllegalOpcode { opcode }),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A decoded instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    modes: [Mode; MAX_PARAMS],
}

impl Instruction {
    /// Mode of parameter `index` (0-based)
    pub fn mode(&self, index: usize) -> Mode {
        self.modes.get(index).copied().unwrap_or_default()
    }

    /// Modes of the parameters this opcode actually takes
    pub fn modes(&self) -> &[Mode] {
        &self.modes[..self.opcode.arity()]
    }

    /// Words occupied by the instruction and its parameters
    pub fn width(&self) -> usize {
        1 + self.opcode.arity()
    }
}

/// Split a raw word into opcode and per-parameter modes
pub fn decode(word: i64) -> Result<Instruction, DecodeError> {
    if word < 0 {
        return Err(DecodeError::IllegalOpcode { opcode: word % 100 });
    }

    let opcode = Opcode::try_from(word % 100)?;
    let mut modes = [Mode::Position; MAX_PARAMS];
    let mut digits = word / 100;
    for mode in modes.iter_mut().take(opcode.arity()) {
        *mode = Mode::try_from(digits % 10)?;
        digits /= 10;
    }

    Ok(Instruction { opcode, modes })
}
