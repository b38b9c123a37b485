//! Program text loading
//!
//! A program is a flat sequence of signed 64-bit words written as
//! comma-separated decimal literals, e.g. `3,9,8,9,10,9,4,9,99,-1,8`.
//!
//! Parsing is all-or-nothing: a single bad token rejects the whole text and
//! no [`Program`] is produced. Whitespace around tokens (including the trailing
//! newline of a program file) is ignored.
//!
//! A [`Program`] is immutable. Engines copy it into their own address space,
//! so any number of engines may be built from one program without interference.

use crate::memory::DENSE_LIMIT;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Load-time failure: the text is not a valid program
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    #[error("malformed program: token {index} ({token:?}) is not an integer")]
    Malformed { index: usize, token: String },

    #[error("patch address {address} is too far past the end of the program")]
    PatchOutOfRange { address: usize },
}

/// An immutable sequence of words, the initial contents of an address space
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    words: Vec<i64>,
}

impl Program {
    /// Parse comma-separated program text
    pub fn parse(text: &str) -> Result<Self, ProgramError> {
        let words = text
            .split(',')
            .enumerate()
            .map(|(index, token)| {
                let token = token.trim();
                token.parse::<i64>().map_err(|_| ProgramError::Malformed {
                    index,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Program { words })
    }

    pub fn from_words(words: Vec<i64>) -> Self {
        Program { words }
    }

    pub fn words(&self) -> &[i64] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Return a copy with the given `(address, value)` words replaced.
    ///
    /// Addresses past the end zero-extend the copy, up to [`DENSE_LIMIT`].
    /// Used for pre-run patching such as writing a noun and verb into
    /// addresses 1 and 2.
    pub fn patched(&self, patches: &[(usize, i64)]) -> Result<Self, ProgramError> {
        let mut words = self.words.clone();
        for &(address, value) in patches {
            if address >= words.len() {
                if address >= DENSE_LIMIT {
                    return Err(ProgramError::PatchOutOfRange { address });
                }
                words.resize(address + 1, 0);
            }
            words[address] = value;
        }
        Ok(Program { words })
    }
}

impl FromStr for Program {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Program::parse(s)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", word)?;
        }
        Ok(())
    }
}
