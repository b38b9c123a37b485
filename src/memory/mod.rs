//! Memory model for the interpreter
//!
//! This module provides the engine's only storage abstraction:
//! - [`address_space`]: a zero-filled word store that grows on demand, dense
//!   near the origin and sparse beyond [`DENSE_LIMIT`]
//!
//! # Addressing
//!
//! Addresses arrive from programs as signed words. [`to_address`] is the single
//! place a word becomes a storage index; negative values are always
//! [`RuntimeError::OutOfBounds`]. There is no upper bound: programs routinely use
//! memory past their own static length as scratch space.

pub mod address_space;

pub use address_space::{AddressSpace, DENSE_LIMIT};

use crate::interpreter::errors::RuntimeError;

/// Convert a program word into a storage index
pub fn to_address(word: i64) -> Result<usize, RuntimeError> {
    usize::try_from(word).map_err(|_| RuntimeError::OutOfBounds { address: word })
}
