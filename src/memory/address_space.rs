//! Address space implementation for the interpreter
//!
//! This module provides the word store owned by each engine:
//! - Zero-filled growth on write past the current extent
//! - Reads past the extent yield 0 without materializing storage
//! - Negative addresses rejected on both read and write
//!
//! Growth is lazy: a read beyond the extent behaves exactly as if the space had
//! been extended with zeros, but storage is only allocated once something is
//! written there. Callers never see the difference.
//!
//! # Dense and sparse regions
//!
//! Words below [`DENSE_LIMIT`] (or below the initial program length, if that is
//! larger) live in a contiguous `Vec`. Writes further out go to an
//! [`FxHashMap`] keyed by index, so a program may use any non-negative address
//! without the store trying to allocate everything in between.

use super::to_address;
use crate::interpreter::errors::RuntimeError;
use rustc_hash::FxHashMap;

/// Highest index (exclusive) the dense region will grow to
pub const DENSE_LIMIT: usize = 1 << 20;

/// A dynamically growing, zero-filled integer memory
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressSpace {
    words: Vec<i64>,
    sparse: FxHashMap<usize, i64>,
}

impl AddressSpace {
    /// Create an address space whose initial contents are `words`
    pub fn new(words: &[i64]) -> Self {
        AddressSpace {
            words: words.to_vec(),
            sparse: FxHashMap::default(),
        }
    }

    /// Read the word at `address`
    pub fn read(&self, address: i64) -> Result<i64, RuntimeError> {
        let index = to_address(address)?;
        Ok(self.get(index))
    }

    /// Write `value` at `address`, zero-filling any gap
    pub fn write(&mut self, address: i64, value: i64) -> Result<(), RuntimeError> {
        let index = to_address(address)?;
        self.set(index, value);
        Ok(())
    }

    /// Read by storage index (never fails)
    pub fn get(&self, index: usize) -> i64 {
        match self.words.get(index) {
            Some(&word) => word,
            None => self.sparse.get(&index).copied().unwrap_or(0),
        }
    }

    /// Write by storage index (never fails)
    pub fn set(&mut self, index: usize, value: i64) {
        if index < self.words.len() {
            self.words[index] = value;
        } else if index < DENSE_LIMIT {
            self.words.resize(index + 1, 0);
            self.words[index] = value;
        } else {
            self.sparse.insert(index, value);
        }
    }

    /// Length of the dense region
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when nothing has been materialized in either region
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.sparse.is_empty()
    }

    /// Dense contents (for UI display)
    pub fn words(&self) -> &[i64] {
        &self.words
    }

    /// Words written past the dense region, sorted by address
    pub fn sparse_words(&self) -> Vec<(usize, i64)> {
        let mut entries: Vec<_> = self.sparse.iter().map(|(&a, &w)| (a, w)).collect();
        entries.sort_unstable_by_key(|&(address, _)| address);
        entries
    }

    /// Estimated heap footprint in bytes
    pub fn estimated_size(&self) -> usize {
        // Sparse entries carry their key alongside the word
        self.words.len() * std::mem::size_of::<i64>()
            + self.sparse.len() * (std::mem::size_of::<usize>() + std::mem::size_of::<i64>())
    }
}
