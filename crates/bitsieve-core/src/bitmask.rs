//! Owned bitmask produced by the column filter.
//!
//! Storage is LSB-first bytes, the same layout the engine writes: bit `i`
//! lives in byte `i / 8` at position `i % 8`. Bits past `len` are always zero.

use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};

/// Packed row-selection result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BitMask {
    bytes: Vec<u8>,
    len: usize,
}

impl BitMask {
    /// All-zero mask of `len` bits.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self {
            bytes: vec![0; len.div_ceil(8)],
            len,
        }
    }

    /// Wraps packed bytes, keeping the first `len` bits.
    ///
    /// The buffer is resized to `len.div_ceil(8)` bytes and trailing bits are
    /// cleared.
    #[must_use]
    pub fn from_bytes(mut bytes: Vec<u8>, len: usize) -> Self {
        bytes.resize(len.div_ceil(8), 0);
        let mut mask = Self { bytes, len };
        mask.clear_tail();
        mask
    }

    /// Builds a mask from booleans.
    #[must_use]
    pub fn from_bools(bits: &[bool]) -> Self {
        let mut mask = Self::zeros(bits.len());
        for (i, _) in bits.iter().enumerate().filter(|(_, &b)| b) {
            mask.bytes[i / 8] |= 1 << (i % 8);
        }
        mask
    }

    /// Number of bits.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the mask holds no bits.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Packed bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Consumes the mask, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Reads bit `index`; out-of-range indices read as `false`.
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        index < self.len && (self.bytes[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Writes bit `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn set(&mut self, index: usize, value: bool) {
        assert!(index < self.len, "bit {index} out of range for mask of {} bits", self.len);
        let bit = 1u8 << (index % 8);
        if value {
            self.bytes[index / 8] |= bit;
        } else {
            self.bytes[index / 8] &= !bit;
        }
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Indices of set bits, ascending.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bytes
            .iter()
            .enumerate()
            .filter(|(_, &byte)| byte != 0)
            .flat_map(|(i, &byte)| {
                (0..8)
                    .filter(move |bit| (byte >> bit) & 1 == 1)
                    .map(move |bit| i * 8 + bit)
            })
    }

    /// Set bits as a `RoaringBitmap`.
    ///
    /// Indices that do not fit in `u32` are skipped.
    #[must_use]
    pub fn to_roaring(&self) -> RoaringBitmap {
        self.iter_ones()
            .filter_map(|idx| u32::try_from(idx).ok())
            .collect()
    }

    /// Zeroes the bits past `len` in the last byte.
    pub(crate) fn clear_tail(&mut self) {
        let used = self.len % 8;
        if used != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= (1u8 << used) - 1;
            }
        }
    }
}
