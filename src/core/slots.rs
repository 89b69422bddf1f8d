//! Fixed-width slot storage packed into 64-bit words.
//!
//! A quotient filter stores `r + 3` bits per slot, which is rarely a divisor of 64, so
//! slots routinely straddle two words. [`PackedSlots`] hides that arithmetic behind
//! `get`/`set`.
//!
//! # Memory Layout
//!
//! Slot `i` occupies bits `[i * width, (i + 1) * width)` of the word array, least
//! significant bit first:
//!
//! ```text
//! width = 7
//! Word 0: [slot 0: bits 0..7][slot 1: 7..14] ... [slot 9: 63..64)
//! Word 1: [slot 9 cont.: 0..6][slot 10: 6..13] ...
//! ```
//!
//! # Examples
//!
//! ```
//! use amqcraft::core::slots::PackedSlots;
//!
//! let mut slots = PackedSlots::new(16, 7).unwrap();
//! slots.set(9, 0b101_0101);
//! assert_eq!(slots.get(9), 0b101_0101);
//! assert_eq!(slots.get(8), 0);
//! ```

use crate::error::{AmqCraftError, Result};
use crate::util::bitops::{bit_offset, bits_to_words, low_mask, word_index};

/// Array of `len` slots, each `width` bits wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedSlots {
    /// Backing words
    words: Vec<u64>,

    /// Bits per slot, 1..=64
    width: u32,

    /// Number of slots
    len: usize,

    /// Mask of the low `width` bits
    mask: u64,
}

impl PackedSlots {
    /// Allocate `len` zeroed slots of `width` bits.
    ///
    /// # Errors
    ///
    /// - [`AmqCraftError::InvalidParameters`] if `width` is 0 or above 64
    /// - [`AmqCraftError::InvalidFilterSize`] if `len * width` bits cannot be addressed
    pub fn new(len: usize, width: u32) -> Result<Self> {
        if width == 0 || width > 64 {
            return Err(AmqCraftError::invalid_parameters(format!(
                "slot width must be in 1..=64, got {}",
                width
            )));
        }

        let total_bits = len
            .checked_mul(width as usize)
            .ok_or_else(|| AmqCraftError::invalid_filter_size(len as u128 * u128::from(width)))?;

        // Bytes must fit an isize for the allocation to be valid.
        let words = bits_to_words(total_bits);
        if words > (isize::MAX as usize) / 8 {
            return Err(AmqCraftError::invalid_filter_size(total_bits as u128));
        }

        Ok(Self {
            words: vec![0; words],
            width,
            len,
            mask: low_mask(width),
        })
    }

    /// Number of slots.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no slots.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bits per slot.
    #[must_use]
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Read slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[must_use]
    #[inline]
    pub fn get(&self, index: usize) -> u64 {
        assert!(index < self.len, "slot {} out of range {}", index, self.len);

        let bit = index * self.width as usize;
        let word = word_index(bit);
        let offset = bit_offset(bit);

        let mut value = self.words[word] >> offset;
        if offset + self.width > 64 {
            value |= self.words[word + 1] << (64 - offset);
        }
        value & self.mask
    }

    /// Write slot `index`. Bits of `value` above the slot width are dropped.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[inline]
    pub fn set(&mut self, index: usize, value: u64) {
        assert!(index < self.len, "slot {} out of range {}", index, self.len);

        let value = value & self.mask;
        let bit = index * self.width as usize;
        let word = word_index(bit);
        let offset = bit_offset(bit);

        self.words[word] = (self.words[word] & !(self.mask << offset)) | (value << offset);

        if offset + self.width > 64 {
            let spilled = 64 - offset;
            let high_mask = self.mask >> spilled;
            self.words[word + 1] = (self.words[word + 1] & !high_mask) | (value >> spilled);
        }
    }

    /// Zero every slot.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Heap bytes used by the backing words.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.words.len() * std::mem::size_of::<u64>()
    }
}
