//! Bit manipulation helpers shared by the filters.
//!
//! Everything here is `const` and branch-light. The quotient filter uses the mask and
//! word/offset helpers to address packed slots; the cuckoo and counting filters use
//! the power-of-two helpers to size their tables.
//!
//! # Usage
//!
//! - Rounding capacities up to a power of two (cuckoo bucket counts)
//! - Building masks for `q` and `r` bit fields without overflowing at 64 bits
//! - Splitting a bit position into a word index and an offset

#![allow(clippy::cast_possible_truncation)]

/// Check if a number is a power of two.
///
/// # Arguments
///
/// * `n` - Number to check
///
/// # Returns
///
/// `true` if n is a power of two, `false` otherwise (including for 0)
///
/// # Examples
///
/// ```
/// use amqcraft::util::bitops::is_power_of_two;
///
/// assert!(is_power_of_two(1));
/// assert!(is_power_of_two(1024));
/// assert!(!is_power_of_two(0));
/// assert!(!is_power_of_two(100));
/// ```
#[inline(always)]
#[must_use]
pub const fn is_power_of_two(n: usize) -> bool {
    n != 0 && (n & (n - 1)) == 0
}

/// Find the next power of two greater than or equal to `n`.
///
/// Returns 1 for 0. Saturates at the largest power of two a `usize` can hold instead
/// of overflowing.
///
/// # Examples
///
/// ```
/// use amqcraft::util::bitops::next_power_of_two;
///
/// assert_eq!(next_power_of_two(0), 1);
/// assert_eq!(next_power_of_two(5), 8);
/// assert_eq!(next_power_of_two(1024), 1024);
/// assert_eq!(next_power_of_two(usize::MAX), 1 << (usize::BITS - 1));
/// ```
#[inline]
#[must_use]
pub const fn next_power_of_two(n: usize) -> usize {
    const TOP: usize = 1 << (usize::BITS - 1);
    if n <= 1 {
        return 1;
    }
    if n > TOP {
        return TOP;
    }
    1 << (usize::BITS - (n - 1).leading_zeros())
}

/// Mask with the lowest `bits` bits set.
///
/// Unlike `(1 << bits) - 1` this is defined for `bits == 64`.
///
/// # Examples
///
/// ```
/// use amqcraft::util::bitops::low_mask;
///
/// assert_eq!(low_mask(0), 0);
/// assert_eq!(low_mask(4), 0b1111);
/// assert_eq!(low_mask(64), u64::MAX);
/// ```
#[inline(always)]
#[must_use]
pub const fn low_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Smallest `k` such that `2^k >= n`.
///
/// # Examples
///
/// ```
/// use amqcraft::util::bitops::ceil_log2;
///
/// assert_eq!(ceil_log2(1), 0);
/// assert_eq!(ceil_log2(2), 1);
/// assert_eq!(ceil_log2(3), 2);
/// assert_eq!(ceil_log2(2048), 11);
/// ```
#[inline]
#[must_use]
pub const fn ceil_log2(n: u64) -> u32 {
    if n <= 1 {
        0
    } else {
        u64::BITS - (n - 1).leading_zeros()
    }
}

/// Number of `u64` words needed to hold `bits` bits.
///
/// # Examples
///
/// ```
/// use amqcraft::util::bitops::bits_to_words;
///
/// assert_eq!(bits_to_words(0), 0);
/// assert_eq!(bits_to_words(64), 1);
/// assert_eq!(bits_to_words(65), 2);
/// ```
#[inline(always)]
#[must_use]
pub const fn bits_to_words(bits: usize) -> usize {
    (bits >> 6) + ((bits & 63 != 0) as usize)
}

/// Word index of bit position `bit`.
#[inline(always)]
#[must_use]
pub const fn word_index(bit: usize) -> usize {
    bit >> 6
}

/// Offset of bit position `bit` inside its word.
#[inline(always)]
#[must_use]
pub const fn bit_offset(bit: usize) -> u32 {
    (bit & 63) as u32
}
