//! Sizing formulas for the filters in this crate.
//!
//! # Quotient Filter
//!
//! A quotient filter with `q` quotient bits and `r` remainder bits holds `2^q` slots.
//! Sizing for `n` keys at false positive probability `p`:
//!
//! - `q = ceil(log2(2n))`, so the filter is half full at `n` keys
//! - `r = ceil(-log2(p))`
//!
//! With `a = len / 2^q`, the false positive probability is `1 - e^(-a / 2^r)`, which
//! never exceeds `2^-r`.
//!
//! # Cuckoo Filter
//!
//! Buckets hold 4 one-byte fingerprints drawn from 255 non-zero values. A lookup probes
//! 8 slots, so at load `α` the false positive rate is about `1 - (1 - 1/255)^(8α)`.
//!
//! Four-slot buckets stop accepting inserts somewhere around 95% load, so a filter
//! sized for `n` keys gets at least `n / 0.95` slots, rounded up to a power of two.
//!
//! # Counting Filter
//!
//! One table of 4096 buckets of height 8 per 32768 expected keys, and never fewer than
//! one table.
//!
//! # References
//!
//! - Bender et al. (2012). "Don't Thrash: How to Cache Your Hash on Flash"
//! - Fan et al. (2014). "Cuckoo Filter: Practically Better Than Bloom"

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use crate::error::{AmqCraftError, Result};
use crate::util::bitops::{ceil_log2, next_power_of_two};

/// Width of the hash every filter consumes.
pub const HASH_BITS: u32 = 64;

/// Metadata bits per quotient-filter slot (occupied, continuation, shifted).
pub const SLOT_METADATA_BITS: u32 = 3;

/// Largest remainder that still fits a slot in one `u64`.
pub const MAX_REMAINDER_BITS: u32 = HASH_BITS - SLOT_METADATA_BITS;

/// Fingerprint slots per cuckoo bucket.
pub const CUCKOO_BUCKET_SIZE: usize = 4;

/// Distinct non-zero cuckoo fingerprints.
pub const CUCKOO_FINGERPRINT_VALUES: u64 = 255;

/// Highest slot load, in percent, a cuckoo filter is sized to reach at capacity.
pub const CUCKOO_MAX_LOAD_PERCENT: usize = 95;

/// Fingerprint slots per counting-filter bucket.
pub const COUNTING_BUCKET_HEIGHT: usize = 8;

/// Buckets per counting-filter table.
pub const COUNTING_CAPACITY_BUCKETS: usize = 4096;

/// Check that `q` and `r` describe a constructible quotient filter.
///
/// # Errors
///
/// - [`AmqCraftError::InvalidParameters`] if either is 0 or `r` exceeds
///   [`MAX_REMAINDER_BITS`]
/// - [`AmqCraftError::BitWidthExceeded`] if `q + r > 64`
///
/// # Examples
///
/// ```
/// use amqcraft::core::params::validate_quotient_bits;
///
/// assert!(validate_quotient_bits(5, 4).is_ok());
/// assert!(validate_quotient_bits(40, 30).is_err());
/// assert!(validate_quotient_bits(0, 4).is_err());
/// ```
pub fn validate_quotient_bits(q_bits: u32, r_bits: u32) -> Result<()> {
    if q_bits == 0 {
        return Err(AmqCraftError::invalid_parameters("q_bits must be at least 1"));
    }
    if r_bits == 0 {
        return Err(AmqCraftError::invalid_parameters("r_bits must be at least 1"));
    }
    if q_bits.saturating_add(r_bits) > HASH_BITS {
        return Err(AmqCraftError::bit_width_exceeded(q_bits, r_bits, HASH_BITS));
    }
    if r_bits > MAX_REMAINDER_BITS {
        return Err(AmqCraftError::invalid_parameters(format!(
            "r_bits must be at most {}, got {}",
            MAX_REMAINDER_BITS, r_bits
        )));
    }
    Ok(())
}

/// Quotient bits needed to hold `capacity` keys at half load.
///
/// # Errors
///
/// Returns [`AmqCraftError::InvalidCapacity`] if `capacity == 0`.
///
/// # Examples
///
/// ```
/// use amqcraft::core::params::quotient_bits_for_capacity;
///
/// assert_eq!(quotient_bits_for_capacity(1).unwrap(), 1);
/// assert_eq!(quotient_bits_for_capacity(1000).unwrap(), 11);
/// assert_eq!(quotient_bits_for_capacity(1024).unwrap(), 11);
/// ```
pub fn quotient_bits_for_capacity(capacity: usize) -> Result<u32> {
    if capacity == 0 {
        return Err(AmqCraftError::invalid_capacity(capacity));
    }
    let doubled = (capacity as u64).saturating_mul(2);
    Ok(ceil_log2(doubled).max(1))
}

/// Remainder bits needed for false positive probability `p`.
///
/// # Errors
///
/// Returns [`AmqCraftError::FalsePositiveRateOutOfBounds`] unless `0 < p < 1`.
///
/// # Examples
///
/// ```
/// use amqcraft::core::params::remainder_bits_for_probability;
///
/// assert_eq!(remainder_bits_for_probability(0.5).unwrap(), 1);
/// assert_eq!(remainder_bits_for_probability(0.01).unwrap(), 7);
/// assert_eq!(remainder_bits_for_probability(0.001).unwrap(), 10);
/// ```
pub fn remainder_bits_for_probability(p: f64) -> Result<u32> {
    if !(p > 0.0 && p < 1.0) {
        return Err(AmqCraftError::fp_rate_out_of_bounds(p));
    }
    let bits = (-p.log2()).ceil();
    Ok((bits as u32).max(1))
}

/// False positive probability of a quotient filter holding `len` of `capacity` keys.
///
/// # Examples
///
/// ```
/// use amqcraft::core::params::quotient_false_positive_probability;
///
/// assert_eq!(quotient_false_positive_probability(0, 32, 4), 0.0);
/// let full = quotient_false_positive_probability(32, 32, 4);
/// assert!(full > 0.0 && full <= 1.0 / 16.0);
/// ```
#[must_use]
pub fn quotient_false_positive_probability(len: usize, capacity: usize, r_bits: u32) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    let a = len as f64 / capacity as f64;
    1.0 - (-(a / 2f64.powi(r_bits as i32))).exp()
}

/// Number of cuckoo buckets for `capacity` keys.
///
/// Reserves enough slots that `capacity` keys stay at or below
/// [`CUCKOO_MAX_LOAD_PERCENT`] load, then rounds up like [`cuckoo_buckets_for_slots`].
///
/// # Examples
///
/// ```
/// use amqcraft::core::params::cuckoo_bucket_count;
///
/// assert_eq!(cuckoo_bucket_count(1024), 512);
/// assert_eq!(cuckoo_bucket_count(1000), 512);
/// assert_eq!(cuckoo_bucket_count(900), 256);
/// assert_eq!(cuckoo_bucket_count(1), 1);
/// ```
#[must_use]
pub fn cuckoo_bucket_count(capacity: usize) -> usize {
    let slots = capacity
        .saturating_mul(100)
        .saturating_add(CUCKOO_MAX_LOAD_PERCENT - 1)
        / CUCKOO_MAX_LOAD_PERCENT;
    cuckoo_buckets_for_slots(slots)
}

/// Number of cuckoo buckets holding `slots` fingerprints, without headroom.
///
/// The slot count is rounded up to a power of two and divided by the bucket size, so
/// the result is always a power of two and at least 1.
///
/// # Examples
///
/// ```
/// use amqcraft::core::params::cuckoo_buckets_for_slots;
///
/// assert_eq!(cuckoo_buckets_for_slots(1024), 256);
/// assert_eq!(cuckoo_buckets_for_slots(1000), 256);
/// assert_eq!(cuckoo_buckets_for_slots(0), 1);
/// ```
#[must_use]
pub fn cuckoo_buckets_for_slots(slots: usize) -> usize {
    (next_power_of_two(slots) / CUCKOO_BUCKET_SIZE).max(1)
}

/// Approximate cuckoo false positive rate at `load` (fraction of slots used).
#[must_use]
pub fn cuckoo_false_positive_rate(load: f64) -> f64 {
    let probes = (2 * CUCKOO_BUCKET_SIZE) as f64 * load.clamp(0.0, 1.0);
    1.0 - (1.0 - 1.0 / CUCKOO_FINGERPRINT_VALUES as f64).powf(probes)
}

/// Number of counting-filter tables for `capacity` keys.
///
/// # Examples
///
/// ```
/// use amqcraft::core::params::counting_tables_for_capacity;
///
/// assert_eq!(counting_tables_for_capacity(1), 1);
/// assert_eq!(counting_tables_for_capacity(100_000), 3);
/// ```
#[must_use]
pub fn counting_tables_for_capacity(capacity: usize) -> usize {
    (capacity / (COUNTING_CAPACITY_BUCKETS * COUNTING_BUCKET_HEIGHT)).max(1)
}
