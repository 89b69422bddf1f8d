//! Hash function trait and the default FNV-1a hasher.
//!
//! Every filter in this crate reduces a key to a single 64-bit hash and derives
//! everything else (quotient and remainder, bucket indices, fingerprints) from it.
//! Hashers therefore operate on raw byte slices and must be deterministic: an encoded
//! filter only decodes correctly when it is queried with the same hasher.
//!
//! # Examples
//!
//! ```
//! use amqcraft::hash::hasher::{FilterHasher, FnvHasher};
//!
//! let hasher = FnvHasher::new();
//! let h1 = hasher.hash_bytes(b"hello world");
//! let h2 = hasher.hash_bytes(b"hello world");
//! assert_eq!(h1, h2);
//! ```

#![allow(clippy::module_name_repetitions)]

/// FNV-1a 64-bit offset basis.
const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

/// FNV-1a 64-bit prime.
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Seed mixed into [`FnvHasher`] unless another one is given.
pub const DEFAULT_FNV_SEED: u64 = 0x85eb_ca77_c2b2_ae63;

/// Base hasher trait for filter hash functions.
///
/// Filters take a hasher by value at construction, so the trait is object-safe and
/// implementations are usually small `Copy` structs holding a seed.
///
/// # Requirements
///
/// - **Determinism**: same input, same output, across runs and processes
/// - **Avalanche**: flipping one input bit should flip about half the output bits
/// - **Uniformity**: both the low and the high 32 bits are used as indices
///
/// # Examples
///
/// ```
/// use amqcraft::hash::hasher::{FilterHasher, FnvHasher};
///
/// struct Identity;
///
/// impl FilterHasher for Identity {
///     fn hash_bytes(&self, bytes: &[u8]) -> u64 {
///         bytes.iter().fold(0, |acc, &b| (acc << 8) | u64::from(b))
///     }
///
///     fn name(&self) -> &'static str {
///         "Identity"
///     }
/// }
///
/// assert_eq!(Identity.hash_bytes(&[1, 2]), 0x0102);
/// assert_ne!(FnvHasher::new().hash_bytes(b"a"), FnvHasher::new().hash_bytes(b"b"));
/// ```
pub trait FilterHasher: Send + Sync {
    /// Hash arbitrary bytes to a 64-bit value.
    fn hash_bytes(&self, bytes: &[u8]) -> u64;

    /// Human-readable name used in debug output.
    fn name(&self) -> &'static str;
}

/// Streaming FNV-1a state.
///
/// Implements [`std::hash::Hasher`] so it can also back a `HashMap` in tests and
/// tooling.
#[derive(Debug, Clone)]
pub struct Fnv1a {
    state: u64,
}

impl Fnv1a {
    /// Create a hasher positioned at the FNV-1a offset basis.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1a {
    fn default() -> Self {
        Self::new()
    }
}

impl std::hash::Hasher for Fnv1a {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

/// Seeded FNV-1a hasher, the crate default.
///
/// The seed is fed through the hash as eight little-endian bytes before the key,
/// which keeps the output stable across platforms and Rust versions. Plain FNV-1a
/// leaves the upper bits of short keys poorly mixed, so the state goes through a
/// 64-bit finalizer before it is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FnvHasher {
    seed: u64,
}

impl FnvHasher {
    /// Create a hasher with [`DEFAULT_FNV_SEED`].
    ///
    /// # Examples
    ///
    /// ```
    /// use amqcraft::hash::hasher::FnvHasher;
    ///
    /// let hasher = FnvHasher::new();
    /// assert_eq!(hasher.seed(), amqcraft::hash::hasher::DEFAULT_FNV_SEED);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            seed: DEFAULT_FNV_SEED,
        }
    }

    /// Create a hasher with an explicit seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use amqcraft::hash::hasher::{FilterHasher, FnvHasher};
    ///
    /// let h1 = FnvHasher::with_seed(0).hash_bytes(b"test");
    /// let h2 = FnvHasher::with_seed(42).hash_bytes(b"test");
    /// assert_ne!(h1, h2);
    /// ```
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// The seed this hasher mixes in.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterHasher for FnvHasher {
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        use std::hash::Hasher;

        let mut hasher = Fnv1a::new();
        hasher.write(&self.seed.to_le_bytes());
        hasher.write(bytes);
        fmix64(hasher.finish())
    }

    #[inline]
    fn name(&self) -> &'static str {
        "FNV-1a"
    }
}

/// MurmurHash3 64-bit finalizer.
#[inline]
const fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::Hasher;

    #[test]
    fn test_fnv1a_reference_vectors() {
        // Published FNV-1a 64 test vectors.
        let mut h = Fnv1a::new();
        assert_eq!(h.finish(), 0xcbf2_9ce4_8422_2325);

        h.write(b"a");
        assert_eq!(h.finish(), 0xaf63_dc4c_8601_ec8c);

        let mut h = Fnv1a::new();
        h.write(b"foobar");
        assert_eq!(h.finish(), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn test_fnv_hasher_determinism() {
        let hasher = FnvHasher::new();
        let data = b"test string";

        assert_eq!(hasher.hash_bytes(data), hasher.hash_bytes(data));
    }

    #[test]
    fn test_fnv_hasher_different_inputs() {
        let hasher = FnvHasher::new();
        assert_ne!(hasher.hash_bytes(b"0"), hasher.hash_bytes(b"1"));
        assert_ne!(hasher.hash_bytes(b""), hasher.hash_bytes(b"\0"));
    }

    #[test]
    fn test_seed_is_mixed_in() {
        let seeded = FnvHasher::with_seed(7);
        let mut manual = Fnv1a::new();
        manual.write(&7u64.to_le_bytes());
        manual.write(b"key");
        assert_eq!(manual.finish(), 0x330b_7ef1_eb1f_4709);
        assert_eq!(seeded.hash_bytes(b"key"), fmix64(manual.finish()));
        assert_eq!(seeded.hash_bytes(b"key"), 0x9076_b0cf_9273_02fc);
    }

    #[test]
    fn test_fmix64_zero_fixed_point() {
        assert_eq!(fmix64(0), 0);
        assert_ne!(fmix64(1), 1);
    }

    #[test]
    fn test_hasher_name() {
        assert_eq!(FnvHasher::new().name(), "FNV-1a");
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FnvHasher>();
    }
}
