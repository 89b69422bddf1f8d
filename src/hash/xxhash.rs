//! XXH3 hasher backed by the `xxhash-rust` crate.
//!
//! Available with the `xxhash` feature. XXH3 is the better choice for long keys
//! (hundreds of bytes and up) where its SIMD paths pay off.
//!
//! ```
//! # #[cfg(feature = "xxhash")]
//! # {
//! use amqcraft::hash::{FilterHasher, XxHasher};
//!
//! let hasher = XxHasher::new();
//! assert_eq!(hasher.hash_bytes(b"key"), hasher.hash_bytes(b"key"));
//! # }
//! ```

use super::hasher::FilterHasher;
use xxhash_rust::xxh3::{xxh3_64, xxh3_64_with_seed};

/// XXH3 64-bit hasher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XxHasher {
    seed: u64,
}

impl XxHasher {
    /// Create an unseeded hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self { seed: 0 }
    }

    /// Create a hasher with an explicit seed.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl FilterHasher for XxHasher {
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        if self.seed == 0 {
            xxh3_64(bytes)
        } else {
            xxh3_64_with_seed(bytes, self.seed)
        }
    }

    #[inline]
    fn name(&self) -> &'static str {
        "XXH3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseeded_matches_xxh3() {
        let hasher = XxHasher::new();
        assert_eq!(hasher.hash_bytes(b"filter"), xxh3_64(b"filter"));
    }

    #[test]
    fn test_seeds_differ() {
        let data = b"filter";
        assert_ne!(
            XxHasher::with_seed(1).hash_bytes(data),
            XxHasher::with_seed(2).hash_bytes(data)
        );
    }

    #[test]
    fn test_hasher_name() {
        assert_eq!(XxHasher::new().name(), "XXH3");
    }
}
