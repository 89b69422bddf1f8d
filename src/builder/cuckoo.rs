//! Builder for cuckoo filters.
//!
//! ```text
//! Initial → Complete → CuckooFilter
//!     ↓         ↓
//! .capacity()  .build()
//! ```
//!
//! # Examples
//!
//! ```
//! use amqcraft::builder::CuckooFilterBuilder;
//!
//! let mut filter = CuckooFilterBuilder::new()
//!     .capacity(1_000)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! assert!(filter.insert("key"));
//! assert!(filter.lookup("key"));
//! ```

use super::validation::{required, validate_capacity};
use super::{Complete, Initial};
use crate::error::Result;
use crate::filters::cuckoo::{CuckooFilter, DEFAULT_SEED};
use crate::hash::{DefaultHasher, FilterHasher};
use std::marker::PhantomData;

/// Builder for [`CuckooFilter`].
///
/// Only the capacity is required. The eviction seed defaults to [`DEFAULT_SEED`].
#[derive(Debug, Clone)]
pub struct CuckooFilterBuilder<State, H = DefaultHasher> {
    capacity: Option<usize>,
    seed: u64,
    hasher: H,
    _state: PhantomData<State>,
}

impl CuckooFilterBuilder<Initial, DefaultHasher> {
    /// Create a new cuckoo filter builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capacity: None,
            seed: DEFAULT_SEED,
            hasher: DefaultHasher::default(),
            _state: PhantomData,
        }
    }
}

impl Default for CuckooFilterBuilder<Initial, DefaultHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State, H> CuckooFilterBuilder<State, H> {
    /// Seed the eviction RNG (optional).
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Use a custom hash function (optional).
    #[must_use]
    pub fn hasher<H2>(self, hasher: H2) -> CuckooFilterBuilder<State, H2> {
        CuckooFilterBuilder {
            capacity: self.capacity,
            seed: self.seed,
            hasher,
            _state: PhantomData,
        }
    }
}

impl<H> CuckooFilterBuilder<Initial, H> {
    /// Set the number of keys the filter should hold.
    ///
    /// Sized like [`CuckooFilter::new`]: 95% load at `capacity`, rounded up to a power
    /// of two.
    #[must_use]
    pub fn capacity(self, capacity: usize) -> CuckooFilterBuilder<Complete, H> {
        CuckooFilterBuilder {
            capacity: Some(capacity),
            seed: self.seed,
            hasher: self.hasher,
            _state: PhantomData,
        }
    }
}

impl<H: FilterHasher> CuckooFilterBuilder<Complete, H> {
    /// Build the cuckoo filter.
    ///
    /// # Errors
    ///
    /// Returns error if `capacity == 0`.
    pub fn build(self) -> Result<CuckooFilter<H>> {
        let capacity = required(self.capacity, "capacity")?;
        validate_capacity(capacity)?;
        Ok(CuckooFilter::with_hasher_and_seed(capacity, self.hasher, self.seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AmqCraftError;

    #[test]
    fn test_builder_basic() {
        let filter = CuckooFilterBuilder::new().capacity(1000).build().unwrap();
        assert_eq!(filter.bucket_count(), 512);
        assert_eq!(filter.capacity(), 2048);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_builder_zero_capacity() {
        let result = CuckooFilterBuilder::new().capacity(0).build();
        assert!(matches!(result, Err(AmqCraftError::InvalidCapacity { capacity: 0 })));
    }

    #[test]
    fn test_builder_seed_matches_constructor() {
        let mut built = CuckooFilterBuilder::new().seed(99).capacity(64).build().unwrap();
        let mut direct = CuckooFilter::with_seed(64, 99);

        for i in 0..60 {
            let key = format!("k{}", i);
            assert_eq!(built.insert(&key), direct.insert(&key));
        }
        assert_eq!(built.encode(), direct.encode());
    }

    #[test]
    fn test_builder_default_seed() {
        let mut built = CuckooFilterBuilder::default().capacity(64).build().unwrap();
        let mut direct = CuckooFilter::new(64);

        for i in 0..60 {
            built.insert(&i.to_string());
            direct.insert(&i.to_string());
        }
        assert_eq!(built.encode(), direct.encode());
    }

    #[cfg(feature = "wyhash")]
    #[test]
    fn test_builder_custom_hasher() {
        use crate::hash::WyHasher;

        let mut filter = CuckooFilterBuilder::new()
            .hasher(WyHasher::new())
            .capacity(128)
            .build()
            .unwrap();
        assert!(filter.insert("wy"));
        assert!(filter.lookup("wy"));
    }
}
