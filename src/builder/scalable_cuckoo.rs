//! Builder for scalable cuckoo filters.
//!
//! Every parameter has a default, so there is no type state: `build` and `decode` are
//! always available.
//!
//! # Examples
//!
//! ```
//! use amqcraft::builder::ScalableCuckooFilterBuilder;
//!
//! fn quadruple(buckets: usize) -> usize {
//!     buckets * 16
//! }
//!
//! let mut filter = ScalableCuckooFilterBuilder::new()
//!     .initial_capacity(64)
//!     .load_factor(0.75)
//!     .scale_factor(quadruple)
//!     .build()
//!     .unwrap();
//!
//! for i in 0..500 {
//!     filter.insert(&i.to_string());
//! }
//! assert!(filter.filter_count() > 1);
//! ```

use super::validation::{validate_capacity, validate_load};
use crate::error::Result;
use crate::filters::cuckoo::DEFAULT_SEED;
use crate::filters::scalable_cuckoo::{
    default_scale_factor, ScalableCuckooFilter, ScaleFactor, DEFAULT_CAPACITY,
    DEFAULT_LOAD_FACTOR,
};
use crate::hash::{DefaultHasher, FilterHasher};

/// Builder for [`ScalableCuckooFilter`].
#[derive(Debug, Clone)]
pub struct ScalableCuckooFilterBuilder<H = DefaultHasher> {
    initial_capacity: Option<usize>,
    load_factor: Option<f32>,
    scale_factor: Option<ScaleFactor>,
    seed: Option<u64>,
    hasher: H,
}

impl ScalableCuckooFilterBuilder<DefaultHasher> {
    /// Create a new scalable cuckoo filter builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            initial_capacity: None,
            load_factor: None,
            scale_factor: None,
            seed: None,
            hasher: DefaultHasher::default(),
        }
    }
}

impl Default for ScalableCuckooFilterBuilder<DefaultHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> ScalableCuckooFilterBuilder<H> {
    /// Capacity of the first sub-filter (default [`DEFAULT_CAPACITY`]).
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Slot load that triggers growth (default [`DEFAULT_LOAD_FACTOR`]).
    #[must_use]
    pub fn load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = Some(load_factor);
        self
    }

    /// Capacity of each appended sub-filter (default [`default_scale_factor`]).
    #[must_use]
    pub fn scale_factor(mut self, scale_factor: ScaleFactor) -> Self {
        self.scale_factor = Some(scale_factor);
        self
    }

    /// Base seed of the sub-filter eviction RNGs (default [`DEFAULT_SEED`]).
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use a custom hash function.
    #[must_use]
    pub fn hasher<H2>(self, hasher: H2) -> ScalableCuckooFilterBuilder<H2> {
        ScalableCuckooFilterBuilder {
            initial_capacity: self.initial_capacity,
            load_factor: self.load_factor,
            scale_factor: self.scale_factor,
            seed: self.seed,
            hasher,
        }
    }
}

impl<H> ScalableCuckooFilterBuilder<H>
where
    H: FilterHasher + Clone,
{
    /// Build an empty filter.
    ///
    /// # Errors
    ///
    /// Returns error if the initial capacity is 0 or the load factor is outside
    /// (0, 1].
    pub fn build(self) -> Result<ScalableCuckooFilter<H>> {
        let capacity = self.initial_capacity.unwrap_or(DEFAULT_CAPACITY);
        let load_factor = self.load_factor.unwrap_or(DEFAULT_LOAD_FACTOR);
        validate_capacity(capacity)?;
        validate_load(f64::from(load_factor))?;

        Ok(ScalableCuckooFilter::from_parts(
            capacity,
            load_factor,
            self.scale_factor.unwrap_or(default_scale_factor),
            self.seed.unwrap_or(DEFAULT_SEED),
            self.hasher,
        ))
    }

    /// Rebuild a filter from
    /// [`ScalableCuckooFilter::encode`] output.
    ///
    /// The stored chain and load factor are restored. A load factor set on the builder
    /// replaces the stored one; the initial capacity is ignored.
    ///
    /// # Errors
    ///
    /// - any error of [`ScalableCuckooFilter::decode`]
    /// - an invalid load factor set on the builder
    #[cfg(feature = "serde")]
    pub fn decode(self, bytes: &[u8]) -> Result<ScalableCuckooFilter<H>> {
        use crate::serde_support::FilterStore;

        let mut filter = FilterStore::from_bytes(bytes)?.into_filter(
            self.scale_factor.unwrap_or(default_scale_factor),
            self.seed.unwrap_or(DEFAULT_SEED),
            self.hasher,
        )?;
        if let Some(load_factor) = self.load_factor {
            filter.set_load_factor(load_factor)?;
        }
        Ok(filter)
    }
}
