//! Cuckoo filter that grows by chaining larger filters.
//!
//! Inserts go to the newest filter in the chain. When its slot load passes the
//! threshold, or an insert into it fails, a larger filter is appended and the key goes
//! there. Lookups and deletes scan the whole chain, oldest first.
//!
//! # Growth
//!
//! The next filter's capacity is `scale_factor(buckets of the newest filter)`. The
//! default, `buckets * 4 * 2`, doubles the bucket count each step:
//!
//! ```text
//! filter   buckets   slots
//!   0        4096    16384
//!   1        8192    32768
//!   2       16384    65536
//! ```
//!
//! # Examples
//!
//! ```
//! use amqcraft::ScalableCuckooFilter;
//!
//! let mut filter = ScalableCuckooFilter::with_capacity(64);
//! for i in 0..1000 {
//!     assert!(filter.insert(&i.to_string()));
//! }
//! assert!(filter.filter_count() > 1);
//! assert!(filter.lookup("999"));
//! ```

#![allow(clippy::cast_precision_loss)]

use crate::core::filter::{full_unless, AmqFilter, DeletableFilter};
use crate::error::{AmqCraftError, Result};
use crate::filters::cuckoo::{CuckooFilter, BUCKET_SIZE, DEFAULT_SEED};
use crate::hash::{DefaultHasher, FilterHasher};
use std::fmt;

/// Slot load of the newest filter above which the chain grows.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.9;

/// Capacity of the first filter.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Maps the newest filter's bucket count to the next filter's capacity.
pub type ScaleFactor = fn(usize) -> usize;

/// Default [`ScaleFactor`]: twice as many buckets as the newest filter.
#[must_use]
pub fn default_scale_factor(buckets: usize) -> usize {
    buckets.saturating_mul(BUCKET_SIZE * 2)
}

/// Check that `load_factor` is usable as a growth threshold.
pub(crate) fn validate_load_factor(load_factor: f32) -> Result<()> {
    if load_factor > 0.0 && load_factor <= 1.0 {
        Ok(())
    } else {
        Err(AmqCraftError::invalid_parameters(format!(
            "load factor must be in (0, 1], got {}",
            load_factor
        )))
    }
}

/// Growable chain of [`CuckooFilter`]s.
///
/// The chain always holds at least one filter. Sub-filter `i` seeds its eviction RNG
/// with `seed + i`.
#[derive(Clone)]
pub struct ScalableCuckooFilter<H = DefaultHasher>
where
    H: FilterHasher + Clone,
{
    /// Filters, oldest first
    filters: Vec<CuckooFilter<H>>,

    /// Growth threshold on the newest filter's slot load
    load_factor: f32,

    /// Capacity of each appended filter
    scale_factor: ScaleFactor,

    /// Base seed for sub-filter RNGs
    seed: u64,

    /// Hasher cloned into every sub-filter
    hasher: H,
}

impl ScalableCuckooFilter<DefaultHasher> {
    /// Create a filter with [`DEFAULT_CAPACITY`] and [`DEFAULT_LOAD_FACTOR`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a filter whose first sub-filter holds about `capacity` fingerprints.
    ///
    /// Sub-filters get `capacity` slots rounded up to a power of two, with no extra
    /// headroom; the load threshold decides when the chain grows.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_parts(
            capacity,
            DEFAULT_LOAD_FACTOR,
            default_scale_factor,
            DEFAULT_SEED,
            DefaultHasher::default(),
        )
    }
}

impl Default for ScalableCuckooFilter<DefaultHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> ScalableCuckooFilter<H>
where
    H: FilterHasher + Clone,
{
    /// Create a default-sized filter with a custom hasher.
    #[must_use]
    pub fn with_hasher(hasher: H) -> Self {
        Self::from_parts(
            DEFAULT_CAPACITY,
            DEFAULT_LOAD_FACTOR,
            default_scale_factor,
            DEFAULT_SEED,
            hasher,
        )
    }

    pub(crate) fn from_parts(
        capacity: usize,
        load_factor: f32,
        scale_factor: ScaleFactor,
        seed: u64,
        hasher: H,
    ) -> Self {
        let first = CuckooFilter::with_slots(capacity, hasher.clone(), seed);
        Self {
            filters: vec![first],
            load_factor,
            scale_factor,
            seed,
            hasher,
        }
    }

    /// Rebuild a chain from decoded sub-filter bytes.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::EmptyChain`](crate::DecodeError::EmptyChain) without blobs
    /// - [`DecodeError::InvalidLoadFactor`](crate::DecodeError::InvalidLoadFactor)
    ///   unless `0 < load_factor <= 1`
    /// - any error of [`CuckooFilter::decode`] for a blob
    pub(crate) fn from_blobs<B>(
        blobs: &[B],
        load_factor: f32,
        scale_factor: ScaleFactor,
        seed: u64,
        hasher: H,
    ) -> Result<Self>
    where
        B: AsRef<[u8]>,
    {
        use crate::error::DecodeError;

        if blobs.is_empty() {
            return Err(DecodeError::EmptyChain.into());
        }
        if validate_load_factor(load_factor).is_err() {
            return Err(DecodeError::InvalidLoadFactor { value: load_factor }.into());
        }

        let filters = blobs
            .iter()
            .enumerate()
            .map(|(index, blob)| {
                CuckooFilter::decode_seeded(
                    blob.as_ref(),
                    hasher.clone(),
                    seed.wrapping_add(index as u64),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::trace!(
            filters = filters.len(),
            count = filters.iter().map(CuckooFilter::count).sum::<usize>(),
            "ScalableCuckooFilter::decode"
        );
        Ok(Self {
            filters,
            load_factor,
            scale_factor,
            seed,
            hasher,
        })
    }

    /// Insert a key, growing the chain when needed.
    ///
    /// Returns `false` only if the key does not fit even into a freshly appended
    /// filter.
    pub fn insert<K>(&mut self, key: &K) -> bool
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let threshold = f64::from(self.load_factor);
        let trigger = match self.filters.last_mut() {
            Some(newest) if newest.load_factor() > threshold => "load",
            Some(newest) => {
                if newest.insert(key) {
                    return true;
                }
                "insert failed"
            }
            None => "empty chain",
        };
        self.grow(trigger).insert(key)
    }

    /// Insert a key unless some filter in the chain already reports it.
    pub fn insert_unique<K>(&mut self, key: &K) -> bool
    where
        K: AsRef<[u8]> + ?Sized,
    {
        if self.lookup(key) {
            return false;
        }
        self.insert(key)
    }

    /// Check if any filter in the chain might hold the key.
    #[must_use]
    pub fn lookup<K>(&self, key: &K) -> bool
    where
        K: AsRef<[u8]> + ?Sized,
    {
        self.filters.iter().any(|filter| filter.lookup(key))
    }

    /// Remove one copy of a key from the oldest filter that holds it.
    pub fn delete<K>(&mut self, key: &K) -> bool
    where
        K: AsRef<[u8]> + ?Sized,
    {
        self.filters.iter_mut().any(|filter| filter.delete(key))
    }

    /// Stored fingerprints across the chain.
    #[must_use]
    pub fn count(&self) -> usize {
        self.filters.iter().map(CuckooFilter::count).sum()
    }

    /// Alias of [`count`](Self::count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.count()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.iter().all(CuckooFilter::is_empty)
    }

    /// Clear every filter. The chain keeps its length.
    pub fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }

    /// Number of filters in the chain.
    #[must_use]
    #[inline]
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// The filters, oldest first.
    #[must_use]
    pub fn filters(&self) -> &[CuckooFilter<H>] {
        &self.filters
    }

    /// Total slots across the chain.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.filters.iter().map(CuckooFilter::capacity).sum()
    }

    /// Growth threshold.
    #[must_use]
    #[inline]
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Change the growth threshold.
    ///
    /// # Errors
    ///
    /// Returns [`AmqCraftError::InvalidParameters`] unless `0 < load_factor <= 1`.
    pub fn set_load_factor(&mut self, load_factor: f32) -> Result<()> {
        validate_load_factor(load_factor)?;
        self.load_factor = load_factor;
        Ok(())
    }

    /// Change how appended filters are sized.
    pub fn set_scale_factor(&mut self, scale_factor: ScaleFactor) {
        self.scale_factor = scale_factor;
    }

    /// Base seed of the sub-filter RNGs.
    #[must_use]
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Heap bytes used by all filters.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.filters.iter().map(CuckooFilter::memory_usage).sum()
    }

    /// Each filter's [`CuckooFilter::encode`] bytes, oldest first.
    #[must_use]
    pub fn encode_filters(&self) -> Vec<Vec<u8>> {
        self.filters.iter().map(CuckooFilter::encode).collect()
    }

    fn grow(&mut self, trigger: &'static str) -> &mut CuckooFilter<H> {
        let capacity = self
            .filters
            .last()
            .map_or(DEFAULT_CAPACITY, |newest| {
                (self.scale_factor)(newest.bucket_count())
            });
        let index = self.filters.len();
        let filter = CuckooFilter::with_slots(
            capacity,
            self.hasher.clone(),
            self.seed.wrapping_add(index as u64),
        );

        tracing::debug!(
            index,
            buckets = filter.bucket_count(),
            trigger,
            "ScalableCuckooFilter::grow"
        );
        self.filters.push(filter);
        &mut self.filters[index]
    }
}

#[cfg(feature = "serde")]
impl ScalableCuckooFilter<DefaultHasher> {
    /// Rebuild a filter from [`encode`](Self::encode) output.
    ///
    /// The scale factor and seed are the defaults. Use
    /// [`ScalableCuckooFilterBuilder::decode`](crate::builder::ScalableCuckooFilterBuilder::decode)
    /// to override them.
    ///
    /// # Errors
    ///
    /// - [`AmqCraftError::SerializationError`] if the bytes are not a filter store
    /// - [`AmqCraftError::Decode`] if the chain is empty, the load factor is out of
    ///   range, or a sub-filter is malformed
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_with_hasher(bytes, DefaultHasher::default())
    }
}

#[cfg(feature = "serde")]
impl<H> ScalableCuckooFilter<H>
where
    H: FilterHasher + Clone,
{
    /// Serialize the chain and its load factor with bincode.
    ///
    /// # Errors
    ///
    /// Returns [`AmqCraftError::SerializationError`] if bincode fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use amqcraft::ScalableCuckooFilter;
    ///
    /// let mut filter = ScalableCuckooFilter::with_capacity(16);
    /// for i in 0..100 {
    ///     filter.insert(&i.to_string());
    /// }
    ///
    /// let bytes = filter.encode().unwrap();
    /// let restored = ScalableCuckooFilter::decode(&bytes).unwrap();
    /// assert_eq!(restored.filter_count(), filter.filter_count());
    /// assert!(restored.lookup("42"));
    /// ```
    pub fn encode(&self) -> Result<Vec<u8>> {
        crate::serde_support::FilterStore::from_filter(self).to_bytes()
    }

    /// Rebuild a filter from [`encode`](Self::encode) output using `hasher`.
    ///
    /// # Errors
    ///
    /// Same as [`ScalableCuckooFilter::decode`].
    pub fn decode_with_hasher(bytes: &[u8], hasher: H) -> Result<Self> {
        crate::serde_support::FilterStore::from_bytes(bytes)?.into_filter(
            default_scale_factor,
            DEFAULT_SEED,
            hasher,
        )
    }
}

impl<H> fmt::Debug for ScalableCuckooFilter<H>
where
    H: FilterHasher + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalableCuckooFilter")
            .field("filters", &self.filters)
            .field("load_factor", &self.load_factor)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl<H> fmt::Display for ScalableCuckooFilter<H>
where
    H: FilterHasher + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScalableCuckooFilter(filters: {}, count: {}, capacity: {}, load_factor: {})",
            self.filters.len(),
            self.count(),
            self.capacity(),
            self.load_factor
        )
    }
}

impl<H> AmqFilter for ScalableCuckooFilter<H>
where
    H: FilterHasher + Clone,
{
    fn try_insert(&mut self, key: &[u8]) -> Result<()> {
        let inserted = self.insert(key);
        full_unless(inserted, ScalableCuckooFilter::capacity(self))
    }

    fn contains(&self, key: &[u8]) -> bool {
        self.lookup(key)
    }

    fn len(&self) -> usize {
        self.count()
    }

    fn capacity(&self) -> usize {
        ScalableCuckooFilter::capacity(self)
    }

    fn clear(&mut self) {
        self.reset();
    }

    fn name(&self) -> &'static str {
        "ScalableCuckooFilter"
    }
}

impl<H> DeletableFilter for ScalableCuckooFilter<H>
where
    H: FilterHasher + Clone,
{
    fn remove(&mut self, key: &[u8]) -> bool {
        self.delete(key)
    }
}
