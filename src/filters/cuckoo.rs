//! Cuckoo filter with one-byte fingerprints.
//!
//! Every key maps to a non-zero fingerprint and two candidate buckets of four slots.
//! The second bucket is derived from the first and the fingerprint alone, so a stored
//! fingerprint can always be moved to its other bucket without the original key. When
//! both candidates are full, resident fingerprints are kicked to their alternate
//! buckets until a free slot turns up.
//!
//! # Layout
//!
//! ```text
//! bucket 0: [fp][fp][ 0][ 0]
//! bucket 1: [fp][fp][fp][fp]
//! ...
//! ```
//!
//! A zero byte marks an empty slot. The bucket count is a power of two so both
//! candidate indices are plain masks. A filter built for `n` keys keeps `n` at or below
//! 95% slot load, past which four-slot buckets start refusing inserts.
//!
//! # Failed Inserts
//!
//! Evictions are bounded by [`MAX_CUCKOO_COUNT`]. If no free slot is found within that
//! budget every displacement is undone, so a failed insert leaves the table exactly as
//! it was and no earlier key is lost.
//!
//! # Examples
//!
//! ```
//! use amqcraft::CuckooFilter;
//!
//! let mut filter = CuckooFilter::new(1024);
//! assert!(filter.insert("apple"));
//! assert!(filter.lookup("apple"));
//! assert!(filter.delete("apple"));
//! assert!(!filter.lookup("apple"));
//! ```

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use crate::core::filter::{full_unless, AmqFilter, DeletableFilter};
use crate::core::params::{
    cuckoo_bucket_count, cuckoo_buckets_for_slots, cuckoo_false_positive_rate,
    CUCKOO_BUCKET_SIZE, CUCKOO_FINGERPRINT_VALUES,
};
use crate::error::{DecodeError, Result};
use crate::hash::{DefaultHasher, FilterHasher};
use crate::util::bitops::is_power_of_two;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;

/// Slots per bucket.
pub const BUCKET_SIZE: usize = CUCKOO_BUCKET_SIZE;

/// Eviction rounds before an insert gives up.
pub const MAX_CUCKOO_COUNT: usize = 500;

/// Seed of the eviction RNG when none is given.
pub const DEFAULT_SEED: u64 = 1337;

const EMPTY: u8 = 0;

type Bucket = [u8; BUCKET_SIZE];

/// Cuckoo filter over byte keys.
///
/// Inserting the same key twice stores two copies, and each copy needs its own
/// [`delete`](Self::delete). Use [`insert_unique`](Self::insert_unique) for set
/// semantics.
///
/// # Type Parameters
///
/// * `H` - Hash function (defaults to [`DefaultHasher`])
///
/// # Thread Safety
///
/// Mutation, including eviction, needs `&mut self`. Wrap in a `Mutex` to share.
#[derive(Clone)]
pub struct CuckooFilter<H = DefaultHasher>
where
    H: FilterHasher,
{
    /// Fingerprint slots, `0` meaning empty
    buckets: Vec<Bucket>,

    /// Occupied slots
    count: usize,

    /// `buckets.len() - 1`
    mask: u64,

    /// Hash of every single-byte fingerprint, for alternate indices
    alt_hash: Box<[u64; 256]>,

    /// Picks eviction victims
    rng: ChaCha8Rng,

    /// Hash function
    hasher: H,
}

impl CuckooFilter<DefaultHasher> {
    /// Create a filter that holds `capacity` keys.
    ///
    /// Slots are reserved for `capacity / 0.95` fingerprints, rounded up to a power of
    /// two, then divided into buckets of four.
    ///
    /// # Examples
    ///
    /// ```
    /// use amqcraft::CuckooFilter;
    ///
    /// let filter = CuckooFilter::new(1000);
    /// assert_eq!(filter.bucket_count(), 512);
    /// assert_eq!(filter.capacity(), 2048);
    /// ```
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_hasher_and_seed(capacity, DefaultHasher::default(), DEFAULT_SEED)
    }

    /// Create a filter whose eviction RNG starts from `seed`.
    ///
    /// Two filters with the same seed that see the same inserts end up with identical
    /// tables.
    #[must_use]
    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self::with_hasher_and_seed(capacity, DefaultHasher::default(), seed)
    }

    /// Rebuild a filter from [`encode`](Self::encode) output.
    ///
    /// # Errors
    ///
    /// Returns [`AmqCraftError::Decode`](crate::AmqCraftError::Decode) with
    ///
    /// - [`DecodeError::Empty`] for an empty buffer
    /// - [`DecodeError::LengthNotMultiple`] if the length is not a multiple of 4
    /// - [`DecodeError::BucketCountNotPowerOfTwo`] otherwise if the bucket count is
    ///   not a power of two
    ///
    /// # Examples
    ///
    /// ```
    /// use amqcraft::CuckooFilter;
    ///
    /// let mut filter = CuckooFilter::new(64);
    /// filter.insert("k");
    ///
    /// let restored = CuckooFilter::decode(&filter.encode()).unwrap();
    /// assert!(restored.lookup("k"));
    /// assert_eq!(restored.count(), 1);
    /// ```
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_with_hasher(bytes, DefaultHasher::default())
    }
}

impl<H> CuckooFilter<H>
where
    H: FilterHasher,
{
    /// Create a filter with a custom hasher.
    #[must_use]
    pub fn with_hasher(capacity: usize, hasher: H) -> Self {
        Self::with_hasher_and_seed(capacity, hasher, DEFAULT_SEED)
    }

    /// Create a filter with a custom hasher and eviction seed.
    #[must_use]
    pub fn with_hasher_and_seed(capacity: usize, hasher: H, seed: u64) -> Self {
        let buckets = cuckoo_bucket_count(capacity);
        Self::from_buckets(vec![[EMPTY; BUCKET_SIZE]; buckets], 0, hasher, seed)
    }

    /// Filter with room for exactly `slots` fingerprints, rounded up to a power of two.
    pub(crate) fn with_slots(slots: usize, hasher: H, seed: u64) -> Self {
        let buckets = cuckoo_buckets_for_slots(slots);
        Self::from_buckets(vec![[EMPTY; BUCKET_SIZE]; buckets], 0, hasher, seed)
    }

    fn from_buckets(buckets: Vec<Bucket>, count: usize, hasher: H, seed: u64) -> Self {
        let alt_hash = alt_hash_table(&hasher);
        Self {
            mask: buckets.len() as u64 - 1,
            buckets,
            count,
            alt_hash,
            rng: ChaCha8Rng::seed_from_u64(seed),
            hasher,
        }
    }

    /// Rebuild a filter from [`encode`](Self::encode) output using `hasher`.
    ///
    /// The hasher must be the one the filter was built with, or lookups miss.
    ///
    /// # Errors
    ///
    /// Same as [`CuckooFilter::decode`].
    pub fn decode_with_hasher(bytes: &[u8], hasher: H) -> Result<Self> {
        Self::decode_seeded(bytes, hasher, DEFAULT_SEED)
    }

    pub(crate) fn decode_seeded(bytes: &[u8], hasher: H, seed: u64) -> Result<Self> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty.into());
        }
        if bytes.len() % BUCKET_SIZE != 0 {
            return Err(DecodeError::LengthNotMultiple {
                len: bytes.len(),
                bucket_size: BUCKET_SIZE,
            }
            .into());
        }
        let bucket_count = bytes.len() / BUCKET_SIZE;
        if !is_power_of_two(bucket_count) {
            return Err(DecodeError::BucketCountNotPowerOfTwo {
                buckets: bucket_count,
            }
            .into());
        }

        let mut buckets = Vec::with_capacity(bucket_count);
        let mut count = 0;
        for chunk in bytes.chunks_exact(BUCKET_SIZE) {
            let mut bucket = [EMPTY; BUCKET_SIZE];
            bucket.copy_from_slice(chunk);
            count += bucket.iter().filter(|&&fp| fp != EMPTY).count();
            buckets.push(bucket);
        }

        tracing::trace!(buckets = bucket_count, count, "CuckooFilter::decode");
        Ok(Self::from_buckets(buckets, count, hasher, seed))
    }

    /// Insert a key.
    ///
    /// Returns `false` if no slot could be freed within [`MAX_CUCKOO_COUNT`] evictions.
    /// The table is then unchanged.
    pub fn insert<K>(&mut self, key: &K) -> bool
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let (i1, fp) = self.index_and_fingerprint(key.as_ref());
        if self.put(fp, i1) {
            return true;
        }

        let i2 = self.alt_index(fp, i1);
        if self.put(fp, i2) {
            return true;
        }

        let start = if self.rng.gen::<bool>() { i1 } else { i2 };
        self.relocate(fp, start)
    }

    /// Insert a key unless it already looks present.
    ///
    /// Returns `false` both when the key was found and when the insert failed.
    ///
    /// # Examples
    ///
    /// ```
    /// use amqcraft::CuckooFilter;
    ///
    /// let mut filter = CuckooFilter::new(64);
    /// assert!(filter.insert_unique("x"));
    /// assert!(!filter.insert_unique("x"));
    /// assert_eq!(filter.count(), 1);
    /// ```
    pub fn insert_unique<K>(&mut self, key: &K) -> bool
    where
        K: AsRef<[u8]> + ?Sized,
    {
        if self.lookup(key) {
            return false;
        }
        self.insert(key)
    }

    /// Check if a key might be in the filter.
    #[must_use]
    pub fn lookup<K>(&self, key: &K) -> bool
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let (i1, fp) = self.index_and_fingerprint(key.as_ref());
        let i2 = self.alt_index(fp, i1);
        self.buckets[i1].contains(&fp) || self.buckets[i2].contains(&fp)
    }

    /// Remove one copy of a key.
    ///
    /// The first candidate bucket is searched before the second, and only the first
    /// matching slot is cleared. Deleting a key that was never inserted but shares a
    /// fingerprint and bucket with a stored key removes that key instead.
    pub fn delete<K>(&mut self, key: &K) -> bool
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let (i1, fp) = self.index_and_fingerprint(key.as_ref());
        let i2 = self.alt_index(fp, i1);

        for index in [i1, i2] {
            if let Some(slot) = self.buckets[index].iter().position(|&stored| stored == fp) {
                self.buckets[index][slot] = EMPTY;
                self.count -= 1;
                return true;
            }
        }
        false
    }

    /// Number of stored fingerprints.
    #[must_use]
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Alias of [`count`](Self::count).
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Clear every slot.
    pub fn reset(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = [EMPTY; BUCKET_SIZE];
        }
        self.count = 0;
    }

    /// Number of buckets, always a power of two.
    #[must_use]
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total fingerprint slots.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buckets.len() * BUCKET_SIZE
    }

    /// Fraction of slots in use.
    #[must_use]
    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.capacity() as f64
    }

    /// Approximate false positive rate at the current load.
    #[must_use]
    pub fn estimated_fp_rate(&self) -> f64 {
        cuckoo_false_positive_rate(self.load_factor())
    }

    /// Heap bytes used by the buckets.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.buckets.len() * BUCKET_SIZE + std::mem::size_of::<[u64; 256]>()
    }

    /// Reference to the hasher.
    #[must_use]
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Serialize the slots, one byte each, bucket by bucket.
    ///
    /// Slot `s` of bucket `b` is byte `b * 4 + s`. The eviction RNG state is not
    /// included.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        self.buckets.iter().flatten().copied().collect()
    }

    #[inline]
    fn index_and_fingerprint(&self, key: &[u8]) -> (usize, u8) {
        let hash = self.hasher.hash_bytes(key);
        let fp = (hash % CUCKOO_FINGERPRINT_VALUES + 1) as u8;
        let index = ((hash >> 32) & self.mask) as usize;
        (index, fp)
    }

    // Self-inverse for a fixed fingerprint.
    #[inline]
    fn alt_index(&self, fp: u8, index: usize) -> usize {
        ((index as u64 & self.mask) ^ (self.alt_hash[usize::from(fp)] & self.mask)) as usize
    }

    fn put(&mut self, fp: u8, index: usize) -> bool {
        match self.buckets[index].iter().position(|&slot| slot == EMPTY) {
            Some(slot) => {
                self.buckets[index][slot] = fp;
                self.count += 1;
                true
            }
            None => false,
        }
    }

    fn relocate(&mut self, mut fp: u8, mut index: usize) -> bool {
        let mut displaced: Vec<(usize, usize, u8)> = Vec::new();

        for _ in 0..MAX_CUCKOO_COUNT {
            let slot = self.rng.gen_range(0..BUCKET_SIZE);
            let evicted = std::mem::replace(&mut self.buckets[index][slot], fp);
            displaced.push((index, slot, evicted));

            fp = evicted;
            index = self.alt_index(fp, index);
            if self.put(fp, index) {
                return true;
            }
        }

        for (index, slot, previous) in displaced.into_iter().rev() {
            self.buckets[index][slot] = previous;
        }
        tracing::debug!(
            count = self.count,
            buckets = self.buckets.len(),
            "CuckooFilter::insert eviction budget exhausted"
        );
        false
    }
}

fn alt_hash_table<H: FilterHasher>(hasher: &H) -> Box<[u64; 256]> {
    let mut table = Box::new([0u64; 256]);
    for (byte, entry) in table.iter_mut().enumerate() {
        *entry = hasher.hash_bytes(&[byte as u8]);
    }
    table
}

impl<H> fmt::Debug for CuckooFilter<H>
where
    H: FilterHasher + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CuckooFilter")
            .field("buckets", &self.buckets.len())
            .field("count", &self.count)
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}

impl<H> fmt::Display for CuckooFilter<H>
where
    H: FilterHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CuckooFilter(buckets: {}, count: {}, load: {:.3})",
            self.buckets.len(),
            self.count,
            self.load_factor()
        )
    }
}

impl<H> AmqFilter for CuckooFilter<H>
where
    H: FilterHasher,
{
    fn try_insert(&mut self, key: &[u8]) -> Result<()> {
        let inserted = self.insert(key);
        full_unless(inserted, self.capacity())
    }

    fn contains(&self, key: &[u8]) -> bool {
        self.lookup(key)
    }

    fn len(&self) -> usize {
        self.count
    }

    fn capacity(&self) -> usize {
        CuckooFilter::capacity(self)
    }

    fn clear(&mut self) {
        self.reset();
    }

    fn name(&self) -> &'static str {
        "CuckooFilter"
    }
}

impl<H> DeletableFilter for CuckooFilter<H>
where
    H: FilterHasher,
{
    fn remove(&mut self, key: &[u8]) -> bool {
        self.delete(key)
    }
}
