//! d-left counting filter.
//!
//! The filter is `d` independent tables of buckets. Each bucket holds up to eight
//! 16-bit fingerprints and an explicit count. A key has exactly one candidate bucket per
//! table and goes into whichever candidate is least loaded, which keeps bucket loads
//! close together.
//!
//! # Key Derivation
//!
//! One 64-bit hash `h` per key:
//!
//! ```text
//! h1 = low 32 bits of h
//! h2 = high 32 bits of h
//! bucket in table i = (h1 + i * h2) mod num_buckets     (32-bit wrapping)
//! fingerprint       = high 16 bits of h                 (same in every table)
//! ```
//!
//! # Bucket Invariant
//!
//! Slots `[0, count)` of a bucket are live and slots `[count, 8)` are zero. Deletion
//! shifts later entries down to keep it that way, and lookups never read past `count`.
//!
//! # Trade-offs
//!
//! | Aspect | Counting filter |
//! |--------|-----------------|
//! | Insert | O(d) buckets, rejects keys already present |
//! | Query | O(d) buckets |
//! | Delete | O(d) buckets |
//! | Space | 18 bytes per bucket of 8 fingerprints |
//! | False negatives | Only by deleting a key that was never added |
//!
//! # Examples
//!
//! ```
//! use amqcraft::CountingFilter;
//!
//! let mut filter = CountingFilter::new(4, 1024).unwrap();
//! assert!(filter.add("hello"));
//! assert!(!filter.add("hello"));
//! assert!(filter.is_member("hello"));
//! assert_eq!(filter.get_count(), 1);
//!
//! assert!(filter.delete("hello"));
//! assert!(!filter.is_member("hello"));
//! ```

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use crate::core::filter::{full_unless, AmqFilter, DeletableFilter};
use crate::core::params::{
    counting_tables_for_capacity, COUNTING_BUCKET_HEIGHT, COUNTING_CAPACITY_BUCKETS,
};
use crate::error::{AmqCraftError, Result};
use crate::hash::{DefaultHasher, FilterHasher};
use std::fmt;

/// Fingerprints per bucket.
pub const BUCKET_HEIGHT: usize = COUNTING_BUCKET_HEIGHT;

/// Buckets per table for [`CountingFilter::new_for_capacity`].
pub const CAPACITY_BUCKETS: usize = COUNTING_CAPACITY_BUCKETS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Bucket {
    entries: [u16; BUCKET_HEIGHT],
    count: u8,
}

impl Bucket {
    #[inline]
    fn live(&self) -> &[u16] {
        &self.entries[..usize::from(self.count)]
    }

    #[inline]
    fn is_full(&self) -> bool {
        usize::from(self.count) >= BUCKET_HEIGHT
    }

    fn push(&mut self, fp: u16) {
        self.entries[usize::from(self.count)] = fp;
        self.count += 1;
    }

    // Remove the first live match, keeping the rest in order.
    fn remove(&mut self, fp: u16) -> bool {
        let count = usize::from(self.count);
        match self.live().iter().position(|&stored| stored == fp) {
            Some(index) => {
                self.entries.copy_within(index + 1..count, index);
                self.count -= 1;
                self.entries[count - 1] = 0;
                true
            }
            None => false,
        }
    }
}

/// Candidate locations of one key.
#[derive(Debug, Clone, Copy)]
struct Target {
    h1: u32,
    h2: u32,
    fp: u16,
}

/// d-left counting filter over byte keys.
///
/// # Type Parameters
///
/// * `H` - Hash function (defaults to [`DefaultHasher`])
///
/// # Memory Layout
///
/// ```text
/// CountingFilter {
///     tables: [[Bucket; num_buckets]; num_tables],
///     Bucket { entries: [u16; 8], count: u8 },
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CountingFilter<H = DefaultHasher>
where
    H: FilterHasher,
{
    /// `num_tables` tables of `num_buckets` buckets
    tables: Vec<Vec<Bucket>>,

    /// Buckets per table, at most `u32::MAX`
    num_buckets: usize,

    /// Hash function
    hasher: H,
}

impl CountingFilter<DefaultHasher> {
    /// Create a filter with `num_tables` tables of `num_buckets` buckets.
    ///
    /// # Errors
    ///
    /// - [`AmqCraftError::InvalidParameters`] if `num_tables == 0`,
    ///   `num_buckets < num_tables` or `num_buckets > u32::MAX`
    /// - [`AmqCraftError::InvalidFilterSize`] if the tables cannot be allocated
    ///
    /// # Examples
    ///
    /// ```
    /// use amqcraft::CountingFilter;
    ///
    /// assert!(CountingFilter::new(2, 64).is_ok());
    /// assert!(CountingFilter::new(8, 4).is_err());
    /// assert!(CountingFilter::new(0, 4).is_err());
    /// ```
    pub fn new(num_tables: usize, num_buckets: usize) -> Result<Self> {
        Self::with_hasher(num_tables, num_buckets, DefaultHasher::default())
    }

    /// Create a filter for about `capacity` keys.
    ///
    /// Uses one table of [`CAPACITY_BUCKETS`] buckets per 32768 keys, and at least one
    /// table.
    ///
    /// # Errors
    ///
    /// Same as [`CountingFilter::new`].
    ///
    /// # Examples
    ///
    /// ```
    /// use amqcraft::CountingFilter;
    ///
    /// let filter = CountingFilter::new_for_capacity(1_000_000).unwrap();
    /// assert_eq!(filter.num_tables(), 30);
    /// assert_eq!(filter.num_buckets(), 4096);
    /// ```
    pub fn new_for_capacity(capacity: usize) -> Result<Self> {
        Self::new(counting_tables_for_capacity(capacity), CAPACITY_BUCKETS)
    }
}

impl<H> CountingFilter<H>
where
    H: FilterHasher,
{
    /// Create a filter with a custom hasher.
    ///
    /// # Errors
    ///
    /// Same as [`CountingFilter::new`].
    pub fn with_hasher(num_tables: usize, num_buckets: usize, hasher: H) -> Result<Self> {
        if num_tables == 0 {
            return Err(AmqCraftError::invalid_parameters("num_tables must be at least 1"));
        }
        if num_buckets < num_tables {
            return Err(AmqCraftError::invalid_parameters(format!(
                "num_buckets ({}) must be at least num_tables ({})",
                num_buckets, num_tables
            )));
        }
        if num_buckets as u64 > u64::from(u32::MAX) {
            return Err(AmqCraftError::invalid_parameters(format!(
                "num_buckets must be at most {}, got {}",
                u32::MAX,
                num_buckets
            )));
        }

        let addressable = num_tables
            .checked_mul(num_buckets)
            .and_then(|buckets| buckets.checked_mul(std::mem::size_of::<Bucket>()))
            .map_or(false, |bytes| bytes <= isize::MAX as usize);
        if !addressable {
            return Err(AmqCraftError::invalid_filter_size(
                num_tables as u128 * num_buckets as u128 * std::mem::size_of::<Bucket>() as u128 * 8,
            ));
        }

        Ok(Self {
            tables: vec![vec![Bucket::default(); num_buckets]; num_tables],
            num_buckets,
            hasher,
        })
    }

    #[inline]
    fn target(&self, key: &[u8]) -> Target {
        let hash = self.hasher.hash_bytes(key);
        Target {
            h1: hash as u32,
            h2: (hash >> 32) as u32,
            fp: (hash >> 48) as u16,
        }
    }

    #[inline]
    fn bucket_index(&self, target: Target, table: usize) -> usize {
        let salted = target.h1.wrapping_add((table as u32).wrapping_mul(target.h2));
        (salted % self.num_buckets as u32) as usize
    }

    fn contains_target(&self, target: Target) -> bool {
        self.tables.iter().enumerate().any(|(table, buckets)| {
            buckets[self.bucket_index(target, table)]
                .live()
                .contains(&target.fp)
        })
    }

    /// Add a key.
    ///
    /// Returns `false` without changing anything if the key is already a member
    /// (including by fingerprint collision) or if every candidate bucket is full.
    pub fn add<K>(&mut self, key: &K) -> bool
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let target = self.target(key.as_ref());
        if self.contains_target(target) {
            return false;
        }

        let mut best: Option<(usize, usize, u8)> = None;
        for table in 0..self.tables.len() {
            let index = self.bucket_index(target, table);
            let bucket = &self.tables[table][index];
            if bucket.is_full() {
                continue;
            }
            if best.map_or(true, |(_, _, count)| bucket.count < count) {
                best = Some((table, index, bucket.count));
            }
        }

        match best {
            Some((table, index, _)) => {
                self.tables[table][index].push(target.fp);
                true
            }
            None => {
                tracing::trace!(
                    tables = self.tables.len(),
                    "CountingFilter::add every candidate bucket is full"
                );
                false
            }
        }
    }

    /// Remove a key.
    ///
    /// Every candidate bucket is searched, and each one drops its first matching
    /// fingerprint. Returns `true` if anything was removed.
    ///
    /// A fingerprint collision between two keys can therefore remove both, and
    /// deleting a key that was never added can remove another key.
    pub fn delete<K>(&mut self, key: &K) -> bool
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let target = self.target(key.as_ref());
        let mut deleted = false;
        for table in 0..self.tables.len() {
            let index = self.bucket_index(target, table);
            if self.tables[table][index].remove(target.fp) {
                deleted = true;
            }
        }
        deleted
    }

    /// Check if a key might be in the filter.
    #[must_use]
    pub fn is_member<K>(&self, key: &K) -> bool
    where
        K: AsRef<[u8]> + ?Sized,
    {
        self.contains_target(self.target(key.as_ref()))
    }

    /// Sum of every bucket's count.
    ///
    /// Scans the whole filter.
    #[must_use]
    pub fn get_count(&self) -> usize {
        self.tables
            .iter()
            .flatten()
            .map(|bucket| usize::from(bucket.count))
            .sum()
    }

    /// Alias of [`get_count`](Self::get_count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.get_count()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.iter().flatten().all(|bucket| bucket.count == 0)
    }

    /// Empty every bucket.
    pub fn clear(&mut self) {
        for table in &mut self.tables {
            table.fill(Bucket::default());
        }
    }

    /// Number of tables.
    #[must_use]
    #[inline]
    pub fn num_tables(&self) -> usize {
        self.tables.len()
    }

    /// Buckets per table.
    #[must_use]
    #[inline]
    pub fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    /// Total fingerprint slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tables.len() * self.num_buckets * BUCKET_HEIGHT
    }

    /// Fraction of slots in use.
    #[must_use]
    pub fn load_factor(&self) -> f64 {
        self.get_count() as f64 / self.capacity() as f64
    }

    /// Heap bytes used by the tables.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.tables.len() * self.num_buckets * std::mem::size_of::<Bucket>()
    }

    /// Reference to the hasher.
    #[must_use]
    pub fn hasher(&self) -> &H {
        &self.hasher
    }
}

impl<H> fmt::Display for CountingFilter<H>
where
    H: FilterHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CountingFilter(tables: {}, buckets: {}, count: {})",
            self.tables.len(),
            self.num_buckets,
            self.get_count()
        )
    }
}

impl<H> AmqFilter for CountingFilter<H>
where
    H: FilterHasher,
{
    fn try_insert(&mut self, key: &[u8]) -> Result<()> {
        if self.add(key) || self.is_member(key) {
            return Ok(());
        }
        full_unless(false, self.capacity())
    }

    fn contains(&self, key: &[u8]) -> bool {
        self.is_member(key)
    }

    fn len(&self) -> usize {
        self.get_count()
    }

    fn capacity(&self) -> usize {
        CountingFilter::capacity(self)
    }

    fn clear(&mut self) {
        CountingFilter::clear(self);
    }

    fn name(&self) -> &'static str {
        "CountingFilter"
    }
}

impl<H> DeletableFilter for CountingFilter<H>
where
    H: FilterHasher,
{
    fn remove(&mut self, key: &[u8]) -> bool {
        self.delete(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_fps(filter: &CountingFilter, table: usize, index: usize) -> Vec<u16> {
        filter.tables[table][index].live().to_vec()
    }

    #[test]
    fn test_new_validation() {
        assert!(CountingFilter::new(1, 1).is_ok());
        assert!(CountingFilter::new(4, 4).is_ok());

        assert!(matches!(
            CountingFilter::new(0, 16),
            Err(AmqCraftError::InvalidParameters { .. })
        ));
        assert!(matches!(
            CountingFilter::new(5, 4),
            Err(AmqCraftError::InvalidParameters { .. })
        ));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_new_rejects_more_buckets_than_u32() {
        let err = CountingFilter::new(1, u32::MAX as usize + 1).unwrap_err();
        assert!(matches!(err, AmqCraftError::InvalidParameters { .. }));
    }

    #[test]
    fn test_new_rejects_unaddressable_size() {
        let err = CountingFilter::new(usize::MAX / 2, usize::MAX / 2).unwrap_err();
        assert!(matches!(
            err,
            AmqCraftError::InvalidParameters { .. } | AmqCraftError::InvalidFilterSize { .. }
        ));
    }

    #[test]
    fn test_new_for_capacity() {
        let small = CountingFilter::new_for_capacity(10).unwrap();
        assert_eq!(small.num_tables(), 1);
        assert_eq!(small.num_buckets(), CAPACITY_BUCKETS);

        let large = CountingFilter::new_for_capacity(100_000).unwrap();
        assert_eq!(large.num_tables(), 3);
        assert_eq!(large.capacity(), 3 * 4096 * 8);
    }

    #[test]
    fn test_add_rejects_members() {
        let mut filter = CountingFilter::new(2, 16).unwrap();
        assert!(filter.add("a"));
        assert!(!filter.add("a"));
        assert_eq!(filter.get_count(), 1);
    }

    #[test]
    fn test_single_bucket_fills_up() {
        let mut filter = CountingFilter::new(1, 1).unwrap();
        for i in 0..8 {
            assert!(filter.add(&format!("k{}", i)), "k{} rejected", i);
        }
        assert!(!filter.add("k8"));
        assert_eq!(filter.get_count(), 8);
        assert_eq!(filter.load_factor(), 1.0);
    }

    #[test]
    fn test_add_picks_least_loaded_lowest_table() {
        let mut filter = CountingFilter::new(4, 8).unwrap();
        for i in 0..48 {
            let key = format!("key-{}", i);
            let target = filter.target(key.as_bytes());
            let before: Vec<u8> = (0..4)
                .map(|t| filter.tables[t][filter.bucket_index(target, t)].count)
                .collect();

            if !filter.add(&key) {
                continue;
            }

            let after: Vec<u8> = (0..4)
                .map(|t| filter.tables[t][filter.bucket_index(target, t)].count)
                .collect();
            let open_min = before
                .iter()
                .copied()
                .filter(|&c| usize::from(c) < BUCKET_HEIGHT)
                .min()
                .unwrap();
            let chosen = before.iter().position(|&c| c == open_min).unwrap();
            let bucket = filter.bucket_index(target, chosen);
            // Candidates in different tables never alias, so exactly one count moved.
            assert_eq!(after[chosen], before[chosen] + 1, "key {}", key);
            assert_eq!(filter.tables[chosen][bucket].live().last(), Some(&target.fp));
        }
    }

    #[test]
    fn test_first_add_goes_to_table_zero() {
        let mut filter = CountingFilter::new(3, 64).unwrap();
        assert!(filter.add("first"));

        let target = filter.target(b"first");
        let index = filter.bucket_index(target, 0);
        assert_eq!(live_fps(&filter, 0, index), vec![target.fp]);
    }

    #[test]
    fn test_delete_compacts_bucket() {
        let mut filter = CountingFilter::new(1, 1).unwrap();
        let keys = ["a", "b", "c", "d", "e"];
        for key in keys {
            assert!(filter.add(key));
        }
        let fps: Vec<u16> = keys.iter().map(|k| filter.target(k.as_bytes()).fp).collect();

        assert!(filter.delete("c"));
        assert_eq!(live_fps(&filter, 0, 0), vec![fps[0], fps[1], fps[3], fps[4]]);
        assert_eq!(filter.tables[0][0].count, 4);
        assert_eq!(filter.tables[0][0].entries[4..], [0; 4]);

        assert!(filter.is_member("e"));
        assert!(!filter.is_member("c"));
        assert!(!filter.delete("c"));
    }

    #[test]
    fn test_stale_entries_are_not_read() {
        let mut filter = CountingFilter::new(1, 1).unwrap();
        filter.add("x");
        let fp = filter.target(b"x").fp;

        // Slot beyond `count` holding the fingerprint must not count as present.
        filter.tables[0][0] = Bucket {
            entries: [0, fp, 0, 0, 0, 0, 0, 0],
            count: 1,
        };
        assert!(!filter.is_member("x"));
    }

    #[test]
    fn test_delete_continues_across_tables() {
        let mut filter = CountingFilter::new(3, 32).unwrap();
        let target = filter.target(b"dup");
        for table in 0..3 {
            let index = filter.bucket_index(target, table);
            filter.tables[table][index].push(target.fp);
        }
        assert_eq!(filter.get_count(), 3);

        assert!(filter.delete("dup"));
        assert_eq!(filter.get_count(), 0);
        assert!(!filter.is_member("dup"));
    }

    #[test]
    fn test_index_uses_wrapping_u32_math() {
        let filter = CountingFilter::new(3, 7).unwrap();
        let target = Target {
            h1: u32::MAX,
            h2: u32::MAX,
            fp: 1,
        };
        // (MAX + 2 * MAX) wraps to MAX - 2 = 4294967293
        assert_eq!(filter.bucket_index(target, 2), (4_294_967_293u32 % 7) as usize);
        assert_eq!(filter.bucket_index(target, 0), (u32::MAX % 7) as usize);
    }

    #[test]
    fn test_clear() {
        let mut filter = CountingFilter::new(2, 16).unwrap();
        filter.add("a");
        filter.add("b");
        filter.clear();
        assert!(filter.is_empty());
        assert!(!filter.is_member("a"));
    }

    #[test]
    fn test_trait_object() {
        let mut filter = CountingFilter::new(1, 1).unwrap();
        let dyn_filter: &mut dyn DeletableFilter = &mut filter;
        for i in 0..8u8 {
            dyn_filter.try_insert(&[b'k', b'0' + i]).unwrap();
        }
        // Present keys are not an error even in a full filter.
        dyn_filter.try_insert(b"k0").unwrap();
        assert!(dyn_filter.try_insert(b"k8").unwrap_err().is_full());
        assert!(dyn_filter.remove(b"k3"));
        assert_eq!(dyn_filter.len(), 7);
    }

    #[test]
    fn test_display() {
        let mut filter = CountingFilter::new(2, 8).unwrap();
        filter.add("a");
        assert_eq!(filter.to_string(), "CountingFilter(tables: 2, buckets: 8, count: 1)");
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CountingFilter>();
    }
}
