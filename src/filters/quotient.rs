//! Quotient filter.
//!
//! A quotient filter splits each key's hash into a `q`-bit quotient, which picks a home
//! slot, and an `r`-bit remainder, which is what gets stored. Remainders sharing a
//! quotient form a sorted *run*; runs that collide are shifted right into *clusters*,
//! and three metadata bits per slot are enough to find any run again.
//!
//! # Slot Layout
//!
//! ```text
//!  bit:  r+2 ........ 3   2         1              0
//!       [  remainder   ][ shifted ][ continuation ][ occupied ]
//! ```
//!
//! - `occupied`: some key has this slot as its home (positional, never moves)
//! - `continuation`: this slot continues the run started to its left
//! - `shifted`: the remainder in this slot is not in its home slot
//!
//! # Guarantees
//!
//! - No false negatives: a hash is only lost if it collides in all `q + r` bits with one
//!   already stored, in which case the lookup still succeeds
//! - False positive probability `1 - e^(-a / 2^r)` at load `a`, never above `2^-r`
//! - Exactly `2^q` keys fit. The next insert returns [`AmqCraftError::Full`]
//!
//! # Examples
//!
//! ```
//! use amqcraft::QuotientFilter;
//!
//! let mut filter = QuotientFilter::new(5, 4).unwrap();
//! filter.add("alice").unwrap();
//! assert!(filter.contains("alice"));
//! assert_eq!(filter.capacity(), 32);
//! ```
//!
//! ## Growing in place
//!
//! ```
//! use amqcraft::QuotientFilter;
//!
//! let mut filter = QuotientFilter::new(4, 8).unwrap();
//! filter.add("a").unwrap();
//! filter.double().unwrap();
//! assert_eq!(filter.quotient_bits(), 5);
//! assert_eq!(filter.remainder_bits(), 7);
//! assert!(filter.contains("a"));
//! ```

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

use crate::core::filter::AmqFilter;
use crate::core::params::{
    quotient_bits_for_capacity, quotient_false_positive_probability,
    remainder_bits_for_probability, validate_quotient_bits, SLOT_METADATA_BITS,
};
use crate::core::slots::PackedSlots;
use crate::error::{AmqCraftError, Result};
use crate::hash::{DefaultHasher, FilterHasher};
use crate::util::bitops::low_mask;
use std::collections::VecDeque;
use std::fmt;

const OCCUPIED: u64 = 1;
const CONTINUATION: u64 = 2;
const SHIFTED: u64 = 4;
const METADATA_MASK: u64 = 7;

#[inline(always)]
fn is_occupied(slot: u64) -> bool {
    slot & OCCUPIED != 0
}

#[inline(always)]
fn is_continuation(slot: u64) -> bool {
    slot & CONTINUATION != 0
}

#[inline(always)]
fn is_shifted(slot: u64) -> bool {
    slot & SHIFTED != 0
}

#[inline(always)]
fn is_empty_slot(slot: u64) -> bool {
    slot & METADATA_MASK == 0
}

#[inline(always)]
fn remainder_of(slot: u64) -> u64 {
    slot >> SLOT_METADATA_BITS
}

/// Where an insert ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// A new slot was filled.
    Inserted,
    /// The remainder was already in its run, at this slot.
    Existing(usize),
}

/// Quotient filter over byte keys.
///
/// # Type Parameters
///
/// * `H` - Hash function (defaults to [`DefaultHasher`])
///
/// # Thread Safety
///
/// Mutation needs `&mut self`. Wrap in a `Mutex` or `RwLock` to share.
#[derive(Debug, Clone)]
pub struct QuotientFilter<H = DefaultHasher>
where
    H: FilterHasher,
{
    /// Quotient bits (q)
    q_bits: u32,

    /// Remainder bits (r)
    r_bits: u32,

    /// Stored fingerprints
    len: usize,

    /// Slot count, `2^q`
    capacity: usize,

    /// Mask of the low `q` bits
    q_mask: u64,

    /// Mask of the low `r` bits
    r_mask: u64,

    /// `r + 3`-bit slots
    slots: PackedSlots,

    /// One value per slot, moved together with the slot's remainder
    values: Option<Vec<u64>>,

    /// Load at which inserts double the filter first
    max_load_factor: Option<f64>,

    /// Hash function
    hasher: H,
}

impl QuotientFilter<DefaultHasher> {
    /// Create a filter with `q_bits` quotient bits and `r_bits` remainder bits.
    ///
    /// The filter holds `2^q_bits` keys.
    ///
    /// # Errors
    ///
    /// - [`AmqCraftError::InvalidParameters`] if either width is 0 or `r_bits > 61`
    /// - [`AmqCraftError::BitWidthExceeded`] if `q_bits + r_bits > 64`
    /// - [`AmqCraftError::InvalidFilterSize`] if the slots cannot be allocated
    ///
    /// # Examples
    ///
    /// ```
    /// use amqcraft::{AmqCraftError, QuotientFilter};
    ///
    /// assert!(QuotientFilter::new(10, 8).is_ok());
    /// assert!(matches!(
    ///     QuotientFilter::new(40, 30),
    ///     Err(AmqCraftError::BitWidthExceeded { .. })
    /// ));
    /// ```
    pub fn new(q_bits: u32, r_bits: u32) -> Result<Self> {
        Self::with_hasher(q_bits, r_bits, DefaultHasher::default())
    }

    /// Create a filter sized for `capacity` keys at false positive probability `p`.
    ///
    /// The quotient is sized for twice the requested capacity, so the probability
    /// holds with the filter half full.
    ///
    /// # Errors
    ///
    /// - [`AmqCraftError::InvalidCapacity`] if `capacity == 0`
    /// - [`AmqCraftError::FalsePositiveRateOutOfBounds`] unless `0 < p < 1`
    /// - any error of [`QuotientFilter::new`]
    ///
    /// # Examples
    ///
    /// ```
    /// use amqcraft::QuotientFilter;
    ///
    /// let filter = QuotientFilter::new_for_capacity(1000, 0.01).unwrap();
    /// assert_eq!(filter.quotient_bits(), 11);
    /// assert_eq!(filter.remainder_bits(), 7);
    /// ```
    pub fn new_for_capacity(capacity: usize, p: f64) -> Result<Self> {
        let q_bits = quotient_bits_for_capacity(capacity)?;
        let r_bits = remainder_bits_for_probability(p)?;
        Self::new(q_bits, r_bits)
    }
}

impl<H> QuotientFilter<H>
where
    H: FilterHasher,
{
    /// Create a filter with a custom hasher.
    ///
    /// # Errors
    ///
    /// Same as [`QuotientFilter::new`].
    pub fn with_hasher(q_bits: u32, r_bits: u32, hasher: H) -> Result<Self> {
        let (capacity, slots) = Self::layout(q_bits, r_bits)?;

        Ok(Self {
            q_bits,
            r_bits,
            len: 0,
            capacity,
            q_mask: low_mask(q_bits),
            r_mask: low_mask(r_bits),
            slots,
            values: None,
            max_load_factor: None,
            hasher,
        })
    }

    fn layout(q_bits: u32, r_bits: u32) -> Result<(usize, PackedSlots)> {
        validate_quotient_bits(q_bits, r_bits)?;

        let width = r_bits + SLOT_METADATA_BITS;
        if q_bits >= usize::BITS {
            return Err(AmqCraftError::invalid_filter_size(
                (1u128 << q_bits) * u128::from(width),
            ));
        }

        let capacity = 1usize << q_bits;
        let slots = PackedSlots::new(capacity, width)?;
        Ok((capacity, slots))
    }

    /// Attach a `u64` value to every slot.
    ///
    /// Enables [`insert_with_value`](Self::insert_with_value) and
    /// [`get`](Self::get). Keys already stored get the value 0.
    #[must_use]
    pub fn with_value_storage(mut self) -> Self {
        if self.values.is_none() {
            self.values = Some(vec![0; self.capacity]);
        }
        self
    }

    /// Returns `true` if values are stored alongside fingerprints.
    #[must_use]
    #[inline]
    pub fn has_value_storage(&self) -> bool {
        self.values.is_some()
    }

    /// Double the filter automatically once `len` reaches `capacity * load`.
    ///
    /// `None` turns auto-doubling off, which is the default. Doubling stops once the
    /// remainder is down to a single bit; from then on a full filter reports
    /// [`AmqCraftError::Full`] again.
    ///
    /// # Errors
    ///
    /// Returns [`AmqCraftError::InvalidParameters`] unless `0 < load <= 1`.
    pub fn set_max_load_factor(&mut self, load: Option<f64>) -> Result<()> {
        if let Some(load) = load {
            if !(load > 0.0 && load <= 1.0) {
                return Err(AmqCraftError::invalid_parameters(format!(
                    "max load factor must be in (0, 1], got {}",
                    load
                )));
            }
        }
        self.max_load_factor = load;
        Ok(())
    }

    /// Configured auto-doubling threshold.
    #[must_use]
    #[inline]
    pub fn max_load_factor(&self) -> Option<f64> {
        self.max_load_factor
    }

    /// Split the hash of `key` into `(quotient, remainder)`.
    #[must_use]
    pub fn hash<K>(&self, key: &K) -> (u64, u64)
    where
        K: AsRef<[u8]> + ?Sized,
    {
        self.split(self.hasher.hash_bytes(key.as_ref()))
    }

    #[inline]
    fn split(&self, hash: u64) -> (u64, u64) {
        ((hash >> self.r_bits) & self.q_mask, hash & self.r_mask)
    }

    /// Add a key.
    ///
    /// Adding a key whose remainder is already in its run changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`AmqCraftError::Full`] once `len() == capacity()`, even if the key is
    /// already present.
    pub fn add<K>(&mut self, key: &K) -> Result<()>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        self.maybe_double()?;
        let (quotient, remainder) = self.hash(key);
        self.insert_parts(quotient, remainder, 0).map(|_| ())
    }

    /// Add keys in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`add`](Self::add).
    pub fn add_all<I, K>(&mut self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<[u8]>,
    {
        for key in keys {
            self.add(&key)?;
        }
        Ok(())
    }

    /// Add a precomputed hash.
    ///
    /// The hash is split exactly as [`hash`](Self::hash) would split it, so it must come
    /// from the same hasher for later key lookups to match.
    ///
    /// # Errors
    ///
    /// Returns [`AmqCraftError::Full`] when the filter is full.
    pub fn add_hash(&mut self, hash: u64) -> Result<()> {
        self.maybe_double()?;
        let (quotient, remainder) = self.split(hash);
        self.insert_parts(quotient, remainder, 0).map(|_| ())
    }

    /// Check if a key might be in the filter.
    #[must_use]
    pub fn contains<K>(&self, key: &K) -> bool
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let (quotient, remainder) = self.hash(key);
        self.find(quotient, remainder).is_some()
    }

    /// Check if a precomputed hash might be in the filter.
    #[must_use]
    pub fn contains_hash(&self, hash: u64) -> bool {
        let (quotient, remainder) = self.split(hash);
        self.find(quotient, remainder).is_some()
    }

    /// Store `key` with `value`.
    ///
    /// Returns `true` if the key was already present, in which case its value is
    /// replaced.
    ///
    /// # Errors
    ///
    /// - [`AmqCraftError::UnsupportedOperation`] without value storage
    /// - [`AmqCraftError::Full`] when the filter is full
    ///
    /// # Examples
    ///
    /// ```
    /// use amqcraft::QuotientFilter;
    ///
    /// let mut filter = QuotientFilter::new(8, 16).unwrap().with_value_storage();
    /// assert!(!filter.insert_with_value("port", 80).unwrap());
    /// assert!(filter.insert_with_value("port", 443).unwrap());
    /// assert_eq!(filter.get("port"), Some(443));
    /// ```
    pub fn insert_with_value<K>(&mut self, key: &K, value: u64) -> Result<bool>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        if self.values.is_none() {
            return Err(AmqCraftError::unsupported_operation(
                "insert_with_value",
                "QuotientFilter without value storage",
            ));
        }

        self.maybe_double()?;
        let (quotient, remainder) = self.hash(key);
        match self.insert_parts(quotient, remainder, value)? {
            Placement::Inserted => Ok(false),
            Placement::Existing(index) => {
                if let Some(values) = self.values.as_mut() {
                    values[index] = value;
                }
                Ok(true)
            }
        }
    }

    /// Value stored with `key`, if value storage is on and the key is present.
    ///
    /// A false positive returns the value of the colliding key.
    #[must_use]
    pub fn get<K>(&self, key: &K) -> Option<u64>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        let values = self.values.as_ref()?;
        let (quotient, remainder) = self.hash(key);
        self.find(quotient, remainder).map(|index| values[index])
    }

    /// Rebuild with one more quotient bit and one fewer remainder bit.
    ///
    /// Capacity doubles and every stored fingerprint is reinserted unchanged, so no
    /// key is lost. The false positive bound doubles with it.
    ///
    /// # Errors
    ///
    /// Returns [`AmqCraftError::InvalidParameters`] when `r_bits` is already 1, and
    /// [`AmqCraftError::InvalidFilterSize`] if the larger table cannot be allocated.
    pub fn double(&mut self) -> Result<()> {
        if self.r_bits < 2 {
            return Err(AmqCraftError::invalid_parameters(format!(
                "r_bits={} leaves no room to double",
                self.r_bits
            )));
        }

        let q_bits = self.q_bits + 1;
        let r_bits = self.r_bits - 1;
        let (capacity, slots) = Self::layout(q_bits, r_bits)?;

        let entries: Vec<(u64, u64)> = {
            let mut iter = Fingerprints::new(&self.slots, self.r_bits, self.len);
            let mut out = Vec::with_capacity(self.len);
            while let Some((fingerprint, index)) = iter.next_entry() {
                let value = self.values.as_ref().map_or(0, |values| values[index]);
                out.push((fingerprint, value));
            }
            out
        };

        tracing::debug!(
            old_q = self.q_bits,
            old_r = self.r_bits,
            new_q = q_bits,
            new_r = r_bits,
            len = self.len,
            "QuotientFilter::double"
        );

        self.q_bits = q_bits;
        self.r_bits = r_bits;
        self.capacity = capacity;
        self.q_mask = low_mask(q_bits);
        self.r_mask = low_mask(r_bits);
        self.slots = slots;
        self.len = 0;
        if self.values.is_some() {
            self.values = Some(vec![0; capacity]);
        }

        for (fingerprint, value) in entries {
            let (quotient, remainder) = self.split(fingerprint);
            self.insert_parts(quotient, remainder, value)?;
        }
        Ok(())
    }

    fn maybe_double(&mut self) -> Result<()> {
        if let Some(load) = self.max_load_factor {
            let threshold = (self.capacity as f64 * load).ceil() as usize;
            if self.len >= threshold && self.r_bits >= 2 && self.q_bits + 1 < usize::BITS {
                self.double()?;
            }
        }
        Ok(())
    }

    /// Iterate over stored fingerprints, `(quotient << r) | remainder`, in slot order.
    ///
    /// # Examples
    ///
    /// ```
    /// use amqcraft::QuotientFilter;
    ///
    /// let mut filter = QuotientFilter::new(6, 6).unwrap();
    /// filter.add_all(["a", "b", "c"]).unwrap();
    /// assert_eq!(filter.fingerprints().count(), 3);
    /// ```
    #[must_use]
    pub fn fingerprints(&self) -> Fingerprints<'_> {
        Fingerprints::new(&self.slots, self.r_bits, self.len)
    }

    /// Number of stored fingerprints.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots, `2^q`.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Quotient bits (q).
    #[must_use]
    #[inline]
    pub fn quotient_bits(&self) -> u32 {
        self.q_bits
    }

    /// Remainder bits (r).
    #[must_use]
    #[inline]
    pub fn remainder_bits(&self) -> u32 {
        self.r_bits
    }

    /// Fraction of slots in use.
    #[must_use]
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity as f64
    }

    /// False positive probability at the current load: `1 - e^(-a / 2^r)`.
    #[must_use]
    pub fn fp_probability(&self) -> f64 {
        quotient_false_positive_probability(self.len, self.capacity, self.r_bits)
    }

    /// Bytes used by the filter, including slot and value storage.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.slots.memory_usage()
            + self.values.as_ref().map_or(0, |v| v.len() * std::mem::size_of::<u64>())
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        self.slots.clear();
        if let Some(values) = self.values.as_mut() {
            values.fill(0);
        }
        self.len = 0;
    }

    /// The hasher in use.
    #[must_use]
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Render every slot as `index: (occupied continuation shifted): remainder`.
    ///
    /// Meant for debugging small filters.
    #[must_use]
    pub fn slot_dump(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(out, "{}", self);
        let _ = writeln!(out, "slot, (is_occupied:is_continuation:is_shifted): remainder");
        for index in 0..self.capacity {
            let slot = self.slots.get(index);
            let _ = writeln!(
                out,
                "{:5}: ({}{}{}): {:6}",
                index,
                u8::from(is_occupied(slot)),
                u8::from(is_continuation(slot)),
                u8::from(is_shifted(slot)),
                remainder_of(slot)
            );
        }
        out
    }

    #[inline]
    fn next(&self, index: usize) -> usize {
        (index + 1) & (self.capacity - 1)
    }

    #[inline]
    fn previous(&self, index: usize) -> usize {
        index.wrapping_sub(1) & (self.capacity - 1)
    }

    /// Slot where the run for `quotient` starts, or would start.
    fn find_run(&self, quotient: usize) -> usize {
        // Back up to the start of the cluster.
        let mut index = quotient;
        while is_shifted(self.slots.get(index)) {
            index = self.previous(index);
        }

        // Walk forward one run per occupied quotient until we reach ours.
        let mut run = index;
        while index != quotient {
            loop {
                run = self.next(run);
                if !is_continuation(self.slots.get(run)) {
                    break;
                }
            }
            loop {
                index = self.next(index);
                if is_occupied(self.slots.get(index)) {
                    break;
                }
            }
        }
        run
    }

    /// Slot holding `remainder` in the run of `quotient`.
    fn find(&self, quotient: u64, remainder: u64) -> Option<usize> {
        let quotient = quotient as usize;
        if !is_occupied(self.slots.get(quotient)) {
            return None;
        }

        let mut index = self.find_run(quotient);
        loop {
            let stored = remainder_of(self.slots.get(index));
            if stored == remainder {
                return Some(index);
            }
            if stored > remainder {
                return None;
            }
            index = self.next(index);
            if !is_continuation(self.slots.get(index)) {
                return None;
            }
        }
    }

    fn insert_parts(&mut self, quotient: u64, remainder: u64, value: u64) -> Result<Placement> {
        if self.len >= self.capacity {
            tracing::trace!(capacity = self.capacity, "QuotientFilter full");
            return Err(AmqCraftError::full(self.capacity));
        }

        let quotient = quotient as usize;
        let home = self.slots.get(quotient);
        let mut entry = remainder << SLOT_METADATA_BITS;

        if is_empty_slot(home) {
            self.slots.set(quotient, entry | OCCUPIED);
            if let Some(values) = self.values.as_mut() {
                values[quotient] = value;
            }
            self.len += 1;
            return Ok(Placement::Inserted);
        }

        if !is_occupied(home) {
            self.slots.set(quotient, home | OCCUPIED);
        }

        let start = self.find_run(quotient);
        let mut index = start;

        // Only an existing run needs scanning; a new run goes where find_run put it.
        if is_occupied(home) {
            loop {
                let stored = remainder_of(self.slots.get(index));
                if stored == remainder {
                    return Ok(Placement::Existing(index));
                }
                if stored > remainder {
                    break;
                }
                index = self.next(index);
                if !is_continuation(self.slots.get(index)) {
                    break;
                }
            }

            if index == start {
                let old_start = self.slots.get(start);
                self.slots.set(start, old_start | CONTINUATION);
            } else {
                entry |= CONTINUATION;
            }
        }

        if index != quotient {
            entry |= SHIFTED;
        }

        self.shift_in(index, entry, value);
        self.len += 1;
        Ok(Placement::Inserted)
    }

    /// Write `entry` at `index`, pushing everything up to the next empty slot right.
    ///
    /// Occupied bits belong to positions and stay put; remainders and values move.
    fn shift_in(&mut self, mut index: usize, entry: u64, value: u64) {
        let mut current = entry;
        let mut current_value = value;

        loop {
            let mut displaced = self.slots.get(index);
            let empty = is_empty_slot(displaced);
            if !empty {
                displaced |= SHIFTED;
                if is_occupied(displaced) {
                    current |= OCCUPIED;
                    displaced &= !OCCUPIED;
                }
            }

            self.slots.set(index, current);
            if let Some(values) = self.values.as_mut() {
                std::mem::swap(&mut values[index], &mut current_value);
            }

            current = displaced;
            index = self.next(index);
            if empty {
                break;
            }
        }
    }
}

impl<H> fmt::Display for QuotientFilter<H>
where
    H: FilterHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "QuotientFilter(q_bits: {}, r_bits: {}, len: {}, capacity: {}, fp: {:.6})",
            self.q_bits,
            self.r_bits,
            self.len,
            self.capacity,
            self.fp_probability()
        )
    }
}

impl<H> AmqFilter for QuotientFilter<H>
where
    H: FilterHasher,
{
    fn try_insert(&mut self, key: &[u8]) -> Result<()> {
        self.add(key)
    }

    fn contains(&self, key: &[u8]) -> bool {
        QuotientFilter::contains(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        QuotientFilter::clear(self);
    }

    fn name(&self) -> &'static str {
        "QuotientFilter"
    }
}

/// Iterator over the fingerprints of a [`QuotientFilter`].
///
/// Starts at an unshifted slot and walks the table once, keeping a queue of the
/// quotients whose runs have been announced by an `occupied` bit but not yet consumed.
#[derive(Debug, Clone)]
pub struct Fingerprints<'a> {
    slots: &'a PackedSlots,
    r_bits: u32,
    position: usize,
    remaining: usize,
    pending: VecDeque<usize>,
}

impl<'a> Fingerprints<'a> {
    fn new(slots: &'a PackedSlots, r_bits: u32, len: usize) -> Self {
        let start = (0..slots.len())
            .find(|&i| !is_shifted(slots.get(i)))
            .unwrap_or(0);

        Self {
            slots,
            r_bits,
            position: start,
            remaining: if len == 0 { 0 } else { slots.len() },
            pending: VecDeque::new(),
        }
    }

    /// Next `(fingerprint, slot index)`.
    fn next_entry(&mut self) -> Option<(u64, usize)> {
        let mask = self.slots.len() - 1;

        while self.remaining > 0 {
            let index = self.position;
            let slot = self.slots.get(index);
            self.position = (index + 1) & mask;
            self.remaining -= 1;

            if is_empty_slot(slot) {
                self.pending.clear();
                continue;
            }
            if !is_continuation(slot) && !self.pending.is_empty() {
                self.pending.pop_front();
            }
            if is_occupied(slot) {
                self.pending.push_back(index);
            }
            if let Some(&quotient) = self.pending.front() {
                let fingerprint = ((quotient as u64) << self.r_bits) | remainder_of(slot);
                return Some((fingerprint, index));
            }
        }
        None
    }
}

impl Iterator for Fingerprints<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        self.next_entry().map(|(fingerprint, _)| fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn fingerprint_of<H: FilterHasher>(filter: &QuotientFilter<H>, key: &str) -> u64 {
        let (q, r) = filter.hash(key);
        (q << filter.remainder_bits()) | r
    }

    #[test]
    fn test_new() {
        let filter = QuotientFilter::new(5, 4).unwrap();
        assert_eq!(filter.capacity(), 32);
        assert_eq!(filter.quotient_bits(), 5);
        assert_eq!(filter.remainder_bits(), 4);
        assert!(filter.is_empty());
        assert!(!filter.has_value_storage());
    }

    #[test]
    fn test_new_invalid() {
        assert!(matches!(
            QuotientFilter::new(40, 30),
            Err(AmqCraftError::BitWidthExceeded { q_bits: 40, r_bits: 30, max: 64 })
        ));
        assert!(QuotientFilter::new(0, 4).is_err());
        assert!(QuotientFilter::new(4, 0).is_err());
        assert!(QuotientFilter::new(2, 62).is_err());
    }

    #[test]
    fn test_new_unaddressable() {
        assert!(matches!(
            QuotientFilter::new(63, 1),
            Err(AmqCraftError::InvalidFilterSize { .. })
        ));
    }

    #[test]
    fn test_hash_split() {
        let filter = QuotientFilter::new(5, 4).unwrap();
        let h = 0b1_0110_1001u64 | (0xff << 9);
        assert_eq!(filter.split(h), (0b10110, 0b1001));
    }

    #[test]
    fn test_add_and_contains() {
        let mut filter = QuotientFilter::new(6, 8).unwrap();
        filter.add("hello").unwrap();
        assert!(filter.contains("hello"));
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_empty_filter_contains_nothing() {
        let filter = QuotientFilter::new(6, 8).unwrap();
        for i in 0..100 {
            assert!(!filter.contains(&i.to_string()));
        }
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let mut filter = QuotientFilter::new(6, 8).unwrap();
        filter.add("dup").unwrap();
        filter.add("dup").unwrap();
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_capacity_exhaustion() {
        let mut filter = QuotientFilter::new(5, 4).unwrap();
        for i in 0..32 {
            filter.add(&i.to_string()).unwrap();
        }
        assert_eq!(filter.len(), 32);

        let err = filter.add("32").unwrap_err();
        assert_eq!(err, AmqCraftError::full(32));

        // Full is reported even for keys that are present.
        assert!(filter.add("0").unwrap_err().is_full());

        for i in 0..32 {
            assert!(filter.contains(&i.to_string()), "lost {}", i);
        }
    }

    #[test]
    fn test_same_quotient_run_is_sorted() {
        let mut filter = QuotientFilter::new(4, 8).unwrap();
        // Quotient 3, remainders out of order.
        for r in [200u64, 5, 90, 17] {
            filter.add_hash((3 << 8) | r).unwrap();
        }
        for r in [5u64, 17, 90, 200] {
            assert!(filter.contains_hash((3 << 8) | r));
        }
        assert!(!filter.contains_hash((3 << 8) | 6));

        let stored: Vec<u64> = (3..7).map(|i| remainder_of(filter.slots.get(i))).collect();
        assert_eq!(stored, vec![5, 17, 90, 200]);
    }

    #[test]
    fn test_wrapping_cluster() {
        let mut filter = QuotientFilter::new(3, 6).unwrap();
        // Three keys homed in the last slot wrap to the front.
        for r in [1u64, 2, 3] {
            filter.add_hash((7 << 6) | r).unwrap();
        }
        filter.add_hash(5).unwrap();

        for r in [1u64, 2, 3] {
            assert!(filter.contains_hash((7 << 6) | r));
        }
        assert!(filter.contains_hash(5));
        assert!(!filter.contains_hash((1 << 6) | 1));
        assert_eq!(filter.len(), 4);
    }

    #[test]
    fn test_fingerprints_match_inserted() {
        let mut filter = QuotientFilter::new(8, 10).unwrap();
        let keys: Vec<String> = (0..150).map(|i| format!("key-{}", i)).collect();
        let mut expected = HashSet::new();
        for key in &keys {
            filter.add(key).unwrap();
            expected.insert(fingerprint_of(&filter, key));
        }

        let found: Vec<u64> = filter.fingerprints().collect();
        assert_eq!(found.len(), filter.len());
        assert_eq!(found.into_iter().collect::<HashSet<_>>(), expected);
    }

    #[test]
    fn test_fingerprints_empty() {
        let filter = QuotientFilter::new(4, 4).unwrap();
        assert_eq!(filter.fingerprints().count(), 0);
    }

    #[test]
    fn test_double_keeps_keys() {
        let mut filter = QuotientFilter::new(7, 10).unwrap();
        let keys: Vec<String> = (0..100).map(|i| format!("k{}", i)).collect();
        filter.add_all(&keys).unwrap();
        let len = filter.len();
        let before: HashSet<u64> = filter.fingerprints().collect();

        filter.double().unwrap();

        assert_eq!(filter.quotient_bits(), 8);
        assert_eq!(filter.remainder_bits(), 9);
        assert_eq!(filter.capacity(), 256);
        assert_eq!(filter.len(), len);
        assert_eq!(filter.fingerprints().collect::<HashSet<_>>(), before);
        for key in &keys {
            assert!(filter.contains(key));
        }
    }

    #[test]
    fn test_double_requires_two_remainder_bits() {
        let mut filter = QuotientFilter::new(4, 1).unwrap();
        assert!(matches!(
            filter.double(),
            Err(AmqCraftError::InvalidParameters { .. })
        ));
        assert_eq!(filter.quotient_bits(), 4);
    }

    #[test]
    fn test_auto_double() {
        let mut filter = QuotientFilter::new(4, 12).unwrap();
        filter.set_max_load_factor(Some(0.75)).unwrap();

        for i in 0..100 {
            filter.add(&i.to_string()).unwrap();
        }
        assert!(filter.quotient_bits() > 4);
        assert_eq!(filter.quotient_bits() + filter.remainder_bits(), 16);
        for i in 0..100 {
            assert!(filter.contains(&i.to_string()));
        }
    }

    #[test]
    fn test_auto_double_stops_at_one_remainder_bit() {
        let mut filter = QuotientFilter::new(1, 2).unwrap();
        filter.set_max_load_factor(Some(0.5)).unwrap();

        let mut full = false;
        for h in 0..16u64 {
            if filter.add_hash(h).is_err() {
                full = true;
                break;
            }
        }
        assert!(full);
        assert_eq!(filter.remainder_bits(), 1);
        assert_eq!(filter.len(), filter.capacity());
    }

    #[test]
    fn test_set_max_load_factor_validation() {
        let mut filter = QuotientFilter::new(4, 4).unwrap();
        assert!(filter.set_max_load_factor(Some(0.0)).is_err());
        assert!(filter.set_max_load_factor(Some(1.5)).is_err());
        assert!(filter.set_max_load_factor(Some(1.0)).is_ok());
        assert!(filter.set_max_load_factor(None).is_ok());
        assert_eq!(filter.max_load_factor(), None);
    }

    #[test]
    fn test_values_follow_shifts() {
        let mut filter = QuotientFilter::new(4, 8).unwrap().with_value_storage();
        // All in one run, inserted in descending remainder order to force shifting.
        for r in (1..=8u64).rev() {
            let (q, rem) = filter.split((2 << 8) | r);
            filter.insert_parts(q, rem, r * 100).unwrap();
        }
        for r in 1..=8u64 {
            let index = filter.find(2, r).unwrap();
            assert_eq!(filter.values.as_ref().unwrap()[index], r * 100);
        }
    }

    #[test]
    fn test_insert_with_value() {
        let mut filter = QuotientFilter::new(8, 20).unwrap().with_value_storage();
        for i in 0..100u64 {
            assert!(!filter.insert_with_value(&format!("v{}", i), i).unwrap());
        }
        for i in 0..100u64 {
            assert_eq!(filter.get(&format!("v{}", i)), Some(i));
        }

        assert!(filter.insert_with_value("v7", 700).unwrap());
        assert_eq!(filter.get("v7"), Some(700));
        assert_eq!(filter.len(), 100);
    }

    #[test]
    fn test_values_survive_double() {
        let mut filter = QuotientFilter::new(6, 16).unwrap().with_value_storage();
        for i in 0..40u64 {
            filter.insert_with_value(&i.to_string(), i + 1000).unwrap();
        }
        filter.double().unwrap();
        for i in 0..40u64 {
            assert_eq!(filter.get(&i.to_string()), Some(i + 1000));
        }
    }

    #[test]
    fn test_insert_with_value_requires_storage() {
        let mut filter = QuotientFilter::new(4, 4).unwrap();
        assert!(matches!(
            filter.insert_with_value("k", 1),
            Err(AmqCraftError::UnsupportedOperation { .. })
        ));
        assert_eq!(filter.get("k"), None);
    }

    #[test]
    fn test_fp_probability() {
        let mut filter = QuotientFilter::new(4, 4).unwrap();
        assert_eq!(filter.fp_probability(), 0.0);
        for h in 0..16u64 {
            filter.add_hash(h << 4).unwrap();
        }
        let expected = 1.0 - (-1.0f64 / 16.0).exp();
        assert!((filter.fp_probability() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_clear() {
        let mut filter = QuotientFilter::new(5, 6).unwrap();
        filter.add_all(["a", "b", "c"]).unwrap();
        filter.clear();
        assert!(filter.is_empty());
        assert!(!filter.contains("a"));
        filter.add("a").unwrap();
        assert!(filter.contains("a"));
    }

    #[test]
    fn test_display_and_dump() {
        let mut filter = QuotientFilter::new(3, 4).unwrap();
        filter.add_hash(0x15).unwrap();

        let summary = filter.to_string();
        assert!(summary.contains("q_bits: 3"));
        assert!(summary.contains("len: 1"));

        let dump = filter.slot_dump();
        assert_eq!(dump.lines().count(), 2 + 8);
        assert!(dump.contains("    1: (100):      5"));
    }

    #[test]
    fn test_memory_usage() {
        let plain = QuotientFilter::new(10, 8).unwrap();
        let valued = QuotientFilter::new(10, 8).unwrap().with_value_storage();
        assert!(plain.memory_usage() >= 1024 * 11 / 8);
        assert_eq!(valued.memory_usage() - plain.memory_usage(), 1024 * 8);
    }

    #[test]
    fn test_trait_object() {
        let mut filter = QuotientFilter::new(5, 4).unwrap();
        let dyn_filter: &mut dyn AmqFilter = &mut filter;
        dyn_filter.try_insert(b"x").unwrap();
        assert!(dyn_filter.contains(b"x"));
        assert_eq!(dyn_filter.name(), "QuotientFilter");
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QuotientFilter>();
    }
}
