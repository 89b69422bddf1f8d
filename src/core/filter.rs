//! Core filter trait definitions.
//!
//! The three filter families in this crate differ in how they report capacity
//! exhaustion: the quotient filter returns `Err(Full)`, while the cuckoo and counting
//! filters return `false`. [`AmqFilter`] puts them behind one fallible contract so they
//! can be swapped and tested together.
//!
//! # Design Principles
//!
//! 1. **No False Negatives**: once `try_insert(x)` returns `Ok`, `contains(x)` MUST
//!    return `true` until `x` is removed or the filter cleared
//! 2. **Explicit Exhaustion**: a full filter reports [`AmqCraftError::Full`]; it never
//!    drops a stored key to make room
//! 3. **Byte Keys**: keys are byte slices, so any type with a stable byte encoding works
//!
//! # Trait Hierarchy
//!
//! ```text
//! AmqFilter (insert, query, statistics)
//!     └── DeletableFilter (remove)
//! ```
//!
//! # Concurrency
//!
//! Every mutation takes `&mut self`. Filters are `Send + Sync` when their hasher is,
//! so concurrent use means wrapping them in a `Mutex` or `RwLock`.
//!
//! # Examples
//!
//! ```
//! use amqcraft::core::{AmqFilter, DeletableFilter};
//! use amqcraft::CuckooFilter;
//!
//! fn fill(filter: &mut dyn DeletableFilter, keys: &[&str]) -> amqcraft::Result<()> {
//!     for key in keys {
//!         filter.try_insert(key.as_bytes())?;
//!     }
//!     Ok(())
//! }
//!
//! let mut filter = CuckooFilter::new(1024);
//! fill(&mut filter, &["alice", "bob"]).unwrap();
//! assert!(filter.remove(b"alice"));
//! assert!(filter.contains(b"bob"));
//! ```

use crate::error::{AmqCraftError, Result};

/// Approximate membership query filter.
///
/// # Guarantees
///
/// * `contains` never returns `false` for a key whose `try_insert` returned `Ok`, as long
///   as it has not been removed since
/// * `contains` may return `true` for keys that were never inserted
pub trait AmqFilter {
    /// Insert a key.
    ///
    /// Inserting a key that is already present succeeds without changing anything for
    /// the quotient and counting filters. The cuckoo filters store one more copy.
    ///
    /// # Errors
    ///
    /// Returns [`AmqCraftError::Full`] when the key cannot be stored.
    fn try_insert(&mut self, key: &[u8]) -> Result<()>;

    /// Check if a key might be in the filter.
    ///
    /// # Returns
    ///
    /// * `true` - key **might** be present (could be a false positive)
    /// * `false` - key is **definitely not** present
    fn contains(&self, key: &[u8]) -> bool;

    /// Number of stored fingerprints.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of fingerprints the filter can hold without growing.
    fn capacity(&self) -> usize;

    /// Fraction of the capacity in use.
    fn load_factor(&self) -> f64 {
        let capacity = self.capacity();
        if capacity == 0 {
            0.0
        } else {
            self.len() as f64 / capacity as f64
        }
    }

    /// Remove every stored fingerprint, keeping the allocation.
    fn clear(&mut self);

    /// Short name of the filter type.
    fn name(&self) -> &'static str;

    /// Insert keys until one fails.
    ///
    /// # Errors
    ///
    /// Returns the first error. Keys before it stay inserted.
    fn try_insert_batch<'a, I>(&mut self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a [u8]>,
        Self: Sized,
    {
        for key in keys {
            self.try_insert(key)?;
        }
        Ok(())
    }

    /// Query several keys at once.
    fn contains_batch<'a, I>(&self, keys: I) -> Vec<bool>
    where
        I: IntoIterator<Item = &'a [u8]>,
        Self: Sized,
    {
        keys.into_iter().map(|key| self.contains(key)).collect()
    }
}

/// Filter that supports deleting keys.
///
/// # Warning
///
/// Only remove keys that were inserted. Removing a key that was never inserted but
/// collides with a stored fingerprint deletes that other key, creating a false
/// negative.
pub trait DeletableFilter: AmqFilter {
    /// Remove one copy of `key`. Returns `true` if a matching fingerprint was removed.
    fn remove(&mut self, key: &[u8]) -> bool;
}

/// Map a boolean insert outcome onto the trait's error contract.
#[inline]
pub(crate) fn full_unless(inserted: bool, capacity: usize) -> Result<()> {
    if inserted {
        Ok(())
    } else {
        Err(AmqCraftError::full(capacity))
    }
}
