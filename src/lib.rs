//! AmqCraft: approximate membership query filters for Rust.
//!
//! AmqCraft provides four filters that answer "have I seen this key?" in far less
//! memory than an exact set, at the cost of occasional false positives:
//!
//! - **Quotient filter**: compact hash table of remainders with in-place doubling and
//!   optional per-key values
//! - **Cuckoo filter**: one-byte fingerprints in two candidate buckets, with deletion
//! - **Scalable cuckoo filter**: a growing chain of cuckoo filters
//! - **d-left counting filter**: 16-bit fingerprints in several tables, with deletion
//!   and duplicate rejection
//!
//! No filter ever reports a stored key as absent.
//!
//! # Quick Start
//!
//! ```
//! use amqcraft::QuotientFilter;
//!
//! // 10,000 keys at a 0.1% false positive rate
//! let mut filter = QuotientFilter::new_for_capacity(10_000, 0.001).unwrap();
//!
//! filter.add("hello").unwrap();
//! filter.add("world").unwrap();
//!
//! assert!(filter.contains("hello"));
//! assert!(!filter.contains("goodbye"));
//! ```
//!
//! # Deletion
//!
//! ```
//! use amqcraft::{CountingFilter, CuckooFilter};
//!
//! let mut cuckoo = CuckooFilter::new(1_000);
//! cuckoo.insert("a");
//! assert!(cuckoo.delete("a"));
//! assert!(!cuckoo.lookup("a"));
//!
//! let mut counting = CountingFilter::new_for_capacity(1_000).unwrap();
//! assert!(counting.add("a"));
//! assert!(!counting.add("a")); // already a member
//! assert!(counting.delete("a"));
//! ```
//!
//! # Using Builders
//!
//! ```
//! use amqcraft::builder::QuotientFilterBuilder;
//!
//! let mut filter = QuotientFilterBuilder::new()
//!     .capacity(1_000)
//!     .false_positive_rate(0.01)
//!     .value_storage(true)
//!     .build()
//!     .unwrap();
//!
//! filter.insert_with_value("answer", 42).unwrap();
//! assert_eq!(filter.get("answer"), Some(42));
//! ```
//!
//! # Common Trait
//!
//! Every filter implements [`AmqFilter`]; the ones that can forget keys also implement
//! [`DeletableFilter`]:
//!
//! ```
//! use amqcraft::{AmqFilter, CuckooFilter, QuotientFilter};
//!
//! let mut filters: Vec<Box<dyn AmqFilter>> = vec![
//!     Box::new(QuotientFilter::new(10, 8).unwrap()),
//!     Box::new(CuckooFilter::new(1_024)),
//! ];
//!
//! for filter in &mut filters {
//!     filter.try_insert(b"key").unwrap();
//!     assert!(filter.contains(b"key"));
//! }
//! ```
//!
//! # Choosing a Filter
//!
//! | Filter | Best For | Grows | Delete | Bits per key (typical) |
//! |--------|----------|-------|--------|------------------------|
//! | `QuotientFilter` | Tunable FP rate, key/value lookups | Doubling | No | r + 3 |
//! | `CuckooFilter` | Known size, deletion | No | Yes | 8.5 to 17 |
//! | `ScalableCuckooFilter` | Unknown size, deletion | Chain | Yes | ~9 |
//! | `CountingFilter` | Exact set semantics with deletion | No | Yes | ~18 |
//!
//! # Features
//!
//! - `serde` (default) - bincode encoding of scalable cuckoo chains
//! - `wyhash` (default) - WyHash hash function
//! - `xxhash` - XXH3 hash function

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::double_must_use)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::len_zero)]
#![allow(clippy::bool_assert_comparison)]
#![allow(clippy::clone_on_copy)]
#![allow(clippy::default_constructed_unit_structs)]
#![allow(clippy::assertions_on_constants)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(html_root_url = "https://docs.rs/amqcraft/0.1.0")]
#![forbid(unsafe_code)]

/// Core traits, sizing math and slot storage
pub mod core;

/// Error types and result aliases
pub mod error;

/// Filter implementations
pub mod filters;

/// Hash functions
pub mod hash;

/// Bit manipulation helpers
pub mod util;

/// Type-safe builders for all filter types
pub mod builder;

/// Serialization support (requires `serde` feature)
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub mod serde_support;

// Re-export commonly used types at crate root
pub use error::{AmqCraftError, DecodeError, Result};

// Re-export core traits
pub use crate::core::filter::{AmqFilter, DeletableFilter};

// Re-export all filter types at the crate root
pub use filters::{CountingFilter, CuckooFilter, QuotientFilter, ScalableCuckooFilter};

// Re-export builders at the crate root
pub use builder::{
    CountingFilterBuilder, CuckooFilterBuilder, QuotientFilterBuilder,
    ScalableCuckooFilterBuilder,
};

pub use hash::{DefaultHasher, FilterHasher};

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use amqcraft::prelude::*;
///
/// let mut filter = CuckooFilter::new(1000);
/// assert!(filter.try_insert(b"hello").is_ok());
/// assert!(filter.contains(b"hello"));
/// ```
pub mod prelude {
    pub use crate::core::filter::{AmqFilter, DeletableFilter};
    pub use crate::error::{AmqCraftError, Result};
    pub use crate::filters::{CountingFilter, CuckooFilter, QuotientFilter, ScalableCuckooFilter};
    pub use crate::hash::{DefaultHasher, FilterHasher};

    // Re-export builders
    pub use crate::builder::prelude::*;

    #[cfg(feature = "serde")]
    pub use crate::serde_support::FilterStore;
}
