//! Filter implementations.
//!
//! # Available Filters
//!
//! - [`QuotientFilter`] - Compact hash table of remainders; can double in place and
//!   carry a value per key
//! - [`CuckooFilter`] - One-byte fingerprints in two candidate buckets, supports deletion
//! - [`ScalableCuckooFilter`] - Chain of cuckoo filters that grows without a size limit
//! - [`CountingFilter`] - d-left tables of 16-bit fingerprints, supports deletion
//!
//! # Choosing a Filter
//!
//! | Filter | Use Case | Full Filter | Delete | Duplicates |
//! |--------|----------|-------------|--------|------------|
//! | [`QuotientFilter`] | Known size, tunable FP rate, key/value | `Err(Full)` or doubles | No | Ignored |
//! | [`CuckooFilter`] | Known size, deletion | `false` | Yes | Stored again |
//! | [`ScalableCuckooFilter`] | Unknown size, deletion | Grows | Yes | Stored again |
//! | [`CountingFilter`] | Known size, deletion, exact set semantics | `false` | Yes | Rejected |
//!
//! # Examples
//!
//! ## Quotient Filter
//!
//! ```
//! use amqcraft::filters::QuotientFilter;
//!
//! let mut filter = QuotientFilter::new_for_capacity(10_000, 0.001).unwrap();
//! filter.add("hello").unwrap();
//! assert!(filter.contains("hello"));
//! ```
//!
//! ## Cuckoo Filter (with deletion)
//!
//! ```
//! use amqcraft::filters::CuckooFilter;
//!
//! let mut filter = CuckooFilter::new(10_000);
//! filter.insert("temporary");
//! assert!(filter.lookup("temporary"));
//!
//! filter.delete("temporary");
//! assert!(!filter.lookup("temporary"));
//! ```
//!
//! ## Scalable Cuckoo Filter (dynamic growth)
//!
//! ```
//! use amqcraft::filters::ScalableCuckooFilter;
//!
//! let mut filter = ScalableCuckooFilter::with_capacity(100);
//!
//! // Can insert far more than the initial capacity
//! for i in 0..10_000 {
//!     filter.insert(&i.to_string());
//! }
//!
//! println!("Grew to {} sub-filters", filter.filter_count());
//! ```
//!
//! ## Counting Filter
//!
//! ```
//! use amqcraft::filters::CountingFilter;
//!
//! let mut filter = CountingFilter::new_for_capacity(100_000).unwrap();
//! assert!(filter.add("x"));
//! assert!(filter.is_member("x"));
//! assert!(filter.delete("x"));
//! ```

#![warn(missing_docs)]
#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod quotient;
pub use quotient::{Fingerprints, QuotientFilter};

pub mod cuckoo;
pub use cuckoo::CuckooFilter;

pub mod scalable_cuckoo;
pub use scalable_cuckoo::{ScalableCuckooFilter, ScaleFactor};

pub mod counting;
pub use counting::CountingFilter;
