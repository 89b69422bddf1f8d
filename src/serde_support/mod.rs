//! Serialization support for the scalable cuckoo filter.
//!
//! A [`CuckooFilter`](crate::CuckooFilter) already has a fixed byte format, one byte per
//! slot, produced by `encode` and read back by `decode`. A scalable filter is a chain of
//! those plus a growth threshold, stored as a [`FilterStore`] and written with
//! `bincode`.
//!
//! # Feature Flag
//!
//! This module is only available when the `serde` feature is enabled (it is by
//! default):
//!
//! ```toml
//! [dependencies]
//! amqcraft = { version = "0.1", features = ["serde"] }
//! ```
//!
//! # Format
//!
//! ```text
//! FilterStore {
//!     blobs: [CuckooFilter::encode() bytes, oldest first],
//!     load_factor: f32,
//! }
//! ```
//!
//! The eviction RNG state, scale factor and hasher are not stored. Decoding restores
//! the defaults, or whatever a
//! [`ScalableCuckooFilterBuilder`](crate::builder::ScalableCuckooFilterBuilder) sets.
//!
//! # Examples
//!
//! ```
//! use amqcraft::ScalableCuckooFilter;
//! use amqcraft::serde_support::FilterStore;
//!
//! let mut filter = ScalableCuckooFilter::with_capacity(32);
//! filter.insert("hello");
//!
//! let store = FilterStore::from_filter(&filter);
//! assert_eq!(store.blobs.len(), 1);
//!
//! let bytes = store.to_bytes().unwrap();
//! let restored = FilterStore::from_bytes(&bytes).unwrap().into_default_filter().unwrap();
//! assert!(restored.lookup("hello"));
//! ```

pub mod store;

pub use store::FilterStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::FilterStore;
}
