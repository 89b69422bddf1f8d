//! Hash functions for filter keys.
//!
//! All filters reduce a key to one 64-bit value through a [`FilterHasher`]:
//!
//! | Hasher | Feature | Notes |
//! |--------|---------|-------|
//! | [`FnvHasher`] | always | Seeded FNV-1a, the default |
//! | `WyHasher` | `wyhash` (default) | Faster on longer keys |
//! | `XxHasher` | `xxhash` | XXH3 via `xxhash-rust` |
//!
//! The hasher is part of a filter's identity: encoded cuckoo filters must be decoded
//! with the hasher that filled them.
//!
//! # Examples
//!
//! ```
//! use amqcraft::hash::{DefaultHasher, FilterHasher};
//!
//! let hasher = DefaultHasher::default();
//! let h = hasher.hash_bytes(b"key");
//! assert_eq!(h, hasher.hash_bytes(b"key"));
//! ```

pub mod hasher;

#[cfg(feature = "wyhash")]
pub mod wyhash;

#[cfg(feature = "xxhash")]
pub mod xxhash;

pub use hasher::{FilterHasher, FnvHasher};

#[cfg(feature = "wyhash")]
pub use wyhash::WyHasher;

#[cfg(feature = "xxhash")]
pub use xxhash::XxHasher;

/// Hasher used by every filter unless another one is injected.
pub type DefaultHasher = FnvHasher;
