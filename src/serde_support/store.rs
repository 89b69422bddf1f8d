//! Serialized form of a scalable cuckoo filter chain.

use crate::error::Result;
use crate::filters::cuckoo::DEFAULT_SEED;
use crate::filters::scalable_cuckoo::{default_scale_factor, ScalableCuckooFilter, ScaleFactor};
use crate::hash::{DefaultHasher, FilterHasher};
use serde::{Deserialize, Serialize};

/// Sub-filter bytes and growth threshold of a [`ScalableCuckooFilter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterStore {
    /// [`CuckooFilter::encode`](crate::CuckooFilter::encode) output per filter, oldest
    /// first
    pub blobs: Vec<Vec<u8>>,

    /// Growth threshold
    pub load_factor: f32,
}

impl FilterStore {
    /// Capture the chain of `filter`.
    #[must_use]
    pub fn from_filter<H>(filter: &ScalableCuckooFilter<H>) -> Self
    where
        H: FilterHasher + Clone,
    {
        Self {
            blobs: filter.encode_filters(),
            load_factor: filter.load_factor(),
        }
    }

    /// Serialize with bincode.
    ///
    /// # Errors
    ///
    /// Returns [`AmqCraftError::SerializationError`](crate::AmqCraftError::SerializationError)
    /// if bincode fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize from bincode bytes.
    ///
    /// Only the encoding is checked here. The contents are validated by
    /// [`into_filter`](Self::into_filter).
    ///
    /// # Errors
    ///
    /// Returns [`AmqCraftError::SerializationError`](crate::AmqCraftError::SerializationError)
    /// if the bytes are not a bincode `FilterStore`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Rebuild the filter chain.
    ///
    /// # Errors
    ///
    /// Returns [`AmqCraftError::Decode`](crate::AmqCraftError::Decode) if there are no
    /// blobs, the load factor is outside `(0, 1]`, or a blob is not a valid cuckoo
    /// filter.
    pub fn into_filter<H>(
        self,
        scale_factor: ScaleFactor,
        seed: u64,
        hasher: H,
    ) -> Result<ScalableCuckooFilter<H>>
    where
        H: FilterHasher + Clone,
    {
        ScalableCuckooFilter::from_blobs(&self.blobs, self.load_factor, scale_factor, seed, hasher)
    }

    /// Rebuild the chain with the default scale factor, seed and hasher.
    ///
    /// # Errors
    ///
    /// Same as [`into_filter`](Self::into_filter).
    pub fn into_default_filter(self) -> Result<ScalableCuckooFilter<DefaultHasher>> {
        self.into_filter(default_scale_factor, DEFAULT_SEED, DefaultHasher::default())
    }
}
