//! Error types for amqcraft operations.
//!
//! Construction errors, capacity exhaustion and decode failures are all reported
//! through [`AmqCraftError`]. Decoding has its own [`DecodeError`] so callers can tell
//! a truncated buffer apart from a misconfigured filter.
//!
//! # Error Propagation
//!
//! ```
//! use amqcraft::{Result, AmqCraftError};
//! use amqcraft::core::params::{quotient_bits_for_capacity, remainder_bits_for_probability};
//!
//! fn sizing(capacity: usize, p: f64) -> Result<(u32, u32)> {
//!     let q = quotient_bits_for_capacity(capacity)?;
//!     let r = remainder_bits_for_probability(p)?;
//!     Ok((q, r))
//! }
//! # assert!(sizing(1000, 0.01).is_ok());
//! ```

#![allow(clippy::module_name_repetitions)]

use std::fmt;

/// Result type alias for amqcraft operations.
///
/// # Examples
/// ```
/// use amqcraft::Result;
///
/// fn validate(capacity: usize) -> Result<()> {
///     if capacity == 0 {
///         return Err(amqcraft::AmqCraftError::invalid_capacity(capacity));
///     }
///     Ok(())
/// }
/// # assert!(validate(10).is_ok());
/// ```
pub type Result<T> = std::result::Result<T, AmqCraftError>;

/// Errors that can occur while building, filling or decoding a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum AmqCraftError {
    /// Filter parameters do not describe a usable filter.
    InvalidParameters {
        /// Human-readable description of what's invalid.
        message: String,
    },

    /// False positive probability outside the open interval (0, 1).
    FalsePositiveRateOutOfBounds {
        /// The rejected probability.
        fp_rate: f64,
    },

    /// Requested capacity is zero or otherwise unusable.
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },

    /// Quotient and remainder bits together exceed the hash width.
    ///
    /// This is a construction-time failure; no filter is produced.
    BitWidthExceeded {
        /// Quotient bits requested.
        q_bits: u32,
        /// Remainder bits requested.
        r_bits: u32,
        /// Largest permitted `q_bits + r_bits`.
        max: u32,
    },

    /// The filter holds as many elements as it can.
    ///
    /// Distinct from inserting a key that is already present, which is not an error.
    Full {
        /// Number of elements the filter can hold.
        capacity: usize,
    },

    /// Operation is not available on this filter or configuration.
    UnsupportedOperation {
        /// Name of the operation attempted.
        operation: String,
        /// Name of the filter variant.
        variant: String,
    },

    /// Backing storage would not be addressable.
    InvalidFilterSize {
        /// Requested size in bits.
        size: u128,
    },

    /// Encoded filter bytes were rejected.
    Decode {
        /// What was wrong with the input.
        source: DecodeError,
    },

    /// Serialization or deserialization through serde failed.
    #[cfg(feature = "serde")]
    SerializationError {
        /// Description of what failed.
        message: String,
    },

    /// Internal invariant violated.
    ///
    /// Indicates a bug in amqcraft itself.
    InternalError {
        /// Description of the invariant that was violated.
        message: String,
    },
}

/// Reasons an encoded filter cannot be reconstructed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The input buffer has no bytes.
    #[error("encoded filter is empty")]
    Empty,

    /// The input length does not split into whole buckets.
    #[error("expected length to be a multiple of {bucket_size}, got {len}")]
    LengthNotMultiple {
        /// Length of the rejected buffer.
        len: usize,
        /// Slots per bucket.
        bucket_size: usize,
    },

    /// Bucket count cannot be addressed with an index mask.
    #[error("bucket count {buckets} is not a power of two")]
    BucketCountNotPowerOfTwo {
        /// Number of buckets found in the input.
        buckets: usize,
    },

    /// A scalable filter encoding contained no sub-filters.
    #[error("encoded filter chain contains no filters")]
    EmptyChain,

    /// A scalable filter encoding carried an unusable load factor.
    #[error("load factor {value} must be in (0, 1]")]
    InvalidLoadFactor {
        /// The rejected load factor.
        value: f32,
    },
}

impl fmt::Display for AmqCraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters { message } => {
                write!(f, "Invalid filter parameters: {}.", message)
            }
            Self::FalsePositiveRateOutOfBounds { fp_rate } => {
                write!(
                    f,
                    "False positive probability {} is out of bounds. Must be in range (0, 1).",
                    fp_rate
                )
            }
            Self::InvalidCapacity { capacity } => {
                write!(
                    f,
                    "Invalid capacity: {}. Capacity must be greater than 0.",
                    capacity
                )
            }
            Self::BitWidthExceeded { q_bits, r_bits, max } => {
                write!(
                    f,
                    "Quotient bits ({}) plus remainder bits ({}) exceed the {}-bit limit.",
                    q_bits, r_bits, max
                )
            }
            Self::Full { capacity } => {
                write!(f, "Filter is at its max capacity of {} elements.", capacity)
            }
            Self::UnsupportedOperation { operation, variant } => {
                write!(
                    f,
                    "Operation '{}' is not supported by {}.",
                    operation, variant
                )
            }
            Self::InvalidFilterSize { size } => {
                write!(
                    f,
                    "Invalid filter size: {} bits. Must be positive and within memory limits.",
                    size
                )
            }
            Self::Decode { source } => write!(f, "Failed to decode filter: {}.", source),
            #[cfg(feature = "serde")]
            Self::SerializationError { message } => {
                write!(f, "Serialization error: {}.", message)
            }
            Self::InternalError { message } => {
                write!(
                    f,
                    "Internal error (this is a bug in amqcraft): {}.",
                    message
                )
            }
        }
    }
}

impl std::error::Error for AmqCraftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode { source } => Some(source),
            _ => None,
        }
    }
}

impl From<DecodeError> for AmqCraftError {
    fn from(source: DecodeError) -> Self {
        Self::Decode { source }
    }
}

#[cfg(feature = "serde")]
impl From<bincode::Error> for AmqCraftError {
    fn from(err: bincode::Error) -> Self {
        Self::serialization_error(err.to_string())
    }
}

impl AmqCraftError {
    /// Create an `InvalidParameters` error with a formatted message.
    ///
    /// # Examples
    /// ```
    /// use amqcraft::AmqCraftError;
    ///
    /// let err = AmqCraftError::invalid_parameters(
    ///     format!("r_bits={} leaves no room to double", 1)
    /// );
    /// ```
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create a `FalsePositiveRateOutOfBounds` error.
    #[must_use]
    pub fn fp_rate_out_of_bounds(fp_rate: f64) -> Self {
        Self::FalsePositiveRateOutOfBounds { fp_rate }
    }

    /// Create an `InvalidCapacity` error.
    #[must_use]
    pub fn invalid_capacity(capacity: usize) -> Self {
        Self::InvalidCapacity { capacity }
    }

    /// Create a `BitWidthExceeded` error.
    #[must_use]
    pub fn bit_width_exceeded(q_bits: u32, r_bits: u32, max: u32) -> Self {
        Self::BitWidthExceeded { q_bits, r_bits, max }
    }

    /// Create a `Full` error.
    #[must_use]
    pub fn full(capacity: usize) -> Self {
        Self::Full { capacity }
    }

    /// Create an `UnsupportedOperation` error.
    #[must_use]
    pub fn unsupported_operation(operation: impl Into<String>, variant: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            variant: variant.into(),
        }
    }

    /// Create an `InvalidFilterSize` error.
    #[must_use]
    pub fn invalid_filter_size(size: u128) -> Self {
        Self::InvalidFilterSize { size }
    }

    /// Create a `SerializationError`.
    #[cfg(feature = "serde")]
    #[must_use]
    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create an `InternalError`.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Returns `true` if this error reports an exhausted filter.
    #[must_use]
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full { .. })
    }
}
