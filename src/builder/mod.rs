//! Builder pattern for filter construction.
//!
//! This module provides fluent, type-safe builders for every filter in the crate, with
//! compile-time guarantees that required parameters are provided.
//!
//! # Design Philosophy
//!
//! ## Type-State Pattern
//!
//! Builders with required parameters move through marker states, and `build` only
//! exists on the final one. Optional parameters (hasher, seed, growth settings) can be
//! set in any state.
//!
//! ## Error Handling
//!
//! - **Compile-time errors**: Missing required parameters
//! - **Runtime errors**: Invalid parameter values (out of range)
//!
//! # Examples
//!
//! ## Quotient Filter Builder
//!
//! ```
//! use amqcraft::builder::QuotientFilterBuilder;
//!
//! let filter = QuotientFilterBuilder::new()
//!     .capacity(10_000)
//!     .false_positive_rate(0.001)
//!     .value_storage(true)
//!     .build()
//!     .unwrap();
//! assert!(filter.has_value_storage());
//! ```
//!
//! ## Cuckoo Filter Builder
//!
//! ```
//! use amqcraft::builder::CuckooFilterBuilder;
//!
//! let filter = CuckooFilterBuilder::new()
//!     .capacity(4096)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! assert_eq!(filter.bucket_count(), 1024);
//! ```
//!
//! ## Scalable Cuckoo Filter Builder
//!
//! ```
//! use amqcraft::builder::ScalableCuckooFilterBuilder;
//!
//! let filter = ScalableCuckooFilterBuilder::new()
//!     .initial_capacity(1_000)
//!     .load_factor(0.8)
//!     .build()
//!     .unwrap();
//! assert_eq!(filter.filter_count(), 1);
//! ```
//!
//! ## Counting Filter Builder
//!
//! ```
//! use amqcraft::builder::CountingFilterBuilder;
//!
//! let filter = CountingFilterBuilder::new()
//!     .dimensions(4, 1024)
//!     .build()
//!     .unwrap();
//! assert_eq!(filter.num_tables(), 4);
//! ```
//!
//! # Builder Comparison
//!
//! | Builder | Required Parameters | Key Optional Parameters |
//! |---------|---------------------|-------------------------|
//! | Quotient | capacity + fp_rate, or bits | value_storage, auto_double, hasher |
//! | Cuckoo | capacity | seed, hasher |
//! | Scalable cuckoo | none | initial_capacity, load_factor, scale_factor, seed, hasher |
//! | Counting | capacity, or dimensions | hasher |

#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod counting;
pub mod cuckoo;
pub mod quotient;
pub mod scalable_cuckoo;

pub use counting::CountingFilterBuilder;
pub use cuckoo::CuckooFilterBuilder;
pub use quotient::QuotientFilterBuilder;
pub use scalable_cuckoo::ScalableCuckooFilterBuilder;

use crate::error::{AmqCraftError, Result};

/// Type-state marker: no required parameter set yet.
#[derive(Debug, Clone, Copy)]
pub struct Initial;

/// Type-state marker: capacity set, false positive rate still missing.
#[derive(Debug, Clone, Copy)]
pub struct WithCapacity;

/// Type-state marker: all required parameters set.
#[derive(Debug, Clone, Copy)]
pub struct Complete;

/// Common validation functions for all builders.
mod validation {
    use super::*;

    /// Validate an expected key count.
    ///
    /// # Errors
    ///
    /// Returns error if `capacity == 0`.
    #[inline]
    pub fn validate_capacity(capacity: usize) -> Result<()> {
        if capacity == 0 {
            return Err(AmqCraftError::invalid_capacity(capacity));
        }
        Ok(())
    }

    /// Validate a false positive rate.
    ///
    /// # Errors
    ///
    /// Returns error if `fp_rate` is not in (0, 1).
    #[inline]
    pub fn validate_fp_rate(fp_rate: f64) -> Result<()> {
        if !(fp_rate > 0.0 && fp_rate < 1.0) {
            return Err(AmqCraftError::fp_rate_out_of_bounds(fp_rate));
        }
        Ok(())
    }

    /// Validate a load threshold.
    ///
    /// # Errors
    ///
    /// Returns error if `load` is not in (0, 1].
    #[inline]
    pub fn validate_load(load: f64) -> Result<()> {
        if !(load > 0.0 && load <= 1.0) {
            return Err(AmqCraftError::invalid_parameters(format!(
                "load factor must be in (0, 1], got {}",
                load
            )));
        }
        Ok(())
    }

    /// Unwrap a parameter the type state guarantees is present.
    #[inline]
    pub fn required<T>(value: Option<T>, name: &str) -> Result<T> {
        value.ok_or_else(|| AmqCraftError::internal_error(format!("{} must be set", name)))
    }
}

/// Prelude for convenient builder imports.
pub mod prelude {
    pub use super::{
        CountingFilterBuilder,
        CuckooFilterBuilder,
        QuotientFilterBuilder,
        ScalableCuckooFilterBuilder,
    };
}
