//! Builder for quotient filters.
//!
//! # Type-State Pattern
//!
//! A quotient filter is sized either from an expected key count and false positive
//! rate, or from explicit bit widths:
//!
//! ```text
//! Initial → WithCapacity → Complete → QuotientFilter
//!     ↓          ↓             ↓
//!  .capacity()  .false_positive_rate()  .build()
//!
//! Initial → Complete → QuotientFilter
//!     ↓         ↓
//!  .bits(q, r)  .build()
//! ```
//!
//! # Examples
//!
//! ## Sized for a workload
//!
//! ```
//! use amqcraft::builder::QuotientFilterBuilder;
//!
//! let filter = QuotientFilterBuilder::new()
//!     .capacity(1_000)
//!     .false_positive_rate(0.01)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(filter.quotient_bits(), 11);
//! assert_eq!(filter.remainder_bits(), 7);
//! ```
//!
//! ## Explicit layout with auto-doubling
//!
//! ```
//! use amqcraft::builder::QuotientFilterBuilder;
//!
//! let mut filter = QuotientFilterBuilder::new()
//!     .bits(4, 12)
//!     .auto_double(0.75)
//!     .build()
//!     .unwrap();
//!
//! for i in 0..100 {
//!     filter.add(&i.to_string()).unwrap();
//! }
//! assert!(filter.quotient_bits() > 4);
//! ```

use super::validation::{required, validate_capacity, validate_fp_rate, validate_load};
use super::{Complete, Initial, WithCapacity};
use crate::core::params::{quotient_bits_for_capacity, remainder_bits_for_probability};
use crate::error::Result;
use crate::filters::quotient::QuotientFilter;
use crate::hash::{DefaultHasher, FilterHasher};
use std::marker::PhantomData;

/// Builder for [`QuotientFilter`] with type-state guarantees.
///
/// # Type Parameters
///
/// - `State`: Current builder state ([`Initial`], [`WithCapacity`], [`Complete`])
/// - `H`: Hash function type (defaults to [`DefaultHasher`])
#[derive(Debug, Clone)]
pub struct QuotientFilterBuilder<State, H = DefaultHasher> {
    capacity: Option<usize>,
    fp_rate: Option<f64>,
    bits: Option<(u32, u32)>,
    value_storage: bool,
    auto_double: Option<f64>,
    hasher: H,
    _state: PhantomData<State>,
}

impl QuotientFilterBuilder<Initial, DefaultHasher> {
    /// Create a new quotient filter builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capacity: None,
            fp_rate: None,
            bits: None,
            value_storage: false,
            auto_double: None,
            hasher: DefaultHasher::default(),
            _state: PhantomData,
        }
    }
}

impl Default for QuotientFilterBuilder<Initial, DefaultHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State, H> QuotientFilterBuilder<State, H> {
    fn into_state<Next>(self) -> QuotientFilterBuilder<Next, H> {
        QuotientFilterBuilder {
            capacity: self.capacity,
            fp_rate: self.fp_rate,
            bits: self.bits,
            value_storage: self.value_storage,
            auto_double: self.auto_double,
            hasher: self.hasher,
            _state: PhantomData,
        }
    }

    /// Store a `u64` value with every key (optional, off by default).
    #[must_use]
    pub fn value_storage(mut self, enabled: bool) -> Self {
        self.value_storage = enabled;
        self
    }

    /// Double the filter once it is `load` full (optional, off by default).
    ///
    /// Validated by `build`, which rejects values outside (0, 1].
    #[must_use]
    pub fn auto_double(mut self, load: f64) -> Self {
        self.auto_double = Some(load);
        self
    }

    /// Use a custom hash function (optional).
    #[must_use]
    pub fn hasher<H2>(self, hasher: H2) -> QuotientFilterBuilder<State, H2> {
        QuotientFilterBuilder {
            capacity: self.capacity,
            fp_rate: self.fp_rate,
            bits: self.bits,
            value_storage: self.value_storage,
            auto_double: self.auto_double,
            hasher,
            _state: PhantomData,
        }
    }
}

impl<H> QuotientFilterBuilder<Initial, H> {
    /// Set the expected number of keys.
    ///
    /// The filter gets twice as many slots, rounded up to a power of two.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> QuotientFilterBuilder<WithCapacity, H> {
        self.capacity = Some(capacity);
        self.into_state()
    }

    /// Set the quotient and remainder widths directly.
    #[must_use]
    pub fn bits(mut self, q_bits: u32, r_bits: u32) -> QuotientFilterBuilder<Complete, H> {
        self.bits = Some((q_bits, r_bits));
        self.into_state()
    }
}

impl<H> QuotientFilterBuilder<WithCapacity, H> {
    /// Set the target false positive rate.
    #[must_use]
    pub fn false_positive_rate(mut self, fp_rate: f64) -> QuotientFilterBuilder<Complete, H> {
        self.fp_rate = Some(fp_rate);
        self.into_state()
    }
}

impl<H: FilterHasher> QuotientFilterBuilder<Complete, H> {
    /// Build the quotient filter.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `capacity == 0`
    /// - `fp_rate` not in (0, 1)
    /// - the bit widths are invalid (see [`QuotientFilter::new`])
    /// - the auto-double load is not in (0, 1]
    pub fn build(self) -> Result<QuotientFilter<H>> {
        let (q_bits, r_bits) = match self.bits {
            Some(bits) => bits,
            None => {
                let capacity = required(self.capacity, "capacity")?;
                let fp_rate = required(self.fp_rate, "fp_rate")?;
                validate_capacity(capacity)?;
                validate_fp_rate(fp_rate)?;
                (
                    quotient_bits_for_capacity(capacity)?,
                    remainder_bits_for_probability(fp_rate)?,
                )
            }
        };
        if let Some(load) = self.auto_double {
            validate_load(load)?;
        }

        let mut filter = QuotientFilter::with_hasher(q_bits, r_bits, self.hasher)?;
        if self.value_storage {
            filter = filter.with_value_storage();
        }
        filter.set_max_load_factor(self.auto_double)?;
        Ok(filter)
    }
}
