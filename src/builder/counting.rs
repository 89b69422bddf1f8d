//! Builder for d-left counting filters.
//!
//! ```text
//! Initial → Complete → CountingFilter
//!     ↓         ↓
//! .capacity() or .dimensions()  .build()
//! ```
//!
//! # Examples
//!
//! ```
//! use amqcraft::builder::CountingFilterBuilder;
//!
//! let mut filter = CountingFilterBuilder::new()
//!     .capacity(100_000)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(filter.num_tables(), 3);
//! assert!(filter.add("x"));
//! ```

use super::validation::{required, validate_capacity};
use super::{Complete, Initial};
use crate::core::params::{counting_tables_for_capacity, COUNTING_CAPACITY_BUCKETS};
use crate::error::Result;
use crate::filters::counting::CountingFilter;
use crate::hash::{DefaultHasher, FilterHasher};
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy)]
enum Sizing {
    Capacity(usize),
    Dimensions { tables: usize, buckets: usize },
}

/// Builder for [`CountingFilter`].
#[derive(Debug, Clone)]
pub struct CountingFilterBuilder<State, H = DefaultHasher> {
    sizing: Option<Sizing>,
    hasher: H,
    _state: PhantomData<State>,
}

impl CountingFilterBuilder<Initial, DefaultHasher> {
    /// Create a new counting filter builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sizing: None,
            hasher: DefaultHasher::default(),
            _state: PhantomData,
        }
    }
}

impl Default for CountingFilterBuilder<Initial, DefaultHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State, H> CountingFilterBuilder<State, H> {
    /// Use a custom hash function (optional).
    #[must_use]
    pub fn hasher<H2>(self, hasher: H2) -> CountingFilterBuilder<State, H2> {
        CountingFilterBuilder {
            sizing: self.sizing,
            hasher,
            _state: PhantomData,
        }
    }

    fn with_sizing(self, sizing: Sizing) -> CountingFilterBuilder<Complete, H> {
        CountingFilterBuilder {
            sizing: Some(sizing),
            hasher: self.hasher,
            _state: PhantomData,
        }
    }
}

impl<H> CountingFilterBuilder<Initial, H> {
    /// Size for about `capacity` keys, like [`CountingFilter::new_for_capacity`].
    #[must_use]
    pub fn capacity(self, capacity: usize) -> CountingFilterBuilder<Complete, H> {
        self.with_sizing(Sizing::Capacity(capacity))
    }

    /// Set the table and bucket counts directly.
    #[must_use]
    pub fn dimensions(self, tables: usize, buckets: usize) -> CountingFilterBuilder<Complete, H> {
        self.with_sizing(Sizing::Dimensions { tables, buckets })
    }
}

impl<H: FilterHasher> CountingFilterBuilder<Complete, H> {
    /// Build the counting filter.
    ///
    /// # Errors
    ///
    /// Returns error if `capacity == 0` or the dimensions are rejected by
    /// [`CountingFilter::new`].
    pub fn build(self) -> Result<CountingFilter<H>> {
        let (tables, buckets) = match required(self.sizing, "sizing")? {
            Sizing::Capacity(capacity) => {
                validate_capacity(capacity)?;
                (counting_tables_for_capacity(capacity), COUNTING_CAPACITY_BUCKETS)
            }
            Sizing::Dimensions { tables, buckets } => (tables, buckets),
        };
        CountingFilter::with_hasher(tables, buckets, self.hasher)
    }
}
