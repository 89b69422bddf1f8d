//! Internal utility functions and helpers.
//!
//! # Modules
//!
//! - [`bitops`] - Bit manipulation helpers used for sizing and slot addressing

pub mod bitops;

pub use bitops::{ceil_log2, is_power_of_two, low_mask, next_power_of_two};
