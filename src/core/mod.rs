//! Core types, traits, and sizing math shared by all filters.
//!
//! - **Traits**: [`AmqFilter`], [`DeletableFilter`]
//! - **Data Structures**: [`PackedSlots`] (fixed-width slots packed into words)
//! - **Utilities**: parameter calculation in [`params`]
//!
//! # Module Organization
//!
//! ```text
//! core/
//! ├── filter.rs    - Trait definitions
//! ├── slots.rs     - Packed slot storage
//! ├── params.rs    - Sizing formulas and limits
//! └── mod.rs       - This file (public API)
//! ```

pub mod filter;
pub mod params;
pub mod slots;

pub use filter::{AmqFilter, DeletableFilter};
pub use slots::PackedSlots;
