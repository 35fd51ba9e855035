//! Core types for Farm Fresh.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod quantity;

pub use id::*;
pub use money::{CURRENCY_PREFIX, CurrencyError, Rupiah};
pub use quantity::{Quantity, QuantityError};
