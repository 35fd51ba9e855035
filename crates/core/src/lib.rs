//! Farm Fresh Core - Shared types library.
//!
//! This crate provides common types used across all Farm Fresh components:
//! - `api` - The marketplace REST backend (carts, checkout, history)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for document IDs, rupiah amounts, and quantities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
