//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Bearer token verification and user/cart resolution
//! - `cart` - Cart line items with recomputed totals
//! - `checkout` - Order creation saga, owner edits, read policy
//! - `history` - Read-only purchase summaries
//!
//! Services borrow their collaborators from [`crate::state::AppState`] for the
//! duration of one request.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod history;
