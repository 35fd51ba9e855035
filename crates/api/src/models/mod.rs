//! Domain models for the marketplace API.
//!
//! Each collection has a `*Record` type matching the stored document shape
//! (camelCase JSON, no key) and a domain type carrying the document key.
//! Response bodies serialize the domain types directly.

pub mod cart;
pub mod checkout;
pub mod farm;
pub mod history;
pub mod product;
pub mod user;

pub use cart::{CartItem, CartItemRecord, CartLine, CartSummary};
pub use checkout::{Checkout, CheckoutRecord, CustomerInfo, ShippingInfo};
pub use farm::{Farm, FarmRecord};
pub use history::HistoryEntry;
pub use product::{Product, ProductRecord};
pub use user::{User, UserRecord};
