//! Farm Fresh marketplace REST backend.
//!
//! Buyers browse a produce catalog, keep a per-user cart, place checkouts
//! with an uploaded payment receipt, and read a public checkout history.
//!
//! The crate is a library so the router can be driven in tests against the
//! in-memory document and blob stores; `main.rs` wires the production
//! backends.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;

pub use routes::app;
pub use state::AppState;
