//! Core types and pure logic for the campus review client.
//!
//! This crate is deliberately free of HTTP and database dependencies. It holds
//! the entity/review data model, the static per-type catalog, the aggregation
//! and directory-query functions, and the traits the outer crates implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod backend;
pub mod catalog;
pub mod clock;
pub mod detail;
pub mod entity;
pub mod error;
pub mod query;
pub mod review;
pub mod snapshot;

pub use error::{Error, Result};
