//! Inventory domain module.
//!
//! This crate contains the business rules for articles and their available
//! stock, implemented purely as deterministic domain logic (no IO, no HTTP,
//! no storage).

pub mod article;

pub use article::{Article, Decrement};
