//! Clients domain module.
//!
//! Clients are read-only from the core's perspective: the placement workflow
//! references them, it never mutates them.

pub mod client;

pub use client::Client;
