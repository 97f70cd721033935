//! Persistence boundary for the shop.
//!
//! This module defines the storage abstraction the placement workflow and the
//! listing endpoints talk through, without making any storage assumptions.
//! The persisted article/client/order tables are the only shared mutable
//! resource in the system; every mutation goes through a [`PlacementUow`].

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{OrderSummary, PlacementUow, ShopStore, StoreError};
