//! Memory store façade over a connector.
//!
//! Provides the application-facing API for collection management and entry
//! operations, adding the input validation connectors do not enforce.

mod builder;
mod collections;
mod crud;

// pub(crate): module internals hidden; public items re-exported explicitly via lib.rs
pub(crate) mod store;

pub use builder::{CONNECTION_NOT_SET, MemoryStoreBuilder, SqliteMemoryStoreBuilder};
pub use store::MemoryStore;

#[cfg(test)]
mod tests;
