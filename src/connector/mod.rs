//! Dialect-agnostic connector contract.
//!
//! A [`Connector`] owns one physical database handle and exposes collection
//! lifecycle and entry operations over it. Each SQL dialect provides one
//! implementation:
//!
//! - [`SqliteConnector`]: SQLite through rusqlite
//!
//! # Collection policy
//!
//! Writes (`upsert`, `upsert_batch`) create their target collection when it
//! does not exist. Reads and entry deletes against a missing collection fail
//! with `Error::CollectionNotFound`; `delete_collection` on a missing
//! collection succeeds without doing anything.
//!
//! # Batches
//!
//! `upsert_batch` and `delete_batch` are all-or-nothing: either every item is
//! applied or, on failure, none is.

pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::connection::ManagedConnection;
use crate::entry::Entry;
use crate::errors::Result;
use crate::handle::DatabaseHandle;

pub use sqlite::SqliteConnector;

/// Asynchronous collection and entry operations against one database.
///
/// Every failure of the underlying handle is reported as
/// `Error::ConnectorFailure`; driver errors never cross this boundary.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Short name of the SQL dialect, for diagnostics.
    fn dialect(&self) -> &'static str;

    /// Create the physical schema backing all collections. Idempotent.
    async fn create_table(&self) -> Result<()>;

    /// Create a collection. Succeeds if it already exists.
    async fn create_collection(&self, collection: &str) -> Result<()>;

    /// Whether the collection exists. Never mutates state.
    async fn collection_exists(&self, collection: &str) -> Result<bool>;

    /// Names of all collections; empty when there are none.
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Insert or replace one entry, returning its key.
    async fn upsert(
        &self,
        collection: &str,
        key: &str,
        metadata: &str,
        embedding: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<String>;

    /// Insert or replace several entries, returning their keys in input order.
    async fn upsert_batch(&self, collection: &str, entries: &[Entry]) -> Result<Vec<String>>;

    /// Every entry of the collection.
    async fn read_all(&self, collection: &str) -> Result<Vec<Entry>>;

    /// The entry stored under `key`, or `None`.
    async fn read(&self, collection: &str, key: &str) -> Result<Option<Entry>>;

    /// The entries for whichever of `keys` exist; missing keys are omitted.
    async fn read_batch(&self, collection: &str, keys: &[String]) -> Result<Vec<Entry>>;

    /// Remove a collection and all of its entries. Idempotent.
    async fn delete_collection(&self, collection: &str) -> Result<()>;

    /// Remove one entry. Deleting an absent key is not an error.
    async fn delete(&self, collection: &str, key: &str) -> Result<()>;

    /// Remove several entries. Absent keys are ignored.
    async fn delete_batch(&self, collection: &str, keys: &[String]) -> Result<()>;

    /// Remove the entries this connector considers empty.
    async fn delete_empty(&self, collection: &str) -> Result<()>;

    /// Release the database handle. Idempotent.
    fn close(&self) -> Result<()>;
}

/// Connectors that can be built around a managed handle.
pub trait FromConnection: Connector + Sized + 'static {
    /// Physical handle type this connector drives.
    type Handle: DatabaseHandle;

    fn from_connection(connection: ManagedConnection<Self::Handle>) -> Self;
}
