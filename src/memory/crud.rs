//! Entry operations for the memory store.

use chrono::{DateTime, Utc};

use crate::entry::{Entry, validate_timestamp};
use crate::errors::Result;

use super::store::MemoryStore;

impl MemoryStore {
    #[must_use = "handle the error or results may be lost"]
    /// Insert or replace one entry.
    ///
    /// Creates the collection if it does not exist yet.
    ///
    /// # Returns
    ///
    /// The key of the stored entry.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The collection name or key is empty or whitespace-only
    /// - The timestamp year is outside 0000-9999
    /// - The database write fails
    pub async fn upsert(
        &self,
        collection: &str,
        key: &str,
        metadata: &str,
        embedding: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<String> {
        Self::validate_collection_name(collection)?;
        Self::validate_key(key)?;
        validate_timestamp(&timestamp)?;
        self.connector
            .upsert(collection, key, metadata, embedding, timestamp)
            .await
    }

    #[must_use = "handle the error or results may be lost"]
    /// Insert or replace a batch of entries as one unit.
    ///
    /// Either every entry is written or none is. The returned keys match the
    /// input one-to-one, in order.
    pub async fn upsert_batch(&self, collection: &str, entries: &[Entry]) -> Result<Vec<String>> {
        Self::validate_collection_name(collection)?;
        for entry in entries {
            Self::validate_key(&entry.key)?;
            validate_timestamp(&entry.timestamp)?;
        }
        self.connector.upsert_batch(collection, entries).await
    }

    #[must_use = "handle the error or results may be lost"]
    /// Read every entry of a collection.
    ///
    /// # Errors
    ///
    /// Returns `Error::CollectionNotFound` if the collection does not exist.
    pub async fn read_all(&self, collection: &str) -> Result<Vec<Entry>> {
        Self::validate_collection_name(collection)?;
        self.connector.read_all(collection).await
    }

    #[must_use = "handle the error or results may be lost"]
    /// Read one entry.
    ///
    /// Returns `None` if the key doesn't exist.
    pub async fn read(&self, collection: &str, key: &str) -> Result<Option<Entry>> {
        Self::validate_collection_name(collection)?;
        self.connector.read(collection, key).await
    }

    #[must_use = "handle the error or results may be lost"]
    /// Read the entries for whichever of `keys` exist.
    pub async fn read_batch(&self, collection: &str, keys: &[String]) -> Result<Vec<Entry>> {
        Self::validate_collection_name(collection)?;
        self.connector.read_batch(collection, keys).await
    }

    /// Delete one entry; a missing key is not an error.
    pub async fn delete(&self, collection: &str, key: &str) -> Result<()> {
        Self::validate_collection_name(collection)?;
        self.connector.delete(collection, key).await
    }

    /// Delete a batch of entries as one unit.
    pub async fn delete_batch(&self, collection: &str, keys: &[String]) -> Result<()> {
        Self::validate_collection_name(collection)?;
        self.connector.delete_batch(collection, keys).await
    }

    /// Delete the entries the connector considers empty.
    pub async fn delete_empty(&self, collection: &str) -> Result<()> {
        Self::validate_collection_name(collection)?;
        self.connector.delete_empty(collection).await
    }
}
