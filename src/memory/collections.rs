//! Collection lifecycle operations for the memory store.

use crate::errors::Result;

use super::store::MemoryStore;

impl MemoryStore {
    /// Create the schema backing all collections. Idempotent.
    pub async fn create_table(&self) -> Result<()> {
        self.connector.create_table().await
    }

    /// Create a collection; creating an existing one succeeds.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for an empty or whitespace-only name.
    pub async fn create_collection(&self, collection: &str) -> Result<()> {
        Self::validate_collection_name(collection)?;
        self.connector.create_collection(collection).await
    }

    /// Whether a collection exists.
    pub async fn collection_exists(&self, collection: &str) -> Result<bool> {
        Self::validate_collection_name(collection)?;
        self.connector.collection_exists(collection).await
    }

    /// Names of every collection.
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        self.connector.list_collections().await
    }

    /// Delete a collection and its entries; deleting a missing one succeeds.
    pub async fn delete_collection(&self, collection: &str) -> Result<()> {
        Self::validate_collection_name(collection)?;
        self.connector.delete_collection(collection).await
    }
}
