//! Core memory store struct wrapping a connector.

use std::sync::Arc;

use crate::config::{self, Config};
use crate::connector::Connector;
use crate::errors::{Error, Result};

use super::builder::SqliteMemoryStoreBuilder;

/// Collection-oriented store of memory entries.
///
/// Holds nothing but the connector it forwards to. Every operation taking a
/// collection name rejects empty or whitespace-only names with
/// `Error::InvalidArgument` before the connector is reached.
pub struct MemoryStore {
    pub(crate) connector: Arc<dyn Connector>,
}

impl MemoryStore {
    /// Wrap an existing connector.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        MemoryStore { connector }
    }

    /// Open the SQLite database described by `config` and prepare its schema.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The database cannot be opened or configured (`Error::Config`)
    /// - Schema creation fails (`Error::ConnectorFailure`)
    pub async fn connect_sqlite(config: &Config) -> Result<Self> {
        let config = config.clone();
        let conn = tokio::task::spawn_blocking(move || config::open_sqlite(&config))
            .await
            .map_err(|e| Error::connector("Opening SQLite database failed", e))??;

        let store = SqliteMemoryStoreBuilder::new()
            .with_connection(conn)
            .build()
            .await?;
        store.create_table().await?;
        Ok(store)
    }

    /// The connector this store forwards to.
    pub fn connector(&self) -> &dyn Connector {
        self.connector.as_ref()
    }

    /// Release the underlying database handle. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConnectorFailure` if the handle fails to close.
    pub fn close(&self) -> Result<()> {
        self.connector.close()
    }

    /// Reject empty and whitespace-only collection names.
    pub(crate) fn validate_collection_name(collection: &str) -> Result<()> {
        if collection.trim().is_empty() {
            return Err(Error::invalid_argument(
                "Collection name cannot be empty or whitespace",
            ));
        }
        Ok(())
    }

    /// Reject empty and whitespace-only entry keys.
    pub(crate) fn validate_key(key: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(Error::invalid_argument(
                "Entry key cannot be empty or whitespace",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("dialect", &self.connector.dialect())
            .finish()
    }
}
