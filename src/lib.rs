//! sqlmem - Collection-oriented storage of memory entries in SQL databases.
//!
//! Entries (a key, opaque metadata text, a serialized embedding and a
//! timestamp) are grouped into named collections. A [`MemoryStore`] validates
//! input and forwards to a dialect-specific [`Connector`], which owns exactly
//! one physical database handle through a [`ManagedConnection`].
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use sqlmem::{Entry, SqliteMemoryStoreBuilder};
//!
//! # async fn run() -> sqlmem::Result<()> {
//! let conn = rusqlite::Connection::open_in_memory().expect("open database");
//! let store = SqliteMemoryStoreBuilder::new()
//!     .with_connection(conn)
//!     .build()
//!     .await?;
//! store.create_table().await?;
//!
//! store
//!     .upsert("notes", "alice", r#"{"team":"core"}"#, "[0.1,0.2]", Utc::now())
//!     .await?;
//! let batch = vec![Entry::new("bob", "{}", "[]", Utc::now())];
//! store.upsert_batch("notes", &batch).await?;
//!
//! for entry in store.read_all("notes").await? {
//!     println!("{}: {}", entry.key, entry.metadata);
//! }
//! store.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! All operations are `async` and take `&self`. The SQLite connector runs
//! statements on tokio's blocking pool and serializes access to its handle,
//! so a store can be shared between tasks behind an `Arc`.

pub mod config;
pub mod connection;
pub mod connector;
pub mod entry;
pub mod errors;
pub mod handle;
pub mod memory;

// Re-export public API
pub use config::{Config, JournalMode, open_sqlite};
pub use connection::ManagedConnection;
pub use connector::{Connector, FromConnection, SqliteConnector};
pub use entry::Entry;
pub use errors::{Error, ErrorCode, ErrorKind, Result};
pub use handle::DatabaseHandle;
pub use memory::{MemoryStore, MemoryStoreBuilder, SqliteMemoryStoreBuilder};
