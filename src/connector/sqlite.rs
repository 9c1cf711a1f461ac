//! SQLite connector.
//!
//! Collections live in `memory_collections`; entries of every collection
//! share `memory_entries`, keyed by `(collection, key)`. Timestamps are
//! stored as RFC 3339 text.
//!
//! An entry is *empty* (see [`Connector::delete_empty`]) when its trimmed
//! metadata is `""`, `"null"` or `"{}"` and its trimmed embedding is `""`,
//! `"null"` or `"[]"`.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{Connector, FromConnection};
use crate::connection::ManagedConnection;
use crate::entry::{Entry, validate_timestamp};
use crate::errors::{Error, Result};

/// Schema shared by all collections.
pub(crate) const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS memory_collections (
        name TEXT PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS memory_entries (
        collection TEXT NOT NULL,
        key TEXT NOT NULL,
        metadata TEXT NOT NULL,
        embedding TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        PRIMARY KEY (collection, key)
    );
"#;

const INSERT_COLLECTION: &str = "INSERT OR IGNORE INTO memory_collections (name) VALUES (?1)";

const UPSERT_ENTRY: &str = r#"
    INSERT INTO memory_entries (collection, key, metadata, embedding, timestamp)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT (collection, key) DO UPDATE SET
        metadata = excluded.metadata,
        embedding = excluded.embedding,
        timestamp = excluded.timestamp
"#;

const SELECT_ENTRY: &str = r#"
    SELECT key, metadata, embedding, timestamp
    FROM memory_entries
    WHERE collection = ?1 AND key = ?2
"#;

const DELETE_ENTRY: &str = "DELETE FROM memory_entries WHERE collection = ?1 AND key = ?2";

/// Map a rusqlite error onto the connector failure for `operation`.
fn sql_error(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> Error {
    move |err| Error::connector(format!("SQLite {operation} failed"), err)
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<Entry> {
    let raw: String = row.get(3)?;
    let timestamp = DateTime::parse_from_rfc3339(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);
    Ok(Entry {
        key: row.get(0)?,
        metadata: row.get(1)?,
        embedding: row.get(2)?,
        timestamp,
    })
}

fn collection_exists(conn: &Connection, collection: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM memory_collections WHERE name = ?1)",
        [collection],
        |row| row.get(0),
    )
    .map_err(sql_error("collection lookup"))
}

fn ensure_collection(conn: &Connection, collection: &str) -> Result<()> {
    if collection_exists(conn, collection)? {
        Ok(())
    } else {
        Err(Error::CollectionNotFound(collection.to_string()))
    }
}

/// Write entries inside one transaction, creating the collection if needed.
fn write_entries(conn: &mut Connection, collection: &str, entries: &[Entry]) -> Result<()> {
    let tx = conn.transaction().map_err(sql_error("upsert"))?;
    tx.execute(INSERT_COLLECTION, [collection])
        .map_err(sql_error("upsert"))?;
    {
        let mut stmt = tx.prepare_cached(UPSERT_ENTRY).map_err(sql_error("upsert"))?;
        for entry in entries {
            stmt.execute(params![
                collection,
                &entry.key,
                &entry.metadata,
                &entry.embedding,
                format_timestamp(&entry.timestamp),
            ])
            .map_err(sql_error("upsert"))?;
        }
    }
    tx.commit().map_err(sql_error("upsert"))
}

/// SQLite implementation of [`Connector`].
///
/// Every operation runs on the blocking thread pool with exclusive access to
/// the connection, so concurrent callers are serialized.
#[derive(Debug)]
pub struct SqliteConnector {
    conn: Arc<ManagedConnection<Connection>>,
}

impl SqliteConnector {
    /// Wrap an open SQLite connection.
    pub fn new(conn: Connection) -> Self {
        Self::from_connection(ManagedConnection::new(conn))
    }

    /// Wrap a connection that may be absent.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `conn` is `None`.
    pub fn from_optional(conn: Option<Connection>) -> Result<Self> {
        ManagedConnection::from_optional(conn).map(Self::from_connection)
    }

    /// Whether the underlying connection has been released.
    pub fn is_closed(&self) -> bool {
        self.conn.is_closed()
    }

    /// Run `op` against the connection without blocking the async caller.
    async fn run<R, F>(&self, operation: &'static str, op: F) -> Result<R>
    where
        F: FnOnce(&mut Connection) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || conn.with_handle(op))
            .await
            .map_err(|e| Error::connector(format!("SQLite {operation} task failed"), e))?
    }
}

impl FromConnection for SqliteConnector {
    type Handle = Connection;

    fn from_connection(connection: ManagedConnection<Connection>) -> Self {
        SqliteConnector {
            conn: Arc::new(connection),
        }
    }
}

#[async_trait]
impl Connector for SqliteConnector {
    fn dialect(&self) -> &'static str {
        "sqlite"
    }

    async fn create_table(&self) -> Result<()> {
        self.run("create table", |conn| {
            conn.execute_batch(SCHEMA)
                .map_err(sql_error("create table"))
        })
        .await?;
        tracing::debug!("memory tables ready");
        Ok(())
    }

    async fn create_collection(&self, collection: &str) -> Result<()> {
        let name = collection.to_string();
        let created = self
            .run("create collection", move |conn| {
                conn.execute(INSERT_COLLECTION, [&name])
                    .map_err(sql_error("create collection"))
            })
            .await?;
        tracing::debug!(collection, created = (created > 0), "create collection");
        Ok(())
    }

    async fn collection_exists(&self, collection: &str) -> Result<bool> {
        let name = collection.to_string();
        self.run("collection lookup", move |conn| collection_exists(conn, &name))
            .await
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        self.run("list collections", |conn| {
            let mut stmt = conn
                .prepare("SELECT name FROM memory_collections ORDER BY name")
                .map_err(sql_error("list collections"))?;
            let names: rusqlite::Result<Vec<String>> = stmt
                .query_map([], |row| row.get(0))
                .map_err(sql_error("list collections"))?
                .collect();
            names.map_err(sql_error("list collections"))
        })
        .await
    }

    async fn upsert(
        &self,
        collection: &str,
        key: &str,
        metadata: &str,
        embedding: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<String> {
        validate_timestamp(&timestamp)?;
        let name = collection.to_string();
        let entry = Entry::new(key, metadata, embedding, timestamp);
        let key = self
            .run("upsert", move |conn| {
                write_entries(conn, &name, std::slice::from_ref(&entry))?;
                Ok(entry.key)
            })
            .await?;
        tracing::debug!(collection, key = %key, "upserted entry");
        Ok(key)
    }

    async fn upsert_batch(&self, collection: &str, entries: &[Entry]) -> Result<Vec<String>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        for entry in entries {
            validate_timestamp(&entry.timestamp)?;
        }
        let name = collection.to_string();
        let entries = entries.to_vec();
        let keys = self
            .run("upsert batch", move |conn| {
                write_entries(conn, &name, &entries)?;
                Ok(entries.into_iter().map(|e| e.key).collect::<Vec<_>>())
            })
            .await?;
        tracing::debug!(collection, count = keys.len(), "upserted batch");
        Ok(keys)
    }

    async fn read_all(&self, collection: &str) -> Result<Vec<Entry>> {
        let name = collection.to_string();
        self.run("read all", move |conn| {
            ensure_collection(conn, &name)?;
            let mut stmt = conn
                .prepare(
                    r#"
                    SELECT key, metadata, embedding, timestamp
                    FROM memory_entries
                    WHERE collection = ?1
                    ORDER BY key
                    "#,
                )
                .map_err(sql_error("read all"))?;
            let entries: rusqlite::Result<Vec<Entry>> = stmt
                .query_map([&name], entry_from_row)
                .map_err(sql_error("read all"))?
                .collect();
            entries.map_err(sql_error("read all"))
        })
        .await
    }

    async fn read(&self, collection: &str, key: &str) -> Result<Option<Entry>> {
        let name = collection.to_string();
        let key = key.to_string();
        self.run("read", move |conn| {
            ensure_collection(conn, &name)?;
            conn.query_row(SELECT_ENTRY, params![&name, &key], entry_from_row)
                .optional()
                .map_err(sql_error("read"))
        })
        .await
    }

    async fn read_batch(&self, collection: &str, keys: &[String]) -> Result<Vec<Entry>> {
        let name = collection.to_string();
        let keys = keys.to_vec();
        self.run("read batch", move |conn| {
            ensure_collection(conn, &name)?;
            let mut stmt = conn
                .prepare_cached(SELECT_ENTRY)
                .map_err(sql_error("read batch"))?;
            let mut seen = HashSet::new();
            let mut entries = Vec::new();
            for key in &keys {
                if !seen.insert(key.as_str()) {
                    continue;
                }
                let entry = stmt
                    .query_row(params![&name, key], entry_from_row)
                    .optional()
                    .map_err(sql_error("read batch"))?;
                entries.extend(entry);
            }
            Ok(entries)
        })
        .await
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        let name = collection.to_string();
        self.run("delete collection", move |conn| {
            let tx = conn.transaction().map_err(sql_error("delete collection"))?;
            tx.execute("DELETE FROM memory_entries WHERE collection = ?1", [&name])
                .map_err(sql_error("delete collection"))?;
            tx.execute("DELETE FROM memory_collections WHERE name = ?1", [&name])
                .map_err(sql_error("delete collection"))?;
            tx.commit().map_err(sql_error("delete collection"))
        })
        .await?;
        tracing::debug!(collection, "deleted collection");
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<()> {
        let name = collection.to_string();
        let key = key.to_string();
        self.run("delete", move |conn| {
            ensure_collection(conn, &name)?;
            conn.execute(DELETE_ENTRY, params![&name, &key])
                .map_err(sql_error("delete"))?;
            Ok(())
        })
        .await
    }

    async fn delete_batch(&self, collection: &str, keys: &[String]) -> Result<()> {
        let name = collection.to_string();
        let keys = keys.to_vec();
        let removed = self
            .run("delete batch", move |conn| {
                let tx = conn.transaction().map_err(sql_error("delete batch"))?;
                ensure_collection(&tx, &name)?;
                let mut removed = 0;
                {
                    let mut stmt = tx
                        .prepare_cached(DELETE_ENTRY)
                        .map_err(sql_error("delete batch"))?;
                    for key in &keys {
                        removed += stmt
                            .execute(params![&name, key])
                            .map_err(sql_error("delete batch"))?;
                    }
                }
                tx.commit().map_err(sql_error("delete batch"))?;
                Ok(removed)
            })
            .await?;
        tracing::debug!(collection, removed, "deleted batch");
        Ok(())
    }

    async fn delete_empty(&self, collection: &str) -> Result<()> {
        let name = collection.to_string();
        let removed = self
            .run("delete empty", move |conn| {
                ensure_collection(conn, &name)?;
                conn.execute(
                    r#"
                    DELETE FROM memory_entries
                    WHERE collection = ?1
                      AND TRIM(metadata, ' ' || char(9, 10, 13)) IN ('', 'null', '{}')
                      AND TRIM(embedding, ' ' || char(9, 10, 13)) IN ('', 'null', '[]')
                    "#,
                    [&name],
                )
                .map_err(sql_error("delete empty"))
            })
            .await?;
        tracing::debug!(collection, removed, "deleted empty entries");
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.conn.close()
    }
}
