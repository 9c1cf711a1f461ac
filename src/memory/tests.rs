//! Tests for the memory store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;

use super::*;
use crate::connection::ManagedConnection;
use crate::connection::test_handles::{FakeHandle, close_count};
use crate::connector::{Connector, FromConnection};
use crate::entry::Entry;
use crate::errors::{ErrorKind, Result};

/// Connector that records which operations reached it.
struct RecordingConnector {
    conn: ManagedConnection<FakeHandle>,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl RecordingConnector {
    fn new() -> (Self, Arc<Mutex<Vec<&'static str>>>, FakeHandleCloses) {
        let (handle, closes) = FakeHandle::new(false);
        let calls = Arc::new(Mutex::new(Vec::new()));
        let connector = RecordingConnector {
            conn: ManagedConnection::new(handle),
            calls: Arc::clone(&calls),
        };
        (connector, calls, closes)
    }

    fn record(&self, op: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(op);
        self.conn.with_handle(|_| Ok(()))
    }
}

type FakeHandleCloses = Arc<std::sync::atomic::AtomicUsize>;

#[async_trait]
impl Connector for RecordingConnector {
    fn dialect(&self) -> &'static str {
        "recording"
    }

    async fn create_table(&self) -> Result<()> {
        self.record("create_table")
    }

    async fn create_collection(&self, _collection: &str) -> Result<()> {
        self.record("create_collection")
    }

    async fn collection_exists(&self, _collection: &str) -> Result<bool> {
        self.record("collection_exists")?;
        Ok(true)
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        self.record("list_collections")?;
        Ok(vec!["notes".to_string()])
    }

    async fn upsert(
        &self,
        _collection: &str,
        key: &str,
        _metadata: &str,
        _embedding: &str,
        _timestamp: DateTime<Utc>,
    ) -> Result<String> {
        self.record("upsert")?;
        Ok(key.to_string())
    }

    async fn upsert_batch(&self, _collection: &str, entries: &[Entry]) -> Result<Vec<String>> {
        self.record("upsert_batch")?;
        Ok(entries.iter().map(|e| e.key.clone()).collect())
    }

    async fn read_all(&self, _collection: &str) -> Result<Vec<Entry>> {
        self.record("read_all")?;
        Ok(Vec::new())
    }

    async fn read(&self, _collection: &str, _key: &str) -> Result<Option<Entry>> {
        self.record("read")?;
        Ok(None)
    }

    async fn read_batch(&self, _collection: &str, _keys: &[String]) -> Result<Vec<Entry>> {
        self.record("read_batch")?;
        Ok(Vec::new())
    }

    async fn delete_collection(&self, _collection: &str) -> Result<()> {
        self.record("delete_collection")
    }

    async fn delete(&self, _collection: &str, _key: &str) -> Result<()> {
        self.record("delete")
    }

    async fn delete_batch(&self, _collection: &str, _keys: &[String]) -> Result<()> {
        self.record("delete_batch")
    }

    async fn delete_empty(&self, _collection: &str) -> Result<()> {
        self.record("delete_empty")
    }

    fn close(&self) -> Result<()> {
        self.conn.close()
    }
}

impl FromConnection for RecordingConnector {
    type Handle = FakeHandle;

    fn from_connection(connection: ManagedConnection<FakeHandle>) -> Self {
        RecordingConnector {
            conn: connection,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn recording_store() -> (MemoryStore, Arc<Mutex<Vec<&'static str>>>, FakeHandleCloses) {
    let (connector, calls, closes) = RecordingConnector::new();
    (MemoryStore::new(Arc::new(connector)), calls, closes)
}

async fn sqlite_store() -> MemoryStore {
    let conn = Connection::open_in_memory().unwrap();
    let store = SqliteMemoryStoreBuilder::new()
        .with_connection(conn)
        .build()
        .await
        .unwrap();
    store.create_table().await.unwrap();
    store
}

#[tokio::test]
async fn test_blank_collection_names_never_reach_connector() {
    let (store, calls, _) = recording_store();

    for name in ["", "   ", "\t\n"] {
        let results = [
            store.create_collection(name).await.map(|_| ()),
            store.collection_exists(name).await.map(|_| ()),
            store.delete_collection(name).await,
            store.upsert(name, "k", "{}", "[]", ts(0)).await.map(|_| ()),
            store.upsert_batch(name, &[]).await.map(|_| ()),
            store.read_all(name).await.map(|_| ()),
            store.read(name, "k").await.map(|_| ()),
            store.read_batch(name, &["k".to_string()]).await.map(|_| ()),
            store.delete(name, "k").await,
            store.delete_batch(name, &["k".to_string()]).await,
            store.delete_empty(name).await,
        ];
        for result in results {
            assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidArgument);
        }
    }

    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_keys_rejected_before_connector() {
    let (store, calls, _) = recording_store();

    let err = store.upsert("notes", " ", "{}", "[]", ts(0)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let entries = vec![
        Entry::new("a", "{}", "[]", ts(0)),
        Entry::new("", "{}", "[]", ts(0)),
    ];
    let err = store.upsert_batch("notes", &entries).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_out_of_range_timestamps_rejected_before_connector() {
    let (store, calls, _) = recording_store();
    let far = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();

    let err = store.upsert("notes", "k", "{}", "[]", far).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let entries = vec![
        Entry::new("a", "{}", "[]", ts(0)),
        Entry::new("b", "{}", "[]", far),
    ];
    let err = store.upsert_batch("notes", &entries).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_valid_calls_are_forwarded() {
    let (store, calls, _) = recording_store();

    store.create_table().await.unwrap();
    store.create_collection("notes").await.unwrap();
    assert!(store.collection_exists("notes").await.unwrap());
    assert_eq!(store.list_collections().await.unwrap(), vec!["notes"]);
    let key = store.upsert("notes", "k1", "{}", "[]", ts(1)).await.unwrap();
    assert_eq!(key, "k1");
    store.delete_empty("notes").await.unwrap();

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            "create_table",
            "create_collection",
            "collection_exists",
            "list_collections",
            "upsert",
            "delete_empty",
        ]
    );
}

#[tokio::test]
async fn test_close_propagates_to_handle() {
    let (store, calls, closes) = recording_store();

    store.close().unwrap();
    store.close().unwrap();
    assert_eq!(close_count(&closes), 1);

    let err = store.read_all("notes").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalState);
    assert_eq!(*calls.lock().unwrap(), vec!["read_all"]);
}

#[tokio::test]
async fn test_build_without_connection_fails() {
    let err = MemoryStoreBuilder::<RecordingConnector>::new()
        .build()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::IllegalState);
    assert_eq!(err.to_string(), CONNECTION_NOT_SET);
}

#[tokio::test]
async fn test_build_with_absent_connection_rejected() {
    let result = MemoryStoreBuilder::<RecordingConnector>::new().with_optional_connection(None);
    assert_eq!(result.err().unwrap().kind(), ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn test_builder_binds_connection_to_connector() {
    let (handle, closes) = FakeHandle::new(false);
    let builder = MemoryStoreBuilder::<RecordingConnector>::default()
        .with_optional_connection(Some(handle))
        .unwrap();
    assert!(builder.has_connection());

    let store = builder.build().await.unwrap();
    assert_eq!(store.connector().dialect(), "recording");

    store.close().unwrap();
    assert_eq!(close_count(&closes), 1);
}

#[tokio::test]
async fn test_later_connection_replaces_earlier() {
    let (first, first_closes) = FakeHandle::new(false);
    let (second, second_closes) = FakeHandle::new(false);

    let store = MemoryStoreBuilder::<RecordingConnector>::new()
        .with_connection(first)
        .with_connection(second)
        .build()
        .await
        .unwrap();
    store.close().unwrap();

    // The replaced handle is dropped without going through close.
    assert_eq!(close_count(&first_closes), 0);
    assert_eq!(close_count(&second_closes), 1);
}

#[tokio::test]
async fn test_sqlite_builder_produces_working_store() {
    let store = sqlite_store().await;
    assert_eq!(store.connector().dialect(), "sqlite");

    store
        .upsert("notes", "k1", r#"{"a":1}"#, "[0.1]", ts(100))
        .await
        .unwrap();

    let entry = store.read("notes", "k1").await.unwrap().unwrap();
    assert_eq!(entry.metadata, r#"{"a":1}"#);
    assert_eq!(entry.timestamp, ts(100));
    assert_eq!(store.list_collections().await.unwrap(), vec!["notes"]);
}

#[tokio::test]
async fn test_sqlite_store_batch_and_prune() {
    let store = sqlite_store().await;
    let entries = vec![
        Entry::new("full", r#"{"a":1}"#, "[1.0]", ts(1)),
        Entry::new("blank", " {} ", "[]", ts(2)),
        Entry::new("nulls", "null", "null", ts(3)),
    ];

    let keys = store.upsert_batch("notes", &entries).await.unwrap();
    assert_eq!(keys, vec!["full", "blank", "nulls"]);

    store.delete_empty("notes").await.unwrap();

    let remaining = store.read_all("notes").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].key, "full");
}

#[tokio::test]
async fn test_sqlite_store_missing_collection() {
    let store = sqlite_store().await;

    let err = store.read_all("ghost").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CollectionNotFound);

    store.delete_collection("ghost").await.unwrap();
    assert!(!store.collection_exists("ghost").await.unwrap());
}

#[test]
fn test_memory_store_debug_shows_dialect() {
    let (store, _, _) = recording_store();
    assert_eq!(format!("{store:?}"), r#"MemoryStore { dialect: "recording" }"#);
}
