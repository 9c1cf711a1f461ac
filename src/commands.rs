//! Command handlers for the sqlmem CLI.

use crate::output::*;
use chrono::{DateTime, Utc};
use sqlmem::{Config, Entry, Error, MemoryStore};
use std::process::ExitCode;

/// Commands supported by sqlmem CLI.
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Create the database and its schema
    Init,
    /// Create a collection
    CreateCollection {
        /// Collection name
        collection: String,
    },
    /// List all collections
    Collections,
    /// Check whether a collection exists (exit code 1 if not)
    Exists {
        /// Collection name
        collection: String,
    },
    /// Delete a collection and all of its entries
    DeleteCollection {
        /// Collection name
        collection: String,
    },
    /// Insert or replace an entry
    Upsert {
        /// Collection name
        collection: String,

        /// Entry key (default: a new UUID)
        #[arg(short = 'k', long)]
        key: Option<String>,

        /// JSON metadata
        #[arg(short = 'm', long, default_value = "{}")]
        metadata: String,

        /// Serialized embedding
        #[arg(short = 'e', long, default_value = "[]")]
        embedding: String,

        /// RFC 3339 timestamp (default: now)
        #[arg(short = 't', long, value_parser = parse_timestamp)]
        timestamp: Option<DateTime<Utc>>,
    },
    /// Read one entry (exit code 1 if missing)
    Get {
        /// Collection name
        collection: String,
        /// Entry key
        key: String,
    },
    /// Read several entries; missing keys are skipped
    GetBatch {
        /// Collection name
        collection: String,
        /// Entry keys
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Read every entry of a collection
    List {
        /// Collection name
        collection: String,
    },
    /// Delete one entry
    Delete {
        /// Collection name
        collection: String,
        /// Entry key
        key: String,
    },
    /// Delete several entries at once
    DeleteBatch {
        /// Collection name
        collection: String,
        /// Entry keys
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Delete entries with empty metadata and embedding
    PruneEmpty {
        /// Collection name
        collection: String,
    },
    /// Print the sqlmem version
    Version,
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp: {e}"))
}

/// Execute a CLI command against an open store.
pub async fn execute(
    command: &Commands,
    store: &MemoryStore,
    config: &Config,
    json: bool,
) -> Result<ExitCode, Error> {
    match command {
        Commands::Init => handle_init(store, config, json).await,
        Commands::CreateCollection { collection } => {
            handle_create_collection(store, collection, json).await
        }
        Commands::Collections => handle_collections(store, json).await,
        Commands::Exists { collection } => handle_exists(store, collection, json).await,
        Commands::DeleteCollection { collection } => {
            handle_delete_collection(store, collection, json).await
        }
        Commands::Upsert {
            collection,
            key,
            metadata,
            embedding,
            timestamp,
        } => {
            let key = key
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let entry = Entry::new(key, metadata, embedding, timestamp.unwrap_or_else(Utc::now));
            handle_upsert(store, collection, entry, json).await
        }
        Commands::Get { collection, key } => handle_get(store, collection, key, json).await,
        Commands::GetBatch { collection, keys } => {
            handle_get_batch(store, collection, keys, json).await
        }
        Commands::List { collection } => handle_list(store, collection, json).await,
        Commands::Delete { collection, key } => handle_delete(store, collection, key, json).await,
        Commands::DeleteBatch { collection, keys } => {
            handle_delete_batch(store, collection, keys, json).await
        }
        Commands::PruneEmpty { collection } => handle_prune_empty(store, collection, json).await,
        Commands::Version => handle_version(json),
    }
}

async fn handle_init(store: &MemoryStore, config: &Config, json: bool) -> Result<ExitCode, Error> {
    store.create_table().await?;
    let database_path = config.database_path.display().to_string();
    if json {
        print_json(&InitResponse {
            status: "initialized",
            database_path,
        });
    } else {
        println!("Initialized database: {}", database_path);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_status(status: &'static str, collection: &str, key: Option<&str>, json: bool) {
    if json {
        print_json(&StatusResponse {
            status,
            collection: collection.to_string(),
            key: key.map(str::to_string),
        });
    } else {
        match key {
            Some(key) => println!("{status}: {collection}/{key}"),
            None => println!("{status}: {collection}"),
        }
    }
}

async fn handle_create_collection(
    store: &MemoryStore,
    collection: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    store.create_collection(collection).await?;
    print_status("created", collection, None, json);
    Ok(ExitCode::SUCCESS)
}

async fn handle_collections(store: &MemoryStore, json: bool) -> Result<ExitCode, Error> {
    let collections = store.list_collections().await?;
    if json {
        print_json(&CollectionsResponse { collections });
    } else {
        for name in collections {
            println!("{}", name);
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_exists(
    store: &MemoryStore,
    collection: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    let exists = store.collection_exists(collection).await?;
    if json {
        print_json(&ExistsResponse {
            collection: collection.to_string(),
            exists,
        });
    } else {
        println!("{}", exists);
    }
    Ok(if exists {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

async fn handle_delete_collection(
    store: &MemoryStore,
    collection: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    store.delete_collection(collection).await?;
    print_status("deleted", collection, None, json);
    Ok(ExitCode::SUCCESS)
}

async fn handle_upsert(
    store: &MemoryStore,
    collection: &str,
    entry: Entry,
    json: bool,
) -> Result<ExitCode, Error> {
    let key = store
        .upsert(
            collection,
            &entry.key,
            &entry.metadata,
            &entry.embedding,
            entry.timestamp,
        )
        .await?;
    print_status("upserted", collection, Some(&key), json);
    Ok(ExitCode::SUCCESS)
}

fn print_entry(entry: &Entry) {
    println!("Key: {}", entry.key);
    println!("Metadata: {}", entry.metadata);
    println!("Embedding: {}", entry.embedding);
    println!("Timestamp: {}", entry.timestamp.to_rfc3339());
}

async fn handle_get(
    store: &MemoryStore,
    collection: &str,
    key: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    let entry = store.read(collection, key).await?;
    let code = if entry.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    };
    if json {
        print_json(&EntryResponse {
            collection: collection.to_string(),
            entry,
        });
    } else {
        match entry {
            Some(entry) => print_entry(&entry),
            None => eprintln!("Entry not found: {collection}/{key}"),
        }
    }
    Ok(code)
}

fn print_entries(collection: &str, entries: Vec<Entry>, json: bool) {
    if json {
        print_json(&EntriesResponse {
            collection: collection.to_string(),
            entries,
        });
    } else {
        for entry in entries {
            println!(
                "{} [{}]\n  metadata: {}\n  embedding: {}\n",
                entry.key,
                entry.timestamp.to_rfc3339(),
                entry.metadata,
                entry.embedding
            );
        }
    }
}

async fn handle_get_batch(
    store: &MemoryStore,
    collection: &str,
    keys: &[String],
    json: bool,
) -> Result<ExitCode, Error> {
    let entries = store.read_batch(collection, keys).await?;
    print_entries(collection, entries, json);
    Ok(ExitCode::SUCCESS)
}

async fn handle_list(store: &MemoryStore, collection: &str, json: bool) -> Result<ExitCode, Error> {
    let entries = store.read_all(collection).await?;
    print_entries(collection, entries, json);
    Ok(ExitCode::SUCCESS)
}

async fn handle_delete(
    store: &MemoryStore,
    collection: &str,
    key: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    store.delete(collection, key).await?;
    print_status("deleted", collection, Some(key), json);
    Ok(ExitCode::SUCCESS)
}

async fn handle_delete_batch(
    store: &MemoryStore,
    collection: &str,
    keys: &[String],
    json: bool,
) -> Result<ExitCode, Error> {
    store.delete_batch(collection, keys).await?;
    if json {
        print_json(&BatchDeleteResponse {
            status: "deleted",
            collection: collection.to_string(),
            keys: keys.to_vec(),
        });
    } else {
        println!("Deleted {} key(s) from {}", keys.len(), collection);
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_prune_empty(
    store: &MemoryStore,
    collection: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    store.delete_empty(collection).await?;
    print_status("pruned", collection, None, json);
    Ok(ExitCode::SUCCESS)
}

pub fn handle_version(json: bool) -> Result<ExitCode, Error> {
    if json {
        print_json(&serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "name": env!("CARGO_PKG_NAME")
        }));
    } else {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    }
    Ok(ExitCode::SUCCESS)
}
