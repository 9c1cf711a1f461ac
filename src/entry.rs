//! Memory record data type.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Last year with a four-digit RFC 3339 rendering.
const MAX_TIMESTAMP_YEAR: i32 = 9999;

/// A single memory record stored in a collection.
///
/// `metadata` and `embedding` are JSON-encoded strings that the store keeps
/// verbatim; it never parses them. Entries returned by reads are detached
/// snapshots with no link back to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Identifier, unique within its collection.
    pub key: String,
    /// JSON metadata blob.
    pub metadata: String,
    /// JSON-encoded embedding vector.
    pub embedding: String,
    /// Time of last creation or update.
    pub timestamp: DateTime<Utc>,
}

impl Entry {
    pub fn new(
        key: impl Into<String>,
        metadata: impl Into<String>,
        embedding: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Entry {
            key: key.into(),
            metadata: metadata.into(),
            embedding: embedding.into(),
            timestamp,
        }
    }
}

/// Reject timestamps whose year falls outside 0000..=9999.
///
/// Stored timestamps are RFC 3339 text, which has no room for other years.
pub(crate) fn validate_timestamp(timestamp: &DateTime<Utc>) -> Result<()> {
    let year = timestamp.year();
    if !(0..=MAX_TIMESTAMP_YEAR).contains(&year) {
        return Err(Error::invalid_argument(format!(
            "Timestamp year {year} is outside 0000-9999"
        )));
    }
    Ok(())
}
