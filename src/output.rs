//! JSON response types and formatting for CLI output.

use serde::Serialize;
use sqlmem::Entry;

/// Response for commands that change state without returning data.
#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub collection: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Response for `init`.
#[derive(Serialize)]
pub struct InitResponse {
    pub status: &'static str,
    pub database_path: String,
}

/// Response for listing collections.
#[derive(Serialize)]
pub struct CollectionsResponse {
    pub collections: Vec<String>,
}

/// Response for a collection existence check.
#[derive(Serialize)]
pub struct ExistsResponse {
    pub collection: String,
    pub exists: bool,
}

/// Response for reading a single entry.
#[derive(Serialize)]
pub struct EntryResponse {
    pub collection: String,
    pub entry: Option<Entry>,
}

/// Response for reading several entries.
#[derive(Serialize)]
pub struct EntriesResponse {
    pub collection: String,
    pub entries: Vec<Entry>,
}

/// Response for batch deletion.
#[derive(Serialize)]
pub struct BatchDeleteResponse {
    pub status: &'static str,
    pub collection: String,
    pub keys: Vec<String>,
}

/// Response for errors.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

/// Print a value as formatted JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_serialize_status_response_without_key() {
        let response = StatusResponse {
            status: "created",
            collection: "notes".to_string(),
            key: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"status":"created","collection":"notes"}"#);
    }

    #[test]
    fn test_serialize_entry_response() {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let response = EntryResponse {
            collection: "notes".to_string(),
            entry: Some(Entry::new("k1", "{}", "[0.5]", timestamp)),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"key\":\"k1\""));
        assert!(json.contains("\"embedding\":\"[0.5]\""));
        assert!(json.contains("\"timestamp\":\"2024-01-01T00:00:00Z\""));
    }

    #[test]
    fn test_serialize_missing_entry() {
        let response = EntryResponse {
            collection: "notes".to_string(),
            entry: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"entry\":null"));
    }

    #[test]
    fn test_serialize_exists_response() {
        let response = ExistsResponse {
            collection: "notes".to_string(),
            exists: true,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"exists\":true"));
    }
}
