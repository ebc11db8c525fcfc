//! Response DTOs for the launch API.
//!
//! Entities are treated as opaque records: only the integer `id` is typed,
//! everything else is kept as raw JSON in `fields`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single entity returned by any resource.
///
/// Equality compares `id` and every top-level field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            fields: Map::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

fn first_page() -> u32 {
    1
}

/// One page of a paginated read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T = Record> {
    #[serde(default)]
    pub valid_auth: bool,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub last_page: u32,
    pub result: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_unknown_fields() {
        let record: Record = serde_json::from_str(r#"{"id":7,"name":"Starlink","sort_date":"1700000000"}"#).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.get("name"), Some(&Value::from("Starlink")));
        assert_eq!(record, Record::new(7).with("name", "Starlink").with("sort_date", "1700000000"));
    }

    #[test]
    fn page_metadata_defaults() {
        let page: Page = serde_json::from_str(r#"{"result":[{"id":1}]}"#).unwrap();
        assert_eq!(page.last_page, 1);
        assert!(!page.valid_auth);
        assert_eq!(page.result, vec![Record::new(1)]);
    }

    #[test]
    fn page_requires_result() {
        let parsed: Result<Page, _> = serde_json::from_str(r#"{"last_page":2}"#);
        assert!(parsed.is_err());
    }
}
