use colltrack_store::SqliteTrackerStore;
use serde_json::{json, Value};

#[allow(dead_code)]
pub fn store() -> SqliteTrackerStore {
    SqliteTrackerStore::in_memory().unwrap()
}

/// A request entry keyed by its locator.
#[allow(dead_code)]
pub fn request_item(name: &str, method: &str, url: &str) -> Value {
    json!({
        "name": name,
        "request": {"method": method, "url": {"raw": url}, "header": []},
        "response": []
    })
}

/// Minimal collection document around `items`.
#[allow(dead_code)]
pub fn collection(name: &str, items: Vec<Value>) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "info": {"name": name, "schema": "v2.1.0"},
        "item": items
    }))
    .unwrap()
}
