use serde_json::{json, Value};

/// A request entry keyed by its locator.
#[allow(dead_code)]
pub fn request_item(name: &str, method: &str, url: &str) -> Value {
    json!({
        "name": name,
        "request": {
            "method": method,
            "url": {"raw": url},
            "header": []
        },
        "response": []
    })
}

/// A folder entry keyed by its name.
#[allow(dead_code)]
pub fn folder(name: &str, items: Vec<Value>) -> Value {
    json!({"name": name, "item": items})
}

/// Wrap top-level entries in a minimal collection document.
#[allow(dead_code)]
pub fn collection(items: Vec<Value>) -> Value {
    json!({
        "info": {
            "_postman_id": "6f1c2a9e-0000-4000-8000-000000000001",
            "name": "Users API",
            "schema": "https://schema.getpostman.com/json/collection/v2.1.0/collection.json"
        },
        "item": items,
        "variable": [{"key": "base", "value": "https://api.example.com"}]
    })
}

#[allow(dead_code)]
pub fn bytes(v: &Value) -> Vec<u8> {
    serde_json::to_vec(v).unwrap()
}
