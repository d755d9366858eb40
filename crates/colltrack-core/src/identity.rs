//! Identity of reorderable array members.
//!
//! Arrays whose own key is a reserved list-container name (`item` in an API
//! collection) hold named sub-resources. Their elements are matched by a
//! derived key instead of by position, so reordering is not reported as
//! add+delete.

use crate::path::PathSegment;
use serde_json::Value;
use std::collections::HashMap;

/// Default reserved list-container names.
pub const DEFAULT_CONTAINER_NAMES: &[&str] = &["item"];

/// Decides which arrays are identity-bearing and how their elements are keyed.
pub trait ItemIdentity {
    /// Whether the array located at `path` is identity-bearing.
    fn is_identity_array(&self, path: &[PathSegment]) -> bool;

    /// Stable key for one element; empty when the element carries no identity.
    fn item_key(&self, element: &Value) -> String;

    /// Whether `name` is a reserved list-container name.
    fn is_container_name(&self, name: &str) -> bool;
}

/// Identity rules for API collection documents.
#[derive(Debug, Clone)]
pub struct CollectionItemIdentity {
    container_names: Vec<String>,
}

impl CollectionItemIdentity {
    pub fn new(container_names: Vec<String>) -> Self {
        Self { container_names }
    }

    pub fn container_names(&self) -> &[String] {
        &self.container_names
    }
}

impl Default for CollectionItemIdentity {
    fn default() -> Self {
        Self::new(
            DEFAULT_CONTAINER_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

/// Request locator of an element: `request.url` (string or `{raw}`) or a
/// top-level `url`.
fn locator(element: &serde_json::Map<String, Value>) -> Option<String> {
    let request = element.get("request").and_then(Value::as_object);
    let url = request
        .and_then(|r| r.get("url"))
        .or_else(|| element.get("url"))?;
    let url = match url {
        Value::String(s) => s.clone(),
        Value::Object(o) => o.get("raw").and_then(Value::as_str)?.to_string(),
        _ => return None,
    };
    if url.is_empty() {
        return None;
    }
    let method = request
        .and_then(|r| r.get("method"))
        .or_else(|| element.get("method"))
        .and_then(Value::as_str);
    Some(match method {
        Some(m) => format!("{} {}", m.to_ascii_uppercase(), url),
        None => url,
    })
}

impl ItemIdentity for CollectionItemIdentity {
    /// Only the array's own key counts. Arrays nested inside an entry
    /// (`item[n].request.header`) have no name or locator on their members and
    /// stay positional.
    fn is_identity_array(&self, path: &[PathSegment]) -> bool {
        match path.last() {
            Some(PathSegment::Key(k)) => self.is_container_name(k),
            _ => false,
        }
    }

    fn item_key(&self, element: &Value) -> String {
        let Some(obj) = element.as_object() else {
            return String::new();
        };
        if let Some(loc) = locator(obj) {
            return format!("req:{}", loc);
        }
        match obj.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => format!("name:{}", name),
            _ => String::new(),
        }
    }

    fn is_container_name(&self, name: &str) -> bool {
        self.container_names.iter().any(|c| c == name)
    }
}

/// True when `segments` ends inside an entry of a list container, i.e. the
/// path contains `<container>[n]`. Returns the segment index of that entry's
/// index token (the deepest one).
pub fn deepest_container_entry(
    segments: &[PathSegment],
    identity: &dyn ItemIdentity,
) -> Option<usize> {
    segments
        .windows(2)
        .enumerate()
        .filter(|(_, w)| {
            matches!(
                (&w[0], &w[1]),
                (PathSegment::Key(k), PathSegment::Index(_)) if identity.is_container_name(k)
            )
        })
        .map(|(i, _)| i + 1)
        .last()
}

/// Whether `segments` ends exactly at a container entry (`...item[n]`).
pub fn is_container_entry(segments: &[PathSegment], identity: &dyn ItemIdentity) -> bool {
    segments.len() >= 2
        && deepest_container_entry(segments, identity) == Some(segments.len() - 1)
}

/// Key every element of an identity array.
///
/// Duplicate keys are disambiguated by occurrence (`key#2`, `key#3`...);
/// empty keys stay empty and are never matched.
pub fn keyed_elements(items: &[Value], identity: &dyn ItemIdentity) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    items
        .iter()
        .map(|item| {
            let key = identity.item_key(item);
            if key.is_empty() {
                return key;
            }
            let count = seen.entry(key.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                key
            } else {
                format!("{}#{}", key, count)
            }
        })
        .collect()
}
