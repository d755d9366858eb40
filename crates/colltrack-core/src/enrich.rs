//! Read-time enrichment of change records.
//!
//! Enrichment derives human-facing labels from a raw record: display tokens,
//! an arrow-joined human path, the affected endpoint and a coarse resource
//! type. It never fails; anything it cannot resolve falls back to a generic
//! label.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::diff::model::ChangeType;
use crate::identity::{deepest_container_entry, CollectionItemIdentity, ItemIdentity};
use crate::model::ChangeRecord;
use crate::path::{from_segments, segments, PathSegment};

/// Display of the empty (document root) path.
pub const ROOT_LABEL: &str = "(root)";

/// Separator used in [`EnrichedChangeView::human_path`].
pub const PATH_SEPARATOR: &str = " → ";

/// Field holding an entry's display name.
const NAME_FIELD: &str = "name";

/// Display labels for well-known collection keys.
const KEY_LABELS: &[(&str, &str)] = &[
    ("_postman_id", "Collection ID"),
    ("auth", "Auth"),
    ("body", "Body"),
    ("description", "Description"),
    ("event", "Events"),
    ("exec", "Script Lines"),
    ("header", "Headers"),
    ("host", "Host"),
    ("info", "Info"),
    ("item", "Items"),
    ("method", "Method"),
    ("name", "Name"),
    ("path", "Path"),
    ("query", "Query Params"),
    ("raw", "Raw"),
    ("request", "Request"),
    ("response", "Responses"),
    ("schema", "Schema"),
    ("script", "Script"),
    ("url", "URL"),
    ("variable", "Variables"),
];

/// Coarse classification of what a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Collection,
    Info,
    Item,
    Request,
    Url,
    QueryParam,
    Header,
    Auth,
    Body,
    Response,
    Script,
    Variable,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Collection => "collection",
            ResourceType::Info => "info",
            ResourceType::Item => "item",
            ResourceType::Request => "request",
            ResourceType::Url => "url",
            ResourceType::QueryParam => "query_param",
            ResourceType::Header => "header",
            ResourceType::Auth => "auth",
            ResourceType::Body => "body",
            ResourceType::Response => "response",
            ResourceType::Script => "script",
            ResourceType::Variable => "variable",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reserved substrings, checked against the lowercased path.
const RESOURCE_MARKERS: &[(&str, ResourceType)] = &[
    ("header", ResourceType::Header),
    ("auth", ResourceType::Auth),
    ("body", ResourceType::Body),
    ("query", ResourceType::QueryParam),
    ("url", ResourceType::Url),
    ("response", ResourceType::Response),
    ("event", ResourceType::Script),
    ("script", ResourceType::Script),
    ("variable", ResourceType::Variable),
    ("request", ResourceType::Request),
    ("item", ResourceType::Item),
    ("info", ResourceType::Info),
];

/// A change record with derived display fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedChangeView {
    #[serde(flatten)]
    pub record: ChangeRecord,
    pub path_segments: Vec<String>,
    pub human_path: String,
    pub endpoint_name: Option<String>,
    pub resource_type: ResourceType,
}

/// Enrich with the default collection identity rules.
pub fn enrich(record: &ChangeRecord) -> EnrichedChangeView {
    enrich_with(record, &CollectionItemIdentity::default())
}

pub fn enrich_with(record: &ChangeRecord, identity: &dyn ItemIdentity) -> EnrichedChangeView {
    let segs = segments(&record.path);
    EnrichedChangeView {
        path_segments: segs.iter().map(ToString::to_string).collect(),
        human_path: human_path(&segs, identity),
        endpoint_name: endpoint_name(record, &segs, identity),
        resource_type: resource_type(&record.path),
        record: record.clone(),
    }
}

pub fn enrich_all(records: &[ChangeRecord], identity: &dyn ItemIdentity) -> Vec<EnrichedChangeView> {
    records.iter().map(|r| enrich_with(r, identity)).collect()
}

fn key_label(key: &str) -> &str {
    KEY_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
        .unwrap_or(key)
}

/// Arrow-joined display path.
///
/// Indices directly under a list container render as `#n`, other indices
/// as `[n]`.
pub fn human_path(segs: &[PathSegment], identity: &dyn ItemIdentity) -> String {
    if segs.is_empty() {
        return ROOT_LABEL.to_string();
    }
    let mut parts = Vec::with_capacity(segs.len());
    let mut prev_key: Option<&str> = None;
    for seg in segs {
        match seg {
            PathSegment::Key(k) => {
                parts.push(key_label(k).to_string());
                prev_key = Some(k);
            }
            PathSegment::Index(i) => {
                if prev_key.is_some_and(|k| identity.is_container_name(k)) {
                    parts.push(format!("#{}", i));
                } else {
                    parts.push(format!("[{}]", i));
                }
                prev_key = None;
            }
        }
    }
    parts.join(PATH_SEPARATOR)
}

/// Most specific reserved marker in the path (the one occurring deepest);
/// `collection` when none matches.
pub fn resource_type(path: &str) -> ResourceType {
    let lower = path.to_ascii_lowercase();
    let mut best: Option<(usize, ResourceType)> = None;
    for (marker, kind) in RESOURCE_MARKERS {
        if let Some(pos) = lower.rfind(marker) {
            if best.map_or(true, |(p, _)| pos > p) {
                best = Some((pos, *kind));
            }
        }
    }
    best.map_or(ResourceType::Collection, |(_, kind)| kind)
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Display name carried by the record itself, with the path of the container
/// entry it names.
///
/// Resolves when the record renames the entry's `name` field (the new value
/// wins) or when the whole entry was added or deleted (the payload's `name`).
pub fn resolved_entry_name(
    record: &ChangeRecord,
    segs: &[PathSegment],
    identity: &dyn ItemIdentity,
) -> Option<(String, String)> {
    let entry = deepest_container_entry(segs, identity)?;
    let entry_path = from_segments(&segs[..=entry]);
    let payload = record.payload()?;

    let name = if entry + 1 == segs.len() {
        match record.change_type {
            ChangeType::Added | ChangeType::Deleted => string_field(&payload, NAME_FIELD),
            ChangeType::Modified => None,
        }
    } else if entry + 2 == segs.len() && segs[entry + 1].as_key() == Some(NAME_FIELD) {
        match record.change_type {
            ChangeType::Modified => string_field(&payload, "new"),
            ChangeType::Added => payload.as_str().map(str::to_string),
            ChangeType::Deleted => None,
        }
    } else {
        None
    }?;
    Some((entry_path, name))
}

/// Name of the endpoint a record touches; `None` outside list containers.
pub fn endpoint_name(
    record: &ChangeRecord,
    segs: &[PathSegment],
    identity: &dyn ItemIdentity,
) -> Option<String> {
    let entry = deepest_container_entry(segs, identity)?;
    if let Some((_, name)) = resolved_entry_name(record, segs, identity) {
        return Some(name);
    }
    let index = segs[entry].as_index()?;
    Some(format!("Endpoint #{}", index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::Change;
    use chrono::Utc;

    fn record(change_type: ChangeType, path: &str, modification: Option<&str>) -> ChangeRecord {
        ChangeRecord::from_change(
            "col",
            Some("a"),
            "b",
            Change {
                change_type,
                path: path.to_string(),
                modification: modification.map(str::to_string),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_human_path_labels_and_entry_numbers() {
        let view = enrich(&record(ChangeType::Modified, "item[2].request.header[0].value", None));
        assert_eq!(view.human_path, "Items → #2 → Request → Headers → [0] → value");
        assert_eq!(
            view.path_segments,
            vec!["item", "[2]", "request", "header", "[0]", "value"]
        );
    }

    #[test]
    fn test_root_path_display() {
        let view = enrich(&record(ChangeType::Modified, "", Some("{\"old\":1,\"new\":2}")));
        assert_eq!(view.human_path, ROOT_LABEL);
        assert!(view.path_segments.is_empty());
        assert_eq!(view.endpoint_name, None);
        assert_eq!(view.resource_type, ResourceType::Collection);
    }

    #[test]
    fn test_rename_resolves_new_name() {
        let r = record(
            ChangeType::Modified,
            "item[0].name",
            Some(r#"{"old":"Get User","new":"Get User V2"}"#),
        );
        assert_eq!(enrich(&r).endpoint_name.as_deref(), Some("Get User V2"));
    }

    #[test]
    fn test_added_entry_resolves_payload_name() {
        let r = record(ChangeType::Added, "item[1].item[3]", Some(r#"{"name":"List Users"}"#));
        let view = enrich(&r);
        assert_eq!(view.endpoint_name.as_deref(), Some("List Users"));
        assert_eq!(view.resource_type, ResourceType::Item);
    }

    #[test]
    fn test_other_changes_fall_back_to_index_label() {
        let r = record(ChangeType::Modified, "item[4].request.method", Some(r#"{"old":"GET","new":"POST"}"#));
        assert_eq!(enrich(&r).endpoint_name.as_deref(), Some("Endpoint #4"));
    }

    #[test]
    fn test_hashed_payload_degrades_silently() {
        let token = format!("sha256:{}", "f".repeat(64));
        let r = record(ChangeType::Added, "item[0]", Some(&token));
        assert_eq!(enrich(&r).endpoint_name.as_deref(), Some("Endpoint #0"));
    }

    #[test]
    fn test_resource_type_prefers_deepest_marker() {
        assert_eq!(resource_type("item[0].response[1].header[0]"), ResourceType::Header);
        assert_eq!(resource_type("item[0].response[1].code"), ResourceType::Response);
        assert_eq!(resource_type("item[0].request.url.query[0].value"), ResourceType::QueryParam);
        assert_eq!(resource_type("info.name"), ResourceType::Info);
        assert_eq!(resource_type("variable[0].value"), ResourceType::Variable);
        assert_eq!(resource_type("schemaVersion"), ResourceType::Collection);
    }

    #[test]
    fn test_view_serializes_flat() {
        let json = serde_json::to_value(enrich(&record(ChangeType::Deleted, "info.description", Some("\"x\"")))).unwrap();
        assert_eq!(json["path"], "info.description");
        assert_eq!(json["change_type"], "deleted");
        assert_eq!(json["resource_type"], "info");
        assert_eq!(json["human_path"], "Info → Description");
    }
}
