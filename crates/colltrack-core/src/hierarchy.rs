//! Change hierarchy reconstruction.
//!
//! Rebuilds a tree from a flat list of change records: one folder per path
//! prefix, one `change` leaf per record. The tree is built in an arena keyed
//! by prefix path and materialized once all records are placed.

use serde::Serialize;
use std::collections::HashMap;

use crate::diff::model::ChangeType;
use crate::enrich::{resolved_entry_name, ROOT_LABEL};
use crate::identity::{is_container_entry, CollectionItemIdentity, ItemIdentity};
use crate::model::ChangeRecord;
use crate::path::{from_segments, segments, PathSegment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    Change,
}

/// One node of the reconstructed hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeNode {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_type: Option<ChangeType>,
    /// Leaf descendants (1 for a change leaf)
    pub change_count: usize,
    pub children: Vec<ChangeNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_ref: Option<ChangeRecord>,
}

impl ChangeNode {
    /// Depth-first search by path and kind.
    pub fn find(&self, path: &str, kind: NodeKind) -> Option<&ChangeNode> {
        if self.path == path && self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(path, kind))
    }
}

struct ArenaNode {
    name: String,
    path: String,
    kind: NodeKind,
    entry_index: Option<usize>,
    record: Option<ChangeRecord>,
    children: Vec<usize>,
}

struct Arena {
    nodes: Vec<ArenaNode>,
    folders: HashMap<String, usize>,
}

impl Arena {
    fn new() -> Self {
        Self {
            nodes: vec![ArenaNode {
                name: ROOT_LABEL.to_string(),
                path: String::new(),
                kind: NodeKind::Folder,
                entry_index: None,
                record: None,
                children: Vec::new(),
            }],
            folders: HashMap::new(),
        }
    }

    fn push(&mut self, parent: usize, node: ArenaNode) -> usize {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        id
    }

    fn folder(&mut self, parent: usize, prefix: &[PathSegment], identity: &dyn ItemIdentity) -> usize {
        let path = from_segments(prefix);
        if let Some(&id) = self.folders.get(&path) {
            return id;
        }
        let seg = &prefix[prefix.len() - 1];
        let entry_index = is_container_entry(prefix, identity)
            .then(|| seg.as_index())
            .flatten();
        let id = self.push(
            parent,
            ArenaNode {
                name: seg.to_string(),
                path: path.clone(),
                kind: NodeKind::Folder,
                entry_index,
                record: None,
                children: Vec::new(),
            },
        );
        self.folders.insert(path, id);
        id
    }

    fn materialize(&mut self, id: usize, names: &HashMap<String, String>) -> ChangeNode {
        let children: Vec<usize> = std::mem::take(&mut self.nodes[id].children);
        let children: Vec<ChangeNode> = children
            .into_iter()
            .map(|c| self.materialize(c, names))
            .collect();

        let node = &mut self.nodes[id];
        let record = node.record.take();
        let name = match (node.entry_index, names.get(&node.path)) {
            (Some(_), Some(resolved)) => resolved.clone(),
            (Some(n), None) if node.kind == NodeKind::Folder => format!("Entry {}", n),
            _ => std::mem::take(&mut node.name),
        };
        let change_count = match node.kind {
            NodeKind::Change => 1,
            NodeKind::Folder => children.iter().map(|c| c.change_count).sum(),
        };

        ChangeNode {
            name,
            path: std::mem::take(&mut node.path),
            kind: node.kind,
            change_type: record.as_ref().map(|r| r.change_type),
            change_count,
            children,
            change_ref: record,
        }
    }
}

/// Build the hierarchy with the default collection identity rules.
pub fn build_hierarchy(records: &[ChangeRecord]) -> ChangeNode {
    build_hierarchy_with(records, &CollectionItemIdentity::default())
}

pub fn build_hierarchy_with(records: &[ChangeRecord], identity: &dyn ItemIdentity) -> ChangeNode {
    let mut arena = Arena::new();
    let mut names: HashMap<String, String> = HashMap::new();

    for record in records {
        let segs = segments(&record.path);
        if let Some((entry_path, name)) = resolved_entry_name(record, &segs, identity) {
            names.entry(entry_path).or_insert(name);
        }

        let mut parent = 0;
        for end in 1..segs.len() {
            parent = arena.folder(parent, &segs[..end], identity);
        }

        let (name, entry_index) = match segs.last() {
            Some(seg) => (
                seg.to_string(),
                is_container_entry(&segs, identity).then(|| seg.as_index()).flatten(),
            ),
            None => (ROOT_LABEL.to_string(), None),
        };
        arena.push(
            parent,
            ArenaNode {
                name,
                path: record.path.clone(),
                kind: NodeKind::Change,
                entry_index,
                record: Some(record.clone()),
                children: Vec::new(),
            },
        );
    }

    arena.materialize(0, &names)
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
    fn test_empty_input_yields_bare_root() {
        let root = build_hierarchy(&[]);
        assert_eq!(root.kind, NodeKind::Folder);
        assert_eq!(root.name, ROOT_LABEL);
        assert_eq!(root.change_count, 0);
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_shared_prefixes_reuse_folders() {
        let records = vec![
            record(ChangeType::Modified, "info.name", Some(r#"{"old":"a","new":"b"}"#)),
            record(ChangeType::Added, "info.description", Some("\"d\"")),
            record(ChangeType::Deleted, "variable[0]", Some("{}")),
        ];
        let root = build_hierarchy(&records);
        assert_eq!(root.change_count, 3);
        assert_eq!(root.children.len(), 2);

        let info = root.find("info", NodeKind::Folder).unwrap();
        assert_eq!(info.change_count, 2);
        assert_eq!(info.children.len(), 2);
        assert!(info.children.iter().all(|c| c.kind == NodeKind::Change));

        let leaf = root.find("variable[0]", NodeKind::Change).unwrap();
        assert_eq!(leaf.name, "[0]");
        assert_eq!(leaf.change_type, Some(ChangeType::Deleted));
    }

    #[test]
    fn test_entry_folders_are_relabeled() {
        let records = vec![
            record(ChangeType::Modified, "item[0].name", Some(r#"{"old":"Get User","new":"Get User V2"}"#)),
            record(ChangeType::Modified, "item[1].request.method", Some(r#"{"old":"GET","new":"PUT"}"#)),
        ];
        let root = build_hierarchy(&records);
        assert_eq!(root.find("item[0]", NodeKind::Folder).unwrap().name, "Get User V2");
        assert_eq!(root.find("item[1]", NodeKind::Folder).unwrap().name, "Entry 1");
        assert_eq!(root.find("item[1].request", NodeKind::Folder).unwrap().change_count, 1);
    }

    #[test]
    fn test_root_level_record_is_a_direct_leaf() {
        let root = build_hierarchy(&[record(ChangeType::Modified, "", None)]);
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].kind, NodeKind::Change);
        assert_eq!(root.children[0].name, ROOT_LABEL);
        assert_eq!(root.change_count, 1);
    }
}
