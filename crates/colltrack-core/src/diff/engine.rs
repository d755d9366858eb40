//! Tree diff engine.
//!
//! The entry points are [`diff`] (already decoded documents) and
//! [`diff_documents`] (raw snapshot bytes). A run has two phases:
//!
//! 1. a structural scan that short-circuits on the first key or identity-array
//!    member present on only one side (or a positional length mismatch);
//! 2. either a structural emission pass (only `added`/`deleted`) when the scan
//!    found something, or a full content comparison when it did not.
//!
//! Once the structure of a document moves, positional and content comparison
//! are unreliable, so modifications are left for the next snapshot pair.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde_json::Value;
use sha2::{Digest as _, Sha256};

use crate::colltrack_core_types::schema::{PHASE_CONTENT, PHASE_STRUCTURAL};
use crate::diff::model::{Change, ChangeType, DiffOptions, HASH_TOKEN_PREFIX};
use crate::errors::{ExError, Result, TrackError};
use crate::identity::{keyed_elements, CollectionItemIdentity, ItemIdentity};
use crate::ignore::IgnoreMatcher;
use crate::path::{join_index, join_key, PathSegment};

/// Decode raw snapshot bytes into a document tree.
///
/// # Errors
///
/// `Decode` when the bytes are not a well-formed JSON document.
pub fn decode_document(side: &str, bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(|e| {
        ExError::from(TrackError::InvalidDocument {
            side: side.to_string(),
            reason: e.to_string(),
        })
    })
}

/// Decode both snapshots and diff them.
///
/// Either the full change list is returned or an error; never a partial result.
///
/// # Errors
///
/// `Decode` when either side fails to decode.
pub fn diff_documents(old: &[u8], new: &[u8], options: &DiffOptions) -> Result<Vec<Change>> {
    let old = decode_document("old", old)?;
    let new = decode_document("new", new)?;
    Ok(diff(&old, &new, options))
}

/// Diff two document trees using the default collection identity rules.
pub fn diff(old: &Value, new: &Value, options: &DiffOptions) -> Vec<Change> {
    diff_with(old, new, options, &CollectionItemIdentity::default())
}

/// Diff two document trees with a caller-supplied identity resolver.
///
/// At most one record is kept per path. When an identity entry is replaced
/// at the same index (its key changes), the deletion of the old entry is
/// reported and the addition of the new one is not; the replacement only
/// becomes visible through the stored snapshot content.
pub fn diff_with(
    old: &Value,
    new: &Value,
    options: &DiffOptions,
    identity: &dyn ItemIdentity,
) -> Vec<Change> {
    let mut differ = TreeDiffer::new(options, identity);
    let mut segments = Vec::new();

    let structural = differ.has_structural_change(old, new, "", &mut segments, 0);
    if structural {
        differ.emit_structural(old, new, "", &mut segments, 0);
    } else {
        differ.compare_recursive(old, new, "", &mut segments, 0);
    }

    let changes = differ.acc.into_changes();
    tracing::debug!(
        diff_phase = if structural { PHASE_STRUCTURAL } else { PHASE_CONTENT },
        change_count = changes.len(),
        "diff complete"
    );
    changes
}

/// Serialize a value for storage, replacing it with a hash token when it is
/// larger than `threshold` bytes (0 disables hashing).
pub fn encode_payload(serialized: String, threshold: usize) -> String {
    if threshold > 0 && serialized.len() > threshold {
        let mut hasher = Sha256::new();
        hasher.update(serialized.as_bytes());
        format!("{}{}", HASH_TOKEN_PREFIX, hex::encode(hasher.finalize()))
    } else {
        serialized
    }
}

/// Call-scoped change list with path dedup and the `max_changes` bound.
struct Accumulator {
    changes: Vec<Change>,
    seen: HashSet<String>,
    max_changes: usize,
    hash_threshold: usize,
}

impl Accumulator {
    fn is_full(&self) -> bool {
        self.max_changes > 0 && self.changes.len() >= self.max_changes
    }

    /// First write for a path wins.
    fn push(&mut self, change_type: ChangeType, path: &str, serialized: Option<String>) {
        if self.is_full() || !self.seen.insert(path.to_string()) {
            return;
        }
        self.changes.push(Change {
            change_type,
            path: path.to_string(),
            modification: serialized.map(|s| encode_payload(s, self.hash_threshold)),
        });
    }

    fn into_changes(self) -> Vec<Change> {
        self.changes
    }
}

fn serialize(value: &Value) -> Option<String> {
    serde_json::to_string(value).ok()
}

fn serialize_pair(old: &Value, new: &Value) -> Option<String> {
    Some(format!(
        "{{\"old\":{},\"new\":{}}}",
        serialize(old)?,
        serialize(new)?
    ))
}

/// Result of matching the members of an identity array.
#[derive(Debug, Default)]
struct IdentityMatch {
    /// `(old_index, new_index)`, in new-array order
    pairs: Vec<(usize, usize)>,
    unmatched_old: Vec<usize>,
    unmatched_new: Vec<usize>,
}

struct TreeDiffer<'a> {
    options: &'a DiffOptions,
    identity: &'a dyn ItemIdentity,
    ignore: IgnoreMatcher,
    acc: Accumulator,
}

impl<'a> TreeDiffer<'a> {
    fn new(options: &'a DiffOptions, identity: &'a dyn ItemIdentity) -> Self {
        Self {
            options,
            identity,
            ignore: IgnoreMatcher::new(&options.ignore_paths),
            acc: Accumulator {
                changes: Vec::new(),
                seen: HashSet::new(),
                max_changes: options.max_changes,
                hash_threshold: options.hash_threshold,
            },
        }
    }

    fn depth_exceeded(&self, depth: usize) -> bool {
        self.options.max_depth > 0 && depth >= self.options.max_depth
    }

    fn too_wide(&self, old_len: usize, new_len: usize) -> bool {
        self.options.opaque_threshold > 0 && old_len.max(new_len) > self.options.opaque_threshold
    }

    fn ignored(&self, path: &str) -> bool {
        self.ignore.is_ignored(path)
    }

    fn match_identity(
        &self,
        old: &[Value],
        new: &[Value],
        path: &str,
    ) -> std::result::Result<IdentityMatch, TrackError> {
        if old.iter().chain(new).any(|v| !v.is_object()) {
            return Err(TrackError::UnsupportedShape {
                path: path.to_string(),
                reason: "identity array holds non-object elements".to_string(),
            });
        }

        let old_keys = keyed_elements(old, self.identity);
        let new_keys = keyed_elements(new, self.identity);
        let old_index: HashMap<&str, usize> = old_keys
            .iter()
            .enumerate()
            .filter(|(_, k)| !k.is_empty())
            .map(|(i, k)| (k.as_str(), i))
            .collect();
        let new_set: HashSet<&str> = new_keys
            .iter()
            .filter(|k| !k.is_empty())
            .map(String::as_str)
            .collect();

        let mut m = IdentityMatch::default();
        for (ni, key) in new_keys.iter().enumerate() {
            match old_index.get(key.as_str()) {
                Some(&oi) if !key.is_empty() => m.pairs.push((oi, ni)),
                _ => m.unmatched_new.push(ni),
            }
        }
        for (oi, key) in old_keys.iter().enumerate() {
            if key.is_empty() || !new_set.contains(key.as_str()) {
                m.unmatched_old.push(oi);
            }
        }
        Ok(m)
    }

    /// Identity matching with the opaque fallback for unsupported shapes.
    fn try_match_identity(&self, old: &[Value], new: &[Value], path: &str) -> Option<IdentityMatch> {
        match self.match_identity(old, new, path) {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "identity comparison falls back to opaque equality");
                None
            }
        }
    }

    // ── Phase 1: structural scan ─────────────────────────────────────────────

    fn has_structural_change(
        &self,
        old: &Value,
        new: &Value,
        path: &str,
        segs: &mut Vec<PathSegment>,
        depth: usize,
    ) -> bool {
        if old == new || self.depth_exceeded(depth) {
            return false;
        }

        match (old, new) {
            (Value::Object(a), Value::Object(b)) => {
                let one_sided = a
                    .keys()
                    .filter(|k| !b.contains_key(*k))
                    .chain(b.keys().filter(|k| !a.contains_key(*k)))
                    .any(|k| !self.ignored(&join_key(path, k)));
                if one_sided {
                    return true;
                }
                for (k, av) in a {
                    let Some(bv) = b.get(k) else { continue };
                    let child = join_key(path, k);
                    if self.ignored(&child) {
                        continue;
                    }
                    segs.push(PathSegment::Key(k.clone()));
                    let found = self.has_structural_change(av, bv, &child, segs, depth + 1);
                    segs.pop();
                    if found {
                        return true;
                    }
                }
                false
            }
            (Value::Array(a), Value::Array(b)) => {
                if self.identity.is_identity_array(segs) {
                    let Some(m) = self.try_match_identity(a, b, path) else {
                        return false;
                    };
                    let one_sided = m
                        .unmatched_old
                        .iter()
                        .chain(&m.unmatched_new)
                        .any(|&i| !self.ignored(&join_index(path, i)));
                    if one_sided {
                        return true;
                    }
                    m.pairs.iter().any(|&(oi, ni)| {
                        self.index_has_structural_change(&a[oi], &b[ni], path, ni, segs, depth)
                    })
                } else {
                    let common = a.len().min(b.len());
                    let longer = a.len().max(b.len());
                    if (common..longer).any(|i| !self.ignored(&join_index(path, i))) {
                        return true;
                    }
                    (0..common).any(|i| {
                        self.index_has_structural_change(&a[i], &b[i], path, i, segs, depth)
                    })
                }
            }
            _ => false,
        }
    }

    fn index_has_structural_change(
        &self,
        old: &Value,
        new: &Value,
        path: &str,
        index: usize,
        segs: &mut Vec<PathSegment>,
        depth: usize,
    ) -> bool {
        let child = join_index(path, index);
        if self.ignored(&child) {
            return false;
        }
        segs.push(PathSegment::Index(index));
        let found = self.has_structural_change(old, new, &child, segs, depth + 1);
        segs.pop();
        found
    }

    // ── Phase 2a: structural emission ────────────────────────────────────────

    fn emit_structural(
        &mut self,
        old: &Value,
        new: &Value,
        path: &str,
        segs: &mut Vec<PathSegment>,
        depth: usize,
    ) {
        if self.acc.is_full() || old == new || self.depth_exceeded(depth) {
            return;
        }

        match (old, new) {
            (Value::Object(a), Value::Object(b)) => {
                let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
                for k in keys {
                    let child = join_key(path, k);
                    if self.ignored(&child) {
                        continue;
                    }
                    match (a.get(k), b.get(k)) {
                        (Some(av), None) => {
                            self.acc.push(ChangeType::Deleted, &child, serialize(av))
                        }
                        (None, Some(bv)) => {
                            self.acc.push(ChangeType::Added, &child, serialize(bv))
                        }
                        (Some(av), Some(bv)) => {
                            segs.push(PathSegment::Key(k.clone()));
                            self.emit_structural(av, bv, &child, segs, depth + 1);
                            segs.pop();
                        }
                        (None, None) => {}
                    }
                }
            }
            (Value::Array(a), Value::Array(b)) => {
                if self.identity.is_identity_array(segs) {
                    let Some(m) = self.try_match_identity(a, b, path) else {
                        return;
                    };
                    self.emit_unmatched(a, b, &m, path);
                    for &(oi, ni) in &m.pairs {
                        self.descend_index(&a[oi], &b[ni], path, ni, segs, depth, Self::emit_structural);
                    }
                } else {
                    let common = a.len().min(b.len());
                    for i in 0..common {
                        self.descend_index(&a[i], &b[i], path, i, segs, depth, Self::emit_structural);
                    }
                    self.emit_trailing(a, b, path);
                }
            }
            _ => {}
        }
    }

    // ── Phase 2b: content comparison ─────────────────────────────────────────

    fn compare_recursive(
        &mut self,
        old: &Value,
        new: &Value,
        path: &str,
        segs: &mut Vec<PathSegment>,
        depth: usize,
    ) {
        if self.acc.is_full() || old == new {
            return;
        }
        if self.depth_exceeded(depth) {
            self.acc
                .push(ChangeType::Modified, path, serialize_pair(old, new));
            return;
        }

        match (old, new) {
            (Value::Object(a), Value::Object(b)) => {
                if self.too_wide(a.len(), b.len()) {
                    self.acc
                        .push(ChangeType::Modified, path, serialize_pair(old, new));
                    return;
                }
                for (k, av) in a {
                    let Some(bv) = b.get(k) else { continue };
                    let child = join_key(path, k);
                    if self.ignored(&child) {
                        continue;
                    }
                    segs.push(PathSegment::Key(k.clone()));
                    self.compare_recursive(av, bv, &child, segs, depth + 1);
                    segs.pop();
                }
            }
            (Value::Array(a), Value::Array(b)) => {
                if self.too_wide(a.len(), b.len()) {
                    self.acc
                        .push(ChangeType::Modified, path, serialize_pair(old, new));
                    return;
                }
                if self.identity.is_identity_array(segs) {
                    let Some(m) = self.try_match_identity(a, b, path) else {
                        self.acc
                            .push(ChangeType::Modified, path, serialize_pair(old, new));
                        return;
                    };
                    for &(oi, ni) in &m.pairs {
                        self.descend_index(&a[oi], &b[ni], path, ni, segs, depth, Self::compare_recursive);
                    }
                    self.emit_unmatched(a, b, &m, path);
                } else {
                    let common = a.len().min(b.len());
                    for i in 0..common {
                        self.descend_index(&a[i], &b[i], path, i, segs, depth, Self::compare_recursive);
                    }
                    self.emit_trailing(a, b, path);
                }
            }
            // scalar inequality or type mismatch
            _ => self
                .acc
                .push(ChangeType::Modified, path, serialize_pair(old, new)),
        }
    }

    // ── Shared helpers ───────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    fn descend_index(
        &mut self,
        old: &Value,
        new: &Value,
        path: &str,
        index: usize,
        segs: &mut Vec<PathSegment>,
        depth: usize,
        visit: fn(&mut Self, &Value, &Value, &str, &mut Vec<PathSegment>, usize),
    ) {
        let child = join_index(path, index);
        if self.ignored(&child) {
            return;
        }
        segs.push(PathSegment::Index(index));
        visit(self, old, new, &child, segs, depth + 1);
        segs.pop();
    }

    /// Unmatched old members are deleted at their original index, unmatched
    /// new members added at their new index.
    fn emit_unmatched(&mut self, old: &[Value], new: &[Value], m: &IdentityMatch, path: &str) {
        for &oi in &m.unmatched_old {
            let child = join_index(path, oi);
            if !self.ignored(&child) {
                self.acc
                    .push(ChangeType::Deleted, &child, serialize(&old[oi]));
            }
        }
        for &ni in &m.unmatched_new {
            let child = join_index(path, ni);
            if !self.ignored(&child) {
                self.acc.push(ChangeType::Added, &child, serialize(&new[ni]));
            }
        }
    }

    fn emit_trailing(&mut self, old: &[Value], new: &[Value], path: &str) {
        let common = old.len().min(new.len());
        for (i, v) in old.iter().enumerate().skip(common) {
            let child = join_index(path, i);
            if !self.ignored(&child) {
                self.acc.push(ChangeType::Deleted, &child, serialize(v));
            }
        }
        for (i, v) in new.iter().enumerate().skip(common) {
            let child = join_index(path, i);
            if !self.ignored(&child) {
                self.acc.push(ChangeType::Added, &child, serialize(v));
            }
        }
    }
}
