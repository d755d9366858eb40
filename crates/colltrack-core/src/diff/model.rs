//! Tree diff output types and options.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{ExError, ExErrorKind};

/// Default serialized size (bytes) above which a payload is replaced by a hash token.
pub const DEFAULT_HASH_THRESHOLD: usize = 4096;

/// Default element count above which an object or array is compared opaquely.
pub const DEFAULT_OPAQUE_THRESHOLD: usize = 1000;

/// Prefix of hash tokens stored in place of oversized payloads.
pub const HASH_TOKEN_PREFIX: &str = "sha256:";

/// Kind of a single path-addressed difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Deleted,
    Modified,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "added",
            ChangeType::Deleted => "deleted",
            ChangeType::Modified => "modified",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeType {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "added" => Ok(ChangeType::Added),
            "deleted" => Ok(ChangeType::Deleted),
            "modified" => Ok(ChangeType::Modified),
            other => Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("parse_change_type")
                .with_message(format!("unknown change type '{}'", other))),
        }
    }
}

/// One difference produced by the differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub change_type: ChangeType,
    pub path: String,
    /// Serialized value (new for additions, old for deletions,
    /// `{"old":..,"new":..}` for modifications) or a hash token.
    pub modification: Option<String>,
}

/// Options controlling a single diff call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Maximum recursion depth; 0 means unlimited.
    pub max_depth: usize,
    /// Maximum number of changes emitted; 0 means unlimited.
    pub max_changes: usize,
    /// Paths excluded from every phase (exact, `**` glob, or `[*]` index wildcard).
    pub ignore_paths: Vec<String>,
    /// Serialized payload size above which a hash token is stored instead.
    pub hash_threshold: usize,
    /// Informational only; callers use it to pick a compact rendering.
    pub compact: bool,
    /// Objects/arrays with more entries than this are compared opaquely; 0 disables.
    pub opaque_threshold: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            max_depth: 0,
            max_changes: 0,
            ignore_paths: Vec::new(),
            hash_threshold: DEFAULT_HASH_THRESHOLD,
            compact: false,
            opaque_threshold: DEFAULT_OPAQUE_THRESHOLD,
        }
    }
}

/// True when a stored modification payload is a hash token.
pub fn is_hash_token(modification: &str) -> bool {
    modification
        .strip_prefix(HASH_TOKEN_PREFIX)
        .is_some_and(|hex| hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}
