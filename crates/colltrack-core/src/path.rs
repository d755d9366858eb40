//! Canonical textual addressing of locations inside a document tree.
//!
//! Paths are built from dotted keys (`info.name`), bracketed indices
//! (`item[3]`) and quoted bracket accessors for keys that would otherwise be
//! ambiguous (`variable["base.url"]`). The root of the document is the empty
//! path.

use serde::Serialize;
use std::fmt;

/// Characters that force a key to be rendered as a quoted bracket accessor.
const SPECIAL_CHARS: &[char] = &['.', '[', ']', '(', ')', '*', '?', '+', '\\', '^', '$', '|', '"'];

/// One token of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(k) => Some(k),
            PathSegment::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(i) => Some(*i),
            PathSegment::Key(_) => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// True when `key` is an array index token such as `[12]`.
pub fn is_index_token(key: &str) -> bool {
    key.len() > 2
        && key.starts_with('[')
        && key.ends_with(']')
        && key[1..key.len() - 1].bytes().all(|b| b.is_ascii_digit())
}

fn needs_quoting(key: &str) -> bool {
    key.is_empty() || key.contains(SPECIAL_CHARS)
}

fn quote(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    out.push_str("[\"");
    for ch in key.chars() {
        if ch == '\\' || ch == '"' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push_str("\"]");
    out
}

/// Append `key` to `base`.
///
/// An index token (`[n]`) is concatenated directly; keys containing
/// characters that need disambiguation are quoted; anything else is
/// dot-appended.
pub fn join(base: &str, key: &str) -> String {
    if is_index_token(key) {
        return format!("{}{}", base, key);
    }
    join_key(base, key)
}

/// Append an object key; never interprets the key as an index token.
pub fn join_key(base: &str, key: &str) -> String {
    if needs_quoting(key) {
        format!("{}{}", base, quote(key))
    } else if base.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", base, key)
    }
}

/// Append an array index.
pub fn join_index(base: &str, index: usize) -> String {
    format!("{}[{}]", base, index)
}

/// Append a typed segment.
pub fn join_segment(base: &str, segment: &PathSegment) -> String {
    match segment {
        PathSegment::Key(k) => join_key(base, k),
        PathSegment::Index(i) => join_index(base, *i),
    }
}

/// Render a segment list back into its canonical path string.
pub fn from_segments(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .fold(String::new(), |acc, seg| join_segment(&acc, seg))
}

/// Tokenize a path into keys and indices.
///
/// Bracket boundaries are respected, so dots inside a quoted accessor do not
/// split the key.
pub fn segments(path: &str) -> Vec<PathSegment> {
    let chars: Vec<char> = path.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '.' => i += 1,
            '[' if chars.get(i + 1) == Some(&'"') => {
                i += 2;
                let mut key = String::new();
                while i < chars.len() {
                    match chars[i] {
                        '\\' if i + 1 < chars.len() => {
                            key.push(chars[i + 1]);
                            i += 2;
                        }
                        '"' => break,
                        ch => {
                            key.push(ch);
                            i += 1;
                        }
                    }
                }
                // closing quote and bracket
                i += 1;
                if chars.get(i) == Some(&']') {
                    i += 1;
                }
                out.push(PathSegment::Key(key));
            }
            '[' => {
                i += 1;
                let start = i;
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
                let inner: String = chars[start..i].iter().collect();
                i += 1;
                match inner.parse::<usize>() {
                    Ok(n) => out.push(PathSegment::Index(n)),
                    Err(_) => out.push(PathSegment::Key(inner)),
                }
            }
            _ => {
                let start = i;
                while i < chars.len() && chars[i] != '.' && chars[i] != '[' {
                    i += 1;
                }
                out.push(PathSegment::Key(chars[start..i].iter().collect()));
            }
        }
    }

    out
}

/// The last key segment of a path, skipping trailing indices.
pub fn last_key(segments: &[PathSegment]) -> Option<&str> {
    segments.iter().rev().find_map(PathSegment::as_key)
}
