//! Ignore-path matching.
//!
//! A pattern matches a path when it is equal to it, when it contains `**` and
//! the path starts with the text before the first `**` and ends with the text
//! after it, or, otherwise, when the escaped pattern (with `[*]` standing for
//! any index) matches the whole path.

use regex::Regex;

#[derive(Debug, Clone)]
enum Pattern {
    Exact(String),
    Glob { prefix: String, suffix: String },
    Indexed { raw: String, regex: Regex },
}

impl Pattern {
    fn compile(raw: &str) -> Self {
        if let Some((prefix, suffix)) = raw.split_once("**") {
            return Pattern::Glob {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            };
        }
        if raw.contains("[*]") {
            let body = regex::escape(raw).replace(r"\[\*\]", r"\[\d+\]");
            if let Ok(regex) = Regex::new(&format!("^{}$", body)) {
                return Pattern::Indexed {
                    raw: raw.to_string(),
                    regex,
                };
            }
        }
        Pattern::Exact(raw.to_string())
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Exact(p) => p == path,
            Pattern::Glob { prefix, suffix } => {
                path.len() >= prefix.len() + suffix.len()
                    && path.starts_with(prefix.as_str())
                    && path.ends_with(suffix.as_str())
            }
            Pattern::Indexed { raw, regex } => raw == path || regex.is_match(path),
        }
    }
}

/// A precompiled, ordered list of ignore patterns.
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    patterns: Vec<Pattern>,
}

impl IgnoreMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        Self {
            patterns: patterns
                .iter()
                .map(|p| Pattern::compile(p.as_ref()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// First matching pattern wins.
    pub fn is_ignored(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}

/// One-shot form of [`IgnoreMatcher::is_ignored`].
pub fn should_ignore<S: AsRef<str>>(path: &str, patterns: &[S]) -> bool {
    IgnoreMatcher::new(patterns).is_ignored(path)
}
