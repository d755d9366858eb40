//! File-system document source.

#![allow(clippy::result_large_err)]

use std::path::{Path, PathBuf};

use colltrack_core::collaborators::DocumentSource;
use colltrack_core::errors::{ExError, ExErrorKind, Result, TrackError};
use colltrack_store::errors::io_error;

/// Reads collection documents from files.
///
/// External ids are paths; relative ids resolve against `root`.
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    root: PathBuf,
}

impl FsDocumentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, external_id: &str) -> PathBuf {
        let path = Path::new(external_id);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl Default for FsDocumentSource {
    fn default() -> Self {
        Self::new(".")
    }
}

impl DocumentSource for FsDocumentSource {
    fn fetch(&self, external_id: &str) -> Result<Vec<u8>> {
        if external_id.is_empty() {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("fetch_document")
                .with_message("external id must not be empty"));
        }
        let path = self.resolve(external_id);
        std::fs::read(&path).map_err(|e| {
            ExError::from(TrackError::DocumentUnavailable {
                external_id: external_id.to_string(),
            })
            .with_source(io_error("read_document", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reads_relative_to_root() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("api.json"), b"{}").unwrap();
        let source = FsDocumentSource::new(dir.path());
        assert_eq!(source.fetch("api.json").unwrap(), b"{}".to_vec());
    }

    #[test]
    fn test_absolute_id_ignores_root() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("api.json");
        std::fs::write(&file, b"[]").unwrap();
        let source = FsDocumentSource::new("/nonexistent-root");
        assert_eq!(source.fetch(file.to_str().unwrap()).unwrap(), b"[]".to_vec());
    }

    #[test]
    fn test_missing_file_is_io_error_with_source() {
        let dir = TempDir::new().unwrap();
        let err = FsDocumentSource::new(dir.path()).fetch("gone.json").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Io);
        assert_eq!(err.entity_id(), Some("gone.json"));
        assert_eq!(err.source_error().map(|s| s.op()), Some(Some("read_document")));
    }

    #[test]
    fn test_empty_id_is_invalid_input() {
        let err = FsDocumentSource::default().fetch("").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }
}
