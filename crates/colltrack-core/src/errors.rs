use colltrack_core_types::RequestId;
use thiserror::Error;

/// Result type alias using the canonical `ExError`
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable for programmatic handling,
/// tests, and the wire responses built by outer layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidInput,
    NotFound,

    // Diff
    /// A snapshot document could not be decoded; fatal to the whole diff call
    Decode,
    /// A shape-specific comparator could not proceed; always recovered internally
    UnsupportedShape,

    // Configuration
    Config,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Decode => "ERR_DECODE",
            ExErrorKind::UnsupportedShape => "ERR_UNSUPPORTED_SHAPE",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus context for
/// debugging (operation, entity, correlation id, message, cause).
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context (collection or snapshot id)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {:?}", self.code(), self.kind)?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for tracking operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    /// A snapshot document is not a well-formed JSON document
    #[error("Snapshot document could not be decoded ({side}): {reason}")]
    InvalidDocument { side: String, reason: String },

    /// A comparator met a value shape it cannot handle
    #[error("Unsupported shape at '{path}': {reason}")]
    UnsupportedShape { path: String, reason: String },

    /// Snapshot not found in the store
    #[error("Snapshot not found: {snapshot_id}")]
    SnapshotNotFound { snapshot_id: String },

    /// Source document could not be fetched
    #[error("Document not available: {external_id}")]
    DocumentUnavailable { external_id: String },

    /// Configuration file is malformed
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<TrackError> for ExError {
    fn from(err: TrackError) -> Self {
        let message = err.to_string();
        match err {
            TrackError::InvalidDocument { side, .. } => ExError::new(ExErrorKind::Decode)
                .with_op("decode_document")
                .with_entity_id(side)
                .with_message(message),

            TrackError::UnsupportedShape { path, .. } => {
                ExError::new(ExErrorKind::UnsupportedShape)
                    .with_entity_id(path)
                    .with_message(message)
            }

            TrackError::SnapshotNotFound { snapshot_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(snapshot_id)
                .with_message(message),

            TrackError::DocumentUnavailable { external_id } => ExError::new(ExErrorKind::Io)
                .with_op("fetch_document")
                .with_entity_id(external_id)
                .with_message(message),

            TrackError::InvalidConfig { .. } => ExError::new(ExErrorKind::Config)
                .with_op("load_config")
                .with_message(message),

            TrackError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(err: serde_json::Error) -> Self {
        TrackError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ExErrorKind::Decode, "ERR_DECODE"),
            (ExErrorKind::UnsupportedShape, "ERR_UNSUPPORTED_SHAPE"),
            (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
            (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
            (ExErrorKind::Config, "ERR_CONFIG"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_invalid_document_maps_to_decode() {
        let err: ExError = TrackError::InvalidDocument {
            side: "old".to_string(),
            reason: "EOF while parsing".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ExErrorKind::Decode);
        assert_eq!(err.entity_id(), Some("old"));
        assert!(err.message().contains("EOF while parsing"));
    }

    #[test]
    fn test_display_includes_code_op_and_source() {
        let cause = ExError::new(ExErrorKind::Io).with_message("disk gone");
        let err = ExError::new(ExErrorKind::Persistence)
            .with_op("insert_changes")
            .with_message("write failed")
            .with_source(cause);
        let text = err.to_string();
        assert!(text.starts_with("[ERR_PERSISTENCE]"));
        assert!(text.contains("insert_changes"));
        assert!(text.contains("disk gone"));
        assert!(err.source_error().is_some());
    }
}
