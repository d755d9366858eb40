use colltrack_core::errors::{ExError, ExErrorKind, TrackError};
use colltrack_core_types::RequestId;

#[test]
fn test_snapshot_not_found_verifiable_by_kind() {
    let ex_err: ExError = TrackError::SnapshotNotFound {
        snapshot_id: "unknown".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.code(), "ERR_NOT_FOUND");
    assert_eq!(ex_err.entity_id(), Some("unknown"));
}

#[test]
fn test_invalid_document_is_decode() {
    let ex_err: ExError = TrackError::InvalidDocument {
        side: "new".to_string(),
        reason: "EOF while parsing".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::Decode);
    assert_eq!(ex_err.op(), Some("decode_document"));
    assert!(ex_err.message().contains("EOF while parsing"));
}

#[test]
fn test_unsupported_shape_keeps_path() {
    let ex_err: ExError = TrackError::UnsupportedShape {
        path: "item".to_string(),
        reason: "scalar members".to_string(),
    }
    .into();
    assert_eq!(ex_err.kind(), ExErrorKind::UnsupportedShape);
    assert_eq!(ex_err.entity_id(), Some("item"));
}

#[test]
fn test_document_unavailable_is_io() {
    let ex_err: ExError = TrackError::DocumentUnavailable {
        external_id: "col-9".to_string(),
    }
    .into();
    assert_eq!(ex_err.kind(), ExErrorKind::Io);
    assert_eq!(ex_err.code(), "ERR_IO");
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::Decode, "ERR_DECODE"),
        (ExErrorKind::UnsupportedShape, "ERR_UNSUPPORTED_SHAPE"),
        (ExErrorKind::Config, "ERR_CONFIG"),
        (ExErrorKind::Io, "ERR_IO"),
        (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

#[test]
fn test_builder_context_and_source_chain() {
    let cause = ExError::new(ExErrorKind::Io).with_message("permission denied");
    let request_id = RequestId::new();
    let err = ExError::new(ExErrorKind::Persistence)
        .with_op("insert_changes")
        .with_entity_id("col-1")
        .with_request_id(request_id.clone())
        .with_message("write failed")
        .with_source(cause);

    assert_eq!(err.op(), Some("insert_changes"));
    assert_eq!(err.request_id(), Some(&request_id));
    assert_eq!(err.source_error().map(|s| s.kind()), Some(ExErrorKind::Io));

    let rendered = err.to_string();
    assert!(rendered.contains("ERR_PERSISTENCE"));
    assert!(rendered.contains("insert_changes"));
    assert!(rendered.contains("permission denied"));
}
