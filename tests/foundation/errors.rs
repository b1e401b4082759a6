//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use shadowdb_foundation::{Error, ErrorContext, ErrorKind, FieldPath, Handle};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_unknown_type() {
    let err = Error::unknown_type("item");
    assert!(matches!(err.kind, ErrorKind::UnknownType(_)));
    assert!(format!("{err}").contains("item"));
}

#[test]
fn error_duplicate_type() {
    let err = Error::duplicate_type("item");
    assert!(matches!(err.kind, ErrorKind::DuplicateType(_)));
}

#[test]
fn error_no_sample() {
    let err = Error::no_sample("item");
    assert!(matches!(err.kind, ErrorKind::NoSample(ref n) if n == "item"));
}

#[test]
fn error_missing_metadata_names_handle() {
    let err = Error::new(ErrorKind::MissingMetadata(Handle::new(42, 1)));
    assert!(format!("{err}").contains("#42"));
}

#[test]
fn error_field_paths_display() {
    let path = FieldPath::parse("stats.slots.0");
    let err = Error::unreachable_field(&path);
    assert!(format!("{err}").contains("stats.slots.0"));

    let err = Error::invalid_field(&path);
    assert!(matches!(err.kind, ErrorKind::InvalidField(_)));
}

#[test]
fn error_stale_handle() {
    let err = Error::stale_handle(Handle::new(5, 2));
    assert!(matches!(err.kind, ErrorKind::StaleHandle(_)));
}

#[test]
fn error_serialization() {
    let err = Error::serialization("unexpected end of input");
    assert!(format!("{err}").contains("unexpected end"));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn error_with_context() {
    let err = Error::unknown_type("ghost").with_context(
        ErrorContext::new()
            .with_source("patch entry")
            .with_position(3),
    );

    let context = err.context.as_ref().unwrap();
    assert_eq!(context.position, Some(3));
    assert_eq!(context.to_string(), "in patch entry #3");
}

#[test]
fn error_context_frames() {
    let context = ErrorContext::new().with_frame("load").with_frame("commit");
    assert_eq!(context.stack, vec!["load".to_string(), "commit".to_string()]);
}
