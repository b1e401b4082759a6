//! Error types for shadowdb.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Every failure is synchronous and surfaces to the caller of the operation
//! that detected it; nothing is retried internally.

use std::fmt;

use thiserror::Error;

use crate::handle::Handle;
use crate::path::FieldPath;

/// The main error type for shadowdb operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an unknown type error.
    #[must_use]
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownType(name.into()))
    }

    /// Creates a duplicate type registration error.
    #[must_use]
    pub fn duplicate_type(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateType(name.into()))
    }

    /// Creates an error for a type with no template entity to allocate from.
    #[must_use]
    pub fn no_sample(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoSample(name.into()))
    }

    /// Creates a handle not found error.
    #[must_use]
    pub fn handle_not_found(handle: Handle) -> Self {
        Self::new(ErrorKind::HandleNotFound(handle))
    }

    /// Creates a stale handle error.
    #[must_use]
    pub fn stale_handle(handle: Handle) -> Self {
        Self::new(ErrorKind::StaleHandle(handle))
    }

    /// Creates an unreachable field error.
    #[must_use]
    pub fn unreachable_field(path: &FieldPath) -> Self {
        Self::new(ErrorKind::UnreachableField(path.clone()))
    }

    /// Creates an invalid field error.
    #[must_use]
    pub fn invalid_field(path: &FieldPath) -> Self {
        Self::new(ErrorKind::InvalidField(path.clone()))
    }

    /// Creates an invalid id error.
    #[must_use]
    pub fn invalid_id(id: u64) -> Self {
        Self::new(ErrorKind::InvalidId(id))
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SerializationError(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The entity has no tracking metadata bound to it.
    #[error("entity {0} has no tracking metadata")]
    MissingMetadata(Handle),

    /// Commit was called on an entity that has no modification index.
    #[error("entity {0} was committed without being opened (missing mod index)")]
    MissingModIndex(Handle),

    /// Commit was called on an entity that has no shadow snapshot.
    #[error("entity {0} was committed without being opened (missing original)")]
    MissingOriginal(Handle),

    /// The type name was never registered.
    #[error("unknown entity type: {0}")]
    UnknownType(String),

    /// The type name was already registered.
    #[error("entity type already registered: {0}")]
    DuplicateType(String),

    /// No live entity of the type exists to use as an allocation template.
    #[error("no existing entities of type {0} to allocate from")]
    NoSample(String),

    /// Handle does not refer to any slot in the store.
    #[error("entity not found: {0:?}")]
    HandleNotFound(Handle),

    /// Handle refers to a slot that has since been released.
    #[error("stale entity handle: {0:?}")]
    StaleHandle(Handle),

    /// The entity cannot be released back to the arena.
    #[error("entity {handle} cannot be released: {reason}")]
    NotReleasable {
        /// The entity that was asked to be released.
        handle: Handle,
        /// Why the release was refused.
        reason: &'static str,
    },

    /// A field along the path does not exist on the live entity.
    #[error("unreachable field: {0}")]
    UnreachableField(FieldPath),

    /// A field along the path does not have the structure the path requires.
    #[error("invalid field: {0}")]
    InvalidField(FieldPath),

    /// The id lies too far past the end of its collection to be placed.
    #[error("invalid entity id: {0}")]
    InvalidId(u64),

    /// Encoding or decoding a patch failed.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation or input that was being processed.
    pub source: Option<String>,
    /// Position within a batch (e.g. a patch entry index).
    pub position: Option<usize>,
    /// Chain of enclosing operations, innermost last.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source description.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the batch position.
    #[must_use]
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "in {source}")?;
            if let Some(position) = self.position {
                write!(f, " #{position}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
