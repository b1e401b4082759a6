//! Core types, values, and persistent collections for shadowdb.
//!
//! This crate provides:
//! - [`Value`] - The typed tree holding every business field
//! - [`Record`] - An entity's named business fields
//! - [`Handle`] - Generational references into a store's entity arena
//! - [`FieldPath`] - Paths through nested values
//! - [`Type`] / [`RecordSchema`] - Explicit record definitions with zero values
//! - [`Error`] - Rich error types with context
//! - Persistent collections ([`LtVec`], [`LtMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
pub mod handle;
pub mod path;
pub mod record;
pub mod types;
pub mod value;

#[cfg(feature = "serde")]
mod serde_support;

pub use collections::{LtMap, LtVec, MAX_PADDING};
pub use error::{Error, ErrorContext, ErrorKind};
pub use handle::Handle;
pub use path::{FieldPath, PathSegment};
pub use record::Record;
pub use types::{FieldSchema, RecordSchema, Type};
pub use value::Value;

/// Result type alias using shadowdb's Error type.
pub type Result<T> = std::result::Result<T, Error>;
