//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Record, FieldPath, Error, and persistent collections.

mod collections;
mod errors;
