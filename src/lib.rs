//! shadowdb - In-memory entity store with shadow-copy change tracking
//!
//! This crate re-exports all layers of shadowdb for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: shadowdb_patch      — Patch export, replay, JSON/MessagePack
//! Layer 1: shadowdb_store      — Types, factory, open/commit tracking, hooks
//! Layer 0: shadowdb_foundation — Core types (Value, Record, Handle, Error)
//! ```

pub use shadowdb_foundation as foundation;
pub use shadowdb_patch as patch;
pub use shadowdb_store as store;
