//! Entity store with shadow-copy change tracking for shadowdb.
//!
//! This crate provides:
//! - [`Store`] - The store context: arena, collections, modified list, hooks
//! - [`TypeDef`] / [`Collection`] - Type registration and per-type identity slots
//! - Entity factory operations ([`Store::allocate`], [`Store::clone_entity`])
//! - Change tracking ([`Store::open`], [`Store::commit`], [`Store::set_org_field`])
//! - [`StoreConfig`] - Diff behavior and identity allocation settings
//!
//! # Example
//!
//! ```
//! use shadowdb_foundation::Record;
//! use shadowdb_store::{Store, TypeDef};
//!
//! let mut store = Store::new();
//! store.register_type(TypeDef::new("item")).unwrap();
//! store.insert("item", Record::new().with("name", "sword").with("qty", 1)).unwrap();
//!
//! let axe = store.allocate("item").unwrap();
//! store.open(axe).unwrap().fields.set("name", "axe");
//! assert!(store.commit(axe).unwrap());
//! assert_eq!(store.get(axe).unwrap().id, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod arena;
pub mod config;
pub mod entity;
pub mod factory;
pub mod hooks;
pub mod registry;
pub mod store;
pub mod tracker;

pub use config::{DiffMode, StoreConfig};
pub use entity::{Entity, Snapshot};
pub use factory::new_obj;
pub use hooks::CommitHooks;
pub use registry::{Collection, InitHook, MAX_ID_GAP, PendingInit, TypeDef, TypeRegistry};
pub use store::Store;

pub use shadowdb_foundation::{Error, ErrorKind, FieldPath, Handle, Record, Result, Value};
