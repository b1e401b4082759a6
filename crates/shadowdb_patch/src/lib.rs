//! Patch export and replay for shadowdb stores.
//!
//! This crate provides:
//! - [`Patch`] / [`PatchEntry`] - The wire projection of a store's open entities
//! - [`dump`] / [`load`] - Export from one store and replay into another
//! - JSON and `MessagePack` encodings of a patch ([`to_json`], [`to_msgpack`])
//!
//! # Example
//!
//! ```
//! use shadowdb_foundation::{Record, Value};
//! use shadowdb_store::{Store, TypeDef};
//!
//! let mut editor = Store::new();
//! editor.register_type(TypeDef::new("item")).unwrap();
//! let sword = editor.insert("item", Record::new().with("name", "sword")).unwrap();
//! editor.open(sword).unwrap().fields.set("name", "rusty sword");
//! editor.commit(sword).unwrap();
//!
//! let json = shadowdb_patch::to_json(&shadowdb_patch::dump(&editor)).unwrap();
//!
//! let mut backend = Store::new();
//! backend.register_type(TypeDef::new("item")).unwrap();
//! let patch = shadowdb_patch::from_json(&json).unwrap();
//! shadowdb_patch::load(&mut backend, &patch).unwrap();
//!
//! let loaded = backend.lookup("item", 0).unwrap().unwrap();
//! assert_eq!(backend.get(loaded).unwrap().fields.get("name"), Some(&Value::from("rusty sword")));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod codec;
pub mod encoding;
pub mod patch;

pub use codec::{dump, load};
pub use encoding::{from_json, from_msgpack, to_json, to_msgpack};
pub use patch::{Patch, PatchEntry, PatchMeta};
