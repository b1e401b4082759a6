//! Integration tests for the patch wire format

use shadowdb_foundation::{ErrorKind, Record, Value};
use shadowdb_patch::{Patch, PatchEntry, dump, from_json, from_msgpack, to_json, to_msgpack};
use shadowdb_store::{Store, TypeDef};

fn edited_store() -> Store {
    let mut store = Store::new();
    store.register_type(TypeDef::new("item")).unwrap();
    let sword = store
        .insert("item", Record::new().with("name", "sword").with("qty", 1))
        .unwrap();

    // Opened and reverted: leaves a hole
    store.open(sword).unwrap();
    store.commit(sword).unwrap();

    let axe = store.allocate("item").unwrap();
    store.open(axe).unwrap().fields.set("name", "axe");
    store.commit(axe).unwrap();
    store
}

#[test]
fn dump_to_json_text() {
    let json = to_json(&dump(&edited_store())).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(
        parsed,
        serde_json::json!([null, {"id": 1, "name": "axe", "qty": 0, "_db": {"type": "item"}}])
    );
}

#[test]
fn json_carries_no_bookkeeping() {
    let json = to_json(&dump(&edited_store())).unwrap();
    assert!(!json.contains("shadow"));
    assert!(!json.contains("mod_index"));
    assert!(!json.contains("allocated"));
}

#[test]
fn json_from_another_writer() {
    let patch = from_json(
        r#"[{"_db":{"type":"item"},"id":3,"name":"bow","qty":2,"tags":["ranged"]}, null]"#,
    )
    .unwrap();

    assert_eq!(patch.len(), 2);
    let (position, entry) = patch.iter().next().unwrap();
    assert_eq!(position, 0);
    assert_eq!(entry.id, 3);
    assert_eq!(entry.fields.get("tags"), Some(&Value::from(vec!["ranged"])));
}

#[test]
fn msgpack_matches_json() {
    let patch = dump(&edited_store());
    let via_json = from_json(&to_json(&patch).unwrap()).unwrap();
    let via_msgpack = from_msgpack(&to_msgpack(&patch).unwrap()).unwrap();
    assert_eq!(via_json, via_msgpack);
}

#[test]
fn malformed_entry_is_rejected() {
    let err = from_json(r#"[{"id":"one","_db":{"type":"item"}}]"#).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SerializationError(_)));
}

#[test]
fn patch_built_by_hand() {
    let patch: Patch = vec![Some(PatchEntry::new("item", 2, Record::new().with("name", "x")))]
        .into_iter()
        .collect();
    assert_eq!(to_json(&patch).unwrap(), r#"[{"id":2,"name":"x","_db":{"type":"item"}}]"#);
}
