//! Integration tests for dump/load round trips

use proptest::prelude::*;
use shadowdb_foundation::{ErrorKind, Record, Value};
use shadowdb_patch::{dump, from_json, load, to_json};
use shadowdb_store::{Store, TypeDef};
use std::cell::Cell;
use std::rc::Rc;

fn registered() -> Store {
    let mut store = Store::new();
    store.register_type(TypeDef::new("item")).unwrap();
    store.register_type(TypeDef::new("npc")).unwrap();
    store
}

fn seeded() -> Store {
    let mut store = registered();
    store
        .insert("item", Record::new().with("name", "sword").with("qty", 1))
        .unwrap();
    store
        .insert("npc", Record::new().with("name", "guard").with("hp", 10))
        .unwrap();
    store
}

fn fields_of(store: &Store, type_name: &str, id: u64) -> Record {
    let h = store.lookup(type_name, id).unwrap().unwrap();
    store.get(h).unwrap().fields.clone()
}

#[test]
fn edits_reach_a_fresh_store() {
    let mut editor = seeded();
    let guard = editor.lookup("npc", 0).unwrap().unwrap();
    editor.open(guard).unwrap().fields.set("hp", 7);
    editor.commit(guard).unwrap();

    let bow = editor.allocate("item").unwrap();
    editor.open(bow).unwrap().fields.set("name", "bow");
    editor.commit(bow).unwrap();

    let mut backend = registered();
    load(&mut backend, &from_json(&to_json(&dump(&editor)).unwrap()).unwrap()).unwrap();

    assert_eq!(fields_of(&backend, "npc", 0), fields_of(&editor, "npc", 0));
    assert_eq!(fields_of(&backend, "item", 1), fields_of(&editor, "item", 1));
}

#[test]
fn edits_reach_a_store_with_the_same_seed() {
    let mut editor = seeded();
    let sword = editor.lookup("item", 0).unwrap().unwrap();
    editor.open(sword).unwrap().fields.set("qty", 4);
    editor.commit(sword).unwrap();

    let mut backend = seeded();
    let backend_sword = backend.lookup("item", 0).unwrap().unwrap();
    load(&mut backend, &dump(&editor)).unwrap();

    // Updated in place, not duplicated
    assert_eq!(backend.get(backend_sword).unwrap().fields.get("qty"), Some(&Value::Int(4)));
    assert_eq!(backend.collection("item").unwrap().live_count(), 1);
}

#[test]
fn loaded_entities_are_open_in_the_receiver() {
    let mut editor = seeded();
    let sword = editor.lookup("item", 0).unwrap().unwrap();
    editor.open(sword).unwrap().fields.set("qty", 4);
    editor.commit(sword).unwrap();

    let mut backend = seeded();
    load(&mut backend, &dump(&editor)).unwrap();

    // The receiver can forward the same change
    let forwarded = dump(&backend);
    assert_eq!(forwarded.iter().count(), 1);
}

#[test]
fn load_notifies_observers() {
    let mut editor = seeded();
    let sword = editor.lookup("item", 0).unwrap().unwrap();
    editor.open(sword).unwrap().fields.set("qty", 4);
    editor.commit(sword).unwrap();

    let mut backend = seeded();
    let commits = Rc::new(Cell::new(0));
    let seen = Rc::clone(&commits);
    backend.on_commit(move |_| seen.set(seen.get() + 1));

    load(&mut backend, &dump(&editor)).unwrap();
    assert_eq!(commits.get(), 1);
}

#[test]
fn unregistered_type_fails_load() {
    let mut editor = seeded();
    let guard = editor.lookup("npc", 0).unwrap().unwrap();
    editor.open(guard).unwrap().fields.set("hp", 1);
    editor.commit(guard).unwrap();

    let mut backend = Store::new();
    backend.register_type(TypeDef::new("item")).unwrap();

    let Err(err) = load(&mut backend, &dump(&editor)) else {
        panic!("load of an unregistered type succeeded");
    };
    assert!(matches!(err.kind, ErrorKind::UnknownType(ref n) if n == "npc"));
    assert_eq!(err.context.and_then(|c| c.position), Some(0));
}

#[test]
fn edited_seed_forwards_through_backend_to_mirror() {
    let mut editor = seeded();
    let sword = editor.lookup("item", 0).unwrap().unwrap();
    editor.open(sword).unwrap().fields.set("name", "rusty sword");
    editor.commit(sword).unwrap();

    // Neither the backend nor the mirror has a seed at id 0
    let mut backend = registered();
    load(&mut backend, &from_json(&to_json(&dump(&editor)).unwrap()).unwrap()).unwrap();

    let forwarded = dump(&backend);
    assert_eq!(forwarded.iter().count(), 1);

    let mut mirror = registered();
    load(&mut mirror, &from_json(&to_json(&forwarded).unwrap()).unwrap()).unwrap();
    assert_eq!(
        fields_of(&mirror, "item", 0),
        Record::new().with("name", "rusty sword").with("qty", 1)
    );
}

#[test]
fn out_of_range_id_fails_load() {
    let patch = from_json(r#"[{"id":18446744073709551615,"name":"x","_db":{"type":"item"}}]"#)
        .unwrap();
    let mut backend = registered();

    let Err(err) = load(&mut backend, &patch) else {
        panic!("load of an out-of-range id succeeded");
    };
    assert!(matches!(err.kind, ErrorKind::InvalidId(u64::MAX)));
    assert_eq!(backend.entity_count(), 0);
}

proptest! {
    #[test]
    fn round_trip_reproduces_fields(
        edits in prop::collection::vec(("[a-z]{1,6}", 0i64..100), 1..12)
    ) {
        let mut editor = seeded();
        for (name, qty) in &edits {
            let h = editor.allocate("item").unwrap();
            let entity = editor.open(h).unwrap();
            entity.fields.set("name", name.as_str());
            entity.fields.set("qty", *qty);
            editor.commit(h).unwrap();
        }

        let patch = dump(&editor);
        let mut backend = registered();
        load(&mut backend, &from_json(&to_json(&patch).unwrap()).unwrap()).unwrap();

        for (_, entry) in patch.iter() {
            prop_assert_eq!(&fields_of(&backend, entry.type_name(), entry.id), &entry.fields);
        }
    }
}
