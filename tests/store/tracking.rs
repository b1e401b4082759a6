//! Integration tests for open/commit change tracking

use shadowdb_foundation::{ErrorKind, FieldPath, Record, Value};
use shadowdb_store::{DiffMode, Entity, Store, StoreConfig, TypeDef};
use std::cell::RefCell;
use std::rc::Rc;

fn seeded_with(config: StoreConfig) -> Store {
    let mut store = Store::with_config(config);
    store.register_type(TypeDef::new("item")).unwrap();
    store
        .insert("item", Record::new().with("name", "sword").with("qty", 1))
        .unwrap();
    store
}

fn seeded() -> Store {
    seeded_with(StoreConfig::default())
}

fn record_commits(store: &mut Store) -> Rc<RefCell<Vec<(u64, String)>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    store.on_commit(move |e: &Entity| {
        let name = e.fields.get("name").and_then(Value::as_str).unwrap_or("").to_string();
        sink.borrow_mut().push((e.id, name));
    });
    log
}

// =============================================================================
// Worked Example
// =============================================================================

#[test]
fn sword_and_axe() {
    let mut store = seeded();

    let axe = store.allocate("item").unwrap();
    assert_eq!(
        store.get(axe).unwrap().fields,
        Record::new().with("name", "").with("qty", 0)
    );

    store.open(axe).unwrap().fields.set("name", "axe");
    assert!(store.commit(axe).unwrap());

    let entity = store.get(axe).unwrap();
    assert_eq!(entity.id, 1);
    assert_eq!(entity.fields, Record::new().with("name", "axe").with("qty", 0));
    assert_eq!(store.lookup("item", 1).unwrap(), Some(axe));
}

// =============================================================================
// Change Detection
// =============================================================================

#[test]
fn untouched_allocation_leaves_no_trace() {
    let mut store = seeded();
    let log = record_commits(&mut store);
    let h = store.allocate("item").unwrap();

    store.open(h).unwrap();
    assert!(!store.commit(h).unwrap());

    assert_eq!(store.get(h).unwrap().id, 0);
    assert_eq!(store.modified_slots(), &[None]);
    assert_eq!(store.collection("item").unwrap().live_count(), 1);
    // Observers still hear about it
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn edits_reach_observers_once() {
    let mut store = seeded();
    let log = record_commits(&mut store);
    let sword = store.lookup("item", 0).unwrap().unwrap();

    store.open(sword).unwrap().fields.set("name", "rusty sword");
    assert!(store.commit(sword).unwrap());

    assert_eq!(*log.borrow(), vec![(0, "rusty sword".to_string())]);
}

#[test]
fn nested_edit_is_a_change() {
    let mut store = seeded();
    let sword = store.lookup("item", 0).unwrap().unwrap();
    let stats: Value = [("hp", Value::Int(1))].into_iter().collect();
    store.get_mut(sword).unwrap().fields.set("stats", stats);

    let entity = store.open(sword).unwrap();
    let bumped: Value = [("hp", Value::Int(2))].into_iter().collect();
    entity.fields.set("stats", bumped);

    assert!(store.commit(sword).unwrap());
}

#[test]
fn removed_field_needs_symmetric_mode() {
    let mut lenient = seeded();
    let sword = lenient.lookup("item", 0).unwrap().unwrap();
    lenient.open(sword).unwrap().fields.remove("qty");
    assert!(!lenient.commit(sword).unwrap());

    let mut strict = seeded_with(StoreConfig::strict());
    assert_eq!(strict.config().diff_mode, DiffMode::Symmetric);
    let sword = strict.lookup("item", 0).unwrap().unwrap();
    strict.open(sword).unwrap().fields.remove("qty");
    assert!(strict.commit(sword).unwrap());
}

#[test]
fn slot_zero_goes_to_allocations_without_reservation() {
    let mut store = Store::with_config(StoreConfig::default().with_reserve_slot_zero(false));
    let schema = shadowdb_foundation::RecordSchema::new()
        .with_field(shadowdb_foundation::FieldSchema::new("name", shadowdb_foundation::Type::String));
    store
        .register_type(TypeDef::new("item").with_schema(schema))
        .unwrap();

    let h = store.allocate("item").unwrap();
    store.open(h).unwrap().fields.set("name", "first");
    assert!(store.commit(h).unwrap());
    assert_eq!(store.lookup("item", 0).unwrap(), Some(h));

    // Still counted once on later commits
    store.get_mut(h).unwrap().fields.set("name", "renamed");
    assert!(store.commit(h).unwrap());
    assert_eq!(store.collection("item").unwrap().len(), 1);
}

#[test]
fn first_allocation_skips_slot_zero_when_reserved() {
    let mut store = Store::new();
    let schema = shadowdb_foundation::RecordSchema::new()
        .with_field(shadowdb_foundation::FieldSchema::new("name", shadowdb_foundation::Type::String));
    store
        .register_type(TypeDef::new("item").with_schema(schema))
        .unwrap();

    let h = store.allocate("item").unwrap();
    store.open(h).unwrap().fields.set("name", "first");
    store.commit(h).unwrap();

    assert_eq!(store.get(h).unwrap().id, 1);
    assert_eq!(store.lookup("item", 0).unwrap(), None);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn commit_before_open_fails_cleanly() {
    let mut store = seeded();
    let log = record_commits(&mut store);
    let sword = store.lookup("item", 0).unwrap().unwrap();

    let err = store.commit(sword).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingModIndex(_)));
    assert!(log.borrow().is_empty());
}

#[test]
fn pushed_entities_need_binding() {
    let mut store = seeded();
    let raw = store.push("item", Record::new().with("name", "raw")).unwrap();

    assert!(matches!(store.open(raw).unwrap_err().kind, ErrorKind::MissingMetadata(_)));

    store.init_entity("item", raw).unwrap();
    store.open(raw).unwrap();
    assert!(!store.commit(raw).unwrap());
}

// =============================================================================
// Original Field Seeding
// =============================================================================

#[test]
fn seeding_before_open_changes_nothing() {
    let mut store = seeded();
    let sword = store.lookup("item", 0).unwrap().unwrap();
    store.get_mut(sword).unwrap().fields.set("owner", "guard");

    store.set_org_field(sword, "owner", "nobody").unwrap();

    store.open(sword).unwrap();
    assert!(!store.commit(sword).unwrap());
}

#[test]
fn seeding_hides_runtime_nested_field() {
    let mut store = seeded();
    let log = record_commits(&mut store);
    let sword = store.lookup("item", 0).unwrap().unwrap();

    let slots: Value = [("slots", Value::from(vec![3, 4]))].into_iter().collect();
    store.open(sword).unwrap().fields.set("inventory", slots);

    store
        .set_org_field(sword, FieldPath::parse("inventory.slots.0"), 3)
        .unwrap();
    // Second index still differs, so the entity stays open
    assert!(store.is_open(sword).unwrap());

    store
        .set_org_field(sword, FieldPath::parse("inventory.slots.1"), 4)
        .unwrap();
    assert!(!store.is_open(sword).unwrap());
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn seeding_bad_paths() {
    let mut store = seeded();
    let sword = store.lookup("item", 0).unwrap().unwrap();
    store.open(sword).unwrap();

    let err = store
        .set_org_field(sword, FieldPath::parse("nowhere.deep"), 1)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnreachableField(_)));

    let err = store
        .set_org_field(sword, FieldPath::parse("name.first"), 1)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidField(_)));

    // Failed seeding leaves the entity open
    assert!(store.is_open(sword).unwrap());
}

#[test]
fn seeding_far_past_sequence_end_fails() {
    let mut store = seeded();
    let sword = store.lookup("item", 0).unwrap().unwrap();
    store.open(sword).unwrap().fields.set("list", vec![1, 2]);

    let err = store
        .set_org_field(sword, FieldPath::parse("list.1000000000"), 3)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidField(_)));
    assert!(store.is_open(sword).unwrap());
}
