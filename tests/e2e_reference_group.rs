//! End-to-end tests for Reference navigation and ReferenceGroup assembly.
//!
//! Each test builds a small graph against MemoryGraph, constructs keys the
//! way a schema bootstrap would, and exercises the grouped read/write path.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use graphkey::{
    Error, GraphObject, MemoryGraph, Navigation, Property, PropertyGroup, PropertyKey, PropertyMap,
    Reference, ReferenceGroup, Value,
};

fn owner_group() -> ReferenceGroup {
    ReferenceGroup::new(
        "owner",
        "Ownership",
        vec![Reference::new(
            Arc::new(Property::generic("name")),
            Navigation::FromStart,
            Arc::new(Property::string("name")),
        )],
    )
}

// ============================================================================
// 1. Read a grouped value through the navigation
// ============================================================================

#[test]
fn test_grouped_read_from_start_node() {
    let graph = MemoryGraph::new();
    let alice = graph.create_node("Person");
    alice.set_raw("name", Value::from("Alice")).unwrap();
    let thing = graph.create_node("Thing");
    let rel = graph.create_relationship(&alice.uuid(), &thing.uuid(), "OWNS").unwrap();

    let group = owner_group();
    let props = group.grouped_properties(&graph, &rel).unwrap().unwrap();

    assert_eq!(props.len(), 1);
    assert_eq!(props.get_by_json_name("name"), Some(&Value::from("Alice")));
}

// ============================================================================
// 2. Write a grouped value back through the navigation
// ============================================================================

#[test]
fn test_grouped_write_mutates_referenced_entity() {
    let graph = MemoryGraph::new();
    let alice = graph.create_node("Person");
    alice.set_raw("name", Value::from("Alice")).unwrap();
    let thing = graph.create_node("Thing");
    let rel = graph.create_relationship(&alice.uuid(), &thing.uuid(), "OWNS").unwrap();

    let group = owner_group();
    let mut values = PropertyMap::new();
    values.put(Arc::new(Property::generic("name")), Value::from("Bob"));

    group.set_grouped_properties(&graph, &values, &rel).unwrap();

    assert_eq!(alice.raw("name"), Some(Value::from("Bob")));
}

// ============================================================================
// 3. Read-then-write round trip is idempotent
// ============================================================================

#[test]
fn test_grouped_round_trip_is_idempotent() {
    let graph = MemoryGraph::new();
    let alice = graph.create_node("Person");
    alice.set_raw("name", Value::from("Alice")).unwrap();
    let thing = graph.create_node("Thing");
    let rel = graph.create_relationship(&alice.uuid(), &thing.uuid(), "OWNS").unwrap();

    let group = owner_group();

    for _ in 0..2 {
        let read = group.grouped_properties(&graph, &rel).unwrap().unwrap();
        group.set_grouped_properties(&graph, &read, &rel).unwrap();
        assert_eq!(alice.raw("name"), Some(Value::from("Alice")));
    }
}

// ============================================================================
// 4. Dangling relationship: omitted on read, no-op on write
// ============================================================================

#[test]
fn test_dangling_endpoint_omits_entry_on_read() {
    let graph = MemoryGraph::new();
    let alice = graph.create_node("Person");
    let thing = graph.create_node("Thing");
    let rel = graph.create_relationship(&alice.uuid(), &thing.uuid(), "OWNS").unwrap();
    graph.delete_node(&alice.uuid());

    let group = owner_group();
    let props = group.grouped_properties(&graph, &rel).unwrap().unwrap();

    // No "name" entry — absent, not null.
    assert!(props.is_empty());
    assert_eq!(props.get_by_json_name("name"), None);
}

#[test]
fn test_dangling_endpoint_write_succeeds_without_mutation() {
    let graph = MemoryGraph::new();
    let alice = graph.create_node("Person");
    let thing = graph.create_node("Thing");
    let rel = graph.create_relationship(&alice.uuid(), &thing.uuid(), "OWNS").unwrap();
    graph.delete_node(&alice.uuid());

    let group = owner_group();
    let mut values = PropertyMap::new();
    values.put(Arc::new(Property::generic("name")), Value::from("Bob"));

    // Succeeds even though nothing was written.
    group.set_grouped_properties(&graph, &values, &rel).unwrap();
    assert_eq!(thing.raw("name"), None);
}

// ============================================================================
// 5. Read-only members are skipped on write, without error
// ============================================================================

#[test]
fn test_read_only_member_skipped_on_write() {
    let graph = MemoryGraph::new();
    let alice = graph.create_node("Person");
    alice.set_raw("name", Value::from("Alice")).unwrap();
    let thing = graph.create_node("Thing");
    let rel = graph.create_relationship(&alice.uuid(), &thing.uuid(), "OWNS").unwrap();

    let group = ReferenceGroup::new(
        "owner",
        "Ownership",
        vec![Reference::new(
            Arc::new(Property::generic("name").read_only()),
            Navigation::FromStart,
            Arc::new(Property::string("name")),
        )],
    );

    let mut values = PropertyMap::new();
    values.put(Arc::new(Property::generic("name")), Value::from("Bob"));

    group.set_grouped_properties(&graph, &values, &rel).unwrap();
    assert_eq!(alice.raw("name"), Some(Value::from("Alice")));
}

// ============================================================================
// 6. Non-relationship input yields no grouped value
// ============================================================================

#[test]
fn test_node_input_yields_no_grouped_value() {
    let graph = MemoryGraph::new();
    let node = graph.create_node("Person");

    let group = owner_group();
    assert!(group.grouped_properties(&graph, &node).unwrap().is_none());

    // Writing to a node is silently absorbed as well.
    let values = PropertyMap::new();
    group.set_grouped_properties(&graph, &values, &node).unwrap();
}

// ============================================================================
// 7. Nested lookup fails fast at lookup time, not construction
// ============================================================================

#[test]
fn test_unknown_nested_name_fails_at_lookup_time() {
    // Construction with names that are never looked up succeeds.
    let group = owner_group();

    assert!(group.nested_property("name").is_ok());

    let err = group.nested_property("nope").unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));

    let err = group.direct_access_key("nope").unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn test_direct_access_key_reaches_member_storage() {
    let graph = MemoryGraph::new();
    let node = graph.create_node("Person");
    node.set_raw("name", Value::from("Alice")).unwrap();

    let group = owner_group();
    let direct = group.direct_access_key("name").unwrap();
    assert_eq!(direct.get(&graph, &node, true).unwrap(), Some(Value::from("Alice")));
}

// ============================================================================
// 8. Both endpoints and the relationship itself, in insertion order
// ============================================================================

#[test]
fn test_multi_member_group_preserves_insertion_order() {
    let graph = MemoryGraph::new();
    let alice = graph.create_node("Person");
    alice.set_raw("name", Value::from("Alice")).unwrap();
    let store_node = graph.create_node("Shop");
    store_node.set_raw("name", Value::from("Bazaar")).unwrap();
    let rel = graph.create_relationship(&alice.uuid(), &store_node.uuid(), "SHOPS_AT").unwrap();
    rel.set_raw("since", Value::Int(2020)).unwrap();

    let group = ReferenceGroup::new(
        "membership",
        "ShopsAt",
        vec![
            Reference::new(
                Arc::new(Property::generic("customerName")),
                Navigation::FromStart,
                Arc::new(Property::string("name")),
            ),
            Reference::new(
                Arc::new(Property::generic("since")),
                Navigation::FromRelationshipItself,
                Arc::new(Property::int("since")),
            ),
            Reference::new(
                Arc::new(Property::generic("shopName")),
                Navigation::FromEnd,
                Arc::new(Property::string("name")),
            ),
        ],
    );

    let props = group.grouped_properties(&graph, &rel).unwrap().unwrap();
    let names: Vec<_> = props.keys().map(|k| k.json_name().to_owned()).collect();
    assert_eq!(names, vec!["customerName", "since", "shopName"]);

    // Wire shape: ordered object of externalName -> value.
    let json = serde_json::to_string(&props).unwrap();
    assert_eq!(
        json,
        r#"{"customerName":"Alice","since":2020,"shopName":"Bazaar"}"#
    );
}
