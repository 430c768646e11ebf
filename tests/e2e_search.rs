//! End-to-end tests for search predicate construction.
//!
//! The external query engine consumes the predicate tree; these tests
//! verify its shape: leaf predicates for plain keys, groups with Must
//! members for composite keys, and omission of members without a supplied
//! value.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use graphkey::{
    GraphObject, MemoryGraph, Navigation, Occurrence, Property, PropertyKey, PropertyMap,
    Reference, ReferenceGroup, SearchAttribute, Value,
};

fn shopping_group() -> ReferenceGroup {
    ReferenceGroup::new(
        "membership",
        "ShopsAt",
        vec![
            Reference::new(
                Arc::new(Property::generic("customerName")),
                Navigation::FromStart,
                Arc::new(Property::string("name")),
            ),
            Reference::new(
                Arc::new(Property::generic("shopName")),
                Navigation::FromEnd,
                Arc::new(Property::string("name")),
            ),
        ],
    )
}

// ============================================================================
// 1. Plain key: a leaf predicate under the requested occurrence
// ============================================================================

#[test]
fn test_property_builds_leaf_predicate() {
    let name = Property::string("name").indexed();

    let attr = name.search_attribute(Occurrence::Must, Value::from("Ada"), true);
    assert_eq!(
        attr,
        SearchAttribute::Property {
            key: "name".into(),
            value: Value::from("Ada"),
            occurrence: Occurrence::Must,
            exact: true,
        }
    );
}

// ============================================================================
// 2. Group: one Must member per supplied value
// ============================================================================

#[test]
fn test_group_predicate_contains_supplied_members() {
    let group = shopping_group();

    let mut values = PropertyMap::new();
    values.put(Arc::new(Property::generic("customerName")), Value::from("Ada"));
    values.put(Arc::new(Property::generic("shopName")), Value::from("Bazaar"));

    let attr = group.grouped_search_attribute(Occurrence::Should, &values, false);
    let SearchAttribute::Group(inner) = attr else {
        panic!("expected a group predicate");
    };

    assert_eq!(inner.occurrence, Occurrence::Should);
    assert_eq!(inner.len(), 2);
    assert!(inner.members.iter().all(|m| m.occurrence() == Occurrence::Must));
}

// ============================================================================
// 3. Members without a supplied value contribute nothing
// ============================================================================

#[test]
fn test_group_predicate_omits_missing_and_null_values() {
    let group = shopping_group();

    let mut values = PropertyMap::new();
    values.put(Arc::new(Property::generic("customerName")), Value::from("Ada"));
    values.put(Arc::new(Property::generic("shopName")), Value::Null);

    let attr = group.grouped_search_attribute(Occurrence::Must, &values, true);
    let SearchAttribute::Group(inner) = attr else {
        panic!("expected a group predicate");
    };

    assert_eq!(inner.len(), 1);
    assert_eq!(
        inner.members[0],
        SearchAttribute::Property {
            key: "customerName".into(),
            value: Value::from("Ada"),
            occurrence: Occurrence::Must,
            exact: true,
        }
    );
}

// ============================================================================
// 4. Reference delegates predicate construction to its delegate key
// ============================================================================

#[test]
fn test_reference_delegates_search_attribute() {
    let delegate = Arc::new(Property::string("ownerName").indexed());
    let reference = Reference::new(
        delegate.clone(),
        Navigation::FromStart,
        Arc::new(Property::string("name")),
    );

    let from_reference = reference.search_attribute(Occurrence::MustNot, Value::from("x"), false);
    let from_delegate = delegate.search_attribute(Occurrence::MustNot, Value::from("x"), false);
    assert_eq!(from_reference, from_delegate);
}

// ============================================================================
// 5. Group indexing delegates per member with the indexing value
// ============================================================================

#[test]
fn test_group_index_uses_indexing_values_per_member() {
    let graph = MemoryGraph::new();
    let alice = graph.create_node("Person");
    let shop = graph.create_node("Shop");
    let rel = graph.create_relationship(&alice.uuid(), &shop.uuid(), "SHOPS_AT").unwrap();
    rel.set_raw("customerName", Value::from("Ada")).unwrap();

    let group = ReferenceGroup::new(
        "membership",
        "ShopsAt",
        vec![Reference::new(
            Arc::new(Property::generic("customerName").indexed()),
            Navigation::FromStart,
            Arc::new(Property::string("name")),
        )],
    );

    group.index(&graph, &rel, None).unwrap();

    let entries = graph.index_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "customerName");
    assert_eq!(entries[0].value, Some(Value::from("Ada")));
}
