//! Applying a property bag to entities, optionally down a relationship
//! chain.

use hashbrown::HashSet;

use crate::model::{GraphObject, PropertyMap};
use crate::storage::GraphStore;
use crate::Result;

/// Set every entry of `values` on the entity, in insertion order.
pub fn apply_properties(
    store: &dyn GraphStore,
    obj: &dyn GraphObject,
    values: &PropertyMap,
) -> Result<()> {
    for (key, value) in values.iter() {
        key.set(store, obj, value.clone())?;
    }
    Ok(())
}

/// Apply `values` to the entity and recursively to every node reachable
/// over outgoing relationships of the given type.
///
/// The graph model permits cycles, so visited entities are tracked by
/// identifier and applied at most once.
pub fn apply_properties_recursive(
    store: &dyn GraphStore,
    obj: &dyn GraphObject,
    values: &PropertyMap,
    rel_type: &str,
) -> Result<()> {
    let mut visited = HashSet::new();
    walk(store, obj, values, rel_type, &mut visited)
}

fn walk(
    store: &dyn GraphStore,
    obj: &dyn GraphObject,
    values: &PropertyMap,
    rel_type: &str,
    visited: &mut HashSet<String>,
) -> Result<()> {
    if !visited.insert(obj.uuid()) {
        return Ok(());
    }

    apply_properties(store, obj, values)?;

    for rel in store.outgoing(&obj.uuid(), rel_type)? {
        if let Some(end) = rel.target_node() {
            walk(store, end.as_ref(), values, rel_type, visited)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::key::{Property, PropertyKey};
    use crate::model::Value;
    use crate::storage::MemoryGraph;

    #[test]
    fn test_apply_recursive_reaches_children() {
        let graph = MemoryGraph::new();
        let parent = graph.create_node("Page");
        let child = graph.create_node("Page");
        let grandchild = graph.create_node("Page");
        graph.create_relationship(&parent.uuid(), &child.uuid(), "CONTAINS").unwrap();
        graph.create_relationship(&child.uuid(), &grandchild.uuid(), "CONTAINS").unwrap();

        let visible: Arc<dyn PropertyKey> = Arc::new(Property::boolean("visible"));
        let mut values = PropertyMap::new();
        values.put(visible, Value::Bool(true));

        apply_properties_recursive(&graph, &parent, &values, "CONTAINS").unwrap();

        assert_eq!(parent.raw("visible"), Some(Value::Bool(true)));
        assert_eq!(child.raw("visible"), Some(Value::Bool(true)));
        assert_eq!(grandchild.raw("visible"), Some(Value::Bool(true)));
    }

    #[test]
    fn test_apply_recursive_terminates_on_cycle() {
        let graph = MemoryGraph::new();
        let a = graph.create_node("Page");
        let b = graph.create_node("Page");
        graph.create_relationship(&a.uuid(), &b.uuid(), "CONTAINS").unwrap();
        graph.create_relationship(&b.uuid(), &a.uuid(), "CONTAINS").unwrap();

        let title: Arc<dyn PropertyKey> = Arc::new(Property::string("title"));
        let mut values = PropertyMap::new();
        values.put(title, Value::from("looped"));

        apply_properties_recursive(&graph, &a, &values, "CONTAINS").unwrap();

        assert_eq!(a.raw("title"), Some(Value::from("looped")));
        assert_eq!(b.raw("title"), Some(Value::from("looped")));
    }

    #[test]
    fn test_apply_skips_other_relationship_types() {
        let graph = MemoryGraph::new();
        let a = graph.create_node("Page");
        let b = graph.create_node("Page");
        graph.create_relationship(&a.uuid(), &b.uuid(), "LINKS_TO").unwrap();

        let title: Arc<dyn PropertyKey> = Arc::new(Property::string("title"));
        let mut values = PropertyMap::new();
        values.put(title, Value::from("only a"));

        apply_properties_recursive(&graph, &a, &values, "CONTAINS").unwrap();

        assert_eq!(a.raw("title"), Some(Value::from("only a")));
        assert_eq!(b.raw("title"), None);
    }
}
