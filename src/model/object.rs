//! Access traits for graph entities.
//!
//! The storage engine owns nodes and relationships; this layer only borrows
//! handles to them during an operation. A handle is a cheap clone (`Arc`
//! backed) whose mutation goes through interior locking owned by the store.
//!
//! The key layer works against `raw` storage-name access; all converter,
//! validator, and delegation logic lives in the keys themselves so that
//! entity implementations stay dumb.

use std::sync::Arc;

use crate::Result;
use super::Value;

/// Shared handle to an entity owned by the storage layer.
pub type ObjectHandle = Arc<dyn GraphObject>;

/// A node or relationship in the underlying graph store.
pub trait GraphObject: Send + Sync {
    /// Stable identifier of this entity.
    fn uuid(&self) -> String;

    /// Entity type name (node label or relationship type).
    fn object_type(&self) -> String;

    /// Read the raw stored value under a storage name. `None` when unset.
    fn raw(&self, db_name: &str) -> Option<Value>;

    /// Write the raw stored value. Writing `Value::Null` removes the entry.
    fn set_raw(&self, db_name: &str, value: Value) -> Result<()>;

    /// Value handed to the index sink. May differ from `raw` (e.g. a
    /// lowercased or normalized form); defaults to the plain read.
    fn raw_for_indexing(&self, db_name: &str) -> Option<Value> {
        self.raw(db_name)
    }

    /// Downcast to the relationship view, if this entity is a relationship.
    fn as_relationship(&self) -> Option<&dyn RelationshipObject> {
        None
    }
}

/// The relationship view of an entity: endpoint navigation.
pub trait RelationshipObject: GraphObject {
    /// Relationship type name.
    fn rel_type(&self) -> String;

    /// Source node of this relationship. `None` when the endpoint is
    /// dangling (legal during partial graph states).
    fn source_node(&self) -> Option<ObjectHandle>;

    /// Target node of this relationship. `None` when dangling.
    fn target_node(&self) -> Option<ObjectHandle>;

    /// This relationship as a plain entity handle (for navigation rules
    /// that read off the relationship itself).
    fn as_object(&self) -> ObjectHandle;
}
