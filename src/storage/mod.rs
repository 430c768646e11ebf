//! # Storage Collaborator Contract
//!
//! The key layer never owns storage. `GraphStore` is the capability it
//! requires from the surrounding storage engine: resolve an identifier to a
//! live entity, create one for an unknown identifier, feed the index sink,
//! and enumerate outgoing relationships for recursive property propagation.
//!
//! Transactions are deliberately absent — every operation in this crate runs
//! synchronously on the caller's thread inside a transaction boundary the
//! caller owns.

pub mod memory;

use std::sync::Arc;

use crate::Result;
use crate::model::{ObjectHandle, RelationshipObject, Value};

pub use memory::{IndexEntry, MemoryGraph, NodeHandle, RelationshipHandle};

/// The storage/query collaborator contract.
pub trait GraphStore: Send + Sync {
    /// Resolve an identifier to a live node. `None` when unknown.
    fn node_by_uuid(&self, uuid: &str) -> Result<Option<ObjectHandle>>;

    /// Create a node for an identifier that does not resolve yet.
    fn create_node_with_uuid(&self, uuid: &str) -> Result<ObjectHandle>;

    /// Hand a value to the index sink for the given entity and key.
    /// `None` marks the key as empty (indexed-when-empty keys use this).
    fn index_value(&self, uuid: &str, key_db_name: &str, value: Option<&Value>) -> Result<()>;

    /// Outgoing relationships of the given type from a node.
    fn outgoing(&self, uuid: &str, rel_type: &str) -> Result<Vec<Arc<dyn RelationshipObject>>>;
}
