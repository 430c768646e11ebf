//! In-memory graph store.
//!
//! This is the reference implementation of `GraphStore`, backed by
//! hashbrown maps behind parking_lot locks.
//!
//! ## Limitations
//!
//! - **No real transactions**: writes are applied immediately. The
//!   transaction boundary around a batch of get/set calls belongs to the
//!   caller, not this store.
//! - **No referential integrity**: `delete_node` is a plain removal and
//!   leaves relationships behind. Dangling endpoints are a legal partial
//!   graph state the key layer must tolerate, and tests rely on being able
//!   to produce one.
//! - **Flat index sink**: `index_value` appends to an inspectable log
//!   instead of feeding a real full-text engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::model::{GraphObject, ObjectHandle, RelationshipObject, Value};
use crate::{Error, Result};
use super::GraphStore;

/// Node type assigned to entities created through
/// `GraphStore::create_node_with_uuid`.
const GENERIC_NODE_TYPE: &str = "Generic";

// ============================================================================
// MemoryGraph
// ============================================================================

/// In-memory property graph storage.
#[derive(Clone)]
pub struct MemoryGraph {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    nodes: RwLock<HashMap<String, Arc<NodeData>>>,
    relationships: RwLock<HashMap<String, Arc<RelData>>>,
    /// node uuid → outgoing relationship uuids
    adjacency: RwLock<HashMap<String, Vec<String>>>,
    index_log: RwLock<Vec<IndexEntry>>,
    next_id: AtomicU64,
}

struct NodeData {
    uuid: String,
    node_type: String,
    props: RwLock<HashMap<String, Value>>,
}

struct RelData {
    uuid: String,
    rel_type: String,
    source_uuid: String,
    target_uuid: String,
    props: RwLock<HashMap<String, Value>>,
}

/// One record handed to the index sink.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub uuid: String,
    pub key: String,
    pub value: Option<Value>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                nodes: RwLock::new(HashMap::new()),
                relationships: RwLock::new(HashMap::new()),
                adjacency: RwLock::new(HashMap::new()),
                index_log: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    fn fresh_uuid(&self) -> String {
        format!("{:032x}", self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Create a node with a generated identifier.
    pub fn create_node(&self, node_type: &str) -> NodeHandle {
        let uuid = self.fresh_uuid();
        self.insert_node(uuid, node_type)
    }

    /// Create a node under a caller-chosen identifier.
    pub fn create_node_with_id(&self, uuid: &str, node_type: &str) -> Result<NodeHandle> {
        if self.inner.nodes.read().contains_key(uuid) {
            return Err(Error::Storage(format!("node {uuid} already exists")));
        }
        Ok(self.insert_node(uuid.to_owned(), node_type))
    }

    fn insert_node(&self, uuid: String, node_type: &str) -> NodeHandle {
        let data = Arc::new(NodeData {
            uuid: uuid.clone(),
            node_type: node_type.to_owned(),
            props: RwLock::new(HashMap::new()),
        });
        self.inner.nodes.write().insert(uuid.clone(), data.clone());
        self.inner.adjacency.write().entry(uuid).or_default();
        NodeHandle { data }
    }

    /// Create a relationship between two existing nodes.
    pub fn create_relationship(
        &self,
        source_uuid: &str,
        target_uuid: &str,
        rel_type: &str,
    ) -> Result<RelationshipHandle> {
        {
            let nodes = self.inner.nodes.read();
            if !nodes.contains_key(source_uuid) {
                return Err(Error::Storage(format!("source node {source_uuid} not found")));
            }
            if !nodes.contains_key(target_uuid) {
                return Err(Error::Storage(format!("target node {target_uuid} not found")));
            }
        }

        let uuid = self.fresh_uuid();
        let data = Arc::new(RelData {
            uuid: uuid.clone(),
            rel_type: rel_type.to_owned(),
            source_uuid: source_uuid.to_owned(),
            target_uuid: target_uuid.to_owned(),
            props: RwLock::new(HashMap::new()),
        });

        self.inner.relationships.write().insert(uuid.clone(), data.clone());
        self.inner
            .adjacency
            .write()
            .entry(source_uuid.to_owned())
            .or_default()
            .push(uuid);

        Ok(RelationshipHandle { data, inner: self.inner.clone() })
    }

    /// Plain node removal. Relationships referencing the node stay behind,
    /// producing a dangling endpoint.
    pub fn delete_node(&self, uuid: &str) -> bool {
        self.inner.adjacency.write().remove(uuid);
        self.inner.nodes.write().remove(uuid).is_some()
    }

    pub fn node(&self, uuid: &str) -> Option<NodeHandle> {
        self.inner.nodes.read().get(uuid).map(|data| NodeHandle { data: data.clone() })
    }

    pub fn relationship(&self, uuid: &str) -> Option<RelationshipHandle> {
        self.inner
            .relationships
            .read()
            .get(uuid)
            .map(|data| RelationshipHandle { data: data.clone(), inner: self.inner.clone() })
    }

    pub fn node_count(&self) -> usize {
        self.inner.nodes.read().len()
    }

    /// Everything handed to the index sink so far, in call order.
    pub fn index_entries(&self) -> Vec<IndexEntry> {
        self.inner.index_log.read().clone()
    }
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// GraphStore impl
// ============================================================================

impl GraphStore for MemoryGraph {
    fn node_by_uuid(&self, uuid: &str) -> Result<Option<ObjectHandle>> {
        Ok(self.node(uuid).map(|h| Arc::new(h) as ObjectHandle))
    }

    fn create_node_with_uuid(&self, uuid: &str) -> Result<ObjectHandle> {
        let handle = self.create_node_with_id(uuid, GENERIC_NODE_TYPE)?;
        Ok(Arc::new(handle))
    }

    fn index_value(&self, uuid: &str, key_db_name: &str, value: Option<&Value>) -> Result<()> {
        self.inner.index_log.write().push(IndexEntry {
            uuid: uuid.to_owned(),
            key: key_db_name.to_owned(),
            value: value.cloned(),
        });
        Ok(())
    }

    fn outgoing(&self, uuid: &str, rel_type: &str) -> Result<Vec<Arc<dyn RelationshipObject>>> {
        let adjacency = self.inner.adjacency.read();
        let Some(rel_ids) = adjacency.get(uuid) else {
            return Ok(Vec::new());
        };

        let relationships = self.inner.relationships.read();
        let mut result: Vec<Arc<dyn RelationshipObject>> = Vec::new();
        for rel_id in rel_ids {
            if let Some(data) = relationships.get(rel_id) {
                if data.rel_type == rel_type {
                    result.push(Arc::new(RelationshipHandle {
                        data: data.clone(),
                        inner: self.inner.clone(),
                    }));
                }
            }
        }
        Ok(result)
    }
}

// ============================================================================
// Handles
// ============================================================================

/// Cheap-to-clone handle to a stored node.
#[derive(Clone)]
pub struct NodeHandle {
    data: Arc<NodeData>,
}

impl GraphObject for NodeHandle {
    fn uuid(&self) -> String {
        self.data.uuid.clone()
    }

    fn object_type(&self) -> String {
        self.data.node_type.clone()
    }

    fn raw(&self, db_name: &str) -> Option<Value> {
        self.data.props.read().get(db_name).cloned()
    }

    fn set_raw(&self, db_name: &str, value: Value) -> Result<()> {
        let mut props = self.data.props.write();
        if value.is_null() {
            props.remove(db_name);
        } else {
            props.insert(db_name.to_owned(), value);
        }
        Ok(())
    }
}

/// Cheap-to-clone handle to a stored relationship. Endpoint navigation goes
/// back through the store, so a deleted endpoint shows up as `None`.
#[derive(Clone)]
pub struct RelationshipHandle {
    data: Arc<RelData>,
    inner: Arc<MemoryInner>,
}

impl RelationshipHandle {
    pub fn source_uuid(&self) -> &str {
        &self.data.source_uuid
    }

    pub fn target_uuid(&self) -> &str {
        &self.data.target_uuid
    }
}

impl GraphObject for RelationshipHandle {
    fn uuid(&self) -> String {
        self.data.uuid.clone()
    }

    fn object_type(&self) -> String {
        self.data.rel_type.clone()
    }

    fn raw(&self, db_name: &str) -> Option<Value> {
        self.data.props.read().get(db_name).cloned()
    }

    fn set_raw(&self, db_name: &str, value: Value) -> Result<()> {
        let mut props = self.data.props.write();
        if value.is_null() {
            props.remove(db_name);
        } else {
            props.insert(db_name.to_owned(), value);
        }
        Ok(())
    }

    fn as_relationship(&self) -> Option<&dyn RelationshipObject> {
        Some(self)
    }
}

impl RelationshipObject for RelationshipHandle {
    fn rel_type(&self) -> String {
        self.data.rel_type.clone()
    }

    fn source_node(&self) -> Option<ObjectHandle> {
        self.inner
            .nodes
            .read()
            .get(&self.data.source_uuid)
            .map(|data| Arc::new(NodeHandle { data: data.clone() }) as ObjectHandle)
    }

    fn target_node(&self) -> Option<ObjectHandle> {
        self.inner
            .nodes
            .read()
            .get(&self.data.target_uuid)
            .map(|data| Arc::new(NodeHandle { data: data.clone() }) as ObjectHandle)
    }

    fn as_object(&self) -> ObjectHandle {
        Arc::new(self.clone())
    }
}
