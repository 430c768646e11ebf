//! Entity ↔ identifier reduction over collection-valued keys.
//!
//! A [`Notion`] pairs `reduce` (entity → identifier) with `materialize`
//! (identifier → entity) plus an explicit create-on-missing policy.
//! [`CollectionNotionProperty`] applies it element-wise over an ordered
//! collection, so a collection of related entities serializes as a flat
//! array of identifier strings instead of nested full objects.

use std::sync::Arc;
use std::sync::OnceLock;

use parking_lot::RwLock;
use tracing::debug;

use crate::model::{GraphObject, ObjectHandle, Value};
use crate::search::{Occurrence, SearchAttribute};
use crate::storage::GraphStore;
use crate::{Error, Result};
use super::validator::PropertyValidator;
use super::PropertyKey;

/// A named reduction strategy between a full entity and its lightweight
/// representation. Symmetric for existing entities:
/// `materialize(reduce(e)) == e` and `reduce(materialize(id)) == id`.
pub struct Notion {
    create_if_missing: bool,
}

impl Notion {
    /// Reduce to the entity's identifier; unresolvable identifiers are
    /// dropped on materialization.
    pub fn uuid() -> Self {
        Self { create_if_missing: false }
    }

    /// Reduce to the entity's identifier; unresolvable identifiers create a
    /// new entity through the storage collaborator.
    pub fn uuid_creating() -> Self {
        Self { create_if_missing: true }
    }

    pub fn create_if_missing(&self) -> bool {
        self.create_if_missing
    }

    /// Entity → reduced representation.
    pub fn reduce(&self, entity: &dyn GraphObject) -> Value {
        Value::String(entity.uuid())
    }

    /// Reduced representation → entity. `Ok(None)` means the identifier does
    /// not denote an existing entity and the policy says not to create one.
    pub fn materialize(
        &self,
        store: &dyn GraphStore,
        reduced: &Value,
    ) -> Result<Option<ObjectHandle>> {
        let Some(uuid) = reduced.as_str() else {
            return Ok(None);
        };
        if let Some(entity) = store.node_by_uuid(uuid)? {
            return Ok(Some(entity));
        }
        if self.create_if_missing {
            return Ok(Some(store.create_node_with_uuid(uuid)?));
        }
        Ok(None)
    }
}

/// Contract for reading and writing an ordered entity collection off an
/// entity. The wrapped storage strategy is the collaborator's concern; the
/// notion key only needs wholesale read/replace.
pub trait CollectionSource: Send + Sync {
    /// Storage name of the underlying collection.
    fn db_name(&self) -> &str;

    /// The current collection as live entities, in stored order.
    fn entities(&self, store: &dyn GraphStore, obj: &dyn GraphObject) -> Result<Vec<ObjectHandle>>;

    /// Replace the collection wholesale.
    fn set_entities(
        &self,
        store: &dyn GraphStore,
        obj: &dyn GraphObject,
        entities: Vec<ObjectHandle>,
    ) -> Result<()>;
}

/// A collection source that stores the collection as a list of identifier
/// strings on the entity and resolves them through the store on read.
/// Stored identifiers that no longer resolve are skipped.
pub struct UuidListCollection {
    db_name: String,
}

impl UuidListCollection {
    pub fn new(db_name: &str) -> Self {
        Self { db_name: db_name.to_owned() }
    }
}

impl CollectionSource for UuidListCollection {
    fn db_name(&self) -> &str {
        &self.db_name
    }

    fn entities(&self, store: &dyn GraphStore, obj: &dyn GraphObject) -> Result<Vec<ObjectHandle>> {
        let Some(Value::List(ids)) = obj.raw(&self.db_name) else {
            return Ok(Vec::new());
        };

        let mut entities = Vec::with_capacity(ids.len());
        for id in &ids {
            let Some(uuid) = id.as_str() else { continue };
            match store.node_by_uuid(uuid)? {
                Some(entity) => entities.push(entity),
                None => {
                    debug!(collection = %self.db_name, uuid, "stored identifier no longer resolves, skipping");
                }
            }
        }
        Ok(entities)
    }

    fn set_entities(
        &self,
        _store: &dyn GraphStore,
        obj: &dyn GraphObject,
        entities: Vec<ObjectHandle>,
    ) -> Result<()> {
        let ids: Vec<Value> = entities
            .iter()
            .map(|e| Value::String(e.uuid()))
            .collect();
        obj.set_raw(&self.db_name, Value::List(ids))
    }
}

/// A collection-valued key whose elements are reduced to identifiers on
/// read and materialized back to entities on write.
///
/// Reads produce a fully materialized ordered list — never a lazy view —
/// so the caller may serialize it after the underlying entities change.
/// Writes replace the underlying collection wholesale; identifiers that do
/// not resolve are dropped (non-fatal) unless the notion's policy creates
/// them.
pub struct CollectionNotionProperty {
    db_name: String,
    json_name: String,
    source: Arc<dyn CollectionSource>,
    notion: Notion,
    declaring_type: OnceLock<String>,
    validators: RwLock<Vec<Arc<dyn PropertyValidator>>>,
}

impl CollectionNotionProperty {
    pub fn new(name: &str, source: Arc<dyn CollectionSource>, notion: Notion) -> Self {
        Self {
            db_name: name.to_owned(),
            json_name: name.to_owned(),
            source,
            notion,
            declaring_type: OnceLock::new(),
            validators: RwLock::new(Vec::new()),
        }
    }

    /// The id-reducing collection key: elements reduce to identifier
    /// strings, unresolvable identifiers are dropped on write.
    pub fn ids(name: &str, source: Arc<dyn CollectionSource>) -> Self {
        Self::new(name, source, Notion::uuid())
    }

    /// Like [`Self::ids`], but unresolvable identifiers create a new entity
    /// through the storage collaborator.
    pub fn ids_creating(name: &str, source: Arc<dyn CollectionSource>) -> Self {
        Self::new(name, source, Notion::uuid_creating())
    }

    pub fn notion(&self) -> &Notion {
        &self.notion
    }
}

impl PropertyKey for CollectionNotionProperty {
    fn db_name(&self) -> &str {
        &self.db_name
    }

    fn json_name(&self) -> &str {
        &self.json_name
    }

    fn type_name(&self) -> &'static str {
        "LIST"
    }

    fn is_collection(&self) -> bool {
        true
    }

    fn declaring_type(&self) -> Option<String> {
        self.declaring_type.get().cloned()
    }

    fn set_declaring_type(&self, entity_type: &str) -> Result<()> {
        self.declaring_type.set(entity_type.to_owned()).map_err(|_| {
            Error::Configuration(format!(
                "property '{}' is already declared by type '{}'",
                self.json_name,
                self.declaring_type.get().map(String::as_str).unwrap_or("?"),
            ))
        })
    }

    fn register_validator(&self, validator: Arc<dyn PropertyValidator>) {
        self.validators.write().push(validator);
    }

    fn validators(&self) -> Vec<Arc<dyn PropertyValidator>> {
        self.validators.read().clone()
    }

    /// One reduced element per live element, order preserved, materialized
    /// fully before return.
    fn get(
        &self,
        store: &dyn GraphStore,
        obj: &dyn GraphObject,
        _apply_converter: bool,
    ) -> Result<Option<Value>> {
        let entities = self.source.entities(store, obj)?;
        let reduced: Vec<Value> = entities
            .iter()
            .map(|entity| self.notion.reduce(entity.as_ref()))
            .collect();
        Ok(Some(Value::List(reduced)))
    }

    fn set(&self, store: &dyn GraphStore, obj: &dyn GraphObject, value: Value) -> Result<()> {
        for validator in self.validators.read().iter() {
            validator.validate(self, &value)?;
        }

        let ids = match value {
            Value::List(ids) => ids,
            Value::Null => Vec::new(),
            other => {
                return Err(Error::Conversion {
                    key: self.json_name.clone(),
                    expected: "LIST".to_owned(),
                    got: other.type_name().to_owned(),
                });
            }
        };

        let mut entities = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.notion.materialize(store, id)? {
                Some(entity) => entities.push(entity),
                None => {
                    debug!(key = %self.json_name, id = %id, "identifier does not resolve, dropping");
                }
            }
        }
        self.source.set_entities(store, obj, entities)
    }

    fn search_attribute(
        &self,
        occurrence: Occurrence,
        search_value: Value,
        exact: bool,
    ) -> SearchAttribute {
        SearchAttribute::property(&self.db_name, search_value, occurrence, exact)
    }

    fn index(
        &self,
        store: &dyn GraphStore,
        obj: &dyn GraphObject,
        value: Option<&Value>,
    ) -> Result<()> {
        match value {
            Some(v) => store.index_value(&obj.uuid(), &self.db_name, Some(v)),
            None => Ok(()),
        }
    }
}
