//! Delegating key: a view onto a property that lives on another entity,
//! reached by navigating a relationship.

use std::sync::Arc;

use crate::model::{GraphObject, ObjectHandle, Value};
use crate::search::{Occurrence, SearchAttribute};
use crate::storage::GraphStore;
use crate::Result;
use super::{PropertyConverter, PropertyKey, PropertyValidator};

/// Which entity of a relationship a [`Reference`] reads from and writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The relationship's source node.
    FromStart,
    /// The relationship entity itself.
    FromRelationshipItself,
    /// The relationship's target node.
    FromEnd,
}

/// A key that owns no storage: it pairs a navigation rule with a target key
/// on the referenced entity, and presents the identity and metadata of its
/// delegate key. Used by [`super::ReferenceGroup`] to expose endpoint
/// properties of a relationship as one grouped value.
///
/// A Reference is a view, not a declared schema member: registration hooks
/// are no-ops so that building one never re-registers or re-owns its
/// delegate.
pub struct Reference {
    delegate: Arc<dyn PropertyKey>,
    navigation: Navigation,
    target: Arc<dyn PropertyKey>,
}

impl std::fmt::Debug for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reference")
            .field("delegate", &self.delegate.db_name())
            .field("navigation", &self.navigation)
            .field("target", &self.target.db_name())
            .finish()
    }
}

impl Reference {
    pub fn new(
        delegate: Arc<dyn PropertyKey>,
        navigation: Navigation,
        target: Arc<dyn PropertyKey>,
    ) -> Self {
        Self { delegate, navigation, target }
    }

    /// The external-facing key this Reference presents itself as.
    pub fn delegate_key(&self) -> &Arc<dyn PropertyKey> {
        &self.delegate
    }

    /// The key read/written on the referenced entity.
    pub fn target_key(&self) -> &Arc<dyn PropertyKey> {
        &self.target
    }

    pub fn navigation(&self) -> Navigation {
        self.navigation
    }

    /// Resolve the entity the value actually lives on.
    ///
    /// Only relationship-typed objects navigate; anything else (including an
    /// absent input) yields `None` — a dangling reference is missing data,
    /// not an error.
    pub fn resolve(&self, obj: Option<&dyn GraphObject>) -> Option<ObjectHandle> {
        let rel = obj?.as_relationship()?;
        match self.navigation {
            Navigation::FromStart => rel.source_node(),
            Navigation::FromRelationshipItself => Some(rel.as_object()),
            Navigation::FromEnd => rel.target_node(),
        }
    }
}

impl PropertyKey for Reference {
    fn db_name(&self) -> &str {
        self.delegate.db_name()
    }

    fn json_name(&self) -> &str {
        self.delegate.json_name()
    }

    fn type_name(&self) -> &'static str {
        self.delegate.type_name()
    }

    fn default_value(&self) -> Option<Value> {
        self.delegate.default_value()
    }

    fn related_type(&self) -> Option<String> {
        self.delegate.related_type()
    }

    fn is_read_only(&self) -> bool {
        self.delegate.is_read_only()
    }

    fn is_write_once(&self) -> bool {
        self.delegate.is_write_once()
    }

    fn is_indexed(&self) -> bool {
        self.delegate.is_indexed()
    }

    fn is_passively_indexed(&self) -> bool {
        self.delegate.is_passively_indexed()
    }

    fn is_searchable(&self) -> bool {
        self.delegate.is_searchable()
    }

    fn is_indexed_when_empty(&self) -> bool {
        self.delegate.is_indexed_when_empty()
    }

    fn is_collection(&self) -> bool {
        self.delegate.is_collection()
    }

    fn declaring_type(&self) -> Option<String> {
        self.delegate.declaring_type()
    }

    /// No-op: a Reference never owns its declaring type.
    fn set_declaring_type(&self, _entity_type: &str) -> Result<()> {
        Ok(())
    }

    /// No-op: a Reference never re-registers.
    fn registration_callback(&self, _entity_type: &str) {}

    fn database_converter(&self) -> Option<Arc<dyn PropertyConverter>> {
        self.delegate.database_converter()
    }

    fn input_converter(&self) -> Option<Arc<dyn PropertyConverter>> {
        self.delegate.input_converter()
    }

    fn register_validator(&self, validator: Arc<dyn PropertyValidator>) {
        self.delegate.register_validator(validator);
    }

    fn validators(&self) -> Vec<Arc<dyn PropertyValidator>> {
        self.delegate.validators()
    }

    fn get(
        &self,
        store: &dyn GraphStore,
        obj: &dyn GraphObject,
        apply_converter: bool,
    ) -> Result<Option<Value>> {
        self.delegate.get(store, obj, apply_converter)
    }

    fn set(&self, store: &dyn GraphStore, obj: &dyn GraphObject, value: Value) -> Result<()> {
        self.delegate.set(store, obj, value)
    }

    fn search_attribute(
        &self,
        occurrence: Occurrence,
        search_value: Value,
        exact: bool,
    ) -> SearchAttribute {
        self.delegate.search_attribute(occurrence, search_value, exact)
    }

    fn index(
        &self,
        store: &dyn GraphStore,
        obj: &dyn GraphObject,
        value: Option<&Value>,
    ) -> Result<()> {
        self.delegate.index(store, obj, value)
    }

    /// A Reference never needs cross-field synchronization bookkeeping of
    /// its own.
    fn requires_synchronization(&self) -> bool {
        false
    }

    fn synchronization_key(&self) -> Option<String> {
        None
    }
}
