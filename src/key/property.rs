//! Baseline concrete key for directly-stored values.

use std::sync::Arc;
use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::model::{GraphObject, Value};
use crate::search::{Occurrence, SearchAttribute};
use crate::storage::GraphStore;
use crate::{Error, Result};
use super::converter::{CoercionConverter, PropertyConverter, ValueType};
use super::validator::PropertyValidator;
use super::PropertyKey;

/// A key whose value is stored directly on the entity.
///
/// Built once at schema bootstrap via the typed constructors and builder
/// flags, then registered and shared read-only:
///
/// ```
/// use graphkey::{Property, PropertyKey};
///
/// let name = Property::string("name").indexed().searchable();
/// let age = Property::int("age").with_json_name("ageYears");
/// assert!(name.is_indexed());
/// assert_eq!(age.json_name(), "ageYears");
/// ```
pub struct Property {
    db_name: String,
    json_name: String,
    value_type: ValueType,
    default: Option<Value>,
    read_only: bool,
    write_once: bool,
    indexed: bool,
    passively_indexed: bool,
    searchable: bool,
    indexed_when_empty: bool,
    collection: bool,
    synchronized: bool,
    converter: Option<Arc<dyn PropertyConverter>>,
    declaring_type: OnceLock<String>,
    validators: RwLock<Vec<Arc<dyn PropertyValidator>>>,
}

impl std::fmt::Debug for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("db_name", &self.db_name)
            .field("json_name", &self.json_name)
            .field("value_type", &self.value_type)
            .finish_non_exhaustive()
    }
}

impl Property {
    fn typed(name: &str, value_type: ValueType) -> Self {
        let converter: Option<Arc<dyn PropertyConverter>> = match value_type {
            ValueType::Any => None,
            other => Some(Arc::new(CoercionConverter::new(other))),
        };
        Self {
            db_name: name.to_owned(),
            json_name: name.to_owned(),
            value_type,
            default: None,
            read_only: false,
            write_once: false,
            indexed: false,
            passively_indexed: false,
            searchable: false,
            indexed_when_empty: false,
            collection: matches!(value_type, ValueType::List),
            synchronized: false,
            converter,
            declaring_type: OnceLock::new(),
            validators: RwLock::new(Vec::new()),
        }
    }

    pub fn string(name: &str) -> Self {
        Self::typed(name, ValueType::String)
    }

    pub fn boolean(name: &str) -> Self {
        Self::typed(name, ValueType::Bool)
    }

    pub fn int(name: &str) -> Self {
        Self::typed(name, ValueType::Int)
    }

    pub fn float(name: &str) -> Self {
        Self::typed(name, ValueType::Float)
    }

    pub fn date(name: &str) -> Self {
        Self::typed(name, ValueType::Date)
    }

    pub fn datetime(name: &str) -> Self {
        Self::typed(name, ValueType::DateTime)
    }

    pub fn list(name: &str) -> Self {
        Self::typed(name, ValueType::List)
    }

    /// Untyped by-name key. Values pass through without coercion; used for
    /// direct access to nested group members and ad hoc property bags.
    pub fn generic(name: &str) -> Self {
        Self::typed(name, ValueType::Any)
    }

    // ------------------------------------------------------------------
    // Builder flags (bootstrap phase)
    // ------------------------------------------------------------------

    pub fn with_json_name(mut self, json_name: &str) -> Self {
        self.json_name = json_name.to_owned();
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn write_once(mut self) -> Self {
        self.write_once = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self.searchable = true;
        self
    }

    pub fn passively_indexed(mut self) -> Self {
        self.passively_indexed = true;
        self.searchable = true;
        self
    }

    pub fn indexed_when_empty(mut self) -> Self {
        self.indexed_when_empty = true;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// Mark this key as participating in cross-field synchronization; the
    /// synchronization key is the storage name.
    pub fn synchronized(mut self) -> Self {
        self.synchronized = true;
        self
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}

impl PropertyKey for Property {
    fn db_name(&self) -> &str {
        &self.db_name
    }

    fn json_name(&self) -> &str {
        &self.json_name
    }

    fn type_name(&self) -> &'static str {
        self.value_type.type_name()
    }

    fn default_value(&self) -> Option<Value> {
        self.default.clone()
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn is_write_once(&self) -> bool {
        self.write_once
    }

    fn is_indexed(&self) -> bool {
        self.indexed
    }

    fn is_passively_indexed(&self) -> bool {
        self.passively_indexed
    }

    fn is_searchable(&self) -> bool {
        self.searchable
    }

    fn is_indexed_when_empty(&self) -> bool {
        self.indexed_when_empty
    }

    fn is_collection(&self) -> bool {
        self.collection
    }

    fn declaring_type(&self) -> Option<String> {
        self.declaring_type.get().cloned()
    }

    fn set_declaring_type(&self, entity_type: &str) -> Result<()> {
        self.declaring_type
            .set(entity_type.to_owned())
            .map_err(|_| {
                Error::Configuration(format!(
                    "property '{}' is already declared by type '{}'",
                    self.json_name,
                    self.declaring_type.get().map(String::as_str).unwrap_or("?"),
                ))
            })
    }

    fn database_converter(&self) -> Option<Arc<dyn PropertyConverter>> {
        self.converter.clone()
    }

    fn input_converter(&self) -> Option<Arc<dyn PropertyConverter>> {
        self.converter.clone()
    }

    fn register_validator(&self, validator: Arc<dyn PropertyValidator>) {
        self.validators.write().push(validator);
    }

    fn validators(&self) -> Vec<Arc<dyn PropertyValidator>> {
        self.validators.read().clone()
    }

    fn get(
        &self,
        _store: &dyn GraphStore,
        obj: &dyn GraphObject,
        apply_converter: bool,
    ) -> Result<Option<Value>> {
        match obj.raw(&self.db_name) {
            Some(stored) => {
                if apply_converter {
                    if let Some(converter) = &self.converter {
                        return Ok(Some(converter.from_storage(self, stored)?));
                    }
                }
                Ok(Some(stored))
            }
            None => Ok(self.default.clone()),
        }
    }

    fn set(&self, _store: &dyn GraphStore, obj: &dyn GraphObject, value: Value) -> Result<()> {
        if self.read_only {
            return Err(Error::ReadOnly(self.json_name.clone()));
        }
        if self.write_once && obj.raw(&self.db_name).is_some() {
            return Err(Error::WriteOnce(self.json_name.clone()));
        }

        for validator in self.validators.read().iter() {
            validator.validate(self, &value)?;
        }

        let stored = match &self.converter {
            Some(converter) => converter.to_storage(self, value)?,
            None => value,
        };
        obj.set_raw(&self.db_name, stored)
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
        if !self.indexed && !self.passively_indexed {
            return Ok(());
        }
        match value {
            Some(v) => store.index_value(&obj.uuid(), &self.db_name, Some(v)),
            None if self.indexed_when_empty => store.index_value(&obj.uuid(), &self.db_name, None),
            None => Ok(()),
        }
    }

    fn requires_synchronization(&self) -> bool {
        self.synchronized
    }

    fn synchronization_key(&self) -> Option<String> {
        self.synchronized.then(|| self.db_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::validator::IntRangeValidator;
    use crate::storage::MemoryGraph;

    #[test]
    fn test_get_set_round_trip() {
        let graph = MemoryGraph::new();
        let node = graph.create_node("Person");
        let name = Property::string("name");

        name.set(&graph, &node, Value::from("Ada")).unwrap();
        assert_eq!(name.get(&graph, &node, true).unwrap(), Some(Value::from("Ada")));
    }

    #[test]
    fn test_unset_returns_default() {
        let graph = MemoryGraph::new();
        let node = graph.create_node("Person");

        let plain = Property::int("age");
        assert_eq!(plain.get(&graph, &node, true).unwrap(), None);

        let defaulted = Property::int("age").with_default(Value::Int(0));
        assert_eq!(defaulted.get(&graph, &node, true).unwrap(), Some(Value::Int(0)));
    }

    #[test]
    fn test_set_coerces_string_input() {
        let graph = MemoryGraph::new();
        let node = graph.create_node("Person");
        let age = Property::int("age");

        age.set(&graph, &node, Value::from("42")).unwrap();
        assert_eq!(node.raw("age"), Some(Value::Int(42)));
    }

    #[test]
    fn test_read_only_rejects_set() {
        let graph = MemoryGraph::new();
        let node = graph.create_node("Person");
        let key = Property::string("createdBy").read_only();

        let err = key.set(&graph, &node, Value::from("x")).unwrap_err();
        assert!(matches!(err, Error::ReadOnly(_)));
    }

    #[test]
    fn test_write_once_allows_single_write() {
        let graph = MemoryGraph::new();
        let node = graph.create_node("Person");
        let key = Property::string("uuid").write_once();

        key.set(&graph, &node, Value::from("abc")).unwrap();
        let err = key.set(&graph, &node, Value::from("def")).unwrap_err();
        assert!(matches!(err, Error::WriteOnce(_)));
        assert_eq!(node.raw("uuid"), Some(Value::from("abc")));
    }

    #[test]
    fn test_validator_rejection_leaves_value_untouched() {
        let graph = MemoryGraph::new();
        let node = graph.create_node("Person");
        let age = Property::int("age");
        age.register_validator(Arc::new(IntRangeValidator::new(0, 150)));

        age.set(&graph, &node, Value::from(42)).unwrap();
        let err = age.set(&graph, &node, Value::from(9000)).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(node.raw("age"), Some(Value::Int(42)));
    }

    #[test]
    fn test_declaring_type_set_once() {
        let key = Property::string("name");
        key.set_declaring_type("Person").unwrap();
        assert_eq!(key.declaring_type().as_deref(), Some("Person"));
        assert!(key.set_declaring_type("Company").is_err());
    }

    #[test]
    fn test_index_respects_flags() {
        let graph = MemoryGraph::new();
        let node = graph.create_node("Person");

        let unindexed = Property::string("note");
        unindexed.index(&graph, &node, Some(&Value::from("x"))).unwrap();
        assert!(graph.index_entries().is_empty());

        let indexed = Property::string("name").indexed();
        indexed.index(&graph, &node, Some(&Value::from("Ada"))).unwrap();
        assert_eq!(graph.index_entries().len(), 1);

        // Empty values are only indexed when the key opts in.
        indexed.index(&graph, &node, None).unwrap();
        assert_eq!(graph.index_entries().len(), 1);

        let when_empty = Property::string("name").indexed().indexed_when_empty();
        when_empty.index(&graph, &node, None).unwrap();
        assert_eq!(graph.index_entries().len(), 2);
    }
}
