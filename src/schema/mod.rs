//! # Schema Registry
//!
//! Keys register themselves through an explicit, caller-driven registry
//! populated during a one-time schema-bootstrap phase, not through hidden
//! static initialization. After [`SchemaRegistry::freeze`] the registry is
//! read-only for the remainder of the process lifetime; further
//! registration attempts are configuration errors.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::key::{PropertyKey, ReferenceGroup};
use crate::{Error, Result};

/// Per-declaring-type registry of property keys and reference groups.
pub struct SchemaRegistry {
    types: HashMap<String, TypeSchema>,
    frozen: bool,
}

#[derive(Default)]
struct TypeSchema {
    /// Keys in registration order.
    keys: Vec<Arc<dyn PropertyKey>>,
    by_db_name: HashMap<String, usize>,
    groups: HashMap<String, Arc<ReferenceGroup>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self { types: HashMap::new(), frozen: false }
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.frozen {
            return Err(Error::Configuration(
                "schema registry is frozen; registration is a bootstrap-phase operation".to_owned(),
            ));
        }
        Ok(())
    }

    /// Register a key against a declaring type. Assigns the key's declaring
    /// type back-reference and invokes its registration callback, exactly
    /// once per key.
    pub fn register_property(
        &mut self,
        entity_type: &str,
        key: Arc<dyn PropertyKey>,
    ) -> Result<()> {
        self.ensure_mutable()?;

        let schema = self.types.entry(entity_type.to_owned()).or_default();
        if schema.by_db_name.contains_key(key.db_name()) {
            return Err(Error::Configuration(format!(
                "type '{entity_type}' already has a property named '{}'",
                key.db_name()
            )));
        }

        key.set_declaring_type(entity_type)?;
        key.registration_callback(entity_type);

        schema.by_db_name.insert(key.db_name().to_owned(), schema.keys.len());
        schema.keys.push(key);
        Ok(())
    }

    /// Register a reference group: the group itself as a key, plus its
    /// synthetic `"<name>.nullValuesOnly"` companion flag.
    pub fn register_group(&mut self, entity_type: &str, group: Arc<ReferenceGroup>) -> Result<()> {
        if group.entity_type() != entity_type {
            return Err(Error::Configuration(format!(
                "reference group '{}' was constructed for type '{}', not '{entity_type}'",
                group.json_name(),
                group.entity_type()
            )));
        }

        self.register_property(entity_type, group.clone())?;
        self.register_property(entity_type, group.null_values_only_key())?;

        self.types
            .entry(entity_type.to_owned())
            .or_default()
            .groups
            .insert(group.json_name().to_owned(), group);
        Ok(())
    }

    /// End the bootstrap phase. Idempotent.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Look up a key by storage or external name.
    pub fn key(&self, entity_type: &str, name: &str) -> Option<Arc<dyn PropertyKey>> {
        let schema = self.types.get(entity_type)?;
        if let Some(&pos) = schema.by_db_name.get(name) {
            return Some(schema.keys[pos].clone());
        }
        schema.keys.iter().find(|k| k.json_name() == name).cloned()
    }

    /// All keys of a type, in registration order.
    pub fn keys(&self, entity_type: &str) -> Vec<Arc<dyn PropertyKey>> {
        self.types
            .get(entity_type)
            .map(|schema| schema.keys.clone())
            .unwrap_or_default()
    }

    pub fn group(&self, entity_type: &str, name: &str) -> Option<Arc<ReferenceGroup>> {
        self.types.get(entity_type)?.groups.get(name).cloned()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
