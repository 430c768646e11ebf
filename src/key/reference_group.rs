//! Composite key assembling several [`Reference`]s into one grouped value.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::OnceLock;

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::model::{GraphObject, PropertyMap, Value};
use crate::search::{Occurrence, SearchAttribute, SearchAttributeGroup};
use crate::storage::GraphStore;
use crate::{Error, Result};
use super::property::Property;
use super::reference::Reference;
use super::{PropertyKey, PropertyValidator};

/// Assembly and disassembly of a grouped value.
pub trait PropertyGroup: Send + Sync {
    /// Read the grouped value off a relationship. `None` for anything that
    /// is not a relationship; members whose navigation target is absent are
    /// omitted from the result.
    fn grouped_properties(
        &self,
        store: &dyn GraphStore,
        source: &dyn GraphObject,
    ) -> Result<Option<PropertyMap>>;

    /// Write the grouped value through each member's navigation. Members
    /// that cannot resolve, and members marked read-only, are skipped
    /// silently.
    fn set_grouped_properties(
        &self,
        store: &dyn GraphStore,
        values: &PropertyMap,
        destination: &dyn GraphObject,
    ) -> Result<()>;
}

/// A virtual key over an ordered set of [`Reference`]s.
///
/// The member set is fixed at construction; insertion order is the
/// serialization order. Alongside the group a boolean
/// `"<name>.nullValuesOnly"` companion key is synthesized; the registry
/// registers both against the declaring type.
pub struct ReferenceGroup {
    name: String,
    entity_type: String,
    /// Ordered `json_name -> Reference`. Groups are small, typically two or
    /// three members.
    members: SmallVec<[(String, Arc<Reference>); 4]>,
    null_values_only: Arc<Property>,
    declaring_type: OnceLock<String>,
}

impl ReferenceGroup {
    pub fn new(name: &str, entity_type: &str, references: Vec<Reference>) -> Self {
        let members = references
            .into_iter()
            .map(|r| (r.json_name().to_owned(), Arc::new(r)))
            .collect();

        Self {
            name: name.to_owned(),
            entity_type: entity_type.to_owned(),
            members,
            null_values_only: Arc::new(Property::boolean(&format!("{name}.nullValuesOnly"))),
            declaring_type: OnceLock::new(),
        }
    }

    /// The entity type this group was constructed for.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// The synthetic boolean companion key registered alongside the group.
    pub fn null_values_only_key(&self) -> Arc<Property> {
        self.null_values_only.clone()
    }

    /// Members in insertion order.
    pub fn references(&self) -> impl Iterator<Item = &Arc<Reference>> {
        self.members.iter().map(|(_, r)| r)
    }

    /// Look up a member by its external name.
    ///
    /// Unknown names fail fast with a configuration error at lookup time —
    /// construction with names that are never looked up must succeed, since
    /// callers may probe for optional nested fields.
    pub fn nested_property(&self, name: &str) -> Result<Arc<Reference>> {
        self.members
            .iter()
            .find(|(json_name, _)| json_name == name)
            .map(|(_, r)| r.clone())
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "reference group '{}' does not contain grouped property '{name}'",
                    self.name
                ))
            })
    }

    /// A plain by-name key for direct access to a nested member, without
    /// fetching the group first.
    pub fn direct_access_key(&self, name: &str) -> Result<Property> {
        let member = self.nested_property(name)?;
        Ok(Property::generic(member.db_name()))
    }

    /// Build the group predicate: one Must member per supplied non-null
    /// value; members without a supplied value contribute nothing.
    pub fn grouped_search_attribute(
        &self,
        occurrence: Occurrence,
        search_values: &PropertyMap,
        exact: bool,
    ) -> SearchAttribute {
        let mut group = SearchAttributeGroup::new(occurrence);
        for (json_name, member) in &self.members {
            if let Some(value) = search_values.get_by_json_name(json_name) {
                if !value.is_null() {
                    group.add(SearchAttribute::property(
                        member.db_name(),
                        value.clone(),
                        Occurrence::Must,
                        exact,
                    ));
                }
            }
        }
        SearchAttribute::Group(group)
    }

    /// Reassemble a `PropertyMap` from an external name→value map, keyed by
    /// the members' delegate keys. Names that match no member are ignored.
    fn property_map_from_input(&self, input: &HashMap<String, Value>) -> PropertyMap {
        let mut map = PropertyMap::new();
        for (json_name, member) in &self.members {
            if let Some(value) = input.get(json_name) {
                map.put(member.delegate_key().clone(), value.clone());
            }
        }
        map
    }
}

impl PropertyGroup for ReferenceGroup {
    fn grouped_properties(
        &self,
        store: &dyn GraphStore,
        source: &dyn GraphObject,
    ) -> Result<Option<PropertyMap>> {
        if source.as_relationship().is_none() {
            return Ok(None);
        }

        let mut properties = PropertyMap::new();
        for (json_name, member) in &self.members {
            match member.resolve(Some(source)) {
                Some(entity) => {
                    let value = member.target_key().get(store, entity.as_ref(), true)?;
                    properties.put(member.delegate_key().clone(), value.unwrap_or(Value::Null));
                }
                None => {
                    debug!(group = %self.name, member = %json_name, "referenced entity absent, omitting entry");
                }
            }
        }
        Ok(Some(properties))
    }

    fn set_grouped_properties(
        &self,
        store: &dyn GraphStore,
        values: &PropertyMap,
        destination: &dyn GraphObject,
    ) -> Result<()> {
        if destination.as_relationship().is_none() {
            return Ok(());
        }

        for (json_name, member) in &self.members {
            let Some(entity) = member.resolve(Some(destination)) else {
                debug!(group = %self.name, member = %json_name, "referenced entity absent, write skipped");
                continue;
            };
            if member.is_read_only() {
                debug!(group = %self.name, member = %json_name, "member is read-only, write skipped");
                continue;
            }

            let value = values
                .get(member.delegate_key().as_ref())
                .cloned()
                .unwrap_or(Value::Null);
            member.target_key().set(store, entity.as_ref(), value)?;
        }
        Ok(())
    }
}

impl PropertyKey for ReferenceGroup {
    fn db_name(&self) -> &str {
        &self.name
    }

    fn json_name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "MAP"
    }

    /// A group yields one composite value, never a collection.
    fn is_collection(&self) -> bool {
        false
    }

    fn declaring_type(&self) -> Option<String> {
        self.declaring_type.get().cloned()
    }

    fn set_declaring_type(&self, entity_type: &str) -> Result<()> {
        self.declaring_type.set(entity_type.to_owned()).map_err(|_| {
            Error::Configuration(format!(
                "reference group '{}' is already declared by type '{}'",
                self.name,
                self.declaring_type.get().map(String::as_str).unwrap_or("?"),
            ))
        })?;

        // References ignore the assignment; forwarding keeps the contract uniform.
        for (_, member) in &self.members {
            member.set_declaring_type(entity_type)?;
        }
        Ok(())
    }

    /// Validation happens at the member level; direct validators on the
    /// group itself are not supported.
    fn register_validator(&self, _validator: Arc<dyn PropertyValidator>) {
        warn!(group = %self.name, "reference groups do not support direct validators, ignoring");
    }

    fn validators(&self) -> Vec<Arc<dyn PropertyValidator>> {
        Vec::new()
    }

    fn get(
        &self,
        store: &dyn GraphStore,
        obj: &dyn GraphObject,
        _apply_converter: bool,
    ) -> Result<Option<Value>> {
        let Some(map) = self.grouped_properties(store, obj)? else {
            return Ok(None);
        };
        let mut out = HashMap::with_capacity(map.len());
        for (key, value) in map.iter() {
            out.insert(key.json_name().to_owned(), value.clone());
        }
        Ok(Some(Value::Map(out)))
    }

    fn set(&self, store: &dyn GraphStore, obj: &dyn GraphObject, value: Value) -> Result<()> {
        let values = match value {
            Value::Map(input) => self.property_map_from_input(&input),
            Value::Null => PropertyMap::new(),
            other => {
                return Err(Error::Conversion {
                    key: self.name.clone(),
                    expected: "MAP".to_owned(),
                    got: other.type_name().to_owned(),
                });
            }
        };
        self.set_grouped_properties(store, &values, obj)
    }

    fn search_attribute(
        &self,
        occurrence: Occurrence,
        search_value: Value,
        exact: bool,
    ) -> SearchAttribute {
        let values = match search_value {
            Value::Map(input) => self.property_map_from_input(&input),
            _ => PropertyMap::new(),
        };
        self.grouped_search_attribute(occurrence, &values, exact)
    }

    /// Index each member with the value obtained specifically for indexing.
    fn index(
        &self,
        store: &dyn GraphStore,
        obj: &dyn GraphObject,
        _value: Option<&Value>,
    ) -> Result<()> {
        for (_, member) in &self.members {
            let value = obj.raw_for_indexing(member.db_name());
            member.index(store, obj, value.as_ref())?;
        }
        Ok(())
    }
}
