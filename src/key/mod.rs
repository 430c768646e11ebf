//! # The Polymorphic Key Layer
//!
//! `PropertyKey` is the capability contract every key kind satisfies:
//! read, write, convert, validate, index, and search-predicate
//! construction over a value that may be
//!
//! - stored directly on the entity ([`Property`]),
//! - stored on another entity reached by navigating a relationship
//!   ([`Reference`]),
//! - assembled from several such navigations into one grouped value
//!   ([`ReferenceGroup`]),
//! - or reduced element-wise between live entities and identifiers
//!   ([`CollectionNotionProperty`]).
//!
//! Keys are built once during schema bootstrap, registered into a
//! [`crate::schema::SchemaRegistry`], and shared read-only for the process
//! lifetime.

pub mod converter;
pub mod notion;
pub mod propagate;
pub mod property;
pub mod reference;
pub mod reference_group;
pub mod validator;

use std::sync::Arc;

use crate::Result;
use crate::model::{GraphObject, Value};
use crate::search::{Occurrence, SearchAttribute};
use crate::storage::GraphStore;

pub use converter::{CoercionConverter, PropertyConverter, ValueType};
pub use notion::{CollectionNotionProperty, CollectionSource, Notion, UuidListCollection};
pub use propagate::{apply_properties, apply_properties_recursive};
pub use property::Property;
pub use reference::{Navigation, Reference};
pub use reference_group::{PropertyGroup, ReferenceGroup};
pub use validator::{IntRangeValidator, NonEmptyStringValidator, PropertyValidator};

/// The uniform capability contract over all key kinds.
///
/// Identity is the declared name pair: `db_name` (storage name) and
/// `json_name` (external name). Instances are immutable after registration
/// except for the single declaring-type assignment performed by the
/// registry.
pub trait PropertyKey: Send + Sync {
    /// Name the value is stored under.
    fn db_name(&self) -> &str;

    /// Name the value is exposed under externally.
    fn json_name(&self) -> &str;

    /// Declared type name, for error messages and serialization hints.
    fn type_name(&self) -> &'static str;

    /// Value returned by `get` when nothing is stored.
    fn default_value(&self) -> Option<Value> {
        None
    }

    /// Entity type a delegating key navigates to, if any.
    fn related_type(&self) -> Option<String> {
        None
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    fn is_read_only(&self) -> bool {
        false
    }

    fn is_write_once(&self) -> bool {
        false
    }

    fn is_indexed(&self) -> bool {
        false
    }

    fn is_passively_indexed(&self) -> bool {
        false
    }

    fn is_searchable(&self) -> bool {
        false
    }

    fn is_indexed_when_empty(&self) -> bool {
        false
    }

    fn is_collection(&self) -> bool {
        false
    }

    // ------------------------------------------------------------------
    // Registration (invoked once, by the SchemaRegistry)
    // ------------------------------------------------------------------

    /// The entity type this key was registered against, once registered.
    fn declaring_type(&self) -> Option<String>;

    /// One-time back-reference assignment at registration. Registering the
    /// same key against a second type is a configuration error.
    fn set_declaring_type(&self, entity_type: &str) -> Result<()>;

    /// Hook invoked by the registry after the declaring type is assigned.
    fn registration_callback(&self, _entity_type: &str) {}

    // ------------------------------------------------------------------
    // Conversion and validation
    // ------------------------------------------------------------------

    /// Transform between runtime and storage representation, if any.
    fn database_converter(&self) -> Option<Arc<dyn PropertyConverter>> {
        None
    }

    /// Transform between external input and runtime representation, if any.
    fn input_converter(&self) -> Option<Arc<dyn PropertyConverter>> {
        None
    }

    /// Attach a validator. Bootstrap-phase only.
    fn register_validator(&self, validator: Arc<dyn PropertyValidator>);

    fn validators(&self) -> Vec<Arc<dyn PropertyValidator>>;

    // ------------------------------------------------------------------
    // Core operations
    // ------------------------------------------------------------------

    /// Read the current value. A capability that cannot apply (dangling
    /// navigation, unset value without default) yields `Ok(None)`,
    /// never an error.
    fn get(
        &self,
        store: &dyn GraphStore,
        obj: &dyn GraphObject,
        apply_converter: bool,
    ) -> Result<Option<Value>>;

    /// Write a value through the delegation chain. Fails on validator
    /// rejection, conversion failure, or read-only/write-once violation;
    /// otherwise mutates the target entity reached by this key.
    fn set(&self, store: &dyn GraphStore, obj: &dyn GraphObject, value: Value) -> Result<()>;

    /// Build a predicate for the external query engine.
    fn search_attribute(
        &self,
        occurrence: Occurrence,
        search_value: Value,
        exact: bool,
    ) -> SearchAttribute;

    /// Hand the given value to the index sink, subject to this key's index
    /// flags.
    fn index(
        &self,
        store: &dyn GraphStore,
        obj: &dyn GraphObject,
        value: Option<&Value>,
    ) -> Result<()>;

    // ------------------------------------------------------------------
    // Cross-field synchronization bookkeeping
    // ------------------------------------------------------------------

    fn requires_synchronization(&self) -> bool {
        false
    }

    fn synchronization_key(&self) -> Option<String> {
        None
    }
}
