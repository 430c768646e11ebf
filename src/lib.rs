//! # graphkey — Polymorphic Property-Key Layer for Property Graphs
//!
//! The mapping layer between a graph object model and its storage, index,
//! and query collaborators: one uniform get/set/convert/validate/index/
//! search contract over values that may be stored directly on an entity,
//! reached by navigating a relationship, or assembled from several such
//! navigations into one virtual grouped value.
//!
//! ## Design Principles
//!
//! 1. **One contract, many storage strategies**: `PropertyKey` is the
//!    capability trait; `Property`, `Reference`, `ReferenceGroup`, and
//!    `CollectionNotionProperty` are its strategies
//! 2. **Composition over inheritance**: a `Reference` is a thin forwarding
//!    wrapper around its delegate, plus one navigation rule
//! 3. **Explicit bootstrap**: keys are registered once into a
//!    `SchemaRegistry` the host drives, then shared read-only
//! 4. **Fail fast on misconfiguration, degrade gracefully on missing
//!    data**: unknown nested names are errors; dangling endpoints are not
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use graphkey::{
//!     GraphObject, MemoryGraph, Navigation, Property, PropertyGroup,
//!     Reference, ReferenceGroup, SchemaRegistry, Value,
//! };
//!
//! fn main() -> graphkey::Result<()> {
//!     let graph = MemoryGraph::new();
//!
//!     // Schema bootstrap: an "owner" group exposing the source node's
//!     // name as part of the relationship.
//!     let group = Arc::new(ReferenceGroup::new(
//!         "owner",
//!         "Ownership",
//!         vec![Reference::new(
//!             Arc::new(Property::generic("name")),
//!             Navigation::FromStart,
//!             Arc::new(Property::string("name")),
//!         )],
//!     ));
//!     let mut registry = SchemaRegistry::new();
//!     registry.register_group("Ownership", group.clone())?;
//!     registry.freeze();
//!
//!     // Graph data: Alice owns a thing.
//!     let alice = graph.create_node("Person");
//!     alice.set_raw("name", Value::from("Alice"))?;
//!     let thing = graph.create_node("Thing");
//!     let rel = graph.create_relationship(&alice.uuid(), &thing.uuid(), "OWNS")?;
//!
//!     // The grouped value reads through the navigation.
//!     let props = group.grouped_properties(&graph, &rel)?.unwrap();
//!     assert_eq!(props.get_by_json_name("name"), Some(&Value::from("Alice")));
//!     Ok(())
//! }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod key;
pub mod model;
pub mod schema;
pub mod search;
pub mod storage;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{GraphObject, ObjectHandle, PropertyMap, RelationshipObject, Value};

// ============================================================================
// Re-exports: Keys (the core contract)
// ============================================================================

pub use key::{
    apply_properties, apply_properties_recursive, CoercionConverter, CollectionNotionProperty,
    CollectionSource, IntRangeValidator, Navigation, NonEmptyStringValidator, Notion, Property,
    PropertyConverter, PropertyGroup, PropertyKey, PropertyValidator, Reference, ReferenceGroup,
    UuidListCollection, ValueType,
};

// ============================================================================
// Re-exports: Search, Schema, Storage
// ============================================================================

pub use schema::SchemaRegistry;
pub use search::{Occurrence, SearchAttribute, SearchAttributeGroup};
pub use storage::{GraphStore, IndexEntry, MemoryGraph, NodeHandle, RelationshipHandle};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Misconfiguration: unknown nested name, duplicate or post-freeze
    /// registration, declaring-type mismatch. Fails fast, never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A registered validator rejected a value on `set`.
    #[error("Validation failed for property '{key}': {message}")]
    Validation { key: String, message: String },

    /// A converter could not transform a value between storage and
    /// runtime/input form.
    #[error("Conversion failed for property '{key}': expected {expected}, got {got}")]
    Conversion { key: String, expected: String, got: String },

    /// Direct write to a read-only property.
    #[error("Property '{0}' is read-only")]
    ReadOnly(String),

    /// Overwrite of a write-once property that already holds a value.
    #[error("Property '{0}' may only be written once")]
    WriteOnce(String),

    /// Propagated from the storage collaborator.
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;
