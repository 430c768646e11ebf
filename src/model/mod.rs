//! # Graph Object Model
//!
//! The data types and access traits that cross every boundary of the key
//! layer: storage ↔ keys ↔ serialization.
//!
//! Design rule: no key semantics here. This module is values, handles, and
//! the ordered payload type — converter, validator, and delegation logic
//! lives in [`crate::key`].

pub mod object;
pub mod property_map;
pub mod value;

pub use object::{GraphObject, ObjectHandle, RelationshipObject};
pub use property_map::PropertyMap;
pub use value::Value;
