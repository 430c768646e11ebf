//! Search predicate tree.
//!
//! `PropertyKey::search_attribute` produces these; the external query engine
//! consumes them. This layer only builds the tree — it never evaluates it.

use serde::Serialize;

use crate::model::Value;

/// Boolean occurrence rule for a predicate within its enclosing group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Occurrence {
    Must,
    Should,
    MustNot,
}

/// A node in the predicate tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SearchAttribute {
    /// Leaf predicate on a single key.
    Property {
        /// Storage name of the key being matched.
        key: String,
        value: Value,
        occurrence: Occurrence,
        exact: bool,
    },
    /// Combination of child predicates under one occurrence rule.
    Group(SearchAttributeGroup),
}

impl SearchAttribute {
    pub fn property(key: impl Into<String>, value: Value, occurrence: Occurrence, exact: bool) -> Self {
        SearchAttribute::Property { key: key.into(), value, occurrence, exact }
    }

    pub fn occurrence(&self) -> Occurrence {
        match self {
            SearchAttribute::Property { occurrence, .. } => *occurrence,
            SearchAttribute::Group(group) => group.occurrence,
        }
    }
}

/// A group of predicates combined under a boolean occurrence rule supplied
/// by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchAttributeGroup {
    pub occurrence: Occurrence,
    pub members: Vec<SearchAttribute>,
}

impl SearchAttributeGroup {
    pub fn new(occurrence: Occurrence) -> Self {
        Self { occurrence, members: Vec::new() }
    }

    pub fn add(&mut self, member: SearchAttribute) {
        self.members.push(member);
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}

impl From<SearchAttributeGroup> for SearchAttribute {
    fn from(group: SearchAttributeGroup) -> Self {
        SearchAttribute::Group(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_collects_members() {
        let mut group = SearchAttributeGroup::new(Occurrence::Must);
        assert!(group.is_empty());

        group.add(SearchAttribute::property("name", Value::from("Ada"), Occurrence::Must, true));
        group.add(SearchAttribute::property("age", Value::from(3), Occurrence::Should, false));

        assert_eq!(group.len(), 2);
        let attr = SearchAttribute::from(group);
        assert_eq!(attr.occurrence(), Occurrence::Must);
    }
}
