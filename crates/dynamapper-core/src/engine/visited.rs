//! Identity tracking for one top-level engine call
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

use std::collections::HashMap;

use crate::model::{Identity, Value};

/// Maps the identity of each source value already scheduled in this call to
/// the value materialized for it.
///
/// The source handle is kept alongside the destination so its allocation
/// cannot be freed and reused by another value while the call is running.
#[derive(Debug, Default)]
pub struct VisitedSet {
    entries: HashMap<Identity, (Value, Value)>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `destination` as the value built for `source`.
    /// Leaves have no identity and are not recorded.
    pub fn insert(&mut self, source: &Value, destination: Value) {
        if let Some(identity) = source.identity() {
            self.entries.insert(identity, (source.clone(), destination));
        }
    }

    /// Destination already materialized for `source`, if any
    pub fn get(&self, source: &Value) -> Option<&Value> {
        source
            .identity()
            .and_then(|identity| self.entries.get(&identity))
            .map(|(_, destination)| destination)
    }

    pub fn contains(&self, source: &Value) -> bool {
        self.get(source).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Instance;

    #[test]
    fn test_tracks_by_identity() {
        let mut visited = VisitedSet::new();
        let person = Value::object(Instance::new("Person"));
        let twin = Value::object(Instance::new("Person"));
        let dto = Value::object(Instance::new("PersonVO"));

        visited.insert(&person, dto.clone());
        assert!(visited.contains(&person.clone()));
        assert!(!visited.contains(&twin));
        assert!(visited.get(&person).unwrap().ptr_eq(&dto));
    }

    #[test]
    fn test_leaves_are_not_recorded() {
        let mut visited = VisitedSet::new();
        visited.insert(&Value::text("Jane"), Value::Null);
        assert!(visited.is_empty());
        assert!(!visited.contains(&Value::text("Jane")));
    }
}
