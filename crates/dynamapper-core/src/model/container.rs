//! Homogeneous containers and the factory that instantiates them by name
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

use std::collections::HashMap;

use super::value::Value;
use crate::error::{MapperError, Result};

/// Concrete container implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Resizable array-backed list
    ArrayList,
    /// Doubly linked list
    LinkedList,
    /// Hash-based set, identity for objects and value equality for leaves
    HashSet,
    /// Hash-based map of key/value entries
    HashMap,
}

impl ContainerKind {
    /// Advertised name of the concrete implementation
    pub fn type_name(&self) -> &'static str {
        match self {
            ContainerKind::ArrayList => "ArrayList",
            ContainerKind::LinkedList => "LinkedList",
            ContainerKind::HashSet => "HashSet",
            ContainerKind::HashMap => "HashMap",
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, ContainerKind::HashMap)
    }
}

/// Advertised names every standard factory knows
const STANDARD_NAMES: [(&str, ContainerKind); 9] = [
    ("Collection", ContainerKind::ArrayList),
    ("List", ContainerKind::ArrayList),
    ("ArrayList", ContainerKind::ArrayList),
    ("Arrays.ArrayList", ContainerKind::ArrayList),
    ("LinkedList", ContainerKind::LinkedList),
    ("Set", ContainerKind::HashSet),
    ("HashSet", ContainerKind::HashSet),
    ("Map", ContainerKind::HashMap),
    ("HashMap", ContainerKind::HashMap),
];

fn standard_kind(advertised: &str) -> Option<ContainerKind> {
    STANDARD_NAMES
        .iter()
        .find(|(name, _)| *name == advertised)
        .map(|(_, kind)| *kind)
}

#[derive(Debug, Clone)]
enum Storage {
    Sequence(Vec<Value>),
    Entries(Vec<(Value, Value)>),
}

/// A mutable container value
///
/// The advertised name is what the container factory is asked for when the
/// container is copied; it may be an interface-style name such as `"Set"`.
#[derive(Debug, Clone)]
pub struct ContainerValue {
    advertised: String,
    kind: ContainerKind,
    storage: Storage,
}

impl ContainerValue {
    /// Create an empty container advertised under its implementation name
    pub fn new(kind: ContainerKind) -> Self {
        Self::with_name(kind.type_name().to_string(), kind)
    }

    /// Create an empty container advertised under a custom name
    ///
    /// A standard name must agree with `kind`, otherwise a copy would be
    /// rebuilt as a different implementation. Names outside the standard
    /// table are accepted and left to the factory that copies them.
    pub fn advertised_as(advertised: impl Into<String>, kind: ContainerKind) -> Result<Self> {
        let advertised = advertised.into();
        match standard_kind(&advertised) {
            Some(standard) if standard != kind => Err(MapperError::type_mismatch(
                format!("{} for advertised name {}", standard.type_name(), advertised),
                kind.type_name(),
            )),
            _ => Ok(Self::with_name(advertised, kind)),
        }
    }

    fn with_name(advertised: String, kind: ContainerKind) -> Self {
        let storage = if kind.is_map() {
            Storage::Entries(Vec::new())
        } else {
            Storage::Sequence(Vec::new())
        };
        Self {
            advertised,
            kind,
            storage,
        }
    }

    /// Build a sequence container from elements, applying set semantics when needed
    pub fn from_elements(kind: ContainerKind, elements: impl IntoIterator<Item = Value>) -> Result<Self> {
        let mut container = Self::new(kind);
        for element in elements {
            container.push(element)?;
        }
        Ok(container)
    }

    pub fn advertised_name(&self) -> &str {
        &self.advertised
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Append an element. Sets ignore elements already present and return `false`.
    pub fn push(&mut self, value: Value) -> Result<bool> {
        match &mut self.storage {
            Storage::Sequence(items) => {
                if self.kind == ContainerKind::HashSet && items.iter().any(|v| v.entry_eq(&value)) {
                    return Ok(false);
                }
                items.push(value);
                Ok(true)
            }
            Storage::Entries(_) => Err(MapperError::type_mismatch(
                "sequence container",
                self.advertised.clone(),
            )),
        }
    }

    /// Insert a map entry, returning the value it replaced
    pub fn insert(&mut self, key: Value, value: Value) -> Result<Option<Value>> {
        match &mut self.storage {
            Storage::Entries(entries) => {
                if let Some(slot) = entries.iter_mut().find(|(k, _)| k.entry_eq(&key)) {
                    return Ok(Some(std::mem::replace(&mut slot.1, value)));
                }
                entries.push((key, value));
                Ok(None)
            }
            Storage::Sequence(_) => Err(MapperError::type_mismatch(
                "map container",
                self.advertised.clone(),
            )),
        }
    }

    /// Sequence elements in iteration order; empty for maps
    pub fn elements(&self) -> &[Value] {
        match &self.storage {
            Storage::Sequence(items) => items,
            Storage::Entries(_) => &[],
        }
    }

    /// Map entries in insertion order; empty for sequences
    pub fn entries(&self) -> &[(Value, Value)] {
        match &self.storage {
            Storage::Entries(entries) => entries,
            Storage::Sequence(_) => &[],
        }
    }

    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Sequence(items) => items.len(),
            Storage::Entries(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Maps a container's advertised name to a concrete implementation
#[derive(Debug, Clone)]
pub struct ContainerFactory {
    implementations: HashMap<String, ContainerKind>,
}

impl ContainerFactory {
    /// Factory with the standard name table
    pub fn standard() -> Self {
        let mut factory = Self::empty();
        for (name, kind) in STANDARD_NAMES {
            factory.register(name, kind);
        }
        factory
    }

    /// Factory with no registered names
    pub fn empty() -> Self {
        Self {
            implementations: HashMap::new(),
        }
    }

    /// Register (or override) the implementation behind an advertised name
    pub fn register(&mut self, advertised: impl Into<String>, kind: ContainerKind) -> &mut Self {
        self.implementations.insert(advertised.into(), kind);
        self
    }

    /// Resolve an advertised name to its implementation
    pub fn resolve(&self, advertised: &str) -> Result<ContainerKind> {
        self.implementations.get(advertised).copied().ok_or_else(|| {
            MapperError::instantiation(advertised, "no registered container implementation")
        })
    }

    /// Create a fresh, empty container for an advertised name
    pub fn instantiate(&self, advertised: &str) -> Result<ContainerValue> {
        self.resolve(advertised).map(ContainerValue::new)
    }
}

impl Default for ContainerFactory {
    fn default() -> Self {
        Self::standard()
    }
}
