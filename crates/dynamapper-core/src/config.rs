//! Configuration for the mapping engine
//!
//! Configuration comes from defaults, YAML/JSON files or in-memory strings.
//! Field bindings can be declared here instead of on the type registrations.
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MapperError, Result};

/// Default number of entries held by each metadata cache
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// How deep copy reacts to a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CopyPolicy {
    /// Surface the error to the caller
    #[default]
    Strict,
    /// Log the error and yield a null copy
    BestEffort,
}

impl fmt::Display for CopyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyPolicy::Strict => write!(f, "strict"),
            CopyPolicy::BestEffort => write!(f, "best_effort"),
        }
    }
}

/// Explicit field bindings: destination type -> field -> source accessor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingTable {
    bindings: BTreeMap<String, BTreeMap<String, String>>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding, builder style
    pub fn bind(
        mut self,
        type_name: impl Into<String>,
        field: impl Into<String>,
        accessor: impl Into<String>,
    ) -> Self {
        self.insert(type_name, field, accessor);
        self
    }

    /// Add or replace a binding, returning the accessor it replaced
    pub fn insert(
        &mut self,
        type_name: impl Into<String>,
        field: impl Into<String>,
        accessor: impl Into<String>,
    ) -> Option<String> {
        self.bindings
            .entry(type_name.into())
            .or_default()
            .insert(field.into(), accessor.into())
    }

    pub fn accessor_for(&self, type_name: &str, field: &str) -> Option<&str> {
        self.bindings
            .get(type_name)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
    }

    /// All bindings as `(type, field, accessor)` in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.bindings.iter().flat_map(|(type_name, fields)| {
            fields
                .iter()
                .map(move |(field, accessor)| (type_name.as_str(), field.as_str(), accessor.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.bindings.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Capacity of each metadata cache
    pub cache_capacity: usize,

    /// Failure policy for deep copy
    pub copy_policy: CopyPolicy,

    /// Field bindings applied on top of the registered tags
    pub bindings: BindingTable,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            copy_policy: CopyPolicy::Strict,
            bindings: BindingTable::default(),
        }
    }
}

impl MapperConfig {
    /// Load configuration from a file, YAML for `.yaml`/`.yml` and JSON otherwise
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            Self::from_yaml_str(&content)?
        } else {
            Self::from_json_str(&content)?
        };

        tracing::debug!(path = %path.display(), "loaded mapper configuration");
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_copy_policy(mut self, policy: CopyPolicy) -> Self {
        self.copy_policy = policy;
        self
    }

    pub fn with_bindings(mut self, bindings: BindingTable) -> Self {
        self.bindings = bindings;
        self
    }

    /// Check the configuration for values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(MapperError::configuration(
                "cache_capacity must be greater than zero",
            ));
        }

        for (type_name, field, accessor) in self.bindings.iter() {
            if accessor.trim().is_empty() {
                return Err(MapperError::configuration(format!(
                    "binding for {}.{} names an empty accessor",
                    type_name, field
                )));
            }
        }

        Ok(())
    }
}
