//! Transform engine: deep copy and cross-type mapping
//!
//! The engine owns the metadata caches (through its introspector and strategy
//! resolver) and can be shared between threads. The object graphs it walks are
//! per-thread, and each top-level call tracks visited identities on its own.
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

mod copy;
mod map;
mod visited;


pub use visited::VisitedSet;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::CacheStats;
use crate::config::{CopyPolicy, MapperConfig};
use crate::error::{MapperError, Result};
use crate::introspect::TypeIntrospector;
use crate::model::{ContainerFactory, TypeHandle, Value};
use crate::registry::{TypeRegistry, TypeRegistryBuilder};
use crate::strategy::MappingStrategyResolver;

/// Entry point for copying and mapping object graphs
#[derive(Debug)]
pub struct TransformEngine {
    registry: Arc<TypeRegistry>,
    introspector: Arc<TypeIntrospector>,
    strategies: MappingStrategyResolver,
    containers: ContainerFactory,
    copy_policy: CopyPolicy,
}

impl TransformEngine {
    /// Create an engine over an already built registry.
    ///
    /// Bindings in `config` must already be part of the registry; use
    /// [`TransformEngine::bootstrap`] to have them applied.
    pub fn new(registry: Arc<TypeRegistry>, config: &MapperConfig) -> Result<Self> {
        config.validate()?;

        for (type_name, field, accessor) in config.bindings.iter() {
            let applied = registry
                .get(type_name)
                .and_then(|descriptor| descriptor.fields().iter().find(|f| f.name() == field))
                .and_then(|f| f.accessor_tag())
                == Some(accessor);
            if !applied {
                return Err(MapperError::configuration(format!(
                    "binding {}.{} -> {} is not applied to the registry",
                    type_name, field, accessor
                )));
            }
        }

        let introspector = Arc::new(TypeIntrospector::new(
            Arc::clone(&registry),
            config.cache_capacity,
        ));
        let strategies = MappingStrategyResolver::new(Arc::clone(&introspector), config.cache_capacity);

        debug!(
            types = registry.len(),
            cache_capacity = config.cache_capacity,
            copy_policy = %config.copy_policy,
            "transform engine ready"
        );

        Ok(Self {
            registry,
            introspector,
            strategies,
            containers: ContainerFactory::standard(),
            copy_policy: config.copy_policy,
        })
    }

    /// Apply the configured bindings, build the registry and create the engine
    pub fn bootstrap(builder: TypeRegistryBuilder, config: MapperConfig) -> Result<Self> {
        config.validate()?;
        let registry = builder.apply_bindings(&config.bindings).build()?;
        Self::new(Arc::new(registry), &config)
    }

    /// Replace the container factory used to instantiate copied containers
    pub fn with_container_factory(mut self, containers: ContainerFactory) -> Self {
        self.containers = containers;
        self
    }

    /// Deep copy `value`. Aliases and cycles of the source are reproduced in
    /// the copy; leaves are shared.
    pub fn copy(&self, value: &Value) -> Result<Value> {
        let mut memo = VisitedSet::new();
        match self.copy_value(value, &mut memo) {
            Ok(copied) => Ok(copied),
            Err(err) => match self.copy_policy {
                CopyPolicy::Strict => Err(err),
                CopyPolicy::BestEffort => {
                    warn!(error = %err, source = ?value, "deep copy failed, yielding null");
                    Ok(Value::Null)
                }
            },
        }
    }

    /// Map `source` into a new value of type `target`
    pub fn map(&self, source: &Value, target: &TypeHandle) -> Result<Value> {
        debug!(source = ?source, target = %target, "mapping value");
        let mut visited = VisitedSet::new();
        self.map_value(source, target, &mut visited)
    }

    /// Map every element as its own top-level call, keeping order and length
    pub fn map_list(&self, sources: &[Value], target: &TypeHandle) -> Result<Vec<Value>> {
        sources.iter().map(|source| self.map(source, target)).collect()
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn introspector(&self) -> &Arc<TypeIntrospector> {
        &self.introspector
    }

    pub fn strategies(&self) -> &MappingStrategyResolver {
        &self.strategies
    }

    pub fn containers(&self) -> &ContainerFactory {
        &self.containers
    }

    pub fn copy_policy(&self) -> CopyPolicy {
        self.copy_policy
    }

    /// Drop all cached metadata
    pub fn clear_caches(&self) {
        self.introspector.clear();
        self.strategies.clear();
    }

    /// Combined statistics of every metadata cache
    pub fn cache_stats(&self) -> CacheStats {
        self.introspector.stats().combine(self.strategies.stats())
    }
}
