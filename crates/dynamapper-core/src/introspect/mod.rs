//! Type introspection over the registry
//!
//! This module provides:
//! - Hierarchy-wide field and method collection, cached per type
//! - Composable criteria for filtering descriptors
//! - Name-sorted method views with binary lookup
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

pub mod criteria;
pub mod sorted;

pub use criteria::{
    accessor_by_name_criteria, getter_criteria, setter_criteria, CompoundCriteria, Criteria,
    DecoratorCriteria, NamePatternCriteria, Named, SignatureCriteria, TaggedFieldCriteria,
};
pub use sorted::{lookup_by_name, SortedMethods};

use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::cache::{lock_cache, BoundedMetadataCache, CacheStats};
use crate::error::Result;
use crate::model::TypeName;
use crate::registry::{FieldDescriptor, MethodDescriptor, TypeRegistry};

type MetadataCache<V> = Mutex<BoundedMetadataCache<TypeName, V>>;

/// Walks type hierarchies and caches what it finds
#[derive(Debug)]
pub struct TypeIntrospector {
    registry: Arc<TypeRegistry>,
    fields: MetadataCache<Arc<[FieldDescriptor]>>,
    methods: MetadataCache<Arc<[MethodDescriptor]>>,
    sorted: MetadataCache<Arc<SortedMethods>>,
}

impl TypeIntrospector {
    pub fn new(registry: Arc<TypeRegistry>, cache_capacity: usize) -> Self {
        Self {
            registry,
            fields: Mutex::new(BoundedMetadataCache::new(cache_capacity)),
            methods: Mutex::new(BoundedMetadataCache::new(cache_capacity)),
            sorted: Mutex::new(BoundedMetadataCache::new(cache_capacity)),
        }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Fields declared by `type_name` and its ancestors, most-derived first.
    /// Unregistered types have no fields.
    pub fn fields_along_hierarchy(&self, type_name: &str) -> Arc<[FieldDescriptor]> {
        let mut cache = lock_cache(&self.fields);
        if let Some(fields) = cache.get(type_name) {
            return Arc::clone(fields);
        }

        trace!(type_name, "collecting fields along hierarchy");
        let fields: Arc<[FieldDescriptor]> = self
            .registry
            .ancestors(type_name)
            .flat_map(|level| level.fields().iter().cloned())
            .collect();
        cache.put(TypeName::new(type_name), Arc::clone(&fields));
        fields
    }

    /// Methods declared by `type_name` and its ancestors, most-derived first
    pub fn methods_along_hierarchy(&self, type_name: &str) -> Arc<[MethodDescriptor]> {
        let mut cache = lock_cache(&self.methods);
        if let Some(methods) = cache.get(type_name) {
            return Arc::clone(methods);
        }

        trace!(type_name, "collecting methods along hierarchy");
        let methods: Arc<[MethodDescriptor]> = self
            .registry
            .ancestors(type_name)
            .flat_map(|level| level.methods().iter().cloned())
            .collect();
        cache.put(TypeName::new(type_name), Arc::clone(&methods));
        methods
    }

    /// Name-sorted view of the hierarchy's methods
    pub fn sorted_methods(&self, type_name: &str) -> Arc<SortedMethods> {
        if let Some(sorted) = lock_cache(&self.sorted).get(type_name) {
            return Arc::clone(sorted);
        }

        let sorted = Arc::new(SortedMethods::new(
            self.methods_along_hierarchy(type_name).to_vec(),
        ));
        lock_cache(&self.sorted).put(TypeName::new(type_name), Arc::clone(&sorted));
        sorted
    }

    /// Hierarchy fields kept by `criteria`
    pub fn filter_fields(&self, type_name: &str, criteria: &dyn Criteria<FieldDescriptor>) -> Vec<FieldDescriptor> {
        criteria.meet_criteria(self.fields_along_hierarchy(type_name).to_vec())
    }

    /// Hierarchy methods kept by `criteria`
    pub fn filter_methods(&self, type_name: &str, criteria: &dyn Criteria<MethodDescriptor>) -> Vec<MethodDescriptor> {
        criteria.meet_criteria(self.methods_along_hierarchy(type_name).to_vec())
    }

    /// Fields carrying an explicit accessor tag
    pub fn fields_tagged(&self, type_name: &str) -> Vec<FieldDescriptor> {
        self.filter_fields(type_name, &TaggedFieldCriteria::any())
    }

    /// Getters whose name contains `accessor`, in hierarchy order
    pub fn getters_of(&self, type_name: &str, accessor: &str) -> Result<Vec<MethodDescriptor>> {
        let criteria = DecoratorCriteria::new(getter_criteria(), NamePatternCriteria::literal(accessor)?);
        Ok(self.filter_methods(type_name, &criteria))
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        lock_cache(&self.fields).clear();
        lock_cache(&self.methods).clear();
        lock_cache(&self.sorted).clear();
    }

    /// Combined statistics of the field, method and sorted-method caches
    pub fn stats(&self) -> CacheStats {
        lock_cache(&self.fields)
            .stats()
            .combine(lock_cache(&self.methods).stats())
            .combine(lock_cache(&self.sorted).stats())
    }
}
