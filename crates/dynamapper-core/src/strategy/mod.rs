//! Per-field binding strategies
//!
//! A destination field is either bound explicitly, through the accessor tag
//! it carries, or by convention, through an accessor name derived from the
//! field name. Both resolve to a zero-argument method on the source type.
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::cache::{lock_cache, BoundedMetadataCache, CacheStats};
use crate::error::{BindingKind, MapperError, Result};
use crate::introspect::TypeIntrospector;
use crate::model::{ObjectRef, TypeHandle, TypeName, Value};
use crate::registry::{capitalize, FieldDescriptor, MethodDescriptor};

/// How a destination field finds its source accessor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MappingStrategy {
    /// The field's tag names the accessor
    Explicit { accessor: String },
    /// The accessor name is derived from the field name
    Convention { accessor: String },
}

impl MappingStrategy {
    /// Explicit iff the field carries an accessor tag
    pub fn select(field: &FieldDescriptor) -> Self {
        match field.accessor_tag() {
            Some(tag) => MappingStrategy::Explicit {
                accessor: tag.to_string(),
            },
            None => MappingStrategy::Convention {
                accessor: convention_accessor_name(field.name(), field.declared_type()),
            },
        }
    }

    pub fn accessor(&self) -> &str {
        match self {
            MappingStrategy::Explicit { accessor } | MappingStrategy::Convention { accessor } => accessor,
        }
    }

    pub fn kind(&self) -> BindingKind {
        match self {
            MappingStrategy::Explicit { .. } => BindingKind::Explicit,
            MappingStrategy::Convention { .. } => BindingKind::Convention,
        }
    }
}

/// `get` + capitalized field name, or `is` + ... for boxed booleans
pub fn convention_accessor_name(field_name: &str, declared_type: &TypeHandle) -> String {
    let prefix = if declared_type.is_boxed_boolean() { "is" } else { "get" };
    format!("{}{}", prefix, capitalize(field_name))
}

/// A destination field together with its chosen strategy
#[derive(Debug, Clone)]
pub struct FieldBinding {
    owner: TypeName,
    field: FieldDescriptor,
    strategy: MappingStrategy,
}

impl FieldBinding {
    pub fn new(owner: TypeName, field: FieldDescriptor) -> Self {
        let strategy = MappingStrategy::select(&field);
        Self {
            owner,
            field,
            strategy,
        }
    }

    pub fn owner(&self) -> &TypeName {
        &self.owner
    }

    pub fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    pub fn strategy(&self) -> &MappingStrategy {
        &self.strategy
    }
}

/// Chooses and resolves field bindings, caching both steps
#[derive(Debug)]
pub struct MappingStrategyResolver {
    introspector: Arc<TypeIntrospector>,
    bindings: Mutex<BoundedMetadataCache<(TypeName, String), Arc<FieldBinding>>>,
    accessors: Mutex<BoundedMetadataCache<(TypeName, MappingStrategy), MethodDescriptor>>,
}

impl MappingStrategyResolver {
    pub fn new(introspector: Arc<TypeIntrospector>, cache_capacity: usize) -> Self {
        Self {
            introspector,
            bindings: Mutex::new(BoundedMetadataCache::new(cache_capacity)),
            accessors: Mutex::new(BoundedMetadataCache::new(cache_capacity)),
        }
    }

    /// Binding for `field` of the destination type `owner`
    pub fn bind(&self, owner: &TypeName, field: &FieldDescriptor) -> BoundResolver<'_> {
        let key = (owner.clone(), field.name().to_string());
        let mut cache = lock_cache(&self.bindings);
        let binding = match cache.get(&key) {
            Some(binding) if binding.field() == field => Arc::clone(binding),
            _ => {
                let binding = Arc::new(FieldBinding::new(owner.clone(), field.clone()));
                debug!(
                    owner = %owner,
                    field = field.name(),
                    accessor = binding.strategy().accessor(),
                    strategy = %binding.strategy().kind(),
                    "bound destination field"
                );
                cache.put(key, Arc::clone(&binding));
                binding
            }
        };

        BoundResolver {
            resolver: self,
            binding,
        }
    }

    /// The source method a strategy resolves to on `source_type`
    pub fn resolve_accessor(&self, source_type: &TypeName, strategy: &MappingStrategy) -> Result<MethodDescriptor> {
        let key = (source_type.clone(), strategy.clone());
        if let Some(method) = lock_cache(&self.accessors).get(&key) {
            return Ok(method.clone());
        }

        let method = match strategy {
            MappingStrategy::Explicit { accessor } => self
                .introspector
                .sorted_methods(source_type.as_str())
                .lookup(accessor)
                .cloned(),
            MappingStrategy::Convention { accessor } => {
                let candidates = self.introspector.getters_of(source_type.as_str(), accessor)?;
                candidates
                    .iter()
                    .find(|m| m.name() == accessor)
                    .or_else(|| candidates.first())
                    .cloned()
            }
        }
        .ok_or_else(|| MapperError::lookup(strategy.accessor(), source_type.as_str(), strategy.kind()))?;

        lock_cache(&self.accessors).put(key, method.clone());
        Ok(method)
    }

    pub fn introspector(&self) -> &Arc<TypeIntrospector> {
        &self.introspector
    }

    pub fn clear(&self) {
        lock_cache(&self.bindings).clear();
        lock_cache(&self.accessors).clear();
    }

    /// Combined statistics of the binding and accessor caches
    pub fn stats(&self) -> CacheStats {
        lock_cache(&self.bindings)
            .stats()
            .combine(lock_cache(&self.accessors).stats())
    }
}

/// A field binding ready to pull its value out of source instances
#[derive(Debug, Clone)]
pub struct BoundResolver<'a> {
    resolver: &'a MappingStrategyResolver,
    binding: Arc<FieldBinding>,
}

impl BoundResolver<'_> {
    pub fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    /// Invoke the bound accessor on `source`
    pub fn resolve(&self, source: &ObjectRef) -> Result<Value> {
        let source = source.borrow();
        let method = self
            .resolver
            .resolve_accessor(source.type_name(), self.binding.strategy())?;
        method.invoke(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Instance, LeafKind};
    use crate::registry::{TypeDescriptorBuilder, TypeRegistry};

    fn resolver() -> MappingStrategyResolver {
        let registry = TypeRegistry::builder()
            .register_with(
                TypeDescriptorBuilder::new("Person")
                    .field("name", TypeHandle::Text)
                    .field("active", TypeHandle::Boxed(LeafKind::Bool))
                    .with_getters()
                    .accessor("getNameLength", |p| {
                        Ok(Value::Int(p.field("name").as_text().map_or(0, str::len) as i64))
                    }),
            )
            .unwrap()
            .build()
            .unwrap();
        let introspector = Arc::new(TypeIntrospector::new(Arc::new(registry), 16));
        MappingStrategyResolver::new(introspector, 16)
    }

    fn person() -> ObjectRef {
        Instance::new("Person")
            .with("name", "Jane")
            .with("active", true)
            .into_ref()
    }

    #[test]
    fn test_boxed_boolean_uses_is_prefix() {
        assert_eq!(
            convention_accessor_name("active", &TypeHandle::Boxed(LeafKind::Bool)),
            "isActive"
        );
        assert_eq!(
            convention_accessor_name("active", &TypeHandle::Primitive(LeafKind::Bool)),
            "getActive"
        );
        assert_eq!(convention_accessor_name("name", &TypeHandle::Text), "getName");
    }

    #[test]
    fn test_select_is_driven_by_tag() {
        let tagged = FieldDescriptor::new("PersonVO", "firstName", TypeHandle::Text).tagged("getName");
        let plain = FieldDescriptor::new("PersonVO", "active", TypeHandle::Boxed(LeafKind::Bool));
        assert_eq!(
            MappingStrategy::select(&tagged),
            MappingStrategy::Explicit { accessor: "getName".to_string() }
        );
        assert_eq!(
            MappingStrategy::select(&plain),
            MappingStrategy::Convention { accessor: "isActive".to_string() }
        );
    }

    #[test]
    fn test_explicit_resolution() {
        let resolver = resolver();
        let field = FieldDescriptor::new("PersonVO", "firstName", TypeHandle::Text).tagged("getName");
        let value = resolver.bind(&TypeName::new("PersonVO"), &field).resolve(&person()).unwrap();
        assert_eq!(value.as_text(), Some("Jane"));
    }

    #[test]
    fn test_convention_prefers_exact_match() {
        let resolver = resolver();
        let field = FieldDescriptor::new("PersonVO", "name", TypeHandle::Text);
        let value = resolver.bind(&TypeName::new("PersonVO"), &field).resolve(&person()).unwrap();
        assert_eq!(value.as_text(), Some("Jane"));
    }

    #[test]
    fn test_convention_falls_back_to_first_candidate() {
        let resolver = resolver();
        let method = resolver
            .resolve_accessor(
                &TypeName::new("Person"),
                &MappingStrategy::Convention { accessor: "getNameL".to_string() },
            )
            .unwrap();
        assert_eq!(method.name(), "getNameLength");
    }

    #[test]
    fn test_missing_accessor_reports_strategy() {
        let resolver = resolver();
        let explicit = FieldDescriptor::new("PersonVO", "email", TypeHandle::Text).tagged("getEmail");
        let err = resolver
            .bind(&TypeName::new("PersonVO"), &explicit)
            .resolve(&person())
            .unwrap_err();
        assert!(matches!(
            err,
            MapperError::Lookup { strategy: BindingKind::Explicit, ref accessor, .. } if accessor == "getEmail"
        ));

        let convention = FieldDescriptor::new("PersonVO", "email", TypeHandle::Text);
        let err = resolver
            .bind(&TypeName::new("PersonVO"), &convention)
            .resolve(&person())
            .unwrap_err();
        assert!(matches!(err, MapperError::Lookup { strategy: BindingKind::Convention, .. }));
    }

    #[test]
    fn test_rebinding_a_field_name_follows_the_new_descriptor() {
        let resolver = resolver();
        let owner = TypeName::new("PersonVO");
        let tagged = FieldDescriptor::new("PersonVO", "label", TypeHandle::Text).tagged("getName");
        let plain = FieldDescriptor::new("PersonVO", "label", TypeHandle::Text);

        let bound = resolver.bind(&owner, &tagged);
        assert_eq!(bound.binding().strategy().kind(), BindingKind::Explicit);
        assert_eq!(bound.resolve(&person()).unwrap().as_text(), Some("Jane"));

        let bound = resolver.bind(&owner, &plain);
        assert_eq!(
            bound.binding().strategy(),
            &MappingStrategy::Convention { accessor: "getLabel".to_string() }
        );
        assert_eq!(bound.binding().field(), &plain);

        let bound = resolver.bind(&owner, &tagged);
        assert_eq!(bound.binding().strategy().accessor(), "getName");
    }

    #[test]
    fn test_bindings_and_accessors_are_cached() {
        let resolver = resolver();
        let field = FieldDescriptor::new("PersonVO", "active", TypeHandle::Boxed(LeafKind::Bool));
        let owner = TypeName::new("PersonVO");
        for _ in 0..3 {
            let value = resolver.bind(&owner, &field).resolve(&person()).unwrap();
            assert_eq!(value.as_bool(), Some(true));
        }
        let stats = resolver.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.hits, 4);
    }
}
