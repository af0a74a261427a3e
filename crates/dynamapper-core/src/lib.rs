//! Dynamapper Core - registry-driven object graph mapping and deep copy
//!
//! This crate transforms object graphs between two independently defined type
//! hierarchies without per-type conversion code, and deep-copies arbitrary
//! graphs while preserving cycles and shared references.
//!
//! # Main Components
//!
//! - **Model**: Dynamic values, type handles and containers
//! - **Registry**: Explicit per-type capability tables (fields, accessors, constructors)
//! - **Introspection**: Hierarchy walks, composable criteria and binary lookup, all cached
//! - **Strategies**: Explicit (tagged) and convention-based field binding
//! - **Engine**: Deep copy and cross-type mapping with cycle detection
//!
//! # Example
//!
//! ```no_run
//! use dynamapper_core::{
//!     Instance, MapperConfig, Result, TransformEngine, TypeDescriptorBuilder, TypeHandle,
//!     TypeRegistry, Value,
//! };
//!
//! fn example() -> Result<()> {
//!     let builder = TypeRegistry::builder()
//!         .register_with(
//!             TypeDescriptorBuilder::new("Person")
//!                 .field("name", TypeHandle::Text)
//!                 .with_getters(),
//!         )?
//!         .register_with(
//!             TypeDescriptorBuilder::new("PersonVO")
//!                 .tagged_field("firstName", TypeHandle::Text, "getName"),
//!         )?;
//!     let engine = TransformEngine::bootstrap(builder, MapperConfig::default())?;
//!
//!     let person = Value::object(Instance::new("Person").with("name", "Jane"));
//!     let dto = engine.map(&person, &TypeHandle::object("PersonVO"))?;
//!     assert!(!dto.is_null());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod introspect;
pub mod model;
pub mod registry;
pub mod strategy;

// Re-export main types for convenience
pub use cache::{BoundedMetadataCache, CacheStats};
pub use config::{BindingTable, CopyPolicy, MapperConfig};
pub use engine::{TransformEngine, VisitedSet};
pub use error::{BindingKind, MapperError, Result};
pub use introspect::{
    accessor_by_name_criteria, getter_criteria, lookup_by_name, setter_criteria, CompoundCriteria,
    Criteria, DecoratorCriteria, NamePatternCriteria, SignatureCriteria, SortedMethods,
    TaggedFieldCriteria, TypeIntrospector,
};
pub use model::{
    ContainerFactory, ContainerKind, ContainerValue, Identity, Instance, LeafKind, ObjectRef,
    TypeHandle, TypeName, Value,
};
pub use registry::{
    FieldDescriptor, MethodDescriptor, TypeDescriptor, TypeDescriptorBuilder, TypeRegistry,
    TypeRegistryBuilder, Visibility,
};
pub use strategy::{convention_accessor_name, FieldBinding, MappingStrategy, MappingStrategyResolver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_error_creation() {
        let err = MapperError::registration("Test error");
        assert!(err.to_string().contains("Test error"));
    }

    #[test]
    fn test_copy_policy_equality() {
        assert_eq!(CopyPolicy::Strict, CopyPolicy::default());
        assert_ne!(CopyPolicy::Strict, CopyPolicy::BestEffort);
    }
}
