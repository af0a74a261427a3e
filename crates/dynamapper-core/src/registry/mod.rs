//! Type registry: the explicit capability table of every mappable type
//!
//! Each registered type declares its parent, its own fields and methods, and
//! whether it can be built without arguments. The registry is immutable once
//! built and is shared between engines through an `Arc`.
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

mod builder;
mod descriptor;

pub use builder::{TypeDescriptorBuilder, TypeRegistryBuilder};
pub(crate) use builder::capitalize;
pub use descriptor::{FieldDescriptor, Invoker, MethodDescriptor, TypeDescriptor, Visibility};

use std::collections::HashMap;

use crate::error::{MapperError, Result};
use crate::model::{Instance, LeafKind, ObjectRef, TypeHandle, TypeName, Value};

/// Registry of type descriptors keyed by name
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<TypeName, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The type itself followed by each ancestor up to the root.
    /// Empty for unregistered names.
    pub fn ancestors<'a>(&'a self, name: &str) -> Ancestors<'a> {
        Ancestors {
            registry: self,
            next: self.get(name),
        }
    }

    /// Whether `child` is `ancestor` or inherits from it
    pub fn is_subtype(&self, child: &str, ancestor: &str) -> bool {
        self.ancestors(child)
            .any(|descriptor| descriptor.name().as_str() == ancestor)
    }

    /// Whether a value of runtime type `value_type` may be stored in a field
    /// declared as `declared`
    pub fn is_assignable(&self, value_type: &TypeHandle, declared: &TypeHandle) -> bool {
        match (value_type, declared) {
            (TypeHandle::Object(child), TypeHandle::Object(parent)) => {
                self.is_subtype(child.as_str(), parent.as_str())
            }
            (TypeHandle::Boxed(a), TypeHandle::Primitive(b))
            | (TypeHandle::Primitive(a), TypeHandle::Boxed(b)) => a == b,
            (a, b) => a == b,
        }
    }

    /// Build an instance with every field along the hierarchy at its default
    pub fn instantiate(&self, name: &str) -> Result<ObjectRef> {
        let descriptor = self
            .get(name)
            .ok_or_else(|| MapperError::instantiation(name, "type is not registered"))?;
        if !descriptor.is_constructible() {
            return Err(MapperError::instantiation(
                name,
                "no parameterless constructor registered",
            ));
        }

        let mut instance = Instance::new(descriptor.name().clone());
        for level in self.ancestors(name) {
            for field in level.fields() {
                instance.set(field.name(), default_value(field.declared_type()));
            }
        }
        Ok(instance.into_ref())
    }
}

/// Iterator over a type and its ancestors
pub struct Ancestors<'a> {
    registry: &'a TypeRegistry,
    next: Option<&'a TypeDescriptor>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a TypeDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current
            .parent()
            .and_then(|parent| self.registry.get(parent.as_str()));
        Some(current)
    }
}

/// Initial value of a freshly constructed field
pub fn default_value(declared: &TypeHandle) -> Value {
    match declared {
        TypeHandle::Primitive(LeafKind::Bool) => Value::Bool(false),
        TypeHandle::Primitive(LeafKind::Int) => Value::Int(0),
        TypeHandle::Primitive(LeafKind::Float) => Value::Float(0.0),
        TypeHandle::Primitive(LeafKind::Char) => Value::Char('\0'),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
        TypeRegistry::builder()
            .register_with(
                TypeDescriptorBuilder::new("Person")
                    .field("name", TypeHandle::Text)
                    .field("age", TypeHandle::Primitive(LeafKind::Int))
                    .field("parent", TypeHandle::object("Person")),
            )
            .unwrap()
            .register_with(
                TypeDescriptorBuilder::new("Student")
                    .extends("Person")
                    .field("educationLevel", TypeHandle::Text),
            )
            .unwrap()
            .register_with(TypeDescriptorBuilder::new("Token").without_default_constructor())
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_ancestors_most_derived_first() {
        let registry = registry();
        let names: Vec<&str> = registry.ancestors("Student").map(|d| d.name().as_str()).collect();
        assert_eq!(names, vec!["Student", "Person"]);
        assert_eq!(registry.ancestors("Unknown").count(), 0);
    }

    #[test]
    fn test_assignability() {
        let registry = registry();
        assert!(registry.is_assignable(&TypeHandle::object("Student"), &TypeHandle::object("Person")));
        assert!(!registry.is_assignable(&TypeHandle::object("Person"), &TypeHandle::object("Student")));
        assert!(registry.is_assignable(
            &TypeHandle::Boxed(LeafKind::Int),
            &TypeHandle::Primitive(LeafKind::Int)
        ));
        assert!(!registry.is_assignable(&TypeHandle::Text, &TypeHandle::Boxed(LeafKind::Char)));
    }

    #[test]
    fn test_instantiate_sets_defaults_along_hierarchy() {
        let registry = registry();
        let student = registry.instantiate("Student").unwrap();
        let student = student.borrow();
        assert_eq!(student.type_name().as_str(), "Student");
        assert_eq!(student.field("age").as_int(), Some(0));
        assert!(student.field("name").is_null());
        assert!(student.get("educationLevel").is_some());
    }

    #[test]
    fn test_instantiate_failures() {
        let registry = registry();
        assert!(matches!(
            registry.instantiate("Token"),
            Err(MapperError::Instantiation { .. })
        ));
        assert!(matches!(
            registry.instantiate("Ghost"),
            Err(MapperError::Instantiation { .. })
        ));
    }
}
