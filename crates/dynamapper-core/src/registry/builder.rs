//! Fluent builders for type descriptors and the registry
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

use std::collections::{HashMap, HashSet};

use super::descriptor::{FieldDescriptor, MethodDescriptor, TypeDescriptor, Visibility};
use super::TypeRegistry;
use crate::config::BindingTable;
use crate::error::{MapperError, Result};
use crate::model::{Instance, TypeHandle, TypeName, Value};
use crate::strategy::convention_accessor_name;

/// Builder for one [`TypeDescriptor`]
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    name: TypeName,
    parent: Option<TypeName>,
    fields: Vec<FieldDescriptor>,
    methods: Vec<MethodDescriptor>,
    constructible: bool,
}

impl TypeDescriptorBuilder {
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
            methods: Vec::new(),
            constructible: true,
        }
    }

    pub fn extends(mut self, parent: impl Into<TypeName>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, declared_type: TypeHandle) -> Self {
        self.fields
            .push(FieldDescriptor::new(self.name.clone(), name, declared_type));
        self
    }

    /// Field bound explicitly to a source accessor
    pub fn tagged_field(
        mut self,
        name: impl Into<String>,
        declared_type: TypeHandle,
        accessor: impl Into<String>,
    ) -> Self {
        self.fields.push(
            FieldDescriptor::new(self.name.clone(), name, declared_type).tagged(accessor),
        );
        self
    }

    pub fn final_field(mut self, name: impl Into<String>, declared_type: TypeHandle) -> Self {
        self.fields.push(
            FieldDescriptor::new(self.name.clone(), name, declared_type).final_field(),
        );
        self
    }

    /// Public zero-argument accessor backed by a closure
    pub fn accessor<F>(mut self, name: impl Into<String>, invoker: F) -> Self
    where
        F: Fn(&Instance) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.methods
            .push(MethodDescriptor::accessor(self.name.clone(), name, invoker));
        self
    }

    /// Public getter returning a stored field
    pub fn getter(mut self, name: impl Into<String>, field: impl Into<String>) -> Self {
        self.methods
            .push(MethodDescriptor::field_getter(self.name.clone(), name, field));
        self
    }

    /// Signature-only method, visible to criteria but not callable
    pub fn declared_method(mut self, name: impl Into<String>, visibility: Visibility, arity: usize) -> Self {
        self.methods.push(MethodDescriptor::declared(
            self.name.clone(),
            name,
            visibility,
            arity,
        ));
        self
    }

    /// Conventional getters for every field declared so far
    pub fn with_getters(mut self) -> Self {
        let generated: Vec<MethodDescriptor> = self
            .fields
            .iter()
            .map(|field| {
                MethodDescriptor::field_getter(
                    self.name.clone(),
                    convention_accessor_name(field.name(), field.declared_type()),
                    field.name(),
                )
            })
            .collect();
        self.methods.extend(generated);
        self
    }

    /// Conventional setters for every field declared so far
    pub fn with_setters(mut self) -> Self {
        let generated: Vec<MethodDescriptor> = self
            .fields
            .iter()
            .map(|field| {
                MethodDescriptor::declared(
                    self.name.clone(),
                    format!("set{}", capitalize(field.name())),
                    Visibility::Public,
                    1,
                )
            })
            .collect();
        self.methods.extend(generated);
        self
    }

    pub fn without_default_constructor(mut self) -> Self {
        self.constructible = false;
        self
    }

    pub fn build(self) -> Result<TypeDescriptor> {
        if self.name.as_str().is_empty() {
            return Err(MapperError::registration("type name cannot be empty"));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name().is_empty() {
                return Err(MapperError::registration(format!(
                    "type '{}' declares a field with an empty name",
                    self.name
                )));
            }
            if !seen.insert(field.name()) {
                return Err(MapperError::registration(format!(
                    "type '{}' declares field '{}' twice",
                    self.name,
                    field.name()
                )));
            }
        }

        Ok(TypeDescriptor {
            name: self.name,
            parent: self.parent,
            fields: self.fields,
            methods: self.methods,
            constructible: self.constructible,
        })
    }
}

pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builder validating a set of descriptors into a [`TypeRegistry`]
#[derive(Debug, Default)]
pub struct TypeRegistryBuilder {
    descriptors: Vec<TypeDescriptor>,
    bindings: BindingTable,
}

impl TypeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, descriptor: TypeDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Build and register a descriptor in one step
    pub fn register_with(self, builder: TypeDescriptorBuilder) -> Result<Self> {
        Ok(self.register(builder.build()?))
    }

    /// Tag fields from a binding table; later tables override earlier ones
    pub fn apply_bindings(mut self, table: &BindingTable) -> Self {
        for (type_name, field, accessor) in table.iter() {
            self.bindings.insert(type_name, field, accessor);
        }
        self
    }

    pub fn build(self) -> Result<TypeRegistry> {
        let mut types: HashMap<TypeName, TypeDescriptor> = HashMap::new();
        for descriptor in self.descriptors {
            if types.contains_key(descriptor.name()) {
                return Err(MapperError::registration(format!(
                    "type '{}' is registered twice",
                    descriptor.name()
                )));
            }
            types.insert(descriptor.name().clone(), descriptor);
        }

        for descriptor in types.values() {
            if let Some(parent) = descriptor.parent() {
                if !types.contains_key(parent) {
                    return Err(MapperError::registration(format!(
                        "type '{}' extends unknown type '{}'",
                        descriptor.name(),
                        parent
                    )));
                }
            }
        }

        for name in types.keys() {
            check_hierarchy(&types, name)?;
        }

        for (type_name, field, accessor) in self.bindings.iter() {
            let descriptor = types.get_mut(type_name).ok_or_else(|| {
                MapperError::registration(format!(
                    "binding targets unknown type '{}'",
                    type_name
                ))
            })?;
            let slot = descriptor.field_mut(field).ok_or_else(|| {
                MapperError::registration(format!(
                    "binding targets unknown field '{}.{}'",
                    type_name, field
                ))
            })?;
            slot.set_accessor_tag(accessor);
        }

        tracing::debug!(types = types.len(), "type registry built");
        Ok(TypeRegistry { types })
    }
}

/// Reject cyclic parents and fields redeclared further up the chain
fn check_hierarchy(types: &HashMap<TypeName, TypeDescriptor>, start: &TypeName) -> Result<()> {
    let mut visited: HashSet<&TypeName> = HashSet::new();
    let mut field_owner: HashMap<&str, &TypeName> = HashMap::new();
    let mut current = types.get(start);

    while let Some(descriptor) = current {
        if !visited.insert(descriptor.name()) {
            return Err(MapperError::registration(format!(
                "inheritance cycle through type '{}'",
                descriptor.name()
            )));
        }

        for field in descriptor.fields() {
            if let Some(owner) = field_owner.insert(field.name(), descriptor.name()) {
                return Err(MapperError::registration(format!(
                    "field '{}' of '{}' is redeclared by '{}'",
                    field.name(),
                    descriptor.name(),
                    owner
                )));
            }
        }

        current = descriptor.parent().and_then(|parent| types.get(parent));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LeafKind;

    fn person() -> TypeDescriptorBuilder {
        TypeDescriptorBuilder::new("Person")
            .field("name", TypeHandle::Text)
            .field("age", TypeHandle::Primitive(LeafKind::Int))
            .field("active", TypeHandle::Boxed(LeafKind::Bool))
            .with_getters()
    }

    #[test]
    fn test_with_getters_follows_convention() {
        let descriptor = person().build().unwrap();
        let names: Vec<&str> = descriptor.methods().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["getName", "getAge", "isActive"]);
    }

    #[test]
    fn test_with_setters_declares_one_argument_methods() {
        let descriptor = TypeDescriptorBuilder::new("Person")
            .field("name", TypeHandle::Text)
            .with_setters()
            .build()
            .unwrap();
        let setter = &descriptor.methods()[0];
        assert_eq!(setter.name(), "setName");
        assert_eq!(setter.arity(), 1);
        assert!(!setter.is_invocable());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = TypeDescriptorBuilder::new("Person")
            .field("name", TypeHandle::Text)
            .field("name", TypeHandle::Text)
            .build()
            .unwrap_err();
        assert!(matches!(err, MapperError::Registration { .. }));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let err = TypeRegistryBuilder::new()
            .register_with(TypeDescriptorBuilder::new("Student").extends("Person"))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("unknown type 'Person'"));
    }

    #[test]
    fn test_inheritance_cycle_rejected() {
        let err = TypeRegistryBuilder::new()
            .register_with(TypeDescriptorBuilder::new("A").extends("B"))
            .unwrap()
            .register_with(TypeDescriptorBuilder::new("B").extends("A"))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("inheritance cycle"));
    }

    #[test]
    fn test_redeclared_field_rejected() {
        let err = TypeRegistryBuilder::new()
            .register_with(person())
            .unwrap()
            .register_with(
                TypeDescriptorBuilder::new("Student")
                    .extends("Person")
                    .field("name", TypeHandle::Text),
            )
            .unwrap()
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("redeclared"));
    }

    #[test]
    fn test_bindings_tag_fields() {
        let table = BindingTable::new().bind("PersonVO", "firstName", "getName");
        let registry = TypeRegistryBuilder::new()
            .register_with(TypeDescriptorBuilder::new("PersonVO").field("firstName", TypeHandle::Text))
            .unwrap()
            .apply_bindings(&table)
            .build()
            .unwrap();
        let field = &registry.get("PersonVO").unwrap().fields()[0];
        assert_eq!(field.accessor_tag(), Some("getName"));
    }

    #[test]
    fn test_binding_to_unknown_field_rejected() {
        let table = BindingTable::new().bind("PersonVO", "nickname", "getName");
        let err = TypeRegistryBuilder::new()
            .register_with(TypeDescriptorBuilder::new("PersonVO").field("firstName", TypeHandle::Text))
            .unwrap()
            .apply_bindings(&table)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("PersonVO.nickname"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("name"), "Name");
        assert_eq!(capitalize("x"), "X");
        assert_eq!(capitalize(""), "");
    }
}
