//! Field, method and type descriptors
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

use std::fmt;
use std::sync::Arc;

use crate::error::{MapperError, Result};
use crate::model::{Instance, TypeHandle, TypeName, Value};

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Package,
    Private,
}

/// A function reading a value out of an instance
pub type Invoker = Arc<dyn Fn(&Instance) -> anyhow::Result<Value> + Send + Sync>;

/// A field declared on one level of a type hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    owner: TypeName,
    declared_type: TypeHandle,
    is_final: bool,
    accessor_tag: Option<String>,
}

impl FieldDescriptor {
    pub fn new(owner: impl Into<TypeName>, name: impl Into<String>, declared_type: TypeHandle) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            declared_type,
            is_final: false,
            accessor_tag: None,
        }
    }

    /// Bind this field to a named source accessor
    pub fn tagged(mut self, accessor: impl Into<String>) -> Self {
        self.accessor_tag = Some(accessor.into());
        self
    }

    /// Mark the field as assigned once at construction
    pub fn final_field(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &TypeName {
        &self.owner
    }

    pub fn declared_type(&self) -> &TypeHandle {
        &self.declared_type
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn accessor_tag(&self) -> Option<&str> {
        self.accessor_tag.as_deref()
    }

    pub fn is_tagged(&self) -> bool {
        self.accessor_tag.is_some()
    }

    pub(crate) fn set_accessor_tag(&mut self, accessor: impl Into<String>) {
        self.accessor_tag = Some(accessor.into());
    }
}

/// A method declared on one level of a type hierarchy
///
/// Only zero-argument methods with an invoker can be called by the engine;
/// the rest exist so signature criteria have something to filter.
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    owner: TypeName,
    visibility: Visibility,
    arity: usize,
    invoker: Option<Invoker>,
}

impl MethodDescriptor {
    /// Public zero-argument accessor backed by a closure
    pub fn accessor<F>(owner: impl Into<TypeName>, name: impl Into<String>, invoker: F) -> Self
    where
        F: Fn(&Instance) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            owner: owner.into(),
            visibility: Visibility::Public,
            arity: 0,
            invoker: Some(Arc::new(invoker)),
        }
    }

    /// Public getter returning the current value of `field`
    pub fn field_getter(owner: impl Into<TypeName>, name: impl Into<String>, field: impl Into<String>) -> Self {
        let field = field.into();
        Self::accessor(owner, name, move |instance| Ok(instance.field(&field)))
    }

    /// Signature-only declaration without a callable body
    pub fn declared(
        owner: impl Into<TypeName>,
        name: impl Into<String>,
        visibility: Visibility,
        arity: usize,
    ) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            visibility,
            arity,
            invoker: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &TypeName {
        &self.owner
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn is_invocable(&self) -> bool {
        self.arity == 0 && self.invoker.is_some()
    }

    /// Call the accessor on `target`, wrapping any failure with the accessor name
    pub fn invoke(&self, target: &Instance) -> Result<Value> {
        let invoker = match (&self.invoker, self.arity) {
            (Some(invoker), 0) => invoker,
            _ => {
                return Err(MapperError::Invocation {
                    accessor: self.name.clone(),
                    source_type: target.type_name().to_string(),
                    source: anyhow::anyhow!(
                        "method takes {} argument(s) or has no body",
                        self.arity
                    ),
                })
            }
        };

        invoker(target).map_err(|source| MapperError::Invocation {
            accessor: self.name.clone(),
            source_type: target.type_name().to_string(),
            source,
        })
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("visibility", &self.visibility)
            .field("arity", &self.arity)
            .field("invocable", &self.invoker.is_some())
            .finish()
    }
}

/// Capability table for one registered type
///
/// Holds only what this level declares; the introspector assembles the
/// hierarchy-wide view.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub(crate) name: TypeName,
    pub(crate) parent: Option<TypeName>,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) methods: Vec<MethodDescriptor>,
    pub(crate) constructible: bool,
}

impl TypeDescriptor {
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    pub fn parent(&self) -> Option<&TypeName> {
        self.parent.as_ref()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Whether the type has a parameterless constructor
    pub fn is_constructible(&self) -> bool {
        self.constructible
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> Option<&mut FieldDescriptor> {
        self.fields.iter_mut().find(|f| f.name == name)
    }
}
