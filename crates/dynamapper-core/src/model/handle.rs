//! Type handles used to describe declared and runtime types
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use super::container::ContainerKind;

/// Interned name of a registered object type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Arc<str>);

impl TypeName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scalar kinds shared by primitive and boxed handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    Bool,
    Int,
    Float,
    Char,
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafKind::Bool => write!(f, "bool"),
            LeafKind::Int => write!(f, "int"),
            LeafKind::Float => write!(f, "float"),
            LeafKind::Char => write!(f, "char"),
        }
    }
}

/// Runtime identifier for a type
///
/// Field declarations carry a handle, and every non-null [`Value`](super::Value)
/// reports one as its runtime type. Leaf values always report the boxed form,
/// so a declared `Primitive(Int)` never equals a runtime type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeHandle {
    /// Non-nullable scalar (`int`, `boolean`, ...)
    Primitive(LeafKind),
    /// Nullable scalar wrapper (`Integer`, `Boolean`, ...)
    Boxed(LeafKind),
    /// Immutable text
    Text,
    /// Fixed-length array of a component type
    Array(Box<TypeHandle>),
    /// Homogeneous container of a concrete kind
    Container(ContainerKind),
    /// A type registered in the [`TypeRegistry`](crate::registry::TypeRegistry)
    Object(TypeName),
}

impl TypeHandle {
    pub fn object(name: impl Into<TypeName>) -> Self {
        TypeHandle::Object(name.into())
    }

    pub fn array_of(component: TypeHandle) -> Self {
        TypeHandle::Array(Box::new(component))
    }

    /// Primitive, boxed and text types are atomic: shared by reference and
    /// never traversed
    pub fn is_well_known_immutable(&self) -> bool {
        matches!(
            self,
            TypeHandle::Primitive(_) | TypeHandle::Boxed(_) | TypeHandle::Text
        )
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeHandle::Primitive(_))
    }

    pub fn is_boxed_boolean(&self) -> bool {
        matches!(self, TypeHandle::Boxed(LeafKind::Bool))
    }

    /// Name of the registered object type, if this is an object handle
    pub fn object_name(&self) -> Option<&TypeName> {
        match self {
            TypeHandle::Object(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeHandle::Primitive(kind) => write!(f, "{}", kind),
            TypeHandle::Boxed(kind) => write!(f, "{}?", kind),
            TypeHandle::Text => write!(f, "text"),
            TypeHandle::Array(component) => write!(f, "{}[]", component),
            TypeHandle::Container(kind) => write!(f, "{}", kind.type_name()),
            TypeHandle::Object(name) => write!(f, "{}", name),
        }
    }
}
