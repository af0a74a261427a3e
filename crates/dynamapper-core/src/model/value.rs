//! Dynamic values and object instances
//!
//! Arrays, containers and objects are shared handles with identity, so a graph
//! can alias and cycle the same way a garbage-collected heap does. Leaves are
//! plain values; text shares its buffer through an `Rc<str>`.
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use super::container::ContainerValue;
use super::handle::{LeafKind, TypeHandle, TypeName};

pub type ObjectRef = Rc<RefCell<Instance>>;
pub type ArrayRef = Rc<RefCell<ArrayValue>>;
pub type ContainerRef = Rc<RefCell<ContainerValue>>;

/// Identity of a shared value, stable while the value is alive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(usize);

impl Identity {
    pub fn of<T>(handle: &Rc<T>) -> Self {
        Identity(Rc::as_ptr(handle) as *const () as usize)
    }
}

/// An instance of a registered object type
#[derive(Debug, Clone)]
pub struct Instance {
    type_name: TypeName,
    fields: HashMap<String, Value>,
}

impl Instance {
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: HashMap::new(),
        }
    }

    /// Set a field, builder style
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Current value of a field; `Null` when unset
    pub fn field(&self, field: &str) -> Value {
        self.fields.get(field).cloned().unwrap_or(Value::Null)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn into_ref(self) -> ObjectRef {
        Rc::new(RefCell::new(self))
    }
}

/// Fixed-length array with a declared component type
#[derive(Debug, Clone)]
pub struct ArrayValue {
    component: TypeHandle,
    items: Vec<Value>,
}

impl ArrayValue {
    pub fn new(component: TypeHandle, items: Vec<Value>) -> Self {
        Self { component, items }
    }

    /// Array of `len` null slots
    pub fn filled(component: TypeHandle, len: usize) -> Self {
        Self {
            component,
            items: vec![Value::Null; len],
        }
    }

    pub fn component(&self) -> &TypeHandle {
        &self.component
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Slots are writable but the length is fixed
    pub fn items_mut(&mut self) -> &mut [Value] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A dynamically typed value in an object graph
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Text(Rc<str>),
    Array(ArrayRef),
    Container(ContainerRef),
    Object(ObjectRef),
}

impl Value {
    pub fn text(text: impl AsRef<str>) -> Self {
        Value::Text(Rc::from(text.as_ref()))
    }

    pub fn object(instance: Instance) -> Self {
        Value::Object(instance.into_ref())
    }

    pub fn array(component: TypeHandle, items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(ArrayValue::new(component, items))))
    }

    pub fn container(container: ContainerValue) -> Self {
        Value::Container(Rc::new(RefCell::new(container)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Identity of shared values; leaves have none
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Value::Array(array) => Some(Identity::of(array)),
            Value::Container(container) => Some(Identity::of(container)),
            Value::Object(object) => Some(Identity::of(object)),
            _ => None,
        }
    }

    /// Runtime type, `None` for `Null`
    pub fn runtime_type(&self) -> Option<TypeHandle> {
        let handle = match self {
            Value::Null => return None,
            Value::Bool(_) => TypeHandle::Boxed(LeafKind::Bool),
            Value::Int(_) => TypeHandle::Boxed(LeafKind::Int),
            Value::Float(_) => TypeHandle::Boxed(LeafKind::Float),
            Value::Char(_) => TypeHandle::Boxed(LeafKind::Char),
            Value::Text(_) => TypeHandle::Text,
            Value::Array(array) => TypeHandle::array_of(array.borrow().component().clone()),
            Value::Container(container) => TypeHandle::Container(container.borrow().kind()),
            Value::Object(object) => TypeHandle::Object(object.borrow().type_name().clone()),
        };
        Some(handle)
    }

    /// True for non-null leaves
    pub fn is_well_known_immutable(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Char(_) | Value::Text(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&ContainerRef> {
        match self {
            Value::Container(container) => Some(container),
            _ => None,
        }
    }

    /// Reference equality: same handle for shared values, same buffer for
    /// text, equal scalars otherwise
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Rc::ptr_eq(a, b),
            (Value::Null, Value::Null) => true,
            (a, b) if a.identity().is_some() => a.identity() == b.identity(),
            (a, b) => a.entry_eq(b),
        }
    }

    /// Equality used for set membership and map keys: leaves compare by
    /// value, shared values by identity
    pub fn entry_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (a, b) => a.identity().is_some() && a.identity() == b.identity(),
        }
    }

    /// Structural equality over the whole reachable graph. Cycles are
    /// compared coinductively, so two isomorphic cyclic graphs are equal.
    pub fn deep_eq(&self, other: &Value) -> bool {
        let mut assumed = HashSet::new();
        deep_eq_inner(self, other, &mut assumed)
    }

    /// Short label for error messages
    pub fn kind_label(&self) -> String {
        match self.runtime_type() {
            Some(handle) => handle.to_string(),
            None => "null".to_string(),
        }
    }
}

fn deep_eq_inner(a: &Value, b: &Value, assumed: &mut HashSet<(Identity, Identity)>) -> bool {
    if let (Some(left), Some(right)) = (a.identity(), b.identity()) {
        if !assumed.insert((left, right)) {
            return true;
        }
    }

    match (a, b) {
        (Value::Array(x), Value::Array(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            x.component() == y.component()
                && x.len() == y.len()
                && x.items()
                    .iter()
                    .zip(y.items())
                    .all(|(l, r)| deep_eq_inner(l, r, assumed))
        }
        (Value::Container(x), Value::Container(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            x.kind() == y.kind()
                && x.len() == y.len()
                && x.elements()
                    .iter()
                    .zip(y.elements())
                    .all(|(l, r)| deep_eq_inner(l, r, assumed))
                && x.entries().iter().zip(y.entries()).all(|((lk, lv), (rk, rv))| {
                    deep_eq_inner(lk, rk, assumed) && deep_eq_inner(lv, rv, assumed)
                })
        }
        (Value::Object(x), Value::Object(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            if x.type_name() != y.type_name() {
                return false;
            }
            let names: HashSet<&str> = x.field_names().chain(y.field_names()).collect();
            names
                .into_iter()
                .all(|name| deep_eq_inner(&x.field(name), &y.field(name), assumed))
        }
        (left, right) => left.entry_eq(right),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Float(x) => write!(f, "Float({})", x),
            Value::Char(c) => write!(f, "Char({:?})", c),
            Value::Text(text) => write!(f, "Text({:?})", text),
            // Shared values print shallowly so cyclic graphs stay printable
            Value::Array(array) => match array.try_borrow() {
                Ok(a) => write!(f, "Array({}[{}] @{:#x})", a.component(), a.len(), Identity::of(array).0),
                Err(_) => write!(f, "Array(<borrowed> @{:#x})", Identity::of(array).0),
            },
            Value::Container(container) => match container.try_borrow() {
                Ok(c) => write!(f, "Container({}[{}] @{:#x})", c.advertised_name(), c.len(), Identity::of(container).0),
                Err(_) => write!(f, "Container(<borrowed> @{:#x})", Identity::of(container).0),
            },
            Value::Object(object) => match object.try_borrow() {
                Ok(o) => write!(f, "Object({} @{:#x})", o.type_name(), Identity::of(object).0),
                Err(_) => write!(f, "Object(<borrowed> @{:#x})", Identity::of(object).0),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::text(text)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(Rc::from(text))
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::object(instance)
    }
}

impl From<ObjectRef> for Value {
    fn from(object: ObjectRef) -> Self {
        Value::Object(object)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
