//! Cross-type mapping of object graphs
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use super::visited::VisitedSet;
use super::TransformEngine;
use crate::error::{MapperError, Result};
use crate::model::{ArrayRef, ArrayValue, ContainerKind, ObjectRef, TypeHandle, TypeName, Value};
use crate::registry::default_value;

impl TransformEngine {
    /// Map `source` into a value of type `target`, sharing `visited` with
    /// every nested call of the same top-level invocation
    pub(super) fn map_value(&self, source: &Value, target: &TypeHandle, visited: &mut VisitedSet) -> Result<Value> {
        if source.is_null() || source.is_well_known_immutable() {
            return Ok(source.clone());
        }

        match (source, target) {
            (Value::Object(object), TypeHandle::Object(dest_type)) => {
                self.map_object(source, object, dest_type, visited)
            }
            (Value::Array(array), TypeHandle::Array(component)) => {
                let items = array.borrow().items().to_vec();
                self.map_sequence_into_array(source, &items, component, visited)
            }
            (Value::Container(container), TypeHandle::Array(component)) => {
                let container_ref = container.borrow();
                if container_ref.kind().is_map() {
                    return Err(MapperError::type_mismatch(target.to_string(), source.kind_label()));
                }
                let items = container_ref.elements().to_vec();
                drop(container_ref);
                self.map_sequence_into_array(source, &items, component, visited)
            }
            (Value::Array(_) | Value::Container(_), TypeHandle::Container(kind)) => {
                self.map_into_container(source, *kind, visited)
            }
            _ => Err(MapperError::type_mismatch(target.to_string(), source.kind_label())),
        }
    }

    fn map_object(
        &self,
        source: &Value,
        object: &ObjectRef,
        dest_type: &TypeName,
        visited: &mut VisitedSet,
    ) -> Result<Value> {
        trace!(
            source_type = %object.borrow().type_name(),
            dest_type = %dest_type,
            "mapping instance"
        );

        let destination = self.registry.instantiate(dest_type.as_str())?;
        visited.insert(source, Value::Object(Rc::clone(&destination)));

        for field in self.introspector.fields_along_hierarchy(dest_type.as_str()).iter() {
            let raw = self.strategies.bind(dest_type, field).resolve(object)?;
            if let Some(resolved) = self.resolve_field_value(raw, field.declared_type(), visited)? {
                destination.borrow_mut().set(field.name(), resolved);
            }
        }
        Ok(Value::Object(destination))
    }

    /// Decide what a declared slot receives for a raw source value.
    /// `None` leaves the slot at its default.
    fn resolve_field_value(
        &self,
        raw: Value,
        declared: &TypeHandle,
        visited: &mut VisitedSet,
    ) -> Result<Option<Value>> {
        let Some(runtime) = raw.runtime_type() else {
            return Ok(None);
        };

        if let Some(existing) = visited.get(&raw) {
            let assignable = existing
                .runtime_type()
                .is_some_and(|existing_type| self.registry.is_assignable(&existing_type, declared));
            if !assignable {
                trace!(declared = %declared, "revisited value does not fit the slot, leaving default");
                return Ok(None);
            }
            return Ok(Some(existing.clone()));
        }

        if raw.is_well_known_immutable() {
            if self.registry.is_assignable(&runtime, declared) {
                return Ok(Some(raw));
            }
            return Err(MapperError::type_mismatch(declared.to_string(), runtime.to_string()));
        }

        if runtime == *declared || declared.is_primitive() {
            let mut memo = VisitedSet::new();
            return self.copy_value(&raw, &mut memo).map(Some);
        }

        self.map_value(&raw, declared, visited).map(Some)
    }

    fn map_sequence_into_array(
        &self,
        source: &Value,
        items: &[Value],
        component: &TypeHandle,
        visited: &mut VisitedSet,
    ) -> Result<Value> {
        let slots = vec![default_value(component); items.len()];
        let destination: ArrayRef = Rc::new(RefCell::new(ArrayValue::new(component.clone(), slots)));
        visited.insert(source, Value::Array(Rc::clone(&destination)));

        for (index, item) in items.iter().enumerate() {
            if let Some(resolved) = self.resolve_field_value(item.clone(), component, visited)? {
                destination.borrow_mut().items_mut()[index] = resolved;
            }
        }
        Ok(Value::Array(destination))
    }

    fn map_into_container(&self, source: &Value, kind: ContainerKind, visited: &mut VisitedSet) -> Result<Value> {
        let (elements, entries, source_is_map) = match source {
            Value::Array(array) => (array.borrow().items().to_vec(), Vec::new(), false),
            Value::Container(container) => {
                let container = container.borrow();
                (
                    container.elements().to_vec(),
                    container.entries().to_vec(),
                    container.kind().is_map(),
                )
            }
            _ => (Vec::new(), Vec::new(), false),
        };
        if source_is_map != kind.is_map() {
            return Err(MapperError::type_mismatch(kind.type_name(), source.kind_label()));
        }

        let destination = Rc::new(RefCell::new(self.containers.instantiate(kind.type_name())?));
        visited.insert(source, Value::Container(Rc::clone(&destination)));

        let mut memo = VisitedSet::new();
        for element in &elements {
            let copied = self.copy_value(element, &mut memo)?;
            destination.borrow_mut().push(copied)?;
        }
        for (key, value) in &entries {
            let key = self.copy_value(key, &mut memo)?;
            let value = self.copy_value(value, &mut memo)?;
            destination.borrow_mut().insert(key, value)?;
        }
        Ok(Value::Container(destination))
    }
}
