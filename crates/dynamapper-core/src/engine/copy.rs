//! Deep copy of object graphs
//!
//! Copyright (c) 2025 Dynamapper Team
//! Licensed under the Apache-2.0 license

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use super::visited::VisitedSet;
use super::TransformEngine;
use crate::error::Result;
use crate::model::{ArrayRef, ArrayValue, ContainerRef, ObjectRef, Value};

impl TransformEngine {
    /// Copy `value`, reproducing every alias and cycle recorded in `memo`
    pub(super) fn copy_value(&self, value: &Value, memo: &mut VisitedSet) -> Result<Value> {
        if value.is_null() || value.is_well_known_immutable() {
            return Ok(value.clone());
        }
        if let Some(existing) = memo.get(value) {
            return Ok(existing.clone());
        }

        match value {
            Value::Array(array) => self.copy_array(value, array, memo),
            Value::Container(container) => self.copy_container(value, container, memo),
            Value::Object(object) => self.copy_object(value, object, memo),
            _ => Ok(value.clone()),
        }
    }

    fn copy_array(&self, source: &Value, array: &ArrayRef, memo: &mut VisitedSet) -> Result<Value> {
        let (component, items) = {
            let array = array.borrow();
            (array.component().clone(), array.items().to_vec())
        };

        let clone = Rc::new(RefCell::new(ArrayValue::filled(component, items.len())));
        memo.insert(source, Value::Array(Rc::clone(&clone)));

        for (index, item) in items.iter().enumerate() {
            let copied = self.copy_value(item, memo)?;
            clone.borrow_mut().items_mut()[index] = copied;
        }
        Ok(Value::Array(clone))
    }

    fn copy_container(&self, source: &Value, container: &ContainerRef, memo: &mut VisitedSet) -> Result<Value> {
        let (advertised, elements, entries) = {
            let container = container.borrow();
            (
                container.advertised_name().to_string(),
                container.elements().to_vec(),
                container.entries().to_vec(),
            )
        };

        let clone = Rc::new(RefCell::new(self.containers.instantiate(&advertised)?));
        memo.insert(source, Value::Container(Rc::clone(&clone)));

        for element in &elements {
            let copied = self.copy_value(element, memo)?;
            clone.borrow_mut().push(copied)?;
        }
        for (key, value) in &entries {
            let key = self.copy_value(key, memo)?;
            let value = self.copy_value(value, memo)?;
            clone.borrow_mut().insert(key, value)?;
        }
        Ok(Value::Container(clone))
    }

    fn copy_object(&self, source: &Value, object: &ObjectRef, memo: &mut VisitedSet) -> Result<Value> {
        let type_name = object.borrow().type_name().clone();
        trace!(type_name = %type_name, "deep copying instance");

        let clone = self.registry.instantiate(type_name.as_str())?;
        memo.insert(source, Value::Object(Rc::clone(&clone)));

        for field in self.introspector.fields_along_hierarchy(type_name.as_str()).iter() {
            if field.is_final() {
                continue;
            }
            let raw = object.borrow().field(field.name());
            if raw.is_null() {
                continue;
            }

            let copied = if field.declared_type().is_well_known_immutable() {
                raw
            } else {
                self.copy_value(&raw, memo)?
            };
            clone.borrow_mut().set(field.name(), copied);
        }
        Ok(Value::Object(clone))
    }
}
