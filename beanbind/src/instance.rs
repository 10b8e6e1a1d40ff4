use std::any::Any;
use std::sync::Arc;

use crate::adapter::Adapter;
use crate::class::BeanClass;
use crate::error::{UnmarshalError, ValueError};
use crate::handler::BeanHandler;
use crate::value::Value;

/// Builds live objects as the document is walked.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceHandler;

/// A live object and the class that knows how to fill it.
///
/// Lists grow here, item by item, and are written into the object once the
/// element is finished.
pub struct InstanceTarget {
    class: Arc<BeanClass>,
    object: Box<dyn Any>,
    lists: Vec<(String, Vec<Value>)>,
}

impl InstanceTarget {
    pub fn class(&self) -> &BeanClass {
        &self.class
    }
}

impl BeanHandler for InstanceHandler {
    type Target = InstanceTarget;
    type Value = Value;

    fn create_target(&self, class: &Arc<BeanClass>) -> Result<InstanceTarget, UnmarshalError> {
        Ok(InstanceTarget {
            object: class.instantiate()?,
            class: Arc::clone(class),
            lists: Vec::new(),
        })
    }

    fn text(&self, text: String) -> Value {
        Value::Text(text)
    }

    fn set_property(
        &self,
        target: &mut InstanceTarget,
        property: &str,
        value: Value,
    ) -> Result<(), UnmarshalError> {
        // A direct write replaces anything collected so far.
        target.lists.retain(|(name, _)| name != property);
        target
            .class
            .set_property(&mut *target.object, property, value)
    }

    fn get_or_create_list<'t>(
        &self,
        target: &'t mut InstanceTarget,
        property: &str,
    ) -> Result<&'t mut Vec<Value>, UnmarshalError> {
        let index = match target.lists.iter().position(|(name, _)| name == property) {
            Some(index) => index,
            None => {
                let items = match target.class.take_property(&mut *target.object, property)? {
                    None | Some(Value::Null) => Vec::new(),
                    // Fixed-size contents come back as a growable list.
                    Some(Value::List(items) | Value::Array(items)) => items,
                    Some(other) => {
                        return Err(UnmarshalError::Property {
                            bean: target.class.type_name(),
                            property: property.to_owned(),
                            source: ValueError::Mismatch {
                                expected: "a list",
                                found: other.kind(),
                            },
                        });
                    }
                };
                target.lists.push((property.to_owned(), items));
                target.lists.len() - 1
            }
        };
        Ok(&mut target.lists[index].1)
    }

    fn list(&self, items: Vec<Value>) -> Value {
        Value::List(items)
    }

    fn apply_adapter(&self, adapter: &Adapter, value: Value) -> Result<Value, UnmarshalError> {
        adapter.convert(value)
    }

    fn finish(&self, target: InstanceTarget) -> Result<Value, UnmarshalError> {
        let InstanceTarget {
            class,
            mut object,
            lists,
        } = target;
        for (property, items) in lists {
            class.set_property(&mut *object, &property, Value::List(items))?;
        }
        Ok(Value::Object(object))
    }
}
