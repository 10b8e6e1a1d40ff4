use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::UnmarshalError;
use crate::property::PropertyResolver;
use crate::shape::{Constructor, Shape, Slot, Upcast};
use crate::value::Value;

/// Writable access to the properties of one concrete bean type.
///
/// Properties declared anywhere in the inheritance chain are reachable by
/// name; a subtype's property shadows an inherited one with the same name.
pub struct BeanClass {
    id: TypeId,
    type_name: &'static str,
    rust_name: &'static str,
    constructor: Option<Constructor>,
    properties: HashMap<String, PropertySlot>,
}

/// The members of one level that share a property name.
struct PropertySlot {
    depth: usize,
    /// Upcasts from the concrete object to the declaring type.
    path: Vec<Arc<dyn Upcast>>,
    /// A field or getter.
    reader: Option<Arc<dyn Slot>>,
    setter: Option<Arc<dyn Slot>>,
}

impl PropertySlot {
    /// Setters write; a field or getter writes through its storage otherwise.
    fn writer(&self) -> Option<&Arc<dyn Slot>> {
        self.setter.as_ref().or(self.reader.as_ref())
    }

    fn locate<'a>(&self, target: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        let mut current = target;
        for step in &self.path {
            current = step.upcast(current)?;
        }
        Some(current)
    }
}

impl BeanClass {
    /// `levels` runs from the concrete type up to its root ancestor.
    pub(crate) fn new(levels: &[Arc<Shape>]) -> Self {
        let concrete = &levels[0];
        let mut properties = HashMap::new();
        let mut path: Vec<Arc<dyn Upcast>> = Vec::new();
        for (depth, shape) in levels.iter().enumerate() {
            if depth > 0
                && let Some(parent) = &levels[depth - 1].parent
            {
                path.push(Arc::clone(&parent.upcast));
            }
            for member in &shape.members {
                let name = PropertyResolver::for_member(member).property_name(member);
                let entry = properties.entry(name).or_insert_with(|| PropertySlot {
                    depth,
                    path: path.clone(),
                    reader: None,
                    setter: None,
                });
                if entry.depth != depth {
                    continue;
                }
                let accessor = if member.kind.reads() {
                    &mut entry.reader
                } else {
                    &mut entry.setter
                };
                if accessor.is_none() {
                    *accessor = Some(Arc::clone(&member.slot));
                }
            }
        }
        Self {
            id: concrete.id,
            type_name: concrete.type_name,
            rust_name: concrete.rust_name,
            constructor: concrete.constructor.clone(),
            properties,
        }
    }

    /// The simple name the type was declared with.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The fully qualified Rust type name.
    pub fn rust_name(&self) -> &'static str {
        self.rust_name
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    /// Whether the current value of `property` can be read back, through a
    /// field or a getter.
    pub fn is_readable(&self, property: &str) -> bool {
        self.properties
            .get(property)
            .is_some_and(|entry| entry.reader.is_some())
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Create a fresh instance.
    pub fn instantiate(&self) -> Result<Box<dyn Any>, UnmarshalError> {
        match &self.constructor {
            Some(constructor) => Ok(constructor()),
            None => Err(UnmarshalError::Construction {
                bean: self.type_name,
            }),
        }
    }

    /// Store `value` in `property` of `target`, an instance of this class.
    pub fn set_property(
        &self,
        target: &mut dyn Any,
        property: &str,
        value: Value,
    ) -> Result<(), UnmarshalError> {
        let (entry, owner) = self.resolve(target, property)?;
        let writer = entry.writer().ok_or_else(|| self.unknown(property))?;
        writer
            .set(owner, value)
            .map_err(|source| UnmarshalError::Property {
                bean: self.type_name,
                property: property.to_owned(),
                source,
            })
    }

    /// Move the current value of `property` out of `target`.
    ///
    /// Returns `None` when the property cannot be read back, for example when
    /// it is only reachable through a setter.
    pub fn take_property(
        &self,
        target: &mut dyn Any,
        property: &str,
    ) -> Result<Option<Value>, UnmarshalError> {
        let (entry, owner) = self.resolve(target, property)?;
        Ok(entry.reader.as_ref().and_then(|reader| reader.take(owner)))
    }

    fn resolve<'a>(
        &self,
        target: &'a mut dyn Any,
        property: &str,
    ) -> Result<(&PropertySlot, &'a mut dyn Any), UnmarshalError> {
        let entry = self
            .properties
            .get(property)
            .ok_or_else(|| self.unknown(property))?;
        let owner = entry
            .locate(target)
            .ok_or_else(|| self.unknown(property))?;
        Ok((entry, owner))
    }

    fn unknown(&self, property: &str) -> UnmarshalError {
        UnmarshalError::UnknownProperty {
            bean: self.type_name,
            property: property.to_owned(),
        }
    }
}

impl fmt::Debug for BeanClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.property_names().collect();
        names.sort_unstable();
        f.debug_struct("BeanClass")
            .field("type_name", &self.type_name)
            .field("properties", &names)
            .finish_non_exhaustive()
    }
}
