use std::any::{Any, type_name};

use beanbind::{Bean, BindingContext, UnmarshalError, Value};

use crate::definition::{BeanDefinition, Definition};
use crate::trace;

/// Turns definitions into live objects, with the classes and adapters of a
/// [`BindingContext`].
///
/// A definition can be realized any number of times; each call builds fresh
/// objects.
#[derive(Clone, Copy)]
pub struct BeanFactory<'c> {
    context: &'c BindingContext,
}

impl<'c> BeanFactory<'c> {
    pub fn new(context: &'c BindingContext) -> Self {
        Self { context }
    }

    pub fn realize(&self, definition: &Definition) -> Result<Value, UnmarshalError> {
        match definition {
            Definition::Text(text) => Ok(Value::Text(text.clone())),
            Definition::Bean(bean) => self.realize_bean(bean).map(Value::Object),
            Definition::List(items) => items
                .iter()
                .map(|item| self.realize(item))
                .collect::<Result<_, _>>()
                .map(Value::List),
            Definition::Adapted { adapter, argument } => {
                let adapter = self.context.adapter_named(adapter).ok_or_else(|| {
                    UnmarshalError::UnknownType {
                        name: adapter.clone(),
                    }
                })?;
                adapter.convert(self.realize(argument)?)
            }
        }
    }

    pub fn realize_bean(&self, bean: &BeanDefinition) -> Result<Box<dyn Any>, UnmarshalError> {
        let class = self.context.class_named(&bean.bean_type).ok_or_else(|| {
            UnmarshalError::UnknownType {
                name: bean.bean_type.clone(),
            }
        })?;
        trace!(bean = class.type_name(), "realizing definition");

        let mut object = class.instantiate()?;
        for property in &bean.properties {
            let value = self.realize(&property.value)?;
            class.set_property(&mut *object, &property.name, value)?;
        }
        Ok(object)
    }

    /// Realize a definition that is expected to describe a `T`.
    pub fn realize_as<T: Bean>(&self, bean: &BeanDefinition) -> Result<T, UnmarshalError> {
        match self.realize_bean(bean)?.downcast::<T>() {
            Ok(object) => Ok(*object),
            Err(_) => Err(UnmarshalError::TypeMismatch {
                expected: type_name::<T>(),
                found: bean.bean_type.clone(),
            }),
        }
    }
}
