//! Public unmarshalling entry points.

use std::any::{Any, type_name};

use crate::error::UnmarshalError;
use crate::handler::BeanHandler;
use crate::instance::InstanceHandler;
use crate::node::DomNode;
use crate::registry::BindingContext;
use crate::shape::Bean;
use crate::value::Value;

impl BindingContext {
    /// Unmarshal a document element into a live object.
    ///
    /// The element's local name selects the root type.
    pub fn unmarshal<N: DomNode>(&self, node: &N) -> Result<Box<dyn Any>, UnmarshalError> {
        match self.unmarshal_with(node, &InstanceHandler)? {
            Value::Object(object) => Ok(object),
            _ => Err(UnmarshalError::TypeMismatch {
                expected: "a bean",
                found: node.local_name().to_owned(),
            }),
        }
    }

    /// Unmarshal a document element that is expected to be a `T`.
    pub fn unmarshal_as<T: Bean, N: DomNode>(&self, node: &N) -> Result<T, UnmarshalError> {
        let object = self.unmarshal(node)?;
        match object.downcast::<T>() {
            Ok(bean) => Ok(*bean),
            Err(_) => Err(UnmarshalError::TypeMismatch {
                expected: type_name::<T>(),
                found: node.local_name().to_owned(),
            }),
        }
    }

    /// Unmarshal a document element through a custom [`BeanHandler`].
    pub fn unmarshal_with<N, H>(&self, node: &N, handler: &H) -> Result<H::Value, UnmarshalError>
    where
        N: DomNode,
        H: BeanHandler,
    {
        let name = node.local_name();
        let unmarshaller = self
            .globals
            .get(name)
            .ok_or_else(|| UnmarshalError::UnknownRoot {
                name: name.to_owned(),
            })?;
        self.dispatch(unmarshaller, node, handler)
    }
}
