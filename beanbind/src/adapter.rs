//! Value adapters.
//!
//! An adapter sits between what the document can express and what a property
//! stores: the document is unmarshalled as the adapter's [`XmlAdapter::Value`]
//! type and the adapter turns that into the property's type.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use crate::error::UnmarshalError;
use crate::shape::TypeRef;
use crate::value::{Property, Value};

/// Error returned by an [`XmlAdapter`].
pub type AdapterError = Box<dyn std::error::Error + Send + Sync>;

/// Converts an XML-friendly value into the bound property type.
pub trait XmlAdapter: Send + Sync + 'static {
    /// The type the document is unmarshalled as.
    type Value: Property;
    /// The type stored in the property.
    type Bound: Property;

    fn unmarshal(&self, value: Self::Value) -> Result<Self::Bound, AdapterError>;
}

trait ErasedAdapter: Send + Sync {
    fn convert(&self, value: Value) -> Result<Value, AdapterError>;
}

impl<A: XmlAdapter> ErasedAdapter for A {
    fn convert(&self, value: Value) -> Result<Value, AdapterError> {
        let value = A::Value::from_value(value)?;
        Ok(self.unmarshal(value)?.into_value())
    }
}

/// A type-erased adapter instance, shared by every binding that declares it.
#[derive(Clone)]
pub struct Adapter {
    name: &'static str,
    source: TypeRef,
    inner: Arc<dyn ErasedAdapter>,
}

impl Adapter {
    pub fn new<A: XmlAdapter>(adapter: A) -> Self {
        Self {
            name: type_name::<A>(),
            source: A::Value::type_ref(),
            inner: Arc::new(adapter),
        }
    }

    /// The adapter's Rust type name, which identifies it in deferred output.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type documents are unmarshalled as before conversion.
    pub fn source_type(&self) -> &TypeRef {
        &self.source
    }

    pub fn convert(&self, value: Value) -> Result<Value, UnmarshalError> {
        self.inner
            .convert(value)
            .map_err(|source| UnmarshalError::Adapter {
                adapter: self.name,
                source,
            })
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    struct Doubler;

    impl XmlAdapter for Doubler {
        type Value = i32;
        type Bound = i64;

        fn unmarshal(&self, value: i32) -> Result<i64, AdapterError> {
            if value < 0 {
                return Err(format!("negative input {value}").into());
            }
            Ok(i64::from(value) * 2)
        }
    }

    #[test]
    fn converts_through_the_source_type() {
        let adapter = Adapter::new(Doubler);
        assert_eq!(adapter.source_type(), &TypeRef::Text("i32"));
        let value = adapter.convert(Value::Text("21".into())).unwrap();
        assert_eq!(value.downcast::<i64>().unwrap(), 42);
    }

    #[test]
    fn failures_name_the_adapter() {
        let adapter = Adapter::new(Doubler);
        let err = adapter.convert(Value::Text("-1".into())).unwrap_err();
        assert!(matches!(err, UnmarshalError::Adapter { adapter, .. } if adapter.ends_with("Doubler")));
        assert!(err.to_string().contains("negative input -1"));

        let err = adapter.convert(Value::Text("x".into())).unwrap_err();
        assert!(matches!(err, UnmarshalError::Adapter { .. }));
    }
}
