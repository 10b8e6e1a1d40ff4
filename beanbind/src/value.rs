//! Type-erased property values and the conversions into typed fields.

use std::any::{Any, type_name};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::error::ValueError;
use crate::shape::{Bean, BeanType, TypeRef};

/// A value on its way into a live object.
pub enum Value {
    Null,
    /// Raw attribute or element text.
    Text(String),
    /// A finished bean, or any other typed value an adapter produced.
    Object(Box<dyn Any>),
    List(Vec<Value>),
    /// The contents of a fixed-size sequence taken out of an object.
    Array(Vec<Value>),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Object(_) => "object",
            Value::List(_) => "list",
            Value::Array(_) => "array",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Unwrap an [`Object`](Value::Object) holding a `T`.
    pub fn downcast<T: Any>(self) -> Result<T, ValueError> {
        match self {
            Value::Object(object) => {
                object
                    .downcast::<T>()
                    .map(|boxed| *boxed)
                    .map_err(|_| ValueError::Mismatch {
                        expected: type_name::<T>(),
                        found: "an object of another type",
                    })
            }
            Value::Null => Err(ValueError::Null {
                expected: type_name::<T>(),
            }),
            other => Err(ValueError::Mismatch {
                expected: type_name::<T>(),
                found: other.kind(),
            }),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Value::Object(_) => f.write_str("Object(..)"),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Array(items) => f.debug_tuple("Array").field(items).finish(),
        }
    }
}

/// A Rust type that can be stored in a bound property.
pub trait Property: Sized + 'static {
    fn type_ref() -> TypeRef;

    fn from_value(value: Value) -> Result<Self, ValueError>;

    fn into_value(self) -> Value;

    /// Move the current contents out of a property so a list can keep
    /// growing. Only collections support this.
    fn take_value(slot: &mut Self) -> Option<Value> {
        let _ = slot;
        None
    }
}

macro_rules! impl_scalar_property {
    ($($ty:ty),* $(,)?) => {$(
        impl Property for $ty {
            fn type_ref() -> TypeRef {
                TypeRef::Text(stringify!($ty))
            }

            fn from_value(value: Value) -> Result<Self, ValueError> {
                match value {
                    Value::Text(text) => text.trim().parse::<$ty>().map_err(|err| ValueError::Parse {
                        ty: stringify!($ty),
                        message: err.to_string(),
                        text,
                    }),
                    other => other.downcast::<$ty>(),
                }
            }

            fn into_value(self) -> Value {
                Value::Object(Box::new(self))
            }
        }
    )*};
}

impl_scalar_property!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl Property for String {
    fn type_ref() -> TypeRef {
        TypeRef::Text("String")
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Text(text) => Ok(text),
            other => other.downcast::<String>(),
        }
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl<P: Property> Property for Option<P> {
    fn type_ref() -> TypeRef {
        P::type_ref()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            value => P::from_value(value).map(Some),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Some(value) => value.into_value(),
            None => Value::Null,
        }
    }

    fn take_value(slot: &mut Self) -> Option<Value> {
        slot.as_mut().and_then(P::take_value)
    }
}

fn collect_items<P: Property>(value: Value) -> Result<Vec<P>, ValueError> {
    match value {
        Value::List(items) | Value::Array(items) => items.into_iter().map(P::from_value).collect(),
        Value::Null => Ok(Vec::new()),
        other => other.downcast::<Vec<P>>(),
    }
}

impl<P: Property> Property for Vec<P> {
    fn type_ref() -> TypeRef {
        TypeRef::List(Box::new(P::type_ref()))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        collect_items(value)
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(P::into_value).collect())
    }

    fn take_value(slot: &mut Self) -> Option<Value> {
        Some(std::mem::take(slot).into_value())
    }
}

impl<P: Property> Property for Box<[P]> {
    fn type_ref() -> TypeRef {
        TypeRef::Array(Box::new(P::type_ref()))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        collect_items(value).map(Vec::into_boxed_slice)
    }

    fn into_value(self) -> Value {
        Value::Array(self.into_vec().into_iter().map(P::into_value).collect())
    }

    fn take_value(slot: &mut Self) -> Option<Value> {
        Some(std::mem::take(slot).into_value())
    }
}

impl<K, V> Property for HashMap<K, V>
where
    K: Eq + Hash + 'static,
    V: 'static,
{
    fn type_ref() -> TypeRef {
        TypeRef::Opaque(type_name::<Self>())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        value.downcast()
    }

    fn into_value(self) -> Value {
        Value::Object(Box::new(self))
    }
}

impl<K: Ord + 'static, V: 'static> Property for BTreeMap<K, V> {
    fn type_ref() -> TypeRef {
        TypeRef::Opaque(type_name::<Self>())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        value.downcast()
    }

    fn into_value(self) -> Value {
        Value::Object(Box::new(self))
    }
}

impl<T: Bean> Property for T {
    fn type_ref() -> TypeRef {
        TypeRef::Bean(BeanType::of::<T>())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        value.downcast()
    }

    fn into_value(self) -> Value {
        Value::Object(Box::new(self))
    }
}

/// A boxed value of `B` or of any type that extends it.
///
/// Properties bound polymorphically, through element references or typed
/// element candidates, hold whichever concrete bean the document named.
/// Self-referential beans use it for their recursive properties too.
pub struct Subtype<B> {
    value: Box<dyn Any>,
    _bound: PhantomData<fn() -> B>,
}

impl<B: Bean> Subtype<B> {
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            value: Box::new(value),
            _bound: PhantomData,
        }
    }

    /// The value, if it is exactly a `B`.
    pub fn as_bound(&self) -> Option<&B> {
        self.value.downcast_ref()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut()
    }

    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self {
                value,
                _bound: PhantomData,
            }),
        }
    }

    pub fn into_any(self) -> Box<dyn Any> {
        self.value
    }
}

impl<B: Bean> Property for Subtype<B> {
    fn type_ref() -> TypeRef {
        TypeRef::Bean(BeanType::of::<B>())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Object(value) => Ok(Self {
                value,
                _bound: PhantomData,
            }),
            Value::Null => Err(ValueError::Null {
                expected: type_name::<B>(),
            }),
            other => Err(ValueError::Mismatch {
                expected: type_name::<B>(),
                found: other.kind(),
            }),
        }
    }

    fn into_value(self) -> Value {
        Value::Object(self.value)
    }
}

impl<B> fmt::Debug for Subtype<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subtype<{}>(..)", type_name::<B>())
    }
}
