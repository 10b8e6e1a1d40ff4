//! Error types for building binding contexts and unmarshalling documents.

use std::fmt;

use crate::adapter::AdapterError;
use crate::shape::AccessMode;

/// Error raised while a [`BindingContext`](crate::BindingContext) is built.
///
/// Every declaration problem surfaces here, before any document is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The type declares an access mode that has no property strategy.
    UnsupportedAccessMode {
        type_name: &'static str,
        mode: AccessMode,
    },
    /// A root type has no zero-argument constructor.
    MissingConstructor { type_name: &'static str },
    /// More than one property is bound to the element's text.
    MultipleTextBindings {
        type_name: &'static str,
        first: String,
        second: String,
    },
    /// A property declares more than one adapter.
    AmbiguousAdapter {
        type_name: &'static str,
        property: String,
    },
    /// Two bindings of the same type claim one element name.
    DuplicateElement {
        type_name: &'static str,
        element: String,
        first: String,
        second: String,
    },
    /// Two bindings of the same type claim one attribute name.
    DuplicateAttribute {
        type_name: &'static str,
        attribute: String,
        first: String,
        second: String,
    },
    /// Two root types map to the same element name.
    DuplicateRootName {
        name: String,
        first: &'static str,
        second: &'static str,
    },
    /// An element-bound property has a type no unmarshaller can produce.
    UnbindableType {
        type_name: &'static str,
        property: String,
        found: String,
    },
    /// Repeated elements append to a property that only has a setter, so
    /// the items collected so far could not be read back.
    UnreadableList {
        type_name: &'static str,
        property: String,
    },
    /// The shape itself is malformed.
    InvalidDeclaration {
        type_name: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnsupportedAccessMode { type_name, mode } => {
                write!(f, "{type_name}: access mode {mode} is not supported")
            }
            ConfigError::MissingConstructor { type_name } => {
                write!(f, "{type_name}: root types need a zero-argument constructor")
            }
            ConfigError::MultipleTextBindings {
                type_name,
                first,
                second,
            } => write!(
                f,
                "{type_name}: both `{first}` and `{second}` are bound to the element text"
            ),
            ConfigError::AmbiguousAdapter {
                type_name,
                property,
            } => write!(f, "{type_name}.{property}: more than one adapter declared"),
            ConfigError::DuplicateElement {
                type_name,
                element,
                first,
                second,
            } => write!(
                f,
                "{type_name}: element <{element}> is bound to both `{first}` and `{second}`"
            ),
            ConfigError::DuplicateAttribute {
                type_name,
                attribute,
                first,
                second,
            } => write!(
                f,
                "{type_name}: attribute `{attribute}` is bound to both `{first}` and `{second}`"
            ),
            ConfigError::DuplicateRootName {
                name,
                first,
                second,
            } => write!(
                f,
                "root element <{name}> is claimed by both {first} and {second}"
            ),
            ConfigError::UnbindableType {
                type_name,
                property,
                found,
            } => write!(
                f,
                "{type_name}.{property}: cannot unmarshal elements of type {found} without an adapter"
            ),
            ConfigError::UnreadableList {
                type_name,
                property,
            } => write!(
                f,
                "{type_name}.{property}: list elements need a field or getter to append to"
            ),
            ConfigError::InvalidDeclaration { type_name, reason } => {
                write!(f, "{type_name}: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error converting a [`Value`](crate::Value) into a typed property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Text could not be parsed as the target scalar.
    Parse {
        ty: &'static str,
        text: String,
        message: String,
    },
    /// The value has the wrong shape for the target.
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// A required value was absent.
    Null { expected: &'static str },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::Parse { ty, text, message } => {
                write!(f, "cannot parse {text:?} as {ty}: {message}")
            }
            ValueError::Mismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            ValueError::Null { expected } => write!(f, "expected {expected}, found null"),
        }
    }
}

impl std::error::Error for ValueError {}

/// Error raised while unmarshalling a document or realizing a definition.
#[derive(Debug)]
pub enum UnmarshalError {
    /// The document element is not a registered root.
    UnknownRoot { name: String },
    /// A child element has no binding and no registered root of that name.
    UnknownElement { bean: &'static str, element: String },
    /// The target type has no property of that name.
    UnknownProperty { bean: &'static str, property: String },
    /// A type or adapter name that nothing registered.
    UnknownType { name: String },
    /// The target type could not be instantiated.
    Construction { bean: &'static str },
    /// A value could not be stored in its property.
    Property {
        bean: &'static str,
        property: String,
        source: ValueError,
    },
    /// An adapter rejected its input.
    Adapter {
        adapter: &'static str,
        source: AdapterError,
    },
    /// The unmarshalled root is not of the requested type.
    TypeMismatch { expected: &'static str, found: String },
}

impl fmt::Display for UnmarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmarshalError::UnknownRoot { name } => {
                write!(f, "no root type registered for element <{name}>")
            }
            UnmarshalError::UnknownElement { bean, element } => {
                write!(f, "{bean}: unexpected child element <{element}>")
            }
            UnmarshalError::UnknownProperty { bean, property } => {
                write!(f, "{bean} has no property `{property}`")
            }
            UnmarshalError::UnknownType { name } => write!(f, "`{name}` is not registered"),
            UnmarshalError::Construction { bean } => {
                write!(f, "{bean} has no zero-argument constructor")
            }
            UnmarshalError::Property {
                bean,
                property,
                source,
            } => write!(f, "{bean}.{property}: {source}"),
            UnmarshalError::Adapter { adapter, source } => {
                write!(f, "adapter {adapter} failed: {source}")
            }
            UnmarshalError::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, but <{found}> unmarshals to another type")
            }
        }
    }
}

impl std::error::Error for UnmarshalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UnmarshalError::Property { source, .. } => Some(source),
            UnmarshalError::Adapter { source, .. } => Some(&**source),
            _ => None,
        }
    }
}
