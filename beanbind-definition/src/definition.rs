use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::placeholder::{PlaceholderError, resolve_placeholders};

/// The recipe for one object: its class and the values of its properties.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BeanDefinition {
    /// Fully qualified Rust type name of the class.
    pub bean_type: String,
    /// Property values in the order they were first set.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub properties: Vec<PropertyValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropertyValue {
    pub name: String,
    pub value: Definition,
}

/// A deferred property value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Definition {
    /// Raw attribute or element text, converted when realized.
    Text(String),
    Bean(BeanDefinition),
    List(Vec<Definition>),
    /// `argument`, realized and then converted by the adapter named
    /// `adapter`.
    Adapted {
        adapter: String,
        argument: Box<Definition>,
    },
}

impl BeanDefinition {
    pub fn new(bean_type: impl Into<String>) -> Self {
        Self {
            bean_type: bean_type.into(),
            properties: Vec::new(),
        }
    }

    /// Builder-style [`set`](Self::set).
    pub fn with_property(mut self, name: impl Into<String>, value: Definition) -> Self {
        self.set(name, value);
        self
    }

    pub fn property(&self, name: &str) -> Option<&Definition> {
        self.properties
            .iter()
            .find(|property| property.name == name)
            .map(|property| &property.value)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut Definition> {
        self.properties
            .iter_mut()
            .find(|property| property.name == name)
            .map(|property| &mut property.value)
    }

    /// Set a property. A property that is already set keeps its position and
    /// gets the new value.
    pub fn set(&mut self, name: impl Into<String>, value: Definition) {
        let name = name.into();
        match self.property_mut(&name) {
            Some(existing) => *existing = value,
            None => self.properties.push(PropertyValue { name, value }),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Definition> {
        let index = self
            .properties
            .iter()
            .position(|property| property.name == name)?;
        Some(self.properties.remove(index).value)
    }

    /// The simple name of the class: the last path segment of
    /// [`bean_type`](Self::bean_type), without generic arguments.
    pub fn simple_name(&self) -> &str {
        let path = self
            .bean_type
            .split_once('<')
            .map_or(self.bean_type.as_str(), |(path, _)| path);
        path.rsplit("::").next().unwrap_or(path)
    }

    /// Replace `${key}` and `${key:default}` in every text value of this
    /// definition and the definitions nested inside it.
    pub fn resolve_placeholders(
        &mut self,
        properties: &HashMap<String, String>,
    ) -> Result<(), PlaceholderError> {
        for property in &mut self.properties {
            property.value.resolve_placeholders(properties)?;
        }
        Ok(())
    }
}

impl Definition {
    pub fn text(text: impl Into<String>) -> Self {
        Definition::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Definition::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bean(&self) -> Option<&BeanDefinition> {
        match self {
            Definition::Bean(bean) => Some(bean),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Definition]> {
        match self {
            Definition::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Definition::Text(_) => "text",
            Definition::Bean(_) => "bean",
            Definition::List(_) => "list",
            Definition::Adapted { .. } => "adapted",
        }
    }

    pub fn resolve_placeholders(
        &mut self,
        properties: &HashMap<String, String>,
    ) -> Result<(), PlaceholderError> {
        match self {
            Definition::Text(text) => {
                if text.contains("${") {
                    *text = resolve_placeholders(text, properties)?;
                }
                Ok(())
            }
            Definition::Bean(bean) => bean.resolve_placeholders(properties),
            Definition::List(items) => items
                .iter_mut()
                .try_for_each(|item| item.resolve_placeholders(properties)),
            Definition::Adapted { argument, .. } => argument.resolve_placeholders(properties),
        }
    }
}
