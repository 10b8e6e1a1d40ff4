use std::sync::Arc;

use beanbind::{
    Adapter, BeanClass, BeanHandler, BindingContext, DomNode, UnmarshalError, ValueError,
};

use crate::definition::{BeanDefinition, Definition};
use crate::trace;

/// Records the tree walk as [`BeanDefinition`]s instead of building objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionHandler;

/// A definition being filled, and the class it describes.
pub struct DefinitionTarget {
    class: Arc<BeanClass>,
    definition: BeanDefinition,
}

impl DefinitionTarget {
    pub fn class(&self) -> &BeanClass {
        &self.class
    }

    pub fn definition(&self) -> &BeanDefinition {
        &self.definition
    }
}

impl BeanHandler for DefinitionHandler {
    type Target = DefinitionTarget;
    type Value = Definition;

    fn create_target(&self, class: &Arc<BeanClass>) -> Result<DefinitionTarget, UnmarshalError> {
        Ok(DefinitionTarget {
            definition: BeanDefinition::new(class.rust_name()),
            class: Arc::clone(class),
        })
    }

    fn text(&self, text: String) -> Definition {
        Definition::Text(text)
    }

    fn set_property(
        &self,
        target: &mut DefinitionTarget,
        property: &str,
        value: Definition,
    ) -> Result<(), UnmarshalError> {
        known_property(&target.class, property)?;
        target.definition.set(property, value);
        Ok(())
    }

    fn get_or_create_list<'t>(
        &self,
        target: &'t mut DefinitionTarget,
        property: &str,
    ) -> Result<&'t mut Vec<Definition>, UnmarshalError> {
        let DefinitionTarget { class, definition } = target;
        known_property(class, property)?;
        // The list keeps the position where the property was first set.
        if definition.property(property).is_none() {
            definition.set(property, Definition::List(Vec::new()));
        }
        match definition.property_mut(property) {
            Some(Definition::List(items)) => Ok(items),
            other => Err(UnmarshalError::Property {
                bean: class.type_name(),
                property: property.to_owned(),
                source: ValueError::Mismatch {
                    expected: "a list",
                    found: other.map_or("nothing", |value| value.kind()),
                },
            }),
        }
    }

    fn list(&self, items: Vec<Definition>) -> Definition {
        Definition::List(items)
    }

    fn apply_adapter(
        &self,
        adapter: &Adapter,
        value: Definition,
    ) -> Result<Definition, UnmarshalError> {
        trace!(adapter = adapter.name(), "deferring adapter");
        Ok(Definition::Adapted {
            adapter: adapter.name().to_owned(),
            argument: Box::new(value),
        })
    }

    fn finish(&self, target: DefinitionTarget) -> Result<Definition, UnmarshalError> {
        Ok(Definition::Bean(target.definition))
    }
}

fn known_property(class: &BeanClass, property: &str) -> Result<(), UnmarshalError> {
    if class.has_property(property) {
        Ok(())
    } else {
        Err(UnmarshalError::UnknownProperty {
            bean: class.type_name(),
            property: property.to_owned(),
        })
    }
}

/// Unmarshal a document element into a [`BeanDefinition`] for the root type
/// its local name selects.
pub fn unmarshal<N: DomNode>(
    context: &BindingContext,
    node: &N,
) -> Result<BeanDefinition, UnmarshalError> {
    match context.unmarshal_with(node, &DefinitionHandler)? {
        Definition::Bean(definition) => Ok(definition),
        other => Err(UnmarshalError::TypeMismatch {
            expected: "a bean definition",
            found: other.kind().to_owned(),
        }),
    }
}
