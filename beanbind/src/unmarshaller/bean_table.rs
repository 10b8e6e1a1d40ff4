//! Precomputed binding table for one bean type.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::{Unmarshaller, WrapperUnmarshaller};
use crate::adapter::Adapter;
use crate::class::BeanClass;
use crate::error::ConfigError;
use crate::naming::xml_name;
use crate::property::PropertyResolver;
use crate::registry::TypeRegistry;
use crate::shape::{BeanType, Binding, ElementSpec, Member, Shape, TypeRef};
use crate::trace;

/// How the attributes, child elements and text of one element map onto the
/// properties of one bean type.
///
/// Names missing from the tables fall back to themselves: an unmapped
/// attribute `foo` is stored in property `foo`.
#[derive(Debug)]
pub struct BeanTable {
    pub(crate) class: Arc<BeanClass>,
    /// Attribute name to property name.
    pub(crate) attributes: HashMap<String, String>,
    pub(crate) attribute_adapters: HashMap<String, Adapter>,
    /// Child element name to property name.
    pub(crate) elements: HashMap<String, String>,
    /// Child element name to its unmarshaller. Element references are absent
    /// and resolve through the root registry.
    pub(crate) children: HashMap<String, Unmarshaller>,
    /// Child elements whose values are appended to a list property.
    pub(crate) lists: HashSet<String>,
    pub(crate) text: Option<String>,
}

impl BeanTable {
    fn new(class: Arc<BeanClass>) -> Self {
        Self {
            class,
            attributes: HashMap::new(),
            attribute_adapters: HashMap::new(),
            elements: HashMap::new(),
            children: HashMap::new(),
            lists: HashSet::new(),
            text: None,
        }
    }

    pub fn class(&self) -> &BeanClass {
        &self.class
    }

    /// The property an attribute is stored in, if it is mapped.
    pub fn attribute_property(&self, attribute: &str) -> Option<&str> {
        self.attributes.get(attribute).map(String::as_str)
    }

    pub fn attribute_adapter(&self, attribute: &str) -> Option<&Adapter> {
        self.attribute_adapters.get(attribute)
    }

    /// The property a child element is stored in, if it is mapped.
    pub fn element_property(&self, element: &str) -> Option<&str> {
        self.elements.get(element).map(String::as_str)
    }

    /// Whether repeated `element` children accumulate into a list.
    pub fn is_list_element(&self, element: &str) -> bool {
        self.lists.contains(element)
    }

    /// Whether `element` is a wrapper around a list's items.
    pub fn is_wrapper(&self, element: &str) -> bool {
        matches!(self.children.get(element), Some(Unmarshaller::Wrapper(_)))
    }

    /// The child elements a wrapper element recognizes, sorted.
    pub fn wrapped_elements(&self, wrapper: &str) -> Option<Vec<&str>> {
        let Some(Unmarshaller::Wrapper(wrapper)) = self.children.get(wrapper) else {
            return None;
        };
        let mut names: Vec<_> = wrapper.children.keys().map(String::as_str).collect();
        names.sort_unstable();
        Some(names)
    }

    /// The property that receives the element's text content.
    pub fn text_property(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Fills one [`BeanTable`] from the shapes of a type and its ancestors.
pub(crate) struct TableBuilder<'r> {
    registry: &'r mut TypeRegistry,
    table: BeanTable,
}

impl<'r> TableBuilder<'r> {
    pub(crate) fn build(
        registry: &'r mut TypeRegistry,
        bean_type: BeanType,
    ) -> Result<BeanTable, ConfigError> {
        let levels = registry.hierarchy(bean_type)?;
        let class = Arc::new(BeanClass::new(&levels));
        trace!(bean = class.type_name(), levels = levels.len(), "building binding table");

        let mut builder = TableBuilder {
            registry,
            table: BeanTable::new(class),
        };
        for shape in &levels {
            let resolver = PropertyResolver::for_shape(shape)?;
            for member in resolver.direct_members(shape) {
                builder.add_member(shape, resolver, member)?;
            }
        }
        Ok(builder.table)
    }

    fn type_name(&self) -> &'static str {
        self.table.class.type_name()
    }

    fn add_member(
        &mut self,
        shape: &Shape,
        resolver: PropertyResolver,
        member: &Member,
    ) -> Result<(), ConfigError> {
        // A wrapper alone implies a plain element binding.
        let implied;
        let binding = match &member.binding {
            Some(binding) => binding,
            None if member.wrapper.is_some() => {
                implied = Binding::Elements(vec![ElementSpec {
                    name: None,
                    ty: None,
                }]);
                &implied
            }
            None => return Ok(()),
        };

        let property = resolver.property_name(member);
        match binding {
            Binding::Attribute(name) => self.add_attribute(shape, member, property, *name),
            Binding::Elements(specs) => self.add_elements(shape, resolver, member, property, specs),
            Binding::ElementRef => self.add_element_ref(shape, resolver, member, property),
            Binding::Text => self.set_text(property),
        }
    }

    fn add_attribute(
        &mut self,
        shape: &Shape,
        member: &Member,
        property: String,
        name: Option<&'static str>,
    ) -> Result<(), ConfigError> {
        let attribute = xml_name(&property, name, shape.rename_all);
        if let Some(adapter) = self.adapter_for(shape, member, &property)? {
            self.table
                .attribute_adapters
                .insert(attribute.clone(), adapter);
        }
        trace!(%attribute, %property, "attribute binding");

        let type_name = self.type_name();
        match self.table.attributes.entry(attribute) {
            Entry::Occupied(existing) => Err(ConfigError::DuplicateAttribute {
                type_name,
                attribute: existing.key().clone(),
                first: existing.get().clone(),
                second: property,
            }),
            Entry::Vacant(slot) => {
                slot.insert(property);
                Ok(())
            }
        }
    }

    fn add_elements(
        &mut self,
        shape: &Shape,
        resolver: PropertyResolver,
        member: &Member,
        property: String,
        specs: &[ElementSpec],
    ) -> Result<(), ConfigError> {
        let adapter = self.adapter_for(shape, member, &property)?;
        let mut children = Vec::with_capacity(specs.len());
        for spec in specs {
            let element = xml_name(&property, spec.name, shape.rename_all);
            let unmarshaller =
                self.element_unmarshaller(shape, resolver, member, &property, spec, adapter.as_ref())?;
            children.push((element, unmarshaller));
        }

        if let Some(wrapper) = member.wrapper {
            let wrapper_name = xml_name(&property, wrapper, shape.rename_all);
            let mut inner = WrapperUnmarshaller::default();
            for (element, unmarshaller) in children {
                if inner.children.contains_key(&element) {
                    return Err(ConfigError::DuplicateElement {
                        type_name: self.type_name(),
                        element,
                        first: property.clone(),
                        second: property,
                    });
                }
                inner.children.insert(element, unmarshaller);
            }
            trace!(wrapper = %wrapper_name, %property, "wrapped element binding");
            return self.bind_element(
                wrapper_name,
                property,
                Some(Unmarshaller::Wrapper(inner)),
                false,
            );
        }

        let is_list = resolver.is_list_type(member);
        for (element, unmarshaller) in children {
            trace!(%element, %property, is_list, "element binding");
            self.bind_element(element, property.clone(), Some(unmarshaller), is_list)?;
        }
        Ok(())
    }

    fn element_unmarshaller(
        &mut self,
        shape: &Shape,
        resolver: PropertyResolver,
        member: &Member,
        property: &str,
        spec: &ElementSpec,
        adapter: Option<&Adapter>,
    ) -> Result<Unmarshaller, ConfigError> {
        // An adapter decides what the element itself unmarshals as.
        let ty = match (adapter, &spec.ty) {
            (Some(adapter), _) => adapter.source_type(),
            (None, Some(ty)) => ty,
            (None, None) => resolver.component_type(member),
        };
        let unmarshaller =
            self.registry
                .get_or_create(ty)
                .ok_or_else(|| ConfigError::UnbindableType {
                    type_name: shape.type_name,
                    property: property.to_owned(),
                    found: ty.to_string(),
                })?;
        Ok(match adapter {
            Some(adapter) => Unmarshaller::Adapted {
                adapter: adapter.clone(),
                delegate: Box::new(unmarshaller),
            },
            None => unmarshaller,
        })
    }

    fn add_element_ref(
        &mut self,
        shape: &Shape,
        resolver: PropertyResolver,
        member: &Member,
        property: String,
    ) -> Result<(), ConfigError> {
        let TypeRef::Bean(bound) = resolver.component_type(member) else {
            return Err(ConfigError::UnbindableType {
                type_name: shape.type_name,
                property,
                found: resolver.property_type(member).to_string(),
            });
        };
        let is_list = resolver.is_list_type(member);
        for element in self.registry.roots_compatible_with(*bound)? {
            trace!(%element, %property, is_list, "element reference binding");
            self.bind_element(element, property.clone(), None, is_list)?;
        }
        Ok(())
    }

    fn set_text(&mut self, property: String) -> Result<(), ConfigError> {
        if let Some(first) = &self.table.text {
            return Err(ConfigError::MultipleTextBindings {
                type_name: self.type_name(),
                first: first.clone(),
                second: property,
            });
        }
        trace!(%property, "text binding");
        self.table.text = Some(property);
        Ok(())
    }

    fn bind_element(
        &mut self,
        element: String,
        property: String,
        unmarshaller: Option<Unmarshaller>,
        is_list: bool,
    ) -> Result<(), ConfigError> {
        if let Some(first) = self.table.elements.get(&element) {
            return Err(ConfigError::DuplicateElement {
                type_name: self.type_name(),
                first: first.clone(),
                second: property,
                element,
            });
        }
        if let Some(unmarshaller) = unmarshaller {
            self.table.children.insert(element.clone(), unmarshaller);
        }
        if is_list {
            if !self.table.class.is_readable(&property) {
                return Err(ConfigError::UnreadableList {
                    type_name: self.type_name(),
                    property,
                });
            }
            self.table.lists.insert(element.clone());
        }
        self.table.elements.insert(element, property);
        Ok(())
    }

    fn adapter_for(
        &mut self,
        shape: &Shape,
        member: &Member,
        property: &str,
    ) -> Result<Option<Adapter>, ConfigError> {
        match member.adapters.as_slice() {
            [] => Ok(None),
            [declared] => Ok(Some(
                self.registry.register_adapter((declared.instantiate)()),
            )),
            _ => Err(ConfigError::AmbiguousAdapter {
                type_name: shape.type_name,
                property: property.to_owned(),
            }),
        }
    }
}
