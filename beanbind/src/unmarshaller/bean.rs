//! Walks one element into one bean, or one wrapper into one list.

use super::{BeanTable, WrapperUnmarshaller};
use crate::error::UnmarshalError;
use crate::handler::BeanHandler;
use crate::node::{DomNode, is_namespace_declaration};
use crate::registry::BindingContext;
use crate::trace;

impl BindingContext {
    /// Attributes first, then child elements in document order, then text.
    pub(crate) fn unmarshal_bean<N, H>(
        &self,
        table: &BeanTable,
        node: &N,
        handler: &H,
    ) -> Result<H::Value, UnmarshalError>
    where
        N: DomNode,
        H: BeanHandler,
    {
        let class = &table.class;
        trace!(bean = class.type_name(), element = node.local_name(), "unmarshalling bean");
        let mut target = handler.create_target(class)?;

        for (name, raw) in node.attributes() {
            if is_namespace_declaration(name) {
                continue;
            }
            let property = table.attribute_property(name).unwrap_or(name);
            let mut value = handler.text(raw.to_owned());
            if let Some(adapter) = table.attribute_adapters.get(name) {
                value = handler.apply_adapter(adapter, value)?;
            }
            trace!(attribute = name, property, "→ attribute");
            handler.set_property(&mut target, property, value)?;
        }

        for child in node.child_elements() {
            let name = child.local_name();
            // Local bindings shadow registered roots of the same name.
            let unmarshaller = table
                .children
                .get(name)
                .or_else(|| self.globals.get(name))
                .ok_or_else(|| UnmarshalError::UnknownElement {
                    bean: class.type_name(),
                    element: name.to_owned(),
                })?;
            let value = self.dispatch(unmarshaller, child, handler)?;
            let property = table.element_property(name).unwrap_or(name);

            if table.is_list_element(name) {
                trace!(element = name, property, "→ list item");
                handler
                    .get_or_create_list(&mut target, property)?
                    .push(value);
            } else {
                trace!(element = name, property, "→ element");
                handler.set_property(&mut target, property, value)?;
            }
        }

        if let Some(property) = table.text_property() {
            trace!(property, "→ text");
            let text = handler.text(node.text_content());
            handler.set_property(&mut target, property, text)?;
        }

        handler.finish(target)
    }

    /// Children the wrapper does not recognize are skipped.
    pub(crate) fn unmarshal_wrapper<N, H>(
        &self,
        wrapper: &WrapperUnmarshaller,
        node: &N,
        handler: &H,
    ) -> Result<H::Value, UnmarshalError>
    where
        N: DomNode,
        H: BeanHandler,
    {
        let mut items = Vec::new();
        for child in node.child_elements() {
            let Some(unmarshaller) = wrapper.children.get(child.local_name()) else {
                trace!(element = child.local_name(), "skipping unrecognized wrapped element");
                continue;
            };
            items.push(self.dispatch(unmarshaller, child, handler)?);
        }
        Ok(handler.list(items))
    }
}
