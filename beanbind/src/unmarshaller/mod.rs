//! Compiled unmarshallers and the recursive tree walk.

use std::collections::HashMap;

use crate::adapter::Adapter;
use crate::error::UnmarshalError;
use crate::handler::BeanHandler;
use crate::node::DomNode;
use crate::registry::BindingContext;

mod bean;
mod bean_table;
mod entrypoints;

pub use bean_table::BeanTable;
pub(crate) use bean_table::TableBuilder;

/// Index of a bean table in its context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct TableId(pub(crate) usize);

/// Turns one element into one value.
#[derive(Clone, Debug)]
pub(crate) enum Unmarshaller {
    /// The element's text content.
    Text,
    /// A bean filled from the element through its table.
    Bean(TableId),
    /// A list of whatever the wrapper's recognized children unmarshal to.
    Wrapper(WrapperUnmarshaller),
    /// The delegate's result passed through an adapter.
    Adapted {
        adapter: Adapter,
        delegate: Box<Unmarshaller>,
    },
}

/// Children of a wrapper element, by local name.
#[derive(Clone, Debug, Default)]
pub(crate) struct WrapperUnmarshaller {
    pub(crate) children: HashMap<String, Unmarshaller>,
}

impl BindingContext {
    pub(crate) fn dispatch<N, H>(
        &self,
        unmarshaller: &Unmarshaller,
        node: &N,
        handler: &H,
    ) -> Result<H::Value, UnmarshalError>
    where
        N: DomNode,
        H: BeanHandler,
    {
        match unmarshaller {
            Unmarshaller::Text => Ok(handler.text(node.text_content())),
            Unmarshaller::Bean(id) => self.unmarshal_bean(&self.tables[id.0], node, handler),
            Unmarshaller::Wrapper(wrapper) => self.unmarshal_wrapper(wrapper, node, handler),
            Unmarshaller::Adapted { adapter, delegate } => {
                let value = self.dispatch(delegate, node, handler)?;
                handler.apply_adapter(adapter, value)
            }
        }
    }
}
