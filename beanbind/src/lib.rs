//! Declarative XML-to-object unmarshalling.
//!
//! Types describe their XML bindings once, through a [`Shape`] returned from
//! [`Bean::shape`]. A [`BindingContext`] is built from a set of root types:
//! it walks every reachable shape, compiles one binding table per type, and
//! then unmarshals any number of element trees against those tables.
//!
//! ```
//! use beanbind::{Bean, BindingContext, Shape};
//!
//! #[derive(Debug, Default)]
//! struct Item {
//!     name: String,
//!     tags: Vec<String>,
//! }
//!
//! impl Bean for Item {
//!     fn shape() -> Shape {
//!         Shape::builder::<Self>("Item")
//!             .default_constructor()
//!             .field("name", |item| &mut item.name)
//!             .attribute_named("displayName")
//!             .field("tags", |item| &mut item.tags)
//!             .wrapped_in("wrappedTags")
//!             .element_named("tag")
//!             .build()
//!     }
//! }
//!
//! let context = BindingContext::builder().root::<Item>().build().unwrap();
//! let element = beanbind_node::parse(
//!     r#"<item displayName="X"><wrappedTags><tag>a</tag><tag>b</tag></wrappedTags></item>"#,
//! )
//! .unwrap();
//! let item: Item = context.unmarshal_as(&element).unwrap();
//! assert_eq!(item.name, "X");
//! assert_eq!(item.tags, ["a", "b"]);
//! ```
//!
//! The tree walk never touches objects directly: it goes through a
//! [`BeanHandler`], so the same tables can produce live objects
//! ([`InstanceHandler`]) or any deferred representation a handler chooses to
//! build.

#[cfg(feature = "tracing")]
macro_rules! trace {
    ($($arg:tt)*) => { ::tracing::trace!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! debug {
    ($($arg:tt)*) => { ::tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

pub(crate) use debug;
pub(crate) use trace;

mod adapter;
mod class;
mod error;
mod handler;
mod instance;
pub mod naming;
mod node;
mod property;
mod registry;
mod shape;
mod unmarshaller;
mod value;

pub use adapter::{Adapter, AdapterError, XmlAdapter};
pub use class::BeanClass;
pub use error::{ConfigError, UnmarshalError, ValueError};
pub use handler::BeanHandler;
pub use instance::{InstanceHandler, InstanceTarget};
pub use node::DomNode;
pub use registry::{BindingContext, BindingContextBuilder};
pub use shape::{AccessMode, Bean, BeanType, Shape, ShapeBuilder, TypeRef};
pub use unmarshaller::BeanTable;
pub use value::{Property, Subtype, Value};
