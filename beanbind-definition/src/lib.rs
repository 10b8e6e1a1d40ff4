//! Deferred bean definitions.
//!
//! [`DefinitionHandler`] walks a document with the same binding tables as
//! live unmarshalling, but instead of building objects it records what each
//! object *would* receive: its class, and a value for every property. Adapter
//! conversions are recorded too, not run. The resulting [`BeanDefinition`]
//! graph can be inspected, have `${...}` placeholders filled in, and later
//! be realized into live objects with a [`BeanFactory`].
//!
//! ```
//! use std::collections::HashMap;
//!
//! use beanbind::{Bean, BindingContext, Shape};
//! use beanbind_definition::{BeanFactory, Definition};
//!
//! #[derive(Debug, Default)]
//! struct Endpoint {
//!     url: String,
//!     retries: u8,
//! }
//!
//! impl Bean for Endpoint {
//!     fn shape() -> Shape {
//!         Shape::builder::<Self>("Endpoint")
//!             .default_constructor()
//!             .field("url", |e| &mut e.url)
//!             .attribute()
//!             .field("retries", |e| &mut e.retries)
//!             .attribute()
//!             .build()
//!     }
//! }
//!
//! let context = BindingContext::builder().root::<Endpoint>().build().unwrap();
//! let element =
//!     beanbind_node::parse(r#"<endpoint url="http://${host}/api" retries="${retries:3}"/>"#)
//!         .unwrap();
//!
//! let mut definition = beanbind_definition::unmarshal(&context, &element).unwrap();
//! assert_eq!(
//!     definition.property("url").and_then(Definition::as_text),
//!     Some("http://${host}/api")
//! );
//!
//! let properties = HashMap::from([("host".to_owned(), "example.com".to_owned())]);
//! definition.resolve_placeholders(&properties).unwrap();
//!
//! let endpoint: Endpoint = BeanFactory::new(&context).realize_as(&definition).unwrap();
//! assert_eq!(endpoint.url, "http://example.com/api");
//! assert_eq!(endpoint.retries, 3);
//! ```

#[cfg(feature = "tracing")]
macro_rules! trace {
    ($($arg:tt)*) => { ::tracing::trace!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

pub(crate) use trace;

mod definition;
mod factory;
mod handler;
mod placeholder;

pub use definition::{BeanDefinition, Definition, PropertyValue};
pub use factory::BeanFactory;
pub use handler::{DefinitionHandler, DefinitionTarget, unmarshal};
pub use placeholder::{PlaceholderError, resolve_placeholders};
