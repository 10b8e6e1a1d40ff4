use std::sync::Arc;

use crate::adapter::Adapter;
use crate::class::BeanClass;
use crate::error::UnmarshalError;

/// Where unmarshalled data goes.
///
/// The tree walk decides *what* is set and in which order; a handler decides
/// what setting means. [`InstanceHandler`](crate::InstanceHandler) writes into
/// live objects right away, while other handlers can record the same calls
/// and build the objects later.
pub trait BeanHandler {
    /// A bean under construction.
    type Target;
    /// Whatever the handler stores in properties.
    type Value;

    fn create_target(&self, class: &Arc<BeanClass>) -> Result<Self::Target, UnmarshalError>;

    /// Wrap raw attribute or element text.
    fn text(&self, text: String) -> Self::Value;

    fn set_property(
        &self,
        target: &mut Self::Target,
        property: &str,
        value: Self::Value,
    ) -> Result<(), UnmarshalError>;

    /// The items collected so far for a list property.
    ///
    /// The first call for a property starts from its current value: nothing
    /// yields an empty list, and a fixed-size array yields its items. The walk
    /// pushes onto the returned list, and the handler stores it by the time
    /// [`finish`](Self::finish) returns.
    fn get_or_create_list<'t>(
        &self,
        target: &'t mut Self::Target,
        property: &str,
    ) -> Result<&'t mut Vec<Self::Value>, UnmarshalError>;

    fn list(&self, items: Vec<Self::Value>) -> Self::Value;

    /// Run `value` through `adapter`, now or later.
    fn apply_adapter(
        &self,
        adapter: &Adapter,
        value: Self::Value,
    ) -> Result<Self::Value, UnmarshalError>;

    /// Turn a finished target into a value.
    fn finish(&self, target: Self::Target) -> Result<Self::Value, UnmarshalError>;
}
