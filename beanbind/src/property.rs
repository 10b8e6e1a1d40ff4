//! Property strategies.
//!
//! Each level of a type's inheritance chain picks, through its access mode,
//! which of its members carry bindings and how their property names and
//! types are derived.

use crate::error::ConfigError;
use crate::naming;
use crate::shape::{AccessMode, Member, MemberKind, Shape, TypeRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PropertyResolver {
    /// Bindings live on fields; the property is named after the field.
    Field,
    /// Bindings live on getters and setters; the property is named after the
    /// accessor with its `get`/`set`/`is` prefix removed.
    Accessor,
}

impl PropertyResolver {
    pub(crate) fn for_shape(shape: &Shape) -> Result<Self, ConfigError> {
        match shape.access {
            AccessMode::Field => Ok(PropertyResolver::Field),
            AccessMode::Property => Ok(PropertyResolver::Accessor),
            mode => Err(ConfigError::UnsupportedAccessMode {
                type_name: shape.type_name,
                mode,
            }),
        }
    }

    /// The strategy that names a member, whatever the declaring type's mode.
    pub(crate) fn for_member(member: &Member) -> Self {
        match member.kind {
            MemberKind::Field => PropertyResolver::Field,
            MemberKind::Getter | MemberKind::Setter => PropertyResolver::Accessor,
        }
    }

    /// Members of this level that the strategy inspects, in declaration order.
    pub(crate) fn direct_members(self, shape: &Shape) -> impl Iterator<Item = &Member> {
        shape.members.iter().filter(move |member| match self {
            PropertyResolver::Field => member.kind == MemberKind::Field,
            PropertyResolver::Accessor => {
                member.kind != MemberKind::Field && naming::accessor_property(member.name).is_some()
            }
        })
    }

    pub(crate) fn property_name(self, member: &Member) -> String {
        match self {
            PropertyResolver::Field => member.name.to_owned(),
            PropertyResolver::Accessor => {
                naming::accessor_property(member.name).unwrap_or_else(|| member.name.to_owned())
            }
        }
    }

    /// The declared type: a field's type, a getter's return type or a
    /// setter's parameter type.
    pub(crate) fn property_type(self, member: &Member) -> &TypeRef {
        &member.ty
    }

    pub(crate) fn is_list_type(self, member: &Member) -> bool {
        self.property_type(member).is_sequence()
    }

    /// The element type of a list property, or the property type itself.
    pub(crate) fn component_type(self, member: &Member) -> &TypeRef {
        self.property_type(member).component()
    }
}
