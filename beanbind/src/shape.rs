//! Binding declarations.
//!
//! A [`Shape`] is the static description of one type: its simple name, its
//! parent in the inheritance chain, how its properties are accessed, and for
//! each member the XML binding it carries. Shapes are plain data built once by
//! [`Bean::shape`]; the registry turns them into binding tables.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::adapter::{Adapter, XmlAdapter};
use crate::error::ValueError;
use crate::naming::CaseRule;
use crate::value::{Property, Value};

/// A type that can be the target of unmarshalling.
pub trait Bean: Any {
    /// Describe the type's XML bindings.
    fn shape() -> Shape;
}

/// Runtime handle to a [`Bean`] type.
#[derive(Clone, Copy)]
pub struct BeanType {
    id: TypeId,
    rust_name: &'static str,
    describe: fn() -> Shape,
}

impl BeanType {
    pub fn of<T: Bean>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            rust_name: type_name::<T>(),
            describe: T::shape,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified Rust type name.
    pub fn rust_name(&self) -> &'static str {
        self.rust_name
    }

    pub(crate) fn describe(&self) -> Shape {
        (self.describe)()
    }
}

impl PartialEq for BeanType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BeanType {}

impl Hash for BeanType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for BeanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_name)
    }
}

/// The declared type of a property, as far as binding is concerned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeRef {
    /// A scalar built from element or attribute text.
    Text(&'static str),
    /// A bean with its own binding table.
    Bean(BeanType),
    /// A growable sequence.
    List(Box<TypeRef>),
    /// A fixed-size sequence.
    Array(Box<TypeRef>),
    /// Anything else. Only reachable through an adapter.
    Opaque(&'static str),
}

impl TypeRef {
    /// Whether values of this type are sequences.
    pub fn is_sequence(&self) -> bool {
        matches!(self, TypeRef::List(_) | TypeRef::Array(_))
    }

    /// The element type of a sequence, or the type itself.
    pub fn component(&self) -> &TypeRef {
        match self {
            TypeRef::List(inner) | TypeRef::Array(inner) => inner,
            other => other,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Text(name) | TypeRef::Opaque(name) => f.write_str(name),
            TypeRef::Bean(bean) => f.write_str(bean.rust_name()),
            TypeRef::List(inner) => write!(f, "Vec<{inner}>"),
            TypeRef::Array(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// How a type exposes its properties to the binder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Bindings are read from field members.
    #[default]
    Field,
    /// Bindings are read from getter and setter members.
    Property,
    /// Public fields and accessors together. Not supported.
    PublicMember,
    /// No automatic binding. Not supported.
    None,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessMode::Field => "field",
            AccessMode::Property => "property",
            AccessMode::PublicMember => "public-member",
            AccessMode::None => "none",
        })
    }
}

pub(crate) type Constructor = Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>;

/// Writes a value into one property of a live object, and takes it back out.
pub(crate) trait Slot: Send + Sync {
    fn set(&self, target: &mut dyn Any, value: Value) -> Result<(), ValueError>;

    /// Move the current value out, if the slot can be read.
    fn take(&self, target: &mut dyn Any) -> Option<Value>;
}

struct FieldSlot<T, P> {
    lens: fn(&mut T) -> &mut P,
}

impl<T: Any, P: Property> Slot for FieldSlot<T, P> {
    fn set(&self, target: &mut dyn Any, value: Value) -> Result<(), ValueError> {
        let target = downcast_target::<T>(target)?;
        *(self.lens)(target) = P::from_value(value)?;
        Ok(())
    }

    fn take(&self, target: &mut dyn Any) -> Option<Value> {
        let target = target.downcast_mut::<T>()?;
        P::take_value((self.lens)(target))
    }
}

struct SetterSlot<T, P> {
    setter: fn(&mut T, P),
}

impl<T: Any, P: Property> Slot for SetterSlot<T, P> {
    fn set(&self, target: &mut dyn Any, value: Value) -> Result<(), ValueError> {
        let target = downcast_target::<T>(target)?;
        (self.setter)(target, P::from_value(value)?);
        Ok(())
    }

    fn take(&self, _target: &mut dyn Any) -> Option<Value> {
        None
    }
}

fn downcast_target<T: Any>(target: &mut dyn Any) -> Result<&mut T, ValueError> {
    target.downcast_mut::<T>().ok_or(ValueError::Mismatch {
        expected: type_name::<T>(),
        found: "an unrelated object",
    })
}

/// Borrows the parent part of a child object.
pub(crate) trait Upcast: Send + Sync {
    fn upcast<'a>(&self, target: &'a mut dyn Any) -> Option<&'a mut dyn Any>;
}

struct ParentLens<T, P> {
    lens: fn(&mut T) -> &mut P,
}

impl<T: Any, P: Any> Upcast for ParentLens<T, P> {
    fn upcast<'a>(&self, target: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        let target = target.downcast_mut::<T>()?;
        let parent: &'a mut dyn Any = (self.lens)(target);
        Some(parent)
    }
}

#[derive(Clone)]
pub(crate) struct Parent {
    pub(crate) bean_type: BeanType,
    pub(crate) upcast: Arc<dyn Upcast>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MemberKind {
    Field,
    Getter,
    Setter,
}

impl MemberKind {
    /// Whether the member's slot can hand the current value back.
    pub(crate) fn reads(self) -> bool {
        matches!(self, MemberKind::Field | MemberKind::Getter)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ElementSpec {
    pub(crate) name: Option<&'static str>,
    pub(crate) ty: Option<TypeRef>,
}

#[derive(Clone, Debug)]
pub(crate) enum Binding {
    Attribute(Option<&'static str>),
    Elements(Vec<ElementSpec>),
    ElementRef,
    Text,
}

impl Binding {
    fn rank(&self) -> u8 {
        match self {
            Binding::Attribute(_) => 0,
            Binding::Elements(_) => 1,
            Binding::ElementRef => 2,
            Binding::Text => 3,
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AdapterDecl {
    pub(crate) instantiate: fn() -> Adapter,
}

fn instantiate_adapter<A: XmlAdapter + Default>() -> Adapter {
    Adapter::new(A::default())
}

pub(crate) struct Member {
    pub(crate) name: &'static str,
    pub(crate) kind: MemberKind,
    pub(crate) ty: TypeRef,
    pub(crate) binding: Option<Binding>,
    /// `Some(None)` wraps under the property's default name.
    pub(crate) wrapper: Option<Option<&'static str>>,
    pub(crate) adapters: Vec<AdapterDecl>,
    pub(crate) slot: Arc<dyn Slot>,
}

impl Member {
    /// Attribute beats element(s), which beat element-ref, which beats text.
    /// Repeated element declarations accumulate as candidates.
    fn bind(&mut self, binding: Binding) {
        match (&mut self.binding, binding) {
            (Some(Binding::Elements(specs)), Binding::Elements(more)) => specs.extend(more),
            (Some(current), binding) if current.rank() <= binding.rank() => {}
            (slot, binding) => *slot = Some(binding),
        }
    }
}

/// Static description of a bean type's XML bindings.
pub struct Shape {
    pub(crate) id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) rust_name: &'static str,
    pub(crate) root_name: Option<&'static str>,
    pub(crate) access: AccessMode,
    pub(crate) rename_all: Option<CaseRule>,
    pub(crate) parent: Option<Parent>,
    pub(crate) constructor: Option<Constructor>,
    pub(crate) members: Vec<Member>,
    pub(crate) misuse: Option<&'static str>,
}

impl Shape {
    /// Start describing `T`, whose simple name is `type_name`.
    pub fn builder<T: Any>(type_name: &'static str) -> ShapeBuilder<T> {
        ShapeBuilder {
            shape: Shape {
                id: TypeId::of::<T>(),
                type_name,
                rust_name: std::any::type_name::<T>(),
                root_name: None,
                access: AccessMode::default(),
                rename_all: None,
                parent: None,
                constructor: None,
                members: Vec::new(),
                misuse: None,
            },
            _marker: PhantomData,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn access_mode(&self) -> AccessMode {
        self.access
    }

    pub fn parent(&self) -> Option<BeanType> {
        self.parent.as_ref().map(|parent| parent.bean_type)
    }

    /// The element name this type answers to when registered as a root.
    pub fn root_element_name(&self) -> String {
        match self.root_name {
            Some(name) => name.to_owned(),
            None => crate::naming::root_element_name(self.type_name),
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("type_name", &self.type_name)
            .field("access", &self.access)
            .field("parent", &self.parent())
            .field("members", &self.members.len())
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Shape`].
///
/// Members are added with [`field`](Self::field), [`getter`](Self::getter)
/// and [`setter`](Self::setter). The binding methods that follow a member
/// apply to that member.
pub struct ShapeBuilder<T> {
    shape: Shape,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any> ShapeBuilder<T> {
    /// Answer to `name` instead of the default root element name.
    pub fn root_named(mut self, name: &'static str) -> Self {
        self.shape.root_name = Some(name);
        self
    }

    pub fn access(mut self, mode: AccessMode) -> Self {
        self.shape.access = mode;
        self
    }

    /// Derive default XML names of this type's own members with a casing
    /// rule, given by its serde spelling (see [`CaseRule::from_name`]).
    pub fn rename_all(mut self, rule: &'static str) -> Self {
        match CaseRule::from_name(rule) {
            Some(rule) => self.shape.rename_all = Some(rule),
            None => self.shape.misuse = Some("unknown rename_all rule"),
        }
        self
    }

    /// Declare `P` as the parent type, stored inside `T` at `lens`.
    pub fn extends<P: Bean>(mut self, lens: fn(&mut T) -> &mut P) -> Self {
        self.shape.parent = Some(Parent {
            bean_type: BeanType::of::<P>(),
            upcast: Arc::new(ParentLens { lens }),
        });
        self
    }

    pub fn constructor(mut self, constructor: fn() -> T) -> Self {
        self.shape.constructor = Some(Arc::new(move || Box::new(constructor()) as Box<dyn Any>));
        self
    }

    /// A field member.
    pub fn field<P: Property>(self, name: &'static str, lens: fn(&mut T) -> &mut P) -> Self {
        self.push(name, MemberKind::Field, P::type_ref(), Arc::new(FieldSlot { lens }))
    }

    /// A getter (`getX` / `isX`) backed by the storage it reads.
    pub fn getter<P: Property>(self, name: &'static str, lens: fn(&mut T) -> &mut P) -> Self {
        self.push(name, MemberKind::Getter, P::type_ref(), Arc::new(FieldSlot { lens }))
    }

    /// A setter (`setX`).
    pub fn setter<P: Property>(self, name: &'static str, setter: fn(&mut T, P)) -> Self {
        self.push(name, MemberKind::Setter, P::type_ref(), Arc::new(SetterSlot { setter }))
    }

    /// Bind the member to an attribute with the default name.
    pub fn attribute(self) -> Self {
        self.modify(|member| member.bind(Binding::Attribute(None)))
    }

    pub fn attribute_named(self, name: &'static str) -> Self {
        self.modify(|member| member.bind(Binding::Attribute(Some(name))))
    }

    /// Bind the member to a child element with the default name.
    pub fn element(self) -> Self {
        self.element_spec(None, None)
    }

    pub fn element_named(self, name: &'static str) -> Self {
        self.element_spec(Some(name), None)
    }

    /// Bind a child element named `name` that unmarshals as `X`.
    ///
    /// Repeat to accept several candidate elements for one property.
    pub fn element_as<X: Property>(self, name: &'static str) -> Self {
        self.element_spec(Some(name), Some(X::type_ref()))
    }

    /// Read the member's elements from inside a wrapper element with the
    /// property's default name.
    pub fn wrapped(self) -> Self {
        self.modify(|member| member.wrapper = Some(None))
    }

    pub fn wrapped_in(self, name: &'static str) -> Self {
        self.modify(|member| member.wrapper = Some(Some(name)))
    }

    /// Bind the member to whichever registered root element is compatible
    /// with its type.
    pub fn element_ref(self) -> Self {
        self.modify(|member| member.bind(Binding::ElementRef))
    }

    /// Bind the member to the element's text content.
    pub fn text(self) -> Self {
        self.modify(|member| member.bind(Binding::Text))
    }

    /// Convert the bound value through `A` before storing it.
    pub fn adapter<A: XmlAdapter + Default>(self) -> Self {
        self.modify(|member| {
            member.adapters.push(AdapterDecl {
                instantiate: instantiate_adapter::<A>,
            })
        })
    }

    pub fn build(self) -> Shape {
        self.shape
    }

    fn push(
        mut self,
        name: &'static str,
        kind: MemberKind,
        ty: TypeRef,
        slot: Arc<dyn Slot>,
    ) -> Self {
        self.shape.members.push(Member {
            name,
            kind,
            ty,
            binding: None,
            wrapper: None,
            adapters: Vec::new(),
            slot,
        });
        self
    }

    fn element_spec(self, name: Option<&'static str>, ty: Option<TypeRef>) -> Self {
        self.modify(|member| member.bind(Binding::Elements(vec![ElementSpec { name, ty }])))
    }

    fn modify(mut self, apply: impl FnOnce(&mut Member)) -> Self {
        match self.shape.members.last_mut() {
            Some(member) => apply(member),
            None => self.shape.misuse = Some("binding declared before any member"),
        }
        self
    }
}

impl<T: Any + Default> ShapeBuilder<T> {
    /// Construct instances with `T::default()`.
    pub fn default_constructor(mut self) -> Self {
        self.shape.constructor = Some(Arc::new(|| Box::new(T::default()) as Box<dyn Any>));
        self
    }
}
