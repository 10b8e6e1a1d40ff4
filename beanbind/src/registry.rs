//! Type registration and table resolution.
//!
//! Building a context happens in two phases. Registering root types, and
//! every type their bindings mention, only hands out [`TableId`]s and queues
//! the table as pending; no table is filled in yet. [`TypeRegistry::finalize`]
//! then fills pending tables in rounds until none are left. Filling a table
//! may queue more, but a type already known is never queued twice, so
//! self-referential and mutually recursive types resolve to the same table.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::adapter::Adapter;
use crate::class::BeanClass;
use crate::error::ConfigError;
use crate::shape::{Bean, BeanType, Shape, TypeRef};
use crate::unmarshaller::{BeanTable, TableBuilder, TableId, Unmarshaller};
use crate::{debug, trace};

enum TableState {
    Pending,
    Finalized(BeanTable),
}

struct TableSlot {
    bean_type: BeanType,
    state: TableState,
}

struct GlobalRoot {
    name: String,
    bean_type: BeanType,
    table: TableId,
}

#[derive(Default)]
pub(crate) struct TypeRegistry {
    shapes: HashMap<TypeId, Arc<Shape>>,
    slots: Vec<TableSlot>,
    index: HashMap<TypeId, TableId>,
    pending: Vec<TableId>,
    roots: Vec<GlobalRoot>,
    adapters: HashMap<&'static str, Adapter>,
}

impl TypeRegistry {
    /// The shape of `bean_type`, described once and cached.
    pub(crate) fn shape(&mut self, bean_type: BeanType) -> Result<Arc<Shape>, ConfigError> {
        if let Some(shape) = self.shapes.get(&bean_type.id()) {
            return Ok(Arc::clone(shape));
        }
        let shape = bean_type.describe();
        if let Some(reason) = shape.misuse {
            return Err(ConfigError::InvalidDeclaration {
                type_name: shape.type_name,
                reason,
            });
        }
        let shape = Arc::new(shape);
        self.shapes.insert(bean_type.id(), Arc::clone(&shape));
        Ok(shape)
    }

    /// Shapes from `bean_type` up through its ancestors.
    pub(crate) fn hierarchy(&mut self, bean_type: BeanType) -> Result<Vec<Arc<Shape>>, ConfigError> {
        let mut levels = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(bean_type);
        while let Some(current) = next {
            let shape = self.shape(current)?;
            if !seen.insert(current.id()) {
                return Err(ConfigError::InvalidDeclaration {
                    type_name: shape.type_name,
                    reason: "type extends itself",
                });
            }
            next = shape.parent();
            levels.push(shape);
        }
        Ok(levels)
    }

    fn table_id(&mut self, bean_type: BeanType) -> TableId {
        if let Some(id) = self.index.get(&bean_type.id()) {
            return *id;
        }
        let id = TableId(self.slots.len());
        trace!(bean = bean_type.rust_name(), ?id, "queueing binding table");
        self.slots.push(TableSlot {
            bean_type,
            state: TableState::Pending,
        });
        self.index.insert(bean_type.id(), id);
        self.pending.push(id);
        id
    }

    /// The unmarshaller for elements of type `ty`, or `None` when no
    /// unmarshaller can produce it.
    pub(crate) fn get_or_create(&mut self, ty: &TypeRef) -> Option<Unmarshaller> {
        match ty {
            TypeRef::Text(_) => Some(Unmarshaller::Text),
            TypeRef::Bean(bean_type) => Some(Unmarshaller::Bean(self.table_id(*bean_type))),
            TypeRef::List(_) | TypeRef::Array(_) | TypeRef::Opaque(_) => None,
        }
    }

    pub(crate) fn register_root(&mut self, bean_type: BeanType) -> Result<(), ConfigError> {
        let shape = self.shape(bean_type)?;
        if shape.constructor.is_none() {
            return Err(ConfigError::MissingConstructor {
                type_name: shape.type_name,
            });
        }
        let name = shape.root_element_name();
        if let Some(existing) = self.roots.iter().find(|root| root.name == name) {
            if existing.bean_type == bean_type {
                return Ok(());
            }
            return Err(ConfigError::DuplicateRootName {
                name,
                first: existing.bean_type.rust_name(),
                second: bean_type.rust_name(),
            });
        }
        debug!(bean = bean_type.rust_name(), root = %name, "registering root");
        let table = self.table_id(bean_type);
        self.roots.push(GlobalRoot {
            name,
            bean_type,
            table,
        });
        Ok(())
    }

    /// Names of the registered roots whose type is `bound` or extends it,
    /// in registration order.
    pub(crate) fn roots_compatible_with(
        &mut self,
        bound: BeanType,
    ) -> Result<Vec<String>, ConfigError> {
        let candidates: Vec<(String, BeanType)> = self
            .roots
            .iter()
            .map(|root| (root.name.clone(), root.bean_type))
            .collect();
        let mut names = Vec::new();
        for (name, bean_type) in candidates {
            if self.is_assignable(bound, bean_type)? {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn is_assignable(&mut self, bound: BeanType, candidate: BeanType) -> Result<bool, ConfigError> {
        Ok(self
            .hierarchy(candidate)?
            .iter()
            .any(|shape| shape.id == bound.id()))
    }

    /// Share one instance per adapter type.
    pub(crate) fn register_adapter(&mut self, adapter: Adapter) -> Adapter {
        self.adapters
            .entry(adapter.name())
            .or_insert(adapter)
            .clone()
    }

    /// Fill every pending table, including the ones discovered on the way.
    pub(crate) fn finalize(&mut self) -> Result<(), ConfigError> {
        while !self.pending.is_empty() {
            let batch = std::mem::take(&mut self.pending);
            debug!(tables = batch.len(), "finalizing binding tables");
            for id in batch {
                let bean_type = self.slots[id.0].bean_type;
                let table = TableBuilder::build(self, bean_type)?;
                self.slots[id.0].state = TableState::Finalized(table);
            }
        }
        Ok(())
    }

    fn into_context(self) -> Result<BindingContext, ConfigError> {
        let tables = self
            .slots
            .into_iter()
            .map(|slot| match slot.state {
                TableState::Finalized(table) => Ok(table),
                TableState::Pending => Err(ConfigError::InvalidDeclaration {
                    type_name: slot.bean_type.rust_name(),
                    reason: "binding table was never finalized",
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let classes = tables
            .iter()
            .enumerate()
            .map(|(id, table)| (table.class.rust_name(), TableId(id)))
            .collect();
        let globals = self
            .roots
            .iter()
            .map(|root| (root.name.clone(), Unmarshaller::Bean(root.table)))
            .collect();
        let roots = self
            .roots
            .into_iter()
            .map(|root| (root.name, root.table))
            .collect();

        Ok(BindingContext {
            tables,
            globals,
            roots,
            index: self.index,
            classes,
            adapters: self.adapters,
        })
    }
}

/// Compiled bindings for a set of root types.
///
/// A context is immutable once built and can be shared between threads; each
/// unmarshal call keeps its state on its own stack.
#[derive(Debug)]
pub struct BindingContext {
    pub(crate) tables: Vec<BeanTable>,
    /// Root element name to unmarshaller.
    pub(crate) globals: HashMap<String, Unmarshaller>,
    roots: Vec<(String, TableId)>,
    index: HashMap<TypeId, TableId>,
    classes: HashMap<&'static str, TableId>,
    adapters: HashMap<&'static str, Adapter>,
}

impl BindingContext {
    pub fn builder() -> BindingContextBuilder {
        BindingContextBuilder::default()
    }

    /// Root element names, in registration order.
    pub fn root_names(&self) -> impl Iterator<Item = &str> {
        self.roots.iter().map(|(name, _)| name.as_str())
    }

    /// The table compiled for `T`, if `T` is reachable from a root.
    pub fn table_of<T: Bean>(&self) -> Option<&BeanTable> {
        let id = self.index.get(&TypeId::of::<T>())?;
        self.tables.get(id.0)
    }

    /// The table of the root registered under `name`.
    pub fn root_table(&self, name: &str) -> Option<&BeanTable> {
        let (_, id) = self.roots.iter().find(|(root, _)| root == name)?;
        self.tables.get(id.0)
    }

    /// Look up a class by its fully qualified Rust type name.
    pub fn class_named(&self, rust_name: &str) -> Option<&Arc<BeanClass>> {
        let id = self.classes.get(rust_name)?;
        self.tables.get(id.0).map(|table| &table.class)
    }

    /// Look up an adapter by its Rust type name.
    pub fn adapter_named(&self, name: &str) -> Option<&Adapter> {
        self.adapters.get(name)
    }
}

/// Collects root types and compiles them into a [`BindingContext`].
#[derive(Default)]
pub struct BindingContextBuilder {
    roots: Vec<BeanType>,
}

impl BindingContextBuilder {
    pub fn root<T: Bean>(self) -> Self {
        self.root_type(BeanType::of::<T>())
    }

    pub fn root_type(mut self, bean_type: BeanType) -> Self {
        self.roots.push(bean_type);
        self
    }

    pub fn build(self) -> Result<BindingContext, ConfigError> {
        let mut registry = TypeRegistry::default();
        for bean_type in self.roots {
            registry.register_root(bean_type)?;
        }
        registry.finalize()?;
        let context = registry.into_context()?;
        debug!(
            roots = context.roots.len(),
            tables = context.tables.len(),
            "binding context ready"
        );
        Ok(context)
    }
}
