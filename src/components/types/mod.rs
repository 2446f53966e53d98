mod def;

pub use def::{TypeDef, TypeKind};

use crate::value::Value;
use crate::{Error, Result};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Name of the built-in interface every nested [`crate::Collection`] value is an instance of.
pub const COLLECTION_CLASS: &str = "Collection";

/// Handle of a type within the registry it was resolved in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeHandle(usize);

#[derive(Debug)]
struct TypeEntry {
    name: String,
    kind: TypeKind,
    parent: Option<TypeHandle>,
    interfaces: Vec<TypeHandle>,
}

/// The set of known classes and interfaces along with their inheritance relations.
///
/// A registry is immutable once built. Types can only refer to types registered before them,
/// so the inheritance graph never contains cycles.
#[derive(Debug)]
pub struct TypeRegistry {
    types: Vec<TypeEntry>,
    by_name: HashMap<String, TypeHandle>,
}

impl TypeRegistry {
    #[inline]
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::new()
    }

    /// A registry only knowing the built-in types. Used by collections created without one.
    pub fn shared() -> Arc<TypeRegistry> {
        static BUILTIN: OnceLock<Arc<TypeRegistry>> = OnceLock::new();
        BUILTIN.get_or_init(|| TypeRegistryBuilder::new().build()).clone()
    }

    #[inline]
    pub fn resolve(&self, name: &str) -> Option<TypeHandle> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    #[inline]
    pub fn name(&self, handle: TypeHandle) -> &str {
        &self.types[handle.0].name
    }

    #[inline]
    pub fn kind(&self, handle: TypeHandle) -> TypeKind {
        self.types[handle.0].kind
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns `true` if `ty` is `of` or inherits from it, directly or through any ancestor.
    pub fn is_subtype(&self, ty: TypeHandle, of: TypeHandle) -> bool {
        let mut stack = vec![ty];

        while let Some(current) = stack.pop() {
            if current == of {
                return true;
            }

            let entry = &self.types[current.0];
            stack.extend(entry.parent);
            stack.extend(entry.interfaces.iter().copied());
        }

        false
    }

    /// Returns `true` if `value` is an object whose class is `of` or a subtype of it. Objects of
    /// unknown classes are never instances.
    pub fn is_instance(&self, value: &Value, of: TypeHandle) -> bool {
        value
            .class()
            .and_then(|class| self.resolve(class))
            .is_some_and(|ty| self.is_subtype(ty, of))
    }
}

/// Builds a [`TypeRegistry`]. Parents and interfaces have to be registered before the types
/// referring to them.
pub struct TypeRegistryBuilder {
    registry: TypeRegistry,
}

impl TypeRegistryBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            registry: TypeRegistry {
                types: vec![],
                by_name: HashMap::new(),
            },
        };
        builder.push(COLLECTION_CLASS.to_string(), TypeKind::Interface, None, vec![]);
        builder
    }

    /// Registers a new type.
    pub fn register(&mut self, def: TypeDef) -> Result<&mut Self> {
        if self.registry.contains(&def.name) {
            return Err(Error::configuration(def.name));
        }

        let parent = match def.parent {
            Some(parent) => Some(self.lookup(&parent, TypeKind::Class)?),
            None => None,
        };

        let interfaces = def
            .interfaces
            .iter()
            .map(|i| self.lookup(i, TypeKind::Interface))
            .collect::<Result<Vec<_>>>()?;

        self.push(def.name, def.kind, parent, interfaces);
        Ok(self)
    }

    /// Owned variant of [`TypeRegistryBuilder::register`] for chaining.
    #[inline]
    pub fn with(mut self, def: TypeDef) -> Result<Self> {
        self.register(def)?;
        Ok(self)
    }

    #[inline]
    pub fn build(self) -> Arc<TypeRegistry> {
        Arc::new(self.registry)
    }

    /// Resolves a type that is referenced by another one, requiring it to be of the given kind.
    fn lookup(&self, name: &str, kind: TypeKind) -> Result<TypeHandle> {
        self.registry
            .resolve(name)
            .filter(|h| self.registry.kind(*h) == kind)
            .ok_or_else(|| Error::configuration(name))
    }

    fn push(
        &mut self,
        name: String,
        kind: TypeKind,
        parent: Option<TypeHandle>,
        interfaces: Vec<TypeHandle>,
    ) {
        let handle = TypeHandle(self.registry.types.len());
        debug!("Registering {kind:?} {name}");
        self.registry.by_name.insert(name.clone(), handle);
        self.registry.types.push(TypeEntry {
            name,
            kind,
            parent,
            interfaces,
        });
    }
}

impl Default for TypeRegistryBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// A type constraint resolved against a registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementType {
    handle: TypeHandle,
    name: String,
}

impl ElementType {
    /// Resolves `name` in `registry`, failing with [`Error::Configuration`] if it is unknown.
    pub fn resolve(registry: &TypeRegistry, name: &str) -> Result<Self> {
        let handle = registry
            .resolve(name)
            .ok_or_else(|| Error::configuration(name))?;

        Ok(Self {
            handle,
            name: name.to_string(),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn handle(&self) -> TypeHandle {
        self.handle
    }
}
