use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
}

/// Declaration of a class or interface that can be registered in a [`super::TypeRegistry`].
///
/// A class extends at most one class and implements any number of interfaces. An interface
/// may only extend other interfaces.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TypeDef {
    pub(super) name: String,
    pub(super) kind: TypeKind,
    pub(super) parent: Option<String>,
    pub(super) interfaces: Vec<String>,
}

impl TypeDef {
    #[inline]
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    #[inline]
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            interfaces: vec![],
        }
    }

    /// Sets the parent class. For interfaces this is the same as [`TypeDef::implements`].
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        match self.kind {
            TypeKind::Class => self.parent = Some(parent.into()),
            TypeKind::Interface => self.interfaces.push(parent.into()),
        }
        self
    }

    #[inline]
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }
}
