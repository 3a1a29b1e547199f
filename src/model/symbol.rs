use super::Type;
use crate::tree::{ClassKind, ConstValue};
use std::fmt;

/// Identity of a declared entity. Two references denote the same entity iff
/// their ids are equal; names are never compared for identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Package,
    Class,
    Method,
    Constructor,
    Field,
    Parameter,
    Local,
}

impl SymbolKind {
    pub fn is_variable(&self) -> bool {
        matches!(
            self,
            SymbolKind::Field | SymbolKind::Parameter | SymbolKind::Local
        )
    }

    pub fn is_method(&self) -> bool {
        matches!(self, SymbolKind::Method | SymbolKind::Constructor)
    }
}

/// Declaration modifiers as a small bit set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u16);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const PUBLIC: Modifiers = Modifiers(1 << 0);
    pub const PROTECTED: Modifiers = Modifiers(1 << 1);
    pub const PRIVATE: Modifiers = Modifiers(1 << 2);
    pub const STATIC: Modifiers = Modifiers(1 << 3);
    pub const FINAL: Modifiers = Modifiers(1 << 4);
    pub const ABSTRACT: Modifiers = Modifiers(1 << 5);
    pub const DEFAULT: Modifiers = Modifiers(1 << 6);
    pub const SYNCHRONIZED: Modifiers = Modifiers(1 << 7);
    pub const NATIVE: Modifiers = Modifiers(1 << 8);
    pub const TRANSIENT: Modifiers = Modifiers(1 << 9);
    pub const VOLATILE: Modifiers = Modifiers(1 << 10);
    /// Compiler-generated member.
    pub const SYNTHETIC: Modifiers = Modifiers(1 << 11);

    const NAMES: &'static [(&'static str, Modifiers)] = &[
        ("public", Modifiers::PUBLIC),
        ("protected", Modifiers::PROTECTED),
        ("private", Modifiers::PRIVATE),
        ("static", Modifiers::STATIC),
        ("final", Modifiers::FINAL),
        ("abstract", Modifiers::ABSTRACT),
        ("default", Modifiers::DEFAULT),
        ("synchronized", Modifiers::SYNCHRONIZED),
        ("native", Modifiers::NATIVE),
        ("transient", Modifiers::TRANSIENT),
        ("volatile", Modifiers::VOLATILE),
    ];

    pub fn from_keyword(s: &str) -> Option<Modifiers> {
        Self::NAMES.iter().find(|(n, _)| *n == s).map(|(_, m)| *m)
    }

    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    pub fn contains(&self, other: Modifiers) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Modifiers) {
        self.0 |= other.0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        self.union(rhs)
    }
}

impl fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = Self::NAMES
            .iter()
            .filter(|(_, m)| self.contains(*m))
            .map(|(n, _)| *n)
            .collect();
        write!(f, "Modifiers({})", names.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub bounds: Vec<Type>,
}

/// Extra data carried by class symbols.
#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub qualified_name: String,
    pub class_kind: ClassKind,
    pub superclass: Option<Type>,
    pub interfaces: Vec<Type>,
    pub type_params: Vec<TypeParam>,
    pub members: Vec<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub owner: Option<SymbolId>,
    pub modifiers: Modifiers,
    /// Variable type, method return type, or the class's own type.
    pub ty: Type,
    /// Parameter types of a method or constructor.
    pub params: Vec<Type>,
    /// Annotation type symbols applied to the declaration.
    pub annotations: Vec<SymbolId>,
    /// Compile-time constant value of a `final` variable.
    pub constant: Option<ConstValue>,
    pub effectively_final: bool,
    pub class: Option<ClassInfo>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, ty: Type) -> Self {
        Self {
            name: name.into(),
            kind,
            owner: None,
            modifiers: Modifiers::NONE,
            ty,
            params: Vec::new(),
            annotations: Vec::new(),
            constant: None,
            effectively_final: false,
            class: None,
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: Vec<Type>) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_constant(mut self, value: ConstValue) -> Self {
        self.constant = Some(value);
        self
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.contains(Modifiers::FINAL)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(Modifiers::ABSTRACT)
    }

    pub fn is_private(&self) -> bool {
        self.modifiers.contains(Modifiers::PRIVATE)
    }

    pub fn is_class(&self) -> bool {
        self.kind == SymbolKind::Class
    }

    pub fn is_interface(&self) -> bool {
        self.class
            .as_ref()
            .is_some_and(|c| matches!(c.class_kind, ClassKind::Interface | ClassKind::Annotation))
    }

    pub fn is_enum(&self) -> bool {
        self.class
            .as_ref()
            .is_some_and(|c| c.class_kind == ClassKind::Enum)
    }

    /// `final`, or never reassigned after initialization.
    pub fn is_final_or_effectively_final(&self) -> bool {
        self.is_final() || self.effectively_final
    }
}
