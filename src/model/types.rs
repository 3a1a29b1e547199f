use super::SymbolId;
use crate::tree::PrimitiveKind;

/// A resolved type. Types are plain values; substitution builds new ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveKind),
    Class(ClassType),
    Array(Box<Type>),
    /// Type variable declared by `owner` at position `index`.
    TypeVar {
        owner: SymbolId,
        index: usize,
        name: String,
    },
    /// `?`, `? extends T`.
    Wildcard(Option<Box<Type>>),
    Null,
    Void,
    /// Unresolved. Never the same as any other type.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub sym: SymbolId,
    pub args: Vec<Type>,
}

impl Type {
    pub fn class(sym: SymbolId) -> Type {
        Type::Class(ClassType {
            sym,
            args: Vec::new(),
        })
    }

    pub fn generic(sym: SymbolId, args: Vec<Type>) -> Type {
        Type::Class(ClassType { sym, args })
    }

    pub fn array_of(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Class(_) | Type::Array(_) | Type::TypeVar { .. } | Type::Null | Type::Wildcard(_)
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Symbol of a class type.
    pub fn class_sym(&self) -> Option<SymbolId> {
        match self {
            Type::Class(c) => Some(c.sym),
            _ => None,
        }
    }

    pub fn type_args(&self) -> &[Type] {
        match self {
            Type::Class(c) => &c.args,
            _ => &[],
        }
    }

    /// Whether this type mentions an unresolved component anywhere.
    pub fn contains_error(&self) -> bool {
        match self {
            Type::Error => true,
            Type::Class(c) => c.args.iter().any(Type::contains_error),
            Type::Array(e) => e.contains_error(),
            Type::Wildcard(b) => b.as_deref().is_some_and(Type::contains_error),
            _ => false,
        }
    }
}
