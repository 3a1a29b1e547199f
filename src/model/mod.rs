//! Symbol table and type queries for one compilation unit.
//!
//! `SemanticModel` is the host-supplied counterpart of a compiler's symbol
//! table and type utilities. The engine asks it questions (is `A` a subtype
//! of `B`, what does `List<String>` look like as a `Collection`, which
//! `equals` overrides does a type inherit) and never mutates it.

mod jdk;
mod symbol;
mod types;

pub use symbol::{ClassInfo, Modifiers, Symbol, SymbolId, SymbolKind, TypeParam};
pub use types::{ClassType, Type};

use crate::tree::{ClassKind, PrimitiveKind};
use std::collections::{HashMap, HashSet, VecDeque};

pub const OBJECT: &str = "java.lang.Object";
pub const ENUM: &str = "java.lang.Enum";
pub const STRING: &str = "java.lang.String";
pub const INHERITED: &str = "java.lang.annotation.Inherited";

#[derive(Debug, Clone, Default)]
pub struct SemanticModel {
    symbols: Vec<Symbol>,
    classes: HashMap<String, SymbolId>,
}

impl SemanticModel {
    /// An empty model. Most callers want [`SemanticModel::with_jdk_stubs`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A model pre-seeded with the `java.lang` / `java.util` classes the
    /// analyses rely on.
    pub fn with_jdk_stubs() -> Self {
        let mut model = Self::new();
        jdk::seed(&mut model);
        model
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    /// Declare a class. Its own type is raw until [`Self::set_type_params`].
    pub fn add_class(
        &mut self,
        qualified_name: &str,
        class_kind: ClassKind,
        modifiers: Modifiers,
    ) -> SymbolId {
        let simple = qualified_name
            .rsplit(['.', '$'])
            .next()
            .unwrap_or(qualified_name);
        let id = SymbolId(self.symbols.len() as u32);
        let mut sym = Symbol::new(simple, SymbolKind::Class, Type::class(id));
        sym.modifiers = modifiers;
        sym.class = Some(ClassInfo {
            qualified_name: qualified_name.to_string(),
            class_kind,
            superclass: None,
            interfaces: Vec::new(),
            type_params: Vec::new(),
            members: Vec::new(),
        });
        self.symbols.push(sym);
        self.classes.insert(qualified_name.to_string(), id);
        id
    }

    pub fn set_type_params(&mut self, class: SymbolId, params: Vec<TypeParam>) {
        let args = params
            .iter()
            .enumerate()
            .map(|(index, p)| Type::TypeVar {
                owner: class,
                index,
                name: p.name.clone(),
            })
            .collect();
        let sym = self.symbol_mut(class);
        sym.ty = Type::generic(class, args);
        if let Some(info) = sym.class.as_mut() {
            info.type_params = params;
        }
    }

    pub fn set_superclass(&mut self, class: SymbolId, superclass: Type) {
        if let Some(info) = self.symbol_mut(class).class.as_mut() {
            info.superclass = Some(superclass);
        }
    }

    pub fn add_interface(&mut self, class: SymbolId, iface: Type) {
        if let Some(info) = self.symbol_mut(class).class.as_mut() {
            info.interfaces.push(iface);
        }
    }

    /// Add `member` to `class`, setting its owner.
    pub fn add_member(&mut self, class: SymbolId, mut member: Symbol) -> SymbolId {
        member.owner = Some(class);
        let id = self.add_symbol(member);
        if let Some(info) = self.symbol_mut(class).class.as_mut() {
            info.members.push(id);
        }
        id
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    // ------------------------------------------------------------------
    // Symbols
    // ------------------------------------------------------------------

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn class_info(&self, id: SymbolId) -> Option<&ClassInfo> {
        self.symbol(id).class.as_ref()
    }

    /// Look a class up by qualified name, falling back to `java.lang`.
    pub fn resolve_class(&self, name: &str) -> Option<SymbolId> {
        self.classes
            .get(name)
            .or_else(|| self.classes.get(&format!("java.lang.{name}")))
            .copied()
    }

    pub fn classes(&self) -> impl Iterator<Item = (&str, SymbolId)> + '_ {
        self.classes.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn object_type(&self) -> Type {
        self.resolve_class(OBJECT)
            .map(Type::class)
            .unwrap_or(Type::Error)
    }

    pub fn string_type(&self) -> Type {
        self.resolve_class(STRING)
            .map(Type::class)
            .unwrap_or(Type::Error)
    }

    pub fn is_object(&self, sym: SymbolId) -> bool {
        self.resolve_class(OBJECT) == Some(sym)
    }

    /// Qualified name of a class, or `Owner.name` for members.
    pub fn qualified_name(&self, id: SymbolId) -> String {
        let sym = self.symbol(id);
        if let Some(info) = &sym.class {
            return info.qualified_name.clone();
        }
        match sym.owner {
            Some(owner) => format!("{}.{}", self.qualified_name(owner), sym.name),
            None => sym.name.clone(),
        }
    }

    /// The class itself, or the nearest class owning the symbol.
    pub fn enclosing_class(&self, id: SymbolId) -> Option<SymbolId> {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if self.symbol(c).is_class() {
                return Some(c);
            }
            cur = self.symbol(c).owner;
        }
        None
    }

    /// Members of `class` (not inherited) with the given simple name.
    pub fn members_named<'a>(
        &'a self,
        class: SymbolId,
        name: &'a str,
    ) -> impl Iterator<Item = SymbolId> + 'a {
        self.class_info(class)
            .map(|info| info.members.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(move |m| self.symbol(*m).name == name)
    }

    /// Fields visible on `class`, searching superclasses and interfaces.
    pub fn find_field(&self, class: SymbolId, name: &str) -> Option<SymbolId> {
        self.closure(&Type::class(class)).iter().find_map(|t| {
            let sym = t.class_sym()?;
            self.members_named(sym, name)
                .find(|m| self.symbol(*m).kind == SymbolKind::Field)
        })
    }

    /// All methods named `name` declared anywhere in the supertype closure of
    /// `ty` (including `ty` itself) that satisfy `pred`.
    pub fn find_matching_methods(
        &self,
        ty: &Type,
        name: &str,
        pred: impl Fn(&Symbol) -> bool,
    ) -> Vec<SymbolId> {
        let mut out = Vec::new();
        for t in self.closure(&self.upper_bound(ty)) {
            let Some(sym) = t.class_sym() else { continue };
            for m in self.members_named(sym, name) {
                let s = self.symbol(m);
                if s.kind.is_method() && pred(s) && !out.contains(&m) {
                    out.push(m);
                }
            }
        }
        out
    }

    /// Whether `sym` carries `annotation`. With `inherited`, class annotations
    /// whose type is itself `@Inherited` are also looked up on superclasses.
    pub fn has_annotation(&self, sym: SymbolId, annotation: &str) -> bool {
        let Some(annot) = self.resolve_class(annotation) else {
            return false;
        };
        if self.symbol(sym).annotations.contains(&annot) {
            return true;
        }
        let inherited = self
            .resolve_class(INHERITED)
            .is_some_and(|i| self.symbol(annot).annotations.contains(&i));
        if !inherited || !self.symbol(sym).is_class() {
            return false;
        }
        let mut cur = self.superclass_sym(sym);
        let mut seen = HashSet::new();
        while let Some(c) = cur {
            if !seen.insert(c) {
                break;
            }
            if self.symbol(c).annotations.contains(&annot) {
                return true;
            }
            cur = self.superclass_sym(c);
        }
        false
    }

    fn superclass_sym(&self, class: SymbolId) -> Option<SymbolId> {
        self.class_info(class)?.superclass.as_ref()?.class_sym()
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    /// Resolve a type name such as `int`, `java.lang.String` or `String[]`.
    pub fn type_from_string(&self, name: &str) -> Option<Type> {
        let name = name.trim();
        if let Some(elem) = name.strip_suffix("[]") {
            return self.type_from_string(elem).map(Type::array_of);
        }
        if name == "void" {
            return Some(Type::Void);
        }
        if let Some(p) = PrimitiveKind::from_keyword(name) {
            return Some(Type::Primitive(p));
        }
        self.resolve_class(name).map(Type::class)
    }

    pub fn boxed_type(&self, p: PrimitiveKind) -> Option<Type> {
        self.resolve_class(p.boxed_name()).map(Type::class)
    }

    pub fn unboxed_type(&self, ty: &Type) -> Option<PrimitiveKind> {
        let sym = ty.class_sym()?;
        let qualified = &self.class_info(sym)?.qualified_name;
        [
            PrimitiveKind::Boolean,
            PrimitiveKind::Byte,
            PrimitiveKind::Short,
            PrimitiveKind::Char,
            PrimitiveKind::Int,
            PrimitiveKind::Long,
            PrimitiveKind::Float,
            PrimitiveKind::Double,
        ]
        .into_iter()
        .find(|p| p.boxed_name() == qualified)
    }

    /// Primitive, or unboxed primitive, view of a type.
    pub fn unboxed_or_self(&self, ty: &Type) -> Option<PrimitiveKind> {
        ty.primitive().or_else(|| self.unboxed_type(ty))
    }

    pub fn same_type(&self, a: &Type, b: &Type) -> bool {
        !a.contains_error() && !b.contains_error() && a == b
    }

    /// Upper bound of type variables and wildcards; other types unchanged.
    pub fn upper_bound(&self, ty: &Type) -> Type {
        match ty {
            Type::TypeVar { owner, index, .. } => self
                .type_var_bounds(*owner, *index)
                .first()
                .map(|b| self.upper_bound(b))
                .unwrap_or_else(|| self.object_type()),
            Type::Wildcard(Some(bound)) => self.upper_bound(bound),
            Type::Wildcard(None) => self.object_type(),
            other => other.clone(),
        }
    }

    fn type_var_bounds(&self, owner: SymbolId, index: usize) -> &[Type] {
        self.class_info(owner)
            .and_then(|info| info.type_params.get(index))
            .map(|p| p.bounds.as_slice())
            .unwrap_or(&[])
    }

    pub fn erasure(&self, ty: &Type) -> Type {
        match ty {
            Type::Class(c) => Type::class(c.sym),
            Type::Array(elem) => Type::array_of(self.erasure(elem)),
            Type::TypeVar { .. } | Type::Wildcard(_) => self.erasure(&self.upper_bound(ty)),
            other => other.clone(),
        }
    }

    /// Replace the type variables of `owner` with `args`. A raw reference
    /// (no args) erases them.
    pub fn substitute(&self, ty: &Type, owner: SymbolId, args: &[Type]) -> Type {
        match ty {
            Type::TypeVar {
                owner: o, index, ..
            } if *o == owner => match args.get(*index) {
                Some(arg) => arg.clone(),
                None => self.erasure(ty),
            },
            Type::Class(c) => Type::generic(
                c.sym,
                c.args
                    .iter()
                    .map(|a| self.substitute(a, owner, args))
                    .collect(),
            ),
            Type::Array(elem) => Type::array_of(self.substitute(elem, owner, args)),
            Type::Wildcard(Some(b)) => {
                Type::Wildcard(Some(Box::new(self.substitute(b, owner, args))))
            }
            other => other.clone(),
        }
    }

    /// Direct supertypes of a class type, with type arguments substituted.
    pub fn direct_supertypes(&self, ty: &ClassType) -> Vec<Type> {
        let Some(info) = self.class_info(ty.sym) else {
            return Vec::new();
        };
        let raw = ty.args.is_empty() && !info.type_params.is_empty();
        let view = |sup: &Type| {
            if raw {
                self.erasure(sup)
            } else {
                self.substitute(sup, ty.sym, &ty.args)
            }
        };
        let mut out = Vec::new();
        match &info.superclass {
            Some(sup) => out.push(view(sup)),
            None if !self.is_object(ty.sym) => {
                if let Some(obj) = self.resolve_class(OBJECT) {
                    out.push(Type::class(obj));
                }
            }
            None => {}
        }
        for iface in &info.interfaces {
            out.push(view(iface));
        }
        out
    }

    /// `ty` and all of its supertypes, breadth first, one entry per class.
    pub fn closure(&self, ty: &Type) -> Vec<Type> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        match self.upper_bound(ty) {
            Type::Class(c) => queue.push_back(c),
            Type::Array(_) => return vec![ty.clone(), self.object_type()],
            _ => return out,
        }
        while let Some(c) = queue.pop_front() {
            if !seen.insert(c.sym) {
                continue;
            }
            for sup in self.direct_supertypes(&c) {
                if let Type::Class(sc) = sup {
                    queue.push_back(sc);
                }
            }
            out.push(Type::Class(c));
        }
        out
    }

    /// View `ty` as an instance of class `sym`, if it is a subtype of it.
    pub fn as_super(&self, ty: &Type, sym: SymbolId) -> Option<Type> {
        self.closure(ty)
            .into_iter()
            .find(|t| t.class_sym() == Some(sym))
    }

    /// Nominal subclassing between class symbols.
    pub fn is_subclass(&self, sub: SymbolId, sup: SymbolId) -> bool {
        sub == sup
            || self
                .closure(&Type::class(sub))
                .iter()
                .any(|t| t.class_sym() == Some(sup))
    }

    pub fn is_subtype(&self, a: &Type, b: &Type) -> bool {
        if a.contains_error() || b.contains_error() {
            return false;
        }
        match (a, b) {
            (Type::Primitive(x), Type::Primitive(y)) => is_widening(*x, *y),
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
            (Type::Null, _) => b.is_reference(),
            (Type::Array(x), Type::Array(y)) => match (x.as_ref(), y.as_ref()) {
                (Type::Primitive(p), Type::Primitive(q)) => p == q,
                (x, y) => self.is_subtype(x, y),
            },
            (Type::Array(_), Type::Class(c)) => {
                self.is_object(c.sym)
                    || matches!(
                        self.class_info(c.sym).map(|i| i.qualified_name.as_str()),
                        Some("java.lang.Cloneable" | "java.io.Serializable")
                    )
            }
            (_, Type::Class(target)) => {
                let Some(Type::Class(view)) = self.as_super(a, target.sym) else {
                    return false;
                };
                if target.args.is_empty() || view.args.is_empty() {
                    return true;
                }
                view.args
                    .iter()
                    .zip(&target.args)
                    .all(|(va, ta)| self.contains_type_arg(ta, va))
            }
            (Type::TypeVar { .. }, Type::TypeVar { .. }) => a == b,
            _ => false,
        }
    }

    fn contains_type_arg(&self, formal: &Type, actual: &Type) -> bool {
        match formal {
            Type::Wildcard(None) => true,
            Type::Wildcard(Some(bound)) => self.is_subtype(&self.upper_bound(actual), bound),
            _ => self.same_type(formal, actual),
        }
    }

    /// Whether a cast from `from` to `to` is legal. Unresolved types are
    /// treated as castable so callers stay silent.
    pub fn is_castable(&self, from: &Type, to: &Type) -> bool {
        if from.contains_error() || to.contains_error() {
            return true;
        }
        match (from, to) {
            (Type::Primitive(a), Type::Primitive(b)) => {
                a == b || (a.is_numeric() && b.is_numeric())
            }
            (Type::Primitive(p), other) => self
                .boxed_type(*p)
                .is_some_and(|boxed| self.is_subtype(&boxed, other)),
            (other, Type::Primitive(p)) => match self.unboxed_type(other) {
                Some(q) => q == *p || is_widening(q, *p),
                None => self
                    .boxed_type(*p)
                    .is_some_and(|boxed| self.is_subtype(&boxed, other)),
            },
            (Type::Null, _) => to.is_reference(),
            (Type::TypeVar { .. } | Type::Wildcard(_), _)
            | (_, Type::TypeVar { .. } | Type::Wildcard(_)) => true,
            (Type::Array(x), Type::Array(y)) => match (x.as_ref(), y.as_ref()) {
                (Type::Primitive(p), Type::Primitive(q)) => p == q,
                (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
                (x, y) => self.is_castable(x, y),
            },
            (Type::Array(_), Type::Class(_)) => self.is_subtype(from, to),
            (Type::Class(_), Type::Array(_)) => self.is_subtype(to, from),
            (Type::Class(a), Type::Class(b)) => {
                if self.is_subclass(a.sym, b.sym) || self.is_subclass(b.sym, a.sym) {
                    return true;
                }
                let (sa, sb) = (self.symbol(a.sym), self.symbol(b.sym));
                match (sa.is_interface(), sb.is_interface()) {
                    (true, true) => true,
                    (true, false) => !sb.is_final(),
                    (false, true) => !sa.is_final(),
                    (false, false) => false,
                }
            }
            _ => false,
        }
    }

    /// Minimal common supertypes of two class types, each seen from `a`.
    /// Empty for primitives and unresolved types.
    pub fn common_supertypes(&self, a: &Type, b: &Type) -> Vec<Type> {
        if a.contains_error() || b.contains_error() {
            return Vec::new();
        }
        let closure_b: HashSet<SymbolId> = self
            .closure(b)
            .iter()
            .filter_map(Type::class_sym)
            .collect();
        let shared: Vec<Type> = self
            .closure(a)
            .into_iter()
            .filter(|t| t.class_sym().is_some_and(|s| closure_b.contains(&s)))
            .collect();
        shared
            .iter()
            .filter(|t| {
                let Some(s) = t.class_sym() else { return false };
                !shared.iter().any(|o| {
                    o.class_sym()
                        .is_some_and(|os| os != s && self.is_subclass(os, s))
                })
            })
            .cloned()
            .collect()
    }

    /// Human-readable type, using simple class names.
    pub fn display_type(&self, ty: &Type) -> String {
        match ty {
            Type::Primitive(p) => p.keyword().to_string(),
            Type::Class(c) => {
                let name = &self.symbol(c.sym).name;
                if c.args.is_empty() {
                    name.clone()
                } else {
                    let args: Vec<_> = c.args.iter().map(|a| self.display_type(a)).collect();
                    format!("{name}<{}>", args.join(", "))
                }
            }
            Type::Array(elem) => format!("{}[]", self.display_type(elem)),
            Type::TypeVar { name, .. } => name.clone(),
            Type::Wildcard(None) => "?".to_string(),
            Type::Wildcard(Some(b)) => format!("? extends {}", self.display_type(b)),
            Type::Null => "null".to_string(),
            Type::Void => "void".to_string(),
            Type::Error => "<error>".to_string(),
        }
    }

    /// Qualified rendering, used when simple names collide.
    pub fn display_type_qualified(&self, ty: &Type) -> String {
        match ty {
            Type::Class(c) => {
                let name = self.qualified_name(c.sym);
                if c.args.is_empty() {
                    name
                } else {
                    let args: Vec<_> = c
                        .args
                        .iter()
                        .map(|a| self.display_type_qualified(a))
                        .collect();
                    format!("{name}<{}>", args.join(","))
                }
            }
            Type::Array(elem) => format!("{}[]", self.display_type_qualified(elem)),
            other => self.display_type(other),
        }
    }
}

/// Identity or widening primitive conversion from `from` to `to`.
pub fn is_widening(from: PrimitiveKind, to: PrimitiveKind) -> bool {
    use PrimitiveKind::*;
    if from == to {
        return true;
    }
    match (from, to) {
        (Boolean, _) | (_, Boolean) => false,
        (_, Char) => false,
        (Char, Short | Byte) => false,
        (Short, Byte) => false,
        _ => from.widening_rank() < to.widening_rank(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> SemanticModel {
        SemanticModel::with_jdk_stubs()
    }

    fn ty(m: &SemanticModel, name: &str) -> Type {
        m.type_from_string(name).unwrap()
    }

    #[test]
    fn primitive_widening_follows_java_rules() {
        use PrimitiveKind::*;
        assert!(is_widening(Byte, Int));
        assert!(is_widening(Char, Long));
        assert!(!is_widening(Byte, Char));
        assert!(!is_widening(Char, Short));
        assert!(!is_widening(Long, Int));
        assert!(is_widening(Long, Float));
    }

    #[test]
    fn as_super_substitutes_type_arguments() {
        let m = model();
        let list = m.resolve_class("java.util.List").unwrap();
        let collection = m.resolve_class("java.util.Collection").unwrap();
        let list_of_string = Type::generic(list, vec![m.string_type()]);
        let view = m.as_super(&list_of_string, collection).unwrap();
        assert_eq!(view, Type::generic(collection, vec![m.string_type()]));
    }

    #[test]
    fn final_unrelated_classes_are_not_castable() {
        let m = model();
        assert!(!m.is_castable(&ty(&m, "String"), &ty(&m, "Integer")));
        assert!(m.is_castable(&ty(&m, "Object"), &ty(&m, "Integer")));
        assert!(m.is_castable(&ty(&m, "java.util.List"), &ty(&m, "java.util.Set")));
        assert!(!m.is_castable(&ty(&m, "String"), &ty(&m, "java.util.List")));
    }

    #[test]
    fn boxing_participates_in_casts() {
        let m = model();
        assert!(m.is_castable(&ty(&m, "int"), &ty(&m, "Integer")));
        assert!(m.is_castable(&ty(&m, "int"), &ty(&m, "Number")));
        assert!(!m.is_castable(&ty(&m, "int"), &ty(&m, "Long")));
        assert!(m.is_castable(&ty(&m, "Object"), &ty(&m, "int")));
    }

    #[test]
    fn common_supertypes_are_minimal() {
        let m = model();
        let common =
            m.common_supertypes(&ty(&m, "java.util.ArrayList"), &ty(&m, "java.util.HashSet"));
        let names: Vec<_> = common.iter().map(|t| m.display_type(t)).collect();
        assert_eq!(names, vec!["Collection"]);
    }

    #[test]
    fn errors_are_never_the_same_type() {
        let m = model();
        assert!(!m.same_type(&Type::Error, &Type::Error));
        assert!(m.same_type(&m.string_type(), &m.string_type()));
    }
}
