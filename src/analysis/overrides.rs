//! Method signatures and override lookup.

use crate::model::{SemanticModel, SymbolId, SymbolKind, Type};
use std::fmt;

/// Name plus erased parameter types, as seen from the class declaring the
/// method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<Type>,
}

impl MethodSignature {
    pub fn of(method: SymbolId, model: &SemanticModel) -> Self {
        let sym = model.symbol(method);
        Self {
            name: sym.name.clone(),
            params: sym.params.iter().map(|p| model.erasure(p)).collect(),
        }
    }

    pub fn display(&self, model: &SemanticModel) -> String {
        let params: Vec<String> = self.params.iter().map(|p| model.display_type(p)).collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

/// How a method relates to the methods it overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideKind {
    /// Overrides a concrete or abstract method of a superclass.
    Overrides(SymbolId),
    /// Implements an interface method.
    Implements(SymbolId),
}

impl OverrideKind {
    pub fn owner(&self) -> SymbolId {
        match self {
            OverrideKind::Overrides(c) | OverrideKind::Implements(c) => *c,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            OverrideKind::Overrides(_) => "overrides",
            OverrideKind::Implements(_) => "implements",
        }
    }
}

impl fmt::Display for OverrideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Methods in the strict supertype closure of the declaring class that
/// `method` overrides, nearest first. Static, private and constructor
/// symbols neither override nor are overridden.
pub fn overridden_methods(method: SymbolId, model: &SemanticModel) -> Vec<SymbolId> {
    let sym = model.symbol(method);
    if sym.kind != SymbolKind::Method || sym.is_static() || sym.is_private() {
        return Vec::new();
    }
    let Some(owner) = sym.owner else {
        return Vec::new();
    };
    let signature = MethodSignature::of(method, model);

    let mut out = Vec::new();
    let own_type = model.symbol(owner).ty.clone();
    for sup in model.closure(&own_type) {
        let Type::Class(class) = &sup else { continue };
        if class.sym == owner {
            continue;
        }
        for candidate in model.members_named(class.sym, &signature.name) {
            let c = model.symbol(candidate);
            if c.kind != SymbolKind::Method || c.is_static() || c.is_private() {
                continue;
            }
            // Parameter types as seen through the subclass: `compareTo(T)`
            // on `Comparable<Foo>` takes a `Foo`.
            let params: Vec<Type> = c
                .params
                .iter()
                .map(|p| model.erasure(&model.substitute(p, class.sym, &class.args)))
                .collect();
            if params == signature.params {
                out.push(candidate);
            }
        }
    }
    out
}

pub fn is_override(method: SymbolId, model: &SemanticModel) -> bool {
    !overridden_methods(method, model).is_empty()
}

/// Classify the nearest overridden method. A superclass method wins over an
/// interface method at the same distance.
pub fn classify(method: SymbolId, model: &SemanticModel) -> Option<OverrideKind> {
    let supers = overridden_methods(method, model);
    let owner_of = |m: SymbolId| model.symbol(m).owner;
    supers
        .iter()
        .filter_map(|m| owner_of(*m))
        .find(|o| !model.symbol(*o).is_interface())
        .map(OverrideKind::Overrides)
        .or_else(|| {
            supers
                .first()
                .and_then(|m| owner_of(*m))
                .map(OverrideKind::Implements)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Modifiers, Symbol};
    use crate::tree::{ClassKind, PrimitiveKind};

    fn method(
        model: &mut SemanticModel,
        owner: SymbolId,
        name: &str,
        params: Vec<Type>,
    ) -> SymbolId {
        let sym = Symbol::new(name, SymbolKind::Method, Type::Primitive(PrimitiveKind::Boolean))
            .with_modifiers(Modifiers::PUBLIC)
            .with_params(params);
        model.add_member(owner, sym)
    }

    #[test]
    fn equals_overrides_object_equals() {
        let mut model = SemanticModel::with_jdk_stubs();
        let object = model.object_type();
        let foo = model.add_class("com.example.Foo", ClassKind::Class, Modifiers::PUBLIC);
        let equals = method(&mut model, foo, "equals", vec![object.clone()]);
        let overload = method(&mut model, foo, "equals", vec![Type::class(foo)]);

        assert_eq!(classify(equals, &model).map(|k| k.verb()), Some("overrides"));
        assert!(!is_override(overload, &model));
        assert_eq!(
            MethodSignature::of(equals, &model).display(&model),
            "equals(Object)"
        );
    }

    #[test]
    fn generic_interface_method_is_implemented() {
        let mut model = SemanticModel::with_jdk_stubs();
        let Some(comparable) = model.resolve_class("java.lang.Comparable") else {
            panic!("Comparable stub missing");
        };
        let foo = model.add_class("com.example.Foo", ClassKind::Class, Modifiers::PUBLIC);
        model.add_interface(foo, Type::generic(comparable, vec![Type::class(foo)]));
        let compare_to = method(&mut model, foo, "compareTo", vec![Type::class(foo)]);

        assert_eq!(
            classify(compare_to, &model),
            Some(OverrideKind::Implements(comparable))
        );
    }
}
