//! Well-known JDK classes seeded into every model.
//!
//! Only the members the analyses ask about are declared: the `equals` /
//! `hashCode` overrides that decide equality compatibility, the boxed
//! `MIN_VALUE` / `MAX_VALUE` constants, the annotation types suppression and
//! override detection look for, and the collection hierarchy.

use super::{Modifiers, OBJECT, SemanticModel, Symbol, SymbolId, SymbolKind, Type, TypeParam};
use crate::tree::{ClassKind, ConstValue, PrimitiveKind};

const PUBLIC: Modifiers = Modifiers::PUBLIC;
const PUBLIC_FINAL: Modifiers = Modifiers::PUBLIC.union(Modifiers::FINAL);
const PUBLIC_ABSTRACT: Modifiers = Modifiers::PUBLIC.union(Modifiers::ABSTRACT);
const PUBLIC_STATIC: Modifiers = Modifiers::PUBLIC.union(Modifiers::STATIC);
const CONSTANT: Modifiers = PUBLIC_STATIC.union(Modifiers::FINAL);

fn prim(p: PrimitiveKind) -> Type {
    Type::Primitive(p)
}

fn tv(owner: SymbolId, index: usize, name: &str) -> Type {
    Type::TypeVar {
        owner,
        index,
        name: name.to_string(),
    }
}

fn method(
    m: &mut SemanticModel,
    owner: SymbolId,
    name: &str,
    params: Vec<Type>,
    ret: Type,
    modifiers: Modifiers,
) -> SymbolId {
    m.add_member(
        owner,
        Symbol::new(name, SymbolKind::Method, ret)
            .with_params(params)
            .with_modifiers(modifiers),
    )
}

fn constant(m: &mut SemanticModel, owner: SymbolId, name: &str, ty: Type, value: ConstValue) {
    let mut field = Symbol::new(name, SymbolKind::Field, ty)
        .with_modifiers(CONSTANT)
        .with_constant(value);
    field.effectively_final = true;
    m.add_member(owner, field);
}

fn generic(
    m: &mut SemanticModel,
    name: &str,
    kind: ClassKind,
    modifiers: Modifiers,
    params: &[&str],
) -> SymbolId {
    let id = m.add_class(name, kind, modifiers);
    m.set_type_params(
        id,
        params
            .iter()
            .map(|p| TypeParam {
                name: p.to_string(),
                bounds: Vec::new(),
            })
            .collect(),
    );
    id
}

fn equals_and_hash_code(
    m: &mut SemanticModel,
    owner: SymbolId,
    object: &Type,
    modifiers: Modifiers,
) {
    method(
        m,
        owner,
        "equals",
        vec![object.clone()],
        prim(PrimitiveKind::Boolean),
        modifiers,
    );
    method(m, owner, "hashCode", vec![], prim(PrimitiveKind::Int), modifiers);
}

pub(super) fn seed(m: &mut SemanticModel) {
    use PrimitiveKind::*;

    let object_sym = m.add_class(OBJECT, ClassKind::Class, PUBLIC);
    let object = Type::class(object_sym);
    equals_and_hash_code(m, object_sym, &object, PUBLIC);

    let annotation = |m: &mut SemanticModel, name: &str| {
        m.add_class(name, ClassKind::Annotation, PUBLIC)
    };
    let inherited = annotation(m, "java.lang.annotation.Inherited");
    for name in [
        "java.lang.Override",
        "java.lang.Deprecated",
        "java.lang.SuppressWarnings",
        "java.lang.FunctionalInterface",
        "javax.annotation.Generated",
        "javax.annotation.processing.Generated",
    ] {
        annotation(m, name);
    }
    m.symbol_mut(inherited).annotations.push(inherited);

    let serializable = m.add_class("java.io.Serializable", ClassKind::Interface, PUBLIC);
    m.add_class("java.lang.Cloneable", ClassKind::Interface, PUBLIC);
    let char_sequence = m.add_class("java.lang.CharSequence", ClassKind::Interface, PUBLIC);
    method(m, char_sequence, "length", vec![], prim(Int), PUBLIC_ABSTRACT);

    let comparable = generic(m, "java.lang.Comparable", ClassKind::Interface, PUBLIC, &["T"]);
    method(
        m,
        comparable,
        "compareTo",
        vec![tv(comparable, 0, "T")],
        prim(Int),
        PUBLIC_ABSTRACT,
    );
    let comparable_of = |t: Type| Type::generic(comparable, vec![t]);

    let iterable = generic(m, "java.lang.Iterable", ClassKind::Interface, PUBLIC, &["T"]);

    let string_sym = m.add_class(super::STRING, ClassKind::Class, PUBLIC_FINAL);
    let string = Type::class(string_sym);
    m.add_interface(string_sym, Type::class(serializable));
    m.add_interface(string_sym, comparable_of(string.clone()));
    m.add_interface(string_sym, Type::class(char_sequence));
    equals_and_hash_code(m, string_sym, &object, PUBLIC);
    method(m, string_sym, "length", vec![], prim(Int), PUBLIC);
    method(m, string_sym, "isEmpty", vec![], prim(Boolean), PUBLIC);
    method(
        m,
        string_sym,
        "equalsIgnoreCase",
        vec![string.clone()],
        prim(Boolean),
        PUBLIC,
    );
    method(
        m,
        string_sym,
        "contains",
        vec![Type::class(char_sequence)],
        prim(Boolean),
        PUBLIC,
    );
    method(m, object_sym, "toString", vec![], string.clone(), PUBLIC);

    let number = m.add_class("java.lang.Number", ClassKind::Class, PUBLIC_ABSTRACT);
    m.add_interface(number, Type::class(serializable));
    method(m, number, "intValue", vec![], prim(Int), PUBLIC_ABSTRACT);
    method(m, number, "longValue", vec![], prim(Long), PUBLIC_ABSTRACT);

    let boxed: [(PrimitiveKind, Option<(ConstValue, ConstValue)>); 8] = [
        (
            Byte,
            Some((ConstValue::Int(i8::MIN as i32), ConstValue::Int(i8::MAX as i32))),
        ),
        (
            Short,
            Some((
                ConstValue::Int(i16::MIN as i32),
                ConstValue::Int(i16::MAX as i32),
            )),
        ),
        (Int, Some((ConstValue::Int(i32::MIN), ConstValue::Int(i32::MAX)))),
        (Long, Some((ConstValue::Long(i64::MIN), ConstValue::Long(i64::MAX)))),
        (
            Char,
            Some((ConstValue::Char(u16::MIN), ConstValue::Char(u16::MAX))),
        ),
        (
            Float,
            Some((ConstValue::Float(1), ConstValue::float(f32::MAX))),
        ),
        (
            Double,
            Some((ConstValue::Double(1), ConstValue::double(f64::MAX))),
        ),
        (Boolean, None),
    ];
    for (p, limits) in boxed {
        let sym = m.add_class(p.boxed_name(), ClassKind::Class, PUBLIC_FINAL);
        let this = Type::class(sym);
        if p.is_numeric() && p != Char {
            m.set_superclass(sym, Type::class(number));
        } else {
            m.add_interface(sym, Type::class(serializable));
        }
        m.add_interface(sym, comparable_of(this.clone()));
        equals_and_hash_code(m, sym, &object, PUBLIC);
        method(m, sym, "valueOf", vec![prim(p)], this.clone(), PUBLIC_STATIC);
        if let Some((min, max)) = limits {
            // Byte/Short limits are `byte`/`short` typed fields.
            let field_ty = match p {
                Byte | Short => prim(p),
                _ => min.primitive_kind().map(prim).unwrap_or(Type::Error),
            };
            constant(m, sym, "MIN_VALUE", field_ty.clone(), min);
            constant(m, sym, "MAX_VALUE", field_ty, max);
        }
    }

    let enum_sym = m.add_class(super::ENUM, ClassKind::Class, PUBLIC_ABSTRACT);
    m.set_type_params(
        enum_sym,
        vec![TypeParam {
            name: "E".to_string(),
            bounds: vec![Type::generic(enum_sym, vec![tv(enum_sym, 0, "E")])],
        }],
    );
    m.add_interface(enum_sym, comparable_of(tv(enum_sym, 0, "E")));
    m.add_interface(enum_sym, Type::class(serializable));
    equals_and_hash_code(m, enum_sym, &object, PUBLIC_FINAL);
    method(m, enum_sym, "name", vec![], string.clone(), PUBLIC_FINAL);
    method(m, enum_sym, "ordinal", vec![], prim(Int), PUBLIC_FINAL);

    let throwable = m.add_class("java.lang.Throwable", ClassKind::Class, PUBLIC);
    m.add_interface(throwable, Type::class(serializable));
    method(m, throwable, "getMessage", vec![], string.clone(), PUBLIC);
    let mut parent = throwable;
    for name in ["java.lang.Exception", "java.lang.RuntimeException"] {
        let sym = m.add_class(name, ClassKind::Class, PUBLIC);
        m.set_superclass(sym, Type::class(parent));
        parent = sym;
    }
    for name in [
        "java.lang.IllegalArgumentException",
        "java.lang.IllegalStateException",
        "java.lang.NullPointerException",
        "java.lang.UnsupportedOperationException",
    ] {
        let sym = m.add_class(name, ClassKind::Class, PUBLIC);
        m.set_superclass(sym, Type::class(parent));
    }

    let objects = m.add_class("java.util.Objects", ClassKind::Class, PUBLIC_FINAL);
    method(
        m,
        objects,
        "equals",
        vec![object.clone(), object.clone()],
        prim(Boolean),
        PUBLIC_STATIC,
    );
    method(m, objects, "hashCode", vec![object.clone()], prim(Int), PUBLIC_STATIC);
    method(m, objects, "isNull", vec![object.clone()], prim(Boolean), PUBLIC_STATIC);
    method(
        m,
        objects,
        "requireNonNull",
        vec![object.clone()],
        object.clone(),
        PUBLIC_STATIC,
    );

    seed_collections(m, iterable, &object);
}

fn seed_collections(m: &mut SemanticModel, iterable: SymbolId, object: &Type) {
    use PrimitiveKind::*;

    let collection = generic(m, "java.util.Collection", ClassKind::Interface, PUBLIC, &["E"]);
    m.add_interface(collection, Type::generic(iterable, vec![tv(collection, 0, "E")]));
    equals_and_hash_code(m, collection, object, PUBLIC_ABSTRACT);
    method(m, collection, "size", vec![], prim(Int), PUBLIC_ABSTRACT);
    method(m, collection, "isEmpty", vec![], prim(Boolean), PUBLIC_ABSTRACT);
    method(
        m,
        collection,
        "contains",
        vec![object.clone()],
        prim(Boolean),
        PUBLIC_ABSTRACT,
    );
    method(
        m,
        collection,
        "add",
        vec![tv(collection, 0, "E")],
        prim(Boolean),
        PUBLIC_ABSTRACT,
    );

    // (interface, abstract skeleton, concrete implementations)
    let families: [(&str, &str, &[&str]); 2] = [
        (
            "java.util.List",
            "java.util.AbstractList",
            &["java.util.ArrayList", "java.util.LinkedList"],
        ),
        (
            "java.util.Set",
            "java.util.AbstractSet",
            &["java.util.HashSet", "java.util.TreeSet"],
        ),
    ];
    for (iface_name, skeleton_name, impls) in families {
        let iface = generic(m, iface_name, ClassKind::Interface, PUBLIC, &["E"]);
        m.add_interface(iface, Type::generic(collection, vec![tv(iface, 0, "E")]));
        equals_and_hash_code(m, iface, object, PUBLIC_ABSTRACT);
        if iface_name == "java.util.List" {
            method(m, iface, "get", vec![prim(Int)], tv(iface, 0, "E"), PUBLIC_ABSTRACT);
        }

        let skeleton = generic(m, skeleton_name, ClassKind::Class, PUBLIC_ABSTRACT, &["E"]);
        m.add_interface(skeleton, Type::generic(iface, vec![tv(skeleton, 0, "E")]));
        equals_and_hash_code(m, skeleton, object, PUBLIC);

        for name in impls {
            let sym = generic(m, name, ClassKind::Class, PUBLIC, &["E"]);
            m.set_superclass(sym, Type::generic(skeleton, vec![tv(sym, 0, "E")]));
        }
    }

    let map = generic(m, "java.util.Map", ClassKind::Interface, PUBLIC, &["K", "V"]);
    equals_and_hash_code(m, map, object, PUBLIC_ABSTRACT);
    method(m, map, "get", vec![object.clone()], tv(map, 1, "V"), PUBLIC_ABSTRACT);
    method(
        m,
        map,
        "containsKey",
        vec![object.clone()],
        prim(Boolean),
        PUBLIC_ABSTRACT,
    );
    method(
        m,
        map,
        "put",
        vec![tv(map, 0, "K"), tv(map, 1, "V")],
        tv(map, 1, "V"),
        PUBLIC_ABSTRACT,
    );
    let abstract_map =
        generic(m, "java.util.AbstractMap", ClassKind::Class, PUBLIC_ABSTRACT, &["K", "V"]);
    m.add_interface(
        abstract_map,
        Type::generic(map, vec![tv(abstract_map, 0, "K"), tv(abstract_map, 1, "V")]),
    );
    equals_and_hash_code(m, abstract_map, object, PUBLIC);
    for name in ["java.util.HashMap", "java.util.TreeMap"] {
        let sym = generic(m, name, ClassKind::Class, PUBLIC, &["K", "V"]);
        m.set_superclass(
            sym,
            Type::generic(abstract_map, vec![tv(sym, 0, "K"), tv(sym, 1, "V")]),
        );
    }

    let optional = generic(m, "java.util.Optional", ClassKind::Class, PUBLIC_FINAL, &["T"]);
    equals_and_hash_code(m, optional, object, PUBLIC);
    method(m, optional, "isPresent", vec![], prim(Boolean), PUBLIC);
    method(m, optional, "get", vec![], tv(optional, 0, "T"), PUBLIC);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_limits_are_constants() {
        let m = SemanticModel::with_jdk_stubs();
        let integer = m.resolve_class("Integer").unwrap();
        let max = m.find_field(integer, "MAX_VALUE").unwrap();
        assert_eq!(m.symbol(max).constant, Some(ConstValue::Int(i32::MAX)));
    }

    #[test]
    fn enum_equals_is_declared_on_enum() {
        let m = SemanticModel::with_jdk_stubs();
        let e = m.resolve_class("java.lang.Enum").unwrap();
        assert_eq!(m.members_named(e, "equals").count(), 1);
    }

    #[test]
    fn array_list_is_a_collection() {
        let m = SemanticModel::with_jdk_stubs();
        let list = m.resolve_class("java.util.ArrayList").unwrap();
        let collection = m.resolve_class("java.util.Collection").unwrap();
        assert!(m.is_subclass(list, collection));
    }
}
