//! First pass: classes, their supertypes and their members.
//!
//! Every type declaration reachable without entering a method body is
//! declared up front so that later references resolve regardless of
//! declaration order. Local and anonymous classes are declared lazily by the
//! lowering pass through the same entry points.

use super::resolve::{Frontend, TsNode, array_of, child_of_kind, dimension_count, named};
use crate::model::{Modifiers, Symbol, SymbolId, SymbolKind, Type, TypeParam};
use crate::tree::ClassKind;
use std::collections::HashMap;

pub(super) fn is_type_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration"
    )
}

fn class_kind(kind: &str) -> ClassKind {
    match kind {
        "interface_declaration" => ClassKind::Interface,
        "enum_declaration" => ClassKind::Enum,
        "record_declaration" => ClassKind::Record,
        "annotation_type_declaration" => ClassKind::Annotation,
        _ => ClassKind::Class,
    }
}

/// Member declarations of a class, interface, enum or annotation body.
pub(super) fn body_members<'t>(body: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut out = Vec::new();
    for child in named(body) {
        if child.kind() == "enum_body_declarations" {
            out.extend(named(child));
        } else {
            out.push(child);
        }
    }
    out
}

impl Frontend<'_> {
    pub(super) fn declare_unit(&mut self, root: TsNode<'_>) {
        self.read_header(root);
        let types: Vec<_> = named(root)
            .into_iter()
            .filter(|c| is_type_declaration(c.kind()))
            .collect();
        for decl in &types {
            self.declare_class(*decl, None);
        }
        for decl in &types {
            if let Some(sym) = self.classes.get(&decl.id()).copied() {
                self.define_class(*decl, sym);
            }
        }
    }

    /// Add a class symbol for `decl` and, recursively, for its member types.
    pub(super) fn declare_class(&mut self, decl: TsNode<'_>, outer: Option<SymbolId>) -> SymbolId {
        let name = decl
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let qualified = match outer {
            Some(o) => format!("{}.{name}", self.model.qualified_name(o)),
            None => self.qualify(&name),
        };
        let kind = class_kind(decl.kind());
        let (mut modifiers, annotations) = self.modifiers(decl);
        match kind {
            ClassKind::Interface | ClassKind::Annotation => modifiers.insert(Modifiers::ABSTRACT),
            ClassKind::Record => modifiers.insert(Modifiers::FINAL),
            _ => {}
        }
        if outer.is_some() && kind != ClassKind::Class {
            modifiers.insert(Modifiers::STATIC);
        }
        let sym = self.model.add_class(&qualified, kind, modifiers);
        self.model.symbol_mut(sym).owner = outer;
        let annots = self.annotation_symbols(&annotations);
        self.model.symbol_mut(sym).annotations = annots;
        self.classes.insert(decl.id(), sym);

        if let Some(body) = decl.child_by_field_name("body") {
            for member in body_members(body) {
                if is_type_declaration(member.kind()) {
                    self.declare_class(member, Some(sym));
                }
            }
        }
        sym
    }

    /// Supertypes, type parameters and members of an already declared class.
    pub(super) fn define_class(&mut self, decl: TsNode<'_>, sym: SymbolId) {
        self.enter_class(sym);
        if let Some(params) = decl.child_by_field_name("type_parameters") {
            let params = self.type_parameters(params, Some(sym));
            self.model.set_type_params(sym, params);
        }

        match decl.kind() {
            "class_declaration" => {
                if let Some(sup) = decl.child_by_field_name("superclass")
                    && let Some(t) = named(sup).last()
                {
                    let ty = self.resolve_type(*t);
                    self.model.set_superclass(sym, ty);
                }
            }
            "enum_declaration" => {
                if let Some(e) = self.model.resolve_class(crate::model::ENUM) {
                    self.model
                        .set_superclass(sym, Type::generic(e, vec![Type::class(sym)]));
                }
            }
            _ => {}
        }
        let interfaces = decl
            .child_by_field_name("interfaces")
            .or_else(|| child_of_kind(decl, "super_interfaces"))
            .or_else(|| child_of_kind(decl, "extends_interfaces"));
        if let Some(list) = interfaces {
            let types: Vec<_> = named(list)
                .into_iter()
                .flat_map(|c| if c.kind() == "type_list" { named(c) } else { vec![c] })
                .collect();
            for t in types {
                let ty = self.resolve_type(t);
                self.model.add_interface(sym, ty);
            }
        }

        if decl.kind() == "record_declaration"
            && let Some(params) = decl.child_by_field_name("parameters")
        {
            self.declare_record_components(params, sym);
        }
        if let Some(body) = decl.child_by_field_name("body") {
            self.define_members(body, sym);
        }
        self.leave_class();
    }

    pub(super) fn define_members(&mut self, body: TsNode<'_>, class: SymbolId) {
        let in_interface = self.model.symbol(class).is_interface();
        for member in body_members(body) {
            match member.kind() {
                "field_declaration" | "constant_declaration" => {
                    self.declare_fields(member, class, in_interface)
                }
                "method_declaration"
                | "annotation_type_element_declaration"
                | "constructor_declaration"
                | "compact_constructor_declaration" => {
                    self.declare_method(member, class, in_interface);
                }
                "enum_constant" => self.declare_enum_constant(member, class),
                k if is_type_declaration(k) => {
                    if let Some(nested) = self.classes.get(&member.id()).copied() {
                        self.define_class(member, nested);
                    }
                }
                _ => {}
            }
        }
    }

    /// Type parameters of a class (`owner`) or of a method (`None`). Method
    /// type variables are not modelled and stand for their first bound.
    pub(super) fn type_parameters(
        &mut self,
        n: TsNode<'_>,
        owner: Option<SymbolId>,
    ) -> Vec<TypeParam> {
        let params: Vec<_> = named(n)
            .into_iter()
            .filter(|p| p.kind() == "type_parameter")
            .collect();
        let names: Vec<String> = params
            .iter()
            .map(|p| {
                named(*p)
                    .into_iter()
                    .find(|c| matches!(c.kind(), "type_identifier" | "identifier"))
                    .map(|c| self.text(c).to_string())
                    .unwrap_or_default()
            })
            .collect();
        if let Some(owner) = owner {
            for (index, name) in names.iter().enumerate() {
                let tv = Type::TypeVar {
                    owner,
                    index,
                    name: name.clone(),
                };
                self.insert_type_var(name, tv);
            }
        }
        let mut out = Vec::new();
        for (p, name) in params.iter().zip(names) {
            let bounds: Vec<Type> = child_of_kind(*p, "type_bound")
                .map(|b| named(b).into_iter().map(|t| self.resolve_type(t)).collect())
                .unwrap_or_default();
            if owner.is_none() {
                let erased = bounds
                    .first()
                    .map(|b| self.model.erasure(b))
                    .unwrap_or_else(|| self.model.object_type());
                self.insert_type_var(&name, erased);
            }
            out.push(TypeParam { name, bounds });
        }
        out
    }

    fn declare_fields(&mut self, decl: TsNode<'_>, class: SymbolId, in_interface: bool) {
        let (mut modifiers, annotations) = self.modifiers(decl);
        if in_interface {
            modifiers.insert(Modifiers::PUBLIC.union(Modifiers::STATIC).union(Modifiers::FINAL));
        }
        let annots = self.annotation_symbols(&annotations);
        let base = decl
            .child_by_field_name("type")
            .map(|t| self.resolve_type(t))
            .unwrap_or(Type::Error);
        for declarator in super::resolve::field_all(decl, "declarator") {
            let Some(name) = declarator.child_by_field_name("name") else {
                continue;
            };
            let dims = dimension_count(declarator.child_by_field_name("dimensions"));
            let mut field = Symbol::new(
                self.text(name),
                SymbolKind::Field,
                array_of(base.clone(), dims),
            )
            .with_modifiers(modifiers);
            field.annotations = annots.clone();
            let id = self.model.add_member(class, field);
            self.members.insert(declarator.id(), id);
        }
    }

    pub(super) fn declare_method(
        &mut self,
        decl: TsNode<'_>,
        class: SymbolId,
        in_interface: bool,
    ) -> SymbolId {
        let (mut modifiers, annotations) = self.modifiers(decl);
        let annots = self.annotation_symbols(&annotations);
        let is_constructor = matches!(
            decl.kind(),
            "constructor_declaration" | "compact_constructor_declaration"
        );
        if in_interface && !is_constructor {
            if !modifiers.contains(Modifiers::PRIVATE) {
                modifiers.insert(Modifiers::PUBLIC);
            }
            let has_body = decl.child_by_field_name("body").is_some();
            if !has_body && !modifiers.contains(Modifiers::STATIC) {
                modifiers.insert(Modifiers::ABSTRACT);
            }
        }

        self.push_type_vars(HashMap::new());
        if let Some(tp) = decl.child_by_field_name("type_parameters") {
            self.type_parameters(tp, None);
        }
        let (name, kind, ret) = if is_constructor {
            ("<init>".to_string(), SymbolKind::Constructor, Type::Void)
        } else {
            let name = decl
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default();
            let ret = decl
                .child_by_field_name("type")
                .map(|t| self.resolve_type(t))
                .unwrap_or(Type::Error);
            let dims = dimension_count(decl.child_by_field_name("dimensions"));
            (name, SymbolKind::Method, array_of(ret, dims))
        };
        let params = match decl.child_by_field_name("parameters") {
            Some(p) => self.parameter_types(p),
            // compact canonical constructor: the record components
            None if is_constructor => self
                .model
                .members_named(class, "<init>")
                .next()
                .map(|c| self.model.symbol(c).params.clone())
                .unwrap_or_default(),
            None => Vec::new(),
        };
        self.pop_type_vars();

        let mut sym = Symbol::new(name, kind, ret)
            .with_modifiers(modifiers)
            .with_params(params);
        sym.annotations = annots;
        let id = self.model.add_member(class, sym);
        self.members.insert(decl.id(), id);
        id
    }

    /// Declared types of a `formal_parameters` list, varargs as arrays.
    pub(super) fn parameter_types(&self, params: TsNode<'_>) -> Vec<Type> {
        named(params)
            .into_iter()
            .filter_map(|p| match p.kind() {
                "formal_parameter" => {
                    let ty = p
                        .child_by_field_name("type")
                        .map(|t| self.resolve_type(t))
                        .unwrap_or(Type::Error);
                    let dims = dimension_count(p.child_by_field_name("dimensions"));
                    Some(array_of(ty, dims))
                }
                "spread_parameter" => {
                    let ty = named(p)
                        .into_iter()
                        .find(|c| !matches!(c.kind(), "modifiers" | "variable_declarator"))
                        .map(|t| self.resolve_type(t))
                        .unwrap_or(Type::Error);
                    Some(Type::array_of(ty))
                }
                _ => None,
            })
            .collect()
    }

    fn declare_record_components(&mut self, params: TsNode<'_>, class: SymbolId) {
        let types = self.parameter_types(params);
        let names: Vec<String> = named(params)
            .into_iter()
            .filter(|p| p.kind() == "formal_parameter")
            .filter_map(|p| p.child_by_field_name("name"))
            .map(|n| self.text(n).to_string())
            .collect();
        for (name, ty) in names.iter().zip(&types) {
            let mut field = Symbol::new(name.as_str(), SymbolKind::Field, ty.clone())
                .with_modifiers(Modifiers::PRIVATE.union(Modifiers::FINAL));
            field.effectively_final = true;
            self.model.add_member(class, field);
            let accessor = Symbol::new(name.as_str(), SymbolKind::Method, ty.clone())
                .with_modifiers(Modifiers::PUBLIC);
            self.model.add_member(class, accessor);
        }
        let canonical = Symbol::new("<init>", SymbolKind::Constructor, Type::Void)
            .with_modifiers(Modifiers::PUBLIC)
            .with_params(types);
        self.model.add_member(class, canonical);
    }

    fn declare_enum_constant(&mut self, decl: TsNode<'_>, class: SymbolId) {
        let Some(name) = decl.child_by_field_name("name") else {
            return;
        };
        let mut constant = Symbol::new(self.text(name), SymbolKind::Field, Type::class(class))
            .with_modifiers(
                Modifiers::PUBLIC
                    .union(Modifiers::STATIC)
                    .union(Modifiers::FINAL),
            );
        constant.effectively_final = true;
        let id = self.model.add_member(class, constant);
        self.members.insert(decl.id(), id);
    }
}
