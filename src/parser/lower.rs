//! Second pass: lower the tree-sitter tree into a [`TypedTree`], resolving
//! names and computing expression types on the way up.

use super::declare::{body_members, is_type_declaration};
use super::literal;
use super::resolve::{
    Frontend, TsNode, array_of, child_of_kind, dimension_count, field_all, named,
};
use crate::model::{Modifiers, SymbolId, SymbolKind, Type};
use crate::tree::{
    BinaryOp, ClassKind, ConstValue, Literal, NodeData, NodeId, PrimitiveKind, Span, UnaryOp,
};
use std::collections::HashMap;

const EXPRESSION_KINDS: &[&str] = &[
    "assignment_expression",
    "binary_expression",
    "unary_expression",
    "update_expression",
    "ternary_expression",
    "cast_expression",
    "instanceof_expression",
    "lambda_expression",
    "method_invocation",
    "object_creation_expression",
    "array_creation_expression",
    "field_access",
    "array_access",
    "parenthesized_expression",
    "identifier",
    "this",
];

impl Frontend<'_> {
    // ==========================================================================
    // Unit and declarations
    // ==========================================================================

    pub(super) fn lower_unit(&mut self, root: TsNode<'_>) -> NodeId {
        let mut package = None;
        let mut imports = Vec::new();
        let mut types = Vec::new();
        self.push_scope();
        for child in named(root) {
            match child.kind() {
                "package_declaration" => {
                    let data = NodeData::Package {
                        name: self.package.clone(),
                    };
                    package = Some(self.builder.push(data, self.span(child)));
                }
                "import_declaration" => {
                    let (name, is_static, on_demand) = self.import_parts(child);
                    let name = if on_demand { format!("{name}.*") } else { name };
                    imports.push(
                        self.builder
                            .push(NodeData::Import { name, is_static }, self.span(child)),
                    );
                }
                k if is_type_declaration(k) => types.push(self.lower_class(child)),
                _ => types.push(self.lower_other(child)),
            }
        }
        self.pop_scope();
        self.builder.push(
            NodeData::CompilationUnit {
                package,
                imports,
                types,
            },
            Span::new(0, self.src.len()),
        )
    }

    fn lower_class(&mut self, decl: TsNode<'_>) -> NodeId {
        let sym = match self.classes.get(&decl.id()).copied() {
            Some(sym) => sym,
            None => {
                // local class inside a method body
                let sym = self.declare_class(decl, self.current_class());
                if let Some(name) = decl.child_by_field_name("name") {
                    let name = self.text(name).to_string();
                    self.declare_local_type(&name, sym);
                }
                self.define_class(decl, sym);
                sym
            }
        };
        let (modifiers, annotation_nodes) = self.modifiers(decl);
        let annotations = self.lower_annotations(&annotation_nodes);
        let class_kind = self
            .model
            .class_info(sym)
            .map(|i| i.class_kind)
            .unwrap_or(ClassKind::Class);

        self.enter_class(sym);
        let extends = decl
            .child_by_field_name("superclass")
            .and_then(|s| named(s).last().copied())
            .map(|t| self.lower_type(t));
        let implements = decl
            .child_by_field_name("interfaces")
            .or_else(|| child_of_kind(decl, "super_interfaces"))
            .or_else(|| child_of_kind(decl, "extends_interfaces"))
            .map(|list| {
                named(list)
                    .into_iter()
                    .flat_map(|c| if c.kind() == "type_list" { named(c) } else { vec![c] })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
            .into_iter()
            .map(|t| self.lower_type(t))
            .collect();

        let mut members = Vec::new();
        if decl.kind() == "record_declaration"
            && let Some(params) = decl.child_by_field_name("parameters")
        {
            // components are fields of the record, not locals of the class body
            self.push_scope();
            members.extend(self.lower_parameters(params));
            self.pop_scope();
        }
        if let Some(body) = decl.child_by_field_name("body") {
            for member in body_members(body) {
                members.extend(self.lower_member(member));
            }
        }
        self.leave_class();

        let name = decl
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let id = self.builder.push(
            NodeData::Class {
                name,
                class_kind,
                modifiers,
                annotations,
                extends,
                implements,
                members,
            },
            self.span(decl),
        );
        self.builder.set_symbol(id, sym);
        self.builder.set_type(id, Type::class(sym));
        id
    }

    fn lower_member(&mut self, member: TsNode<'_>) -> Vec<NodeId> {
        match member.kind() {
            "field_declaration" | "constant_declaration" => self.lower_fields(member),
            "method_declaration"
            | "annotation_type_element_declaration"
            | "constructor_declaration"
            | "compact_constructor_declaration" => vec![self.lower_method(member)],
            "enum_constant" => vec![self.lower_enum_constant(member)],
            "block" => vec![self.lower_block(member)],
            "static_initializer" => match child_of_kind(member, "block") {
                Some(b) => vec![self.lower_block(b)],
                None => Vec::new(),
            },
            k if is_type_declaration(k) => vec![self.lower_class(member)],
            _ => vec![self.lower_other(member)],
        }
    }

    fn lower_fields(&mut self, decl: TsNode<'_>) -> Vec<NodeId> {
        let (modifiers, annotation_nodes) = self.modifiers(decl);
        let type_node = decl.child_by_field_name("type");
        let mut out = Vec::new();
        for declarator in field_all(decl, "declarator") {
            let annotations = self.lower_annotations(&annotation_nodes);
            let var_type = type_node.map(|t| self.lower_type_with_dims(t, declarator));
            let init = declarator
                .child_by_field_name("value")
                .map(|v| self.lower_expr(v));
            let name = declarator
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default();
            let id = self.builder.push(
                NodeData::Variable {
                    name,
                    modifiers,
                    annotations,
                    var_type,
                    init,
                },
                self.span(if out.is_empty() { decl } else { declarator }),
            );
            if let Some(sym) = self.members.get(&declarator.id()).copied() {
                self.builder.set_symbol(id, sym);
                self.builder.set_type(id, self.model.symbol(sym).ty.clone());
            }
            out.push(id);
        }
        out
    }

    fn lower_enum_constant(&mut self, decl: TsNode<'_>) -> NodeId {
        let (modifiers, annotation_nodes) = self.modifiers(decl);
        let annotations = self.lower_annotations(&annotation_nodes);
        let class = self.current_class();
        let mut parts = Vec::new();
        if let Some(args) = decl.child_by_field_name("arguments") {
            parts.extend(named(args).into_iter().map(|a| self.lower_expr(a)));
        }
        if let Some(body) = decl.child_by_field_name("body") {
            let ty = class.map(Type::class).unwrap_or(Type::Error);
            parts.push(self.lower_anonymous_class(body, &ty));
        }
        let init = (!parts.is_empty()).then(|| {
            self.builder.push(
                NodeData::Other {
                    label: "enum_constant_arguments".to_string(),
                    children: parts,
                },
                self.span(decl),
            )
        });
        let name = decl
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let id = self.builder.push(
            NodeData::Variable {
                name,
                modifiers,
                annotations,
                var_type: None,
                init,
            },
            self.span(decl),
        );
        if let Some(sym) = self.members.get(&decl.id()).copied() {
            self.builder.set_symbol(id, sym);
            self.builder.set_type(id, self.model.symbol(sym).ty.clone());
        }
        id
    }

    fn lower_method(&mut self, decl: TsNode<'_>) -> NodeId {
        let sym = match self.members.get(&decl.id()).copied() {
            Some(sym) => Some(sym),
            None => self.current_class().map(|c| {
                let in_interface = self.model.symbol(c).is_interface();
                self.declare_method(decl, c, in_interface)
            }),
        };
        let (modifiers, annotation_nodes) = self.modifiers(decl);
        let annotations = self.lower_annotations(&annotation_nodes);

        self.push_type_vars(HashMap::new());
        if let Some(tp) = decl.child_by_field_name("type_parameters") {
            self.type_parameters(tp, None);
        }
        if let Some(sym) = sym {
            self.method_stack.push(sym);
        }
        self.push_scope();

        let is_constructor = matches!(
            decl.kind(),
            "constructor_declaration" | "compact_constructor_declaration"
        );
        let return_type = if is_constructor {
            None
        } else {
            decl.child_by_field_name("type").map(|t| self.lower_type(t))
        };
        let params = decl
            .child_by_field_name("parameters")
            .map(|p| self.lower_parameters(p))
            .unwrap_or_default();
        let body = decl
            .child_by_field_name("body")
            .map(|b| self.lower_block(b));

        self.pop_scope();
        if sym.is_some() {
            self.method_stack.pop();
        }
        self.pop_type_vars();

        let name = if is_constructor {
            "<init>".to_string()
        } else {
            decl.child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default()
        };
        let id = self.builder.push(
            NodeData::Method {
                name,
                modifiers,
                annotations,
                return_type,
                params,
                body,
            },
            self.span(decl),
        );
        if let Some(sym) = sym {
            self.builder.set_symbol(id, sym);
            self.builder.set_type(id, self.model.symbol(sym).ty.clone());
        }
        id
    }

    /// Parameters of a method, constructor, record or lambda, as `Variable`s.
    fn lower_parameters(&mut self, params: TsNode<'_>) -> Vec<NodeId> {
        let mut out = Vec::new();
        for p in named(params) {
            match p.kind() {
                "formal_parameter" => {
                    let (modifiers, annotation_nodes) = self.modifiers(p);
                    let annotations = self.lower_annotations(&annotation_nodes);
                    let var_type = p.child_by_field_name("type").map(|t| {
                        let dims = dimension_count(p.child_by_field_name("dimensions"));
                        self.lower_type_dims(t, dims)
                    });
                    let name = p
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_default();
                    out.push(self.parameter(p, name, modifiers, annotations, var_type));
                }
                "spread_parameter" => {
                    let (modifiers, annotation_nodes) = self.modifiers(p);
                    let annotations = self.lower_annotations(&annotation_nodes);
                    let parts = named(p);
                    let var_type = parts
                        .iter()
                        .find(|c| !matches!(c.kind(), "modifiers" | "variable_declarator"))
                        .map(|t| self.lower_type_dims(*t, 1));
                    let name = parts
                        .iter()
                        .find(|c| c.kind() == "variable_declarator")
                        .and_then(|d| d.child_by_field_name("name"))
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_default();
                    out.push(self.parameter(p, name, modifiers, annotations, var_type));
                }
                "identifier" => {
                    let name = self.text(p).to_string();
                    out.push(self.parameter(p, name, Modifiers::NONE, Vec::new(), None));
                }
                _ => {}
            }
        }
        out
    }

    fn parameter(
        &mut self,
        n: TsNode<'_>,
        name: String,
        modifiers: Modifiers,
        annotations: Vec<NodeId>,
        var_type: Option<NodeId>,
    ) -> NodeId {
        let ty = var_type
            .and_then(|t| self.builder.type_of(t).cloned())
            .unwrap_or(Type::Error);
        // Definitely assigned on entry, so any write breaks effective finality.
        let sym = self.new_local(&name, SymbolKind::Parameter, ty.clone(), modifiers, true);
        let id = self.builder.push(
            NodeData::Variable {
                name,
                modifiers,
                annotations,
                var_type,
                init: None,
            },
            self.span(n),
        );
        self.builder.set_symbol(id, sym);
        self.builder.set_type(id, ty);
        id
    }

    fn lower_annotations(&mut self, nodes: &[TsNode<'_>]) -> Vec<NodeId> {
        nodes.iter().map(|a| self.lower_annotation(*a)).collect()
    }

    fn lower_annotation(&mut self, n: TsNode<'_>) -> NodeId {
        let name = n
            .child_by_field_name("name")
            .map(|x| self.compact_text(x))
            .unwrap_or_default();
        let mut args = Vec::new();
        if let Some(list) = n.child_by_field_name("arguments") {
            for arg in named(list) {
                let id = if arg.kind() == "element_value_pair" {
                    let key = arg.child_by_field_name("key");
                    let target = match key {
                        Some(k) => self.builder.ident(self.text(k), self.span(k)),
                        None => self.builder.ident("value", self.span(arg)),
                    };
                    let value = match arg.child_by_field_name("value") {
                        Some(v) => self.lower_element_value(v),
                        None => self.lower_other(arg),
                    };
                    self.builder
                        .push(NodeData::Assignment { target, value }, self.span(arg))
                } else {
                    self.lower_element_value(arg)
                };
                args.push(id);
            }
        }
        let sym = self.annotation_symbol(&name);
        let id = self
            .builder
            .push(NodeData::Annotation { name, args }, self.span(n));
        self.builder.set_symbol(id, sym);
        self.builder.set_type(id, Type::class(sym));
        id
    }

    fn lower_element_value(&mut self, n: TsNode<'_>) -> NodeId {
        match n.kind() {
            "element_value_array_initializer" => {
                let elems = named(n)
                    .into_iter()
                    .map(|e| self.lower_element_value(e))
                    .collect();
                self.builder.push(
                    NodeData::NewArray {
                        elem_type: None,
                        dims: Vec::new(),
                        elems,
                    },
                    self.span(n),
                )
            }
            "annotation" | "marker_annotation" => self.lower_annotation(n),
            _ => self.lower_expr(n),
        }
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    pub(super) fn lower_type(&mut self, n: TsNode<'_>) -> NodeId {
        let ty = self.resolve_type(n);
        let span = self.span(n);
        let id = match n.kind() {
            "integral_type" | "floating_point_type" | "boolean_type" => {
                match PrimitiveKind::from_keyword(self.text(n).trim()) {
                    Some(p) => self.builder.push(NodeData::PrimitiveType(p), span),
                    None => self.lower_other(n),
                }
            }
            "void_type" => self.builder.push(NodeData::VoidType, span),
            "type_identifier" | "scoped_type_identifier" | "scoped_identifier" | "identifier" => {
                let name = self.compact_text(n);
                self.builder.push(
                    NodeData::TypeName {
                        name,
                        args: Vec::new(),
                    },
                    span,
                )
            }
            "generic_type" => {
                let parts = named(n);
                let name = parts
                    .first()
                    .map(|b| self.compact_text(*b))
                    .unwrap_or_default();
                let arg_nodes: Vec<_> = parts
                    .iter()
                    .filter(|p| p.kind() == "type_arguments")
                    .flat_map(|p| named(*p))
                    .collect();
                let args = arg_nodes.into_iter().map(|a| self.lower_type(a)).collect();
                self.builder.push(NodeData::TypeName { name, args }, span)
            }
            "array_type" => {
                let dims = dimension_count(n.child_by_field_name("dimensions")).max(1);
                let mut elem = match n.child_by_field_name("element") {
                    Some(e) => self.lower_type(e),
                    None => self.lower_other(n),
                };
                for _ in 0..dims {
                    elem = self.builder.push(NodeData::ArrayType { elem }, span);
                }
                elem
            }
            "annotated_type" => {
                let inner = named(n)
                    .into_iter()
                    .rfind(|c| c.kind() != "annotation" && c.kind() != "marker_annotation");
                match inner {
                    Some(t) => return self.lower_type(t),
                    None => self.lower_other(n),
                }
            }
            _ => self.lower_other(n),
        };
        if ty != Type::Error {
            self.builder.set_type(id, ty);
        }
        id
    }

    /// A declared type followed by extra `[]` from the declarator (`int x[]`).
    fn lower_type_with_dims(&mut self, ty: TsNode<'_>, declarator: TsNode<'_>) -> NodeId {
        let dims = dimension_count(declarator.child_by_field_name("dimensions"));
        self.lower_type_dims(ty, dims)
    }

    fn lower_type_dims(&mut self, ty: TsNode<'_>, dims: usize) -> NodeId {
        let mut id = self.lower_type(ty);
        let span = self.span(ty);
        for _ in 0..dims {
            let elem_ty = self.builder.type_of(id).cloned();
            id = self.builder.push(NodeData::ArrayType { elem: id }, span);
            if let Some(t) = elem_ty {
                self.builder.set_type(id, Type::array_of(t));
            }
        }
        id
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn lower_block(&mut self, n: TsNode<'_>) -> NodeId {
        self.push_scope();
        let mut stmts = Vec::new();
        for child in named(n) {
            stmts.extend(self.lower_statement(child));
        }
        self.pop_scope();
        self.builder.push(NodeData::Block { stmts }, self.span(n))
    }

    /// A statement in a position that takes exactly one.
    fn lower_single(&mut self, n: TsNode<'_>) -> NodeId {
        let mut stmts = self.lower_statement(n);
        if stmts.len() == 1 {
            return stmts.remove(0);
        }
        self.builder.push(NodeData::Block { stmts }, self.span(n))
    }

    fn lower_statement(&mut self, n: TsNode<'_>) -> Vec<NodeId> {
        let span = self.span(n);
        let id = match n.kind() {
            "local_variable_declaration" => return self.lower_locals(n),
            k if is_type_declaration(k) => self.lower_class(n),
            "block" | "constructor_body" => self.lower_block(n),
            "expression_statement" => match named(n).first() {
                Some(e) => {
                    let expr = self.lower_expr(*e);
                    self.builder
                        .push(NodeData::ExpressionStatement { expr }, span)
                }
                None => self.lower_other(n),
            },
            "if_statement" => {
                let (Some(cond), Some(then)) = (
                    n.child_by_field_name("condition"),
                    n.child_by_field_name("consequence"),
                ) else {
                    return vec![self.lower_other(n)];
                };
                let cond = self.lower_expr(cond);
                let then_branch = self.lower_single(then);
                let else_branch = n
                    .child_by_field_name("alternative")
                    .map(|e| self.lower_single(e));
                self.builder.push(
                    NodeData::If {
                        cond,
                        then_branch,
                        else_branch,
                    },
                    span,
                )
            }
            "while_statement" => {
                let (Some(cond), Some(body)) = (
                    n.child_by_field_name("condition"),
                    n.child_by_field_name("body"),
                ) else {
                    return vec![self.lower_other(n)];
                };
                let cond = self.lower_expr(cond);
                let body = self.lower_single(body);
                self.builder.push(NodeData::While { cond, body }, span)
            }
            "do_statement" => {
                let (Some(body), Some(cond)) = (
                    n.child_by_field_name("body"),
                    n.child_by_field_name("condition"),
                ) else {
                    return vec![self.lower_other(n)];
                };
                let body = self.lower_single(body);
                let cond = self.lower_expr(cond);
                self.builder.push(NodeData::DoWhile { body, cond }, span)
            }
            "for_statement" => self.lower_for(n),
            "enhanced_for_statement" => self.lower_enhanced_for(n),
            "return_statement" => {
                let expr = named(n).first().map(|e| self.lower_expr(*e));
                self.builder.push(NodeData::Return { expr }, span)
            }
            "throw_statement" => match named(n).first() {
                Some(e) => {
                    let expr = self.lower_expr(*e);
                    self.builder.push(NodeData::Throw { expr }, span)
                }
                None => self.lower_other(n),
            },
            "break_statement" => self.builder.push(NodeData::Break, span),
            "continue_statement" => self.builder.push(NodeData::Continue, span),
            "try_statement" | "try_with_resources_statement" => self.lower_try(n),
            "switch_expression" | "switch_statement" => self.lower_switch(n),
            "labeled_statement" => {
                match named(n).into_iter().rfind(|c| c.kind() != "identifier") {
                    Some(inner) => return self.lower_statement(inner),
                    None => self.lower_other(n),
                }
            }
            k if EXPRESSION_KINDS.contains(&k) => self.lower_expr(n),
            _ => self.lower_other(n),
        };
        vec![id]
    }

    fn lower_locals(&mut self, decl: TsNode<'_>) -> Vec<NodeId> {
        let (modifiers, annotation_nodes) = self.modifiers(decl);
        let type_node = decl.child_by_field_name("type");
        let is_var = type_node.is_some_and(|t| self.text(t) == "var");
        let mut out = Vec::new();
        for declarator in field_all(decl, "declarator") {
            let annotations = self.lower_annotations(&annotation_nodes);
            let var_type = match type_node {
                Some(t) if !is_var => Some(self.lower_type_with_dims(t, declarator)),
                _ => None,
            };
            let init = declarator
                .child_by_field_name("value")
                .map(|v| self.lower_expr(v));
            let ty = var_type
                .or(if is_var { init } else { None })
                .and_then(|t| self.builder.type_of(t).cloned())
                .unwrap_or(Type::Error);
            let name = declarator
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default();
            let has_init = init.is_some();
            let sym = self.new_local(&name, SymbolKind::Local, ty.clone(), modifiers, has_init);
            let id = self.builder.push(
                NodeData::Variable {
                    name,
                    modifiers,
                    annotations,
                    var_type,
                    init,
                },
                self.span(if out.is_empty() { decl } else { declarator }),
            );
            self.builder.set_symbol(id, sym);
            self.builder.set_type(id, ty);
            out.push(id);
        }
        out
    }

    fn lower_for(&mut self, n: TsNode<'_>) -> NodeId {
        self.push_scope();
        let mut init = Vec::new();
        for i in field_all(n, "init") {
            if i.kind() == "local_variable_declaration" {
                init.extend(self.lower_locals(i));
            } else {
                init.push(self.lower_expr(i));
            }
        }
        let cond = n.child_by_field_name("condition").map(|c| self.lower_expr(c));
        let update = field_all(n, "update")
            .into_iter()
            .map(|u| self.lower_expr(u))
            .collect();
        let body = match n.child_by_field_name("body") {
            Some(b) => self.lower_single(b),
            None => self.builder.push(NodeData::Block { stmts: Vec::new() }, self.span(n)),
        };
        self.pop_scope();
        self.builder.push(
            NodeData::For {
                init,
                cond,
                update,
                body,
            },
            self.span(n),
        )
    }

    fn lower_enhanced_for(&mut self, n: TsNode<'_>) -> NodeId {
        self.push_scope();
        let expr = match n.child_by_field_name("value") {
            Some(v) => self.lower_expr(v),
            None => self.lower_other(n),
        };
        let (modifiers, annotation_nodes) = self.modifiers(n);
        let annotations = self.lower_annotations(&annotation_nodes);
        let type_node = n.child_by_field_name("type");
        let var_type = type_node
            .filter(|t| self.text(*t) != "var")
            .map(|t| self.lower_type(t));
        let ty = match var_type {
            Some(t) => self.builder.type_of(t).cloned().unwrap_or(Type::Error),
            None => self.element_type(self.builder.type_of(expr).cloned()),
        };
        let name = n
            .child_by_field_name("name")
            .map(|x| self.text(x).to_string())
            .unwrap_or_default();
        let sym = self.new_local(&name, SymbolKind::Local, ty.clone(), modifiers, true);
        let var = self.builder.push(
            NodeData::Variable {
                name,
                modifiers,
                annotations,
                var_type,
                init: None,
            },
            type_node.map(|t| self.span(t)).unwrap_or(self.span(n)),
        );
        self.builder.set_symbol(var, sym);
        self.builder.set_type(var, ty);
        let body = match n.child_by_field_name("body") {
            Some(b) => self.lower_single(b),
            None => self.builder.push(NodeData::Block { stmts: Vec::new() }, self.span(n)),
        };
        self.pop_scope();
        self.builder
            .push(NodeData::EnhancedFor { var, expr, body }, self.span(n))
    }

    /// Element type of an array or `Iterable`.
    fn element_type(&self, ty: Option<Type>) -> Type {
        match ty {
            Some(Type::Array(elem)) => *elem,
            Some(t) => self
                .model
                .resolve_class("java.lang.Iterable")
                .and_then(|it| self.model.as_super(&t, it))
                .and_then(|view| view.type_args().first().cloned())
                .map(|a| self.model.upper_bound(&a))
                .unwrap_or(Type::Error),
            None => Type::Error,
        }
    }

    fn lower_try(&mut self, n: TsNode<'_>) -> NodeId {
        self.push_scope();
        let mut resources = Vec::new();
        if let Some(list) = n.child_by_field_name("resources") {
            for r in named(list) {
                resources.push(self.lower_resource(r));
            }
        }
        let body = match n.child_by_field_name("body") {
            Some(b) => self.lower_block(b),
            None => self.builder.push(NodeData::Block { stmts: Vec::new() }, self.span(n)),
        };
        let block = if resources.is_empty() {
            body
        } else {
            resources.push(body);
            self.builder
                .push(NodeData::Block { stmts: resources }, self.span(n))
        };
        self.pop_scope();

        let mut catches = Vec::new();
        let mut finally = None;
        for child in named(n) {
            match child.kind() {
                "catch_clause" => catches.push(self.lower_catch(child)),
                "finally_clause" => {
                    finally = child_of_kind(child, "block").map(|b| self.lower_block(b));
                }
                _ => {}
            }
        }
        self.builder.push(
            NodeData::Try {
                block,
                catches,
                finally,
            },
            self.span(n),
        )
    }

    fn lower_resource(&mut self, r: TsNode<'_>) -> NodeId {
        let Some(name) = r.child_by_field_name("name") else {
            return match named(r).first() {
                Some(e) => self.lower_expr(*e),
                None => self.lower_other(r),
            };
        };
        let var_type = r
            .child_by_field_name("type")
            .filter(|t| self.text(*t) != "var")
            .map(|t| self.lower_type(t));
        let init = r.child_by_field_name("value").map(|v| self.lower_expr(v));
        let ty = var_type
            .or(init)
            .and_then(|t| self.builder.type_of(t).cloned())
            .unwrap_or(Type::Error);
        let name = self.text(name).to_string();
        let modifiers = Modifiers::FINAL;
        let sym = self.new_local(&name, SymbolKind::Local, ty.clone(), modifiers, true);
        let id = self.builder.push(
            NodeData::Variable {
                name,
                modifiers,
                annotations: Vec::new(),
                var_type,
                init,
            },
            self.span(r),
        );
        self.builder.set_symbol(id, sym);
        self.builder.set_type(id, ty);
        id
    }

    fn lower_catch(&mut self, n: TsNode<'_>) -> NodeId {
        self.push_scope();
        let param_node = child_of_kind(n, "catch_formal_parameter");
        let param = match param_node {
            Some(p) => {
                let (modifiers, annotation_nodes) = self.modifiers(p);
                let annotations = self.lower_annotations(&annotation_nodes);
                let var_type = child_of_kind(p, "catch_type")
                    .and_then(|ct| named(ct).first().copied())
                    .map(|t| self.lower_type(t));
                let name = p
                    .child_by_field_name("name")
                    .map(|x| self.text(x).to_string())
                    .unwrap_or_default();
                self.parameter(p, name, modifiers, annotations, var_type)
            }
            None => self.lower_other(n),
        };
        let body = match n.child_by_field_name("body") {
            Some(b) => self.lower_block(b),
            None => self.builder.push(NodeData::Block { stmts: Vec::new() }, self.span(n)),
        };
        self.pop_scope();
        self.builder.push(NodeData::Catch { param, body }, self.span(n))
    }

    fn lower_switch(&mut self, n: TsNode<'_>) -> NodeId {
        let selector = match n.child_by_field_name("condition") {
            Some(c) => self.lower_expr(c),
            None => self.lower_other(n),
        };
        let mut body = Vec::new();
        if let Some(block) = n.child_by_field_name("body") {
            for group in named(block) {
                self.push_scope();
                let mut children = Vec::new();
                for part in named(group) {
                    match part.kind() {
                        "switch_label" => {
                            children.extend(named(part).into_iter().map(|e| self.lower_expr(e)))
                        }
                        "expression_statement" | "throw_statement" | "block" => {
                            children.extend(self.lower_statement(part))
                        }
                        k if EXPRESSION_KINDS.contains(&k) => children.push(self.lower_expr(part)),
                        _ => children.extend(self.lower_statement(part)),
                    }
                }
                self.pop_scope();
                body.push(self.builder.push(
                    NodeData::Other {
                        label: group.kind().to_string(),
                        children,
                    },
                    self.span(group),
                ));
            }
        }
        self.builder
            .push(NodeData::Switch { selector, body }, self.span(n))
    }

    /// Fallback for syntax without a typed form: keep the children.
    fn lower_other(&mut self, n: TsNode<'_>) -> NodeId {
        let children = named(n)
            .into_iter()
            .map(|c| {
                if c.kind().ends_with("statement") || c.kind() == "block" {
                    self.lower_single(c)
                } else if c.kind().ends_with("type") || c.kind() == "type_identifier" {
                    self.lower_type(c)
                } else {
                    self.lower_expr(c)
                }
            })
            .collect();
        self.builder.push(
            NodeData::Other {
                label: n.kind().to_string(),
                children,
            },
            self.span(n),
        )
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    pub(super) fn lower_expr(&mut self, n: TsNode<'_>) -> NodeId {
        let span = self.span(n);
        match n.kind() {
            "parenthesized_expression" | "condition" => match named(n).first() {
                Some(inner) => {
                    let expr = self.lower_expr(*inner);
                    let id = self.builder.push(NodeData::Parenthesized { expr }, span);
                    self.copy_type(expr, id);
                    id
                }
                None => self.lower_other(n),
            },
            "identifier" => self.lower_identifier(n),
            "this" => {
                let id = self.builder.ident("this", span);
                if let Some(c) = self.current_class() {
                    let ty = self.model.symbol(c).ty.clone();
                    self.builder.set_type(id, ty);
                }
                id
            }
            "super" => {
                let id = self.builder.ident("super", span);
                if let Some(sup) = self
                    .current_class()
                    .and_then(|c| self.model.class_info(c))
                    .map(|i| i.superclass.clone().unwrap_or_else(|| self.model.object_type()))
                {
                    self.builder.set_type(id, sup);
                }
                id
            }
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal" => match literal::integer(self.text(n), false) {
                Some(v) => self.builder.literal(v, span),
                None => self.lower_other(n),
            },
            "decimal_floating_point_literal" | "hex_floating_point_literal" => {
                match literal::floating(self.text(n)) {
                    Some(v) => self.builder.literal(v, span),
                    None => self.lower_other(n),
                }
            }
            "true" | "false" => self
                .builder
                .literal(ConstValue::Bool(n.kind() == "true"), span),
            "character_literal" => match literal::character(self.text(n)) {
                Some(v) => self.builder.literal(v, span),
                None => self.lower_other(n),
            },
            "string_literal" | "text_block" => match literal::string(self.text(n)) {
                Some(v) => {
                    let id = self.builder.literal(v, span);
                    self.builder.set_type(id, self.model.string_type());
                    id
                }
                None => self.lower_other(n),
            },
            "null_literal" => {
                let id = self.builder.push(NodeData::Literal(Literal::Null), span);
                self.builder.set_type(id, Type::Null);
                id
            }
            "binary_expression" => self.lower_binary(n),
            "unary_expression" => self.lower_unary(n),
            "update_expression" => self.lower_update(n),
            "assignment_expression" => self.lower_assignment(n),
            "ternary_expression" => self.lower_ternary(n),
            "cast_expression" => {
                let (Some(t), Some(v)) =
                    (n.child_by_field_name("type"), n.child_by_field_name("value"))
                else {
                    return self.lower_other(n);
                };
                let target = self.lower_type(t);
                let expr = self.lower_expr(v);
                let id = self.builder.push(NodeData::TypeCast { target, expr }, span);
                self.copy_type(target, id);
                id
            }
            "instanceof_expression" => self.lower_instanceof(n),
            "method_invocation" => self.lower_invocation(n),
            "object_creation_expression" => self.lower_new_class(n),
            "array_creation_expression" => self.lower_new_array(n),
            "array_initializer" => {
                let elems = named(n).into_iter().map(|e| self.lower_expr(e)).collect();
                self.builder.push(
                    NodeData::NewArray {
                        elem_type: None,
                        dims: Vec::new(),
                        elems,
                    },
                    span,
                )
            }
            "array_access" => {
                let (Some(a), Some(i)) =
                    (n.child_by_field_name("array"), n.child_by_field_name("index"))
                else {
                    return self.lower_other(n);
                };
                let array = self.lower_expr(a);
                let index = self.lower_expr(i);
                let id = self.builder.push(NodeData::ArrayAccess { array, index }, span);
                if let Some(Type::Array(elem)) = self.builder.type_of(array).cloned() {
                    self.builder.set_type(id, *elem);
                }
                id
            }
            "field_access" => self.lower_field_access(n),
            "lambda_expression" => self.lower_lambda(n),
            "switch_expression" => self.lower_switch(n),
            "type_identifier" | "scoped_type_identifier" | "generic_type" | "array_type"
            | "integral_type" | "floating_point_type" | "boolean_type" => self.lower_type(n),
            _ => self.lower_other(n),
        }
    }

    fn copy_type(&mut self, from: NodeId, to: NodeId) {
        if let Some(t) = self.builder.type_of(from).cloned() {
            self.builder.set_type(to, t);
        }
    }

    fn set_symbol_and_type(&mut self, id: NodeId, sym: SymbolId, ty: Type) {
        self.builder.set_symbol(id, sym);
        if ty != Type::Error {
            self.builder.set_type(id, ty);
        }
    }

    fn lower_identifier(&mut self, n: TsNode<'_>) -> NodeId {
        let name = self.text(n).to_string();
        let id = self.builder.ident(&name, self.span(n));
        if let Some(sym) = self.lookup_local(&name) {
            let ty = self.model.symbol(sym).ty.clone();
            self.set_symbol_and_type(id, sym, ty);
            return id;
        }
        for class in self.class_stack.clone().iter().rev() {
            if let Some(field) = self.model.find_field(*class, &name) {
                let ty = self.member_type(&self.model.symbol(*class).ty.clone(), field);
                self.set_symbol_and_type(id, field, ty);
                return id;
            }
        }
        for owner in self.static_import_owners(&name) {
            if let Some(field) = self.model.find_field(owner, &name) {
                let ty = self.model.symbol(field).ty.clone();
                self.set_symbol_and_type(id, field, ty);
                return id;
            }
        }
        if let Some(class) = self.resolve_type_name(&name) {
            self.set_symbol_and_type(id, class, Type::class(class));
        }
        id
    }

    /// Type of `member` accessed through a receiver of type `site`.
    fn member_type(&self, site: &Type, member: SymbolId) -> Type {
        let sym = self.model.symbol(member);
        let Some(owner) = sym.owner else {
            return sym.ty.clone();
        };
        match self.model.as_super(&self.model.upper_bound(site), owner) {
            Some(view) if !view.type_args().is_empty() => {
                self.model.substitute(&sym.ty, owner, view.type_args())
            }
            _ => sym.ty.clone(),
        }
    }

    fn lower_field_access(&mut self, n: TsNode<'_>) -> NodeId {
        let span = self.span(n);
        let (Some(object), Some(field)) =
            (n.child_by_field_name("object"), n.child_by_field_name("field"))
        else {
            return self.lower_other(n);
        };
        let expr = self.lower_expr(object);
        let name = self.text(field).to_string();
        let id = self.builder.push(
            NodeData::MemberSelect {
                expr,
                name: name.clone(),
            },
            span,
        );

        if name == "this" {
            // `Outer.this`
            if let Some(class) = self.builder.symbol_of(expr) {
                let ty = self.model.symbol(class).ty.clone();
                self.builder.set_type(id, ty);
            }
            return id;
        }
        let receiver_sym = self.builder.symbol_of(expr);
        let receiver_ty = self.builder.type_of(expr).cloned();
        match (receiver_sym, receiver_ty) {
            (Some(class), _) if self.model.symbol(class).is_class() => {
                if let Some(f) = self.model.find_field(class, &name) {
                    let ty = self.model.symbol(f).ty.clone();
                    self.set_symbol_and_type(id, f, ty);
                } else if let Some(nested) = self
                    .model
                    .resolve_class(&format!("{}.{name}", self.model.qualified_name(class)))
                {
                    self.set_symbol_and_type(id, nested, Type::class(nested));
                }
            }
            (_, Some(Type::Array(_))) if name == "length" => {
                self.builder.set_type(id, Type::Primitive(PrimitiveKind::Int));
            }
            (_, Some(site)) => {
                if let Some(class) = self.model.upper_bound(&site).class_sym()
                    && let Some(f) = self.model.find_field(class, &name)
                {
                    let ty = self.member_type(&site, f);
                    self.set_symbol_and_type(id, f, ty);
                }
            }
            (None, None) => {
                // a package-qualified class name such as `java.util.Objects`
                let qualified = self.compact_text(n);
                if let Some(class) = self.model.resolve_class(&qualified) {
                    self.set_symbol_and_type(id, class, Type::class(class));
                }
            }
            _ => {}
        }
        id
    }

    fn lower_binary(&mut self, n: TsNode<'_>) -> NodeId {
        let (Some(l), Some(r), Some(o)) = (
            n.child_by_field_name("left"),
            n.child_by_field_name("right"),
            n.child_by_field_name("operator"),
        ) else {
            return self.lower_other(n);
        };
        let Some(op) = BinaryOp::from_symbol(self.text(o)) else {
            return self.lower_other(n);
        };
        let lhs = self.lower_expr(l);
        let rhs = self.lower_expr(r);
        let id = self.builder.binary(op, lhs, rhs, self.span(n));
        let lt = self.builder.type_of(lhs).cloned();
        let rt = self.builder.type_of(rhs).cloned();
        if let Some(ty) = self.binary_type(op, lt.as_ref(), rt.as_ref()) {
            self.builder.set_type(id, ty);
        }
        id
    }

    fn binary_type(&self, op: BinaryOp, lt: Option<&Type>, rt: Option<&Type>) -> Option<Type> {
        use BinaryOp::*;
        let boolean = Type::Primitive(PrimitiveKind::Boolean);
        match op {
            And | Or | Lt | Gt | Le | Ge | Eq | Ne => return Some(boolean),
            _ => {}
        }
        let (lt, rt) = (lt?, rt?);
        let string = self.model.string_type();
        if op == Add && (self.model.same_type(lt, &string) || self.model.same_type(rt, &string)) {
            return Some(string);
        }
        let a = self.model.unboxed_or_self(lt)?;
        let b = self.model.unboxed_or_self(rt)?;
        if op.is_shift() {
            return unary_promotion(a).map(Type::Primitive);
        }
        if a == PrimitiveKind::Boolean && b == PrimitiveKind::Boolean {
            return matches!(op, BitAnd | BitOr | BitXor).then_some(boolean);
        }
        binary_promotion(a, b).map(Type::Primitive)
    }

    fn lower_unary(&mut self, n: TsNode<'_>) -> NodeId {
        let (Some(o), Some(operand_node)) = (
            n.child_by_field_name("operator"),
            n.child_by_field_name("operand"),
        ) else {
            return self.lower_other(n);
        };
        let op = match self.text(o) {
            "+" => UnaryOp::Plus,
            "-" => UnaryOp::Minus,
            "~" => UnaryOp::BitNot,
            "!" => UnaryOp::Not,
            _ => return self.lower_other(n),
        };
        // `-2147483648` is only legal as a single negated literal
        if op == UnaryOp::Minus
            && operand_node.kind() == "decimal_integer_literal"
            && literal::integer(self.text(operand_node), false).is_none()
            && let Some(v) = literal::integer(self.text(operand_node), true)
        {
            return self.builder.literal(v, self.span(n));
        }
        let operand = self.lower_expr(operand_node);
        let id = self
            .builder
            .push(NodeData::Unary { op, operand }, self.span(n));
        let operand_ty = self.builder.type_of(operand).cloned();
        let ty = match op {
            UnaryOp::Not => Some(Type::Primitive(PrimitiveKind::Boolean)),
            _ => operand_ty
                .and_then(|t| self.model.unboxed_or_self(&t))
                .and_then(unary_promotion)
                .map(Type::Primitive),
        };
        if let Some(ty) = ty {
            self.builder.set_type(id, ty);
        }
        id
    }

    fn lower_update(&mut self, n: TsNode<'_>) -> NodeId {
        let mut cursor = n.walk();
        let children: Vec<_> = n.children(&mut cursor).collect();
        let Some(operand_node) = children.iter().find(|c| c.is_named()).copied() else {
            return self.lower_other(n);
        };
        let prefix = children.first().is_some_and(|c| !c.is_named());
        let increment = children.iter().any(|c| c.kind() == "++");
        let op = match (prefix, increment) {
            (true, true) => UnaryOp::PreIncrement,
            (true, false) => UnaryOp::PreDecrement,
            (false, true) => UnaryOp::PostIncrement,
            (false, false) => UnaryOp::PostDecrement,
        };
        let operand = self.lower_expr(operand_node);
        let id = self
            .builder
            .push(NodeData::Unary { op, operand }, self.span(n));
        self.copy_type(operand, id);
        id
    }

    fn lower_assignment(&mut self, n: TsNode<'_>) -> NodeId {
        let (Some(l), Some(r), Some(o)) = (
            n.child_by_field_name("left"),
            n.child_by_field_name("right"),
            n.child_by_field_name("operator"),
        ) else {
            return self.lower_other(n);
        };
        let op_text = self.text(o).to_string();
        let target = self.lower_expr(l);
        let value = self.lower_expr(r);
        let data = if op_text == "=" {
            NodeData::Assignment { target, value }
        } else {
            match op_text.strip_suffix('=').and_then(BinaryOp::from_symbol) {
                Some(op) => NodeData::CompoundAssignment { op, target, value },
                None => return self.lower_other(n),
            }
        };
        let id = self.builder.push(data, self.span(n));
        self.copy_type(target, id);
        id
    }

    fn lower_ternary(&mut self, n: TsNode<'_>) -> NodeId {
        let (Some(c), Some(t), Some(e)) = (
            n.child_by_field_name("condition"),
            n.child_by_field_name("consequence"),
            n.child_by_field_name("alternative"),
        ) else {
            return self.lower_other(n);
        };
        let cond = self.lower_expr(c);
        let then_expr = self.lower_expr(t);
        let else_expr = self.lower_expr(e);
        let id = self.builder.push(
            NodeData::Conditional {
                cond,
                then_expr,
                else_expr,
            },
            self.span(n),
        );
        let tt = self.builder.type_of(then_expr).cloned();
        let et = self.builder.type_of(else_expr).cloned();
        let ty = match (tt, et) {
            (Some(a), Some(b)) if self.model.same_type(&a, &b) => Some(a),
            (Some(Type::Null), Some(b)) => Some(b),
            (Some(a), Some(Type::Null)) => Some(a),
            (Some(a), Some(b)) => {
                match (self.model.unboxed_or_self(&a), self.model.unboxed_or_self(&b)) {
                    (Some(x), Some(y)) if x.is_numeric() && y.is_numeric() => {
                        binary_promotion(x, y).map(Type::Primitive)
                    }
                    _ => Some(a),
                }
            }
            (a, _) => a,
        };
        if let Some(ty) = ty {
            self.builder.set_type(id, ty);
        }
        id
    }

    fn lower_instanceof(&mut self, n: TsNode<'_>) -> NodeId {
        let (Some(l), Some(r)) = (n.child_by_field_name("left"), n.child_by_field_name("right"))
        else {
            return self.lower_other(n);
        };
        let expr = self.lower_expr(l);
        let target = self.lower_type(r);
        if let Some(binding) = n.child_by_field_name("name") {
            let ty = self.builder.type_of(target).cloned().unwrap_or(Type::Error);
            let name = self.text(binding).to_string();
            self.new_local(&name, SymbolKind::Local, ty, Modifiers::NONE, true);
        }
        let id = self
            .builder
            .push(NodeData::InstanceOf { expr, target }, self.span(n));
        self.builder
            .set_type(id, Type::Primitive(PrimitiveKind::Boolean));
        id
    }

    fn lower_arguments(&mut self, n: TsNode<'_>) -> Vec<NodeId> {
        n.child_by_field_name("arguments")
            .map(|list| {
                named(list)
                    .into_iter()
                    .map(|a| self.lower_expr(a))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lower_invocation(&mut self, n: TsNode<'_>) -> NodeId {
        let Some(name_node) = n.child_by_field_name("name") else {
            return self.lower_other(n);
        };
        let name = self.text(name_node).to_string();
        let receiver = n.child_by_field_name("object").map(|o| self.lower_expr(o));
        let args = self.lower_arguments(n);
        let arg_types: Vec<Option<Type>> = args
            .iter()
            .map(|a| self.builder.type_of(*a).cloned())
            .collect();

        let id = self.builder.push(
            NodeData::MethodInvocation {
                receiver,
                name: name.clone(),
                args,
            },
            self.span(n),
        );

        let sites: Vec<(Type, bool)> = match receiver {
            Some(r) => match (self.builder.symbol_of(r), self.builder.type_of(r)) {
                (Some(s), _) if self.model.symbol(s).is_class() => vec![(Type::class(s), true)],
                (_, Some(t)) => vec![(t.clone(), false)],
                _ => Vec::new(),
            },
            None => {
                let mut sites: Vec<(Type, bool)> = self
                    .class_stack
                    .iter()
                    .rev()
                    .map(|c| (self.model.symbol(*c).ty.clone(), false))
                    .collect();
                sites.extend(
                    self.static_import_owners(&name)
                        .into_iter()
                        .map(|o| (Type::class(o), true)),
                );
                sites
            }
        };
        for (site, static_only) in sites {
            if let Some(method) = self.select_method(&site, &name, &arg_types, static_only) {
                let ty = self.member_type(&site, method);
                self.set_symbol_and_type(id, method, ty);
                break;
            }
        }
        id
    }

    /// Pick the first applicable overload, nearest declaring class first.
    fn select_method(
        &self,
        site: &Type,
        name: &str,
        arg_types: &[Option<Type>],
        static_only: bool,
    ) -> Option<SymbolId> {
        let candidates = self.model.find_matching_methods(site, name, |m| {
            m.params.len() == arg_types.len() && (!static_only || m.is_static())
        });
        let applicable = |m: SymbolId| {
            let params = &self.model.symbol(m).params;
            params
                .iter()
                .zip(arg_types)
                .all(|(p, a)| a.as_ref().is_none_or(|a| self.is_assignable(a, p)))
        };
        candidates
            .iter()
            .copied()
            .find(|m| applicable(*m))
            .or_else(|| candidates.first().copied())
    }

    fn is_assignable(&self, from: &Type, to: &Type) -> bool {
        if from.contains_error() || to.contains_error() {
            return true;
        }
        let to = self.model.erasure(to);
        let from_erased = self.model.erasure(from);
        if self.model.is_subtype(&from_erased, &to) {
            return true;
        }
        // boxing and unboxing
        match (from, &to) {
            (Type::Primitive(p), _) => self
                .model
                .boxed_type(*p)
                .is_some_and(|b| self.model.is_subtype(&b, &to)),
            (_, Type::Primitive(q)) => self
                .model
                .unboxed_type(from)
                .is_some_and(|p| crate::model::is_widening(p, *q)),
            _ => false,
        }
    }

    fn lower_new_class(&mut self, n: TsNode<'_>) -> NodeId {
        let Some(type_node) = n.child_by_field_name("type") else {
            return self.lower_other(n);
        };
        let class_type = self.lower_type(type_node);
        let ty = self.builder.type_of(class_type).cloned();
        let args = self.lower_arguments(n);
        let arg_types: Vec<Option<Type>> = args
            .iter()
            .map(|a| self.builder.type_of(*a).cloned())
            .collect();
        let body = child_of_kind(n, "class_body").map(|b| {
            let base = ty.clone().unwrap_or(Type::Error);
            self.lower_anonymous_class(b, &base)
        });
        let id = self.builder.push(
            NodeData::NewClass {
                class_type,
                args,
                body,
            },
            self.span(n),
        );
        if let Some(ty) = ty {
            if let Some(class) = ty.class_sym()
                && let Some(ctor) = self.select_constructor(class, &arg_types)
            {
                self.builder.set_symbol(id, ctor);
            }
            self.builder.set_type(id, ty);
        }
        id
    }

    fn select_constructor(&self, class: SymbolId, arg_types: &[Option<Type>]) -> Option<SymbolId> {
        let candidates: Vec<SymbolId> = self
            .model
            .members_named(class, "<init>")
            .filter(|c| self.model.symbol(*c).params.len() == arg_types.len())
            .collect();
        candidates
            .iter()
            .find(|c| {
                self.model
                    .symbol(**c)
                    .params
                    .iter()
                    .zip(arg_types)
                    .all(|(p, a)| a.as_ref().is_none_or(|a| self.is_assignable(a, p)))
            })
            .or_else(|| candidates.first())
            .copied()
    }

    /// Declare and lower the body of `new T() { ... }` as a nameless class.
    fn lower_anonymous_class(&mut self, body: TsNode<'_>, base: &Type) -> NodeId {
        let outer = self.current_class();
        let qualified = self.anonymous_name(outer);
        let sym = self
            .model
            .add_class(&qualified, ClassKind::Class, Modifiers::FINAL);
        self.model.symbol_mut(sym).owner = outer;
        match base.class_sym() {
            Some(b) if self.model.symbol(b).is_interface() => {
                self.model.add_interface(sym, base.clone());
            }
            Some(_) => self.model.set_superclass(sym, base.clone()),
            None => {}
        }
        for member in body_members(body) {
            if is_type_declaration(member.kind()) {
                self.declare_class(member, Some(sym));
            }
        }
        self.enter_class(sym);
        self.define_members(body, sym);
        let mut members = Vec::new();
        for member in body_members(body) {
            members.extend(self.lower_member(member));
        }
        self.leave_class();

        let id = self.builder.push(
            NodeData::Class {
                name: String::new(),
                class_kind: ClassKind::Class,
                modifiers: Modifiers::FINAL,
                annotations: Vec::new(),
                extends: None,
                implements: Vec::new(),
                members,
            },
            self.span(body),
        );
        self.builder.set_symbol(id, sym);
        self.builder.set_type(id, Type::class(sym));
        id
    }

    fn lower_new_array(&mut self, n: TsNode<'_>) -> NodeId {
        let elem_type = n.child_by_field_name("type").map(|t| self.lower_type(t));
        let dims: Vec<NodeId> = field_all(n, "dimensions")
            .into_iter()
            .filter(|d| d.kind() == "dimensions_expr")
            .filter_map(|d| named(d).first().copied())
            .map(|e| self.lower_expr(e))
            .collect();
        let extra = field_all(n, "dimensions")
            .into_iter()
            .filter(|d| d.kind() == "dimensions")
            .map(|d| dimension_count(Some(d)))
            .sum::<usize>();
        let elems = match n.child_by_field_name("value") {
            Some(init) => named(init).into_iter().map(|e| self.lower_expr(e)).collect(),
            None => Vec::new(),
        };
        let rank = dims.len() + extra;
        let ty = elem_type
            .and_then(|t| self.builder.type_of(t).cloned())
            .map(|t| array_of(t, rank.max(1)));
        let id = self.builder.push(
            NodeData::NewArray {
                elem_type,
                dims,
                elems,
            },
            self.span(n),
        );
        if let Some(ty) = ty {
            self.builder.set_type(id, ty);
        }
        id
    }

    fn lower_lambda(&mut self, n: TsNode<'_>) -> NodeId {
        self.push_scope();
        let params = match n.child_by_field_name("parameters") {
            Some(p) if p.kind() == "identifier" => {
                let name = self.text(p).to_string();
                vec![self.parameter(p, name, Modifiers::NONE, Vec::new(), None)]
            }
            Some(p) => self.lower_parameters(p),
            None => Vec::new(),
        };
        let body = match n.child_by_field_name("body") {
            Some(b) if b.kind() == "block" => self.lower_block(b),
            Some(b) => self.lower_expr(b),
            None => self.builder.push(NodeData::Block { stmts: Vec::new() }, self.span(n)),
        };
        self.pop_scope();
        self.builder
            .push(NodeData::Lambda { params, body }, self.span(n))
    }
}

fn unary_promotion(p: PrimitiveKind) -> Option<PrimitiveKind> {
    use PrimitiveKind::*;
    match p {
        Byte | Short | Char | Int => Some(Int),
        Long | Float | Double => Some(p),
        Boolean => None,
    }
}

fn binary_promotion(a: PrimitiveKind, b: PrimitiveKind) -> Option<PrimitiveKind> {
    use PrimitiveKind::*;
    if !a.is_numeric() || !b.is_numeric() {
        return None;
    }
    Some(if a == Double || b == Double {
        Double
    } else if a == Float || b == Float {
        Float
    } else if a == Long || b == Long {
        Long
    } else {
        Int
    })
}
