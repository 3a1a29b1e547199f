//! Frontend state: imports, scopes and type-name resolution.

use crate::model::{Modifiers, SemanticModel, Symbol, SymbolId, SymbolKind, Type};
use crate::tree::{ClassKind, PrimitiveKind, Span, TreeBuilder};
use std::collections::HashMap;

pub(super) type TsNode<'t> = tree_sitter::Node<'t>;

/// Named children, comments excluded.
pub(super) fn named<'t>(n: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = n.walk();
    n.named_children(&mut cursor)
        .filter(|c| !c.kind().ends_with("comment"))
        .collect()
}

/// All children (named or not) carrying the given field name.
pub(super) fn field_all<'t>(n: TsNode<'t>, field: &str) -> Vec<TsNode<'t>> {
    let mut cursor = n.walk();
    n.children_by_field_name(field, &mut cursor).collect()
}

pub(super) fn child_of_kind<'t>(n: TsNode<'t>, kind: &str) -> Option<TsNode<'t>> {
    named(n).into_iter().find(|c| c.kind() == kind)
}

/// Count of `[]` pairs in a `dimensions` node.
pub(super) fn dimension_count(n: Option<TsNode<'_>>) -> usize {
    let Some(n) = n else { return 0 };
    let mut cursor = n.walk();
    n.children(&mut cursor).filter(|c| c.kind() == "[").count()
}

pub(super) fn array_of(mut ty: Type, dims: usize) -> Type {
    for _ in 0..dims {
        ty = Type::array_of(ty);
    }
    ty
}

pub(super) struct Frontend<'s> {
    pub(super) src: &'s str,
    pub(super) model: SemanticModel,
    pub(super) builder: TreeBuilder,
    pub(super) package: String,
    imports: HashMap<String, String>,
    on_demand: Vec<String>,
    static_imports: HashMap<String, String>,
    static_on_demand: Vec<String>,
    /// tree-sitter node id of a type declaration to its class symbol.
    pub(super) classes: HashMap<usize, SymbolId>,
    /// tree-sitter node id of a method or field declarator to its symbol.
    pub(super) members: HashMap<usize, SymbolId>,
    pub(super) class_stack: Vec<SymbolId>,
    pub(super) method_stack: Vec<SymbolId>,
    type_vars: Vec<HashMap<String, Type>>,
    local_types: Vec<HashMap<String, SymbolId>>,
    scopes: Vec<HashMap<String, SymbolId>>,
    /// Locals and parameters, with whether they were declared with an initializer.
    pub(super) locals: Vec<(SymbolId, bool)>,
    anonymous: HashMap<SymbolId, usize>,
}

impl<'s> Frontend<'s> {
    pub(super) fn new(src: &'s str, model: SemanticModel) -> Self {
        Self {
            src,
            model,
            builder: TreeBuilder::new(src),
            package: String::new(),
            imports: HashMap::new(),
            on_demand: Vec::new(),
            static_imports: HashMap::new(),
            static_on_demand: Vec::new(),
            classes: HashMap::new(),
            members: HashMap::new(),
            class_stack: Vec::new(),
            method_stack: Vec::new(),
            type_vars: Vec::new(),
            local_types: Vec::new(),
            scopes: Vec::new(),
            locals: Vec::new(),
            anonymous: HashMap::new(),
        }
    }

    pub(super) fn text(&self, n: TsNode<'_>) -> &'s str {
        self.src.get(n.start_byte()..n.end_byte()).unwrap_or("")
    }

    /// Source text with whitespace and comments between tokens removed,
    /// for dotted names split across lines.
    pub(super) fn compact_text(&self, n: TsNode<'_>) -> String {
        self.text(n).chars().filter(|c| !c.is_whitespace()).collect()
    }

    pub(super) fn span(&self, n: TsNode<'_>) -> Span {
        Span::new(n.start_byte(), n.end_byte())
    }

    // ------------------------------------------------------------------
    // Package and imports
    // ------------------------------------------------------------------

    pub(super) fn read_header(&mut self, root: TsNode<'_>) {
        for child in named(root) {
            match child.kind() {
                "package_declaration" => {
                    if let Some(name) = named(child)
                        .into_iter()
                        .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"))
                    {
                        self.package = self.compact_text(name);
                    }
                }
                "import_declaration" => self.read_import(child),
                _ => {}
            }
        }
    }

    /// `(qualified name, is_static, is_on_demand)` of an import declaration.
    pub(super) fn import_parts(&self, n: TsNode<'_>) -> (String, bool, bool) {
        let mut cursor = n.walk();
        let children: Vec<_> = n.children(&mut cursor).collect();
        let is_static = children.iter().any(|c| c.kind() == "static");
        let on_demand = children.iter().any(|c| c.kind() == "asterisk");
        let name = children
            .iter()
            .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"))
            .map(|c| self.compact_text(*c))
            .unwrap_or_default();
        (name, is_static, on_demand)
    }

    fn read_import(&mut self, n: TsNode<'_>) {
        let (name, is_static, on_demand) = self.import_parts(n);
        if name.is_empty() {
            return;
        }
        match (is_static, on_demand) {
            (false, false) => {
                let simple = name.rsplit('.').next().unwrap_or(&name).to_string();
                self.imports.insert(simple, name);
            }
            (false, true) => self.on_demand.push(name),
            (true, false) => {
                if let Some((owner, member)) = name.rsplit_once('.') {
                    self.static_imports
                        .insert(member.to_string(), owner.to_string());
                }
            }
            (true, true) => self.static_on_demand.push(name),
        }
    }

    /// Owner classes that may supply a statically imported member `name`.
    pub(super) fn static_import_owners(&self, name: &str) -> Vec<SymbolId> {
        let mut out = Vec::new();
        if let Some(owner) = self.static_imports.get(name)
            && let Some(sym) = self.model.resolve_class(owner)
        {
            out.push(sym);
        }
        for owner in &self.static_on_demand {
            if let Some(sym) = self.model.resolve_class(owner) {
                out.push(sym);
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------

    pub(super) fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
        self.local_types.push(HashMap::new());
    }

    pub(super) fn pop_scope(&mut self) {
        self.scopes.pop();
        self.local_types.pop();
    }

    pub(super) fn declare_local(&mut self, name: &str, sym: SymbolId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), sym);
        }
    }

    pub(super) fn declare_local_type(&mut self, name: &str, sym: SymbolId) {
        if let Some(scope) = self.local_types.last_mut() {
            scope.insert(name.to_string(), sym);
        }
    }

    pub(super) fn lookup_local(&self, name: &str) -> Option<SymbolId> {
        self.scopes.iter().rev().find_map(|s| s.get(name).copied())
    }

    /// Create a local variable or parameter symbol and bring it into scope.
    pub(super) fn new_local(
        &mut self,
        name: &str,
        kind: SymbolKind,
        ty: Type,
        modifiers: Modifiers,
        has_init: bool,
    ) -> SymbolId {
        let mut sym = Symbol::new(name, kind, ty).with_modifiers(modifiers);
        sym.owner = self.method_stack.last().copied();
        let id = self.model.add_symbol(sym);
        self.declare_local(name, id);
        self.locals.push((id, has_init));
        id
    }

    /// Enter a class body: its type parameters come into scope.
    pub(super) fn enter_class(&mut self, class: SymbolId) {
        self.class_stack.push(class);
        let mut frame = HashMap::new();
        if let Some(info) = self.model.class_info(class) {
            for (index, p) in info.type_params.iter().enumerate() {
                frame.insert(
                    p.name.clone(),
                    Type::TypeVar {
                        owner: class,
                        index,
                        name: p.name.clone(),
                    },
                );
            }
        }
        self.type_vars.push(frame);
    }

    pub(super) fn leave_class(&mut self) {
        self.class_stack.pop();
        self.type_vars.pop();
    }

    pub(super) fn push_type_vars(&mut self, vars: HashMap<String, Type>) {
        self.type_vars.push(vars);
    }

    pub(super) fn pop_type_vars(&mut self) {
        self.type_vars.pop();
    }

    pub(super) fn insert_type_var(&mut self, name: &str, ty: Type) {
        if let Some(frame) = self.type_vars.last_mut() {
            frame.insert(name.to_string(), ty);
        }
    }

    pub(super) fn current_class(&self) -> Option<SymbolId> {
        self.class_stack.last().copied()
    }

    /// Next `Outer$N` name for an anonymous class inside `outer`.
    pub(super) fn anonymous_name(&mut self, outer: Option<SymbolId>) -> String {
        let base = outer
            .map(|o| self.model.qualified_name(o))
            .unwrap_or_else(|| self.qualify(""));
        let key = outer.unwrap_or(SymbolId(0));
        let counter = self.anonymous.entry(key).or_default();
        *counter += 1;
        format!("{base}${counter}")
    }

    pub(super) fn qualify(&self, simple: &str) -> String {
        if self.package.is_empty() {
            simple.to_string()
        } else {
            format!("{}.{simple}", self.package)
        }
    }

    // ------------------------------------------------------------------
    // Type names
    // ------------------------------------------------------------------

    /// Resolve a possibly dotted type name as written in source.
    pub(super) fn resolve_type_name(&self, name: &str) -> Option<SymbolId> {
        let name = name.split('<').next().unwrap_or(name).trim();
        if let Some((head, rest)) = name.split_once('.') {
            if let Some(sym) = self.model.resolve_class(name) {
                return Some(sym);
            }
            // `Outer.Inner` where `Outer` is itself resolvable
            let outer = self.resolve_type_name(head)?;
            let qualified = format!("{}.{rest}", self.model.qualified_name(outer));
            return self.model.resolve_class(&qualified);
        }

        for scope in self.local_types.iter().rev() {
            if let Some(sym) = scope.get(name) {
                return Some(*sym);
            }
        }
        for class in self.class_stack.iter().rev() {
            if self.model.symbol(*class).name == name {
                return Some(*class);
            }
            if let Some(member) = self.member_class(*class, name) {
                return Some(member);
            }
        }
        if let Some(sym) = self.model.resolve_class(&self.qualify(name)) {
            return Some(sym);
        }
        if let Some(qualified) = self.imports.get(name) {
            return self.model.resolve_class(qualified);
        }
        if let Some(sym) = self.model.resolve_class(&format!("java.lang.{name}")) {
            return Some(sym);
        }
        self.on_demand
            .iter()
            .find_map(|pkg| self.model.resolve_class(&format!("{pkg}.{name}")))
    }

    /// Member class `name` declared in `class` or inherited from a supertype.
    fn member_class(&self, class: SymbolId, name: &str) -> Option<SymbolId> {
        self.model.closure(&Type::class(class)).iter().find_map(|t| {
            let owner = t.class_sym()?;
            let qualified = format!("{}.{name}", self.model.qualified_name(owner));
            self.model.resolve_class(&qualified)
        })
    }

    /// Resolve an annotation type, declaring an annotation stub for names the
    /// model does not know so that presence checks still work.
    pub(super) fn annotation_symbol(&mut self, written: &str) -> SymbolId {
        if let Some(sym) = self.resolve_type_name(written) {
            return sym;
        }
        let qualified = if written.contains('.') {
            written.to_string()
        } else if let Some(q) = self.imports.get(written) {
            q.clone()
        } else {
            self.qualify(written)
        };
        self.model
            .add_class(&qualified, ClassKind::Annotation, Modifiers::PUBLIC)
    }

    /// Type denoted by a type node. Unresolvable names give [`Type::Error`].
    pub(super) fn resolve_type(&self, n: TsNode<'_>) -> Type {
        match n.kind() {
            "integral_type" | "floating_point_type" | "boolean_type" => {
                PrimitiveKind::from_keyword(self.text(n).trim())
                    .map(Type::Primitive)
                    .unwrap_or(Type::Error)
            }
            "void_type" => Type::Void,
            "type_identifier" | "identifier" | "scoped_type_identifier" | "scoped_identifier" => {
                let name = self.compact_text(n);
                if let Some(tv) = self.lookup_type_var(&name) {
                    return tv;
                }
                self.resolve_type_name(&name)
                    .map(Type::class)
                    .unwrap_or(Type::Error)
            }
            "generic_type" => {
                let parts = named(n);
                let Some(base) = parts.first() else {
                    return Type::Error;
                };
                let Some(sym) = self.resolve_type_name(&self.compact_text(*base)) else {
                    return Type::Error;
                };
                let args: Vec<Type> = parts
                    .iter()
                    .filter(|p| p.kind() == "type_arguments")
                    .flat_map(|p| named(*p))
                    .map(|a| self.resolve_type(a))
                    .collect();
                Type::generic(sym, args)
            }
            "array_type" => {
                let elem = n
                    .child_by_field_name("element")
                    .map(|e| self.resolve_type(e))
                    .unwrap_or(Type::Error);
                array_of(elem, dimension_count(n.child_by_field_name("dimensions")).max(1))
            }
            "wildcard" => {
                let mut cursor = n.walk();
                let is_super = n.children(&mut cursor).any(|c| c.kind() == "super");
                let bound = named(n)
                    .into_iter()
                    .rfind(|c| c.kind() != "annotation" && c.kind() != "marker_annotation");
                match (bound, is_super) {
                    (Some(b), false) => Type::Wildcard(Some(Box::new(self.resolve_type(b)))),
                    _ => Type::Wildcard(None),
                }
            }
            "annotated_type" => named(n)
                .into_iter()
                .rfind(|c| c.kind() != "annotation" && c.kind() != "marker_annotation")
                .map(|t| self.resolve_type(t))
                .unwrap_or(Type::Error),
            _ => Type::Error,
        }
    }

    fn lookup_type_var(&self, name: &str) -> Option<Type> {
        self.type_vars
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).cloned())
    }

    /// Declaration modifiers and the annotation nodes among them.
    pub(super) fn modifiers<'t>(&self, decl: TsNode<'t>) -> (Modifiers, Vec<TsNode<'t>>) {
        let mut mods = Modifiers::NONE;
        let mut annotations = Vec::new();
        let Some(list) = child_of_kind(decl, "modifiers") else {
            return (mods, annotations);
        };
        let mut cursor = list.walk();
        for child in list.children(&mut cursor) {
            match child.kind() {
                "annotation" | "marker_annotation" => annotations.push(child),
                kw => {
                    if let Some(m) = Modifiers::from_keyword(kw) {
                        mods.insert(m);
                    }
                }
            }
        }
        (mods, annotations)
    }

    /// Annotation type symbols for a list of annotation nodes.
    pub(super) fn annotation_symbols(&mut self, annotations: &[TsNode<'_>]) -> Vec<SymbolId> {
        annotations
            .iter()
            .filter_map(|a| a.child_by_field_name("name"))
            .map(|name| self.compact_text(name))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|written| self.annotation_symbol(&written))
            .collect()
    }
}
