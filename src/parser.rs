//! tree-sitter-java frontend: parse, declare, lower, then settle constants
//! and effective finality.

mod declare;
mod literal;
mod lower;
mod resolve;

use crate::analysis::constant_value;
use crate::error::{ClippyResult, JavaClippyError};
use crate::model::{SemanticModel, SymbolId, SymbolKind, Type};
use crate::tree::{ConstValue, NodeData, PrimitiveKind, TypedTree, UnaryOp};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tree_sitter::{Language, Parser, Tree};

/// Passes of constant folding over `final` variables; a constant may refer to
/// one declared later in the file.
const CONSTANT_PASSES: usize = 2;

fn java_language() -> Language {
    tree_sitter_java::language()
}

/// Raw tree-sitter parse, used by the fix verifier.
pub fn parse_java(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(java_language())
        .context("failed to load Java grammar")?;

    parser
        .parse(source, None)
        .context("tree-sitter failed to parse source")
}

/// A compilation unit with its resolved model.
#[derive(Debug)]
pub struct ParsedUnit {
    pub tree: TypedTree,
    pub model: SemanticModel,
}

/// Parse and attribute a single compilation unit. Only this file and the
/// built-in JDK declarations are visible to name resolution; anything else
/// stays unresolved and checkers stay quiet about it.
pub fn parse_unit(source: &str, path: Option<&Path>) -> ClippyResult<ParsedUnit> {
    let ts_tree = parse_java(source).map_err(|e| JavaClippyError::parse(format!("{e:#}")))?;
    let root = ts_tree.root_node();
    if root.has_error() {
        tracing::debug!(
            path = ?path,
            errors = count_error_nodes(root),
            "source has syntax errors; lowering what parsed"
        );
    }

    let mut frontend = resolve::Frontend::new(source, SemanticModel::with_jdk_stubs());
    frontend.declare_unit(root);
    let unit = frontend.lower_unit(root);
    let locals = std::mem::take(&mut frontend.locals);
    let mut model = frontend.model;
    let mut builder = frontend.builder;
    if let Some(path) = path {
        builder = builder.with_path(path);
    }
    let tree = builder.finish(unit);

    settle_effective_finality(&tree, &mut model, &locals);
    for _ in 0..CONSTANT_PASSES {
        if !settle_constants(&tree, &mut model) {
            break;
        }
    }
    Ok(ParsedUnit { tree, model })
}

fn count_error_nodes(node: tree_sitter::Node<'_>) -> usize {
    let mut count = usize::from(node.is_error() || node.is_missing());
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        count += count_error_nodes(child);
    }
    count
}

/// A local is effectively final when it is never assigned after its
/// declaration, or, without an initializer, assigned exactly once.
fn settle_effective_finality(
    tree: &TypedTree,
    model: &mut SemanticModel,
    locals: &[(SymbolId, bool)],
) {
    let mut writes: HashMap<SymbolId, usize> = HashMap::new();
    for node in tree.preorder() {
        let target = match node.data() {
            NodeData::Assignment { target, .. } | NodeData::CompoundAssignment { target, .. } => {
                *target
            }
            NodeData::Unary { op, operand } if is_increment(*op) => *operand,
            _ => continue,
        };
        if let Some(sym) = tree.node(target).skip_parens().symbol() {
            *writes.entry(sym).or_default() += 1;
        }
    }
    for (sym, has_init) in locals {
        let count = writes.get(sym).copied().unwrap_or(0);
        let symbol = model.symbol_mut(*sym);
        symbol.effectively_final = count == 0 || (!has_init && count == 1);
    }
}

fn is_increment(op: UnaryOp) -> bool {
    matches!(
        op,
        UnaryOp::PreIncrement
            | UnaryOp::PostIncrement
            | UnaryOp::PreDecrement
            | UnaryOp::PostDecrement
    )
}

/// Record the value of each `final` variable whose initializer is a constant
/// expression. Returns whether any new constant was found.
fn settle_constants(tree: &TypedTree, model: &mut SemanticModel) -> bool {
    let mut found = Vec::new();
    for node in tree.preorder() {
        let NodeData::Variable {
            init: Some(init), ..
        } = node.data()
        else {
            continue;
        };
        let Some(sym) = node.symbol() else { continue };
        let symbol = model.symbol(sym);
        if symbol.constant.is_some()
            || !symbol.is_final()
            || !matches!(symbol.kind, SymbolKind::Field | SymbolKind::Local)
        {
            continue;
        }
        let declared = symbol.ty.clone();
        let Some(value) = constant_value(tree.node(*init), model) else {
            continue;
        };
        if let Some(value) = coerce_to_declared(value, &declared, model) {
            found.push((sym, value));
        }
    }
    let changed = !found.is_empty();
    for (sym, value) in found {
        model.symbol_mut(sym).constant = Some(value);
    }
    changed
}

/// Assignment conversion of a constant to the declared variable type.
fn coerce_to_declared(
    value: ConstValue,
    declared: &Type,
    model: &SemanticModel,
) -> Option<ConstValue> {
    use PrimitiveKind::*;
    let kind = match declared {
        Type::Primitive(p) => *p,
        t if model.same_type(t, &model.string_type()) => {
            return matches!(value, ConstValue::Str(_)).then_some(value);
        }
        _ => return None,
    };
    let integral = match &value {
        ConstValue::Int(v) => Some(*v as i64),
        ConstValue::Long(v) => Some(*v),
        ConstValue::Char(c) => Some(*c as i64),
        _ => None,
    };
    let in_range = |lo: i64, hi: i64| integral.filter(|v| (lo..=hi).contains(v));
    Some(match (kind, value) {
        (Boolean, v @ ConstValue::Bool(_)) => v,
        (Byte, ConstValue::Int(_) | ConstValue::Char(_)) => {
            ConstValue::Int(in_range(i8::MIN as i64, i8::MAX as i64)? as i32)
        }
        (Short, ConstValue::Int(_) | ConstValue::Char(_)) => {
            ConstValue::Int(in_range(i16::MIN as i64, i16::MAX as i64)? as i32)
        }
        (Char, v @ ConstValue::Char(_)) => v,
        (Char, ConstValue::Int(_)) => ConstValue::Char(in_range(0, u16::MAX as i64)? as u16),
        (Int, ConstValue::Int(_) | ConstValue::Char(_)) => ConstValue::Int(integral? as i32),
        (Long, ConstValue::Int(_) | ConstValue::Char(_) | ConstValue::Long(_)) => {
            ConstValue::Long(integral?)
        }
        (Float, v @ ConstValue::Float(_)) | (Double, v @ ConstValue::Double(_)) => v,
        (Double, ConstValue::Float(bits)) => ConstValue::double(f32::from_bits(bits) as f64),
        (Float | Double, ConstValue::Str(_) | ConstValue::Bool(_)) => return None,
        (Float, _) => ConstValue::float(integral? as f32),
        (Double, _) => ConstValue::double(integral? as f64),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeKind;

    fn contains_error_node(node: tree_sitter::Node) -> bool {
        if node.kind() == "ERROR" {
            return true;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if contains_error_node(child) {
                return true;
            }
        }
        false
    }

    fn find<'t>(unit: &'t ParsedUnit, text: &str) -> crate::tree::Node<'t> {
        unit.tree
            .preorder()
            .into_iter()
            .find(|n| n.text() == text)
            .unwrap_or_else(|| panic!("no node with text {text:?}"))
    }

    #[test]
    fn parses_modern_java_without_error_nodes() {
        let src = r#"package demo;

import java.util.List;

record Point(int x, int y) {}

interface Shape {}

final class Circle implements Shape {
    int area(Object o) {
        if (o instanceof Point p) {
            return p.x() * p.y();
        }
        var s = "text";
        return switch (s.length()) {
            case 0 -> 1;
            default -> 2;
        };
    }
}
"#;

        let tree = parse_java(src).expect("parse should succeed");
        assert!(!contains_error_node(tree.root_node()));
    }

    #[test]
    fn resolves_locals_fields_and_methods() {
        let src = r#"
class A {
    static final int LIMIT = 10;
    String name;

    boolean check(String other) {
        int local = LIMIT + 1;
        return name.equals(other) && local > 0;
    }
}
"#;
        let unit = parse_unit(src, None).expect("parse");
        let model = &unit.model;

        let limit = find(&unit, "LIMIT");
        let sym = limit.symbol().expect("LIMIT resolves");
        assert_eq!(model.symbol(sym).kind, SymbolKind::Field);
        assert_eq!(model.symbol(sym).constant, Some(ConstValue::Int(10)));

        let call = find(&unit, "name.equals(other)");
        assert_eq!(call.kind(), NodeKind::MethodInvocation);
        let equals = call.symbol().expect("equals resolves");
        let owner = model.symbol(equals).owner.expect("owner");
        assert_eq!(model.qualified_name(owner), "java.lang.String");

        let sum = find(&unit, "LIMIT + 1");
        assert_eq!(sum.ty(), Some(&Type::Primitive(PrimitiveKind::Int)));
    }

    #[test]
    fn settles_effective_finality() {
        let src = r#"
class A {
    void m(int p, int q) {
        int a = 1;
        int b = 1;
        b++;
        int c;
        c = 2;
        q = 3;
        use(a, b, c, p, q);
    }
    void use(int... xs) {}
}
"#;
        let unit = parse_unit(src, None).expect("parse");
        let finality = |name: &str| {
            let var = unit
                .tree
                .preorder()
                .into_iter()
                .find(|n| n.kind() == NodeKind::Variable && n.name() == Some(name))
                .and_then(|n| n.symbol())
                .expect("variable");
            unit.model.symbol(var).effectively_final
        };
        assert!(finality("a"));
        assert!(!finality("b"));
        assert!(finality("c"));
        assert!(finality("p"));
        assert!(!finality("q"));
    }

    #[test]
    fn coerces_constants_to_declared_type() {
        let src = r#"
class A {
    static final long BIG = 1 << 20;
    static final char C = 65;
    static final String GREETING = "hi" + C;
    static final byte TOO_BIG_FOR_BYTE = 200;
}
"#;
        let unit = parse_unit(src, None).expect("parse");
        let constant = |name: &str| {
            let var = unit
                .tree
                .preorder()
                .into_iter()
                .find(|n| n.kind() == NodeKind::Variable && n.name() == Some(name))
                .and_then(|n| n.symbol())
                .expect("variable");
            unit.model.symbol(var).constant.clone()
        };
        assert_eq!(constant("BIG"), Some(ConstValue::Long(1 << 20)));
        assert_eq!(constant("C"), Some(ConstValue::Char(65)));
        assert_eq!(constant("GREETING"), Some(ConstValue::Str("hiA".into())));
        assert_eq!(constant("TOO_BIG_FOR_BYTE"), None);
    }

    #[test]
    fn syntax_errors_still_lower() {
        let unit = parse_unit("class A { void m() { int x = ; } }", None).expect("parse");
        assert_eq!(unit.tree.root().kind(), NodeKind::CompilationUnit);
    }
}
