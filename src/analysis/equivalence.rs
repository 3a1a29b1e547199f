//! "Is this the same variable / method" queries, by symbol identity.

use crate::model::SymbolId;
use crate::tree::{Node, NodeData};

/// Both nodes resolve to the same symbol. Unresolved nodes never match.
pub fn same_symbol(a: Node<'_>, b: Node<'_>) -> bool {
    matches!((a.symbol(), b.symbol()), (Some(x), Some(y)) if x == y)
}

pub fn is_this(node: Node<'_>) -> bool {
    matches!(node.skip_parens().data(), NodeData::Identifier { name } if name == "this")
}

/// Symbol referenced by an identifier or field access, parentheses ignored.
pub fn variable_symbol(node: Node<'_>) -> Option<SymbolId> {
    let node = node.skip_parens();
    match node.data() {
        NodeData::Identifier { .. } | NodeData::MemberSelect { .. } => node.symbol(),
        _ => None,
    }
}

/// Whether `a` and `b` denote the same variable.
///
/// Identifiers match by symbol. Field accesses also need equivalent
/// receivers, with `this.f` equivalent to a bare `f`.
pub fn same_variable(a: Node<'_>, b: Node<'_>) -> bool {
    let (a, b) = (a.skip_parens(), b.skip_parens());
    let (Some(sa), Some(sb)) = (variable_symbol(a), variable_symbol(b)) else {
        return false;
    };
    if sa != sb {
        return false;
    }
    match (a.data(), b.data()) {
        (NodeData::Identifier { .. }, NodeData::Identifier { .. }) => true,
        (NodeData::MemberSelect { expr: ea, .. }, NodeData::MemberSelect { expr: eb, .. }) => {
            let (ra, rb) = (a.tree().node(*ea), b.tree().node(*eb));
            (is_this(ra) && is_this(rb)) || same_variable(ra, rb)
        }
        (NodeData::Identifier { .. }, NodeData::MemberSelect { expr, .. }) => {
            is_this(b.tree().node(*expr))
        }
        (NodeData::MemberSelect { expr, .. }, NodeData::Identifier { .. }) => {
            is_this(a.tree().node(*expr))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SemanticModel, Symbol, SymbolKind, Type};
    use crate::tree::{PrimitiveKind, Span, TreeBuilder};

    #[test]
    fn this_field_matches_bare_field() {
        let mut model = SemanticModel::new();
        let f = model.add_symbol(Symbol::new(
            "f",
            SymbolKind::Field,
            Type::Primitive(PrimitiveKind::Int),
        ));
        let g = model.add_symbol(Symbol::new(
            "g",
            SymbolKind::Field,
            Type::Primitive(PrimitiveKind::Int),
        ));

        let src = "this.f == f && g";
        let mut b = TreeBuilder::new(src);
        let this = b.ident("this", Span::new(0, 4));
        let sel = b.push(
            NodeData::MemberSelect {
                expr: this,
                name: "f".to_string(),
            },
            Span::new(0, 6),
        );
        b.set_symbol(sel, f);
        let bare = b.ident("f", Span::new(10, 11));
        b.set_symbol(bare, f);
        let other = b.ident("g", Span::new(15, 16));
        b.set_symbol(other, g);
        let eq = b.binary(crate::tree::BinaryOp::Eq, sel, bare, Span::new(0, 11));
        let root = b.binary(crate::tree::BinaryOp::And, eq, other, Span::new(0, 16));
        let tree = b.finish(root);

        let n = |id| tree.node(id);
        assert!(same_variable(n(sel), n(bare)));
        assert!(same_variable(n(bare), n(sel)));
        assert!(!same_variable(n(bare), n(other)));
        assert!(!same_variable(n(this), n(this)));
    }
}
