//! Read-only typed tree for a single compilation unit.
//!
//! The tree is an arena of nodes addressed by [`NodeId`]. Checkers and matchers
//! never own nodes; they read them through the copyable [`Node`] handle, which
//! mirrors how a tree-sitter `Node` is used: cheap to pass around, tied to the
//! lifetime of the tree it came from.
//!
//! Nodes are produced by the host side (the frontend in [`crate::parser`] or a
//! test using [`TreeBuilder`]). The engine only reads them.

mod builder;
mod data;

pub use builder::TreeBuilder;
pub use data::{
    BinaryOp, ClassKind, ConstValue, Literal, NodeData, NodeKind, PrimitiveKind, UnaryOp,
};

use crate::model::{SymbolId, Type};
use std::path::{Path, PathBuf};

/// Index of a node inside its [`TypedTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Byte range `[start, end)` in the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// 1-based line/column position, used only when rendering findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct NodeEntry {
    pub(crate) data: NodeData,
    pub(crate) span: Span,
    pub(crate) parent: Option<NodeId>,
    pub(crate) symbol: Option<SymbolId>,
    pub(crate) ty: Option<Type>,
}

/// Typed tree for one compilation unit.
#[derive(Debug, Clone)]
pub struct TypedTree {
    source: String,
    path: Option<PathBuf>,
    nodes: Vec<NodeEntry>,
    root: NodeId,
}

impl TypedTree {
    pub fn root(&self) -> Node<'_> {
        self.node(self.root)
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { tree: self, id }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over every node in pre-order.
    pub fn preorder(&self) -> Vec<Node<'_>> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            out.push(node);
            let children = node.children();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Convert a byte offset into a 1-based row/column position.
    pub fn position(&self, byte_offset: usize) -> Position {
        let mut row = 1usize;
        let mut column = 1usize;
        let end = byte_offset.min(self.source.len());
        for b in self.source.as_bytes().iter().take(end) {
            if *b == b'\n' {
                row += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Position { row, column }
    }

    fn entry(&self, id: NodeId) -> &NodeEntry {
        &self.nodes[id.index()]
    }
}

/// Copyable handle to a node of a [`TypedTree`].
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t TypedTree,
    id: NodeId,
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("span", &self.span())
            .finish()
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl<'t> Node<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t TypedTree {
        self.tree
    }

    pub fn kind(&self) -> NodeKind {
        self.data().kind()
    }

    pub fn data(&self) -> &'t NodeData {
        &self.tree.entry(self.id).data
    }

    pub fn span(&self) -> Span {
        self.tree.entry(self.id).span
    }

    pub fn symbol(&self) -> Option<SymbolId> {
        self.tree.entry(self.id).symbol
    }

    pub fn ty(&self) -> Option<&'t Type> {
        self.tree.entry(self.id).ty.as_ref()
    }

    pub fn parent(&self) -> Option<Node<'t>> {
        self.tree.entry(self.id).parent.map(|p| self.tree.node(p))
    }

    /// Children in source order.
    pub fn children(&self) -> Vec<Node<'t>> {
        self.data()
            .child_ids()
            .into_iter()
            .map(|id| self.tree.node(id))
            .collect()
    }

    /// Source text covered by this node, or `""` if the span is out of bounds.
    pub fn text(&self) -> &'t str {
        let span = self.span();
        self.tree.source.get(span.range()).unwrap_or("")
    }

    fn at(&self, id: NodeId) -> Node<'t> {
        self.tree.node(id)
    }

    /// Walk up to the root, starting with the parent of this node.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'t>> + 't {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// Strip any number of enclosing parentheses.
    pub fn skip_parens(self) -> Node<'t> {
        let mut cur = self;
        while let NodeData::Parenthesized { expr } = cur.data() {
            cur = cur.at(*expr);
        }
        cur
    }

    /// Receiver expression of a method invocation or member select.
    pub fn receiver(&self) -> Option<Node<'t>> {
        match self.data() {
            NodeData::MethodInvocation { receiver, .. } => receiver.map(|r| self.at(r)),
            NodeData::MemberSelect { expr, .. } => Some(self.at(*expr)),
            _ => None,
        }
    }

    /// Arguments of a method invocation or constructor call.
    pub fn arguments(&self) -> Vec<Node<'t>> {
        match self.data() {
            NodeData::MethodInvocation { args, .. } | NodeData::NewClass { args, .. } => {
                args.iter().map(|a| self.at(*a)).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn argument(&self, index: usize) -> Option<Node<'t>> {
        match self.data() {
            NodeData::MethodInvocation { args, .. } | NodeData::NewClass { args, .. } => {
                args.get(index).map(|a| self.at(*a))
            }
            _ => None,
        }
    }

    /// Left and right operands of a binary expression.
    pub fn operands(&self) -> Option<(Node<'t>, Node<'t>)> {
        match self.data() {
            NodeData::Binary { lhs, rhs, .. } => Some((self.at(*lhs), self.at(*rhs))),
            _ => None,
        }
    }

    pub fn binary_op(&self) -> Option<BinaryOp> {
        match self.data() {
            NodeData::Binary { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// Condition of an `if`, loop, or conditional expression.
    pub fn condition(&self) -> Option<Node<'t>> {
        match self.data() {
            NodeData::If { cond, .. }
            | NodeData::While { cond, .. }
            | NodeData::DoWhile { cond, .. }
            | NodeData::Conditional { cond, .. } => Some(self.at(*cond)),
            NodeData::For { cond, .. } => cond.map(|c| self.at(c)),
            _ => None,
        }
    }

    /// Simple name of the entity this node declares or references.
    pub fn name(&self) -> Option<&'t str> {
        match self.data() {
            NodeData::Class { name, .. }
            | NodeData::Method { name, .. }
            | NodeData::Variable { name, .. }
            | NodeData::Identifier { name }
            | NodeData::MemberSelect { name, .. }
            | NodeData::MethodInvocation { name, .. }
            | NodeData::Annotation { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Annotation nodes attached to a declaration.
    pub fn annotations(&self) -> Vec<Node<'t>> {
        match self.data() {
            NodeData::Class { annotations, .. }
            | NodeData::Method { annotations, .. }
            | NodeData::Variable { annotations, .. } => {
                annotations.iter().map(|a| self.at(*a)).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Literal payload, if this is a literal node.
    pub fn literal(&self) -> Option<&'t Literal> {
        match self.data() {
            NodeData::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn is_declaration(&self) -> bool {
        matches!(
            self.kind(),
            NodeKind::Class | NodeKind::Method | NodeKind::Variable
        )
    }

    /// Nearest ancestor (or self) of the given kind.
    pub fn enclosing(&self, kind: NodeKind) -> Option<Node<'t>> {
        if self.kind() == kind {
            return Some(*self);
        }
        self.ancestors().find(|n| n.kind() == kind)
    }

    /// True if `self` is `other` or lies inside it.
    pub fn is_within(&self, other: Node<'_>) -> bool {
        std::ptr::eq(self.tree, other.tree)
            && (self.id == other.id || self.ancestors().any(|a| a.id == other.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TypedTree {
        // a + (b)
        let src = "a + (b)";
        let mut b = TreeBuilder::new(src);
        let a = b.ident("a", Span::new(0, 1));
        let inner = b.ident("b", Span::new(5, 6));
        let paren = b.push(NodeData::Parenthesized { expr: inner }, Span::new(4, 7));
        let sum = b.binary(BinaryOp::Add, a, paren, Span::new(0, 7));
        b.finish(sum)
    }

    #[test]
    fn children_are_in_source_order() {
        let tree = sample();
        let root = tree.root();
        let kids: Vec<_> = root.children().iter().map(|n| n.text()).collect();
        assert_eq!(kids, vec!["a", "(b)"]);
    }

    #[test]
    fn parents_are_wired_by_finish() {
        let tree = sample();
        let (_, rhs) = tree.root().operands().unwrap();
        let inner = rhs.skip_parens();
        assert_eq!(inner.text(), "b");
        assert_eq!(inner.parent(), Some(rhs));
        assert_eq!(inner.ancestors().count(), 2);
    }

    #[test]
    fn preorder_visits_parent_first() {
        let tree = sample();
        let order: Vec<_> = tree.preorder().iter().map(|n| n.text()).collect();
        assert_eq!(order, vec!["a + (b)", "a", "(b)", "b"]);
    }

    #[test]
    fn position_is_one_based() {
        let mut b = TreeBuilder::new("x\n  y");
        let y = b.ident("y", Span::new(4, 5));
        let tree = b.finish(y);
        assert_eq!(tree.position(4), Position { row: 2, column: 3 });
    }
}
