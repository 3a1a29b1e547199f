use super::{
    BinaryOp, ConstValue, Literal, NodeData, NodeEntry, NodeId, Span, TypedTree,
};
use crate::model::{SymbolId, Type};
use std::path::PathBuf;

/// Bottom-up constructor for a [`TypedTree`].
///
/// Children must be pushed before their parent. Parent links are wired in
/// [`TreeBuilder::finish`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    source: String,
    path: Option<PathBuf>,
    nodes: Vec<NodeEntry>,
}

impl TreeBuilder {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            path: None,
            nodes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn push(&mut self, data: NodeData, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeEntry {
            data,
            span,
            parent: None,
            symbol: None,
            ty: None,
        });
        id
    }

    pub fn set_symbol(&mut self, id: NodeId, symbol: SymbolId) {
        self.nodes[id.index()].symbol = Some(symbol);
    }

    pub fn set_type(&mut self, id: NodeId, ty: Type) {
        self.nodes[id.index()].ty = Some(ty);
    }

    pub fn symbol_of(&self, id: NodeId) -> Option<SymbolId> {
        self.nodes[id.index()].symbol
    }

    pub fn type_of(&self, id: NodeId) -> Option<&Type> {
        self.nodes[id.index()].ty.as_ref()
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()].data
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn ident(&mut self, name: &str, span: Span) -> NodeId {
        self.push(
            NodeData::Identifier {
                name: name.to_string(),
            },
            span,
        )
    }

    pub fn literal(&mut self, value: ConstValue, span: Span) -> NodeId {
        let ty = value.primitive_kind().map(Type::Primitive);
        let id = self.push(NodeData::Literal(Literal::Value(value)), span);
        if let Some(ty) = ty {
            self.set_type(id, ty);
        }
        id
    }

    pub fn int(&mut self, value: i32, span: Span) -> NodeId {
        self.literal(ConstValue::Int(value), span)
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId, span: Span) -> NodeId {
        self.push(NodeData::Binary { op, lhs, rhs }, span)
    }

    pub fn block(&mut self, stmts: Vec<NodeId>, span: Span) -> NodeId {
        self.push(NodeData::Block { stmts }, span)
    }

    /// Seal the tree with `root` as its root and wire parent links.
    pub fn finish(mut self, root: NodeId) -> TypedTree {
        for idx in 0..self.nodes.len() {
            let parent = NodeId(idx as u32);
            for child in self.nodes[idx].data.child_ids() {
                self.nodes[child.index()].parent = Some(parent);
            }
        }
        TypedTree {
            source: self.source,
            path: self.path,
            nodes: self.nodes,
            root,
        }
    }
}
