use crate::checker::{CheckerDescriptor, Flags};
use crate::description::Description;
use crate::fix::{SuggestedFix, apply_fix};
use crate::model::{SemanticModel, Symbol, SymbolId, Type};
use crate::suppression::{NoSuppression, Suppressor};
use crate::tree::{Node, NodeId, TypedTree};
use crate::verify::CompilationVerifier;
use std::cell::RefCell;
use std::collections::HashMap;

static NO_FLAGS: Flags = Flags::empty();
static NO_SUPPRESSION: NoSuppression = NoSuppression;

/// Per-unit analysis context threaded through every checker and matcher call.
///
/// Created by the scanner for one compilation unit and dropped at the end of
/// it. Not `Sync`: the caches use `RefCell`.
pub struct VisitorState<'a> {
    tree: &'a TypedTree,
    model: &'a SemanticModel,
    path: Vec<NodeId>,
    type_cache: RefCell<HashMap<String, Option<Type>>>,
    reports: RefCell<Vec<Description>>,
    verifier: Option<&'a dyn CompilationVerifier>,
    suppressor: &'a dyn Suppressor,
    flags: &'a Flags,
}

impl<'a> VisitorState<'a> {
    pub fn new(tree: &'a TypedTree, model: &'a SemanticModel) -> Self {
        Self {
            tree,
            model,
            path: Vec::new(),
            type_cache: RefCell::new(HashMap::new()),
            reports: RefCell::new(Vec::new()),
            verifier: None,
            suppressor: &NO_SUPPRESSION,
            flags: &NO_FLAGS,
        }
    }

    pub fn with_verifier(mut self, verifier: &'a dyn CompilationVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_flags(mut self, flags: &'a Flags) -> Self {
        self.flags = flags;
        self
    }

    /// The scanner's suppressor, for checkers that run their own sub-scans.
    pub fn with_suppressor(mut self, suppressor: &'a dyn Suppressor) -> Self {
        self.suppressor = suppressor;
        self
    }

    pub fn tree(&self) -> &'a TypedTree {
        self.tree
    }

    pub fn model(&self) -> &'a SemanticModel {
        self.model
    }

    pub fn source(&self) -> &'a str {
        self.tree.source()
    }

    pub fn flags(&self) -> &Flags {
        self.flags
    }

    pub fn suppressor(&self) -> &'a dyn Suppressor {
        self.suppressor
    }

    /// Whether the declaration `decl` opts out of `checker`.
    ///
    /// The scanner already applies this on its own walk; checkers that scan
    /// a subtree themselves use it to skip suppressed declarations.
    pub fn is_suppressed_at(&self, decl: Node<'_>, checker: &CheckerDescriptor) -> bool {
        decl.is_declaration()
            && self
                .suppressor
                .scope_for(decl)
                .is_some_and(|scope| scope.suppresses(checker))
    }

    // ------------------------------------------------------------------
    // Tree path
    // ------------------------------------------------------------------

    pub(crate) fn enter(&mut self, node: NodeId) {
        self.path.push(node);
    }

    pub(crate) fn leave(&mut self) {
        self.path.pop();
    }

    /// Root-to-current ancestry of the node being matched.
    pub fn path(&self) -> impl DoubleEndedIterator<Item = Node<'a>> + '_ {
        self.path.iter().map(|id| self.tree.node(*id))
    }

    /// The node currently being matched.
    pub fn current(&self) -> Option<Node<'a>> {
        self.path.last().map(|id| self.tree.node(*id))
    }

    // ------------------------------------------------------------------
    // Symbols and types
    // ------------------------------------------------------------------

    pub fn symbol(&self, node: Node<'_>) -> Option<&'a Symbol> {
        node.symbol().map(|s| self.model.symbol(s))
    }

    pub fn symbol_id(&self, node: Node<'_>) -> Option<SymbolId> {
        node.symbol()
    }

    /// Resolve a well-known type by name, memoized per unit.
    pub fn type_from_string(&self, name: &str) -> Option<Type> {
        if let Some(hit) = self.type_cache.borrow().get(name) {
            return hit.clone();
        }
        let resolved = self.model.type_from_string(name);
        self.type_cache
            .borrow_mut()
            .insert(name.to_string(), resolved.clone());
        resolved
    }

    // ------------------------------------------------------------------
    // Reporting
    // ------------------------------------------------------------------

    /// Queue a finding in addition to whatever the match call returns.
    pub fn report_match(&self, description: Description) {
        self.reports.borrow_mut().push(description);
    }

    pub(crate) fn take_reports(&self) -> Vec<Description> {
        std::mem::take(&mut *self.reports.borrow_mut())
    }

    /// Whether the unit still compiles after applying `fix`.
    ///
    /// Without a verifier this answers `true`. Only meant to decide whether
    /// to offer a fix.
    pub fn compiles_with_fix(&self, fix: &SuggestedFix) -> bool {
        let Some(verifier) = self.verifier else {
            return true;
        };
        match apply_fix(self.tree.source(), fix) {
            Ok(patched) => verifier.compiles(&patched),
            Err(err) => {
                tracing::debug!(%err, "fix does not apply cleanly");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Span, TreeBuilder};

    struct Never;

    impl CompilationVerifier for Never {
        fn compiles(&self, _source: &str) -> bool {
            false
        }
    }

    fn leaf() -> TypedTree {
        let mut b = TreeBuilder::new("x");
        let x = b.ident("x", Span::new(0, 1));
        b.finish(x)
    }

    #[test]
    fn type_lookups_are_memoized() {
        let tree = leaf();
        let model = SemanticModel::with_jdk_stubs();
        let state = VisitorState::new(&tree, &model);
        assert!(state.type_from_string("java.lang.String").is_some());
        assert!(state.type_from_string("com.example.Missing").is_none());
        assert_eq!(state.type_cache.borrow().len(), 2);
    }

    #[test]
    fn verifier_gates_fixes() {
        let tree = leaf();
        let model = SemanticModel::new();
        let fix = SuggestedFix::replace(Span::new(0, 1), "y");
        assert!(VisitorState::new(&tree, &model).compiles_with_fix(&fix));
        let never = Never;
        let state = VisitorState::new(&tree, &model).with_verifier(&never);
        assert!(!state.compiles_with_fix(&fix));
    }
}
