//! Single-pass traversal that routes nodes to interested checkers.
//!
//! Visitation is pre-order: a node is matched before any of its descendants,
//! and siblings are visited in source order. Each checker call is isolated;
//! an `Err` or a panic becomes a [`CheckerFailure`] and the scan continues.

use crate::annotations::SuppressionStack;
use crate::checker::{self, CheckerRegistry, CheckerSettings};
use crate::description::Description;
use crate::model::SemanticModel;
use crate::state::VisitorState;
use crate::suppression::Suppressor;
use crate::tree::{Node, NodeKind, Position, Span, TypedTree};
use crate::verify::CompilationVerifier;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

/// `NodeKind` to the ordered indices of the checkers interested in it.
///
/// Built once per registry; disabled checkers are left out.
#[derive(Debug, Clone)]
pub struct DispatchTable {
    by_kind: Vec<Vec<usize>>,
}

impl DispatchTable {
    pub fn build(registry: &CheckerRegistry, settings: &CheckerSettings) -> Self {
        let mut by_kind = vec![Vec::new(); NodeKind::ALL.len()];
        for (index, checker) in registry.checkers().enumerate() {
            if !settings.is_enabled(checker.descriptor()) {
                continue;
            }
            for kind in checker.interests() {
                let slot: &mut Vec<usize> = &mut by_kind[*kind as usize];
                if slot.last() != Some(&index) {
                    slot.push(index);
                }
            }
        }
        Self { by_kind }
    }

    pub fn checkers_for(&self, kind: NodeKind) -> &[usize] {
        &self.by_kind[kind as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.iter().all(Vec::is_empty)
    }
}

/// A checker that returned an error or panicked on one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerFailure {
    pub checker: &'static str,
    pub file: Option<PathBuf>,
    pub kind: NodeKind,
    pub span: Span,
    pub position: Position,
    pub message: String,
}

impl fmt::Display for CheckerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self
            .file
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<input>".to_string());
        write!(
            f,
            "{file}:{}:{}: internal error in {} on {} node: {}",
            self.position.row, self.position.column, self.checker, self.kind, self.message
        )
    }
}

/// Receives findings as the scan produces them.
pub trait Reporter {
    fn report(&mut self, description: Description);
}

impl Reporter for Vec<Description> {
    fn report(&mut self, description: Description) {
        self.push(description);
    }
}

type TraceHook<'r> = Box<dyn FnMut(Node<'_>) + 'r>;

pub struct Scanner<'r> {
    registry: &'r CheckerRegistry,
    table: &'r DispatchTable,
    settings: &'r CheckerSettings,
    suppressor: &'r dyn Suppressor,
    verifier: Option<&'r dyn CompilationVerifier>,
    trace: Option<TraceHook<'r>>,
}

impl<'r> Scanner<'r> {
    pub fn new(
        registry: &'r CheckerRegistry,
        table: &'r DispatchTable,
        settings: &'r CheckerSettings,
        suppressor: &'r dyn Suppressor,
    ) -> Self {
        Self {
            registry,
            table,
            settings,
            suppressor,
            verifier: None,
            trace: None,
        }
    }

    #[must_use]
    pub fn with_verifier(mut self, verifier: &'r dyn CompilationVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Call `hook` on every node as it is visited, before dispatch.
    #[must_use]
    pub fn with_trace(mut self, hook: impl FnMut(Node<'_>) + 'r) -> Self {
        self.trace = Some(Box::new(hook));
        self
    }

    /// Scan one compilation unit. Returns the checker failures it hit.
    pub fn scan(
        &mut self,
        tree: &TypedTree,
        model: &SemanticModel,
        reporter: &mut dyn Reporter,
    ) -> Vec<CheckerFailure> {
        let mut state = VisitorState::new(tree, model)
            .with_flags(self.settings.flags())
            .with_suppressor(self.suppressor);
        if let Some(verifier) = self.verifier {
            state = state.with_verifier(verifier);
        }

        let excluded = self
            .registry
            .descriptors()
            .map(|d| {
                tree.path()
                    .is_some_and(|p| self.suppressor.is_path_excluded(p, d))
            })
            .collect();

        tracing::debug!(
            file = ?tree.path(),
            nodes = tree.len(),
            "scanning compilation unit"
        );

        let mut walk = Walk {
            scanner: self,
            state,
            stack: SuppressionStack::new(),
            excluded,
            failures: Vec::new(),
            reporter,
        };
        walk.visit(tree.root());
        walk.failures
    }
}

struct Walk<'s, 'r, 'a> {
    scanner: &'s mut Scanner<'r>,
    state: VisitorState<'a>,
    stack: SuppressionStack,
    excluded: Vec<bool>,
    failures: Vec<CheckerFailure>,
    reporter: &'s mut dyn Reporter,
}

impl<'a> Walk<'_, '_, 'a> {
    fn visit(&mut self, node: Node<'a>) {
        let scope = if node.is_declaration() {
            self.scanner.suppressor.scope_for(node)
        } else {
            None
        };
        let pushed = scope.is_some();
        if let Some(scope) = scope {
            self.stack.push(scope);
        }

        self.state.enter(node.id());
        if let Some(trace) = self.scanner.trace.as_mut() {
            trace(node);
        }
        self.dispatch(node);
        for child in node.children() {
            self.visit(child);
        }
        self.state.leave();

        if pushed {
            self.stack.pop();
        }
    }

    fn dispatch(&mut self, node: Node<'a>) {
        let registry = self.scanner.registry;
        let settings = self.scanner.settings;
        let table = self.scanner.table;
        for &index in table.checkers_for(node.kind()) {
            if self.excluded.get(index).copied().unwrap_or(false) {
                continue;
            }
            let Some(checker) = registry.get(index) else {
                continue;
            };
            let descriptor = checker.descriptor();
            if self.stack.is_suppressed(descriptor) {
                tracing::trace!(checker = descriptor.name, "suppressed");
                continue;
            }

            let state = &self.state;
            let result =
                panic::catch_unwind(AssertUnwindSafe(|| checker::dispatch(checker, node, state)));
            let queued = self.state.take_reports();

            let message = match result {
                Ok(Ok(found)) => {
                    for description in found.into_iter().chain(queued) {
                        if !settings.is_enabled(description.checker)
                            || self.stack.is_suppressed(description.checker)
                        {
                            continue;
                        }
                        let severity = settings.severity_for(description.checker);
                        self.reporter
                            .report(description.apply_severity_override(severity));
                    }
                    continue;
                }
                Ok(Err(err)) => err.to_string(),
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };

            let span = node.span();
            let failure = CheckerFailure {
                checker: descriptor.name,
                file: node.tree().path().map(|p| p.to_path_buf()),
                kind: node.kind(),
                span,
                position: node.tree().position(span.start),
                message,
            };
            tracing::error!(
                checker = failure.checker,
                kind = %failure.kind,
                "{failure}"
            );
            self.failures.push(failure);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{BugChecker, CheckerCategory, CheckerDescriptor, MatchResult};
    use crate::error::JavaClippyError;
    use crate::level::Severity;
    use crate::suppression::NoSuppression;
    use crate::tree::{BinaryOp, Span, TreeBuilder};

    static EXPLODES: CheckerDescriptor = CheckerDescriptor::new(
        "Explodes",
        CheckerCategory::Suspicious,
        Severity::Warning,
        "panics",
    );

    static FAILS: CheckerDescriptor = CheckerDescriptor::new(
        "Fails",
        CheckerCategory::Suspicious,
        Severity::Warning,
        "returns errors",
    );

    static IDENTS: CheckerDescriptor = CheckerDescriptor::new(
        "Idents",
        CheckerCategory::Style,
        Severity::Suggestion,
        "flags identifiers",
    );

    struct Explodes;
    impl BugChecker for Explodes {
        fn descriptor(&self) -> &'static CheckerDescriptor {
            &EXPLODES
        }
        fn interests(&self) -> &'static [NodeKind] {
            &[NodeKind::Binary]
        }
        fn match_binary(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
            panic!("boom");
        }
    }

    struct Fails;
    impl BugChecker for Fails {
        fn descriptor(&self) -> &'static CheckerDescriptor {
            &FAILS
        }
        fn interests(&self) -> &'static [NodeKind] {
            &[NodeKind::Identifier]
        }
        fn match_identifier(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
            Err(JavaClippyError::checker("Fails", "no symbol"))
        }
    }

    struct Idents;
    impl BugChecker for Idents {
        fn descriptor(&self) -> &'static CheckerDescriptor {
            &IDENTS
        }
        fn interests(&self) -> &'static [NodeKind] {
            &[NodeKind::Identifier]
        }
        fn match_identifier(&self, node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
            Ok(Some(self.describe(node).build()))
        }
    }

    fn sum() -> TypedTree {
        let mut b = TreeBuilder::new("a + b");
        let a = b.ident("a", Span::new(0, 1));
        let c = b.ident("b", Span::new(4, 5));
        let root = b.binary(BinaryOp::Add, a, c, Span::new(0, 5));
        b.finish(root)
    }

    #[test]
    fn failures_do_not_stop_the_scan() {
        let registry = CheckerRegistry::new()
            .with_checker(Explodes)
            .with_checker(Fails)
            .with_checker(Idents);
        let settings = CheckerSettings::default();
        let table = DispatchTable::build(&registry, &settings);
        let tree = sum();
        let model = SemanticModel::new();

        let mut found: Vec<Description> = Vec::new();
        let failures = Scanner::new(&registry, &table, &settings, &NoSuppression).scan(
            &tree,
            &model,
            &mut found,
        );

        assert_eq!(found.len(), 2);
        let names: Vec<_> = failures.iter().map(|f| f.checker).collect();
        assert_eq!(names, vec!["Explodes", "Fails", "Fails"]);
        assert!(failures[0].message.contains("boom"));
    }

    #[test]
    fn disabled_checkers_are_not_dispatched() {
        let registry = CheckerRegistry::new().with_checker(Idents);
        let settings = CheckerSettings::default().disable(["Idents".to_string()]);
        let table = DispatchTable::build(&registry, &settings);
        assert!(table.is_empty());
    }

    #[test]
    fn severity_overrides_apply_to_findings() {
        let registry = CheckerRegistry::new().with_checker(Idents);
        let settings = CheckerSettings::default().with_config_severities(
            [("Idents".to_string(), Severity::Error)].into_iter().collect(),
        );
        let table = DispatchTable::build(&registry, &settings);
        let tree = sum();
        let model = SemanticModel::new();
        let mut found: Vec<Description> = Vec::new();
        Scanner::new(&registry, &table, &settings, &NoSuppression).scan(&tree, &model, &mut found);
        assert!(found.iter().all(|d| d.severity == Severity::Error));
    }
}
