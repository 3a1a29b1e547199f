//! Composable predicates over typed nodes.
//!
//! A matcher answers one question about a node given the analysis context and
//! has no side effects. Matchers are built once (usually in a `LazyLock`
//! static) and shared read-only. Anything that cannot be resolved makes a
//! matcher answer `false`.
//!
//! ```
//! use java_clippy::matchers::{self, Matcher, MatcherExt};
//! use java_clippy::tree::NodeKind;
//!
//! let m = matchers::kind_is(NodeKind::Binary).and(matchers::is_primitive_type());
//! # let _ = m;
//! ```

mod method;

pub use method::{
    MethodMatcher, any_method, constructor, instance_equals_invocation, instance_method,
    static_equals_invocation, static_method,
};

use crate::analysis::equivalence;
use crate::model::{Modifiers, SymbolKind, Type};
use crate::state::VisitorState;
use crate::tree::{ConstValue, Literal, Node, NodeKind};
use regex::Regex;

pub trait Matcher: Send + Sync {
    fn matches(&self, node: Node<'_>, state: &VisitorState<'_>) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(Node<'_>, &VisitorState<'_>) -> bool + Send + Sync,
{
    fn matches(&self, node: Node<'_>, state: &VisitorState<'_>) -> bool {
        self(node, state)
    }
}

/// Type-erased matcher, for tables and heterogeneous combinators.
pub struct BoxedMatcher(Box<dyn Matcher>);

impl BoxedMatcher {
    pub fn new(m: impl Matcher + 'static) -> Self {
        Self(Box::new(m))
    }
}

impl Matcher for BoxedMatcher {
    fn matches(&self, node: Node<'_>, state: &VisitorState<'_>) -> bool {
        self.0.matches(node, state)
    }
}

impl std::fmt::Debug for BoxedMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BoxedMatcher")
    }
}

// ============================================================================
// Boolean combinators
// ============================================================================

pub struct And<A, B>(A, B);
pub struct Or<A, B>(A, B);
pub struct Not<M>(M);

impl<A: Matcher, B: Matcher> Matcher for And<A, B> {
    fn matches(&self, node: Node<'_>, state: &VisitorState<'_>) -> bool {
        self.0.matches(node, state) && self.1.matches(node, state)
    }
}

impl<A: Matcher, B: Matcher> Matcher for Or<A, B> {
    fn matches(&self, node: Node<'_>, state: &VisitorState<'_>) -> bool {
        self.0.matches(node, state) || self.1.matches(node, state)
    }
}

impl<M: Matcher> Matcher for Not<M> {
    fn matches(&self, node: Node<'_>, state: &VisitorState<'_>) -> bool {
        !self.0.matches(node, state)
    }
}

pub trait MatcherExt: Matcher + Sized {
    fn and<M: Matcher>(self, other: M) -> And<Self, M> {
        And(self, other)
    }

    fn or<M: Matcher>(self, other: M) -> Or<Self, M> {
        Or(self, other)
    }

    fn negate(self) -> Not<Self> {
        Not(self)
    }

    fn boxed(self) -> BoxedMatcher
    where
        Self: 'static,
    {
        BoxedMatcher::new(self)
    }
}

impl<M: Matcher> MatcherExt for M {}

/// Every matcher holds. Stops at the first that does not.
pub fn all_of(matchers: impl IntoIterator<Item = BoxedMatcher>) -> impl Matcher {
    let matchers: Vec<BoxedMatcher> = matchers.into_iter().collect();
    move |node: Node<'_>, state: &VisitorState<'_>| matchers.iter().all(|m| m.matches(node, state))
}

/// Some matcher holds. Stops at the first that does.
pub fn any_of(matchers: impl IntoIterator<Item = BoxedMatcher>) -> impl Matcher {
    let matchers: Vec<BoxedMatcher> = matchers.into_iter().collect();
    move |node: Node<'_>, state: &VisitorState<'_>| matchers.iter().any(|m| m.matches(node, state))
}

pub fn not(m: impl Matcher) -> impl Matcher {
    Not(m)
}

pub fn anything() -> impl Matcher {
    |_: Node<'_>, _: &VisitorState<'_>| true
}

pub fn nothing() -> impl Matcher {
    |_: Node<'_>, _: &VisitorState<'_>| false
}

// ============================================================================
// Node primitives
// ============================================================================

pub fn kind_is(kind: NodeKind) -> impl Matcher {
    move |node: Node<'_>, _: &VisitorState<'_>| node.kind() == kind
}

pub fn kind_any_of(kinds: &'static [NodeKind]) -> impl Matcher {
    move |node: Node<'_>, _: &VisitorState<'_>| kinds.contains(&node.kind())
}

/// The node's type is exactly `type_name` (e.g. `java.lang.String`, `int`).
pub fn is_same_type(type_name: &'static str) -> impl Matcher {
    move |node: Node<'_>, state: &VisitorState<'_>| {
        let (Some(ty), Some(want)) = (node.ty(), state.type_from_string(type_name)) else {
            return false;
        };
        state.model().same_type(&state.model().erasure(ty), &want)
    }
}

pub fn is_subtype_of(type_name: &'static str) -> impl Matcher {
    move |node: Node<'_>, state: &VisitorState<'_>| {
        let (Some(ty), Some(want)) = (node.ty(), state.type_from_string(type_name)) else {
            return false;
        };
        state.model().is_subtype(ty, &want)
    }
}

pub fn is_primitive_type() -> impl Matcher {
    |node: Node<'_>, _: &VisitorState<'_>| node.ty().is_some_and(Type::is_primitive)
}

pub fn is_boxed_primitive_type() -> impl Matcher {
    |node: Node<'_>, state: &VisitorState<'_>| {
        node.ty()
            .is_some_and(|t| state.model().unboxed_type(t).is_some())
    }
}

pub fn is_array_type() -> impl Matcher {
    |node: Node<'_>, _: &VisitorState<'_>| matches!(node.ty(), Some(Type::Array(_)))
}

pub fn symbol_named(name: &'static str) -> impl Matcher {
    move |node: Node<'_>, state: &VisitorState<'_>| {
        state.symbol(node).is_some_and(|s| s.name == name)
    }
}

pub fn symbol_name_matches(pattern: Regex) -> impl Matcher {
    move |node: Node<'_>, state: &VisitorState<'_>| {
        state.symbol(node).is_some_and(|s| pattern.is_match(&s.name))
    }
}

pub fn has_modifier(modifier: Modifiers) -> impl Matcher {
    move |node: Node<'_>, state: &VisitorState<'_>| {
        state
            .symbol(node)
            .is_some_and(|s| s.modifiers.contains(modifier))
    }
}

pub fn is_static() -> impl Matcher {
    has_modifier(Modifiers::STATIC)
}

pub fn is_field() -> impl Matcher {
    |node: Node<'_>, state: &VisitorState<'_>| {
        state.symbol(node).is_some_and(|s| s.kind == SymbolKind::Field)
    }
}

/// The node's symbol carries the annotation `qualified`, directly or, for
/// `@Inherited` annotation types, through a superclass.
pub fn has_annotation(qualified: &'static str) -> impl Matcher {
    move |node: Node<'_>, state: &VisitorState<'_>| {
        node.symbol()
            .is_some_and(|s| state.model().has_annotation(s, qualified))
    }
}

/// Some annotation on the declaration has this simple name, resolved or not.
pub fn has_annotation_with_simple_name(simple: &'static str) -> impl Matcher {
    move |node: Node<'_>, _: &VisitorState<'_>| {
        node.annotations().iter().any(|a| {
            a.name()
                .is_some_and(|n| n.rsplit('.').next() == Some(simple))
        })
    }
}

/// The class owning the node's symbol is `class_name`, a subtype of it, or
/// nested inside it.
pub fn is_descendant_of(class_name: &'static str) -> impl Matcher {
    move |node: Node<'_>, state: &VisitorState<'_>| {
        let model = state.model();
        let (Some(sym), Some(target)) = (node.symbol(), model.resolve_class(class_name)) else {
            return false;
        };
        let mut owner = model.enclosing_class(sym);
        while let Some(class) = owner {
            if model.is_subclass(class, target) {
                return true;
            }
            owner = model.symbol(class).owner.and_then(|o| model.enclosing_class(o));
        }
        false
    }
}

fn literal_value<'t>(node: Node<'t>) -> Option<&'t ConstValue> {
    match node.skip_parens().literal()? {
        Literal::Value(v) => Some(v),
        Literal::Null => None,
    }
}

/// An `int` or `long` literal with this value.
pub fn int_literal(value: i64) -> impl Matcher {
    move |node: Node<'_>, _: &VisitorState<'_>| {
        matches!(
            literal_value(node),
            Some(ConstValue::Int(_) | ConstValue::Long(_))
        ) && literal_value(node).and_then(ConstValue::as_i64) == Some(value)
    }
}

pub fn boolean_literal(value: bool) -> impl Matcher {
    move |node: Node<'_>, _: &VisitorState<'_>| {
        matches!(literal_value(node), Some(ConstValue::Bool(b)) if *b == value)
    }
}

pub fn string_literal(value: &'static str) -> impl Matcher {
    move |node: Node<'_>, _: &VisitorState<'_>| {
        matches!(literal_value(node), Some(ConstValue::Str(s)) if s == value)
    }
}

pub fn null_literal() -> impl Matcher {
    |node: Node<'_>, _: &VisitorState<'_>| {
        matches!(node.skip_parens().literal(), Some(Literal::Null))
    }
}

/// Some strict descendant matches. Bounded by the subtree size.
pub fn contains(m: impl Matcher) -> impl Matcher {
    move |node: Node<'_>, state: &VisitorState<'_>| {
        let mut stack = node.children();
        stack.reverse();
        while let Some(n) = stack.pop() {
            if m.matches(n, state) {
                return true;
            }
            let mut kids = n.children();
            kids.reverse();
            stack.extend(kids);
        }
        false
    }
}

// ============================================================================
// Projections
// ============================================================================

/// The receiver of a method call or field access matches. `false` for
/// calls without an explicit receiver.
pub fn receiver(m: impl Matcher) -> impl Matcher {
    move |node: Node<'_>, state: &VisitorState<'_>| {
        node.receiver().is_some_and(|r| m.matches(r, state))
    }
}

pub fn argument(index: usize, m: impl Matcher) -> impl Matcher {
    move |node: Node<'_>, state: &VisitorState<'_>| {
        node.argument(index).is_some_and(|a| m.matches(a, state))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    AnyOf,
    /// Every argument matches; vacuously true with no arguments.
    AllOf,
}

pub fn has_arguments(match_type: MatchType, m: impl Matcher) -> impl Matcher {
    move |node: Node<'_>, state: &VisitorState<'_>| {
        let args = node.arguments();
        match match_type {
            MatchType::AnyOf => args.iter().any(|a| m.matches(*a, state)),
            MatchType::AllOf => args.iter().all(|a| m.matches(*a, state)),
        }
    }
}

pub fn argument_count(count: usize) -> impl Matcher {
    move |node: Node<'_>, _: &VisitorState<'_>| {
        matches!(node.kind(), NodeKind::MethodInvocation | NodeKind::NewClass)
            && node.arguments().len() == count
    }
}

/// `a.m(a)`: the receiver and argument `index` are the same variable.
pub fn receiver_same_as_argument(index: usize) -> impl Matcher {
    move |node: Node<'_>, _: &VisitorState<'_>| {
        match (node.receiver(), node.argument(index)) {
            (Some(r), Some(a)) => equivalence::same_variable(r, a),
            _ => false,
        }
    }
}

pub fn same_argument(i: usize, j: usize) -> impl Matcher {
    move |node: Node<'_>, _: &VisitorState<'_>| match (node.argument(i), node.argument(j)) {
        (Some(a), Some(b)) => equivalence::same_variable(a, b),
        _ => false,
    }
}

/// Binary expression whose left and right operands match, in that order.
pub fn binary_tree(lhs: impl Matcher, rhs: impl Matcher) -> impl Matcher {
    move |node: Node<'_>, state: &VisitorState<'_>| {
        node.operands()
            .is_some_and(|(l, r)| lhs.matches(l, state) && rhs.matches(r, state))
    }
}

pub fn parent_node(m: impl Matcher) -> impl Matcher {
    move |node: Node<'_>, state: &VisitorState<'_>| {
        node.parent().is_some_and(|p| m.matches(p, state))
    }
}

/// The nearest enclosing method (or the node itself) matches.
pub fn enclosing_method(m: impl Matcher) -> impl Matcher {
    move |node: Node<'_>, state: &VisitorState<'_>| {
        node.enclosing(NodeKind::Method)
            .is_some_and(|n| m.matches(n, state))
    }
}

pub fn enclosing_class(m: impl Matcher) -> impl Matcher {
    move |node: Node<'_>, state: &VisitorState<'_>| {
        node.enclosing(NodeKind::Class)
            .is_some_and(|n| m.matches(n, state))
    }
}

pub fn ignore_parens(m: impl Matcher) -> impl Matcher {
    move |node: Node<'_>, state: &VisitorState<'_>| m.matches(node.skip_parens(), state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SemanticModel;
    use crate::tree::{BinaryOp, NodeData, Span, TreeBuilder, TypedTree};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn one_plus_two() -> TypedTree {
        let mut b = TreeBuilder::new("1 + (2)");
        let one = b.int(1, Span::new(0, 1));
        let two = b.int(2, Span::new(5, 6));
        let paren = b.push(NodeData::Parenthesized { expr: two }, Span::new(4, 7));
        let sum = b.binary(BinaryOp::Add, one, paren, Span::new(0, 7));
        b.finish(sum)
    }

    #[test]
    fn all_of_short_circuits() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let counting = |_: Node<'_>, _: &VisitorState<'_>| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            true
        };
        let tree = one_plus_two();
        let model = SemanticModel::new();
        let state = VisitorState::new(&tree, &model);

        let m = all_of([nothing().boxed(), counting.boxed()]);
        assert!(!m.matches(tree.root(), &state));
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);

        let m = any_of([anything().boxed(), counting.boxed()]);
        assert!(m.matches(tree.root(), &state));
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn projections_ignore_parens_on_request() {
        let tree = one_plus_two();
        let model = SemanticModel::new();
        let state = VisitorState::new(&tree, &model);
        let root = tree.root();

        assert!(binary_tree(int_literal(1), ignore_parens(int_literal(2))).matches(root, &state));
        assert!(!binary_tree(int_literal(2), anything()).matches(root, &state));
        assert!(contains(kind_is(NodeKind::Parenthesized)).matches(root, &state));
        assert!(!contains(kind_is(NodeKind::Binary)).matches(root, &state));
    }

    #[test]
    fn undefined_projections_are_false() {
        let tree = one_plus_two();
        let model = SemanticModel::new();
        let state = VisitorState::new(&tree, &model);
        let root = tree.root();

        assert!(!receiver(anything()).matches(root, &state));
        assert!(!argument(0, anything()).matches(root, &state));
        assert!(!parent_node(anything()).matches(root, &state));
        assert!(!enclosing_method(anything()).matches(root, &state));
        assert!(has_arguments(MatchType::AllOf, nothing()).matches(root, &state));
    }

    #[test]
    fn type_matchers_need_resolved_types() {
        let tree = one_plus_two();
        let model = SemanticModel::with_jdk_stubs();
        let state = VisitorState::new(&tree, &model);
        let (one, _) = tree.root().operands().unwrap();

        assert!(is_same_type("int").matches(one, &state));
        assert!(is_subtype_of("long").matches(one, &state));
        assert!(is_primitive_type().matches(one, &state));
        // the sum itself was never typed by the builder
        assert!(!is_primitive_type().matches(tree.root(), &state));
    }
}
