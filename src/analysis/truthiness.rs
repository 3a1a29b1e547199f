//! Tracks which boolean facts are known to hold at a point in a method.
//!
//! [`truthiness`] breaks a condition into atomic [`ConstantBooleanExpression`]s
//! that must be true (or false) for the whole condition to be true.
//! [`KnownConditions`] keeps the facts established by enclosing `if`s, one
//! frame per method or lambda body, and [`ConditionScanner`] walks a tree
//! maintaining it.

use crate::analysis::constant::constant_value;
use crate::matchers::Matcher;
use crate::model::{SymbolId, SymbolKind};
use crate::state::VisitorState;
use crate::tree::{BinaryOp, ConstValue, Node, NodeData, NodeKind, UnaryOp};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// One step of a side-effect-free accessor chain such as `a.getB().c`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PureInvocation {
    pub symbol: SymbolId,
    pub name: String,
    /// `None` for variables and classes, `Some(args)` for method calls.
    pub args: Option<Vec<ConstantExpression>>,
}

impl fmt::Display for PureInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.args {
            None => f.write_str(&self.name),
            Some(args) => {
                let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{}({})", self.name, args.join(", "))
            }
        }
    }
}

/// A value that cannot change between two evaluations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstantExpression {
    Constant(ConstValue),
    /// Outermost step first: `a.b()` is `[b(), a]`.
    Accessor(Vec<PureInvocation>),
}

impl fmt::Display for ConstantExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantExpression::Constant(v) => write!(f, "{v}"),
            ConstantExpression::Accessor(chain) => {
                let parts: Vec<String> = chain.iter().rev().map(ToString::to_string).collect();
                f.write_str(&parts.join("."))
            }
        }
    }
}

/// `lhs == rhs`, symmetric: `a == b` and `b == a` are the same fact.
#[derive(Debug, Clone)]
pub struct ConstantEquals {
    pub lhs: ConstantExpression,
    pub rhs: ConstantExpression,
}

impl PartialEq for ConstantEquals {
    fn eq(&self, other: &Self) -> bool {
        (self.lhs == other.lhs && self.rhs == other.rhs)
            || (self.lhs == other.rhs && self.rhs == other.lhs)
    }
}

impl Eq for ConstantEquals {}

impl Hash for ConstantEquals {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let single = |e: &ConstantExpression| {
            let mut h = DefaultHasher::new();
            e.hash(&mut h);
            h.finish()
        };
        state.write_u64(single(&self.lhs).wrapping_add(single(&self.rhs)));
    }
}

impl fmt::Display for ConstantEquals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} equals {}", self.lhs, self.rhs)
    }
}

/// An atomic boolean fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstantBooleanExpression {
    /// A final or effectively final boolean variable.
    Variable { symbol: SymbolId, name: String },
    Equals(ConstantEquals),
    Expression(ConstantExpression),
}

impl fmt::Display for ConstantBooleanExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantBooleanExpression::Variable { name, .. } => f.write_str(name),
            ConstantBooleanExpression::Equals(e) => write!(f, "{e}"),
            ConstantBooleanExpression::Expression(e) => write!(f, "{e}"),
        }
    }
}

/// Facts required for a condition to hold. Both empty when the condition
/// is too complex to analyze.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Truthiness {
    pub required_true: Vec<ConstantBooleanExpression>,
    pub required_false: Vec<ConstantBooleanExpression>,
}

impl Truthiness {
    pub fn is_empty(&self) -> bool {
        self.required_true.is_empty() && self.required_false.is_empty()
    }

    fn add(&mut self, e: ConstantBooleanExpression, negated: bool) {
        let set = if negated {
            &mut self.required_false
        } else {
            &mut self.required_true
        };
        if !set.contains(&e) {
            set.push(e);
        }
    }
}

/// Builds constant expressions, using `pure` to decide which calls can be
/// part of an accessor chain.
pub struct TruthinessAnalyzer<'m, 's, 'a> {
    state: &'s VisitorState<'a>,
    pure: &'m dyn Matcher,
}

impl<'m, 's, 'a> TruthinessAnalyzer<'m, 's, 'a> {
    pub fn new(state: &'s VisitorState<'a>, pure: &'m dyn Matcher) -> Self {
        Self { state, pure }
    }

    /// Facts implied by `cond` being true (or false, with `negated`).
    pub fn truthiness(&self, cond: Node<'_>, negated: bool) -> Truthiness {
        let mut out = Truthiness::default();
        if self.collect(cond, negated, &mut out) {
            out
        } else {
            Truthiness::default()
        }
    }

    /// Returns false if the expression cannot be analyzed.
    fn collect(&self, node: Node<'_>, negated: bool, out: &mut Truthiness) -> bool {
        let tree = node.tree();
        match node.data() {
            NodeData::Parenthesized { expr } => self.collect(tree.node(*expr), negated, out),
            NodeData::Unary {
                op: UnaryOp::Not,
                operand,
            } => self.collect(tree.node(*operand), !negated, out),
            NodeData::Binary { op, lhs, rhs } => match op {
                BinaryOp::Eq | BinaryOp::Ne => {
                    let lhs = self.constant_expression(tree.node(*lhs));
                    let rhs = self.constant_expression(tree.node(*rhs));
                    if let (Some(lhs), Some(rhs)) = (lhs, rhs) {
                        let e = ConstantBooleanExpression::Equals(ConstantEquals { lhs, rhs });
                        out.add(e, negated ^ (*op == BinaryOp::Ne));
                    }
                    true
                }
                BinaryOp::And if !negated => {
                    self.collect(tree.node(*lhs), negated, out)
                        && self.collect(tree.node(*rhs), negated, out)
                }
                BinaryOp::Or if negated => {
                    self.collect(tree.node(*lhs), negated, out)
                        && self.collect(tree.node(*rhs), negated, out)
                }
                _ => false,
            },
            NodeData::MethodInvocation { .. }
            | NodeData::Identifier { .. }
            | NodeData::MemberSelect { .. } => {
                if let Some(e) = self.constant_boolean_expression(node) {
                    out.add(e, negated);
                }
                true
            }
            _ => true,
        }
    }

    pub fn constant_boolean_expression(&self, node: Node<'_>) -> Option<ConstantBooleanExpression> {
        if let Some(sym) = node.symbol() {
            let s = self.state.model().symbol(sym);
            if s.kind.is_variable() && s.is_final_or_effectively_final() {
                return Some(ConstantBooleanExpression::Variable {
                    symbol: sym,
                    name: s.name.clone(),
                });
            }
        }
        self.constant_expression(node)
            .map(ConstantBooleanExpression::Expression)
    }

    pub fn constant_expression(&self, node: Node<'_>) -> Option<ConstantExpression> {
        if let Some(value) = constant_value(node, self.state.model()) {
            return Some(ConstantExpression::Constant(value));
        }
        self.accessor_chain(node).map(ConstantExpression::Accessor)
    }

    /// `a.getFoo().getBar()` becomes `[getBar(), getFoo(), a]`.
    fn accessor_chain(&self, node: Node<'_>) -> Option<Vec<PureInvocation>> {
        let model = self.state.model();
        let mut chain = Vec::new();
        let mut cur = Some(node.skip_parens());
        while let Some(n) = cur {
            let sym = n.symbol()?;
            let s = model.symbol(sym);
            match n.kind() {
                NodeKind::Identifier | NodeKind::MemberSelect if self.is_pure_identifier(sym) => {
                    chain.push(PureInvocation {
                        symbol: sym,
                        name: s.name.clone(),
                        args: None,
                    });
                }
                NodeKind::MethodInvocation if self.pure.matches(n, self.state) => {
                    let args = n
                        .arguments()
                        .into_iter()
                        .map(|a| self.constant_expression(a))
                        .collect::<Option<Vec<_>>>()?;
                    chain.push(PureInvocation {
                        symbol: sym,
                        name: s.name.clone(),
                        args: Some(args),
                    });
                }
                _ => return None,
            }
            cur = match n.kind() {
                NodeKind::MethodInvocation | NodeKind::MemberSelect => {
                    n.receiver().map(|r| r.skip_parens())
                }
                _ => None,
            };
        }
        Some(chain)
    }

    fn is_pure_identifier(&self, sym: SymbolId) -> bool {
        let model = self.state.model();
        let s = model.symbol(sym);
        s.owner.is_some_and(|o| model.symbol(o).is_enum())
            || (s.kind.is_variable() && s.is_final_or_effectively_final())
            || s.kind == SymbolKind::Class
    }
}

#[derive(Debug, Default)]
struct Frame {
    truths: HashMap<ConstantBooleanExpression, usize>,
    falsehoods: HashMap<ConstantBooleanExpression, usize>,
}

fn add_all(
    set: &mut HashMap<ConstantBooleanExpression, usize>,
    items: &[ConstantBooleanExpression],
) {
    for e in items {
        *set.entry(e.clone()).or_default() += 1;
    }
}

fn remove_all(
    set: &mut HashMap<ConstantBooleanExpression, usize>,
    items: &[ConstantBooleanExpression],
) {
    for e in items {
        if let Some(count) = set.get_mut(e) {
            *count -= 1;
            if *count == 0 {
                set.remove(e);
            }
        }
    }
}

/// Result of checking a condition against the known facts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub vacuously_false: Vec<ConstantBooleanExpression>,
    pub vacuously_true: Vec<ConstantBooleanExpression>,
}

/// Multisets of known truths and falsehoods, one frame per method or lambda.
#[derive(Debug)]
pub struct KnownConditions {
    frames: Vec<Frame>,
}

impl Default for KnownConditions {
    fn default() -> Self {
        Self::new()
    }
}

impl KnownConditions {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    fn top(&mut self) -> &mut Frame {
        if self.frames.is_empty() {
            self.frames.push(Frame::default());
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub fn assume(&mut self, t: &Truthiness) {
        let frame = self.top();
        add_all(&mut frame.truths, &t.required_true);
        add_all(&mut frame.falsehoods, &t.required_false);
    }

    pub fn forget(&mut self, t: &Truthiness) {
        let frame = self.top();
        remove_all(&mut frame.truths, &t.required_true);
        remove_all(&mut frame.falsehoods, &t.required_false);
    }

    pub fn is_known_true(&self, e: &ConstantBooleanExpression) -> bool {
        self.frames.last().is_some_and(|f| f.truths.contains_key(e))
    }

    pub fn is_known_false(&self, e: &ConstantBooleanExpression) -> bool {
        self.frames
            .last()
            .is_some_and(|f| f.falsehoods.contains_key(e))
    }

    pub fn check(&self, t: &Truthiness) -> Verdict {
        let mut verdict = Verdict::default();
        for e in &t.required_true {
            if self.is_known_false(e) {
                verdict.vacuously_false.push(e.clone());
            }
            if self.is_known_true(e) {
                verdict.vacuously_true.push(e.clone());
            }
        }
        for e in &t.required_false {
            if self.is_known_true(e) {
                verdict.vacuously_false.push(e.clone());
            }
            if self.is_known_false(e) {
                verdict.vacuously_true.push(e.clone());
            }
        }
        verdict
    }
}

/// Render a set of facts like `[a, b equals 5]`.
pub fn format_facts(facts: &[ConstantBooleanExpression]) -> String {
    let parts: Vec<String> = facts.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Whether control never falls through the end of `stmt`.
pub fn always_exits(stmt: Node<'_>) -> bool {
    match stmt.data() {
        NodeData::Return { .. }
        | NodeData::Throw { .. }
        | NodeData::Break
        | NodeData::Continue => true,
        NodeData::Block { stmts } => stmts
            .last()
            .is_some_and(|last| always_exits(stmt.tree().node(*last))),
        NodeData::If {
            then_branch,
            else_branch: Some(else_branch),
            ..
        } => {
            always_exits(stmt.tree().node(*then_branch))
                && always_exits(stmt.tree().node(*else_branch))
        }
        _ => false,
    }
}

/// Walks a subtree keeping [`KnownConditions`] current and reporting every
/// `if` or `?:` condition the known facts already decide. Reported conditions
/// have their parentheses stripped.
pub struct ConditionScanner<'m, 's, 'a, F> {
    analyzer: TruthinessAnalyzer<'m, 's, 'a>,
    known: KnownConditions,
    on_condition: F,
    skip: Option<&'m dyn Fn(Node<'_>) -> bool>,
}

impl<'m, 's, 'a, F> ConditionScanner<'m, 's, 'a, F>
where
    F: FnMut(Node<'_>, &Verdict),
{
    pub fn new(analyzer: TruthinessAnalyzer<'m, 's, 'a>, on_condition: F) -> Self {
        Self {
            analyzer,
            known: KnownConditions::new(),
            on_condition,
            skip: None,
        }
    }

    /// Declarations for which `skip` returns true are not entered.
    #[must_use]
    pub fn skipping(mut self, skip: &'m dyn Fn(Node<'_>) -> bool) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn scan(&mut self, node: Node<'_>) {
        if node.is_declaration() && self.skip.is_some_and(|skip| skip(node)) {
            return;
        }
        let tree = node.tree();
        match node.data() {
            NodeData::Method { .. } | NodeData::Lambda { .. } => {
                self.known.push_frame();
                self.scan_children(node);
                self.known.pop_frame();
            }
            NodeData::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = tree.node(*cond);
                let when_true = self.analyzer.truthiness(cond, false);
                self.check(cond, &when_true);
                self.within(&when_true, tree.node(*then_branch));
                if let Some(else_branch) = else_branch {
                    let when_false = self.analyzer.truthiness(cond, true);
                    self.within(&when_false, tree.node(*else_branch));
                }
            }
            NodeData::Conditional { cond, .. } => {
                let cond = tree.node(*cond);
                let t = self.analyzer.truthiness(cond, false);
                self.check(cond, &t);
                self.scan_children(node);
            }
            NodeData::Block { stmts } => {
                // After `if (c) return;` the rest of the block runs with `!c`.
                let mut assumed = Vec::new();
                for stmt in stmts.iter().map(|s| tree.node(*s)) {
                    self.scan(stmt);
                    if let NodeData::If {
                        cond,
                        then_branch,
                        else_branch: None,
                    } = stmt.data()
                        && always_exits(tree.node(*then_branch))
                    {
                        let t = self.analyzer.truthiness(tree.node(*cond), true);
                        self.known.assume(&t);
                        assumed.push(t);
                    }
                }
                for t in assumed.iter().rev() {
                    self.known.forget(t);
                }
            }
            _ => self.scan_children(node),
        }
    }

    fn scan_children(&mut self, node: Node<'_>) {
        for child in node.children() {
            self.scan(child);
        }
    }

    fn within(&mut self, t: &Truthiness, node: Node<'_>) {
        self.known.assume(t);
        self.scan(node);
        self.known.forget(t);
    }

    fn check(&mut self, cond: Node<'_>, t: &Truthiness) {
        let verdict = self.known.check(t);
        if !verdict.vacuously_false.is_empty() || !verdict.vacuously_true.is_empty() {
            (self.on_condition)(cond.skip_parens(), &verdict);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(id: u32, name: &str) -> ConstantBooleanExpression {
        ConstantBooleanExpression::Variable {
            symbol: SymbolId(id),
            name: name.to_string(),
        }
    }

    #[test]
    fn equals_is_symmetric() {
        let a = ConstantExpression::Constant(ConstValue::Int(5));
        let b = ConstantExpression::Accessor(vec![PureInvocation {
            symbol: SymbolId(0),
            name: "x".into(),
            args: None,
        }]);
        let ab = ConstantEquals {
            lhs: a.clone(),
            rhs: b.clone(),
        };
        let ba = ConstantEquals { lhs: b, rhs: a };
        assert_eq!(ab, ba);
        let hash = |e: &ConstantEquals| {
            let mut h = DefaultHasher::new();
            e.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash(&ab), hash(&ba));
        assert_eq!(ab.to_string(), "5 equals x");
    }

    #[test]
    fn frames_isolate_methods() {
        let mut known = KnownConditions::new();
        let t = Truthiness {
            required_true: vec![var(1, "flag")],
            required_false: vec![],
        };
        known.push_frame();
        known.assume(&t);
        assert_eq!(known.check(&t).vacuously_true.len(), 1);
        known.pop_frame();
        known.push_frame();
        assert_eq!(known.check(&t), Verdict::default());
    }

    #[test]
    fn multiset_counts_nested_assumptions() {
        let mut known = KnownConditions::new();
        let t = Truthiness {
            required_true: vec![],
            required_false: vec![var(2, "done")],
        };
        known.assume(&t);
        known.assume(&t);
        known.forget(&t);
        assert!(known.is_known_false(&var(2, "done")));
        known.forget(&t);
        assert!(!known.is_known_false(&var(2, "done")));
    }

    #[test]
    fn facts_stay_inside_their_method() {
        let src = "class Gate {
    final boolean open;
    void first() {
        if (open) return;
        if (open) {}
    }
    void second() {
        if (open) {}
    }
}";
        let unit = crate::parser::parse_unit(src, None).unwrap();
        let state = VisitorState::new(&unit.tree, &unit.model);
        let never = |_: Node<'_>, _: &VisitorState<'_>| false;
        let mut seen = Vec::new();
        let analyzer = TruthinessAnalyzer::new(&state, &never);
        ConditionScanner::new(analyzer, |cond: Node<'_>, verdict: &Verdict| {
            seen.push((cond.span().start, verdict.clone()))
        })
        .scan(unit.tree.root());

        let field = unit
            .tree
            .preorder()
            .into_iter()
            .find(|n| n.kind() == NodeKind::Variable)
            .and_then(|n| n.symbol())
            .unwrap();
        let in_first = src.find("if (open) {}").unwrap() + "if (".len();
        let flagged = Verdict {
            vacuously_false: vec![ConstantBooleanExpression::Variable {
                symbol: field,
                name: "open".into(),
            }],
            vacuously_true: vec![],
        };
        assert_eq!(seen, vec![(in_first, flagged)]);
    }
}
