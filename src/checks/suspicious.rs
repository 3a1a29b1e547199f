use crate::analysis::truthiness::{ConditionScanner, TruthinessAnalyzer, Verdict, format_facts};
use crate::checker::{BugChecker, CheckerCategory, CheckerDescriptor, Flags, MatchResult};
use crate::level::Severity;
use crate::matchers::{
    Matcher, MatcherExt, any_of, has_annotation, instance_equals_invocation,
    static_equals_invocation,
};
use crate::state::VisitorState;
use crate::tree::{Node, NodeId, NodeKind};

// ============================================================================
// AlreadyChecked
// ============================================================================

pub struct AlreadyCheckedChecker;

static ALREADY_CHECKED: CheckerDescriptor = CheckerDescriptor::new(
    "AlreadyChecked",
    CheckerCategory::Suspicious,
    Severity::Warning,
    "This condition has already been checked.",
)
.with_link("https://errorprone.info/bugpattern/AlreadyChecked")
.with_explanation(
    "A condition that an enclosing `if` (or an earlier early return) has \
     already decided is either always true or always false at this point. \
     Usually one of the two checks tests the wrong variable. Method calls \
     count as the same value only when they are known to be pure: methods \
     of immutable types, `@Pure` methods, equals, and AutoValue accessors. \
     Extra immutable types can be listed, comma separated, in the \
     `Immutable:KnownImmutable` flag.",
);

const KNOWN_IMMUTABLE_FLAG: &str = "Immutable:KnownImmutable";

const KNOWN_IMMUTABLE: &[&str] = &[
    "java.lang.String",
    "java.lang.Boolean",
    "java.lang.Byte",
    "java.lang.Character",
    "java.lang.Short",
    "java.lang.Integer",
    "java.lang.Long",
    "java.lang.Float",
    "java.lang.Double",
    "java.math.BigInteger",
    "java.math.BigDecimal",
    "java.util.Optional",
    "com.google.common.base.Optional",
    "com.google.common.collect.ImmutableCollection",
    "com.google.common.collect.ImmutableList",
    "com.google.common.collect.ImmutableSet",
    "com.google.common.collect.ImmutableMap",
];

impl BugChecker for AlreadyCheckedChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &ALREADY_CHECKED
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::CompilationUnit]
    }

    fn match_compilation_unit(&self, node: Node<'_>, state: &VisitorState<'_>) -> MatchResult {
        let pure = pure_method(state.flags());
        let skip = |decl: Node<'_>| state.is_suppressed_at(decl, &ALREADY_CHECKED);

        let mut found: Vec<(NodeId, Verdict)> = Vec::new();
        let analyzer = TruthinessAnalyzer::new(state, &pure);
        ConditionScanner::new(analyzer, |cond: Node<'_>, verdict: &Verdict| {
            found.push((cond.id(), verdict.clone()))
        })
        .skipping(&skip)
        .scan(node);

        for (cond, verdict) in found {
            let cond = state.tree().node(cond);
            if !verdict.vacuously_false.is_empty() {
                let message = format!(
                    "This condition (on {}) is vacuously false.",
                    format_facts(&verdict.vacuously_false)
                );
                state.report_match(self.describe(cond).message(message).build());
            }
            if !verdict.vacuously_true.is_empty() {
                let message = format!(
                    "This condition (on {}) is vacuously true; it's already been checked by \
                     this point.",
                    format_facts(&verdict.vacuously_true)
                );
                state.report_match(self.describe(cond).message(message).build());
            }
        }
        Ok(None)
    }
}

/// Invocations whose result can't change between two evaluations with the
/// same receiver and arguments.
fn pure_method(flags: &Flags) -> impl Matcher + use<> {
    let mut immutable: Vec<String> = KNOWN_IMMUTABLE.iter().map(|s| s.to_string()).collect();
    if let Some(extra) = flags.get(KNOWN_IMMUTABLE_FLAG) {
        immutable.extend(
            extra
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
    }

    let on_immutable = move |node: Node<'_>, state: &VisitorState<'_>| {
        let model = state.model();
        let Some(method) = state.symbol(node) else {
            return false;
        };
        let site = if method.is_static() {
            method.owner
        } else {
            match node.receiver() {
                Some(r) => r.ty().and_then(|t| model.upper_bound(t).class_sym()),
                None => node.enclosing(NodeKind::Class).and_then(|c| c.symbol()),
            }
        };
        let Some(site) = site else {
            return false;
        };
        immutable.iter().any(|name| {
            model.resolve_class(name).is_some_and(|class| {
                if method.is_static() {
                    site == class
                } else {
                    model.is_subclass(site, class)
                }
            })
        })
    };

    let auto_value_accessor = |node: Node<'_>, state: &VisitorState<'_>| {
        let model = state.model();
        state.symbol(node).is_some_and(|m| {
            m.is_abstract()
                && m.owner
                    .is_some_and(|o| model.has_annotation(o, "com.google.auto.value.AutoValue"))
        })
    };

    any_of([
        on_immutable.boxed(),
        has_annotation("org.checkerframework.dataflow.qual.Pure").boxed(),
        static_equals_invocation().boxed(),
        instance_equals_invocation().boxed(),
        auto_value_accessor.boxed(),
    ])
}
