use crate::analysis::constant::{ConstantError, Number, evaluate};
use crate::analysis::equivalence::{is_this, same_variable};
use crate::analysis::TypeCompatibility;
use crate::checker::{BugChecker, CheckerCategory, CheckerDescriptor, FixDescriptor, MatchResult};
use crate::fix::SuggestedFix;
use crate::level::Severity;
use crate::matchers::{Matcher, instance_equals_invocation, static_equals_invocation};
use crate::model::Type;
use crate::state::VisitorState;
use crate::tree::{BinaryOp, Literal, Node, NodeData, NodeKind, PrimitiveKind};

// ============================================================================
// ComparisonOutOfRange
// ============================================================================

pub struct ComparisonOutOfRangeChecker;

static COMPARISON_OUT_OF_RANGE: CheckerDescriptor = CheckerDescriptor::new(
    "ComparisonOutOfRange",
    CheckerCategory::Correctness,
    Severity::Error,
    "Comparison to value that is out of range for the compared type",
)
.with_link("https://errorprone.info/bugpattern/ComparisonOutOfRange")
.with_fix(FixDescriptor::unsafe_fix("Replace with the constant result"))
.with_explanation(
    "A byte holds values from -128 to 127 and a char from 0 to 65535. Comparing \
     one against a constant outside that range always yields the same answer, \
     which usually means the constant was written for a different type: \
     `b == 0xFF` never holds for a signed byte.",
);

impl BugChecker for ComparisonOutOfRangeChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &COMPARISON_OUT_OF_RANGE
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::Binary]
    }

    fn match_binary(&self, node: Node<'_>, state: &VisitorState<'_>) -> MatchResult {
        let Some(op) = node.binary_op().filter(BinaryOp::is_comparison) else {
            return Ok(None);
        };
        let Some((lhs, rhs)) = node.operands() else {
            return Ok(None);
        };
        let model = state.model();

        // Normalise to `operand <op> constant`.
        let (operand, constant, value, op) =
            match (integral_constant(lhs, state), integral_constant(rhs, state)) {
                (None, Some(v)) => (lhs, rhs, v, op),
                (Some(v), None) => (rhs, lhs, v, flip(op)),
                _ => return Ok(None),
            };
        let Some(kind) = operand
            .ty()
            .and_then(|t| model.unboxed_or_self(t))
            .filter(|k| matches!(k, PrimitiveKind::Byte | PrimitiveKind::Char))
        else {
            return Ok(None);
        };
        let Some((lo, hi)) = kind.range() else {
            return Ok(None);
        };
        if (lo..=hi).contains(&value) {
            return Ok(None);
        }

        let outcome = match op {
            BinaryOp::Eq => false,
            BinaryOp::Ne => true,
            BinaryOp::Lt | BinaryOp::Le => value > hi,
            BinaryOp::Gt | BinaryOp::Ge => value < lo,
            _ => return Ok(None),
        };

        let is_literal = matches!(constant.skip_parens().literal(), Some(Literal::Value(_)));
        let fix = if kind == PrimitiveKind::Byte
            && op.is_equality()
            && is_literal
            && (128..=255).contains(&value)
        {
            SuggestedFix::replace(constant, (value as i8).to_string())
        } else {
            SuggestedFix::replace(node, outcome.to_string())
        };

        let message = format!(
            "{kind}s may have a value in the range {lo} to {hi}; therefore, this comparison to \
             {} will always evaluate to {outcome}",
            constant.text()
        );
        Ok(Some(self.describe(node).message(message).add_fix(fix).build()))
    }
}

fn integral_constant(node: Node<'_>, state: &VisitorState<'_>) -> Option<i64> {
    evaluate(node, state.model()).ok().flatten().map(Number::as_i64)
}

/// The operator seen from the other side: `c < x` is `x > c`.
fn flip(op: BinaryOp) -> BinaryOp {
    match op {
        BinaryOp::Lt => BinaryOp::Gt,
        BinaryOp::Gt => BinaryOp::Lt,
        BinaryOp::Le => BinaryOp::Ge,
        BinaryOp::Ge => BinaryOp::Le,
        other => other,
    }
}

// ============================================================================
// ConstantOverflow
// ============================================================================

pub struct ConstantOverflowChecker;

static CONSTANT_OVERFLOW: CheckerDescriptor = CheckerDescriptor::new(
    "ConstantOverflow",
    CheckerCategory::Correctness,
    Severity::Error,
    "Compile-time constant expression overflows",
)
.with_link("https://errorprone.info/bugpattern/ConstantOverflow")
.with_fix(FixDescriptor::unsafe_fix("Evaluate the expression as a long"))
.with_explanation(
    "Integer arithmetic in a constant expression silently wraps. When the \
     expression is meant to be a long, write the leftmost operand as a long \
     literal so the whole computation happens in 64 bits.",
);

impl BugChecker for ConstantOverflowChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &CONSTANT_OVERFLOW
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::Binary]
    }

    fn match_binary(&self, node: Node<'_>, state: &VisitorState<'_>) -> MatchResult {
        // Only the outermost binary of an expression reports.
        for parent in node.ancestors() {
            if !parent.kind().is_expression() {
                break;
            }
            if parent.kind() == NodeKind::Binary {
                return Ok(None);
            }
        }
        match evaluate(node, state.model()) {
            Err(ConstantError::Overflow) => {}
            Ok(_) | Err(ConstantError::DivisionByZero) => return Ok(None),
        }
        Ok(Some(self.describe(node).add_fix_opt(long_fix(node)?).build()))
    }
}

/// Make the leftmost operand a `long` literal, widening an `int` declaration
/// that receives the value.
fn long_fix(node: Node<'_>) -> Result<Option<SuggestedFix>, crate::fix::FixError> {
    let int = Type::Primitive(PrimitiveKind::Int);
    if node.ty() != Some(&int) {
        return Ok(None);
    }
    let mut leftmost = node.skip_parens();
    while let Some((lhs, _)) = leftmost.operands() {
        leftmost = lhs.skip_parens();
    }
    if leftmost.kind() != NodeKind::Literal || leftmost.ty() != Some(&int) {
        return Ok(None);
    }

    let mut fix = SuggestedFix::builder();
    fix.set_short_description("Evaluate as long")
        .postfix_with(leftmost, "L");
    if let Some(parent) = node.parent()
        && let NodeData::Variable {
            var_type: Some(var_type),
            init: Some(init),
            ..
        } = parent.data()
        && *init == node.id()
    {
        let var_type = node.tree().node(*var_type);
        if var_type.text() == "int" {
            fix.replace(var_type, "long");
        }
    }
    fix.build().map(Some)
}

// ============================================================================
// EqualsIncompatibleType
// ============================================================================

pub struct EqualsIncompatibleTypeChecker;

static EQUALS_INCOMPATIBLE_TYPE: CheckerDescriptor = CheckerDescriptor::new(
    "EqualsIncompatibleType",
    CheckerCategory::Correctness,
    Severity::Warning,
    "An equality test between objects with incompatible types always returns false",
)
.with_link("https://errorprone.info/bugpattern/EqualsIncompatibleType")
.with_alt_names(&["IncompatibleEquals"])
.with_explanation(
    "Two objects can only be equal when some common supertype other than \
     Object declares equals for them. Comparing unrelated types, or the same \
     generic container with incompatible type arguments, always returns false.",
);

impl BugChecker for EqualsIncompatibleTypeChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &EQUALS_INCOMPATIBLE_TYPE
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::MethodInvocation]
    }

    fn match_method_invocation(&self, node: Node<'_>, state: &VisitorState<'_>) -> MatchResult {
        let (receiver_type, argument_type) = if static_equals_invocation().matches(node, state) {
            match (node.argument(0), node.argument(1)) {
                (Some(a), Some(b)) => (a.ty().cloned(), b.ty().cloned()),
                _ => return Ok(None),
            }
        } else if instance_equals_invocation().matches(node, state) {
            let receiver = match node.receiver() {
                Some(r) => r.ty().cloned(),
                None => enclosing_class_type(node, state),
            };
            (receiver, node.argument(0).and_then(|a| a.ty().cloned()))
        } else {
            return Ok(None);
        };
        let (Some(receiver_type), Some(argument_type)) = (receiver_type, argument_type) else {
            return Ok(None);
        };

        // `assertFalse(a.equals(b))` is a deliberate test of inequality.
        if let Some(parent) = node.parent()
            && parent.kind() == NodeKind::MethodInvocation
            && parent.name() == Some("assertFalse")
        {
            return Ok(None);
        }

        let model = state.model();
        let report = TypeCompatibility::new(state.flags()).compatibility_of_types(
            &receiver_type,
            &argument_type,
            model,
        );
        if report.is_compatible() {
            return Ok(None);
        }
        let lhs = report.lhs.unwrap_or(receiver_type);
        let rhs = report.rhs.unwrap_or(argument_type);
        let (mut left, mut right) = (model.display_type(&lhs), model.display_type(&rhs));
        if left == right {
            left = model.display_type_qualified(&lhs);
            right = model.display_type_qualified(&rhs);
        }
        let message = format!(
            "Calling {} on incompatible types {left} and {right}{}",
            node.name().unwrap_or("equals"),
            report.extra_reason
        );
        Ok(Some(self.describe(node).message(message).build()))
    }
}

fn enclosing_class_type(node: Node<'_>, state: &VisitorState<'_>) -> Option<Type> {
    let class = node.enclosing(NodeKind::Class)?.symbol()?;
    Some(state.model().symbol(class).ty.clone())
}

// ============================================================================
// SelfEquals
// ============================================================================

pub struct SelfEqualsChecker;

static SELF_EQUALS: CheckerDescriptor = CheckerDescriptor::new(
    "SelfEquals",
    CheckerCategory::Correctness,
    Severity::Error,
    "Testing an object for equality with itself will always be true.",
)
.with_link("https://errorprone.info/bugpattern/SelfEquals")
.with_alt_names(&["SelfComparison"])
.with_explanation(
    "`x.equals(x)`, `Objects.equals(x, x)` and `x == x` compare a variable \
     with itself. The intended comparison was almost always against another \
     variable or a field of another object. Floating point `==` is exempt \
     since it is the NaN test.",
);

impl BugChecker for SelfEqualsChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &SELF_EQUALS
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::MethodInvocation, NodeKind::Binary]
    }

    fn match_method_invocation(&self, node: Node<'_>, state: &VisitorState<'_>) -> MatchResult {
        let self_compared = if static_equals_invocation().matches(node, state) {
            matches!(
                (node.argument(0), node.argument(1)),
                (Some(a), Some(b)) if same_variable(a, b)
            )
        } else if instance_equals_invocation().matches(node, state) {
            match (node.receiver(), node.argument(0)) {
                (Some(receiver), Some(arg)) => {
                    same_variable(receiver, arg) || (is_this(receiver) && is_this(arg))
                }
                (None, Some(arg)) => is_this(arg),
                _ => false,
            }
        } else {
            false
        };
        Ok(self_compared.then(|| self.describe(node).build()))
    }

    fn match_binary(&self, node: Node<'_>, state: &VisitorState<'_>) -> MatchResult {
        let Some(op) = node.binary_op().filter(BinaryOp::is_equality) else {
            return Ok(None);
        };
        let Some((lhs, rhs)) = node.operands() else {
            return Ok(None);
        };
        if !same_variable(lhs, rhs) {
            return Ok(None);
        }
        let floating = lhs
            .ty()
            .and_then(|t| state.model().unboxed_or_self(t))
            .is_some_and(|k| matches!(k, PrimitiveKind::Float | PrimitiveKind::Double));
        if floating {
            return Ok(None);
        }
        let outcome = op == BinaryOp::Eq;
        Ok(Some(
            self.describe(node)
                .message(format!(
                    "Testing an object for equality with itself will always be {outcome}."
                ))
                .build(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Flags;
    use crate::checks::test_support::{fixed, flagged, run, run_with_flags};

    #[test]
    fn byte_compared_with_unsigned_literal() {
        let src = r#"
class A {
    boolean m(byte b) {
        return b == 200;
    }
}
"#;
        let found = run(ComparisonOutOfRangeChecker, src);
        assert_eq!(flagged(src, &found), vec!["b == 200"]);
        assert_eq!(
            found[0].message,
            "bytes may have a value in the range -128 to 127; therefore, this comparison to 200 \
             will always evaluate to false"
        );
        assert!(fixed(src, &found).contains("return b == -56;"));
    }

    #[test]
    fn char_relational_comparison_folds_to_constant() {
        let src = r#"
class A {
    boolean m(char c) {
        return -1 < c;
    }
}
"#;
        let found = run(ComparisonOutOfRangeChecker, src);
        assert_eq!(flagged(src, &found), vec!["-1 < c"]);
        assert!(found[0].message.ends_with("will always evaluate to true"));
        assert!(fixed(src, &found).contains("return true;"));
    }

    #[test]
    fn in_range_and_wider_comparisons_are_fine() {
        let src = r#"
class A {
    boolean m(byte b, char c, int i, Byte boxed) {
        return b == 127 && c == 65535 && i == 200 && boxed == -128 && b == b;
    }
}
"#;
        assert!(run(ComparisonOutOfRangeChecker, src).is_empty());
    }

    #[test]
    fn boxed_byte_out_of_range() {
        let src = r#"
class A {
    static final int LIMIT = 1000;
    boolean m(Byte b) {
        return b != LIMIT;
    }
}
"#;
        let found = run(ComparisonOutOfRangeChecker, src);
        assert_eq!(flagged(src, &found), vec!["b != LIMIT"]);
        assert!(found[0].message.ends_with("comparison to LIMIT will always evaluate to true"));
    }

    #[test]
    fn overflow_reports_outermost_expression_only() {
        let src = r#"
class A {
    static final int MILLIS = 1000 * 60 * 60 * 24 * 365;
}
"#;
        let found = run(ConstantOverflowChecker, src);
        assert_eq!(flagged(src, &found), vec!["1000 * 60 * 60 * 24 * 365"]);
        assert_eq!(found[0].message, "Compile-time constant expression overflows");
        assert!(
            fixed(src, &found).contains("static final long MILLIS = 1000L * 60 * 60 * 24 * 365;")
        );
    }

    #[test]
    fn overflow_in_long_expression_has_no_fix() {
        let src = r#"
class A {
    long m() {
        return Long.MAX_VALUE + 1;
    }
}
"#;
        let found = run(ConstantOverflowChecker, src);
        assert_eq!(flagged(src, &found), vec!["Long.MAX_VALUE + 1"]);
        assert!(found[0].first_fix().is_none());
    }

    #[test]
    fn non_overflowing_and_non_constant_arithmetic_is_quiet() {
        let src = r#"
class A {
    static final long OK = 1000L * 60 * 60 * 24 * 365;
    int m(int x) {
        int y = x * 1000000 * 1000000;
        int z = 1 / 0;
        return y + z + (1 << 40);
    }
}
"#;
        assert!(run(ConstantOverflowChecker, src).is_empty());
    }

    #[test]
    fn equals_on_unrelated_types() {
        let src = r#"
class A {
    boolean m(String s, Integer i) {
        return s.equals(i);
    }
}
"#;
        let found = run(EqualsIncompatibleTypeChecker, src);
        assert_eq!(flagged(src, &found), vec!["s.equals(i)"]);
        assert_eq!(found[0].message, "Calling equals on incompatible types String and Integer");
    }

    #[test]
    fn static_equals_and_assert_false() {
        let src = r#"
import java.util.Objects;

class A {
    boolean m(String s, Long l) {
        assertFalse(s.equals(l));
        return Objects.equals(l, s);
    }
    static void assertFalse(boolean b) {}
}
"#;
        let found = run(EqualsIncompatibleTypeChecker, src);
        assert_eq!(flagged(src, &found), vec!["Objects.equals(l, s)"]);
        assert_eq!(found[0].message, "Calling equals on incompatible types Long and String");
    }

    #[test]
    fn related_types_are_compatible() {
        let src = r#"
class Base {}
class Derived extends Base {}
interface Marker {}

class A {
    boolean m(Base b, Derived d, Marker m, Object o, String s) {
        return b.equals(d) && d.equals(b) && b.equals(m) && o.equals(s) && s.equals(null);
    }
}
"#;
        assert!(run(EqualsIncompatibleTypeChecker, src).is_empty());
    }

    #[test]
    fn builders_without_equals_are_incomparable() {
        let src = r#"
final class Builder {}

class A {
    boolean m(Builder a, Builder b) {
        return a.equals(b);
    }
}
"#;
        let found = run(EqualsIncompatibleTypeChecker, src);
        assert_eq!(
            found[0].message,
            "Calling equals on incompatible types Builder and Builder. Though these types are \
             the same, the type doesn't implement equals."
        );

        let flags = Flags::new([(
            "TypeCompatibility:TreatBuildersAsIncomparable".to_string(),
            "false".to_string(),
        )]);
        assert!(run_with_flags(EqualsIncompatibleTypeChecker, src, flags).is_empty());
    }

    #[test]
    fn self_equals_variants() {
        let src = r#"
import java.util.Objects;

class A {
    String name;
    boolean m(String s, A other, double d) {
        boolean x = s.equals(s);
        boolean y = Objects.equals(this.name, name);
        boolean z = equals(this);
        boolean w = s == s;
        boolean nan = d == d;
        boolean fine = name.equals(other.name);
        return x && y && z && w && nan && fine;
    }
}
"#;
        let found = run(SelfEqualsChecker, src);
        assert_eq!(
            flagged(src, &found),
            vec!["s.equals(s)", "Objects.equals(this.name, name)", "equals(this)", "s == s"]
        );
        assert_eq!(
            found[3].message,
            "Testing an object for equality with itself will always be true."
        );
    }
}
