use crate::analysis::overrides::{OverrideKind, classify};
use crate::checker::{BugChecker, CheckerCategory, CheckerDescriptor, FixDescriptor, MatchResult};
use crate::fix::SuggestedFix;
use crate::level::Severity;
use crate::model::SymbolKind;
use crate::state::VisitorState;
use crate::tree::{Node, NodeKind};

const OVERRIDE: &str = "java.lang.Override";

// ============================================================================
// MissingOverride
// ============================================================================

pub struct MissingOverrideChecker;

static MISSING_OVERRIDE: CheckerDescriptor = CheckerDescriptor::new(
    "MissingOverride",
    CheckerCategory::Style,
    Severity::Warning,
    "method overrides method in supertype; expected @Override",
)
.with_link("https://errorprone.info/bugpattern/MissingOverride")
.with_fix(FixDescriptor::safe("Add @Override"))
.with_explanation(
    "Annotating overriding methods with @Override lets the compiler catch \
     signature drift: if the supertype method is renamed or its parameters \
     change, the annotated method stops compiling instead of silently \
     becoming an unrelated overload. Set `MissingOverride:IgnoreInterfaceOverrides` \
     to skip methods that only implement interface methods.",
)
.skip_generated_code();

impl BugChecker for MissingOverrideChecker {
    fn descriptor(&self) -> &'static CheckerDescriptor {
        &MISSING_OVERRIDE
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::Method]
    }

    fn match_method(&self, node: Node<'_>, state: &VisitorState<'_>) -> MatchResult {
        let Some(method) = node.symbol() else {
            return Ok(None);
        };
        let model = state.model();
        let sym = model.symbol(method);
        if sym.kind != SymbolKind::Method || sym.is_static() || has_override(node, state) {
            return Ok(None);
        }
        let Some(kind) = classify(method, model) else {
            return Ok(None);
        };
        let ignore_interfaces = state
            .flags()
            .get_bool("MissingOverride:IgnoreInterfaceOverrides")
            .unwrap_or(false);
        if ignore_interfaces && matches!(kind, OverrideKind::Implements(_)) {
            return Ok(None);
        }

        let message = format!(
            "{} {kind} method in {}; expected @Override",
            sym.name,
            model.symbol(kind.owner()).name
        );
        Ok(Some(
            self.describe(node)
                .message(message)
                .add_fix(SuggestedFix::prefix_with(node, "@Override "))
                .build(),
        ))
    }
}

/// `@Override` resolved through the model, or written with a name the
/// frontend could not resolve.
fn has_override(node: Node<'_>, state: &VisitorState<'_>) -> bool {
    if node
        .symbol()
        .is_some_and(|s| state.model().has_annotation(s, OVERRIDE))
    {
        return true;
    }
    node.annotations()
        .iter()
        .filter_map(|a| a.name())
        .any(|n| n == "Override" || n == OVERRIDE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Flags;
    use crate::checks::test_support::{fixed, run, run_with_flags};

    const SHAPES: &str = r#"
interface Shape {
    double area();
}

abstract class Base implements Shape {
    abstract String label();
}

class Circle extends Base {
    public double area() { return 1; }
    String label() { return "circle"; }
    @Override public int hashCode() { return 1; }
    public boolean equals(Circle other) { return true; }
    static void helper() {}
    Circle() {}
}
"#;

    #[test]
    fn reports_overrides_and_implementations() {
        let found = run(MissingOverrideChecker, SHAPES);
        let messages: Vec<&str> = found.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "area implements method in Shape; expected @Override",
                "label overrides method in Base; expected @Override",
            ]
        );
    }

    #[test]
    fn ignore_interface_overrides_flag() {
        let flags = Flags::new([(
            "MissingOverride:IgnoreInterfaceOverrides".to_string(),
            "true".to_string(),
        )]);
        let found = run_with_flags(MissingOverrideChecker, SHAPES, flags);
        assert_eq!(found.len(), 1);
        assert!(found[0].message.starts_with("label overrides"));
    }

    #[test]
    fn fix_prefixes_the_declaration() {
        let src = r#"
class Named {
    public String toString() { return "named"; }
}
"#;
        let found = run(MissingOverrideChecker, src);
        assert_eq!(found[0].message, "toString overrides method in Object; expected @Override");
        assert!(fixed(src, &found).contains("    @Override public String toString()"));
    }
}
