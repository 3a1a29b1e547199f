use insta::assert_snapshot;
use java_clippy::checker::{CheckerCategory, CheckerDescriptor, FixDescriptor};
use java_clippy::description::Description;
use java_clippy::fix::{FixError, SuggestedFix, apply_fix};
use java_clippy::fixer;
use java_clippy::level::Severity;
use java_clippy::parser::{ParsedUnit, parse_unit};
use java_clippy::tree::{Node, NodeKind};

static REWRITE: CheckerDescriptor = CheckerDescriptor::new(
    "Rewrite",
    CheckerCategory::Style,
    Severity::Suggestion,
    "rewrite",
)
.with_fix(FixDescriptor::safe("Rewrite"));

const NAMES: &str = r#"package demo;

import java.util.List;

class Names {
    List<String> copy(List<String> xs) {
        return new java.util.ArrayList<>(xs);
    }

    int sum(int a, int b) {
        return a - b;
    }
}
"#;

fn parse(src: &str) -> ParsedUnit {
    parse_unit(src, None).expect("source should parse")
}

fn find<'t>(unit: &'t ParsedUnit, kind: NodeKind, text: &str) -> Node<'t> {
    unit.tree
        .preorder()
        .into_iter()
        .find(|n| n.kind() == kind && n.text() == text)
        .unwrap_or_else(|| panic!("no {kind:?} node `{text}`"))
}

#[test]
fn replacement_with_import_rewrites_the_import_block() {
    let unit = parse(NAMES);
    let new_class = find(&unit, NodeKind::NewClass, "new java.util.ArrayList<>(xs)");

    let fix = SuggestedFix::builder()
        .replace(new_class, "ImmutableList.copyOf(xs)")
        .add_import("com.google.common.collect.ImmutableList")
        .build()
        .unwrap();
    let fixed = apply_fix(NAMES, &fix).unwrap();
    assert_snapshot!(fixed, @r"
    package demo;

    import com.google.common.collect.ImmutableList;

    import java.util.List;

    class Names {
        List<String> copy(List<String> xs) {
            return ImmutableList.copyOf(xs);
        }

        int sum(int a, int b) {
            return a - b;
        }
    }
    ");
}

#[test]
fn edit_order_does_not_change_the_fix() {
    let unit = parse(NAMES);
    let minus = find(&unit, NodeKind::Binary, "a - b");
    let (a, b) = minus.operands().expect("binary operands");

    let forward = SuggestedFix::builder()
        .swap(a, b)
        .postfix_with(minus, " /* swapped */")
        .build()
        .unwrap();
    let backward = SuggestedFix::builder()
        .postfix_with(minus, " /* swapped */")
        .replace(b, "a")
        .replace(a, "b")
        .build()
        .unwrap();
    assert_eq!(forward.replacements(), backward.replacements());
    assert!(
        apply_fix(NAMES, &forward)
            .unwrap()
            .contains("return b - a /* swapped */;")
    );
}

#[test]
fn overlapping_edits_are_rejected_at_build() {
    let unit = parse(NAMES);
    let minus = find(&unit, NodeKind::Binary, "a - b");
    let (a, _) = minus.operands().expect("binary operands");

    let err = SuggestedFix::builder()
        .replace(minus, "0")
        .replace(a, "c")
        .build()
        .unwrap_err();
    assert!(matches!(err, FixError::Overlapping { .. }));
}

#[test]
fn host_patch_pass_skips_fixes_that_clash() {
    let unit = parse(NAMES);
    let minus = find(&unit, NodeKind::Binary, "a - b");
    let (a, b) = minus.operands().expect("binary operands");

    let describe = |node: Node<'_>, fix: SuggestedFix| {
        Description::builder(&REWRITE, node).add_fix(fix).build()
    };
    let descriptions = vec![
        describe(a, SuggestedFix::replace(a, "left")),
        describe(minus, SuggestedFix::replace(minus, "0")),
        describe(b, SuggestedFix::replace(b, "right")),
    ];

    let result = fixer::apply_descriptions(NAMES, &descriptions, false).unwrap();
    assert_eq!(result.fixes_applied, 2);
    assert_eq!(result.fixes_conflicting, 1);
    assert!(result.fixed_source.contains("return left - right;"));

    // Whichever fix comes first wins.
    let reordered = [descriptions[1].clone(), descriptions[0].clone(), descriptions[2].clone()];
    let result = fixer::apply_descriptions(NAMES, &reordered, false).unwrap();
    assert_eq!(result.fixes_applied, 1);
    assert_eq!(result.fixes_conflicting, 2);
    assert!(result.fixed_source.contains("return 0;"));
}
