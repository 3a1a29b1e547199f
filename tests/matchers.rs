use java_clippy::matchers::{
    BoxedMatcher, Matcher, MatcherExt, argument, has_annotation_with_simple_name,
    instance_method, is_same_type, kind_any_of, receiver_same_as_argument,
    static_equals_invocation, symbol_name_matches,
};
use java_clippy::parser::parse_unit;
use java_clippy::state::VisitorState;
use java_clippy::tree::NodeKind;
use regex::Regex;

const INVENTORY: &str = r#"
import java.util.ArrayList;
import java.util.Map;
import java.util.Objects;

class Inventory {
    boolean check(ArrayList<String> items, Map<String, Integer> counts, String key) {
        items.add(key);
        int n = items.size();
        Integer c = counts.get(key);
        return Objects.equals(key, c) && key.isEmpty() && n == 0;
    }
}
"#;

fn table() -> Vec<(&'static str, BoxedMatcher)> {
    vec![
        (
            "collection",
            instance_method()
                .on_descendant_of("java.util.Collection")
                .named_any_of(&["add", "size"])
                .boxed(),
        ),
        (
            "exact-array-list",
            instance_method()
                .on_exact_class("java.util.ArrayList")
                .with_any_name()
                .boxed(),
        ),
        (
            "declared-on-collection",
            instance_method()
                .on_class("java.util.Collection")
                .named("size")
                .with_no_parameters()
                .boxed(),
        ),
        (
            "map-get",
            instance_method()
                .on_descendant_of("java.util.Map")
                .named("get")
                .with_parameters(&["java.lang.Object"])
                .boxed(),
        ),
        ("static-equals", static_equals_invocation().boxed()),
        (
            "predicate",
            instance_method()
                .any_class()
                .with_name_matching(Regex::new("^is").unwrap())
                .boxed(),
        ),
        (
            "string-first-arg",
            argument(0, is_same_type("java.lang.String")).boxed(),
        ),
    ]
}

#[test]
fn method_matchers_over_parsed_source() {
    let unit = parse_unit(INVENTORY, None).unwrap();
    let state = VisitorState::new(&unit.tree, &unit.model);
    let table = table();

    let rows: Vec<(&str, Vec<&str>)> = unit
        .tree
        .preorder()
        .into_iter()
        .filter(|n| n.kind() == NodeKind::MethodInvocation)
        .map(|call| {
            let hits = table
                .iter()
                .filter(|(_, m)| m.matches(call, &state))
                .map(|(name, _)| *name)
                .collect();
            (call.text(), hits)
        })
        .collect();

    assert_eq!(
        rows,
        vec![
            (
                "items.add(key)",
                vec!["collection", "exact-array-list", "string-first-arg"]
            ),
            (
                "items.size()",
                vec!["collection", "exact-array-list", "declared-on-collection"]
            ),
            ("counts.get(key)", vec!["map-get", "string-first-arg"]),
            ("Objects.equals(key, c)", vec!["static-equals", "string-first-arg"]),
            ("key.isEmpty()", vec!["predicate"]),
        ]
    );
}

#[test]
fn matchers_fail_closed_on_unresolved_code() {
    let src = r#"
class A {
    void m(Unknown u) {
        u.size();
        mystery(1);
    }
}
"#;
    let unit = parse_unit(src, None).unwrap();
    let state = VisitorState::new(&unit.tree, &unit.model);
    let table = table();

    for call in unit
        .tree
        .preorder()
        .into_iter()
        .filter(|n| n.kind() == NodeKind::MethodInvocation)
    {
        for (name, m) in &table {
            assert!(!m.matches(call, &state), "{name} matched {}", call.text());
        }
    }
}

#[test]
fn declaration_and_receiver_matchers() {
    let src = r#"
class Ledger {
    @com.acme.Keep
    void keepTotals(String s) {
        s.equals(s);
        s.equals("x");
    }

    @Deprecated
    void dropTotals() {
        while (true) {}
    }
}
"#;
    let unit = parse_unit(src, None).unwrap();
    let state = VisitorState::new(&unit.tree, &unit.model);
    let nodes = unit.tree.preorder();

    let keep = has_annotation_with_simple_name("Keep");
    let totals = symbol_name_matches(Regex::new("Totals$").unwrap());
    let kept: Vec<_> = nodes
        .iter()
        .filter(|n| n.kind() == NodeKind::Method)
        .map(|m| (m.name(), keep.matches(*m, &state), totals.matches(*m, &state)))
        .collect();
    assert_eq!(
        kept,
        vec![(Some("keepTotals"), true, true), (Some("dropTotals"), false, true)]
    );

    let self_compare = receiver_same_as_argument(0);
    let calls: Vec<_> = nodes
        .iter()
        .filter(|n| n.kind() == NodeKind::MethodInvocation)
        .filter(|n| self_compare.matches(**n, &state))
        .map(|n| n.text())
        .collect();
    assert_eq!(calls, vec!["s.equals(s)"]);

    let loops = kind_any_of(&[NodeKind::While, NodeKind::DoWhile, NodeKind::For]);
    assert_eq!(nodes.iter().filter(|n| loops.matches(**n, &state)).count(), 1);
}
