use insta::assert_snapshot;
use java_clippy::create_default_analyzer;
use java_clippy::description::Description;
use java_clippy::fixer;
use std::path::Path;

const SAMPLE: &str = r#"class Sample {
    static final long MILLIS = 1000 * 60 * 60 * 24 * 365;
    boolean check(byte b, String s, Integer i) {
        if (b == 200) {
            return s.equals(s);
        }
        return s.equals(i);
    }
}
"#;

fn render(diags: &[Description]) -> String {
    diags
        .iter()
        .map(|d| {
            format!(
                "{}:{}: {}: {}: {}",
                d.start.row,
                d.start.column,
                d.severity.as_str(),
                d.check_name(),
                d.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn default_checkers_report_in_visit_order() {
    let analyzer = create_default_analyzer().expect("default registry");
    let outcome = analyzer.analyze_source(SAMPLE, None).expect("analysis should succeed");

    assert!(outcome.failures.is_empty(), "{:#?}", outcome.failures);
    assert_snapshot!(render(&outcome.descriptions), @r"
    2:32: error: ConstantOverflow: Compile-time constant expression overflows
    4:13: error: ComparisonOutOfRange: bytes may have a value in the range -128 to 127; therefore, this comparison to 200 will always evaluate to false
    5:20: error: SelfEquals: Testing an object for equality with itself will always be true.
    7:16: warning: EqualsIncompatibleType: Calling equals on incompatible types String and Integer
    ");
}

#[test]
fn unsafe_fixes_need_opt_in() {
    let analyzer = create_default_analyzer().expect("default registry");
    let outcome = analyzer.analyze_source(SAMPLE, None).expect("analysis should succeed");

    let result = fixer::apply_descriptions(SAMPLE, &outcome.descriptions, false).unwrap();
    assert_eq!(result.fixes_applied, 0);
    assert_eq!(result.fixes_unsafe, 2);
    assert_eq!(result.fixed_source, SAMPLE);
}

#[test]
fn fixes_from_different_checkers_compose() {
    let analyzer = create_default_analyzer().expect("default registry");
    let outcome = analyzer.analyze_source(SAMPLE, None).expect("analysis should succeed");

    let result = fixer::apply_descriptions(SAMPLE, &outcome.descriptions, true).unwrap();
    assert_eq!(result.fixes_applied, 2);
    assert_eq!(result.fixes_conflicting, 0);

    let diff = fixer::format_diff(SAMPLE, &result.fixed_source, Path::new("Sample.java"));
    assert_snapshot!(diff.trim_end(), @r"
    --- a/Sample.java
    +++ b/Sample.java
    @@ -1,7 +1,7 @@
     class Sample {
    -    static final long MILLIS = 1000 * 60 * 60 * 24 * 365;
    +    static final long MILLIS = 1000L * 60 * 60 * 24 * 365;
         boolean check(byte b, String s, Integer i) {
    -        if (b == 200) {
    +        if (b == -56) {
                 return s.equals(s);
             }
             return s.equals(i);
    ");

    // The patched unit is clean for the fixed checkers.
    let again = analyzer
        .analyze_source(&result.fixed_source, None)
        .expect("analysis should succeed");
    let names: Vec<&str> = again.descriptions.iter().map(|d| d.check_name()).collect();
    assert_eq!(names, vec!["SelfEquals", "EqualsIncompatibleType"]);
}

#[test]
fn already_checked_end_to_end() {
    let src = r#"class Guard {
    int m(String name, boolean verbose) {
        if (name.isEmpty()) {
            return 0;
        }
        if (verbose) {
            if (!name.isEmpty() && verbose) {
                return 1;
            }
        }
        return 2;
    }
}
"#;
    let analyzer = create_default_analyzer().expect("default registry");
    let outcome = analyzer.analyze_source(src, None).expect("analysis should succeed");
    assert_snapshot!(render(&outcome.descriptions), @r"
    7:17: warning: AlreadyChecked: This condition (on [verbose, name.isEmpty()]) is vacuously true; it's already been checked by this point.
    ");
}

#[test]
fn nested_repeat_of_a_local_comparison_is_reported_once() {
    let src = r#"class Counter {
    void m() {
        int x = 5;
        if (x == 5) {
            if (x == 5) {
                return;
            }
        }
    }
}
"#;
    let analyzer = create_default_analyzer().expect("default registry");
    let outcome = analyzer.analyze_source(src, None).expect("analysis should succeed");
    assert!(outcome.failures.is_empty(), "{:#?}", outcome.failures);
    let found: Vec<_> = outcome
        .descriptions
        .iter()
        .map(|d| (d.check_name(), d.start.row, d.start.column))
        .collect();
    assert_eq!(found, vec![("AlreadyChecked", 5, 17)]);
}

#[test]
fn syntax_errors_do_not_stop_analysis() {
    let src = "class Broken {\n    boolean m(String s) { return s.equals(s) }\n}\n";
    let analyzer = create_default_analyzer().expect("default registry");
    let outcome = analyzer.analyze_source(src, None).expect("analysis should succeed");
    assert!(outcome.failures.is_empty());
}
