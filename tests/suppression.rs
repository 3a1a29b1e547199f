use java_clippy::config::SuppressionConfig;
use java_clippy::suppression::{AnnotationSuppressor, NoSuppression};
use java_clippy::{Analyzer, create_default_analyzer};
use std::path::Path;

fn names(analyzer: &Analyzer, src: &str, path: Option<&Path>) -> Vec<&'static str> {
    analyzer
        .analyze_source(src, path)
        .expect("analysis should succeed")
        .descriptions
        .iter()
        .map(|d| d.check_name())
        .collect()
}

#[test]
fn suppress_warnings_on_class_covers_members() {
    let src = r#"
@SuppressWarnings("SelfEquals")
class A {
    boolean m(String s) { return s.equals(s); }

    class Inner {
        boolean n(String s) { return s.equals(s); }
    }
}

class B {
    boolean m(String s) { return s.equals(s); }
}
"#;
    let analyzer = create_default_analyzer().expect("default registry");
    assert_eq!(names(&analyzer, src, None), vec!["SelfEquals"]);
}

#[test]
fn alternative_names_and_all_suppress() {
    let src = r#"
class A {
    @SuppressWarnings("SelfComparison")
    boolean m(String s) { return s.equals(s); }

    @SuppressWarnings({"unchecked", "all"})
    boolean n(String s, Integer i) { return s.equals(s) && s.equals(i); }
}
"#;
    let analyzer = create_default_analyzer().expect("default registry");
    assert!(names(&analyzer, src, None).is_empty());
}

#[test]
fn suppression_on_a_local_variable() {
    let src = r#"
class A {
    void m(String s) {
        @SuppressWarnings("SelfEquals")
        boolean quiet = s.equals(s);
        boolean loud = s.equals(s);
    }
}
"#;
    let analyzer = create_default_analyzer().expect("default registry");
    let outcome = analyzer.analyze_source(src, None).expect("analysis should succeed");
    assert_eq!(outcome.descriptions.len(), 1);
    let loud = src.find("loud").unwrap();
    assert!(outcome.descriptions[0].span.start > loud);
}

#[test]
fn generated_code_skips_opted_out_checkers() {
    let src = r#"
@javax.annotation.processing.Generated("tool")
class Gen {
    public String toString() { return "gen"; }
    boolean m(String s) { return s.equals(s); }
}
"#;
    // MissingOverride opts out of generated code; SelfEquals does not.
    let analyzer = create_default_analyzer().expect("default registry");
    assert_eq!(names(&analyzer, src, None), vec!["SelfEquals"]);

    let config = SuppressionConfig {
        generated_code: false,
        ..SuppressionConfig::default()
    };
    let analyzer = create_default_analyzer()
        .expect("default registry")
        .with_suppressor(AnnotationSuppressor::from_config(&config).unwrap());
    assert_eq!(names(&analyzer, src, None), vec!["MissingOverride", "SelfEquals"]);
}

#[test]
fn excluded_paths_skip_whole_units() {
    let src = "class A { boolean m(String s) { return s.equals(s); } }\n";
    let config = SuppressionConfig {
        exclude_paths: vec![r"/generated/".to_string()],
        ..SuppressionConfig::default()
    };
    let analyzer = create_default_analyzer()
        .expect("default registry")
        .with_suppressor(AnnotationSuppressor::from_config(&config).unwrap());

    let excluded = Path::new("build/generated/A.java");
    assert!(names(&analyzer, src, Some(excluded)).is_empty());
    assert_eq!(names(&analyzer, src, Some(Path::new("src/A.java"))), vec!["SelfEquals"]);
    assert_eq!(names(&analyzer, src, None), vec!["SelfEquals"]);
}

#[test]
fn invalid_exclude_regex_is_an_error() {
    let config = SuppressionConfig {
        exclude_paths: vec!["(".to_string()],
        ..SuppressionConfig::default()
    };
    let err = AnnotationSuppressor::from_config(&config).unwrap_err();
    assert!(format!("{err:#}").contains("invalid exclude_paths regex"));
}

#[test]
fn no_suppression_reports_everything() {
    let src = r#"
@SuppressWarnings("all")
class A {
    boolean m(String s) { return s.equals(s); }
}
"#;
    let analyzer = create_default_analyzer()
        .expect("default registry")
        .with_suppressor(NoSuppression);
    assert_eq!(names(&analyzer, src, None), vec!["SelfEquals"]);
}

const REPEATED_CHECK: &str = r#"
class A {
    @Keep
    @SuppressWarnings("AlreadyChecked")
    void m(boolean flag) {
        if (flag) {
            if (flag) {}
        }
    }
}
"#;

#[test]
fn nested_scans_use_the_configured_suppressor() {
    let analyzer = create_default_analyzer().expect("default registry");
    assert!(names(&analyzer, REPEATED_CHECK, None).is_empty());

    let analyzer = create_default_analyzer()
        .expect("default registry")
        .with_suppressor(NoSuppression);
    assert_eq!(names(&analyzer, REPEATED_CHECK, None), vec!["AlreadyChecked"]);

    let custom_only = REPEATED_CHECK.replace("    @SuppressWarnings(\"AlreadyChecked\")\n", "");
    let analyzer = create_default_analyzer().expect("default registry");
    assert_eq!(names(&analyzer, &custom_only, None), vec!["AlreadyChecked"]);

    let analyzer = create_default_analyzer()
        .expect("default registry")
        .with_suppressor(AnnotationSuppressor::new().with_custom_annotation("com.acme.Keep"));
    assert!(names(&analyzer, &custom_only, None).is_empty());
}
