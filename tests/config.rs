use java_clippy::Analyzer;
use java_clippy::checker::CheckerRegistry;
use java_clippy::config::{self, DEFAULT_CONFIG_FILE_NAME};
use java_clippy::level::Severity;
use java_clippy::suppression::AnnotationSuppressor;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CONFIG: &str = r#"
[checks]
disabled = ["SelfEquals"]
EqualsIncompatibleType = "error"

[flags]
"MissingOverride:IgnoreInterfaceOverrides" = true

[suppression]
custom_annotations = ["com.acme.Quiet"]
"#;

const SOURCE: &str = r#"
interface Named {
    String name();
}

class Person implements Named {
    public String name() { return "p"; }
    public String toString() { return "person"; }

    boolean same(String s, Integer i) {
        return s.equals(s) || s.equals(i);
    }

    @Quiet
    boolean quiet(String s, Long l) {
        return s.equals(l);
    }
}
"#;

fn analyzer_for(project: &Path) -> Analyzer {
    let start = project.join("src/main/java");
    let (path, cfg) = config::load_config(None, &start)
        .expect("config should load")
        .expect("config should be discovered");
    assert_eq!(path, project.join(DEFAULT_CONFIG_FILE_NAME));

    let empty: Vec<String> = Vec::new();
    let registry =
        CheckerRegistry::default_checkers_filtered(&empty, &empty, &cfg.checks.disabled, false)
            .expect("registry");
    let suppressor = AnnotationSuppressor::from_config(&cfg.suppression).expect("suppressor");
    Analyzer::with_settings(registry, cfg.checker_settings()).with_suppressor(suppressor)
}

fn project_with_config() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("src/main/java")).expect("mkdir");
    fs::write(dir.path().join(DEFAULT_CONFIG_FILE_NAME), CONFIG).expect("write config");
    dir
}

#[test]
fn config_is_discovered_from_nested_directory() {
    let dir = project_with_config();
    let nested = dir.path().join("src/main/java");
    assert_eq!(
        config::find_config_file(&nested),
        Some(dir.path().join(DEFAULT_CONFIG_FILE_NAME))
    );
}

#[test]
fn explicit_config_path_wins() {
    let dir = project_with_config();
    let other = dir.path().join("other.toml");
    fs::write(&other, "[checks]\ndisabled = [\"MissingOverride\"]\n").expect("write");

    let (path, cfg) = config::load_config(Some(&other), dir.path())
        .expect("config should load")
        .expect("explicit config");
    assert_eq!(path, other);
    assert_eq!(cfg.checks.disabled, vec!["MissingOverride"]);
}

#[test]
fn config_controls_checkers_severities_flags_and_suppression() {
    let dir = project_with_config();
    let analyzer = analyzer_for(dir.path());
    let outcome = analyzer
        .analyze_source(SOURCE, Some(&dir.path().join("src/main/java/Person.java")))
        .expect("analysis should succeed");

    let found: Vec<(&str, Severity, &str)> = outcome
        .descriptions
        .iter()
        .map(|d| (d.check_name(), d.severity, d.message.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            (
                "MissingOverride",
                Severity::Warning,
                "toString overrides method in Object; expected @Override"
            ),
            (
                "EqualsIncompatibleType",
                Severity::Error,
                "Calling equals on incompatible types String and Integer"
            ),
        ]
    );
}

#[test]
fn unknown_checker_in_config_is_rejected() {
    let disabled = vec!["NoSuchCheck".to_string()];
    let err = CheckerRegistry::default_checkers_filtered(&[], &[], &disabled, false)
        .err()
        .expect("unknown name should fail");
    assert!(err.to_string().contains("NoSuchCheck"));
}

#[test]
fn malformed_config_reports_the_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(DEFAULT_CONFIG_FILE_NAME);
    fs::write(&path, "[checks\n").expect("write");
    let err = config::load_config_file(&path).expect_err("should fail");
    assert!(format!("{err:#}").contains("failed to parse config file"));
}
