use crate::checker::{CheckerSettings, Flags};
use crate::level::Severity;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct JavaClippyConfig {
    #[serde(default)]
    pub checks: ChecksConfig,

    /// Checker flags, e.g. `"MissingOverride:IgnoreInterfaceOverrides" = true`.
    #[serde(default)]
    pub flags: BTreeMap<String, toml::Value>,

    #[serde(default)]
    pub suppression: SuppressionConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChecksConfig {
    #[serde(default)]
    pub disabled: Vec<String>,

    #[serde(default)]
    pub experimental: bool,

    /// Per-checker severity overrides, e.g. `SelfEquals = "warning"`.
    #[serde(flatten)]
    pub severities: HashMap<String, Severity>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SuppressionConfig {
    /// Regexes matched against the unit path; matching files are skipped.
    pub exclude_paths: Vec<String>,

    /// Annotations that suppress every suppressible checker on the
    /// annotated declaration.
    pub custom_annotations: Vec<String>,

    /// Honor `@Generated` for checkers that skip generated code.
    pub generated_code: bool,
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        Self {
            exclude_paths: Vec::new(),
            custom_annotations: Vec::new(),
            generated_code: true,
        }
    }
}

impl JavaClippyConfig {
    /// Flag values as strings; `true` and `"true"` are the same flag.
    pub fn flags(&self) -> Flags {
        Flags::new(self.flags.iter().map(|(k, v)| {
            let value = match v {
                toml::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), value)
        }))
    }

    pub fn checker_settings(&self) -> CheckerSettings {
        CheckerSettings::default()
            .with_config_severities(self.checks.severities.clone())
            .disable(self.checks.disabled.iter().cloned())
            .with_flags(self.flags())
    }
}

pub const DEFAULT_CONFIG_FILE_NAME: &str = "java-clippy.toml";

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut cur = Some(start_dir);
    while let Some(dir) = cur {
        let candidate = dir.join(DEFAULT_CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        cur = dir.parent();
    }
    None
}

pub fn load_config_file(path: &Path) -> Result<JavaClippyConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let cfg: JavaClippyConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    Ok(cfg)
}

pub fn load_config(
    explicit_path: Option<&Path>,
    start_dir: &Path,
) -> Result<Option<(PathBuf, JavaClippyConfig)>> {
    if let Some(p) = explicit_path {
        let cfg = load_config_file(p)?;
        return Ok(Some((p.to_path_buf(), cfg)));
    }

    let Some(p) = find_config_file(start_dir) else {
        return Ok(None);
    };
    tracing::debug!(path = %p.display(), "using discovered config");
    let cfg = load_config_file(&p)?;
    Ok(Some((p, cfg)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_sections() {
        let cfg: JavaClippyConfig = toml::from_str(
            r#"
[checks]
disabled = ["SelfEquals"]
experimental = true
MissingOverride = "error"

[flags]
"MissingOverride:IgnoreInterfaceOverrides" = true
"Immutable:KnownImmutable" = "com.acme.Money"

[suppression]
exclude_paths = ["/generated/"]
custom_annotations = ["com.acme.Quiet"]
"#,
        )
        .unwrap();

        assert_eq!(cfg.checks.disabled, vec!["SelfEquals"]);
        assert!(cfg.checks.experimental);
        assert_eq!(cfg.checks.severities.get("MissingOverride"), Some(&Severity::Error));
        assert!(!cfg.checks.severities.contains_key("disabled"));

        let flags = cfg.flags();
        assert_eq!(flags.get_bool("MissingOverride:IgnoreInterfaceOverrides"), Some(true));
        assert_eq!(flags.get("Immutable:KnownImmutable"), Some("com.acme.Money"));

        assert_eq!(cfg.suppression.exclude_paths, vec!["/generated/"]);
        assert!(cfg.suppression.generated_code);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: JavaClippyConfig = toml::from_str("").unwrap();
        assert!(cfg.checks.disabled.is_empty());
        assert!(!cfg.checks.experimental);
        assert!(cfg.flags().is_empty());
        assert!(cfg.suppression.generated_code);
    }

    #[test]
    fn bad_severity_is_an_error() {
        let err = toml::from_str::<JavaClippyConfig>("[checks]\nSelfEquals = \"loud\"\n");
        assert!(err.is_err());
    }
}
