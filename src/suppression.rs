use crate::annotations::{self, SuppressionScope};
use crate::checker::CheckerDescriptor;
use crate::config::SuppressionConfig;
use crate::tree::Node;
use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;

/// Decides which regions of a unit are opted out of which checkers.
///
/// The scanner asks for a scope at every declaration it enters and pushes the
/// result onto its [`annotations::SuppressionStack`].
pub trait Suppressor: Send + Sync {
    /// Scope introduced by `decl`, or `None` if it adds nothing.
    fn scope_for(&self, decl: Node<'_>) -> Option<SuppressionScope>;

    /// Whole-unit opt-out based on the file path.
    fn is_path_excluded(&self, _path: &Path, _checker: &CheckerDescriptor) -> bool {
        false
    }
}

/// Never suppresses anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSuppression;

impl Suppressor for NoSuppression {
    fn scope_for(&self, _decl: Node<'_>) -> Option<SuppressionScope> {
        None
    }
}

/// `@SuppressWarnings`, custom annotations, `@Generated` and path regexes.
#[derive(Debug, Clone)]
pub struct AnnotationSuppressor {
    custom_annotations: Vec<String>,
    exclude_paths: Vec<Regex>,
    honor_generated: bool,
}

impl Default for AnnotationSuppressor {
    fn default() -> Self {
        Self {
            custom_annotations: Vec::new(),
            exclude_paths: Vec::new(),
            honor_generated: true,
        }
    }
}

impl AnnotationSuppressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `[suppression]` config table.
    ///
    /// # Errors
    ///
    /// Returns error if an `exclude_paths` entry is not a valid regex.
    pub fn from_config(config: &SuppressionConfig) -> Result<Self> {
        let exclude_paths = config
            .exclude_paths
            .iter()
            .map(|p| Regex::new(p).with_context(|| format!("invalid exclude_paths regex `{p}`")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            custom_annotations: config.custom_annotations.clone(),
            exclude_paths,
            honor_generated: config.generated_code,
        })
    }

    #[must_use]
    pub fn with_custom_annotation(mut self, name: impl Into<String>) -> Self {
        self.custom_annotations.push(name.into());
        self
    }

    #[must_use]
    pub fn with_excluded_path(mut self, pattern: Regex) -> Self {
        self.exclude_paths.push(pattern);
        self
    }
}

impl Suppressor for AnnotationSuppressor {
    fn scope_for(&self, decl: Node<'_>) -> Option<SuppressionScope> {
        let mut found = annotations::suppression_annotations(decl, &self.custom_annotations);
        if !self.honor_generated {
            found.retain(|a| *a != annotations::SuppressionAnnotation::Generated);
        }
        let scope = SuppressionScope::from_annotations(found);
        (!scope.is_empty()).then_some(scope)
    }

    fn is_path_excluded(&self, path: &Path, checker: &CheckerDescriptor) -> bool {
        if !checker.suppressible {
            return false;
        }
        let path = path.to_string_lossy();
        self.exclude_paths.iter().any(|re| re.is_match(&path))
    }
}
