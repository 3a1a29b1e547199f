//! Java Clippy: a bug-pattern checker substrate for Java.
//!
//! A unit of source is lowered by the tree-sitter frontend into a
//! [`tree::TypedTree`] plus [`model::SemanticModel`], then scanned once by
//! the [`scanner::Scanner`], which routes every node to the checkers that
//! declared an interest in its kind. [`Analyzer`] wires the pieces together.

#![allow(clippy::type_complexity)] // Matcher tables box closures over borrowed state
#![allow(clippy::new_without_default)] // Registries are built explicitly

pub mod analysis;
pub mod annotations;
pub mod checker;
pub mod checks;
pub mod cli;
pub mod config;
pub mod description;
pub mod error;
pub mod fix;
pub mod fixer;
pub mod imports;
pub mod level;
pub mod matchers;
pub mod model;
pub mod parser;
pub mod scanner;
pub mod state;
pub mod suppression;
pub mod telemetry;
pub mod tree;
pub mod verify;

use std::path::Path;

use crate::checker::{CheckerRegistry, CheckerSettings};
use crate::description::Description;
use crate::error::ClippyResult;
use crate::parser::parse_unit;
use crate::scanner::{CheckerFailure, DispatchTable, Scanner};
use crate::suppression::{AnnotationSuppressor, Suppressor};
use crate::verify::SyntaxVerifier;

/// Findings and checker failures from one compilation unit.
#[derive(Debug, Default)]
pub struct AnalysisOutcome {
    pub descriptions: Vec<Description>,
    pub failures: Vec<CheckerFailure>,
}

/// Parses source and runs registered checkers over it.
pub struct Analyzer {
    registry: CheckerRegistry,
    settings: CheckerSettings,
    table: DispatchTable,
    suppressor: Box<dyn Suppressor>,
}

impl Analyzer {
    /// Create an analyzer with default settings and annotation suppression.
    pub fn new(registry: CheckerRegistry) -> Self {
        Self::with_settings(registry, CheckerSettings::default())
    }

    /// Create an analyzer with explicit settings (e.g. from config).
    pub fn with_settings(registry: CheckerRegistry, settings: CheckerSettings) -> Self {
        let table = DispatchTable::build(&registry, &settings);
        Self {
            registry,
            settings,
            table,
            suppressor: Box::new(AnnotationSuppressor::new()),
        }
    }

    #[must_use]
    pub fn with_suppressor(mut self, suppressor: impl Suppressor + 'static) -> Self {
        self.suppressor = Box::new(suppressor);
        self
    }

    pub fn registry(&self) -> &CheckerRegistry {
        &self.registry
    }

    /// Analyze one in-memory compilation unit.
    ///
    /// `path` is used for reporting and for path-based suppression only.
    ///
    /// # Errors
    ///
    /// Returns error if the frontend cannot parse `source` at all. Checker
    /// errors do not fail the call; they are returned as `failures`.
    pub fn analyze_source(
        &self,
        source: &str,
        path: Option<&Path>,
    ) -> ClippyResult<AnalysisOutcome> {
        let unit = instrument_block!("parse", { parse_unit(source, path) })?;

        let mut descriptions: Vec<Description> = Vec::new();
        let failures = instrument_block!("scan", {
            let suppressor = self.suppressor.as_ref();
            Scanner::new(&self.registry, &self.table, &self.settings, suppressor)
                .with_verifier(&SyntaxVerifier)
                .scan(&unit.tree, &unit.model, &mut descriptions)
        });
        let outcome = AnalysisOutcome {
            descriptions,
            failures,
        };

        tracing::debug!(
            path = ?path,
            findings = outcome.descriptions.len(),
            failures = outcome.failures.len(),
            "analyzed compilation unit"
        );
        Ok(outcome)
    }
}

/// Construct an `Analyzer` with every stable built-in checker enabled.
///
/// # Errors
///
/// Returns error if the built-in registry cannot be filtered.
pub fn create_default_analyzer() -> anyhow::Result<Analyzer> {
    let registry = CheckerRegistry::default_checkers_filtered(&[], &[], &[], false)?;
    Ok(Analyzer::new(registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suppression::NoSuppression;

    const SRC: &str = r#"
class A {
    @SuppressWarnings("SelfEquals")
    boolean quiet(String s) { return s.equals(s); }

    boolean loud(String s) { return s.equals(s); }
}
"#;

    #[test]
    fn default_analyzer_honors_suppress_warnings() {
        let analyzer = create_default_analyzer().unwrap();
        let outcome = analyzer.analyze_source(SRC, None).unwrap();
        assert!(outcome.failures.is_empty());
        let self_equals: Vec<_> = outcome
            .descriptions
            .iter()
            .filter(|d| d.check_name() == "SelfEquals")
            .collect();
        assert_eq!(self_equals.len(), 1);
        assert!(self_equals[0].span.start > SRC.find("loud").unwrap());
    }

    #[test]
    fn suppressor_can_be_replaced() {
        let analyzer = create_default_analyzer().unwrap().with_suppressor(NoSuppression);
        let outcome = analyzer.analyze_source(SRC, None).unwrap();
        let count = outcome
            .descriptions
            .iter()
            .filter(|d| d.check_name() == "SelfEquals")
            .count();
        assert_eq!(count, 2);
    }
}
