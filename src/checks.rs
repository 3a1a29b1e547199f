//! Built-in bug-pattern checkers.

pub mod correctness;
pub mod style;
pub mod suspicious;

use crate::checker::CheckerRegistry;

// Correctness checkers
pub use correctness::{
    ComparisonOutOfRangeChecker, ConstantOverflowChecker, EqualsIncompatibleTypeChecker,
    SelfEqualsChecker,
};

// Style checkers
pub use style::MissingOverrideChecker;

// Suspicious checkers
pub use suspicious::AlreadyCheckedChecker;

/// Every built-in checker, in registration order.
pub fn all_checkers() -> CheckerRegistry {
    CheckerRegistry::new()
        .with_checker(AlreadyCheckedChecker)
        .with_checker(ComparisonOutOfRangeChecker)
        .with_checker(ConstantOverflowChecker)
        .with_checker(EqualsIncompatibleTypeChecker)
        .with_checker(MissingOverrideChecker)
        .with_checker(SelfEqualsChecker)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::checker::{BugChecker, CheckerRegistry, CheckerSettings, Flags};
    use crate::description::Description;
    use crate::parser::parse_unit;
    use crate::scanner::{DispatchTable, Scanner};
    use crate::suppression::AnnotationSuppressor;

    pub fn run(checker: impl BugChecker + 'static, src: &str) -> Vec<Description> {
        run_with_flags(checker, src, Flags::empty())
    }

    pub fn run_with_flags(
        checker: impl BugChecker + 'static,
        src: &str,
        flags: Flags,
    ) -> Vec<Description> {
        let unit = parse_unit(src, None).expect("test source should parse");
        let registry = CheckerRegistry::new().with_checker(checker);
        let settings = CheckerSettings::default().with_flags(flags);
        let table = DispatchTable::build(&registry, &settings);
        let suppressor = AnnotationSuppressor::new();
        let mut found = Vec::new();
        let failures = Scanner::new(&registry, &table, &settings, &suppressor).scan(
            &unit.tree,
            &unit.model,
            &mut found,
        );
        assert!(failures.is_empty(), "checker failed: {failures:?}");
        found
    }

    /// Source text covered by each finding.
    pub fn flagged<'a>(src: &'a str, found: &[Description]) -> Vec<&'a str> {
        found.iter().map(|d| &src[d.span.range()]).collect()
    }

    /// `src` with the first fix of the only finding applied.
    pub fn fixed(src: &str, found: &[Description]) -> String {
        assert_eq!(found.len(), 1, "expected one finding, got {found:?}");
        let fix = found[0].first_fix().expect("finding should carry a fix");
        crate::fix::apply_fix(src, fix).expect("fix should apply")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn checker_names_are_unique() {
        let registry = all_checkers();
        let mut seen = HashSet::new();
        for d in registry.descriptors() {
            for name in d.all_names() {
                assert!(seen.insert(name), "duplicate checker name {name}");
            }
        }
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn every_checker_has_an_explanation() {
        let registry = all_checkers();
        for checker in registry.checkers() {
            let d = checker.descriptor();
            assert!(!d.explanation.is_empty(), "{} has no explanation", d.name);
            assert!(!checker.interests().is_empty(), "{} has no interests", d.name);
        }
    }

    #[test]
    fn every_checker_links_to_its_bug_pattern() {
        for d in all_checkers().descriptors() {
            let link = d.link.unwrap_or_default();
            assert!(link.ends_with(&format!("/bugpattern/{}", d.name)), "{}: {link:?}", d.name);
        }
    }
}
