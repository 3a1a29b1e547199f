use crate::description::{Description, DescriptionBuilder};
use crate::error::JavaClippyError;
use crate::level::Severity;
use crate::state::VisitorState;
use crate::tree::{Node, NodeKind};
use anyhow::{Result, anyhow};
use std::collections::{BTreeMap, HashMap, HashSet};

// ============================================================================
// Checker Groups (Stable vs Experimental)
// ============================================================================

/// Maturity of a checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub enum CheckerGroup {
    /// Enabled by default.
    #[default]
    Stable,

    /// Requires `--experimental` or `experimental = true` in config.
    Experimental,
}

impl CheckerGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckerGroup::Stable => "stable",
            CheckerGroup::Experimental => "experimental",
        }
    }
}

// ============================================================================
// Fix Safety Classification
// ============================================================================

/// Safety classification for suggested fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FixSafety {
    /// Preserves runtime behavior exactly.
    #[default]
    Safe,
    /// May change runtime behavior.
    Unsafe,
}

impl FixSafety {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixSafety::Safe => "safe",
            FixSafety::Unsafe => "unsafe",
        }
    }
}

/// Descriptor for the fix a checker may offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixDescriptor {
    pub available: bool,
    pub safety: FixSafety,
    pub description: &'static str,
}

impl FixDescriptor {
    pub const fn safe(description: &'static str) -> Self {
        Self {
            available: true,
            safety: FixSafety::Safe,
            description,
        }
    }

    pub const fn unsafe_fix(description: &'static str) -> Self {
        Self {
            available: true,
            safety: FixSafety::Unsafe,
            description,
        }
    }

    pub const fn none() -> Self {
        Self {
            available: false,
            safety: FixSafety::Safe,
            description: "",
        }
    }
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckerCategory {
    /// Code that is almost certainly wrong.
    Correctness,
    /// Code that is probably not what the author meant.
    Suspicious,
    Style,
}

impl CheckerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckerCategory::Correctness => "correctness",
            CheckerCategory::Suspicious => "suspicious",
            CheckerCategory::Style => "style",
        }
    }
}

/// Static metadata describing a checker.
#[derive(Debug)]
pub struct CheckerDescriptor {
    pub name: &'static str,
    /// Other names accepted by `@SuppressWarnings`.
    pub alt_names: &'static [&'static str],
    pub category: CheckerCategory,
    /// One-line summary, also the default finding message.
    pub summary: &'static str,
    /// Longer text shown by `explain`.
    pub explanation: &'static str,
    pub severity: Severity,
    pub group: CheckerGroup,
    pub fix: FixDescriptor,
    pub link: Option<&'static str>,
    /// Whether `@SuppressWarnings` and custom annotations can silence it.
    pub suppressible: bool,
    /// Skip code marked `@Generated`.
    pub disable_in_generated_code: bool,
}

impl CheckerDescriptor {
    pub const fn new(
        name: &'static str,
        category: CheckerCategory,
        severity: Severity,
        summary: &'static str,
    ) -> Self {
        Self {
            name,
            alt_names: &[],
            category,
            summary,
            explanation: "",
            severity,
            group: CheckerGroup::Stable,
            fix: FixDescriptor::none(),
            link: None,
            suppressible: true,
            disable_in_generated_code: false,
        }
    }

    pub const fn with_fix(mut self, fix: FixDescriptor) -> Self {
        self.fix = fix;
        self
    }

    pub const fn with_alt_names(mut self, names: &'static [&'static str]) -> Self {
        self.alt_names = names;
        self
    }

    pub const fn with_explanation(mut self, explanation: &'static str) -> Self {
        self.explanation = explanation;
        self
    }

    pub const fn with_link(mut self, link: &'static str) -> Self {
        self.link = Some(link);
        self
    }

    pub const fn experimental(mut self) -> Self {
        self.group = CheckerGroup::Experimental;
        self
    }

    pub const fn unsuppressible(mut self) -> Self {
        self.suppressible = false;
        self
    }

    pub const fn skip_generated_code(mut self) -> Self {
        self.disable_in_generated_code = true;
        self
    }

    /// The canonical name plus all alternative names.
    pub fn all_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.alt_names.iter().copied())
    }
}

/// Outcome of one match call: no finding, a finding, or an internal failure.
pub type MatchResult = Result<Option<Description>, JavaClippyError>;

/// A bug-pattern checker.
///
/// A checker declares the node kinds it wants in [`BugChecker::interests`]
/// and overrides the matching `match_*` methods. Kinds without a dedicated
/// method reach [`BugChecker::match_node`]. Checkers are shared read-only
/// across units; per-unit scratch state belongs in locals of a match call.
pub trait BugChecker: Send + Sync {
    fn descriptor(&self) -> &'static CheckerDescriptor;

    fn interests(&self) -> &'static [NodeKind];

    fn describe(&self, node: Node<'_>) -> DescriptionBuilder {
        Description::builder(self.descriptor(), node)
    }

    fn match_compilation_unit(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_class(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_method(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_variable(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_block(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_if(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_return(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_binary(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_unary(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_conditional(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_method_invocation(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_new_class(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_assignment(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_compound_assignment(
        &self,
        _node: Node<'_>,
        _state: &VisitorState<'_>,
    ) -> MatchResult {
        Ok(None)
    }

    fn match_type_cast(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_identifier(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_member_select(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_literal(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    fn match_lambda(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }

    /// Fallback for kinds without a dedicated method.
    fn match_node(&self, _node: Node<'_>, _state: &VisitorState<'_>) -> MatchResult {
        Ok(None)
    }
}

/// Route `node` to the `match_*` method for its kind.
pub(crate) fn dispatch(
    checker: &dyn BugChecker,
    node: Node<'_>,
    state: &VisitorState<'_>,
) -> MatchResult {
    match node.kind() {
        NodeKind::CompilationUnit => checker.match_compilation_unit(node, state),
        NodeKind::Class => checker.match_class(node, state),
        NodeKind::Method => checker.match_method(node, state),
        NodeKind::Variable => checker.match_variable(node, state),
        NodeKind::Block => checker.match_block(node, state),
        NodeKind::If => checker.match_if(node, state),
        NodeKind::Return => checker.match_return(node, state),
        NodeKind::Binary => checker.match_binary(node, state),
        NodeKind::Unary => checker.match_unary(node, state),
        NodeKind::Conditional => checker.match_conditional(node, state),
        NodeKind::MethodInvocation => checker.match_method_invocation(node, state),
        NodeKind::NewClass => checker.match_new_class(node, state),
        NodeKind::Assignment => checker.match_assignment(node, state),
        NodeKind::CompoundAssignment => checker.match_compound_assignment(node, state),
        NodeKind::TypeCast => checker.match_type_cast(node, state),
        NodeKind::Identifier => checker.match_identifier(node, state),
        NodeKind::MemberSelect => checker.match_member_select(node, state),
        NodeKind::Literal => checker.match_literal(node, state),
        NodeKind::Lambda => checker.match_lambda(node, state),
        _ => checker.match_node(node, state),
    }
}

/// Checker flags from `[flags]` in `java-clippy.toml`, e.g.
/// `"AlreadyChecked:Strict" = "true"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    values: BTreeMap<String, String>,
}

impl Flags {
    pub const fn empty() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    pub fn new(values: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)?.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Per-checker configuration derived from `java-clippy.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckerSettings {
    severities: HashMap<String, Severity>,
    flags: Flags,
}

impl CheckerSettings {
    #[must_use]
    pub fn with_config_severities(mut self, severities: HashMap<String, Severity>) -> Self {
        self.severities.extend(severities);
        self
    }

    #[must_use]
    pub fn disable(mut self, disabled: impl IntoIterator<Item = String>) -> Self {
        for name in disabled {
            self.severities.insert(name, Severity::Off);
        }
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    /// Effective severity: config override first, then the checker default.
    pub fn severity_for(&self, checker: &CheckerDescriptor) -> Severity {
        self.severities
            .get(checker.name)
            .copied()
            .unwrap_or(checker.severity)
    }

    pub fn is_enabled(&self, checker: &CheckerDescriptor) -> bool {
        self.severity_for(checker) != Severity::Off
    }
}

/// Ordered set of checkers.
pub struct CheckerRegistry {
    checkers: Vec<Box<dyn BugChecker>>,
}

impl Default for CheckerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            checkers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_checker(mut self, checker: impl BugChecker + 'static) -> Self {
        self.checkers.push(Box::new(checker));
        self
    }

    pub fn push(&mut self, checker: Box<dyn BugChecker>) {
        self.checkers.push(checker);
    }

    pub fn checkers(&self) -> impl Iterator<Item = &dyn BugChecker> {
        self.checkers.iter().map(|c| c.as_ref())
    }

    pub fn get(&self, index: usize) -> Option<&dyn BugChecker> {
        self.checkers.get(index).map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &'static CheckerDescriptor> + '_ {
        self.checkers.iter().map(|c| c.descriptor())
    }

    /// Find by canonical or alternative name.
    pub fn find_descriptor(&self, name: &str) -> Option<&'static CheckerDescriptor> {
        self.descriptors().find(|d| d.all_names().any(|n| n == name))
    }

    /// Every built-in checker, experimental ones included.
    #[must_use = "registry should be used to create an analyzer"]
    pub fn all_checkers() -> Self {
        crate::checks::all_checkers()
    }

    /// Filter the built-in checkers.
    ///
    /// # Errors
    ///
    /// Returns error if any name in `only`, `skip`, or `disabled` is unknown.
    pub fn default_checkers_filtered(
        only: &[String],
        skip: &[String],
        disabled: &[String],
        experimental: bool,
    ) -> Result<Self> {
        let all = Self::all_checkers();
        let known: HashSet<&str> = all.descriptors().flat_map(|d| d.all_names()).collect();

        for n in only.iter().chain(skip.iter()).chain(disabled.iter()) {
            if !known.contains(n.as_str()) {
                return Err(anyhow!("unknown checker: {n}"));
            }
        }

        let named = |list: &[String], d: &CheckerDescriptor| {
            list.iter().any(|n| d.all_names().any(|a| a == n))
        };

        let mut reg = Self::new();
        for checker in all.checkers {
            let d = checker.descriptor();
            if !only.is_empty() && !named(only, d) {
                continue;
            }
            if named(skip, d) || named(disabled, d) {
                continue;
            }
            // Naming an experimental checker in `only` opts into it.
            if d.group == CheckerGroup::Experimental && !experimental && !named(only, d) {
                continue;
            }
            reg.checkers.push(checker);
        }
        Ok(reg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static QUIET: CheckerDescriptor = CheckerDescriptor::new(
        "Quiet",
        CheckerCategory::Style,
        Severity::Suggestion,
        "does nothing",
    )
    .with_alt_names(&["quiet-alias"]);

    struct Quiet;

    impl BugChecker for Quiet {
        fn descriptor(&self) -> &'static CheckerDescriptor {
            &QUIET
        }

        fn interests(&self) -> &'static [NodeKind] {
            &[]
        }
    }

    #[test]
    fn settings_override_default_severity() {
        let settings = CheckerSettings::default()
            .with_config_severities(HashMap::from([("Quiet".to_string(), Severity::Error)]));
        assert_eq!(settings.severity_for(&QUIET), Severity::Error);
        let settings = settings.disable(["Quiet".to_string()]);
        assert!(!settings.is_enabled(&QUIET));
    }

    #[test]
    fn registry_finds_alt_names() {
        let reg = CheckerRegistry::new().with_checker(Quiet);
        assert_eq!(reg.find_descriptor("quiet-alias").map(|d| d.name), Some("Quiet"));
        assert!(reg.find_descriptor("Loud").is_none());
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = CheckerRegistry::default_checkers_filtered(
            &["NoSuchChecker".to_string()],
            &[],
            &[],
            false,
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("NoSuchChecker"));
    }

    #[test]
    fn flags_parse_booleans() {
        let flags = Flags::new([("A:B".to_string(), "TRUE".to_string())]);
        assert_eq!(flags.get_bool("A:B"), Some(true));
        assert_eq!(flags.get_bool("missing"), None);
    }
}
