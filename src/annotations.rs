//! Suppression annotations on Java declarations.
//!
//! Recognized forms:
//!
//! - `@SuppressWarnings("Name")` / `@SuppressWarnings({"A", "B"})` - silence named checkers
//! - `@SuppressWarnings("all")` - silence every suppressible checker
//! - custom annotations listed under `[suppression] custom_annotations`
//! - `@Generated` (`javax.annotation` or `javax.annotation.processing`) - marks generated code

use crate::checker::CheckerDescriptor;
use crate::tree::{ConstValue, Literal, Node};
use std::collections::HashSet;

/// Suppression-relevant annotation found on a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressionAnnotation {
    /// One string value of `@SuppressWarnings`.
    SuppressWarnings(String),
    /// A configured custom suppression annotation, by the name written in source.
    Custom(String),
    Generated,
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Collect the suppression annotations attached to `decl`.
///
/// `custom` holds simple or qualified annotation names; a simple name in
/// source matches a qualified entry with the same last segment.
pub fn suppression_annotations(decl: Node<'_>, custom: &[String]) -> Vec<SuppressionAnnotation> {
    let mut found = Vec::new();
    for ann in decl.annotations() {
        let Some(name) = ann.name() else { continue };
        let simple = simple_name(name);

        if simple == "SuppressWarnings" {
            let mut values = Vec::new();
            collect_strings(ann, &mut values);
            found.extend(values.into_iter().map(SuppressionAnnotation::SuppressWarnings));
            continue;
        }

        if simple == "Generated" {
            found.push(SuppressionAnnotation::Generated);
            continue;
        }

        let is_custom = custom.iter().any(|c| {
            c == name || (!name.contains('.') && simple_name(c) == simple)
        });
        if is_custom {
            found.push(SuppressionAnnotation::Custom(name.to_string()));
        }
    }
    found
}

/// String literals anywhere inside an annotation's arguments.
fn collect_strings(node: Node<'_>, out: &mut Vec<String>) {
    for child in node.children() {
        match child.literal() {
            Some(Literal::Value(ConstValue::Str(s))) => out.push(s.clone()),
            _ => collect_strings(child, out),
        }
    }
}

/// Suppressions introduced by one declaration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SuppressionScope {
    /// Names from `@SuppressWarnings`.
    suppressed: HashSet<String>,
    /// `@SuppressWarnings("all")`
    all: bool,
    /// A custom suppression annotation is present.
    custom: bool,
    generated: bool,
}

impl SuppressionScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_annotations(annotations: Vec<SuppressionAnnotation>) -> Self {
        let mut scope = Self::new();
        for ann in annotations {
            match ann {
                SuppressionAnnotation::SuppressWarnings(name) if name == "all" => {
                    scope.all = true;
                }
                SuppressionAnnotation::SuppressWarnings(name) => {
                    scope.suppressed.insert(name);
                }
                SuppressionAnnotation::Custom(_) => scope.custom = true,
                SuppressionAnnotation::Generated => scope.generated = true,
            }
        }
        scope
    }

    pub fn is_empty(&self) -> bool {
        self.suppressed.is_empty() && !self.all && !self.custom && !self.generated
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Check if this scope silences `checker`.
    pub fn suppresses(&self, checker: &CheckerDescriptor) -> bool {
        if self.generated && checker.disable_in_generated_code {
            return true;
        }
        if !checker.suppressible {
            return false;
        }
        self.all || self.custom || checker.all_names().any(|n| self.suppressed.contains(n))
    }

    /// Merge another scope into this one (for nested scopes).
    pub fn merge(&mut self, other: &SuppressionScope) {
        self.suppressed.extend(other.suppressed.iter().cloned());
        self.all |= other.all;
        self.custom |= other.custom;
        self.generated |= other.generated;
    }
}

/// Stack of suppression scopes, one entry per enclosing declaration.
#[derive(Debug, Default)]
pub struct SuppressionStack {
    scopes: Vec<SuppressionScope>,
}

impl SuppressionStack {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn push(&mut self, scope: SuppressionScope) {
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) -> Option<SuppressionScope> {
        self.scopes.pop()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Check if `checker` is suppressed by any active scope.
    pub fn is_suppressed(&self, checker: &CheckerDescriptor) -> bool {
        self.scopes.iter().any(|s| s.suppresses(checker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::CheckerCategory;
    use crate::level::Severity;
    use crate::model::Modifiers;
    use crate::tree::{NodeData, Span, TreeBuilder, TypedTree};

    static SELF_EQ: CheckerDescriptor = CheckerDescriptor::new(
        "SelfEquals",
        CheckerCategory::Correctness,
        Severity::Error,
        "x.equals(x)",
    )
    .with_alt_names(&["self-equals"]);

    static STRICT: CheckerDescriptor = CheckerDescriptor::new(
        "Strict",
        CheckerCategory::Correctness,
        Severity::Error,
        "never silenced",
    )
    .unsuppressible();

    static GEN_AWARE: CheckerDescriptor = CheckerDescriptor::new(
        "GenAware",
        CheckerCategory::Style,
        Severity::Warning,
        "skips generated",
    )
    .skip_generated_code()
    .unsuppressible();

    /// `@<name>(<values>) void m() {}` with each value as a string literal.
    fn method_with_annotation(name: &str, values: &[&str]) -> TypedTree {
        let src = "@A void m() {}";
        let mut b = TreeBuilder::new(src);
        let lits: Vec<_> = values
            .iter()
            .map(|v| b.literal(ConstValue::Str(v.to_string()), Span::new(0, 2)))
            .collect();
        let args = if lits.len() > 1 {
            vec![b.push(
                NodeData::NewArray {
                    elem_type: None,
                    dims: vec![],
                    elems: lits,
                },
                Span::new(0, 2),
            )]
        } else {
            lits
        };
        let ann = b.push(
            NodeData::Annotation {
                name: name.to_string(),
                args,
            },
            Span::new(0, 2),
        );
        let method = b.push(
            NodeData::Method {
                name: "m".to_string(),
                modifiers: Modifiers::NONE,
                annotations: vec![ann],
                return_type: None,
                params: vec![],
                body: None,
            },
            Span::new(0, src.len()),
        );
        b.finish(method)
    }

    #[test]
    fn parses_array_valued_suppress_warnings() {
        let tree = method_with_annotation("SuppressWarnings", &["A", "B"]);
        let anns = suppression_annotations(tree.root(), &[]);
        assert_eq!(
            anns,
            vec![
                SuppressionAnnotation::SuppressWarnings("A".to_string()),
                SuppressionAnnotation::SuppressWarnings("B".to_string()),
            ]
        );
    }

    #[test]
    fn alt_names_and_all_suppress() {
        let tree = method_with_annotation("java.lang.SuppressWarnings", &["self-equals"]);
        let scope = SuppressionScope::from_annotations(suppression_annotations(tree.root(), &[]));
        assert!(scope.suppresses(&SELF_EQ));

        let scope = SuppressionScope::from_annotations(vec![SuppressionAnnotation::SuppressWarnings(
            "all".to_string(),
        )]);
        assert!(scope.suppresses(&SELF_EQ));
        assert!(!scope.suppresses(&STRICT));
    }

    #[test]
    fn custom_annotations_match_by_simple_name() {
        let tree = method_with_annotation("Keep", &[]);
        let custom = vec!["com.example.Keep".to_string()];
        let anns = suppression_annotations(tree.root(), &custom);
        assert_eq!(anns, vec![SuppressionAnnotation::Custom("Keep".to_string())]);
        assert!(SuppressionScope::from_annotations(anns).suppresses(&SELF_EQ));
    }

    #[test]
    fn generated_code_overrides_unsuppressible_opt_out() {
        let scope = SuppressionScope::from_annotations(vec![SuppressionAnnotation::Generated]);
        assert!(scope.suppresses(&GEN_AWARE));
        assert!(!scope.suppresses(&SELF_EQ));
    }

    #[test]
    fn stack_scopes_nest() {
        let mut stack = SuppressionStack::new();
        stack.push(SuppressionScope::from_annotations(vec![
            SuppressionAnnotation::SuppressWarnings("SelfEquals".to_string()),
        ]));
        assert!(stack.is_suppressed(&SELF_EQ));
        stack.push(SuppressionScope::new());
        assert_eq!(stack.depth(), 2);
        assert!(stack.is_suppressed(&SELF_EQ));
        stack.pop();
        stack.pop();
        assert_eq!(stack.depth(), 0);
        assert!(stack.pop().is_none());
        assert!(!stack.is_suppressed(&SELF_EQ));
    }

    #[test]
    fn merged_scopes_keep_both_sides() {
        let mut outer = SuppressionScope::from_annotations(vec![
            SuppressionAnnotation::SuppressWarnings("Other".to_string()),
        ]);
        assert!(!outer.suppresses(&SELF_EQ));
        assert!(!outer.suppresses(&GEN_AWARE));

        outer.merge(&SuppressionScope::from_annotations(vec![
            SuppressionAnnotation::SuppressWarnings("self-equals".to_string()),
            SuppressionAnnotation::Generated,
        ]));
        assert!(outer.suppresses(&SELF_EQ));
        assert!(outer.suppresses(&GEN_AWARE));
        assert!(!outer.suppresses(&STRICT));

        let mut custom = SuppressionScope::new();
        custom.merge(&SuppressionScope::from_annotations(vec![SuppressionAnnotation::Custom(
            "Keep".to_string(),
        )]));
        assert!(custom.suppresses(&SELF_EQ));
    }
}
