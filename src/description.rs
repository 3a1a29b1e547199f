use crate::checker::CheckerDescriptor;
use crate::fix::SuggestedFix;
use crate::level::Severity;
use crate::tree::{Node, NodeId, Position, Span};
use std::path::PathBuf;

/// A single finding produced by a checker.
#[derive(Debug, Clone)]
#[must_use]
pub struct Description {
    pub checker: &'static CheckerDescriptor,
    pub severity: Severity,
    pub file: Option<PathBuf>,
    pub node: NodeId,
    pub span: Span,
    pub start: Position,
    pub end: Position,
    pub message: String,
    pub link: Option<String>,
    /// Alternative fixes, most preferred first. Never contains an empty fix.
    pub fixes: Vec<SuggestedFix>,
}

impl Description {
    pub fn builder(checker: &'static CheckerDescriptor, node: Node<'_>) -> DescriptionBuilder {
        let tree = node.tree();
        let span = node.span();
        DescriptionBuilder {
            description: Description {
                checker,
                severity: checker.severity,
                file: tree.path().map(|p| p.to_path_buf()),
                node: node.id(),
                span,
                start: tree.position(span.start),
                end: tree.position(span.end),
                message: checker.summary.to_string(),
                link: checker.link.map(str::to_string),
                fixes: Vec::new(),
            },
        }
    }

    pub fn check_name(&self) -> &'static str {
        self.checker.name
    }

    /// Message with the check name prefixed, as shown to users.
    pub fn message_with_check_name(&self) -> String {
        format!("[{}] {}", self.checker.name, self.message)
    }

    pub fn first_fix(&self) -> Option<&SuggestedFix> {
        self.fixes.first()
    }

    /// Replace the severity, e.g. from a per-check config override.
    pub fn apply_severity_override(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

#[derive(Debug, Clone)]
#[must_use]
pub struct DescriptionBuilder {
    description: Description,
}

impl DescriptionBuilder {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.description.message = message.into();
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.description.link = Some(link.into());
        self
    }

    /// Attach an alternative fix. Empty fixes are dropped.
    pub fn add_fix(mut self, fix: SuggestedFix) -> Self {
        if !fix.is_empty() {
            self.description.fixes.push(fix);
        }
        self
    }

    pub fn add_fix_opt(self, fix: Option<SuggestedFix>) -> Self {
        match fix {
            Some(fix) => self.add_fix(fix),
            None => self,
        }
    }

    pub fn build(self) -> Description {
        self.description
    }
}
