use crate::parser;

/// Re-checks patched source before a fix is offered.
pub trait CompilationVerifier: Send + Sync {
    fn compiles(&self, source: &str) -> bool;
}

/// Accepts source that re-parses without error or missing nodes.
///
/// This is a syntax-level check only; it does not re-run resolution.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntaxVerifier;

impl CompilationVerifier for SyntaxVerifier {
    fn compiles(&self, source: &str) -> bool {
        match parser::parse_java(source) {
            Ok(tree) => !tree.root_node().has_error(),
            Err(err) => {
                tracing::debug!(%err, "verifier could not parse patched source");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_broken_syntax() {
        assert!(SyntaxVerifier.compiles("class A { int x = 1 + 2; }"));
        assert!(!SyntaxVerifier.compiles("class A { int x = 1 + ; }"));
    }
}
