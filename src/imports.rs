//! Rewrites the import block of a compilation unit.
//!
//! Import directives on a fix are independent of its text ranges; they are
//! applied in a separate pass over the (already patched) source that replaces
//! the whole import block with a freshly ordered one.

use regex::Regex;
use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::LazyLock;

static IMPORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*import[ \t]+(static[ \t]+)?([\w.]+(?:\.\*)?)[ \t]*;[ \t]*\r?$")
        .expect("import regex")
});

static PACKAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*package[ \t]+[\w.]+[ \t]*;[ \t]*\r?$").expect("package regex")
});

/// Ordering groups, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ImportKind {
    Static,
    Google,
    ThirdParty,
    Java,
    Javax,
}

impl ImportKind {
    fn of(stmt: &Import) -> ImportKind {
        if stmt.is_static {
            ImportKind::Static
        } else if stmt.name.starts_with("com.google.") {
            ImportKind::Google
        } else if stmt.name.starts_with("java.") {
            ImportKind::Java
        } else if stmt.name.starts_with("javax.") {
            ImportKind::Javax
        } else {
            ImportKind::ThirdParty
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Import {
    is_static: bool,
    name: String,
}

impl Import {
    /// Parse `import a.b.C` / `import static a.b.C.m`, with or without `;`.
    fn parse(stmt: &str) -> Option<Import> {
        let rest = stmt.trim().trim_end_matches(';').trim();
        let rest = rest.strip_prefix("import")?.trim_start();
        let (is_static, name) = match rest.strip_prefix("static ") {
            Some(n) => (true, n.trim()),
            None => (false, rest),
        };
        (!name.is_empty()).then(|| Import {
            is_static,
            name: name.to_string(),
        })
    }

    fn top_level_package(&self) -> &str {
        self.name.split('.').next().unwrap_or("")
    }

    fn render(&self) -> String {
        if self.is_static {
            format!("import static {};", self.name)
        } else {
            format!("import {};", self.name)
        }
    }
}

/// The import block of a source file and pending changes to it.
#[derive(Debug, Clone)]
pub struct ImportStatements {
    block: Option<Range<usize>>,
    package_end: Option<usize>,
    imports: BTreeSet<Import>,
    changed: bool,
}

impl ImportStatements {
    pub fn parse(source: &str) -> Self {
        let mut imports = BTreeSet::new();
        let mut block: Option<Range<usize>> = None;
        for caps in IMPORT_LINE.captures_iter(source) {
            let Some(whole) = caps.get(0) else { continue };
            imports.insert(Import {
                is_static: caps.get(1).is_some(),
                name: caps[2].to_string(),
            });
            block = Some(match block {
                Some(b) => b.start..whole.end(),
                None => whole.start()..whole.end(),
            });
        }
        let package_end = PACKAGE_LINE.find(source).map(|m| m.end());
        Self {
            block,
            package_end,
            imports,
            changed: false,
        }
    }

    /// Add an `import ...` statement. Returns false if already present.
    pub fn add(&mut self, stmt: &str) -> bool {
        let Some(import) = Import::parse(stmt) else {
            return false;
        };
        let inserted = self.imports.insert(import);
        self.changed |= inserted;
        inserted
    }

    /// Remove an `import ...` statement. Returns false if it was absent.
    pub fn remove(&mut self, stmt: &str) -> bool {
        let Some(import) = Import::parse(stmt) else {
            return false;
        };
        let removed = self.imports.remove(&import);
        self.changed |= removed;
        removed
    }

    pub fn contains(&self, stmt: &str) -> bool {
        Import::parse(stmt).is_some_and(|i| self.imports.contains(&i))
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Ordered block text without a trailing newline.
    pub fn render(&self) -> String {
        let mut sorted: Vec<&Import> = self.imports.iter().collect();
        sorted.sort_by(|a, b| {
            (ImportKind::of(a), &a.name).cmp(&(ImportKind::of(b), &b.name))
        });

        let mut out = String::new();
        let mut prev: Option<&Import> = None;
        for import in sorted {
            if let Some(p) = prev {
                let kind = ImportKind::of(import);
                let new_group = ImportKind::of(p) != kind
                    || (kind == ImportKind::ThirdParty
                        && p.top_level_package() != import.top_level_package());
                out.push('\n');
                if new_group {
                    out.push('\n');
                }
            }
            out.push_str(&import.render());
            prev = Some(import);
        }
        out
    }

    /// Source with the import block replaced. Unchanged input is returned as is.
    pub fn apply(&self, source: &str) -> String {
        if !self.changed {
            return source.to_string();
        }
        let rendered = self.render();
        let mut result = source.to_string();
        match (&self.block, self.package_end) {
            (Some(block), _) => {
                result.replace_range(block.clone(), &rendered);
            }
            (None, _) if rendered.is_empty() => {}
            (None, Some(end)) => {
                result.insert_str(end, &format!("\n\n{rendered}"));
            }
            (None, None) => {
                result.insert_str(0, &format!("{rendered}\n\n"));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_follow_google_style() {
        let mut imports = ImportStatements::parse("");
        for i in [
            "import javax.inject.Inject",
            "import java.util.List",
            "import org.junit.Test",
            "import com.google.common.collect.ImmutableList",
            "import static org.junit.Assert.assertTrue",
            "import android.os.Bundle",
            "import java.util.Map",
        ] {
            imports.add(i);
        }
        insta::assert_snapshot!(imports.render(), @r"
        import static org.junit.Assert.assertTrue;

        import com.google.common.collect.ImmutableList;

        import android.os.Bundle;

        import org.junit.Test;

        import java.util.List;
        import java.util.Map;

        import javax.inject.Inject;
        ");
    }

    #[test]
    fn inserts_after_package_when_no_imports() {
        let src = "package a.b;\n\nclass C {}\n";
        let mut imports = ImportStatements::parse(src);
        imports.add("import java.util.List");
        assert_eq!(
            imports.apply(src),
            "package a.b;\n\nimport java.util.List;\n\nclass C {}\n"
        );
    }

    #[test]
    fn replaces_existing_block() {
        let src = "package p;\n\nimport java.util.Map;\nimport java.util.List;\n\nclass C {}\n";
        let mut imports = ImportStatements::parse(src);
        imports.remove("import java.util.Map");
        imports.add("import static java.util.Objects.requireNonNull");
        assert_eq!(
            imports.apply(src),
            "package p;\n\nimport static java.util.Objects.requireNonNull;\n\n\
             import java.util.List;\n\nclass C {}\n"
        );
    }

    #[test]
    fn duplicate_add_is_a_no_op() {
        let src = "import java.util.List;\nclass C {}\n";
        let mut imports = ImportStatements::parse(src);
        assert!(!imports.add("import java.util.List;"));
        assert!(!imports.is_changed());
        assert_eq!(imports.apply(src), src);
    }
}
