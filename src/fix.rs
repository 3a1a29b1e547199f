//! Suggested fixes: offset-based source edits plus import directives.
//!
//! A [`SuggestedFix`] is built through a [`FixBuilder`] inside one checker
//! invocation and is immutable afterwards. All offsets refer to the original
//! source text of the compilation unit, never to a patched version.
//!
//! ## Guarantees
//!
//! - Replacement ranges within one built fix never overlap
//! - Overlap is reported as [`FixError::Overlapping`], never resolved silently
//! - Replacements are kept sorted by `(start, end)`, so the same set of edits
//!   produces the same fix whatever order they were added in
//! - Insertions at one offset are joined only when they come from the same
//!   builder; distinct insertions from different merged fixes conflict

use crate::imports::ImportStatements;
use crate::tree::{Node, Span};
use std::ops::Range;
use thiserror::Error;

/// Error type for fix construction and application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixError {
    #[error("replacement ranges overlap: {first:?} and {second:?}")]
    Overlapping {
        first: Range<usize>,
        second: Range<usize>,
    },

    #[error("edit range [{start}..{end}) exceeds source length {source_len}")]
    InvalidRange {
        start: usize,
        end: usize,
        source_len: usize,
    },

    #[error("edit start {start} is after edit end {end}")]
    InvalidEditOrder { start: usize, end: usize },
}

/// Replace the bytes `[start, end)` of the original source with `text`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Replacement {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Replacement {
    pub fn new(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }

    /// `[a, b)` and `[c, d)` overlap iff `a < d && c < b`. Zero-width
    /// insertions therefore never overlap an edit that starts or ends at
    /// the insertion point.
    pub fn overlaps_with(&self, other: &Replacement) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn validate(&self, source: &str) -> Result<(), FixError> {
        if self.start > self.end {
            return Err(FixError::InvalidEditOrder {
                start: self.start,
                end: self.end,
            });
        }
        if self.end > source.len()
            || !source.is_char_boundary(self.start)
            || !source.is_char_boundary(self.end)
        {
            return Err(FixError::InvalidRange {
                start: self.start,
                end: self.end,
                source_len: source.len(),
            });
        }
        Ok(())
    }
}

/// An immutable, validated fix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuggestedFix {
    short_description: String,
    replacements: Vec<Replacement>,
    imports_to_add: Vec<String>,
    imports_to_remove: Vec<String>,
}

impl SuggestedFix {
    pub fn builder() -> FixBuilder {
        FixBuilder::default()
    }

    /// Single-replacement fix. A lone edit cannot overlap anything.
    pub fn replace(target: impl Into<Span>, text: impl Into<String>) -> SuggestedFix {
        let span = target.into();
        SuggestedFix {
            replacements: vec![Replacement::new(span.start, span.end, text)],
            ..SuggestedFix::default()
        }
    }

    pub fn delete(target: impl Into<Span>) -> SuggestedFix {
        Self::replace(target, "")
    }

    pub fn prefix_with(target: impl Into<Span>, text: impl Into<String>) -> SuggestedFix {
        let span = target.into();
        Self::replace(Span::new(span.start, span.start), text)
    }

    pub fn postfix_with(target: impl Into<Span>, text: impl Into<String>) -> SuggestedFix {
        let span = target.into();
        Self::replace(Span::new(span.end, span.end), text)
    }

    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    /// Import statements to add, in `import a.b.C` / `import static a.b.C.m`
    /// form.
    pub fn imports_to_add(&self) -> &[String] {
        &self.imports_to_add
    }

    pub fn imports_to_remove(&self) -> &[String] {
        &self.imports_to_remove
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
            && self.imports_to_add.is_empty()
            && self.imports_to_remove.is_empty()
    }
}

/// Accumulates edits for a [`SuggestedFix`]. Validation happens in
/// [`FixBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct FixBuilder {
    short_description: String,
    edits: Vec<Edit>,
    /// Number of fixes merged in so far; each one gets its own origin.
    merged: usize,
    imports_to_add: Vec<String>,
    imports_to_remove: Vec<String>,
}

/// A pending replacement and the fix it came from. Origin 0 is the builder
/// itself.
#[derive(Debug, Clone)]
struct Edit {
    origin: usize,
    replacement: Replacement,
}

impl FixBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_short_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.short_description = description.into();
        self
    }

    pub fn replace(&mut self, target: impl Into<Span>, text: impl Into<String>) -> &mut Self {
        let span = target.into();
        self.replace_range(span.start, span.end, text)
    }

    pub fn replace_range(
        &mut self,
        start: usize,
        end: usize,
        text: impl Into<String>,
    ) -> &mut Self {
        self.edits.push(Edit {
            origin: 0,
            replacement: Replacement::new(start, end, text),
        });
        self
    }

    /// Replace `target` after moving its start and end by the given byte
    /// offsets, e.g. to swallow a trailing `;`.
    pub fn replace_adjusted(
        &mut self,
        target: impl Into<Span>,
        text: impl Into<String>,
        start_adjustment: isize,
        end_adjustment: isize,
    ) -> &mut Self {
        let span = target.into();
        let start = span.start.saturating_add_signed(start_adjustment);
        let end = span.end.saturating_add_signed(end_adjustment);
        self.replace_range(start, end, text)
    }

    pub fn delete(&mut self, target: impl Into<Span>) -> &mut Self {
        self.replace(target, "")
    }

    pub fn prefix_with(&mut self, target: impl Into<Span>, text: impl Into<String>) -> &mut Self {
        let span = target.into();
        self.replace_range(span.start, span.start, text)
    }

    pub fn postfix_with(&mut self, target: impl Into<Span>, text: impl Into<String>) -> &mut Self {
        let span = target.into();
        self.replace_range(span.end, span.end, text)
    }

    /// Exchange the source text of two nodes.
    pub fn swap(&mut self, a: Node<'_>, b: Node<'_>) -> &mut Self {
        let (a_text, b_text) = (a.text().to_string(), b.text().to_string());
        self.replace(a.span(), b_text);
        self.replace(b.span(), a_text)
    }

    pub fn add_import(&mut self, qualified_name: &str) -> &mut Self {
        push_unique(&mut self.imports_to_add, format!("import {qualified_name}"));
        self
    }

    pub fn add_static_import(&mut self, qualified_name: &str) -> &mut Self {
        push_unique(
            &mut self.imports_to_add,
            format!("import static {qualified_name}"),
        );
        self
    }

    pub fn remove_import(&mut self, qualified_name: &str) -> &mut Self {
        push_unique(&mut self.imports_to_remove, format!("import {qualified_name}"));
        self
    }

    pub fn remove_static_import(&mut self, qualified_name: &str) -> &mut Self {
        push_unique(
            &mut self.imports_to_remove,
            format!("import static {qualified_name}"),
        );
        self
    }

    /// Fold another builder's edits into this one. Overlap between the two
    /// surfaces at [`FixBuilder::build`].
    pub fn merge(&mut self, other: &FixBuilder) -> &mut Self {
        if self.short_description.is_empty() {
            self.short_description = other.short_description.clone();
        }
        let base = self.merged + 1;
        self.edits.extend(other.edits.iter().map(|e| Edit {
            origin: base + e.origin,
            replacement: e.replacement.clone(),
        }));
        self.merged += other.merged + 1;
        for i in &other.imports_to_add {
            push_unique(&mut self.imports_to_add, i.clone());
        }
        for i in &other.imports_to_remove {
            push_unique(&mut self.imports_to_remove, i.clone());
        }
        self
    }

    pub fn merge_fix(&mut self, fix: &SuggestedFix) -> &mut Self {
        if self.short_description.is_empty() {
            self.short_description = fix.short_description.clone();
        }
        self.merged += 1;
        let origin = self.merged;
        self.edits.extend(fix.replacements.iter().map(|r| Edit {
            origin,
            replacement: r.clone(),
        }));
        for i in &fix.imports_to_add {
            push_unique(&mut self.imports_to_add, i.clone());
        }
        for i in &fix.imports_to_remove {
            push_unique(&mut self.imports_to_remove, i.clone());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty() && self.imports_to_add.is_empty() && self.imports_to_remove.is_empty()
    }

    /// Validate and freeze the accumulated edits.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::Overlapping`] for the first overlapping pair in
    /// `(start, end)` order, or for two different insertions at one offset
    /// that come from different merged fixes. Returns
    /// [`FixError::InvalidEditOrder`] for a range whose start lies after its
    /// end.
    pub fn build(&self) -> Result<SuggestedFix, FixError> {
        let mut edits = self.edits.clone();
        for e in &edits {
            let r = &e.replacement;
            if r.start > r.end {
                return Err(FixError::InvalidEditOrder {
                    start: r.start,
                    end: r.end,
                });
            }
        }
        // Stable sort keeps insertion order among same-offset insertions.
        edits.sort_by_key(|e| (e.replacement.start, e.replacement.end));
        let edits = coalesce(&edits)?;

        // Sorted by start, so an edit can only overlap the widest one before it.
        let mut widest: Option<&Replacement> = None;
        for edit in &edits {
            if let Some(prev) = widest
                && edit.overlaps_with(prev)
            {
                return Err(FixError::Overlapping {
                    first: prev.range(),
                    second: edit.range(),
                });
            }
            if widest.is_none_or(|prev| edit.end > prev.end) {
                widest = Some(edit);
            }
        }

        Ok(SuggestedFix {
            short_description: self.short_description.clone(),
            replacements: edits,
            imports_to_add: self.imports_to_add.clone(),
            imports_to_remove: self.imports_to_remove.clone(),
        })
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

/// Join insertions at the same offset and drop exact duplicate
/// replacements.
///
/// Insertions from one origin are joined in the order they were added. When
/// several origins insert at one offset they must agree on the text, so the
/// result never depends on merge order.
fn coalesce(sorted: &[Edit]) -> Result<Vec<Replacement>, FixError> {
    let mut out: Vec<Replacement> = Vec::with_capacity(sorted.len());
    let mut i = 0;
    while i < sorted.len() {
        let first = &sorted[i].replacement;
        if !first.is_insertion() {
            if out.last() != Some(first) {
                out.push(first.clone());
            }
            i += 1;
            continue;
        }

        let at = first.start;
        let run = sorted[i..]
            .iter()
            .take_while(|e| e.replacement.is_insertion() && e.replacement.start == at)
            .count();
        let mut by_origin: Vec<(usize, String)> = Vec::new();
        for e in &sorted[i..i + run] {
            match by_origin.iter_mut().find(|(origin, _)| *origin == e.origin) {
                Some((_, text)) => text.push_str(&e.replacement.text),
                None => by_origin.push((e.origin, e.replacement.text.clone())),
            }
        }
        let text = &by_origin[0].1;
        if by_origin.iter().any(|(_, t)| t != text) {
            return Err(FixError::Overlapping {
                first: at..at,
                second: at..at,
            });
        }
        out.push(Replacement::new(at, at, text.clone()));
        i += run;
    }
    Ok(out)
}

/// Apply one fix to `source`: text edits end-to-start, then the import block.
///
/// # Errors
///
/// Returns an error if any replacement lies outside `source` or off a char
/// boundary.
///
/// # Example
///
/// ```rust
/// use java_clippy::fix::{SuggestedFix, apply_fix};
/// use java_clippy::tree::Span;
///
/// let source = "int x = 1 + 2;";
/// let fix = SuggestedFix::builder()
///     .replace(Span::new(8, 13), "3")
///     .build()
///     .unwrap();
/// assert_eq!(apply_fix(source, &fix).unwrap(), "int x = 3;");
/// ```
pub fn apply_fix(source: &str, fix: &SuggestedFix) -> Result<String, FixError> {
    let mut result = apply_replacements(source, fix.replacements())?;
    if !fix.imports_to_add().is_empty() || !fix.imports_to_remove().is_empty() {
        let mut imports = ImportStatements::parse(&result);
        for i in fix.imports_to_add() {
            imports.add(i);
        }
        for i in fix.imports_to_remove() {
            imports.remove(i);
        }
        result = imports.apply(&result);
    }
    Ok(result)
}

/// Apply sorted, non-overlapping replacements from the end of the source to
/// the start so earlier offsets stay valid.
pub(crate) fn apply_replacements(
    source: &str,
    replacements: &[Replacement],
) -> Result<String, FixError> {
    for r in replacements {
        r.validate(source)?;
    }
    let mut result = source.to_string();
    for r in replacements.iter().rev() {
        result.replace_range(r.range(), &r.text);
    }
    Ok(result)
}

impl From<Node<'_>> for Span {
    fn from(node: Node<'_>) -> Span {
        node.span()
    }
}

impl From<&Node<'_>> for Span {
    fn from(node: &Node<'_>) -> Span {
        node.span()
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Span {
        Span::new(range.start, range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_replacements_are_rejected() {
        let err = SuggestedFix::builder()
            .replace(Span::new(10, 20), "a")
            .replace(Span::new(15, 25), "b")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            FixError::Overlapping {
                first: 10..20,
                second: 15..25
            }
        );
    }

    #[test]
    fn adjacent_ranges_do_not_overlap() {
        let fix = SuggestedFix::builder()
            .replace(Span::new(0, 5), "a")
            .replace(Span::new(5, 10), "b")
            .build()
            .unwrap();
        assert_eq!(fix.replacements().len(), 2);
    }

    #[test]
    fn insertion_at_range_start_is_not_overlap() {
        let fix = SuggestedFix::builder()
            .replace(Span::new(5, 8), "x")
            .prefix_with(Span::new(5, 8), "(")
            .build()
            .unwrap();
        assert_eq!(fix.replacements()[0], Replacement::new(5, 5, "("));
    }

    #[test]
    fn insertion_inside_range_overlaps() {
        let result = SuggestedFix::builder()
            .replace(Span::new(5, 8), "x")
            .replace(Span::new(6, 6), "y")
            .build();
        assert!(matches!(result, Err(FixError::Overlapping { .. })));
    }

    #[test]
    fn same_offset_insertions_coalesce_in_order() {
        let fix = SuggestedFix::builder()
            .postfix_with(Span::new(0, 3), "b")
            .postfix_with(Span::new(0, 3), "c")
            .prefix_with(Span::new(3, 4), "a")
            .build()
            .unwrap();
        assert_eq!(fix.replacements(), &[Replacement::new(3, 3, "bca")]);
    }

    #[test]
    fn merged_insertions_at_one_offset_do_not_depend_on_order() {
        let source = "0123456";
        let mut a = FixBuilder::new();
        a.prefix_with(Span::new(3, 5), "a");
        let mut b = FixBuilder::new();
        b.prefix_with(Span::new(3, 4), "b");

        let ab = FixBuilder::new().merge(&a).merge(&b).build();
        let ba = FixBuilder::new().merge(&b).merge(&a).build();
        assert_eq!(ab, ba);
        assert_eq!(
            ab,
            Err(FixError::Overlapping {
                first: 3..3,
                second: 3..3
            })
        );

        // The same insertion requested twice is not a conflict.
        let twice = FixBuilder::new()
            .merge_fix(&SuggestedFix::prefix_with(Span::new(3, 4), "a"))
            .merge(&a)
            .build()
            .unwrap();
        assert_eq!(apply_fix(source, &twice).unwrap(), "012a3456");
    }

    #[test]
    fn overlap_with_an_earlier_wide_edit_is_found() {
        let err = SuggestedFix::builder()
            .replace(Span::new(0, 10), "x")
            .replace(Span::new(2, 3), "y")
            .replace(Span::new(8, 12), "z")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            FixError::Overlapping {
                first: 0..10,
                second: 2..3
            }
        );
        let err = SuggestedFix::builder()
            .replace(Span::new(0, 10), "x")
            .replace(Span::new(12, 14), "y")
            .replace(Span::new(9, 9), "z")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            FixError::Overlapping {
                first: 0..10,
                second: 9..9
            }
        );
    }

    #[test]
    fn identical_replacements_are_deduplicated() {
        let fix = SuggestedFix::builder()
            .replace(Span::new(1, 2), "z")
            .replace(Span::new(1, 2), "z")
            .build()
            .unwrap();
        assert_eq!(fix.replacements().len(), 1);
    }

    #[test]
    fn merge_keeps_first_description_and_dedups_imports() {
        let mut a = FixBuilder::new();
        a.add_import("java.util.List");
        let mut b = FixBuilder::new();
        b.set_short_description("use list")
            .add_import("java.util.List")
            .add_static_import("java.util.Objects.requireNonNull");
        a.merge(&b);
        let fix = a.build().unwrap();
        assert_eq!(fix.short_description(), "use list");
        assert_eq!(
            fix.imports_to_add(),
            &[
                "import java.util.List".to_string(),
                "import static java.util.Objects.requireNonNull".to_string()
            ]
        );
    }

    #[test]
    fn merge_of_overlapping_fixes_fails_at_build() {
        let first = SuggestedFix::replace(Span::new(0, 4), "x");
        let second = SuggestedFix::replace(Span::new(2, 6), "y");
        let result = SuggestedFix::builder()
            .merge_fix(&first)
            .merge_fix(&second)
            .build();
        assert!(matches!(result, Err(FixError::Overlapping { .. })));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let result = SuggestedFix::builder().replace_range(9, 3, "").build();
        assert_eq!(result, Err(FixError::InvalidEditOrder { start: 9, end: 3 }));
    }

    #[test]
    fn errors_render_as_lowercase_fragments() {
        let out_of_bounds = apply_fix("short", &SuggestedFix::replace(Span::new(0, 50), "x"));
        assert_eq!(
            out_of_bounds.unwrap_err().to_string(),
            "edit range [0..50) exceeds source length 5"
        );
        let reversed = SuggestedFix::builder().replace_range(9, 3, "").build();
        assert_eq!(reversed.unwrap_err().to_string(), "edit start 9 is after edit end 3");
    }

    #[test]
    fn apply_preserves_offsets() {
        let source = "one two three";
        let fix = SuggestedFix::builder()
            .replace(Span::new(8, 13), "3")
            .replace(Span::new(0, 3), "1")
            .replace(Span::new(4, 7), "2")
            .build()
            .unwrap();
        assert_eq!(apply_fix(source, &fix).unwrap(), "1 2 3");
    }

    #[test]
    fn apply_rejects_out_of_bounds() {
        let fix = SuggestedFix::replace(Span::new(0, 50), "x");
        assert!(matches!(
            apply_fix("short", &fix),
            Err(FixError::InvalidRange { .. })
        ));
    }

    #[test]
    fn static_imports_are_removed_only_by_static_directives() {
        let source = "import static org.junit.Assert.assertTrue;\n\
                      import java.util.List;\n\nclass T {}\n";
        let plain = SuggestedFix::builder()
            .remove_import("org.junit.Assert.assertTrue")
            .build()
            .unwrap();
        assert_eq!(apply_fix(source, &plain).unwrap(), source);

        let fix = SuggestedFix::builder()
            .remove_static_import("org.junit.Assert.assertTrue")
            .build()
            .unwrap();
        assert_eq!(
            fix.imports_to_remove(),
            &["import static org.junit.Assert.assertTrue".to_string()]
        );
        assert_eq!(
            apply_fix(source, &fix).unwrap(),
            "import java.util.List;\n\nclass T {}\n"
        );
    }

    #[test]
    fn replace_adjusted_moves_both_ends() {
        let fix = SuggestedFix::builder()
            .replace_adjusted(Span::new(4, 6), "", -1, 1)
            .build()
            .unwrap();
        assert_eq!(fix.replacements(), &[Replacement::new(3, 7, "")]);
    }

    #[test]
    fn empty_builder_builds_empty_fix() {
        assert!(SuggestedFix::builder().build().unwrap().is_empty());
    }
}
