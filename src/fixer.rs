//! Host-side patch pass: applies the first fix of each finding to a file.
//!
//! Fixes from different checkers compose when their ranges are disjoint. A
//! fix that overlaps one already accepted is skipped and counted rather than
//! reconciled.

use crate::checker::FixSafety;
use crate::description::Description;
use crate::fix::{FixError, SuggestedFix, apply_fix};
use std::path::Path;

/// Result of applying fixes to a source file.
#[derive(Debug)]
pub struct FixResult {
    /// The modified source code.
    pub fixed_source: String,
    /// Number of fixes applied.
    pub fixes_applied: usize,
    /// Fixes dropped because they overlap an earlier accepted fix.
    pub fixes_conflicting: usize,
    /// Unsafe fixes left out because `allow_unsafe` was off.
    pub fixes_unsafe: usize,
}

/// Apply the first fix of every description, in reporting order.
///
/// # Errors
///
/// Returns an error if an accepted fix lies outside `source`.
pub fn apply_descriptions(
    source: &str,
    descriptions: &[Description],
    allow_unsafe: bool,
) -> Result<FixResult, FixError> {
    let mut accepted: Vec<&SuggestedFix> = Vec::new();
    let mut conflicting = 0;
    let mut unsafe_skipped = 0;

    for description in descriptions {
        let Some(fix) = description.first_fix() else {
            continue;
        };
        if fix.is_empty() {
            continue;
        }
        if description.checker.fix.safety == FixSafety::Unsafe && !allow_unsafe {
            unsafe_skipped += 1;
            continue;
        }
        let clashes = accepted.iter().any(|other| {
            other
                .replacements()
                .iter()
                .any(|a| fix.replacements().iter().any(|b| a.overlaps_with(b)))
        });
        if clashes {
            tracing::debug!(
                checker = description.check_name(),
                line = description.start.row,
                "skipping fix that overlaps an earlier one"
            );
            conflicting += 1;
            continue;
        }
        accepted.push(fix);
    }

    let mut merged = SuggestedFix::builder();
    for fix in &accepted {
        merged.merge_fix(fix);
    }
    let fixed_source = apply_fix(source, &merged.build()?)?;

    Ok(FixResult {
        fixed_source,
        fixes_applied: accepted.len(),
        fixes_conflicting: conflicting,
        fixes_unsafe: unsafe_skipped,
    })
}

/// Generate a unified diff between original and fixed source.
///
/// Includes context lines (3 lines before and after each change).
pub fn format_diff(original: &str, fixed: &str, path: &Path) -> String {
    format_diff_with_context(original, fixed, path, 3)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    Same(usize, usize),
    Removed(usize),
    Added(usize),
}

/// Largest middle section, in table cells, that gets a line-level LCS. Past
/// it the middle is shown as one removed block followed by one added block.
const MAX_LCS_CELLS: usize = 4 * 1024 * 1024;

/// Line-level edit script.
///
/// The common prefix and suffix are matched directly and only the middle
/// gets a longest-common-subsequence table, so a fix touching a few nearby
/// lines costs a few lines of work whatever the file size.
fn diff_lines(a: &[&str], b: &[&str]) -> Vec<Line> {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let (a_mid, b_mid) = (&a[prefix..a.len() - suffix], &b[prefix..b.len() - suffix]);

    let mut out = Vec::with_capacity(a.len().max(b.len()));
    out.extend((0..prefix).map(|i| Line::Same(i, i)));
    for line in diff_middle(a_mid, b_mid) {
        out.push(match line {
            Line::Same(i, j) => Line::Same(prefix + i, prefix + j),
            Line::Removed(i) => Line::Removed(prefix + i),
            Line::Added(j) => Line::Added(prefix + j),
        });
    }
    let (a_tail, b_tail) = (a.len() - suffix, b.len() - suffix);
    out.extend((0..suffix).map(|k| Line::Same(a_tail + k, b_tail + k)));
    out
}

fn diff_middle(a: &[&str], b: &[&str]) -> Vec<Line> {
    let (n, m) = (a.len(), b.len());
    if (n + 1).saturating_mul(m + 1) > MAX_LCS_CELLS {
        return (0..n).map(Line::Removed).chain((0..m).map(Line::Added)).collect();
    }

    let mut lcs = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut out = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            out.push(Line::Same(i, j));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            out.push(Line::Removed(i));
            i += 1;
        } else {
            out.push(Line::Added(j));
            j += 1;
        }
    }
    out.extend((i..n).map(Line::Removed));
    out.extend((j..m).map(Line::Added));
    out
}

/// Generate a unified diff with configurable context lines.
pub fn format_diff_with_context(
    original: &str,
    fixed: &str,
    path: &Path,
    context: usize,
) -> String {
    use std::fmt::Write;

    let orig_lines: Vec<&str> = original.lines().collect();
    let fixed_lines: Vec<&str> = fixed.lines().collect();
    let script = diff_lines(&orig_lines, &fixed_lines);

    let changed: Vec<usize> = script
        .iter()
        .enumerate()
        .filter(|(_, l)| !matches!(l, Line::Same(..)))
        .map(|(i, _)| i)
        .collect();
    if changed.is_empty() {
        return String::new();
    }

    // Group changed script positions into hunks with context.
    let mut hunks: Vec<(usize, usize)> = Vec::new();
    for &i in &changed {
        let start = i.saturating_sub(context);
        let end = (i + context + 1).min(script.len());
        match hunks.last_mut() {
            Some((_, last_end)) if start <= *last_end => *last_end = end,
            _ => hunks.push((start, end)),
        }
    }

    let path_str = path.display().to_string();
    let mut output = String::new();
    let _ = writeln!(output, "--- a/{path_str}");
    let _ = writeln!(output, "+++ b/{path_str}");

    for (start, end) in hunks {
        let lines = &script[start..end];
        let orig_before = script[..start]
            .iter()
            .filter(|l| !matches!(l, Line::Added(_)))
            .count();
        let fixed_before = script[..start]
            .iter()
            .filter(|l| !matches!(l, Line::Removed(_)))
            .count();
        let orig_size = lines.iter().filter(|l| !matches!(l, Line::Added(_))).count();
        let fixed_size = lines.iter().filter(|l| !matches!(l, Line::Removed(_))).count();
        // An empty side names the line before the hunk.
        let header_start = |before: usize, size: usize| {
            if size == 0 { before } else { before + 1 }
        };

        let _ = writeln!(
            output,
            "@@ -{},{} +{},{} @@",
            header_start(orig_before, orig_size),
            orig_size,
            header_start(fixed_before, fixed_size),
            fixed_size
        );
        for line in lines {
            let _ = match *line {
                Line::Same(i, _) => writeln!(output, " {}", orig_lines[i]),
                Line::Removed(i) => writeln!(output, "-{}", orig_lines[i]),
                Line::Added(j) => writeln!(output, "+{}", fixed_lines[j]),
            };
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_diff() {
        let original = "class A {\n    int x = 1;\n}\n";
        let fixed = "class A {\n    long x = 1L;\n}\n";
        let path = Path::new("A.java");

        let diff = format_diff(original, fixed, path);
        assert_eq!(
            diff,
            "--- a/A.java\n+++ b/A.java\n@@ -1,3 +1,3 @@\n class A {\n-    int x = 1;\n\
             +    long x = 1L;\n }\n"
        );
    }

    #[test]
    fn inserted_line_keeps_later_lines_as_context() {
        let original = "a\nb\nc\n";
        let fixed = "a\nnew\nb\nc\n";
        let diff = format_diff_with_context(original, fixed, Path::new("f"), 0);
        assert!(diff.contains("@@ -1,0 +2,1 @@\n+new\n"));
        assert!(!diff.contains("-b"));
    }

    #[test]
    fn large_files_only_diff_the_changed_middle() {
        let original: String = (0..20_000).map(|i| format!("line {i}\n")).collect();
        let fixed = original.replace("line 10000\n", "line ten thousand\n");
        let orig_lines: Vec<&str> = original.lines().collect();
        let fixed_lines: Vec<&str> = fixed.lines().collect();

        let script = diff_lines(&orig_lines, &fixed_lines);
        assert_eq!(script.len(), 20_001);
        assert_eq!(script[10_000], Line::Removed(10_000));
        assert_eq!(script[10_001], Line::Added(10_000));
        assert_eq!(script[20_000], Line::Same(19_999, 19_999));

        let diff = format_diff_with_context(&original, &fixed, Path::new("f"), 1);
        assert_eq!(
            diff,
            "--- a/f\n+++ b/f\n@@ -10000,3 +10000,3 @@\n line 9999\n-line 10000\n\
             +line ten thousand\n line 10001\n"
        );
    }

    #[test]
    fn oversized_middles_fall_back_to_block_replacement() {
        let a: Vec<String> = (0..3000).map(|i| format!("a{i}")).collect();
        let b: Vec<String> = (0..3000).map(|i| format!("b{i}")).collect();
        let a: Vec<&str> = a.iter().map(String::as_str).collect();
        let b: Vec<&str> = b.iter().map(String::as_str).collect();
        let script = diff_lines(&a, &b);
        assert_eq!(script.len(), 6000);
        assert_eq!(script[2999], Line::Removed(2999));
        assert_eq!(script[3000], Line::Added(0));
    }

    #[test]
    fn identical_sources_have_no_diff() {
        assert!(format_diff("x\n", "x\n", Path::new("f")).is_empty());
    }
}
