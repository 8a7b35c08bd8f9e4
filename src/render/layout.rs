//! Row model and line numbering for the diff view.
//!
//! Line numbers are relative to the rendered context: line 1 is the first
//! prefix line that is shown, whether or not the prefix was truncated.

use super::template::html_escape;
use crate::text::{first_lines, last_lines};

/// Lines of context kept on each side of the completion point by default.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// The five texts of one comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffInput {
    pub prefix: String,
    pub suffix: String,
    pub expected: String,
    pub baseline: String,
    pub post_finetune: String,
}

impl DiffInput {
    pub fn new(
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        expected: impl Into<String>,
        baseline: impl Into<String>,
        post_finetune: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            expected: expected.into(),
            baseline: baseline.into(),
            post_finetune: post_finetune.into(),
        }
    }

    /// Narrow prefix and suffix to `window`.
    pub fn with_window(mut self, window: ContextWindow) -> Self {
        self.prefix = window.trim_prefix(&self.prefix);
        self.suffix = window.trim_suffix(&self.suffix);
        self
    }
}

/// How much surrounding code to keep around the completion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextWindow {
    lines: usize,
}

impl ContextWindow {
    pub fn new(lines: usize) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Last `lines` lines of the prefix.
    pub fn trim_prefix(&self, prefix: &str) -> String {
        last_lines(prefix, self.lines)
    }

    /// First `lines` lines of the suffix.
    pub fn trim_suffix(&self, suffix: &str) -> String {
        first_lines(suffix, self.lines)
    }
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_LINES)
    }
}

/// Which part of the comparison a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Prefix,
    Expected,
    Baseline,
    PostFinetune,
    Suffix,
}

impl Section {
    /// Completion rows are the alternatives; prefix/suffix are shared context.
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            Section::Expected | Section::Baseline | Section::PostFinetune
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Section::Prefix => "prefix",
            Section::Expected => "expected",
            Section::Baseline => "baseline",
            Section::PostFinetune => "post-finetune",
            Section::Suffix => "suffix",
        }
    }
}

/// One rendered line. `text` is already HTML-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRow {
    pub section: Section,
    pub line_number: usize,
    pub text: String,
}

/// Ordered rows: prefix, expected, baseline, post-finetune, suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLayout {
    rows: Vec<DiffRow>,
    prefix_lines: usize,
    completion_span: usize,
}

impl DiffLayout {
    pub fn build(input: &DiffInput) -> Self {
        let prefix = html_escape(&input.prefix);
        let suffix = html_escape(&input.suffix);
        let expected = html_escape(&input.expected);
        let baseline = html_escape(&input.baseline);
        let post_finetune = html_escape(&input.post_finetune);

        let prefix_lines: Vec<&str> = prefix.split('\n').collect();
        let expected_lines: Vec<&str> = expected.trim().split('\n').collect();
        let baseline_lines: Vec<&str> = baseline.trim().split('\n').collect();
        let post_finetune_lines: Vec<&str> = post_finetune.trim().split('\n').collect();

        let prefix_count = prefix_lines.len();
        let completion_span = expected_lines
            .len()
            .max(baseline_lines.len())
            .max(post_finetune_lines.len());

        let mut rows = Vec::new();
        push_rows(&mut rows, Section::Prefix, 1, &prefix_lines);
        for (section, lines) in [
            (Section::Expected, &expected_lines),
            (Section::Baseline, &baseline_lines),
            (Section::PostFinetune, &post_finetune_lines),
        ] {
            push_rows(&mut rows, section, prefix_count + 1, lines);
        }
        let suffix_lines: Vec<&str> = suffix.split('\n').collect();
        push_rows(
            &mut rows,
            Section::Suffix,
            prefix_count + completion_span + 1,
            &suffix_lines,
        );

        Self {
            rows,
            prefix_lines: prefix_count,
            completion_span,
        }
    }

    pub fn rows(&self) -> &[DiffRow] {
        &self.rows
    }

    /// Rows belonging to one section, in order.
    pub fn section(&self, section: Section) -> impl Iterator<Item = &DiffRow> {
        self.rows.iter().filter(move |r| r.section == section)
    }

    pub fn prefix_lines(&self) -> usize {
        self.prefix_lines
    }

    /// Longest of the three completions, in lines.
    pub fn completion_span(&self) -> usize {
        self.completion_span
    }

    /// First line number of the suffix.
    pub fn suffix_start(&self) -> usize {
        self.prefix_lines + self.completion_span + 1
    }
}

fn push_rows(rows: &mut Vec<DiffRow>, section: Section, first: usize, lines: &[&str]) {
    rows.extend(lines.iter().enumerate().map(|(i, line)| DiffRow {
        section,
        line_number: first + i,
        text: (*line).to_string(),
    }));
}
