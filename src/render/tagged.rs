//! Plain tagged-text view.
//!
//! Inlines the three completions between the untouched prefix and suffix,
//! each wrapped in its own pseudo-tag. Nothing is escaped or numbered, so the
//! output reads like the source file with the completion point marked.

use super::layout::DiffInput;

pub fn render_tagged_text(input: &DiffInput) -> String {
    format!(
        "{prefix}<expected>{expected}</expected><baseline>{baseline}</baseline><post_finetune>{post_finetune}</post_finetune>{suffix}",
        prefix = input.prefix,
        expected = input.expected,
        baseline = input.baseline,
        post_finetune = input.post_finetune,
        suffix = input.suffix,
    )
}
