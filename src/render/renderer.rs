//! Diff layout to HTML rendering.
//!
//! Produces a self-contained fragment with inline styles only, so it can be
//! pasted into notebooks, issue trackers or written to a file as-is.
//!
//! # Features
//!
//! - **Stacked alternatives**: the three completions share line numbers
//! - **Color grouping**: neutral context, green expected, red baseline, blue post-finetune
//! - **Hover highlight**: completion rows light up under the pointer
//! - **XSS prevention**: all inputs are escaped by the layout

use std::time::Instant;

use tracing::{debug, trace};

use super::colors;
use super::layout::{DiffInput, DiffLayout, DiffRow, Section};

fn line_number_style() -> String {
    format!(
        "text-align: right; padding: 0 8px; width: 1%; min-width: 50px; color: {muted}; border-right: 1px solid {border}; user-select: none;",
        muted = colors::TEXT_MUTED,
        border = colors::BORDER,
    )
}

/// Render a three-way comparison as an HTML fragment.
pub fn render_diff_html(input: &DiffInput) -> String {
    let started = Instant::now();
    let layout = DiffLayout::build(input);
    let mut html = String::with_capacity(2048 + layout.rows().len() * 512);

    html.push_str(&render_header());
    for row in layout.rows() {
        html.push_str(&render_row(row));
    }
    html.push_str(&render_footer());

    debug!(
        component = "renderer",
        operation = "render_diff_html",
        rows = layout.rows().len(),
        prefix_lines = layout.prefix_lines(),
        completion_span = layout.completion_span(),
        duration_ms = started.elapsed().as_millis(),
        bytes = html.len(),
        "Diff rendered"
    );

    html
}

fn render_header() -> String {
    format!(
        r#"
<div style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; line-height: 1.5; color: {text}; background-color: {context}; margin: 0; margin-top: 20px">
  <div style="margin: 0 auto; background-color: #fff; border: 1px solid {border}; border-radius: 6px; box-shadow: 0 1px 3px rgba(0,0,0,0.05);">
    <div style="padding: 8px 16px; background-color: {context}; border-bottom: 1px solid {border}; font-weight: 600; font-size: 14px; display: flex; justify-content: space-between; align-items: center;">
      <span style="color: {text};">Code Comparison</span>
      <span style="color: {muted}; font-size: 12px;">Fill-in-middle comparison</span>
    </div>

    <div style="background-color: {context}; padding: 8px 16px; color: {text}; font-size: 12px; border-bottom: 1px solid {border};">
      <div style="font-weight: 600; margin-bottom: 5px;">Function Implementation Comparison</div>
      <div style="color: {muted};">3 versions: expected, baseline, post-finetune</div>
    </div>

    <div style="font-family: SFMono-Regular, Consolas, 'Liberation Mono', Menlo, monospace; font-size: 12px; line-height: 1.5; tab-size: 2; overflow-x: auto;">
      <table style="width: 100%; border-spacing: 0;">
        <tbody>
"#,
        text = colors::TEXT_PRIMARY,
        context = colors::CONTEXT_BG,
        border = colors::BORDER,
        muted = colors::TEXT_MUTED,
    )
}

/// Background color for a section's rows.
fn section_background(section: Section) -> &'static str {
    match section {
        Section::Prefix | Section::Suffix => colors::CONTEXT_BG,
        Section::Expected => colors::EXPECTED_BG,
        Section::Baseline => colors::BASELINE_BG,
        Section::PostFinetune => colors::POST_FINETUNE_BG,
    }
}

fn render_row(row: &DiffRow) -> String {
    trace!(
        component = "renderer",
        section = row.section.label(),
        line = row.line_number,
        "Rendering row"
    );

    let bg = section_background(row.section);
    let hover = if row.section.is_completion() {
        format!(
            r#" onmouseover="this.style.backgroundColor='{hover}'; this.children[0].style.backgroundColor='{hover}';" onmouseout="this.style.backgroundColor='{bg}'; this.children[0].style.backgroundColor='{bg}';""#,
            hover = colors::HOVER_BG,
            bg = bg,
        )
    } else {
        String::new()
    };
    let content = if row.section == Section::Prefix {
        format!(
            r#"<span style="color: {};">{}</span>"#,
            colors::TEXT_PRIMARY,
            row.text
        )
    } else {
        row.text.clone()
    };

    format!(
        r#"          <tr style="height: 1.5em;" data-section="{section}"{hover}>
            <td style="{number_style} background-color: {bg};">{number}</td>
            <td style="padding: 0 10px; white-space: pre; background-color: {bg};">{content}</td>
          </tr>
"#,
        section = row.section.label(),
        hover = hover,
        number_style = line_number_style(),
        bg = bg,
        number = row.line_number,
        content = content,
    )
}

fn render_footer() -> String {
    let badge = |label: &str, color: &str| {
        format!(
            r#"<span style="display: inline-block; padding: 2px 8px; border-radius: 10px; font-size: 12px; font-weight: 500; color: white; background-color: {color};">{label}</span>"#
        )
    };

    format!(
        r#"        </tbody>
      </table>
    </div>

    <div style="border-top: 1px solid {border}; padding: 10px 16px; display: flex; gap: 10px;">
      {expected}
      {baseline}
      {post_finetune}
    </div>
  </div>
</div>"#,
        border = colors::BORDER,
        expected = badge("Expected", colors::EXPECTED_BADGE),
        baseline = badge("Baseline", colors::BASELINE_BADGE),
        post_finetune = badge("Post-Finetune", colors::POST_FINETUNE_BADGE),
    )
}
