//! Three-way diff rendering for fill-in-middle examples.
//!
//! Shows the expected, baseline and post-finetune completions as alternative
//! continuations between the surrounding prefix and suffix.
//!
//! # Architecture
//!
//! ```text
//! render/
//! ├── mod.rs           # Module facade (this file)
//! ├── layout.rs        # Row model and line numbering
//! ├── renderer.rs      # Layout -> HTML table
//! ├── tagged.rs        # Plain tagged-text view
//! └── template.rs      # Escaping and standalone page wrapper
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use fim_eval::render::{DiffInput, render_diff_html};
//!
//! let input = DiffInput::new(prefix, suffix, expected, baseline, post_finetune);
//! let html = render_diff_html(&input);
//! ```

mod layout;
mod renderer;
mod tagged;
mod template;

pub use layout::{ContextWindow, DEFAULT_CONTEXT_LINES, DiffInput, DiffLayout, DiffRow, Section};
pub use renderer::render_diff_html;
pub use tagged::render_tagged_text;
pub use template::{html_escape, wrap_document};

/// Palette for the diff table, GitHub diff colors.
pub mod colors {
    /// Neutral context background (#f6f8fa)
    pub const CONTEXT_BG: &str = "#f6f8fa";

    /// Expected completion row background (#e6ffec)
    pub const EXPECTED_BG: &str = "#e6ffec";

    /// Baseline completion row background (#ffebe9)
    pub const BASELINE_BG: &str = "#ffebe9";

    /// Post-finetune completion row background (#ddf4ff)
    pub const POST_FINETUNE_BG: &str = "#ddf4ff";

    /// Hovered completion row (#fffbdd)
    pub const HOVER_BG: &str = "#fffbdd";

    /// Borders and separators (#e1e4e8)
    pub const BORDER: &str = "#e1e4e8";

    /// Primary text (#24292e)
    pub const TEXT_PRIMARY: &str = "#24292e";

    /// Line numbers and captions (#6a737d)
    pub const TEXT_MUTED: &str = "#6a737d";

    /// Expected legend badge (#2da44e)
    pub const EXPECTED_BADGE: &str = "#2da44e";

    /// Baseline legend badge (#cf222e)
    pub const BASELINE_BADGE: &str = "#cf222e";

    /// Post-finetune legend badge (#0969da)
    pub const POST_FINETUNE_BADGE: &str = "#0969da";
}
