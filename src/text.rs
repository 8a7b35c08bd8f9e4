//! Text helpers shared by the compare, render and metrics workflows.
//!
//! - **Sentinel stripping**: removes decoder control markers from generated text
//! - **Context windows**: keeps the lines closest to the completion point

/// File separator marker emitted by the fill-in-middle decoder.
pub const FILE_SEP_TOKEN: &str = "<|file_sep|>";

/// Padding marker emitted by the fill-in-middle decoder.
pub const FIM_PAD_TOKEN: &str = "<|fim_pad|>";

/// Default sentinel set, in removal order.
pub const DEFAULT_SENTINELS: [&str; 2] = [FILE_SEP_TOKEN, FIM_PAD_TOKEN];

/// Removes sentinel tokens from model output.
///
/// Removal repeats until the text stops changing, so a token spliced together
/// by an earlier removal is removed too and stripping stays idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelStripper {
    tokens: Vec<String>,
}

impl SentinelStripper {
    /// Create a stripper for the given tokens. Empty tokens are ignored.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.is_empty())
                .collect(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Strip every sentinel occurrence from `text`.
    pub fn strip(&self, text: &str) -> String {
        let mut current = text.to_string();
        loop {
            let mut next = current.clone();
            for token in &self.tokens {
                if next.contains(token.as_str()) {
                    next = next.replace(token.as_str(), "");
                }
            }
            if next == current {
                return next;
            }
            current = next;
        }
    }
}

impl Default for SentinelStripper {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINELS)
    }
}

/// Keep at most the last `n` lines of `text`, in original order.
pub fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

/// Keep at most the first `n` lines of `text`.
pub fn first_lines(text: &str, n: usize) -> String {
    text.split('\n').take(n).collect::<Vec<_>>().join("\n")
}

/// Number of `\n`-separated lines; the empty string counts as one line.
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}
