//! Exact-match accuracy and corpus BLEU over one record store.
//!
//! ```rust,ignore
//! use fim_eval::metrics::{MetricsAggregator, TreebankTokenizer};
//! use fim_eval::text::SentinelStripper;
//!
//! let tokenizer = TreebankTokenizer::new();
//! let stripper = SentinelStripper::default();
//! let report = MetricsAggregator::new(&tokenizer, &stripper).aggregate(&store)?;
//! print!("{}", report.render_text());
//! ```

mod bleu;
mod tokenizer;

pub use bleu::{BleuStats, MAX_ORDER, corpus_bleu};
pub use tokenizer::{TreebankTokenizer, WhitespaceTokenizer, WordTokenizer};

use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::store::RecordStore;
use crate::text::SentinelStripper;

#[derive(Debug, Error)]
pub enum MetricsError {
    /// Accuracy is undefined without records.
    #[error("record store {0} has no records; accuracy is undefined")]
    EmptyStore(String),
}

/// Aggregate scores for one store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub total: usize,
    pub exact_match: usize,
    pub accuracy: f64,
    pub bleu: f64,
    pub tokenizer: &'static str,
}

impl MetricsReport {
    /// The four-line plain text report.
    pub fn render_text(&self) -> String {
        format!(
            "Total: {}\n[Exact Match] Correct: {}\n[Exact Match] Accuracy: {:.2}\nBLEU Score: {:.4}\n",
            self.total, self.exact_match, self.accuracy, self.bleu
        )
    }
}

/// Scores generated completions against expected ones.
///
/// The tokenizer and sentinel stripper are supplied by the caller; the
/// aggregator holds no state between calls.
pub struct MetricsAggregator<'a> {
    tokenizer: &'a dyn WordTokenizer,
    stripper: &'a SentinelStripper,
}

impl<'a> MetricsAggregator<'a> {
    pub fn new(tokenizer: &'a dyn WordTokenizer, stripper: &'a SentinelStripper) -> Self {
        Self {
            tokenizer,
            stripper,
        }
    }

    pub fn aggregate(&self, store: &RecordStore) -> Result<MetricsReport, MetricsError> {
        let started = Instant::now();
        let mut total = 0usize;
        let mut exact_match = 0usize;
        let mut stats = BleuStats::default();

        for record in store {
            let generated = self.stripper.strip(&record.generated);
            if generated == record.expected {
                exact_match += 1;
            }
            total += 1;

            let hypothesis = self.tokenizer.tokenize(&generated);
            let reference = self.tokenizer.tokenize(&record.expected);
            stats.add(&hypothesis, &reference);
        }

        if total == 0 {
            return Err(MetricsError::EmptyStore(store.path().display().to_string()));
        }

        let accuracy = exact_match as f64 / total as f64;
        let bleu = stats.score();

        debug!(
            component = "metrics",
            precisions = ?stats.precisions(),
            brevity_penalty = stats.brevity_penalty(),
            "BLEU components"
        );
        info!(
            component = "metrics",
            operation = "aggregate",
            path = %store.path().display(),
            total,
            exact_match,
            accuracy,
            bleu,
            tokenizer = self.tokenizer.name(),
            duration_ms = started.elapsed().as_millis(),
            "Computed metrics"
        );

        Ok(MetricsReport {
            total,
            exact_match,
            accuracy,
            bleu,
            tokenizer: self.tokenizer.name(),
        })
    }
}
