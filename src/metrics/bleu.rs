//! Corpus-level BLEU.
//!
//! Modified n-gram precision for orders 1 through 4 with uniform weights,
//! combined as a geometric mean and scaled by the brevity penalty. Each
//! hypothesis has exactly one reference. Clipped matches and candidate n-gram
//! counts are summed over the whole corpus before dividing. Orders longer than
//! every hypothesis are left out of the mean.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

/// Highest n-gram order.
pub const MAX_ORDER: usize = 4;

/// Sufficient statistics for corpus BLEU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BleuStats {
    /// Clipped n-gram matches per order (index 0 = unigrams).
    pub matches: [u64; MAX_ORDER],
    /// Candidate n-gram counts per order.
    pub totals: [u64; MAX_ORDER],
    pub hypothesis_len: u64,
    pub reference_len: u64,
}

impl BleuStats {
    /// Accumulate one hypothesis/reference pair.
    pub fn add<S: AsRef<str>>(&mut self, hypothesis: &[S], reference: &[S]) {
        self.hypothesis_len += hypothesis.len() as u64;
        self.reference_len += reference.len() as u64;

        for n in 1..=MAX_ORDER {
            let hyp_counts = ngram_counts(hypothesis, n);
            let ref_counts = ngram_counts(reference, n);
            let clipped: u64 = hyp_counts
                .iter()
                .map(|(gram, count)| (*count).min(ref_counts.get(gram).copied().unwrap_or(0)))
                .sum();
            self.matches[n - 1] += clipped;
            self.totals[n - 1] += hypothesis.len().saturating_sub(n - 1) as u64;
        }
    }

    /// Brevity penalty: 1 when the hypotheses are longer than the references.
    pub fn brevity_penalty(&self) -> f64 {
        let c = self.hypothesis_len as f64;
        let r = self.reference_len as f64;
        if self.hypothesis_len > self.reference_len {
            1.0
        } else if self.hypothesis_len == 0 {
            0.0
        } else {
            (1.0 - r / c).exp()
        }
    }

    /// Modified precision per order. Orders without candidates report 0.
    pub fn precisions(&self) -> [f64; MAX_ORDER] {
        let mut out = [0.0; MAX_ORDER];
        for (i, p) in out.iter_mut().enumerate() {
            if self.totals[i] > 0 {
                *p = self.matches[i] as f64 / self.totals[i] as f64;
            }
        }
        out
    }

    /// Number of orders with at least one candidate n-gram in the corpus.
    pub fn effective_order(&self) -> usize {
        self.totals.iter().take_while(|t| **t > 0).count()
    }

    /// The BLEU score in [0, 1].
    ///
    /// No unigram match scores 0. Orders with no candidate n-grams anywhere in
    /// the corpus (every hypothesis shorter than n) drop out of the geometric
    /// mean and the remaining weights are renormalised. A zero precision at an
    /// order that does have candidates is replaced by the smallest positive
    /// f64, which drives the score to effectively zero without producing NaN.
    pub fn score(&self) -> f64 {
        if self.matches[0] == 0 {
            return 0.0;
        }
        let order = self.effective_order();
        let weight = 1.0 / order as f64;
        let log_sum: f64 = self.precisions()[..order]
            .iter()
            .map(|p| {
                let p = if *p > 0.0 { *p } else { f64::MIN_POSITIVE };
                weight * p.ln()
            })
            .sum();
        let score = self.brevity_penalty() * log_sum.exp();
        debug!(
            component = "bleu",
            matches = ?self.matches,
            totals = ?self.totals,
            hypothesis_len = self.hypothesis_len,
            reference_len = self.reference_len,
            order,
            score,
            "Computed corpus BLEU"
        );
        score.clamp(0.0, 1.0)
    }
}

fn ngram_counts<S: AsRef<str>>(tokens: &[S], n: usize) -> HashMap<Vec<&str>, u64> {
    let mut counts = HashMap::new();
    if tokens.len() < n {
        return counts;
    }
    for window in tokens.windows(n) {
        let gram: Vec<&str> = window.iter().map(|t| t.as_ref()).collect();
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

/// Corpus BLEU over `(hypothesis, reference)` token pairs.
pub fn corpus_bleu<S: AsRef<str>>(pairs: &[(Vec<S>, Vec<S>)]) -> f64 {
    let mut stats = BleuStats::default();
    for (hypothesis, reference) in pairs {
        stats.add(hypothesis, reference);
    }
    stats.score()
}
