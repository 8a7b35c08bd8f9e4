//! Content matching between two record stores.
//!
//! Stores produced by different runs may be ordered differently, so records are
//! joined on a digest of their `prefix` instead of their position.

use std::fmt;

use rand::Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

use crate::store::RecordStore;

/// Hex-encoded SHA-256 of a record prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DigestKey(String);

impl DigestKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DigestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the join key for a prefix.
pub fn digest_key(text: &str) -> DigestKey {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    DigestKey(hex::encode(hasher.finalize()))
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("source store is empty; nothing to sample")]
    EmptySource,

    #[error("example index {index} is out of range for a store of {len} records")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no record in the target store matches example #{index} (prefix digest {key})")]
    NoMatch { index: usize, key: DigestKey },
}

/// Pick the source index: the explicit one when given, otherwise uniform over `0..len`.
pub fn select_index<R: Rng + ?Sized>(
    len: usize,
    explicit: Option<usize>,
    rng: &mut R,
) -> Result<usize, MatchError> {
    match explicit {
        Some(index) if index < len => Ok(index),
        Some(index) => Err(MatchError::IndexOutOfRange { index, len }),
        None if len == 0 => Err(MatchError::EmptySource),
        None => Ok(rng.gen_range(0..len)),
    }
}

/// Digest keys of a store, in record order.
#[derive(Debug, Clone)]
pub struct KeyIndex {
    keys: Vec<DigestKey>,
}

impl KeyIndex {
    pub fn build(store: &RecordStore) -> Self {
        Self {
            keys: store.iter().map(|r| digest_key(&r.prefix)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DigestKey> {
        self.keys.get(index)
    }

    /// Position of the first record with this key.
    pub fn position(&self, key: &DigestKey) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Number of records sharing this key.
    pub fn occurrences(&self, key: &DigestKey) -> usize {
        self.keys.iter().filter(|k| *k == key).count()
    }
}

/// A source record and its counterpart in the target store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    pub source_index: usize,
    pub target_index: usize,
    pub key: DigestKey,
}

/// Aligns records of a source store with a target store.
pub struct ContentMatcher<'a> {
    source: &'a RecordStore,
    target_keys: KeyIndex,
}

impl<'a> ContentMatcher<'a> {
    pub fn new(source: &'a RecordStore, target: &RecordStore) -> Self {
        Self {
            source,
            target_keys: KeyIndex::build(target),
        }
    }

    /// Choose a source record and find the first target record with the same prefix digest.
    pub fn pair<R: Rng + ?Sized>(
        &self,
        explicit: Option<usize>,
        rng: &mut R,
    ) -> Result<MatchedPair, MatchError> {
        let source_index = select_index(self.source.len(), explicit, rng)?;
        let record = self
            .source
            .get(source_index)
            .ok_or(MatchError::IndexOutOfRange {
                index: source_index,
                len: self.source.len(),
            })?;
        let key = digest_key(&record.prefix);

        let target_index = self
            .target_keys
            .position(&key)
            .ok_or_else(|| MatchError::NoMatch {
                index: source_index,
                key: key.clone(),
            })?;

        let candidates = self.target_keys.occurrences(&key);
        if candidates > 1 {
            warn!(
                component = "matcher",
                source_index,
                target_index,
                candidates,
                "Prefix digest is ambiguous in target store; using first match"
            );
        }

        debug!(
            component = "matcher",
            operation = "pair",
            source_index,
            target_index,
            key = %key,
            explicit = explicit.is_some(),
            "Matched record"
        );

        Ok(MatchedPair {
            source_index,
            target_index,
            key,
        })
    }
}
