//! Runtime configuration.
//!
//! Resolution order, lowest to highest priority: built-in defaults, an optional
//! TOML file, `FIMEVAL_*` environment variables, then command-line flags (applied
//! by the caller).
//!
//! ```toml
//! extra_sentinel_tokens = ["<|endoftext|>"]
//! context_lines = 5
//! tokenizer = "treebank"
//! seed = 42
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::metrics::{TreebankTokenizer, WhitespaceTokenizer, WordTokenizer};
use crate::render::DEFAULT_CONTEXT_LINES;
use crate::text::{DEFAULT_SENTINELS, SentinelStripper};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "FIMEVAL_CONFIG";
pub const CONTEXT_LINES_ENV: &str = "FIMEVAL_CONTEXT_LINES";
pub const TOKENIZER_ENV: &str = "FIMEVAL_TOKENIZER";
pub const SEED_ENV: &str = "FIMEVAL_SEED";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Word tokenizer used for BLEU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    #[default]
    Treebank,
    Whitespace,
}

impl TokenizerKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "treebank" => Some(Self::Treebank),
            "whitespace" => Some(Self::Whitespace),
            _ => None,
        }
    }

    /// Construct a fresh tokenizer instance.
    pub fn build(&self) -> Box<dyn WordTokenizer> {
        match self {
            Self::Treebank => Box::new(TreebankTokenizer::new()),
            Self::Whitespace => Box::new(WhitespaceTokenizer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Markers removed from generated text in addition to the fixed
    /// `<|file_sep|>` and `<|fim_pad|>` tokens.
    pub extra_sentinel_tokens: Vec<String>,
    /// Lines of prefix/suffix kept around the completion point.
    pub context_lines: usize,
    pub tokenizer: TokenizerKind,
    /// Seed for random example selection; unseeded when absent.
    pub seed: Option<u64>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            extra_sentinel_tokens: Vec::new(),
            context_lines: DEFAULT_CONTEXT_LINES,
            tokenizer: TokenizerKind::default(),
            seed: None,
        }
    }
}

impl EvalConfig {
    /// Load defaults, then the config file (explicit path or `FIMEVAL_CONFIG`),
    /// then environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = dotenvy::var(CONFIG_ENV).ok().map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| dotenvy::var(key).ok())?;
        debug!(
            component = "config",
            context_lines = config.context_lines,
            tokenizer = ?config.tokenizer,
            seed = ?config.seed,
            extra_sentinels = config.extra_sentinel_tokens.len(),
            "Resolved configuration"
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `FIMEVAL_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(CONTEXT_LINES_ENV) {
            self.context_lines = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: CONTEXT_LINES_ENV,
                    value,
                })?;
        }
        if let Some(value) = lookup(TOKENIZER_ENV) {
            self.tokenizer =
                TokenizerKind::parse(&value).ok_or(ConfigError::InvalidValue {
                    key: TOKENIZER_ENV,
                    value,
                })?;
        }
        if let Some(value) = lookup(SEED_ENV) {
            self.seed = Some(value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: SEED_ENV,
                value,
            })?);
        }
        Ok(())
    }

    /// Stripper for the fixed sentinels plus any configured extras.
    pub fn stripper(&self) -> SentinelStripper {
        SentinelStripper::new(
            DEFAULT_SENTINELS
                .iter()
                .map(|t| t.to_string())
                .chain(self.extra_sentinel_tokens.iter().cloned()),
        )
    }
}
