//! Shared fixtures for the CLI integration tests.

use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;

/// Environment variables that would leak host configuration into a test run.
pub const ISOLATED_ENV: [&str; 6] = [
    "FIMEVAL_CONFIG",
    "FIMEVAL_CONTEXT_LINES",
    "FIMEVAL_TOKENIZER",
    "FIMEVAL_SEED",
    "FIMEVAL_LOG",
    "RUST_LOG",
];

/// `fimeval` with a clean environment.
#[allow(dead_code)]
pub fn fimeval() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("fimeval"));
    for key in ISOLATED_ENV {
        cmd.env_remove(key);
    }
    cmd
}

/// Builder for one evaluation record.
#[derive(Debug, Clone)]
pub struct RecordFixture {
    pub prefix: String,
    pub suffix: String,
    pub expected: String,
    pub generated: String,
}

#[allow(dead_code)]
impl RecordFixture {
    pub fn new(prefix: &str, expected: &str, generated: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            suffix: "    }\n    total\n}\n".to_string(),
            expected: expected.to_string(),
            generated: generated.to_string(),
        }
    }

    pub fn suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    pub fn to_line(&self) -> String {
        json!({
            "prefix": self.prefix,
            "suffix": self.suffix,
            "expected": self.expected,
            "generated": self.generated,
        })
        .to_string()
    }
}

/// Temporary directory holding JSONL record stores.
pub struct StoreDir {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl StoreDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `records` as a JSONL store and return its path.
    pub fn write_store(&self, name: &str, records: &[RecordFixture]) -> PathBuf {
        let body: String = records.iter().map(|r| r.to_line() + "\n").collect();
        self.write_raw(name, &body)
    }

    pub fn write_raw(&self, name: &str, body: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, body).expect("write fixture");
        path
    }
}

/// Two stores over the same examples in different order.
///
/// Baseline order: sum, count, mean. Post-finetune order: mean, sum, count.
#[allow(dead_code)]
pub fn paired_stores(dir: &StoreDir) -> (PathBuf, PathBuf) {
    let sum = "fn sum(items: &[i64]) -> i64 {\n    let mut total = 0;\n    for item in items {\n";
    let count = "fn count(items: &[i64]) -> usize {\n    let mut n = 0;\n    for _ in items {\n";
    let mean = "fn mean(items: &[f64]) -> f64 {\n    let mut acc = 0.0;\n    for item in items {\n";

    let baseline = dir.write_store(
        "baseline.jsonl",
        &[
            RecordFixture::new(sum, "        total += item;", "        total -= item;<|fim_pad|>"),
            RecordFixture::new(count, "        n += 1;", "        n += 1;<|file_sep|>"),
            RecordFixture::new(mean, "        acc += item;", "        acc = item;"),
        ],
    );
    let post_finetune = dir.write_store(
        "post_finetune.jsonl",
        &[
            RecordFixture::new(mean, "        acc += item;", "        acc += item;"),
            RecordFixture::new(sum, "        total += item;", "<|file_sep|>        total += item;"),
            RecordFixture::new(count, "        n += 1;", "        n += 1;"),
        ],
    );
    (baseline, post_finetune)
}
