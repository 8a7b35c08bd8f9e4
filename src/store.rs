//! Record store loading.
//!
//! A record store is a JSONL file with one evaluation record per line.
//! Records keep file line order; blank lines are skipped and do not take an index.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// One fill-in-middle evaluation example with a model completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Code preceding the completion point.
    pub prefix: String,
    /// Code following the completion point.
    pub suffix: String,
    /// Ground-truth completion.
    pub expected: String,
    /// Raw model output, possibly containing sentinel tokens.
    pub generated: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read record store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid record at {path}:{line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Ordered, read-only sequence of evaluation records.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
    records: Vec<EvaluationRecord>,
    /// 1-based physical line of each record.
    line_numbers: Vec<usize>,
}

impl RecordStore {
    /// Load a store from a JSONL file.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let started = Instant::now();
        let file = File::open(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_reader(path, BufReader::new(file))?;

        info!(
            component = "store",
            operation = "load",
            path = %path.display(),
            records = store.len(),
            duration_ms = started.elapsed().as_millis(),
            "Loaded record store"
        );
        Ok(store)
    }

    /// Parse records from any buffered reader. `path` labels diagnostics only.
    ///
    /// Lines are read as raw bytes so that invalid UTF-8 surfaces as a parse
    /// error on its line rather than a read failure.
    pub fn from_reader<R: BufRead>(path: &Path, mut reader: R) -> Result<Self, StoreError> {
        let mut records = Vec::new();
        let mut line_numbers = Vec::new();
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            if read == 0 {
                break;
            }
            line_no += 1;

            let line = buf.trim_ascii();
            if line.is_empty() {
                continue;
            }
            let record: EvaluationRecord =
                serde_json::from_slice(line).map_err(|source| StoreError::Parse {
                    path: path.to_path_buf(),
                    line: line_no,
                    source,
                })?;
            records.push(record);
            line_numbers.push(line_no);
        }

        debug!(
            component = "store",
            operation = "parse",
            path = %path.display(),
            records = records.len(),
            "Parsed record lines"
        );

        Ok(Self {
            path: path.to_path_buf(),
            records,
            line_numbers,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EvaluationRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[EvaluationRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EvaluationRecord> {
        self.records.iter()
    }

    /// Physical file line the record at `index` came from.
    pub fn line_number(&self, index: usize) -> Option<usize> {
        self.line_numbers.get(index).copied()
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a EvaluationRecord;
    type IntoIter = std::slice::Iter<'a, EvaluationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(input: &str) -> Result<RecordStore, StoreError> {
        RecordStore::from_reader(Path::new("mem.jsonl"), Cursor::new(input.as_bytes()))
    }

    #[test]
    fn test_parses_records_in_file_order() {
        let input = concat!(
            r#"{"prefix":"a","suffix":"b","expected":"c","generated":"d"}"#,
            "\n",
            r#"{"prefix":"e","suffix":"f","expected":"g","generated":"h"}"#,
            "\n"
        );
        let store = parse(input).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0).unwrap().prefix, "a");
        assert_eq!(store.get(1).unwrap().generated, "h");
    }

    #[test]
    fn test_blank_lines_are_skipped_without_consuming_index() {
        let input = concat!(
            "\n",
            r#"{"prefix":"a","suffix":"","expected":"","generated":""}"#,
            "\n   \n",
            r#"{"prefix":"b","suffix":"","expected":"","generated":""}"#,
        );
        let store = parse(input).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().prefix, "b");
        assert_eq!(store.line_number(0), Some(2));
        assert_eq!(store.line_number(1), Some(4));
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let input = r#"{"prefix":"p","suffix":"s","expected":"e","generated":"g","file":"x.svelte","score":1}"#;
        let store = parse(input).unwrap();
        assert_eq!(store.get(0).unwrap().expected, "e");
    }

    #[test]
    fn test_invalid_json_reports_line() {
        let input = concat!(
            r#"{"prefix":"a","suffix":"b","expected":"c","generated":"d"}"#,
            "\n{ not json }\n"
        );
        match parse(input) {
            Err(StoreError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let input = r#"{"prefix":"a","suffix":"b","expected":"c"}"#;
        let err = parse(input).unwrap_err();
        assert!(matches!(err, StoreError::Parse { line: 1, .. }));
        assert!(err.to_string().contains("generated"));
    }

    #[test]
    fn test_wrong_field_type_is_parse_error() {
        let input = r#"{"prefix":1,"suffix":"b","expected":"c","generated":"d"}"#;
        assert!(matches!(parse(input), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn test_invalid_utf8_is_parse_error_on_its_line() {
        let mut input = br#"{"prefix":"a","suffix":"b","expected":"c","generated":"d"}"#.to_vec();
        input.extend_from_slice(b"\n{\"prefix\":\"\xff\xfe\",\"suffix\":\"\",\"expected\":\"\",\"generated\":\"\"}\n");
        let result = RecordStore::from_reader(Path::new("u.jsonl"), Cursor::new(input));
        match result {
            Err(StoreError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_crlf_line_endings_are_accepted() {
        let input = concat!(
            r#"{"prefix":"a","suffix":"b","expected":"c","generated":"d"}"#,
            "\r\n\r\n",
            r#"{"prefix":"e","suffix":"f","expected":"g","generated":"h"}"#,
            "\r\n"
        );
        let store = parse(input).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.line_number(1), Some(3));
    }

    #[test]
    fn test_missing_file_is_io_error_with_path() {
        let err = RecordStore::load(Path::new("/definitely/not/here.jsonl")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.jsonl"));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("store.jsonl");
        std::fs::write(
            &path,
            r#"{"prefix":"x","suffix":"y","expected":"z","generated":"z"}"#,
        )
        .unwrap();
        let store = RecordStore::load(&path).unwrap();
        assert_eq!(store.path(), path.as_path());
        assert_eq!(store.iter().count(), 1);
    }
}
