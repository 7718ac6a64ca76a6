//! Shared types for the expectation engine.
//!
//! These types flow between the expectation set, the reconciler and the
//! reporter. Records and verdicts are plain data and serialize to JSON.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::path::relative_to;

/// Contents carried by an observed file.
pub enum FileContents {
    /// No contents were attached (directories, existence-only producers).
    Null,

    /// Contents already buffered in memory.
    Buffer(Vec<u8>),

    /// Contents that must be read before they can be inspected.
    Stream(Box<dyn Read + Send>),
}

impl FileContents {
    pub fn is_null(&self) -> bool {
        matches!(self, FileContents::Null)
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, FileContents::Stream(_))
    }
}

impl fmt::Debug for FileContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileContents::Null => write!(f, "Null"),
            FileContents::Buffer(bytes) => write!(f, "Buffer({} bytes)", bytes.len()),
            FileContents::Stream(_) => write!(f, "Stream(..)"),
        }
    }
}

/// A file observed in the pipeline.
///
/// `base` is the directory the pipeline considers the project root; the
/// expectation key is the path relative to it.
#[derive(Debug)]
pub struct ObservedFile {
    pub path: PathBuf,
    pub base: Option<PathBuf>,
    pub contents: FileContents,
}

impl ObservedFile {
    /// A file with no contents attached.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            base: None,
            contents: FileContents::Null,
        }
    }

    /// A file with buffered contents.
    pub fn with_bytes(path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            base: None,
            contents: FileContents::Buffer(bytes.into()),
        }
    }

    /// A file whose contents are read lazily.
    pub fn with_reader(path: impl Into<PathBuf>, reader: impl Read + Send + 'static) -> Self {
        Self {
            path: path.into(),
            base: None,
            contents: FileContents::Stream(Box::new(reader)),
        }
    }

    /// Set the base directory stripped from `path` when normalizing.
    pub fn in_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// The normalized, base-relative path used as the expectation key.
    pub fn relative_path(&self) -> String {
        relative_to(&self.path, self.base.as_deref())
    }

    /// Buffer the contents in place and return them.
    ///
    /// A stream is drained fully and replaced by a `Buffer` holding the same
    /// bytes. If reading fails part way, whatever was read stays buffered.
    pub fn buffer_contents(&mut self) -> io::Result<Option<&[u8]>> {
        if let FileContents::Stream(reader) = &mut self.contents {
            let mut bytes = Vec::new();
            let result = reader.read_to_end(&mut bytes);
            self.contents = FileContents::Buffer(bytes);
            result?;
        }

        match &self.contents {
            FileContents::Buffer(bytes) => Ok(Some(bytes.as_slice())),
            _ => Ok(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Content made available to a matcher for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe<'a> {
    /// The file carries no contents (or none were probed).
    Absent,

    /// Decoded text contents.
    Text(&'a str),

    /// Contents could not be read or decoded.
    Unreadable(&'a str),
}

/// How a single record came out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Expected file, content (if checked) matched.
    Matched,

    /// File not in the set, with unexpected files not reported.
    Ignored,

    /// File not in the set.
    Unexpected,

    /// Expected file whose content did not match.
    ContentMismatch { reason: String },

    /// Expected file whose content could not be read.
    Unreadable { reason: String },

    /// Expectation never satisfied by end of stream.
    Missing,
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Matched | Outcome::Ignored)
    }
}

/// One reconciliation outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchRecord {
    /// Normalized path of the file or expectation
    pub path: String,

    /// Whether the path was in the expectation set
    pub expected: bool,

    /// Whether the content matcher passed, if one ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_matched: Option<bool>,

    /// Final outcome
    pub outcome: Outcome,
}

impl MatchRecord {
    pub fn matched(path: impl Into<String>, content_matched: Option<bool>) -> Self {
        Self {
            path: path.into(),
            expected: true,
            content_matched,
            outcome: Outcome::Matched,
        }
    }

    pub fn unexpected(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expected: false,
            content_matched: None,
            outcome: Outcome::Unexpected,
        }
    }

    pub fn mismatch(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expected: true,
            content_matched: Some(false),
            outcome: Outcome::ContentMismatch {
                reason: reason.into(),
            },
        }
    }

    pub fn unreadable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expected: true,
            content_matched: Some(false),
            outcome: Outcome::Unreadable {
                reason: reason.into(),
            },
        }
    }

    pub fn missing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expected: true,
            content_matched: None,
            outcome: Outcome::Missing,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome.is_pass()
    }

    /// Human-readable reason for a failing record.
    pub fn reason(&self) -> Option<String> {
        match &self.outcome {
            Outcome::Matched | Outcome::Ignored => None,
            Outcome::Unexpected => Some("unexpected".to_string()),
            Outcome::Missing => Some("missing".to_string()),
            Outcome::ContentMismatch { reason } => Some(reason.clone()),
            Outcome::Unreadable { reason } => Some(format!("unreadable: {}", reason)),
        }
    }
}

/// Aggregate pass/fail determination for one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verdict {
    /// Overall pass
    pub passed: bool,

    /// Number of failing records
    pub failed: usize,

    /// Expectations never satisfied, in declaration order
    pub missing: Vec<String>,

    /// Total records considered
    pub total: usize,
}

impl Verdict {
    /// Compute the verdict from a finished record list.
    pub fn from_records(records: &[MatchRecord]) -> Self {
        let failed = records.iter().filter(|r| !r.passed()).count();
        let missing = records
            .iter()
            .filter(|r| r.outcome == Outcome::Missing)
            .map(|r| r.path.clone())
            .collect();

        Self {
            passed: failed == 0,
            failed,
            missing,
            total: records.len(),
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub verdict: Verdict,
    pub records: Vec<MatchRecord>,
    pub evaluated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_buffer_contents_drains_stream() {
        let mut file = ObservedFile::with_reader("/test/a.txt", Cursor::new(b"abc".to_vec()));
        assert!(file.contents.is_stream());

        let bytes = file.buffer_contents().unwrap().map(|b| b.to_vec());
        assert_eq!(bytes, Some(b"abc".to_vec()));
        assert!(matches!(file.contents, FileContents::Buffer(_)));
    }

    #[test]
    fn test_buffer_contents_null() {
        let mut file = ObservedFile::new("a.txt");
        assert_eq!(file.buffer_contents().unwrap(), None);
        assert!(file.contents.is_null());
    }

    #[test]
    fn test_relative_path_strips_base() {
        let file = ObservedFile::new("/test/dist/app.js").in_base("/test/");
        assert_eq!(file.relative_path(), "dist/app.js");
    }

    #[test]
    fn test_record_reasons() {
        assert_eq!(MatchRecord::unexpected("a").reason().as_deref(), Some("unexpected"));
        assert_eq!(MatchRecord::missing("a").reason().as_deref(), Some("missing"));
        assert_eq!(
            MatchRecord::unreadable("a", "invalid UTF-8").reason().as_deref(),
            Some("unreadable: invalid UTF-8")
        );
        assert_eq!(MatchRecord::matched("a", None).reason(), None);
    }

    #[test]
    fn test_verdict_from_records() {
        let records = vec![
            MatchRecord::matched("a.txt", None),
            MatchRecord::unexpected("b.txt"),
            MatchRecord::missing("c.txt"),
        ];
        let verdict = Verdict::from_records(&records);
        assert!(!verdict.passed);
        assert_eq!(verdict.failed, 2);
        assert_eq!(verdict.missing, vec!["c.txt".to_string()]);
        assert_eq!(verdict.total, 3);
    }

    #[test]
    fn test_outcome_serializes_with_kind_tag() {
        let record = MatchRecord::mismatch("a.txt", "not containing \"x\"");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["outcome"]["kind"], "content_mismatch");
        assert_eq!(json["content_matched"], false);
    }
}
