//! # expectfile-core
//!
//! Deterministic expectation matching for files flowing through a build
//! pipeline.
//!
//! This crate answers, for one pipeline run:
//! - Did every expected file appear?
//! - Did anything appear that was not expected?
//! - Do the contents of the expected files look right?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same expectations and files always produce the same verdict
//! 2. **Observer only**: Every file is handed back unchanged
//! 3. **Non-fatal mismatches**: Failures are recorded; only the final verdict can raise
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use expectfile_core::{
//!     ContentMatcher, ExpectConfig, ExpectationSet, ObservedFile, Reconciler, TracingLogger,
//! };
//!
//! let set = ExpectationSet::from_matchers([
//!     ("dist/app.js", Some(ContentMatcher::contains("use strict"))),
//!     ("dist/robots.txt", None),
//! ])?;
//! let mut reconciler = Reconciler::new(set, ExpectConfig::default(), Arc::new(TracingLogger));
//!
//! for file in build_outputs() {
//!     let file = reconciler.process(file)?;
//!     publish(file);
//! }
//!
//! let report = reconciler.finalize()?;
//! assert!(report.verdict.passed);
//! ```

pub mod config;
pub mod engine;
pub mod expectation;
pub mod logger;
pub mod manifest;
pub mod matcher;
pub mod path;
pub mod probe;
pub mod reporter;
pub mod types;

// Re-export main types at crate root
pub use config::ExpectConfig;
pub use engine::{run_stage, CheckMode, EngineError, EngineState, Reconciler};
pub use expectation::{Expectation, ExpectationError, ExpectationSet};
pub use logger::{LineLogger, LogEntry, MockLogger, NullLogger, Severity, TracingLogger};
pub use manifest::{ExpectSpec, Manifest, ManifestError, MatcherSpec};
pub use matcher::{ContentMatcher, MatchOutcome};
pub use path::normalize_path;
pub use probe::{ExistenceProbe, MockFilesystem, RealFilesystem};
pub use reporter::{ReportLine, Reporter};
pub use types::{
    FileContents, MatchRecord, ObservedFile, Outcome, Probe, RunReport, Verdict,
};

use std::sync::Arc;

/// Reconcile a complete, in-memory sequence of files.
///
/// Files are consumed and dropped; use [`Reconciler`] or [`run_stage`] to
/// forward them downstream.
pub fn check_files<I>(
    set: ExpectationSet,
    config: ExpectConfig,
    files: I,
    logger: Arc<dyn LineLogger>,
) -> Result<RunReport, EngineError>
where
    I: IntoIterator<Item = ObservedFile>,
{
    let mut reconciler = Reconciler::new(set, config, logger);
    for file in files {
        reconciler.process(file)?;
    }
    reconciler.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn files(names: &[&str]) -> Vec<ObservedFile> {
        names
            .iter()
            .map(|name| ObservedFile::new(format!("/test/{}", name)).in_base("/test/"))
            .collect()
    }

    #[test]
    fn test_basic_check() {
        let set = ExpectationSet::from_paths(["foo.txt", "bar.txt"]).unwrap();
        let logger = MockLogger::new();
        let report = check_files(
            set,
            ExpectConfig::default(),
            files(&["foo.txt", "bar.txt"]),
            Arc::new(logger.clone()),
        )
        .unwrap();

        assert!(report.verdict.passed);
        assert_eq!(logger.messages(), vec!["PASS"]);
    }

    #[test]
    fn test_manifest_driven_check() {
        let manifest = Manifest::from_yaml(
            r#"
options:
  errorOnFailure: true
expect:
  "hello.txt": "world"
"#,
        )
        .unwrap();

        let err = check_files(
            manifest.expectations().unwrap(),
            manifest.options,
            vec![ObservedFile::with_bytes("hello.txt", "Hello, earth!")],
            Arc::new(NullLogger),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "Failed 1 expectations");
    }

    fn run(expected: &[String], observed: &[String], config: ExpectConfig) -> Verdict {
        let set = ExpectationSet::from_paths(expected).unwrap();
        let files = observed.iter().map(|p| ObservedFile::new(p.as_str()));
        check_files(set, config, files, Arc::new(NullLogger))
            .unwrap()
            .verdict
    }

    fn name_set() -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set("[a-e]{1,2}\\.txt", 0..6)
            .prop_map(|names| names.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_verdict_is_deterministic(
            expected in name_set(),
            observed in prop::collection::vec("[a-e]{1,2}\\.txt", 0..8),
        ) {
            let first = run(&expected, &observed, ExpectConfig::default());
            let second = run(&expected, &observed, ExpectConfig::default());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_exact_coverage_passes(expected in name_set()) {
            let logger = MockLogger::new();
            let set = ExpectationSet::from_paths(&expected).unwrap();
            let observed = expected.iter().map(|p| ObservedFile::new(p.as_str()));
            let report = check_files(
                set,
                ExpectConfig::default().verbose(true),
                observed,
                Arc::new(logger.clone()),
            )
            .unwrap();

            prop_assert!(report.verdict.passed);
            prop_assert_eq!(logger.messages_at(Severity::Failure).len(), 0);
            prop_assert_eq!(
                logger.messages().iter().filter(|m| m.starts_with("PASS: ")).count(),
                expected.len()
            );
        }

        #[test]
        fn prop_disabled_checks_always_pass(
            expected in name_set(),
            observed in prop::collection::vec("[a-e]{1,2}\\.txt", 0..8),
        ) {
            let config = ExpectConfig::default()
                .report_missing(false)
                .report_unexpected(false);
            prop_assert!(run(&expected, &observed, config).passed);
        }
    }
}
