//! Reconciliation engine.
//!
//! The `Reconciler` is a pass-through pipeline stage:
//!
//! ```text
//! INIT --process()--> RUNNING --finalize()--> FINALIZED
//! ```
//!
//! Files are reconciled synchronously in arrival order and handed back
//! unchanged. `finalize()` is the single end-of-input entry point: it appends
//! missing records, computes the verdict, runs the reporter and, with
//! `error_on_failure`, converts a failing verdict into an error.

use std::error::Error as StdError;
use std::mem;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::config::ExpectConfig;
use crate::expectation::ExpectationSet;
use crate::logger::LineLogger;
use crate::probe::ExistenceProbe;
use crate::reporter::Reporter;
use crate::types::{MatchRecord, ObservedFile, Outcome, Probe, RunReport, Verdict};

/// Errors surfaced by the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Raised at end of stream when `error_on_failure` is set.
    #[error("Failed {count} expectations")]
    Failed { count: usize },

    /// An upstream producer error, passed through unchanged.
    #[error(transparent)]
    Upstream(Box<dyn StdError + Send + Sync>),

    #[error("Reconciler already finalized")]
    Finalized,
}

impl EngineError {
    pub fn upstream(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        EngineError::Upstream(err.into())
    }
}

/// Lifecycle state of a reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Init,
    Running,
    Finalized,
}

/// How expected paths are checked.
pub enum CheckMode {
    /// Reconcile the files flowing through the stage.
    Stream,

    /// Probe the filesystem under `root` for each expected path.
    RealFiles {
        root: PathBuf,
        probe: Box<dyn ExistenceProbe>,
    },
}

/// Reconciles observed files against an expectation set.
pub struct Reconciler {
    set: ExpectationSet,
    config: ExpectConfig,
    reporter: Reporter,
    mode: CheckMode,
    records: Vec<MatchRecord>,
    state: EngineState,
}

impl Reconciler {
    /// A reconciler over the stream of observed files.
    pub fn new(set: ExpectationSet, config: ExpectConfig, logger: Arc<dyn LineLogger>) -> Self {
        let reporter = Reporter::new(logger)
            .verbose(config.verbose)
            .silent(config.silent);

        Self {
            set,
            config,
            reporter,
            mode: CheckMode::Stream,
            records: Vec::new(),
            state: EngineState::Init,
        }
    }

    /// A reconciler that checks expected paths on the filesystem under
    /// `root`. Stream files pass through untouched.
    pub fn real_files(
        set: ExpectationSet,
        config: ExpectConfig,
        logger: Arc<dyn LineLogger>,
        root: impl Into<PathBuf>,
        probe: impl ExistenceProbe + 'static,
    ) -> Self {
        let mut reconciler = Self::new(set, config, logger);
        reconciler.mode = CheckMode::RealFiles {
            root: root.into(),
            probe: Box::new(probe),
        };
        reconciler
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &ExpectConfig {
        &self.config
    }

    pub fn expectations(&self) -> &ExpectationSet {
        &self.set
    }

    /// Records accumulated so far, in arrival order.
    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    fn begin(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Finalized => Err(EngineError::Finalized),
            _ => {
                self.state = EngineState::Running;
                Ok(())
            }
        }
    }

    fn is_real_files(&self) -> bool {
        matches!(self.mode, CheckMode::RealFiles { .. })
    }

    /// Whether reconciling `path` requires its contents.
    pub fn needs_content(&self, path: &str) -> bool {
        !self.is_real_files() && self.set.needs_content(path)
    }

    /// Record the outcome for one path whose contents (if needed) have
    /// already been probed.
    pub fn observe(&mut self, path: &str, content: Probe<'_>) -> Result<(), EngineError> {
        self.begin()?;
        if self.is_real_files() {
            return Ok(());
        }

        let mut record = self.set.consume(path, content);
        if record.outcome == Outcome::Unexpected && !self.config.report_unexpected {
            record.outcome = Outcome::Ignored;
        }

        tracing::debug!(path = %record.path, outcome = ?record.outcome, "Reconciled file");
        self.records.push(record);
        Ok(())
    }

    /// Reconcile one file and hand it back.
    ///
    /// A streamed file is drained only when its path declares a content
    /// matcher; the drained bytes replace the stream.
    pub fn process(&mut self, mut file: ObservedFile) -> Result<ObservedFile, EngineError> {
        self.begin()?;
        let path = file.relative_path();

        if !self.needs_content(&path) {
            self.observe(&path, Probe::Absent)?;
            return Ok(file);
        }

        match file.buffer_contents() {
            Ok(Some(bytes)) => match std::str::from_utf8(bytes) {
                Ok(text) => self.observe(&path, Probe::Text(text))?,
                Err(err) => {
                    let reason = format!("invalid UTF-8: {}", err);
                    tracing::warn!(path = %path, error = %err, "Content is not valid UTF-8");
                    self.observe(&path, Probe::Unreadable(&reason))?
                }
            },
            Ok(None) => self.observe(&path, Probe::Absent)?,
            Err(err) => {
                let reason = format!("read failed: {}", err);
                tracing::warn!(path = %path, error = %err, "Failed to read file contents");
                self.observe(&path, Probe::Unreadable(&reason))?
            }
        }

        Ok(file)
    }

    fn probe_real_files(&mut self) {
        let CheckMode::RealFiles { root, probe } = &self.mode else {
            return;
        };

        let found: Vec<String> = self
            .set
            .iter()
            .filter(|e| {
                probe.exists(root, e.path()) || (e.is_glob() && probe.any_match(root, e.path()))
            })
            .map(|e| e.path().to_string())
            .collect();

        for path in found {
            self.set.mark_satisfied(&path);
            self.records.push(MatchRecord::matched(path, None));
        }
    }

    /// End of input: check missing expectations, report, and decide.
    pub fn finalize(&mut self) -> Result<RunReport, EngineError> {
        self.begin()?;
        self.probe_real_files();

        if self.config.report_missing {
            for path in self.set.missing() {
                self.records.push(MatchRecord::missing(path));
            }
        }

        self.state = EngineState::Finalized;

        let records = mem::take(&mut self.records);
        let verdict = Verdict::from_records(&records);
        self.reporter.report(&records, &verdict);

        tracing::info!(
            passed = verdict.passed,
            failed = verdict.failed,
            missing = verdict.missing.len(),
            total = verdict.total,
            "Reconciliation finished"
        );

        if self.config.error_on_failure && !verdict.passed {
            return Err(EngineError::Failed {
                count: verdict.failed,
            });
        }

        Ok(RunReport {
            verdict,
            records,
            evaluated_at: Utc::now(),
        })
    }
}

/// Drive a reconciler over an upstream sequence of files.
///
/// Every file is forwarded to `downstream` after reconciliation. An upstream
/// error ends the run immediately and is returned unchanged, without
/// finalization.
pub fn run_stage<I, E, F>(
    mut reconciler: Reconciler,
    upstream: I,
    mut downstream: F,
) -> Result<RunReport, EngineError>
where
    I: IntoIterator<Item = Result<ObservedFile, E>>,
    E: Into<Box<dyn StdError + Send + Sync>>,
    F: FnMut(ObservedFile),
{
    for item in upstream {
        let file = item.map_err(EngineError::upstream)?;
        downstream(reconciler.process(file)?);
    }

    reconciler.finalize()
}
