//! Reporter: turns a finished record list into report lines.
//!
//! Line formats:
//! - `FAIL: <path> <reason>` for every failing record
//! - `PASS: <path>` for every matched record, verbose only
//! - exactly one summary: `PASS` or `FAIL: <n> failed expectations`
//!
//! The reporter builds strings and hands them to the injected logger; it
//! performs no I/O itself.

use std::sync::Arc;

use crate::logger::{LineLogger, Severity};
use crate::types::{MatchRecord, Outcome, Verdict};

/// A rendered report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub severity: Severity,
    pub text: String,
}

impl ReportLine {
    fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    fn failure(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Failure,
            text: text.into(),
        }
    }
}

/// Emits report lines for a finished run.
pub struct Reporter {
    logger: Arc<dyn LineLogger>,
    verbose: bool,
    silent: bool,
}

impl Reporter {
    pub fn new(logger: Arc<dyn LineLogger>) -> Self {
        Self {
            logger,
            verbose: false,
            silent: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Build the report lines without emitting them.
    pub fn render(&self, records: &[MatchRecord], verdict: &Verdict) -> Vec<ReportLine> {
        let mut lines: Vec<ReportLine> = records
            .iter()
            .filter_map(|record| self.render_record(record))
            .collect();

        lines.push(summary_line(verdict));
        lines
    }

    fn render_record(&self, record: &MatchRecord) -> Option<ReportLine> {
        match (&record.outcome, record.reason()) {
            (Outcome::Matched, _) if self.verbose => {
                Some(ReportLine::info(format!("PASS: {}", record.path)))
            }
            (_, Some(reason)) => Some(ReportLine::failure(format!(
                "FAIL: {} {}",
                record.path, reason
            ))),
            _ => None,
        }
    }

    /// Render and hand every line to the logger, unless silent.
    pub fn report(&self, records: &[MatchRecord], verdict: &Verdict) {
        if self.silent {
            return;
        }

        for line in self.render(records, verdict) {
            self.logger.line(line.severity, &line.text);
        }
    }
}

fn summary_line(verdict: &Verdict) -> ReportLine {
    if verdict.passed {
        ReportLine::info("PASS")
    } else {
        ReportLine::failure(format!("FAIL: {} failed expectations", verdict.failed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MockLogger;

    fn records() -> Vec<MatchRecord> {
        vec![
            MatchRecord::matched("foo.txt", None),
            MatchRecord::unexpected("bar.txt"),
            MatchRecord::mismatch("hello.txt", "not containing \"world\""),
            MatchRecord::missing("baz.txt"),
        ]
    }

    #[test]
    fn test_default_report_lists_failures_and_summary() {
        let logger = MockLogger::new();
        let records = records();
        let verdict = Verdict::from_records(&records);

        Reporter::new(Arc::new(logger.clone())).report(&records, &verdict);

        assert_eq!(
            logger.messages(),
            vec![
                "FAIL: bar.txt unexpected",
                "FAIL: hello.txt not containing \"world\"",
                "FAIL: baz.txt missing",
                "FAIL: 3 failed expectations",
            ]
        );
        assert_eq!(logger.messages_at(Severity::Info).len(), 0);
    }

    #[test]
    fn test_verbose_includes_pass_lines() {
        let logger = MockLogger::new();
        let records = vec![
            MatchRecord::matched("a.txt", None),
            MatchRecord::matched("b.txt", Some(true)),
        ];
        let verdict = Verdict::from_records(&records);

        Reporter::new(Arc::new(logger.clone()))
            .verbose(true)
            .report(&records, &verdict);

        assert_eq!(logger.messages(), vec!["PASS: a.txt", "PASS: b.txt", "PASS"]);
    }

    #[test]
    fn test_ignored_records_never_reported() {
        let mut ignored = MatchRecord::unexpected("x.txt");
        ignored.outcome = Outcome::Ignored;
        let records = vec![ignored];
        let verdict = Verdict::from_records(&records);

        let reporter = Reporter::new(Arc::new(MockLogger::new())).verbose(true);
        let lines = reporter.render(&records, &verdict);
        assert_eq!(lines, vec![ReportLine::info("PASS")]);
    }

    #[test]
    fn test_silent_emits_nothing() {
        let logger = MockLogger::new();
        let records = records();
        let verdict = Verdict::from_records(&records);

        Reporter::new(Arc::new(logger.clone()))
            .silent(true)
            .verbose(true)
            .report(&records, &verdict);

        assert_eq!(logger.count(), 0);
    }
}
