//! Run options.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Policy toggles for one reconciliation run.
///
/// Keys are snake_case; the camelCase spellings (`reportUnexpected`, ...) are
/// accepted as aliases. Checking the real filesystem is a reconciler mode,
/// not an option: see [`Reconciler::real_files`](crate::Reconciler::real_files).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectConfig {
    /// Files outside the set produce a failing record
    #[serde(default = "default_true", alias = "reportUnexpected")]
    pub report_unexpected: bool,

    /// Unsatisfied expectations produce failing records at end of stream
    #[serde(default = "default_true", alias = "reportMissing")]
    pub report_missing: bool,

    /// Any failure turns end of stream into an error
    #[serde(default, alias = "errorOnFailure")]
    pub error_on_failure: bool,

    /// Suppress all report output
    #[serde(default)]
    pub silent: bool,

    /// Report passing records too
    #[serde(default)]
    pub verbose: bool,
}

impl Default for ExpectConfig {
    fn default() -> Self {
        Self {
            report_unexpected: true,
            report_missing: true,
            error_on_failure: false,
            silent: false,
            verbose: false,
        }
    }
}

impl ExpectConfig {
    pub fn report_unexpected(mut self, enabled: bool) -> Self {
        self.report_unexpected = enabled;
        self
    }

    pub fn report_missing(mut self, enabled: bool) -> Self {
        self.report_missing = enabled;
        self
    }

    pub fn error_on_failure(mut self, enabled: bool) -> Self {
        self.error_on_failure = enabled;
        self
    }

    pub fn silent(mut self, enabled: bool) -> Self {
        self.silent = enabled;
        self
    }

    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExpectConfig::default();
        assert!(config.report_unexpected);
        assert!(config.report_missing);
        assert!(!config.error_on_failure);
        assert!(!config.silent);
        assert!(!config.verbose);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: ExpectConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ExpectConfig::default());
    }

    #[test]
    fn test_camel_case_aliases() {
        let config: ExpectConfig = serde_json::from_str(
            r#"{"reportUnexpected": false, "errorOnFailure": true, "verbose": true}"#,
        )
        .unwrap();
        assert!(!config.report_unexpected);
        assert!(config.error_on_failure);
        assert!(config.verbose);
        assert!(config.report_missing);
    }

    #[test]
    fn test_unknown_option_rejected() {
        let result: Result<ExpectConfig, _> = serde_json::from_str(r#"{"loud": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_real_file_mode_is_not_an_option() {
        for key in ["checkRealFiles", "check_real_files"] {
            let json = format!(r#"{{"{}": true}}"#, key);
            let result: Result<ExpectConfig, _> = serde_json::from_str(&json);
            assert!(result.is_err(), "{} should be rejected", key);
        }
    }
}
