//! The expectation set.
//!
//! An ordered registry of expected paths, each with an optional content
//! matcher. Identity is fixed at construction; satisfaction is tracked by
//! index so the declarations themselves are never mutated.
//!
//! A path containing `*`, `?` or `[` is a glob expectation and is satisfied
//! by any observed path it matches, including a file literally named like
//! the glob. Exact paths take precedence over globs; among globs the first
//! declared wins.

use std::collections::HashMap;

use glob::{MatchOptions, Pattern};
use thiserror::Error;

use crate::matcher::{ContentMatcher, MatchOutcome};
use crate::path::normalize_path;
use crate::types::{MatchRecord, Probe};

/// Errors raised while declaring expectations.
#[derive(Error, Debug)]
pub enum ExpectationError {
    #[error("Duplicate expected path: {0}")]
    DuplicatePath(String),

    #[error("Expected path is empty")]
    EmptyPath,

    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid flag '{flag}' for pattern {pattern:?}")]
    InvalidFlag { pattern: String, flag: char },

    #[error("Invalid glob {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A single declared expectation.
#[derive(Debug, Clone)]
pub struct Expectation {
    path: String,
    matcher: Option<ContentMatcher>,
    glob: Option<Pattern>,
}

impl Expectation {
    fn new(path: &str, matcher: Option<ContentMatcher>) -> Result<Self, ExpectationError> {
        let path = normalize_path(path);
        if path.is_empty() {
            return Err(ExpectationError::EmptyPath);
        }

        let glob = if is_glob(&path) {
            let pattern = Pattern::new(&path).map_err(|source| ExpectationError::InvalidGlob {
                pattern: path.clone(),
                source,
            })?;
            Some(pattern)
        } else {
            None
        };

        Ok(Self {
            path,
            matcher,
            glob,
        })
    }

    /// The normalized expected path (or glob).
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn matcher(&self) -> Option<&ContentMatcher> {
        self.matcher.as_ref()
    }

    pub fn is_glob(&self) -> bool {
        self.glob.is_some()
    }

    /// Whether an observed normalized path is covered by this expectation.
    ///
    /// A glob expectation also covers a file literally named like it.
    pub fn covers(&self, path: &str) -> bool {
        self.path == path
            || self
                .glob
                .as_ref()
                .is_some_and(|pattern| pattern.matches_with(path, GLOB_OPTIONS))
    }
}

fn is_glob(path: &str) -> bool {
    path.contains(['*', '?', '['])
}

/// Ordered set of expectations with per-entry satisfaction state.
#[derive(Debug, Clone, Default)]
pub struct ExpectationSet {
    entries: Vec<Expectation>,
    index: HashMap<String, usize>,
    globs: Vec<usize>,
    satisfied: Vec<bool>,
}

impl ExpectationSet {
    /// An empty set: no file may pass through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Existence-only expectations, in the given order.
    pub fn from_paths<I, S>(paths: I) -> Result<Self, ExpectationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for path in paths {
            set.insert(path.as_ref(), None)?;
        }
        Ok(set)
    }

    /// Expectations with optional content matchers, in the given order.
    pub fn from_matchers<I, S>(entries: I) -> Result<Self, ExpectationError>
    where
        I: IntoIterator<Item = (S, Option<ContentMatcher>)>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for (path, matcher) in entries {
            set.insert(path.as_ref(), matcher)?;
        }
        Ok(set)
    }

    /// Declare one more expectation.
    pub fn insert(
        &mut self,
        path: &str,
        matcher: Option<ContentMatcher>,
    ) -> Result<(), ExpectationError> {
        let expectation = Expectation::new(path, matcher)?;
        if self.index.contains_key(expectation.path()) {
            return Err(ExpectationError::DuplicatePath(expectation.path.clone()));
        }

        let position = self.entries.len();
        self.index.insert(expectation.path.clone(), position);
        if expectation.is_glob() {
            self.globs.push(position);
        }
        self.entries.push(expectation);
        self.satisfied.push(false);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expectations in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Expectation> {
        self.entries.iter()
    }

    fn position(&self, path: &str) -> Option<usize> {
        let path = normalize_path(path);
        if let Some(&exact) = self.index.get(&path) {
            return Some(exact);
        }

        self.globs
            .iter()
            .copied()
            .find(|&i| self.entries[i].covers(&path))
    }

    /// Find the expectation covering `path`.
    pub fn lookup(&self, path: &str) -> Option<&Expectation> {
        self.position(path).map(|i| &self.entries[i])
    }

    /// Whether reconciling `path` requires its contents.
    pub fn needs_content(&self, path: &str) -> bool {
        self.lookup(path)
            .map(|e| e.matcher.is_some())
            .unwrap_or(false)
    }

    /// Reconcile one observed path.
    ///
    /// Marks the covering expectation satisfied and runs its matcher against
    /// `content`. A path with no covering expectation yields an unexpected
    /// record.
    pub fn consume(&mut self, path: &str, content: Probe<'_>) -> MatchRecord {
        let key = normalize_path(path);
        let Some(position) = self.position(&key) else {
            return MatchRecord::unexpected(key);
        };

        self.satisfied[position] = true;

        let Some(matcher) = &self.entries[position].matcher else {
            return MatchRecord::matched(key, None);
        };

        match content {
            Probe::Text(text) => match matcher.check(text) {
                MatchOutcome::Matched => MatchRecord::matched(key, Some(true)),
                MatchOutcome::Mismatch(reason) => MatchRecord::mismatch(key, reason),
            },
            Probe::Unreadable(reason) => MatchRecord::unreadable(key, reason),
            Probe::Absent => MatchRecord::unreadable(key, "no contents to check"),
        }
    }

    /// Mark the expectation declared as `path` satisfied without a content
    /// check. Returns false if no such expectation exists.
    pub fn mark_satisfied(&mut self, path: &str) -> bool {
        match self.index.get(&normalize_path(path)) {
            Some(&position) => {
                self.satisfied[position] = true;
                true
            }
            None => false,
        }
    }

    pub fn is_satisfied(&self, path: &str) -> bool {
        self.index
            .get(&normalize_path(path))
            .map(|&i| self.satisfied[i])
            .unwrap_or(false)
    }

    /// Unsatisfied expectations in declaration order.
    pub fn missing(&self) -> Vec<String> {
        self.entries
            .iter()
            .zip(&self.satisfied)
            .filter(|(_, &done)| !done)
            .map(|(e, _)| e.path.clone())
            .collect()
    }
}
