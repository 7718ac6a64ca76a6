//! Content matchers.
//!
//! A matcher is chosen once, when the expectation is declared:
//! - **Contains**: case-sensitive substring containment
//! - **Pattern**: regular expression search, flags as supplied
//! - **Predicate**: caller-supplied function, may describe its own failure
//!
//! Manifest strings use the literal form `/body/flags` for patterns; any
//! other string is a substring.

use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use crate::expectation::ExpectationError;

lazy_static! {
    /// `/body/flags` regex literal
    static ref REGEX_LITERAL: Regex = Regex::new(r"^/(.+)/([imsx]*)$").unwrap();
}

/// Predicate signature. `Err` carries a description that replaces the
/// generic mismatch message.
pub type PredicateFn = dyn Fn(&str) -> Result<bool, String> + Send + Sync;

/// Result of checking content against a matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched,
    Mismatch(String),
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched)
    }
}

/// A content matcher attached to an expectation.
#[derive(Clone)]
pub enum ContentMatcher {
    Contains(String),
    Pattern(Regex),
    Predicate(Arc<PredicateFn>),
}

impl ContentMatcher {
    pub fn contains(needle: impl Into<String>) -> Self {
        ContentMatcher::Contains(needle.into())
    }

    /// Compile a pattern with inline flags (e.g. `(?i)`) only.
    pub fn pattern(pattern: &str) -> Result<Self, ExpectationError> {
        Self::pattern_with_flags(pattern, "")
    }

    /// Compile a pattern with `i`, `m`, `s` and `x` flags.
    pub fn pattern_with_flags(pattern: &str, flags: &str) -> Result<Self, ExpectationError> {
        let mut builder = RegexBuilder::new(pattern);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                other => {
                    return Err(ExpectationError::InvalidFlag {
                        pattern: pattern.to_string(),
                        flag: other,
                    })
                }
            };
        }

        builder
            .build()
            .map(ContentMatcher::Pattern)
            .map_err(|source| ExpectationError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<bool, String> + Send + Sync + 'static,
    {
        ContentMatcher::Predicate(Arc::new(f))
    }

    /// Parse a manifest string: `/body/flags` is a pattern, anything else a
    /// substring.
    pub fn parse(spec: &str) -> Result<Self, ExpectationError> {
        match REGEX_LITERAL.captures(spec) {
            Some(caps) => Self::pattern_with_flags(&caps[1], &caps[2]),
            None => Ok(Self::contains(spec)),
        }
    }

    /// Check `content`, returning the mismatch reason on failure.
    pub fn check(&self, content: &str) -> MatchOutcome {
        match self {
            ContentMatcher::Contains(needle) => {
                if content.contains(needle.as_str()) {
                    MatchOutcome::Matched
                } else {
                    MatchOutcome::Mismatch(format!("not containing {:?}", needle))
                }
            }
            ContentMatcher::Pattern(regex) => {
                if regex.is_match(content) {
                    MatchOutcome::Matched
                } else {
                    MatchOutcome::Mismatch(format!("not matching /{}/", regex.as_str()))
                }
            }
            ContentMatcher::Predicate(f) => match f(content) {
                Ok(true) => MatchOutcome::Matched,
                Ok(false) => MatchOutcome::Mismatch("not satisfying predicate".to_string()),
                Err(description) => MatchOutcome::Mismatch(description),
            },
        }
    }

    pub fn matches(&self, content: &str) -> bool {
        self.check(content).is_match()
    }
}

impl fmt::Debug for ContentMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentMatcher::Contains(needle) => f.debug_tuple("Contains").field(needle).finish(),
            ContentMatcher::Pattern(regex) => {
                f.debug_tuple("Pattern").field(&regex.as_str()).finish()
            }
            ContentMatcher::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

impl From<Regex> for ContentMatcher {
    fn from(regex: Regex) -> Self {
        ContentMatcher::Pattern(regex)
    }
}

impl From<&str> for ContentMatcher {
    fn from(needle: &str) -> Self {
        ContentMatcher::contains(needle)
    }
}

impl From<String> for ContentMatcher {
    fn from(needle: String) -> Self {
        ContentMatcher::Contains(needle)
    }
}
