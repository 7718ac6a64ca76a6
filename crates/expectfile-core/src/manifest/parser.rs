//! Manifest parsing from YAML/JSON.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::schema::validate_manifest_schema;
use crate::config::ExpectConfig;
use crate::expectation::{ExpectationError, ExpectationSet};
use crate::matcher::ContentMatcher;

/// Errors that can occur when loading manifests.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Manifest validation failed: {}", .0.join("; "))]
    SchemaError(Vec<String>),

    #[error("Invalid expectation: {0}")]
    Expectation(#[from] ExpectationError),
}

/// A content matcher as written in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatcherSpec {
    /// Substring, or `/body/flags` pattern literal
    Literal(String),

    /// Explicit substring
    Contains { contains: String },

    /// Explicit pattern with optional flags
    Pattern {
        pattern: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        flags: String,
    },
}

impl MatcherSpec {
    /// Compile into a content matcher.
    pub fn compile(&self) -> Result<ContentMatcher, ExpectationError> {
        match self {
            MatcherSpec::Literal(literal) => ContentMatcher::parse(literal),
            MatcherSpec::Contains { contains } => Ok(ContentMatcher::contains(contains.as_str())),
            MatcherSpec::Pattern { pattern, flags } => {
                ContentMatcher::pattern_with_flags(pattern, flags)
            }
        }
    }
}

/// Path to matcher entries in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatcherMap(pub Vec<(String, Option<MatcherSpec>)>);

impl<'de> Deserialize<'de> for MatcherMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = MatcherMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of expected paths to content matchers")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((path, matcher)) = map.next_entry::<String, Option<MatcherSpec>>()? {
                    entries.push((path, matcher));
                }
                Ok(MatcherMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

impl Serialize for MatcherMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (path, matcher) in &self.0 {
            map.serialize_entry(path, matcher)?;
        }
        map.end()
    }
}

/// The `expect` section: a list of paths or a map of path to matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpectSpec {
    Paths(Vec<String>),
    Matchers(MatcherMap),
}

/// An expectation manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Run options
    #[serde(default)]
    pub options: ExpectConfig,

    /// Expected files
    pub expect: ExpectSpec,
}

impl Manifest {
    /// Validate a JSON value against the schema and deserialize it.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ManifestError> {
        validate_manifest_schema(&value).map_err(ManifestError::SchemaError)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Parse a manifest from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ManifestError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a manifest from JSON string.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a manifest from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a manifest from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a manifest file, choosing the format by extension (`.json` is
    /// JSON, anything else YAML).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_file(path)
        } else {
            Self::from_yaml_file(path)
        }
    }

    /// Declared paths in order.
    pub fn paths(&self) -> Vec<&str> {
        match &self.expect {
            ExpectSpec::Paths(paths) => paths.iter().map(String::as_str).collect(),
            ExpectSpec::Matchers(map) => map.0.iter().map(|(p, _)| p.as_str()).collect(),
        }
    }

    /// Build the expectation set, compiling every matcher.
    pub fn expectations(&self) -> Result<ExpectationSet, ManifestError> {
        let set = match &self.expect {
            ExpectSpec::Paths(paths) => ExpectationSet::from_paths(paths)?,
            ExpectSpec::Matchers(map) => {
                let entries = map
                    .0
                    .iter()
                    .map(|(path, spec)| {
                        let matcher = spec.as_ref().map(MatcherSpec::compile).transpose()?;
                        Ok((path.as_str(), matcher))
                    })
                    .collect::<Result<Vec<_>, ExpectationError>>()?;
                ExpectationSet::from_matchers(entries)?
            }
        };
        Ok(set)
    }
}
