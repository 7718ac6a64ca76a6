//! Manifest loading and validation.
//!
//! Manifests are YAML or JSON documents declaring expected files and run
//! options. They are validated against JSON Schema before deserialization.

mod parser;
mod schema;

pub use parser::{ExpectSpec, Manifest, ManifestError, MatcherMap, MatcherSpec};
pub use schema::{is_valid_manifest, validate_manifest_schema};
