//! JSON Schema validation for manifests.
//!
//! Manifests are validated against schema/manifest.schema.json before they
//! are deserialized, so structural mistakes are reported with their location.

use std::sync::OnceLock;

use jsonschema::Validator;
use serde_json::Value;

const MANIFEST_SCHEMA: &str = include_str!("../../../../schema/manifest.schema.json");

static VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();

fn compile() -> Result<Validator, String> {
    let schema: Value = serde_json::from_str(MANIFEST_SCHEMA)
        .map_err(|e| format!("manifest schema is not valid JSON: {}", e))?;
    jsonschema::options()
        .build(&schema)
        .map_err(|e| format!("manifest schema does not compile: {}", e))
}

fn validator() -> Result<&'static Validator, String> {
    VALIDATOR.get_or_init(compile).as_ref().map_err(Clone::clone)
}

/// Validate a manifest JSON value against the schema.
///
/// Returns every validation error, each suffixed with its instance path.
pub fn validate_manifest_schema(manifest: &Value) -> Result<(), Vec<String>> {
    let validator = validator().map_err(|e| vec![e])?;

    let errors: Vec<String> = validator
        .iter_errors(manifest)
        .map(|e| {
            let at = e.instance_path.to_string();
            if at.is_empty() {
                format!("{} at /", e)
            } else {
                format!("{} at {}", e, at)
            }
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check if a manifest JSON value is valid against the schema.
pub fn is_valid_manifest(manifest: &Value) -> bool {
    validator().is_ok_and(|v| v.is_valid(manifest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_list_passes() {
        let value = serde_json::json!({ "expect": ["foo.txt", "bar.txt"] });
        assert!(validate_manifest_schema(&value).is_ok());
    }

    #[test]
    fn test_matcher_map_passes() {
        let value = serde_json::json!({
            "options": { "verbose": true, "reportUnexpected": false },
            "expect": {
                "dist/app.js": "use strict",
                "dist/app.css": "/^body/m",
                "dist/index.html": { "pattern": "<title>.*</title>", "flags": "i" },
                "dist/notes.txt": { "contains": "release" },
                "dist/robots.txt": null
            }
        });
        assert!(validate_manifest_schema(&value).is_ok());
    }

    #[test]
    fn test_missing_expect_fails() {
        let value = serde_json::json!({ "options": {} });
        let errors = validate_manifest_schema(&value).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_duplicate_list_entries_fail() {
        let value = serde_json::json!({ "expect": ["a.txt", "a.txt"] });
        assert!(validate_manifest_schema(&value).is_err());
    }

    #[test]
    fn test_unknown_option_fails() {
        let value = serde_json::json!({ "options": { "loud": true }, "expect": [] });
        assert!(validate_manifest_schema(&value).is_err());
    }

    #[test]
    fn test_real_file_mode_option_fails() {
        let value = serde_json::json!({ "options": { "checkRealFiles": true }, "expect": [] });
        assert!(!is_valid_manifest(&value));
    }

    #[test]
    fn test_bad_flags_fail() {
        let value = serde_json::json!({
            "expect": { "a.txt": { "pattern": "x", "flags": "g" } }
        });
        assert!(validate_manifest_schema(&value).is_err());
    }

    #[test]
    fn test_numeric_matcher_fails() {
        let value = serde_json::json!({ "expect": { "a.txt": 42 } });
        assert!(!is_valid_manifest(&value));
    }
}
