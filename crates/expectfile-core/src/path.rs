//! Path normalization for expectation keys.
//!
//! Expected paths and observed paths are compared as forward-slash strings
//! relative to the project root: `./dist\app.js`, `/dist/app.js` and
//! `dist//app.js` all normalize to `dist/app.js`.

use std::path::Path;

/// Normalize a path string into an expectation key.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalize `path` relative to `base`.
///
/// When `path` does not live under `base` it is normalized as-is.
pub fn relative_to(path: &Path, base: Option<&Path>) -> String {
    let relative = base
        .and_then(|base| path.strip_prefix(base).ok())
        .unwrap_or(path);

    normalize_path(&relative.to_string_lossy())
}
