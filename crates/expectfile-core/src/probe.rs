//! Filesystem existence probes for real-file checks.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::path::normalize_path;

/// Answers whether expected paths exist under a root directory.
pub trait ExistenceProbe: Send + Sync {
    /// Whether `relative` exists under `root`.
    fn exists(&self, root: &Path, relative: &str) -> bool;

    /// Whether anything under `root` matches the glob `pattern`.
    fn any_match(&self, root: &Path, pattern: &str) -> bool;
}

/// Probes the real filesystem with `stat`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFilesystem;

impl ExistenceProbe for RealFilesystem {
    fn exists(&self, root: &Path, relative: &str) -> bool {
        root.join(relative).exists()
    }

    fn any_match(&self, root: &Path, pattern: &str) -> bool {
        let root = Pattern::escape(&root.to_string_lossy());
        let full = Path::new(&root).join(pattern);
        match glob::glob(&full.to_string_lossy()) {
            Ok(mut paths) => paths.any(|entry| entry.is_ok()),
            Err(err) => {
                tracing::warn!(
                    pattern = %pattern,
                    error = %err,
                    "Invalid glob for filesystem probe"
                );
                false
            }
        }
    }
}

/// In-memory probe for tests.
#[derive(Debug, Default, Clone)]
pub struct MockFilesystem {
    files: BTreeSet<String>,
}

impl MockFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file, relative to any root.
    pub fn with_file(mut self, relative: &str) -> Self {
        self.files.insert(normalize_path(relative));
        self
    }

    pub fn files(&self) -> Vec<PathBuf> {
        self.files.iter().map(PathBuf::from).collect()
    }
}

impl ExistenceProbe for MockFilesystem {
    fn exists(&self, _root: &Path, relative: &str) -> bool {
        self.files.contains(&normalize_path(relative))
    }

    fn any_match(&self, _root: &Path, pattern: &str) -> bool {
        match Pattern::new(pattern) {
            Ok(pattern) => self.files.iter().any(|f| pattern.matches(f)),
            Err(_) => false,
        }
    }
}
