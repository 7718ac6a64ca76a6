//! Directory walking: turns a directory into an observed file stream.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use expectfile_core::ObservedFile;

/// All regular files under `root`, sorted for a deterministic stream.
pub fn collect_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                files.push(entry.path());
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Open each path lazily as a streamed observed file relative to `root`.
///
/// `skip` (typically the manifest itself) is left out of the stream.
pub fn observed_files<'a>(
    root: &'a Path,
    paths: Vec<PathBuf>,
    skip: Option<&'a Path>,
) -> impl Iterator<Item = io::Result<ObservedFile>> + 'a {
    let skip = skip.and_then(|p| p.canonicalize().ok());

    paths
        .into_iter()
        .filter(move |path| match &skip {
            Some(skip) => path.canonicalize().ok().as_ref() != Some(skip),
            None => true,
        })
        .map(move |path| {
            let file = File::open(&path)?;
            Ok(ObservedFile::with_reader(path, file).in_base(root))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("dist/css")).unwrap();
        fs::write(dir.path().join("dist/app.js"), "'use strict';").unwrap();
        fs::write(dir.path().join("dist/css/site.css"), "body {}").unwrap();
        fs::write(dir.path().join("expect.yaml"), "expect: []\n").unwrap();
        dir
    }

    #[test]
    fn test_collect_files_sorted_and_recursive() {
        let dir = fixture();
        let files = collect_files(dir.path()).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("dist/app.js"),
                PathBuf::from("dist/css/site.css"),
                PathBuf::from("expect.yaml"),
            ]
        );
    }

    #[test]
    fn test_observed_files_skip_manifest() {
        let dir = fixture();
        let manifest = dir.path().join("expect.yaml");
        let files = collect_files(dir.path()).unwrap();

        let observed: Vec<String> = observed_files(dir.path(), files, Some(&manifest))
            .map(|f| f.unwrap().relative_path())
            .collect();

        assert_eq!(observed, vec!["dist/app.js", "dist/css/site.css"]);
    }

    #[test]
    fn test_observed_files_are_streams() {
        let dir = fixture();
        let files = collect_files(dir.path()).unwrap();
        let mut first = observed_files(dir.path(), files, None)
            .next()
            .unwrap()
            .unwrap();

        assert!(first.contents.is_stream());
        let bytes = first.buffer_contents().unwrap().map(|b| b.to_vec());
        assert_eq!(bytes, Some(b"'use strict';".to_vec()));
    }
}
