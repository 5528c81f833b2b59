//! Where `.rec` source text comes from.
//!
//! Include resolution reads files through a [`SourceProvider`] so the same
//! resolver runs against the real filesystem or an in-memory file set.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// File access used by include resolution.
pub trait SourceProvider {
    /// Read the UTF-8 text of a file.
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error>;

    /// Join an include path onto the directory of the including file.
    fn resolve_include(&self, base_dir: &Path, include: &str) -> PathBuf {
        base_dir.join(include)
    }

    /// Absolute, normalized identity of a file, used for cycle detection.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf, std::io::Error>;
}

/// Reads from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemProvider;

impl SourceProvider for FileSystemProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        std::fs::read_to_string(path)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, std::io::Error> {
        path.canonicalize()
    }
}

/// A fixed set of files held in memory, keyed by normalized path.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProvider {
    files: HashMap<PathBuf, String>,
}

impl InMemoryProvider {
    pub fn new(files: HashMap<PathBuf, String>) -> Self {
        let files = files
            .into_iter()
            .map(|(p, src)| (normalize_path(&p), src))
            .collect();
        Self { files }
    }

    /// Add or replace one file.
    pub fn with_file(mut self, path: impl AsRef<Path>, source: impl Into<String>) -> Self {
        self.files
            .insert(normalize_path(path.as_ref()), source.into());
        self
    }
}

impl SourceProvider for InMemoryProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        let normalized = normalize_path(path);
        self.files.get(&normalized).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such file in memory: {}", normalized.display()),
            )
        })
    }

    fn resolve_include(&self, base_dir: &Path, include: &str) -> PathBuf {
        normalize_path(&base_dir.join(include))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, std::io::Error> {
        let normalized = normalize_path(path);
        if self.files.contains_key(&normalized) {
            Ok(normalized)
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such file in memory: {}", normalized.display()),
            ))
        }
    }
}

/// Resolve `.` and `..` components lexically, without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            other => components.push(other),
        }
    }
    components.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_resolves_dot_and_dotdot() {
        assert_eq!(
            normalize_path(Path::new("/cfg/net/../app/./main.rec")),
            PathBuf::from("/cfg/app/main.rec")
        );
        assert_eq!(
            normalize_path(Path::new("../shared/a.rec")),
            PathBuf::from("../shared/a.rec")
        );
    }

    #[test]
    fn in_memory_read_and_missing() {
        let provider = InMemoryProvider::default().with_file("/cfg/app.rec", "{}");
        assert_eq!(provider.read_source(Path::new("/cfg/app.rec")).unwrap(), "{}");
        let err = provider.read_source(Path::new("/cfg/other.rec")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn in_memory_resolves_relative_includes() {
        let provider = InMemoryProvider::default().with_file("/cfg/shared/types.rec", "{}");
        let resolved = provider.resolve_include(Path::new("/cfg/app"), "../shared/types.rec");
        assert_eq!(resolved, PathBuf::from("/cfg/shared/types.rec"));
        assert_eq!(
            provider.canonicalize(&resolved).unwrap(),
            PathBuf::from("/cfg/shared/types.rec")
        );
    }

    #[test]
    fn in_memory_canonicalize_missing_is_not_found() {
        let provider = InMemoryProvider::default();
        let err = provider.canonicalize(Path::new("/nope.rec")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn filesystem_provider_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.rec");
        std::fs::write(&path, "{ a: 1 }").unwrap();
        let provider = FileSystemProvider;
        assert_eq!(provider.read_source(&path).unwrap(), "{ a: 1 }");
        assert!(provider.canonicalize(&path).unwrap().is_absolute());
    }
}
