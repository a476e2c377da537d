//! Where fragment files come from.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::trace;

/// Fragment loading errors.
#[derive(Debug, Error)]
pub enum FragmentError {
    /// Fragment name cannot be used as a file name.
    #[error("Invalid fragment name: {0}")]
    InvalidName(&'static str),

    /// I/O error other than a missing file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Validate a fragment name.
///
/// Names map to single files below a source root, so anything that could
/// escape it is rejected.
///
/// # Errors
///
/// Returns [`FragmentError::InvalidName`] describing the problem.
pub fn validate_name(name: &str) -> Result<(), FragmentError> {
    if name.trim().is_empty() {
        return Err(FragmentError::InvalidName("Fragment name cannot be empty"));
    }
    if name.contains("..") {
        return Err(FragmentError::InvalidName("Fragment name cannot contain '..'"));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(FragmentError::InvalidName(
            "Fragment name contains invalid characters",
        ));
    }
    Ok(())
}

/// A store of fragment files.
#[async_trait]
pub trait FragmentSource: Send + Sync {
    /// Read a file by name. `Ok(None)` means it does not exist.
    async fn fetch(&self, file: &str) -> Result<Option<String>, FragmentError>;

    /// Get the source name (e.g., "directory", "memory").
    fn name(&self) -> &'static str;
}

/// Files in a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl FragmentSource for DirectorySource {
    async fn fetch(&self, file: &str) -> Result<Option<String>, FragmentError> {
        let path = self.root.join(file);
        trace!(path = %path.display(), "Reading fragment file");
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}

/// Files held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
}

impl MemorySource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>, contents: impl Into<String>) -> Self {
        self.files.insert(file.into(), contents.into());
        self
    }
}

#[async_trait]
impl FragmentSource for MemorySource {
    async fn fetch(&self, file: &str) -> Result<Option<String>, FragmentError> {
        Ok(self.files.get(file).cloned())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("header").is_ok());
        assert!(validate_name("card.large").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("  ").is_err());
        assert!(validate_name("../secrets").is_err());
        assert!(validate_name("nested/file").is_err());
        assert!(validate_name("nested\\file").is_err());
        assert!(validate_name("nul\0byte").is_err());
    }

    #[tokio::test]
    async fn test_directory_source() {
        let root = std::env::temp_dir().join(format!("pulsor-fragments-{}", std::process::id()));
        tokio::fs::create_dir_all(&root).await.unwrap();
        tokio::fs::write(root.join("header.html"), "<h1>Hi</h1>").await.unwrap();

        let source = DirectorySource::new(&root);
        assert_eq!(source.name(), "directory");
        assert_eq!(
            source.fetch("header.html").await.unwrap().as_deref(),
            Some("<h1>Hi</h1>")
        );
        assert!(source.fetch("missing.html").await.unwrap().is_none());

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemorySource::new().with_file("a.html", "A");
        assert_eq!(source.fetch("a.html").await.unwrap().as_deref(), Some("A"));
        assert!(source.fetch("b.html").await.unwrap().is_none());
    }
}
