//! Directory manipulation abstractions for dependency injection.
//!
//! Provides the [`FsOps`] trait so that host conveniences can be
//! unit-tested without touching the real filesystem. Production code uses
//! [`SystemFsOps`]; tests use `MockFsOps`.

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

/// Abstraction over the directory operations the host object wraps.
///
/// Implement this trait to swap in a mock during unit tests, keeping host
/// logic independent of real I/O. The production implementation is
/// [`SystemFsOps`].
pub trait FsOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Create `path` and any missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if a component cannot be created.
    fn make_dir(&self, path: &Path) -> Result<()>;

    /// Remove the directory at `path` and everything beneath it.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a directory or removal fails.
    fn remove_dir(&self, path: &Path) -> Result<()>;

    /// Set the Unix permission bits on `path`. A no-op on Windows.
    ///
    /// # Errors
    ///
    /// Returns an error if the permissions cannot be changed.
    fn set_mode(&self, path: &Path, mode: u32) -> Result<()>;

    /// Canonicalize `path` without Windows UNC artifacts.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}

/// Production [`FsOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFsOps;

impl FsOps for SystemFsOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn make_dir(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("creating directory {}", path.display()))
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("removing directory {}", path.display()))
    }

    #[cfg(unix)]
    fn set_mode(&self, path: &Path, mode: u32) -> Result<()> {
        use std::os::unix::fs::PermissionsExt as _;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .with_context(|| format!("setting mode {mode:o} on {}", path.display()))
    }

    #[cfg(not(unix))]
    fn set_mode(&self, _path: &Path, _mode: u32) -> Result<()> {
        Ok(())
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        dunce::canonicalize(path).with_context(|| format!("canonicalizing {}", path.display()))
    }
}

/// Mock [`FsOps`] for unit tests.
///
/// Pre-configure existing paths with the builder-style methods, then pass
/// `Arc::new(mock)` to a host constructed with
/// [`Batch::with_fs_ops`](crate::session::Batch::with_fs_ops). Created and
/// removed directories are tracked so tests can assert on them.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFsOps {
    existing: Vec<PathBuf>,
    created: std::sync::Mutex<Vec<PathBuf>>,
    removed: std::sync::Mutex<Vec<PathBuf>>,
}

#[cfg(test)]
impl MockFsOps {
    /// Create an empty mock with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `path` as existing.
    #[must_use]
    pub fn with_existing(mut self, path: impl Into<PathBuf>) -> Self {
        let p = path.into();
        if !self.existing.contains(&p) {
            self.existing.push(p);
        }
        self
    }

    /// Paths passed to [`FsOps::make_dir`] so far.
    pub fn created(&self) -> Vec<PathBuf> {
        self.created
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Paths passed to [`FsOps::remove_dir`] so far.
    pub fn removed(&self) -> Vec<PathBuf> {
        self.removed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
impl FsOps for MockFsOps {
    fn exists(&self, path: &Path) -> bool {
        self.existing.iter().any(|p| p == path)
    }

    fn make_dir(&self, path: &Path) -> Result<()> {
        self.created
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(path.to_path_buf());
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        if !self.exists(path) {
            anyhow::bail!("mock: {} does not exist", path.display());
        }
        self.removed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(path.to_path_buf());
        Ok(())
    }

    fn set_mode(&self, _path: &Path, _mode: u32) -> Result<()> {
        Ok(())
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn system_make_and_remove_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        let ops = SystemFsOps;
        ops.make_dir(&nested).unwrap();
        assert!(ops.exists(&nested));
        ops.remove_dir(&tmp.path().join("a")).unwrap();
        assert!(!ops.exists(&nested));
    }

    #[test]
    fn system_canonicalize_resolves() {
        let tmp = tempfile::tempdir().unwrap();
        let ops = SystemFsOps;
        let canon = ops.canonicalize(tmp.path()).unwrap();
        assert!(canon.is_absolute());
    }

    #[cfg(unix)]
    #[test]
    fn system_set_mode_applies_bits() {
        use std::os::unix::fs::PermissionsExt as _;
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("d");
        let ops = SystemFsOps;
        ops.make_dir(&dir).unwrap();
        ops.set_mode(&dir, 0o700).unwrap();
        let mode = std::fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn mock_tracks_created_and_removed() {
        let mock = MockFsOps::new().with_existing("/x");
        mock.make_dir(Path::new("/y")).unwrap();
        mock.remove_dir(Path::new("/x")).unwrap();
        assert!(mock.remove_dir(Path::new("/missing")).is_err());
        assert_eq!(mock.created(), vec![PathBuf::from("/y")]);
        assert_eq!(mock.removed(), vec![PathBuf::from("/x")]);
    }
}
