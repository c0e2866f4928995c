//! Repository layout: creating the on-disk skeleton and finding it again
//!
//! ```text
//! <root>/
//!   .minigit/
//!     config     (empty placeholder)
//!     HEAD       (empty placeholder)
//!     hooks/
//!     info/
//!     objects/
//!     refs/
//! ```

use crate::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the marker directory that identifies a repository root
pub const MARKER_DIR: &str = ".minigit";

/// Absolute paths of an initialized repository
///
/// A layout is an immutable value; every store operation takes it explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoLayout {
    root: PathBuf,
    data: PathBuf,
}

impl RepoLayout {
    fn at(root: PathBuf) -> Self {
        let data = root.join(MARKER_DIR);
        RepoLayout { root, data }
    }

    /// Initialize a new repository in `path`
    ///
    /// `path` must already exist and must not already contain the marker
    /// directory.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let root = resolve(path.as_ref())?;
        let layout = Self::at(root);

        if entry_exists(&layout.data)? {
            return Err(Error::AlreadyInitialized(layout.root));
        }

        for dir in [
            layout.data.clone(),
            layout.hooks_dir(),
            layout.info_dir(),
            layout.objects_dir(),
            layout.refs_dir(),
        ] {
            // create_dir_all treats a directory made concurrently as success
            fs::create_dir_all(&dir).map_err(Error::storage(&dir))?;
        }

        for file in [layout.config_file(), layout.head_file()] {
            touch(&file)?;
        }

        info!(root = %layout.root.display(), "initialized repository");
        Ok(layout)
    }

    /// Find the repository containing `path`
    ///
    /// Walks from `path` up through its ancestors (inclusive) and returns the
    /// first one holding the marker directory.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let start = resolve(path.as_ref())?;

        let mut current: Option<&Path> = Some(&start);
        while let Some(dir) = current {
            let marker = dir.join(MARKER_DIR);
            match fs::metadata(&marker) {
                Ok(meta) if meta.is_dir() => {
                    debug!(
                        start = %start.display(),
                        root = %dir.display(),
                        "discovered repository"
                    );
                    return Ok(Self::at(dir.to_path_buf()));
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::storage(&marker)(e)),
            }
            current = dir.parent();
        }

        Err(Error::NotFound(format!(
            "no {} directory in {} or any parent",
            MARKER_DIR,
            start.display()
        )))
    }

    /// The working directory that holds the marker directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The marker directory itself
    pub fn data_dir(&self) -> &Path {
        &self.data
    }

    pub fn config_file(&self) -> PathBuf {
        self.data.join("config")
    }

    pub fn head_file(&self) -> PathBuf {
        self.data.join("HEAD")
    }

    pub fn hooks_dir(&self) -> PathBuf {
        self.data.join("hooks")
    }

    pub fn info_dir(&self) -> PathBuf {
        self.data.join("info")
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.data.join("objects")
    }

    pub fn refs_dir(&self) -> PathBuf {
        self.data.join("refs")
    }

    /// Whether the marker directory is present
    pub fn is_initialized(&self) -> bool {
        self.data.is_dir()
    }
}

/// Absolute, symlink-free form of an existing path
fn resolve(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::NotFound(format!("path {}", path.display())),
        _ => Error::storage(path)(e),
    })
}

/// Create an empty file unless one is already there; existing content is kept
fn touch(path: &Path) -> Result<()> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(Error::storage(path)(e)),
    }
}

fn entry_exists(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::storage(path)(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_builds_skeleton() {
        let dir = tempdir().unwrap();
        let layout = RepoLayout::create(dir.path()).unwrap();

        assert!(layout.is_initialized());
        assert!(layout.hooks_dir().is_dir());
        assert!(layout.info_dir().is_dir());
        assert!(layout.objects_dir().is_dir());
        assert!(layout.refs_dir().is_dir());
        assert_eq!(fs::read(layout.config_file()).unwrap(), b"");
        assert_eq!(fs::read(layout.head_file()).unwrap(), b"");
        assert_eq!(layout.root(), fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn test_create_twice_fails() {
        let dir = tempdir().unwrap();
        RepoLayout::create(dir.path()).unwrap();

        assert!(matches!(
            RepoLayout::create(dir.path()),
            Err(Error::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn test_touch_keeps_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, r#"{ "fsync": true }"#).unwrap();

        touch(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), br#"{ "fsync": true }"#);

        let fresh = dir.path().join("HEAD");
        touch(&fresh).unwrap();
        assert_eq!(fs::read(&fresh).unwrap(), b"");
    }

    #[test]
    fn test_create_missing_path() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            RepoLayout::create(dir.path().join("missing")),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_discover_at_root() {
        let dir = tempdir().unwrap();
        let created = RepoLayout::create(dir.path()).unwrap();

        assert_eq!(RepoLayout::discover(dir.path()).unwrap(), created);
    }

    #[test]
    fn test_discover_nested() {
        let dir = tempdir().unwrap();
        let created = RepoLayout::create(dir.path()).unwrap();
        let nested = dir.path().join("one").join("two").join("three");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(RepoLayout::discover(&nested).unwrap(), created);
    }

    #[test]
    fn test_discover_ignores_marker_file() {
        let dir = tempdir().unwrap();
        let created = RepoLayout::create(dir.path()).unwrap();
        let inner = dir.path().join("inner");
        fs::create_dir(&inner).unwrap();
        fs::write(inner.join(MARKER_DIR), b"").unwrap();

        assert_eq!(RepoLayout::discover(&inner).unwrap(), created);
    }

    #[test]
    fn test_discover_without_repository() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        assert!(matches!(
            RepoLayout::discover(&nested),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_discover_missing_path() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            RepoLayout::discover(dir.path().join("does/not/exist")),
            Err(Error::NotFound(_))
        ));
    }
}
