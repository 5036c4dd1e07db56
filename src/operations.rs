//! Filesystem operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that the batch runner can be
//! unit-tested without touching the real filesystem. Production code uses
//! [`SystemFileSystemOps`]; tests use `MockFileSystemOps`.

use anyhow::{Context as _, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Outcome of [`FileSystemOps::copy_with_metadata`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The destination was written.
    Copied,
    /// Source and destination are the same file; nothing was done.
    SameFile,
}

/// Abstraction over the filesystem calls made by the batch runner.
///
/// Implement this trait to swap in a mock during unit tests, keeping batch
/// logic independent of real I/O. The production implementation is
/// [`SystemFileSystemOps`].
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Read a UTF-8 text file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write `contents` to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write(&self, path: &Path, contents: &str) -> Result<()>;

    /// Create the parent directory of `path` (and its ancestors) if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn ensure_parent_dir(&self, path: &Path) -> Result<()>;

    /// List the regular files under `root`, sorted by path.
    ///
    /// Descends into subdirectories only when `recursive` is set. The
    /// `exclude` directory, if given, is not entered.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` or any visited directory cannot be read.
    fn list_files(
        &self,
        root: &Path,
        recursive: bool,
        exclude: Option<&Path>,
    ) -> Result<Vec<PathBuf>>;

    /// Copy `from` to `to`, preserving permissions and modification time.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or the destination
    /// cannot be written.
    fn copy_with_metadata(&self, from: &Path, to: &Path) -> Result<CopyOutcome>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
    }

    fn ensure_parent_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent: {}", parent.display()))?;
        }
        Ok(())
    }

    fn list_files(
        &self,
        root: &Path,
        recursive: bool,
        exclude: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(if recursive { usize::MAX } else { 1 })
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| exclude.is_none_or(|ex| e.path() != ex));

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.with_context(|| format!("listing {}", root.display()))?;
            // Symlinked files count; symlinked directories are not descended.
            if entry.path().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn copy_with_metadata(&self, from: &Path, to: &Path) -> Result<CopyOutcome> {
        if is_same_file(from, to) {
            return Ok(CopyOutcome::SameFile);
        }
        copy_preserving(from, to)
            .with_context(|| format!("copying {} to {}", from.display(), to.display()))?;
        Ok(CopyOutcome::Copied)
    }
}

/// Whether both paths resolve to the same existing file.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (dunce::canonicalize(a), dunce::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn copy_preserving(from: &Path, to: &Path) -> io::Result<()> {
    let meta = fs::metadata(from)?;
    let mut src = File::open(from)?;
    let mut dst = File::create(to)?;
    io::copy(&mut src, &mut dst)?;
    // Timestamps go on the open handle, before permissions can make the
    // destination read-only.
    dst.set_modified(meta.modified()?)?;
    drop(dst);
    fs::set_permissions(to, meta.permissions())
}

/// Mock [`FileSystemOps`] for unit tests.
///
/// Holds an in-memory tree of text files. Paths registered with
/// [`failing`](Self::failing) make every read, write and copy touching them
/// fail.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    files: std::sync::Mutex<std::collections::BTreeMap<PathBuf, String>>,
    failing: Vec<PathBuf>,
    list_error: bool,
}

#[cfg(test)]
impl MockFileSystemOps {
    /// Create an empty mock with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text file.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, contents: &str) -> Self {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.into(), contents.to_string());
        }
        self
    }

    /// Make every operation on `path` fail.
    #[must_use]
    pub fn failing(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing.push(path.into());
        self
    }

    /// Make [`FileSystemOps::list_files`] fail.
    #[must_use]
    pub const fn with_list_error(mut self) -> Self {
        self.list_error = true;
        self
    }

    /// Current contents of `path`, if present.
    #[must_use]
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.lock().ok()?.get(path).cloned()
    }

    fn check(&self, path: &Path) -> Result<()> {
        if self.failing.iter().any(|p| p == path) {
            anyhow::bail!("mock: injected failure for {}", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl FileSystemOps for MockFileSystemOps {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.check(path)?;
        self.contents(path)
            .ok_or_else(|| anyhow::anyhow!("mock: no such file {}", path.display()))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        self.check(path)?;
        self.files
            .lock()
            .expect("mock files poisoned")
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn ensure_parent_dir(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn list_files(
        &self,
        root: &Path,
        recursive: bool,
        exclude: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        if self.list_error {
            anyhow::bail!("mock: cannot list {}", root.display());
        }
        let files = self.files.lock().expect("mock files poisoned");
        Ok(files
            .keys()
            .filter(|p| p.starts_with(root))
            .filter(|p| recursive || p.parent() == Some(root))
            .filter(|p| exclude.is_none_or(|ex| !p.starts_with(ex)))
            .cloned()
            .collect())
    }

    fn copy_with_metadata(&self, from: &Path, to: &Path) -> Result<CopyOutcome> {
        if from == to {
            return Ok(CopyOutcome::SameFile);
        }
        self.check(from)?;
        self.check(to)?;
        let contents = self.read_to_string(from)?;
        self.write(to, &contents)?;
        Ok(CopyOutcome::Copied)
    }
}
