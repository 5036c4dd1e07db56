//! Directory and single-file obfuscation runs.
//!
//! A run enumerates the input tree, obfuscates every JavaScript file with
//! its per-file policy and optionally mirrors the remaining files into the
//! output tree. One file's failure is logged and counted; it never aborts
//! the run.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::config::options::OptionSet;
use crate::error::InputError;
use crate::logging::{FileStatus, Log};
use crate::operations::{CopyOutcome, FileSystemOps, SystemFileSystemOps};
use crate::policy::{FilePolicy, PolicyResolver};
use crate::transform::Transformer;

/// Extension of files that are obfuscated; everything else passes through.
pub const JS_EXTENSION: &str = "js";

/// Whether `path` names a JavaScript source file (`.js`, any case).
#[must_use]
pub fn is_javascript(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(JS_EXTENSION))
}

/// Counters for one run.
///
/// `processed`/`succeeded` count JavaScript files; `found`/`copied` count
/// the other files. In dry-run mode an action that would have been taken
/// counts as a success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// JavaScript files attempted.
    pub processed: usize,
    /// JavaScript files obfuscated and written.
    pub succeeded: usize,
    /// Non-JavaScript files found.
    pub found: usize,
    /// Non-JavaScript files copied (including same-file no-ops).
    pub copied: usize,
    /// Files that failed, with the reason.
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchResult {
    /// Create a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of JavaScript files that failed.
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.processed.saturating_sub(self.succeeded)
    }

    /// Format the summary line.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsobf_cli::batch::BatchResult;
    ///
    /// let result = BatchResult { processed: 3, succeeded: 2, found: 4, copied: 4, ..Default::default() };
    /// assert_eq!(result.summary(false), "2 of 3 JavaScript files obfuscated, 4 of 4 other files copied");
    /// assert_eq!(result.summary(true), "2 of 3 JavaScript files would be obfuscated, 4 of 4 other files would be copied");
    /// ```
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let (obfuscated, copied) = if dry_run {
            ("would be obfuscated", "would be copied")
        } else {
            ("obfuscated", "copied")
        };
        format!(
            "{} of {} JavaScript files {obfuscated}, {} of {} other files {copied}",
            self.succeeded, self.processed, self.copied, self.found
        )
    }
}

/// Runs the obfuscation pipeline over files and directory trees.
pub struct BatchRunner {
    resolver: PolicyResolver,
    base_options: OptionSet,
    transformer: Arc<dyn Transformer>,
    log: Arc<dyn Log>,
    fs_ops: Arc<dyn FileSystemOps>,
    dry_run: bool,
}

impl std::fmt::Debug for BatchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRunner")
            .field("resolver", &self.resolver)
            .field("base_options", &self.base_options)
            .field("transformer", &self.transformer.name())
            .field("log", &"<dyn Log>")
            .field("fs_ops", &self.fs_ops)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl BatchRunner {
    /// Create a runner that writes through the real filesystem.
    #[must_use]
    pub fn new(
        resolver: PolicyResolver,
        base_options: OptionSet,
        transformer: Arc<dyn Transformer>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            resolver,
            base_options,
            transformer,
            log,
            fs_ops: Arc::new(SystemFileSystemOps),
            dry_run: false,
        }
    }

    /// Replace the filesystem backend.
    #[must_use]
    pub fn with_fs_ops(mut self, fs_ops: Arc<dyn FileSystemOps>) -> Self {
        self.fs_ops = fs_ops;
        self
    }

    /// Report actions without transforming or writing anything.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Base options every file starts from.
    #[must_use]
    pub const fn base_options(&self) -> &OptionSet {
        &self.base_options
    }

    /// Obfuscate every JavaScript file under `input_root` into `output_root`.
    ///
    /// Relative structure is preserved. When `output_root` lies inside
    /// `input_root` it is not enumerated, so re-running does not pick up
    /// earlier outputs. With `copy_non_matching`, other files are copied
    /// across verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Unreadable`] if the input tree cannot be
    /// enumerated. Per-file failures are recorded in the result instead.
    pub fn run(
        &self,
        input_root: &Path,
        output_root: &Path,
        recursive: bool,
        copy_non_matching: bool,
    ) -> Result<BatchResult, InputError> {
        let exclude = nested_output(input_root, output_root);
        let files = self
            .fs_ops
            .list_files(input_root, recursive, exclude.as_deref())
            .map_err(|e| InputError::Unreadable {
                path: input_root.to_path_buf(),
                message: format!("{e:#}"),
            })?;
        let (scripts, others): (Vec<_>, Vec<_>) =
            files.into_iter().partition(|p| is_javascript(p));

        let mut result = BatchResult::new();
        result.found = others.len();

        self.log.stage(&format!(
            "Obfuscating {} JavaScript file(s) in {}",
            scripts.len(),
            input_root.display()
        ));
        for input in &scripts {
            let rel = relative(input, input_root);
            let output = output_root.join(rel);
            result.processed += 1;
            match self.process_file(input, &output) {
                Ok(policy) => {
                    result.succeeded += 1;
                    let status = if self.dry_run {
                        FileStatus::DryRun
                    } else {
                        FileStatus::Obfuscated
                    };
                    self.log.record_file(
                        &rel.display().to_string(),
                        status,
                        Some(&policy.classification.label()),
                    );
                }
                Err(e) => self.record_failure(&mut result, input, rel, &e),
            }
        }

        if copy_non_matching && !others.is_empty() {
            self.log
                .stage(&format!("Copying {} other file(s)", others.len()));
            for input in &others {
                let rel = relative(input, input_root);
                match self.copy_file(input, &output_root.join(rel), rel) {
                    Ok(()) => result.copied += 1,
                    Err(e) => self.record_failure(&mut result, input, rel, &e),
                }
            }
        }

        self.log.info(&result.summary(self.dry_run));
        Ok(result)
    }

    /// Obfuscate one file: read, plan, transform, post-process, write.
    ///
    /// Returns the policy that was applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the transformer fails,
    /// or the output cannot be written.
    pub fn process_file(&self, input: &Path, output: &Path) -> Result<FilePolicy> {
        let source = self.fs_ops.read_to_string(input)?;
        let policy = self.resolver.plan(input, &source, &self.base_options);
        let label = policy.classification.label();

        if self.dry_run {
            self.log.dry_run(&format!(
                "would obfuscate {} -> {} ({label})",
                input.display(),
                output.display()
            ));
            return Ok(policy);
        }

        self.log
            .debug(&format!("obfuscating {} ({label})", input.display()));
        let transformed = self
            .transformer
            .transform(&source, &policy.options)
            .with_context(|| format!("obfuscating {}", input.display()))?;
        let processed = policy.post_process(&transformed);

        self.fs_ops.ensure_parent_dir(output)?;
        self.fs_ops.write(output, &processed)?;
        self.log.info(&format!("{} -> {}", input.display(), output.display()));
        Ok(policy)
    }

    fn copy_file(&self, input: &Path, output: &Path, rel: &Path) -> Result<()> {
        let rel = rel.display().to_string();
        if self.dry_run {
            self.log.dry_run(&format!(
                "would copy {} -> {}",
                input.display(),
                output.display()
            ));
            self.log.record_file(&rel, FileStatus::DryRun, None);
            return Ok(());
        }
        self.fs_ops.ensure_parent_dir(output)?;
        match self.fs_ops.copy_with_metadata(input, output)? {
            CopyOutcome::Copied => {
                self.log.debug(&format!(
                    "copied {} -> {}",
                    input.display(),
                    output.display()
                ));
            }
            CopyOutcome::SameFile => {
                self.log
                    .debug(&format!("{} is its own destination", input.display()));
            }
        }
        self.log.record_file(&rel, FileStatus::Copied, None);
        Ok(())
    }

    fn record_failure(
        &self,
        result: &mut BatchResult,
        input: &Path,
        rel: &Path,
        err: &anyhow::Error,
    ) {
        let message = format!("{err:#}");
        self.log
            .error(&format!("failed: {}: {message}", input.display()));
        self.log
            .record_file(&rel.display().to_string(), FileStatus::Failed, Some(&message));
        result.failures.push((input.to_path_buf(), message));
    }
}

/// Path of `input` relative to `root`, or its file name if outside `root`.
fn relative<'a>(input: &'a Path, root: &Path) -> &'a Path {
    input
        .strip_prefix(root)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .or_else(|| input.file_name().map(Path::new))
        .unwrap_or(input)
}

/// When `output_root` is a proper subdirectory of `input_root`, return it
/// expressed under `input_root` (the form enumeration produces).
fn nested_output(input_root: &Path, output_root: &Path) -> Option<PathBuf> {
    let input = dunce::canonicalize(input_root).ok()?;
    let output = dunce::canonicalize(output_root).ok()?;
    let rel = output.strip_prefix(&input).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    Some(input_root.join(rel))
}
