//! Core logging types: file entries, status, and the [`Log`] trait.

/// Per-file result for summary reporting.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Path of the file, as displayed to the user.
    pub path: String,
    /// Final status of the file.
    pub status: FileStatus,
    /// Optional detail message (e.g., the applied policy or error description).
    pub message: Option<String>,
}

/// Status of a handled file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// The file was obfuscated and written.
    Obfuscated,
    /// A non-JavaScript file was copied verbatim.
    Copied,
    /// Dry-run mode; the action was reported but nothing was written.
    DryRun,
    /// The file could not be obfuscated or copied.
    Failed,
}

impl FileStatus {
    /// Short lowercase tag used in log lines.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Obfuscated => "obfuscated",
            Self::Copied => "copied",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) routes messages through `tracing` to
/// the console and the persistent log file. Library code takes `&dyn Log`
/// so tests can substitute a recording implementation.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a per-file result for the summary.
    fn record_file(&self, path: &str, status: FileStatus, message: Option<&str>);
}
