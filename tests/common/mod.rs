// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed source tree, a fluent builder, a
// deterministic in-process transformer and a log that keeps every message
// so each integration test can run the pipeline without Node.js.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use jsobf_cli::config::options::OptionSet;
use jsobf_cli::error::TransformError;
use jsobf_cli::logging::{FileEntry, FileStatus, Log};
use jsobf_cli::transform::Transformer;

/// Source text that makes [`FakeTransformer`] fail.
pub const FAIL_MARKER: &str = "/* fail */";

/// Prefix [`FakeTransformer`] puts in front of every output.
pub const OBFUSCATED_PREFIX: &str = "/* obfuscated */";

/// Background script that uses the extension runtime API and `window`.
pub const BACKGROUND_SCRIPT: &str =
    "chrome.runtime.onInstalled.addListener(() => { window.ready = true; });\n";

/// Profile file with a few sections, one of them incomplete.
pub const TEST_CONFIG: &str = "\
# obfuscation profiles
[DEFAULT]
compact = true

[BALANCED]
controlFlowFlattening = true
controlFlowFlatteningThreshold = 0.5
stringArrayEncoding = rc4,base64
stringArrayThreshold = 0.6

[NO_THRESHOLD]
controlFlowFlattening = false
stringArrayEncoding =

[PARANOID]
debugProtection = yes
selfDefending = on
";

/// Transformer that prefixes its input, records the options it was given,
/// and fails on sources containing [`FAIL_MARKER`].
#[derive(Debug, Default)]
pub struct FakeTransformer {
    calls: Mutex<Vec<OptionSet>>,
}

impl FakeTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options passed to each successful or failed call, in order.
    pub fn calls(&self) -> Vec<OptionSet> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl Transformer for FakeTransformer {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn transform(&self, source: &str, options: &OptionSet) -> Result<String, TransformError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(options.clone());
        if source.contains(FAIL_MARKER) {
            return Err(TransformError::ToolFailed {
                tool: "fake".to_string(),
                message: "refusing marked source".to_string(),
            });
        }
        Ok(format!("{OBFUSCATED_PREFIX}{source}"))
    }
}

/// [`Log`] implementation that keeps every message in memory.
#[derive(Debug, Default)]
pub struct CollectingLog {
    lines: Mutex<Vec<(String, String)>>,
    files: Mutex<Vec<FileEntry>>,
}

impl CollectingLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: &str, msg: &str) {
        self.lines
            .lock()
            .expect("lines lock")
            .push((level.to_string(), msg.to_string()));
    }

    /// Messages logged at `level`.
    pub fn messages(&self, level: &str) -> Vec<String> {
        self.lines
            .lock()
            .expect("lines lock")
            .iter()
            .filter(|(l, _)| l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Per-file records with the given status.
    pub fn files_with(&self, status: FileStatus) -> Vec<FileEntry> {
        self.files
            .lock()
            .expect("files lock")
            .iter()
            .filter(|f| f.status == status)
            .cloned()
            .collect()
    }
}

impl Log for CollectingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
    fn record_file(&self, path: &str, status: FileStatus, message: Option<&str>) {
        self.files.lock().expect("files lock").push(FileEntry {
            path: path.to_string(),
            status,
            message: message.map(String::from),
        });
    }
}

/// An isolated source tree backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct IntegrationTestContext {
    /// Temporary directory holding `src/` and anything else the test writes.
    pub root: tempfile::TempDir,
    pub transformer: Arc<FakeTransformer>,
    pub log: Arc<CollectingLog>,
}

impl IntegrationTestContext {
    /// Create a new context with an empty `src/` directory.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(root.path().join("src")).expect("create src dir");
        Self {
            root,
            transformer: Arc::new(FakeTransformer::new()),
            log: Arc::new(CollectingLog::new()),
        }
    }

    /// Input directory of the tree.
    pub fn src(&self) -> PathBuf {
        self.root.path().join("src")
    }

    /// Default output directory (not created).
    pub fn dist(&self) -> PathBuf {
        self.root.path().join("dist")
    }

    /// Path inside the temp root.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    /// Read a file under the temp root.
    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).expect("read output file")
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context with an empty source tree.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write `content` to `src/<rel>`, creating parent directories.
    pub fn with_source(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.src().join(rel), content);
        self
    }

    /// Write `content` to `<rel>` relative to the temp root.
    pub fn with_file(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.path(rel), content);
        self
    }

    /// The tree used by the end-to-end scenarios: a background script, a
    /// plain script and a stylesheet.
    pub fn extension(self) -> Self {
        self.with_source("background.js", BACKGROUND_SCRIPT)
            .with_source("content.js", "let total = 0;\n")
            .with_source("styles.css", "body { margin: 0; }\n")
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write test file");
}
