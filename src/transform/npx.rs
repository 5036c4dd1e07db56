//! `javascript-obfuscator` driven through `npx`.
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use super::Transformer;
use crate::config::options::OptionSet;
use crate::error::TransformError;
use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;

/// npm package providing the obfuscator CLI.
pub const OBFUSCATOR_PACKAGE: &str = "javascript-obfuscator";

const NODE_HINT: &str = "install Node.js from https://nodejs.org/ and make sure it is on PATH";

/// [`Transformer`] that shells out to `npx javascript-obfuscator`.
///
/// Each call writes the source and the JSON options to a private temporary
/// directory, runs the tool against them and reads the output back. The
/// directory is removed when the call returns, on success or failure.
#[derive(Debug, Clone)]
pub struct NpxTransformer {
    executor: Arc<dyn Executor>,
    platform: Platform,
}

impl NpxTransformer {
    /// Create a transformer for the current platform.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            platform: Platform::detect(),
        }
    }

    /// Override the platform used to pick program names.
    #[must_use]
    pub const fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Verify that Node.js is present and install the obfuscator if needed.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::ToolMissing`] if `node` is not on PATH and
    /// [`TransformError::ToolFailed`] if the package cannot be installed.
    pub fn ensure_available(&self, log: &dyn Log) -> Result<(), TransformError> {
        if !self.executor.which("node") {
            return Err(TransformError::ToolMissing {
                program: "node".to_string(),
                hint: NODE_HINT.to_string(),
            });
        }
        let version = self
            .executor
            .run("node", &["--version"])
            .map_err(|e| tool_failed("node", &e))?;
        log.info(&format!("Node.js {}", version.stdout.trim()));

        let npx = self.platform.program("npx");
        let installed = self
            .executor
            .run_unchecked(&npx, &[OBFUSCATOR_PACKAGE, "--version"])
            .is_ok_and(|r| r.success);
        if installed {
            log.debug(&format!("{OBFUSCATOR_PACKAGE} is available"));
            return Ok(());
        }

        log.warn(&format!("{OBFUSCATOR_PACKAGE} not found, installing with npm"));
        let npm = self.platform.program("npm");
        self.executor
            .run(&npm, &["install", "-g", OBFUSCATOR_PACKAGE])
            .map_err(|e| tool_failed("npm", &e))?;
        log.info(&format!("installed {OBFUSCATOR_PACKAGE}"));
        Ok(())
    }
}

impl Transformer for NpxTransformer {
    fn name(&self) -> &'static str {
        OBFUSCATOR_PACKAGE
    }

    fn transform(&self, source: &str, options: &OptionSet) -> Result<String, TransformError> {
        let dir = tempfile::Builder::new().prefix("jsobf-").tempdir()?;
        let input = dir.path().join("input.js");
        let output = dir.path().join("output.js");
        let config = dir.path().join("config.json");

        fs::write(&input, source)?;
        fs::write(&config, options.to_json()?)?;

        let npx = self.platform.program("npx");
        let args = [
            OBFUSCATOR_PACKAGE,
            utf8(&input)?,
            "--output",
            utf8(&output)?,
            "--config",
            utf8(&config)?,
        ];
        self.executor
            .run(&npx, &args)
            .map_err(|e| tool_failed(OBFUSCATOR_PACKAGE, &e))?;

        Ok(fs::read_to_string(&output)?)
    }
}

fn tool_failed(tool: &str, err: &anyhow::Error) -> TransformError {
    TransformError::ToolFailed {
        tool: tool.to_string(),
        message: format!("{err:#}"),
    }
}

fn utf8(path: &Path) -> Result<&str, TransformError> {
    path.to_str().ok_or_else(|| {
        TransformError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("temporary path is not valid UTF-8: {}", path.display()),
        ))
    })
}
