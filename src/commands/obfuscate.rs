//! The `jsobf` command: resolve options, then obfuscate a file or a tree.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::batch::{BatchResult, BatchRunner, is_javascript};
use crate::cli::Cli;
use crate::config;
use crate::config::options::OptionSet;
use crate::config::schema::Schema;
use crate::error::{InputError, JsobfError};
use crate::exec::SystemExecutor;
use crate::logging::{FileStatus, Log, Logger};
use crate::policy::PolicyResolver;
use crate::transform::{NpxTransformer, Transformer};

/// What a run did, for the caller to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A single file was obfuscated (or would have been, in dry-run mode).
    File {
        /// Where the output was written.
        output: PathBuf,
        /// Classification label of the file.
        label: String,
    },
    /// A directory tree was processed.
    Tree(BatchResult),
}

/// Run the obfuscate command with the `npx` transformer.
///
/// Checks that Node.js and the obfuscator package are available before
/// anything is processed. In dry-run mode the transformer is never invoked,
/// so the check is skipped.
///
/// # Errors
///
/// Returns an error if the input is missing or unsupported, the override
/// document is broken, Node.js is missing, or a single-file run fails.
pub fn run(cli: &Cli, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("jsobf {}", crate::cli::version()));

    let transformer = NpxTransformer::new(Arc::new(SystemExecutor));
    if cli.dry_run {
        log.debug("dry run: skipping Node.js check");
    } else {
        log.stage("Checking Node.js");
        transformer
            .ensure_available(&**log)
            .map_err(JsobfError::from)?;
    }

    let outcome = run_with(cli, Arc::new(transformer), Arc::clone(log) as Arc<dyn Log>);
    log.print_summary();

    // Failed files in a directory run are reported, not fatal.
    let failed = log.failure_count();
    if failed > 0 && outcome.is_ok() {
        log.warn(&format!("{failed} file(s) failed, see the log for details"));
    }
    outcome.map(|_| ())
}

/// Run the obfuscate command with an explicit transformer.
///
/// # Errors
///
/// Returns an error on any fatal input or configuration problem, or when a
/// single-file run fails. Per-file failures in a directory run are reported
/// in the returned [`BatchResult`] instead.
pub fn run_with(cli: &Cli, transformer: Arc<dyn Transformer>, log: Arc<dyn Log>) -> Result<Outcome> {
    if !cli.input.exists() {
        return Err(JsobfError::from(InputError::NotFound(cli.input.clone())).into());
    }

    log.stage("Resolving options");
    let schema = Schema::standard();
    let base = config::base_options(
        &schema,
        cli.profile.as_deref(),
        &cli.section,
        cli.config.as_deref(),
        &*log,
    )
    .map_err(JsobfError::from)?;
    let runner = BatchRunner::new(PolicyResolver::new(), base, transformer, Arc::clone(&log))
        .dry_run(cli.dry_run);
    log.debug(&format!("base options: {}", runner.base_options().to_json()?));

    if let Some(path) = &cli.save_options {
        save_options(runner.base_options(), path, &*log)?;
    }

    if cli.input.is_dir() {
        let output = cli.output.clone().unwrap_or_else(|| cli.input.clone());
        let result = runner
            .run(&cli.input, &output, cli.recursive, cli.copy_non_matching)
            .map_err(JsobfError::from)?;
        return Ok(Outcome::Tree(result));
    }

    if !is_javascript(&cli.input) {
        return Err(JsobfError::from(InputError::UnsupportedExtension(cli.input.clone())).into());
    }
    let output = single_output(&cli.input, cli.output.as_deref());
    let name = cli.input.display().to_string();
    log.stage(&format!("Obfuscating {name}"));
    match runner.process_file(&cli.input, &output) {
        Ok(policy) => {
            let label = policy.classification.label();
            let status = if cli.dry_run {
                FileStatus::DryRun
            } else {
                FileStatus::Obfuscated
            };
            log.record_file(&name, status, Some(&label));
            Ok(Outcome::File { output, label })
        }
        Err(e) => {
            log.record_file(&name, FileStatus::Failed, Some(&format!("{e:#}")));
            Err(e)
        }
    }
}

/// Output path for a single-file run: the input itself by default, or a
/// file of the same name when `output` is an existing directory.
fn single_output(input: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        None => input.to_path_buf(),
        Some(dir) if dir.is_dir() => input
            .file_name()
            .map_or_else(|| dir.to_path_buf(), |name| dir.join(name)),
        Some(path) => path.to_path_buf(),
    }
}

fn save_options(options: &OptionSet, path: &Path, log: &dyn Log) -> Result<()> {
    let json = options.to_json_pretty()?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    std::fs::write(path, json + "\n")
        .with_context(|| format!("writing options to {}", path.display()))?;
    log.info(&format!("saved options to {}", path.display()));
    Ok(())
}
