//! Command-line argument definitions.
use std::path::PathBuf;

use clap::Parser;

use crate::config::ini::DEFAULT_SECTION;

/// Version string baked in by the build script, falling back to the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("JSOBF_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Command-line interface for the JavaScript obfuscation pipeline.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "jsobf",
    about = "Obfuscate JavaScript files and trees with per-file policies",
    version = version()
)]
pub struct Cli {
    /// JavaScript file or directory to process
    pub input: PathBuf,

    /// Output file or directory (defaults to the input, in place)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Option-override document (JSON, or TOML with a .toml extension)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not copy non-JavaScript files to the output directory
    #[arg(long = "no-copy", action = clap::ArgAction::SetFalse)]
    pub copy_non_matching: bool,

    /// INI profile file
    #[arg(short, long, value_name = "PATH")]
    pub profile: Option<PathBuf>,

    /// Profile section to load
    #[arg(short, long, value_name = "NAME", default_value = DEFAULT_SECTION)]
    pub section: String,

    /// Resolve and report policies without writing anything
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Write the resolved base options as JSON
    #[arg(long, value_name = "PATH")]
    pub save_options: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
