//! `jsobf` binary entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use jsobf_cli::{cli, commands, logging};

/// Name of the log file under the cache directory.
const COMMAND: &str = "obfuscate";

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose, COMMAND);
    let log = Arc::new(logging::Logger::new(COMMAND));

    commands::obfuscate::run(&args, &log)
}
