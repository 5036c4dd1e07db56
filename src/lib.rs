//! JavaScript obfuscation pipeline.
//!
//! Resolves obfuscator options from layered configuration and applies them
//! file by file, adjusting the options for files whose content would break
//! under the standard settings.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: schema defaults, INI profiles, override documents, merging
//! - **[`policy`]**: content classification and per-file option resolution
//! - **[`transform`]**: the external obfuscator behind the [`transform::Transformer`] trait
//! - **[`batch`]**: tree enumeration, per-file pipeline and result counts
//! - **[`commands`]**: top-level orchestration behind the CLI
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod batch;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod operations;
pub mod platform;
pub mod policy;
pub mod transform;
