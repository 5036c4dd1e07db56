//! Domain-specific error types for the obfuscation pipeline.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`TransformError`]) while the batch runner and command handlers at the
//! CLI boundary convert them to [`anyhow::Error`] via the standard `?`
//! operator.
//!
//! # Error hierarchy
//!
//! ```text
//! JsobfError
//! ├── Config(ConfigError)       INI profiles, override documents
//! ├── Transform(TransformError) external obfuscator failures
//! └── Input(InputError)         missing input, unsupported file type
//! ```
//!
//! Profile problems never reach the caller: [`ProfileStore`] absorbs them
//! and falls back to schema defaults. [`ConfigError`] surfaces only for the
//! override document, which the user asked for explicitly.
//!
//! [`ProfileStore`]: crate::config::profile::ProfileStore

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the obfuscation pipeline.
#[derive(Error, Debug)]
pub enum JsobfError {
    /// Configuration-related error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The external transformer failed.
    #[error("Transformation error: {0}")]
    Transform(#[from] TransformError),

    /// The command-line input cannot be processed.
    #[error("Input error: {0}")]
    Input(#[from] InputError),
}

/// Errors that arise from reading profile sources and override documents.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The requested section is absent from the profile source.
    #[error("Missing section [{section}] (available: {available})")]
    MissingSection {
        /// Section that was requested.
        section: String,
        /// Comma-separated list of sections present in the source.
        available: String,
    },

    /// The INI source contains a syntax error.
    #[error("Invalid INI syntax in {file}: {message}")]
    InvalidSyntax {
        /// Source the error was found in.
        file: String,
        /// Description of the offending line.
        message: String,
    },

    /// The override document could not be deserialized into options.
    #[error("Invalid override document {file}: {message}")]
    InvalidOverrides {
        /// Path of the override document.
        file: String,
        /// Parser diagnostic.
        message: String,
    },

    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors reported by a [`Transformer`](crate::transform::Transformer).
#[derive(Error, Debug)]
pub enum TransformError {
    /// A required external program is not on `PATH`.
    #[error("{program} not found on PATH: {hint}")]
    ToolMissing {
        /// Program that could not be located.
        program: String,
        /// What the user should do about it.
        hint: String,
    },

    /// The external tool ran but reported a failure.
    #[error("{tool} failed: {message}")]
    ToolFailed {
        /// Tool that failed.
        tool: String,
        /// Diagnostic text emitted by the tool.
        message: String,
    },

    /// The options could not be serialized into a tool configuration.
    #[error("Cannot serialize options: {0}")]
    Options(#[from] serde_json::Error),

    /// A temporary-file round trip failed.
    #[error("IO error during transformation: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal errors in the command-line input.
#[derive(Error, Debug)]
pub enum InputError {
    /// The input path does not exist.
    #[error("input path '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    /// A single file was given that the pipeline does not transform.
    #[error("input file '{}' is not a JavaScript file", .0.display())]
    UnsupportedExtension(PathBuf),

    /// The input root could not be enumerated.
    #[error("cannot enumerate '{}': {message}", path.display())]
    Unreadable {
        /// Root that could not be listed.
        path: PathBuf,
        /// Underlying error description.
        message: String,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    // -----------------------------------------------------------------------
    // ConfigError
    // -----------------------------------------------------------------------

    #[test]
    fn config_error_missing_section_display() {
        let e = ConfigError::MissingSection {
            section: "STRICT".to_string(),
            available: "BALANCED, MINIMAL".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Missing section [STRICT] (available: BALANCED, MINIMAL)"
        );
    }

    #[test]
    fn config_error_invalid_syntax_display() {
        let e = ConfigError::InvalidSyntax {
            file: "profiles.ini".to_string(),
            message: "entry outside of section at line 1: compact".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Invalid INI syntax in profiles.ini: entry outside of section at line 1: compact"
        );
    }

    #[test]
    fn config_error_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: "/conf/profiles.ini".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/conf/profiles.ini"));
    }

    // -----------------------------------------------------------------------
    // TransformError
    // -----------------------------------------------------------------------

    #[test]
    fn transform_error_tool_failed_display() {
        let e = TransformError::ToolFailed {
            tool: "javascript-obfuscator".to_string(),
            message: "Unexpected token (3:4)".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "javascript-obfuscator failed: Unexpected token (3:4)"
        );
    }

    #[test]
    fn transform_error_tool_missing_display() {
        let e = TransformError::ToolMissing {
            program: "node".to_string(),
            hint: "install Node.js from https://nodejs.org/".to_string(),
        };
        assert!(e.to_string().starts_with("node not found on PATH"));
    }

    // -----------------------------------------------------------------------
    // InputError
    // -----------------------------------------------------------------------

    #[test]
    fn input_error_not_found_display() {
        let e = InputError::NotFound(PathBuf::from("src/missing"));
        assert_eq!(e.to_string(), "input path 'src/missing' does not exist");
    }

    #[test]
    fn input_error_unsupported_extension_display() {
        let e = InputError::UnsupportedExtension(PathBuf::from("style.css"));
        assert_eq!(
            e.to_string(),
            "input file 'style.css' is not a JavaScript file"
        );
    }

    // -----------------------------------------------------------------------
    // JsobfError conversions
    // -----------------------------------------------------------------------

    #[test]
    fn jsobf_error_from_transform_error() {
        let e: JsobfError = TransformError::Io(io::Error::other("disk full")).into();
        assert!(e.to_string().contains("Transformation error"));
        assert!(e.to_string().contains("disk full"));
    }

    #[test]
    fn jsobf_error_from_input_error() {
        let e: JsobfError = InputError::NotFound(PathBuf::from("x")).into();
        assert!(e.to_string().starts_with("Input error"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<JsobfError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<TransformError>();
        assert_send_sync::<InputError>();
    }

    #[test]
    fn config_error_converts_to_anyhow() {
        let e = ConfigError::InvalidOverrides {
            file: "opts.json".to_string(),
            message: "expected value".to_string(),
        };
        let _anyhow_err: anyhow::Error = e.into();
    }
}
