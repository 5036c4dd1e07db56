//! The external obfuscation step.
//!
//! The pipeline treats the obfuscator as an opaque, synchronous function
//! from source text and options to output text. [`NpxTransformer`] drives
//! the `javascript-obfuscator` package through `npx`.

mod npx;

pub use npx::{NpxTransformer, OBFUSCATOR_PACKAGE};

use crate::config::options::OptionSet;
use crate::error::TransformError;

/// Turns JavaScript source into obfuscated output.
#[cfg_attr(test, mockall::automock)]
pub trait Transformer: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Transform `source` using `options`.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the tool's diagnostic text when the
    /// transformation fails.
    fn transform(&self, source: &str, options: &OptionSet) -> Result<String, TransformError>;
}
