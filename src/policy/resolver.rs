//! Per-file option patches and output post-processing.
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::classifier::{Classification, RiskProfile, classify};
use crate::config::options::{OptionSet, OptionValue};

/// Prepended to obfuscated background scripts. Service workers have no
/// `window`, so both global names are pointed at whatever global exists.
pub const COMPAT_PREAMBLE: &str = "\
(function (g) {
  if (typeof g.self === 'undefined') { g.self = g; }
  if (typeof g.window === 'undefined') { g.window = g.self; }
})(typeof globalThis !== 'undefined' ? globalThis : this);
";

/// A whole run of JavaScript identifier characters containing `window`.
/// `$` counts as an identifier character, so `$window` is one run.
#[allow(clippy::expect_used)]
static WINDOW_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\w$]*window[\w$]*").expect("window identifier regex is valid")
});

/// Options and classification decided for one file.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePolicy {
    /// Risk profiles matched on the original content.
    pub classification: Classification,
    /// Options to hand to the transformer.
    pub options: OptionSet,
}

impl FilePolicy {
    /// Post-process transformer output according to the classification.
    ///
    /// Only background scripts are rewritten: every identifier that is
    /// exactly `window` becomes `self`, then [`COMPAT_PREAMBLE`] is
    /// prepended. Like classification this is a text scan, so `window`
    /// inside strings and comments is rewritten too.
    #[must_use]
    pub fn post_process(&self, output: &str) -> String {
        if !self.classification.matches(RiskProfile::BackgroundScript) {
            return output.to_string();
        }
        let rewritten = WINDOW_IDENTIFIER.replace_all(output, |caps: &Captures<'_>| {
            match caps.get(0).map_or("", |m| m.as_str()) {
                "window" => "self".to_string(),
                other => other.to_string(),
            }
        });
        format!("{COMPAT_PREAMBLE}{rewritten}")
    }
}

/// Selects per-file options from content classification.
///
/// Holds the option patch of each risk profile. A patch replaces the
/// listed keys on top of the base options; at most one patch applies.
#[derive(Debug, Clone)]
pub struct PolicyResolver {
    background_patch: OptionSet,
    environment_patch: OptionSet,
}

impl Default for PolicyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyResolver {
    /// Create a resolver with the built-in patches.
    #[must_use]
    pub fn new() -> Self {
        Self {
            background_patch: OptionSet::new()
                .with("selfDefending", false)
                .with("transformObjectKeys", false)
                .with("stringArrayWrappersType", "variable")
                .with("target", "browser-no-eval")
                .with("domainLock", OptionValue::List(Vec::new())),
            environment_patch: OptionSet::new().with("transformObjectKeys", false),
        }
    }

    /// Classify `content` and compute its options in one pass.
    #[must_use]
    pub fn plan(&self, path: &Path, content: &str, base: &OptionSet) -> FilePolicy {
        let classification = classify(path, content);
        let patch = if classification.matches(RiskProfile::BackgroundScript) {
            Some(&self.background_patch)
        } else if classification.matches(RiskProfile::EnvironmentCoupled) {
            Some(&self.environment_patch)
        } else {
            None
        };

        let mut options = base.clone();
        if let Some(patch) = patch {
            for (key, value) in patch {
                options.insert(key.clone(), value.clone());
            }
        }
        options.enforce_debug_protection();

        FilePolicy {
            classification,
            options,
        }
    }

    /// Options to use for the file at `path` with `content`.
    #[must_use]
    pub fn resolve_options(&self, path: &Path, content: &str, base: &OptionSet) -> OptionSet {
        self.plan(path, content, base).options
    }

    /// Post-process transformer `output` for a file whose original content
    /// was `content`.
    #[must_use]
    pub fn post_process(&self, path: &Path, content: &str, output: &str) -> String {
        FilePolicy {
            classification: classify(path, content),
            options: OptionSet::new(),
        }
        .post_process(output)
    }
}
