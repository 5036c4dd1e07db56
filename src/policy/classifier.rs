//! Content classification: which risk profiles a source file falls under.
//!
//! Classification is a text scan over the raw source, not a parse. It can
//! match inside comments and string literals, which errs towards the
//! gentler option patch.
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::{RegexSet, RegexSetBuilder};

/// File name that marks a browser-extension background script.
pub const BACKGROUND_SCRIPT_NAME: &str = "background.js";

/// Extension host APIs whose presence confirms a background script.
/// Matched case-sensitively: the API roots are lowercase identifiers.
const HOST_API_SIGNATURES: &[&str] = &[
    r"\b(?:chrome|browser)\.runtime\.[A-Za-z_$]",
    r"\b(?:chrome|browser)\.tabs\.[A-Za-z_$]",
    r"\b(?:chrome|browser)\.storage\.[A-Za-z_$]",
    r"\b(?:chrome|browser)\.contextMenus\.[A-Za-z_$]",
    r"\b(?:chrome|browser)\.webRequest\.[A-Za-z_$]",
    r"\b(?:chrome|browser)\.extension\.[A-Za-z_$]",
];

/// Signatures of code that depends on ambient globals or on object shape.
/// Matched case-insensitively.
const ENVIRONMENT_SIGNATURES: &[&str] = &[
    // property access
    r"\b[a-z_$][\w$]*\.[a-z_$][\w$]*",
    r#"\[\s*['"][^'"]+['"]\s*\]"#,
    // host globals
    r"\bconsole\.",
    r"\bwindow\b",
    r"\bdocument\b",
    r"\blocalStorage\b",
    r"\bsessionStorage\b",
    r"\blocation\b",
    r"\bnavigator\b",
    // DOM and events
    r"\baddEventListener\b",
    r"\bremoveEventListener\b",
    r"\bdispatchEvent\b",
    r"\bgetElementById\b",
    r"\bquerySelector(?:All)?\b",
    r"\bcreateElement\b",
    r"\binnerHTML\b",
    r"\bonload\b",
    r"\bonclick\b",
    r"\bfetch\s*\(",
    r"\bXMLHttpRequest\b",
    // timers
    r"\bsetTimeout\b",
    r"\bsetInterval\b",
    r"\bclearTimeout\b",
    r"\bclearInterval\b",
    r"\brequestAnimationFrame\b",
    // control flow
    r"\btry\s*\{",
    r"\bcatch\b",
    r"\bthrow\b",
    r"\basync\b",
    r"\bawait\b",
    // built-in namespaces
    r"\bJSON\b",
    r"\bMath\b",
    r"\bDate\b",
    r"\bArray\b",
    r"\bObject\b",
    r"\bString\b",
    r"\bNumber\b",
    r"\bBoolean\b",
    r"\bRegExp\b",
    r"\bError\b",
];

#[allow(clippy::expect_used)]
static HOST_API_SET: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new(HOST_API_SIGNATURES).expect("host API signatures are valid regexes")
});

#[allow(clippy::expect_used)]
static ENVIRONMENT_SET: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSetBuilder::new(ENVIRONMENT_SIGNATURES)
        .case_insensitive(true)
        .build()
        .expect("environment signatures are valid regexes")
});

/// A named classification rule that selects an option patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskProfile {
    /// Browser-extension background script using host APIs.
    BackgroundScript,
    /// Code relying on ambient globals or on object shape.
    EnvironmentCoupled,
}

impl RiskProfile {
    /// Stable name used in logs and summaries.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BackgroundScript => "extension-background-script",
            Self::EnvironmentCoupled => "environment-coupled-code",
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered risk profiles matched for one file. Empty when none apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification(Vec<RiskProfile>);

impl Classification {
    /// Whether `profile` matched.
    #[must_use]
    pub fn matches(&self, profile: RiskProfile) -> bool {
        self.0.contains(&profile)
    }

    /// Whether no profile matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Matched profiles, in order.
    #[must_use]
    pub fn profiles(&self) -> &[RiskProfile] {
        &self.0
    }

    /// Comma-separated profile names, or `"standard"` when none matched.
    #[must_use]
    pub fn label(&self) -> String {
        if self.0.is_empty() {
            return "standard".to_string();
        }
        self.0
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Classify a source file by its name and content.
///
/// The background-script profile requires both the reserved file name
/// (compared case-insensitively) and at least one host API call. The
/// environment-coupled profile is only considered when the first did not
/// match, so at most one profile is ever returned.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use jsobf_cli::policy::classifier::{classify, RiskProfile};
///
/// let c = classify(Path::new("ext/background.js"), "chrome.runtime.sendMessage({});");
/// assert_eq!(c.profiles(), [RiskProfile::BackgroundScript]);
///
/// let c = classify(Path::new("lib.js"), "const x = obj.prop;");
/// assert_eq!(c.profiles(), [RiskProfile::EnvironmentCoupled]);
///
/// assert!(classify(Path::new("lib.js"), "let a = 1 + 2;").is_empty());
/// ```
#[must_use]
pub fn classify(path: &Path, content: &str) -> Classification {
    if is_background_script(path, content) {
        return Classification(vec![RiskProfile::BackgroundScript]);
    }
    if ENVIRONMENT_SET.is_match(content) {
        return Classification(vec![RiskProfile::EnvironmentCoupled]);
    }
    Classification::default()
}

fn is_background_script(path: &Path, content: &str) -> bool {
    let named = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.eq_ignore_ascii_case(BACKGROUND_SCRIPT_NAME));
    named && HOST_API_SET.is_match(content)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profiles(name: &str, content: &str) -> Vec<RiskProfile> {
        classify(Path::new(name), content).profiles().to_vec()
    }

    #[test]
    fn signature_lists_compile() {
        assert_eq!(HOST_API_SET.len(), HOST_API_SIGNATURES.len());
        assert_eq!(ENVIRONMENT_SET.len(), ENVIRONMENT_SIGNATURES.len());
    }

    // -----------------------------------------------------------------------
    // Background scripts
    // -----------------------------------------------------------------------

    #[test]
    fn background_script_with_runtime_call() {
        assert_eq!(
            profiles("background.js", "chrome.runtime.sendMessage({ ping: 1 });"),
            vec![RiskProfile::BackgroundScript]
        );
    }

    #[test]
    fn background_script_name_is_case_insensitive() {
        assert_eq!(
            profiles("dist/Background.JS", "browser.tabs.query({}, cb);"),
            vec![RiskProfile::BackgroundScript]
        );
    }

    #[test]
    fn each_host_api_is_recognised() {
        for api in [
            "runtime.onMessage",
            "tabs.create",
            "storage.local",
            "contextMenus.create",
            "webRequest.onBeforeRequest",
            "extension.getURL",
        ] {
            assert_eq!(
                profiles("background.js", &format!("chrome.{api}.x;")),
                vec![RiskProfile::BackgroundScript],
                "chrome.{api}"
            );
        }
    }

    #[test]
    fn host_api_in_other_file_is_environment_coupled() {
        assert_eq!(
            profiles("content.js", "chrome.runtime.sendMessage({});"),
            vec![RiskProfile::EnvironmentCoupled]
        );
    }

    #[test]
    fn background_name_without_host_api_is_not_background() {
        assert_eq!(
            profiles("background.js", "console.log('idle');"),
            vec![RiskProfile::EnvironmentCoupled]
        );
    }

    #[test]
    fn host_api_roots_are_case_sensitive() {
        assert_ne!(
            profiles("background.js", "Chrome.Runtime.sendMessage();"),
            vec![RiskProfile::BackgroundScript]
        );
    }

    // -----------------------------------------------------------------------
    // Environment-coupled code
    // -----------------------------------------------------------------------

    #[test]
    fn property_access_is_environment_coupled() {
        assert_eq!(
            profiles("util.js", "const x = obj.prop;"),
            vec![RiskProfile::EnvironmentCoupled]
        );
    }

    #[test]
    fn bracket_string_access_is_environment_coupled() {
        assert_eq!(
            profiles("util.js", "var v = cfg['mode'];"),
            vec![RiskProfile::EnvironmentCoupled]
        );
    }

    #[test]
    fn keywords_match_case_insensitively() {
        assert_eq!(
            profiles("util.js", "var t = SETTIMEOUT;"),
            vec![RiskProfile::EnvironmentCoupled]
        );
        assert_eq!(
            profiles("util.js", "function f() { throw e }"),
            vec![RiskProfile::EnvironmentCoupled]
        );
    }

    #[test]
    fn plain_arithmetic_matches_nothing() {
        assert!(profiles("math.js", "let a = 1;\nlet b = a + 2;\n").is_empty());
        assert!(profiles("empty.js", "").is_empty());
    }

    #[test]
    fn matches_inside_comments_count() {
        assert_eq!(
            profiles("util.js", "let a = 1; // see window for details"),
            vec![RiskProfile::EnvironmentCoupled]
        );
    }

    #[test]
    fn label_names_profiles() {
        assert_eq!(Classification::default().label(), "standard");
        assert_eq!(
            classify(Path::new("background.js"), "chrome.tabs.query()").label(),
            "extension-background-script"
        );
    }
}
