//! Built-in option defaults and the typing rules for raw profile text.
use super::options::{DEBUG_PROTECTION_INTERVAL, DEFAULT_DEBUG_PROTECTION_INTERVAL};
use super::options::{OptionSet, OptionValue};

/// Raw strings accepted as boolean `true` (compared case-insensitively).
const TRUE_WORDS: &[&str] = &["true", "1", "yes", "on"];

/// Reference schema: option names with their default values.
///
/// The variant of each default decides how a raw profile value for that
/// key is coerced (see [`coerce`]). A schema is built once and shared
/// read-only by the profile store and the merger.
///
/// # Examples
///
/// ```
/// use jsobf_cli::config::schema::Schema;
///
/// let schema = Schema::standard();
/// let defaults = schema.defaults();
/// assert_eq!(defaults.get_bool("compact"), Some(true));
/// // The companion interval only exists while debug protection is on.
/// assert!(!defaults.contains_key("debugProtectionInterval"));
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    entries: Vec<(String, OptionValue)>,
}

impl Schema {
    /// Build a schema from explicit entries.
    #[must_use]
    pub fn new(entries: Vec<(String, OptionValue)>) -> Self {
        Self { entries }
    }

    /// The standard obfuscation defaults.
    #[must_use]
    pub fn standard() -> Self {
        let entries: Vec<(&str, OptionValue)> = vec![
            ("compact", true.into()),
            ("controlFlowFlattening", true.into()),
            ("controlFlowFlatteningThreshold", 0.7_f64.into()),
            ("deadCodeInjection", true.into()),
            ("deadCodeInjectionThreshold", 0.4_f64.into()),
            ("debugProtection", false.into()),
            (
                DEBUG_PROTECTION_INTERVAL,
                DEFAULT_DEBUG_PROTECTION_INTERVAL.into(),
            ),
            ("disableConsoleOutput", true.into()),
            ("identifierNamesGenerator", "hexadecimal".into()),
            ("log", false.into()),
            ("renameGlobals", false.into()),
            ("rotateStringArray", true.into()),
            ("selfDefending", true.into()),
            ("shuffleStringArray", true.into()),
            ("splitStrings", true.into()),
            ("splitStringsChunkLength", 10_i64.into()),
            ("stringArray", true.into()),
            ("stringArrayEncoding", (&["base64"][..]).into()),
            ("stringArrayThreshold", 0.75_f64.into()),
            ("transformObjectKeys", true.into()),
            ("unicodeEscapeSequence", false.into()),
        ];
        Self::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    /// Default option set, with the debug-protection invariant applied.
    #[must_use]
    pub fn defaults(&self) -> OptionSet {
        let mut set: OptionSet = self.entries.iter().cloned().collect();
        set.enforce_debug_protection();
        set
    }

    /// Iterate over `(name, default)` pairs in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of keys in the schema.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the schema has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Coerce raw profile text into the type of `default`.
///
/// - bool: `true`, `1`, `yes`, `on` (any case) are `true`; anything else is `false`
/// - integer / float: parsed as that numeric type; `NaN` and infinities
///   are rejected
/// - list: split on commas, items trimmed, empty items dropped
/// - string: the trimmed raw text
///
/// Returns `None` when the text is not a (finite) number of the required
/// type, or when the default is a nested table (tables never come from
/// profile text).
///
/// # Examples
///
/// ```
/// use jsobf_cli::config::options::OptionValue;
/// use jsobf_cli::config::schema::coerce;
///
/// assert_eq!(coerce(&OptionValue::Bool(false), "Yes"), Some(OptionValue::Bool(true)));
/// assert_eq!(coerce(&OptionValue::Integer(10), "8"), Some(OptionValue::Integer(8)));
/// assert_eq!(coerce(&OptionValue::List(vec![]), ""), Some(OptionValue::List(vec![])));
/// assert_eq!(coerce(&OptionValue::Float(0.5), "lots"), None);
/// ```
#[must_use]
pub fn coerce(default: &OptionValue, raw: &str) -> Option<OptionValue> {
    let raw = raw.trim();
    match default {
        OptionValue::Bool(_) => Some(OptionValue::Bool(
            TRUE_WORDS.iter().any(|w| raw.eq_ignore_ascii_case(w)),
        )),
        OptionValue::Integer(_) => raw.parse().ok().map(OptionValue::Integer),
        OptionValue::Float(_) => raw
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(OptionValue::Float),
        OptionValue::List(_) => Some(OptionValue::List(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        )),
        OptionValue::Text(_) => Some(OptionValue::Text(raw.to_string())),
        OptionValue::Map(_) => None,
    }
}
