//! Typed option values and the [`OptionSet`] map handed to the transformer.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Flag that enables the obfuscator's anti-debugger loop.
pub const DEBUG_PROTECTION: &str = "debugProtection";

/// Companion of [`DEBUG_PROTECTION`]: loop interval in milliseconds.
pub const DEBUG_PROTECTION_INTERVAL: &str = "debugProtectionInterval";

/// Interval used when debug protection is enabled without an explicit one.
pub const DEFAULT_DEBUG_PROTECTION_INTERVAL: i64 = 1000;

/// A single option value.
///
/// Serialized untagged, so an [`OptionSet`] round-trips through the JSON
/// configuration payload of the obfuscator and through TOML override
/// documents without any wrapper objects.
///
/// # Examples
///
/// ```
/// use jsobf_cli::config::options::OptionValue;
///
/// let v: OptionValue = serde_json::from_str("0.75").unwrap();
/// assert_eq!(v, OptionValue::Float(0.75));
///
/// let v: OptionValue = serde_json::from_str("10").unwrap();
/// assert_eq!(v, OptionValue::Integer(10));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// `true` / `false`.
    Bool(bool),
    /// Whole number (e.g. `splitStringsChunkLength`).
    Integer(i64),
    /// Fractional number (e.g. thresholds).
    Float(f64),
    /// Free-form string (e.g. `identifierNamesGenerator`).
    Text(String),
    /// Ordered list of strings (e.g. `stringArrayEncoding`).
    List(Vec<String>),
    /// Nested option table; merged key by key.
    Map(OptionSet),
}

impl OptionValue {
    /// Return the boolean payload, if this is a [`OptionValue::Bool`].
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this value is an integer or a float.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Float(_))
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "\"{s}\""),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
            Self::Map(set) => write!(f, "{{{} keys}}", set.len()),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<&[&str]> for OptionValue {
    fn from(items: &[&str]) -> Self {
        Self::List(items.iter().map(ToString::to_string).collect())
    }
}

impl From<OptionSet> for OptionValue {
    fn from(set: OptionSet) -> Self {
        Self::Map(set)
    }
}

/// Mapping from option name to value.
///
/// Keys are kept sorted so the serialized payload is stable from run to
/// run. Keys the [`Schema`](super::schema::Schema) does not know are
/// carried through untouched.
///
/// # Examples
///
/// ```
/// use jsobf_cli::config::options::OptionSet;
///
/// let mut set = OptionSet::new()
///     .with("debugProtection", true)
///     .with("compact", false);
/// set.enforce_debug_protection();
///
/// assert_eq!(set.get_bool("compact"), Some(false));
/// assert!(set.contains_key("debugProtectionInterval"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet(BTreeMap<String, OptionValue>);

impl OptionSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Option<OptionValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        self.0.remove(key)
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    /// Look up a boolean value; `None` if absent or not a boolean.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(OptionValue::as_bool)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.0.iter()
    }

    /// Apply the debug-protection invariant in place.
    ///
    /// When `debugProtection` is `true` a numeric `debugProtectionInterval`
    /// must be present (a missing or non-numeric one becomes
    /// [`DEFAULT_DEBUG_PROTECTION_INTERVAL`]); otherwise the interval key
    /// must be absent.
    pub fn enforce_debug_protection(&mut self) {
        if self.get_bool(DEBUG_PROTECTION) == Some(true) {
            let numeric = self
                .0
                .get(DEBUG_PROTECTION_INTERVAL)
                .is_some_and(OptionValue::is_numeric);
            if !numeric {
                self.0.insert(
                    DEBUG_PROTECTION_INTERVAL.to_string(),
                    OptionValue::Integer(DEFAULT_DEBUG_PROTECTION_INTERVAL),
                );
            }
        } else {
            self.0.remove(DEBUG_PROTECTION_INTERVAL);
        }
    }

    /// Whether the debug-protection invariant currently holds.
    #[must_use]
    pub fn debug_protection_consistent(&self) -> bool {
        let interval = self.0.get(DEBUG_PROTECTION_INTERVAL);
        if self.get_bool(DEBUG_PROTECTION) == Some(true) {
            interval.is_some_and(OptionValue::is_numeric)
        } else {
            interval.is_none()
        }
    }

    /// First key (dotted for nested tables) whose float value is NaN or
    /// infinite, if any.
    #[must_use]
    pub fn non_finite_key(&self) -> Option<String> {
        self.0.iter().find_map(|(key, value)| match value {
            OptionValue::Float(f) if !f.is_finite() => Some(key.clone()),
            OptionValue::Map(inner) => inner.non_finite_key().map(|k| format!("{key}.{k}")),
            _ => None,
        })
    }

    /// Serialize to the compact JSON object consumed by the obfuscator.
    ///
    /// serde_json writes a non-finite float as `null`; see
    /// [`non_finite_key`](Self::non_finite_key).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize to indented JSON (for saving option files).
    ///
    /// serde_json writes a non-finite float as `null`; see
    /// [`non_finite_key`](Self::non_finite_key).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl FromIterator<(String, OptionValue)> for OptionSet {
    fn from_iter<I: IntoIterator<Item = (String, OptionValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for OptionSet {
    type Item = (String, OptionValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, OptionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = (&'a String, &'a OptionValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, OptionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_key_finds_nested_floats() {
        let finite = OptionSet::new().with("stringArrayThreshold", 0.75_f64);
        assert_eq!(finite.non_finite_key(), None);

        let nested = OptionSet::new()
            .with("compact", true)
            .with("extra", OptionSet::new().with("limit", f64::INFINITY));
        assert_eq!(nested.non_finite_key().as_deref(), Some("extra.limit"));
    }

    #[test]
    fn enforce_adds_interval_when_enabled() {
        let mut set = OptionSet::new().with(DEBUG_PROTECTION, true);
        set.enforce_debug_protection();
        assert_eq!(
            set.get(DEBUG_PROTECTION_INTERVAL),
            Some(&OptionValue::Integer(1000))
        );
    }

    #[test]
    fn enforce_keeps_explicit_interval() {
        let mut set = OptionSet::new()
            .with(DEBUG_PROTECTION, true)
            .with(DEBUG_PROTECTION_INTERVAL, 4000_i64);
        set.enforce_debug_protection();
        assert_eq!(
            set.get(DEBUG_PROTECTION_INTERVAL),
            Some(&OptionValue::Integer(4000))
        );
    }

    #[test]
    fn enforce_replaces_non_numeric_interval() {
        let mut set = OptionSet::new()
            .with(DEBUG_PROTECTION, true)
            .with(DEBUG_PROTECTION_INTERVAL, "soon");
        set.enforce_debug_protection();
        assert_eq!(
            set.get(DEBUG_PROTECTION_INTERVAL),
            Some(&OptionValue::Integer(1000))
        );
    }

    #[test]
    fn enforce_removes_interval_when_disabled() {
        let mut set = OptionSet::new()
            .with(DEBUG_PROTECTION, false)
            .with(DEBUG_PROTECTION_INTERVAL, 4000_i64);
        set.enforce_debug_protection();
        assert!(!set.contains_key(DEBUG_PROTECTION_INTERVAL));
        assert!(set.debug_protection_consistent());
    }

    #[test]
    fn enforce_removes_interval_when_flag_absent() {
        let mut set = OptionSet::new().with(DEBUG_PROTECTION_INTERVAL, 4000_i64);
        assert!(!set.debug_protection_consistent());
        set.enforce_debug_protection();
        assert!(set.is_empty());
    }

    #[test]
    fn json_payload_is_sorted_and_untagged() {
        let set = OptionSet::new()
            .with("stringArrayThreshold", 0.75)
            .with("compact", true)
            .with("stringArrayEncoding", &["base64", "rc4"][..])
            .with("splitStringsChunkLength", 10_i64)
            .with("identifierNamesGenerator", "mangled");
        assert_eq!(
            set.to_json().unwrap(),
            r#"{"compact":true,"identifierNamesGenerator":"mangled","splitStringsChunkLength":10,"stringArrayEncoding":["base64","rc4"],"stringArrayThreshold":0.75}"#
        );
    }

    #[test]
    fn deserializes_nested_tables() {
        let set: OptionSet =
            serde_json::from_str(r#"{"reservedNames":["^_"],"extra":{"depth":2,"on":true}}"#)
                .unwrap();
        let extra = match set.get("extra") {
            Some(OptionValue::Map(extra)) => extra.clone(),
            _ => OptionSet::new(),
        };
        assert_eq!(extra.get("depth"), Some(&OptionValue::Integer(2)));
        assert_eq!(extra.get_bool("on"), Some(true));
    }

    #[test]
    fn null_is_rejected() {
        assert!(serde_json::from_str::<OptionSet>(r#"{"compact":null}"#).is_err());
    }

    #[test]
    fn display_formats_each_variant() {
        assert_eq!(OptionValue::Bool(true).to_string(), "true");
        assert_eq!(OptionValue::Float(0.5).to_string(), "0.5");
        assert_eq!(OptionValue::Text("x".into()).to_string(), "\"x\"");
        assert_eq!(
            OptionValue::List(vec!["a".into(), "b".into()]).to_string(),
            "[a, b]"
        );
    }
}
