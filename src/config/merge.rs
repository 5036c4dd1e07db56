//! Layering of option sets.
use super::options::{OptionSet, OptionValue};

/// Merge `overrides` on top of `base`, returning a new set.
///
/// Nested tables are merged key by key; any other value in `overrides`
/// replaces the base value wholesale (lists are not concatenated). Keys
/// only present in `base` are kept. The debug-protection invariant is
/// re-applied to the result, so an override of `debugProtection = false`
/// also drops an inherited interval.
///
/// # Examples
///
/// ```
/// use jsobf_cli::config::merge::merge;
/// use jsobf_cli::config::options::OptionSet;
///
/// let base = OptionSet::new().with("compact", true).with("log", false);
/// let over = OptionSet::new().with("log", true);
/// let merged = merge(&base, &over);
/// assert_eq!(merged.get_bool("compact"), Some(true));
/// assert_eq!(merged.get_bool("log"), Some(true));
/// ```
#[must_use]
pub fn merge(base: &OptionSet, overrides: &OptionSet) -> OptionSet {
    let mut merged = merge_tables(base, overrides);
    merged.enforce_debug_protection();
    merged
}

fn merge_tables(base: &OptionSet, overrides: &OptionSet) -> OptionSet {
    let mut merged = base.clone();
    for (key, value) in overrides {
        let next = match (merged.get(key), value) {
            (Some(OptionValue::Map(inner)), OptionValue::Map(over)) => {
                OptionValue::Map(merge_tables(inner, over))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}
