//! Named option profiles read from INI sources.
use std::path::Path;

use super::ini::{self, IniDocument};
use super::options::{OptionSet, OptionValue};
use super::schema::{Schema, coerce};
use crate::error::ConfigError;
use crate::logging::Log;

/// Loads a named section of an INI profile into a typed [`OptionSet`].
///
/// Loading never fails: an absent, unreadable or malformed source, or a
/// missing section, produces the schema defaults plus a warning. Within a
/// section, each schema key is coerced to the type of its default; a value
/// that cannot be coerced falls back to the default for that key only.
#[derive(Debug, Clone, Copy)]
pub struct ProfileStore<'a> {
    schema: &'a Schema,
}

impl<'a> ProfileStore<'a> {
    /// Create a store typed by `schema`.
    #[must_use]
    pub const fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Load `section` from the INI file at `source`.
    ///
    /// `None` or an empty path means no profile was given and yields the
    /// defaults.
    pub fn load(&self, source: Option<&Path>, section: &str, log: &dyn Log) -> OptionSet {
        let Some(path) = source.filter(|p| !p.as_os_str().is_empty()) else {
            log.debug("no profile given, using built-in defaults");
            return self.schema.defaults();
        };
        self.resolve(ini::parse_kv_sections(path), section, log)
    }

    /// Load `section` from in-memory INI `content`.
    pub fn load_from_str(&self, content: &str, section: &str, log: &dyn Log) -> OptionSet {
        self.resolve(
            ini::parse_kv_sections_from_str(content, "<memory>"),
            section,
            log,
        )
    }

    fn resolve(
        &self,
        parsed: Result<IniDocument, ConfigError>,
        section: &str,
        log: &dyn Log,
    ) -> OptionSet {
        let doc = match parsed {
            Ok(doc) => doc,
            Err(e) => {
                log.warn(&format!("{e}; using built-in defaults"));
                return self.schema.defaults();
            }
        };

        let Some(entries) = doc.section(section) else {
            let err = ConfigError::MissingSection {
                section: section.to_string(),
                available: doc.section_names().join(", "),
            };
            log.warn(&format!("{err}; using built-in defaults"));
            return self.schema.defaults();
        };

        let mut options = OptionSet::new();
        for (key, default) in self.schema.entries() {
            let value = match entries.get(key) {
                Some(raw) => coerce(default, raw).unwrap_or_else(|| {
                    log.warn(&format!(
                        "[{section}] {key} = {raw:?} is not a valid {}, using default {default}",
                        type_name(default)
                    ));
                    default.clone()
                }),
                None => default.clone(),
            };
            options.insert(key, value);
        }
        options.enforce_debug_protection();

        log.info(&format!("loaded profile section [{section}]"));
        options
    }
}

const fn type_name(value: &OptionValue) -> &'static str {
    match value {
        OptionValue::Bool(_) => "boolean",
        OptionValue::Integer(_) => "integer",
        OptionValue::Float(_) => "number",
        OptionValue::Text(_) => "string",
        OptionValue::List(_) => "list",
        OptionValue::Map(_) => "table",
    }
}
