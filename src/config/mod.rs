//! Option configuration: defaults, INI profiles, override documents and
//! the layering rules that combine them.
//!
//! Precedence, lowest first: [`schema`] defaults, the selected
//! [`profile`] section, then the [`overrides`] document. Per-file policies
//! (see [`crate::policy`]) are applied on top of the merged result.

pub mod ini;
pub mod merge;
pub mod options;
pub mod overrides;
pub mod profile;
pub mod schema;

use std::path::Path;

use crate::error::ConfigError;
use crate::logging::Log;
use options::OptionSet;
use profile::ProfileStore;
use schema::Schema;

/// Resolve the base options for a run.
///
/// Loads `section` from the optional `profile` (falling back to defaults
/// with a warning when that fails) and merges the optional `overrides`
/// document on top.
///
/// # Errors
///
/// Returns an error if the override document cannot be read or parsed.
pub fn base_options(
    schema: &Schema,
    profile: Option<&Path>,
    section: &str,
    overrides: Option<&Path>,
    log: &dyn Log,
) -> Result<OptionSet, ConfigError> {
    let from_profile = ProfileStore::new(schema).load(profile, section, log);
    match overrides {
        Some(path) => {
            let doc = overrides::load(path)?;
            log.info(&format!(
                "applied {} override(s) from {}",
                doc.len(),
                path.display()
            ));
            Ok(merge::merge(&from_profile, &doc))
        }
        None => Ok(from_profile),
    }
}
