//! Caller-supplied option override documents (`-c/--config`).
use std::path::Path;

use super::options::OptionSet;
use crate::error::ConfigError;

/// Load an override document into an [`OptionSet`].
///
/// Files with a `.toml` extension are parsed as a TOML table; anything else
/// is parsed as a JSON object. Unlike profiles, a broken override document
/// is an error: the caller asked for it explicitly.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::InvalidOverrides`] if it is not an object of option values.
pub fn load(path: &Path) -> Result<OptionSet, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    parse(&content, is_toml).map_err(|message| ConfigError::InvalidOverrides {
        file: path.display().to_string(),
        message,
    })
}

/// Parse override `content` as TOML or JSON.
///
/// TOML can spell `nan` and `inf`; those have no JSON form and are rejected.
fn parse(content: &str, is_toml: bool) -> Result<OptionSet, String> {
    let set: OptionSet = if is_toml {
        toml::from_str(content).map_err(|e| e.to_string())?
    } else {
        serde_json::from_str(content).map_err(|e| e.to_string())?
    };
    match set.non_finite_key() {
        Some(key) => Err(format!("{key} is not a finite number")),
        None => Ok(set),
    }
}
