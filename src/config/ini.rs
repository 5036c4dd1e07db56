//! INI profile parsing: `[section]` headers with `key = value` entries.
use std::path::Path;

use crate::error::ConfigError;

/// Name of the section whose entries every other section inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// A `[header]` with its `key = value` entries.
///
/// Headers and keys preserve their original case. Entries keep file order;
/// when a key repeats, the later entry wins on lookup.
///
/// # Examples
///
/// ```
/// use jsobf_cli::config::ini::KvSection;
///
/// let section = KvSection {
///     header: "BALANCED".to_string(),
///     entries: vec![("compact".to_string(), "true".to_string())],
/// };
/// assert_eq!(section.get("COMPACT"), Some("true"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvSection {
    /// The section header without brackets (e.g. `"BALANCED"`).
    pub header: String,
    /// Key-value entries within this section.
    pub entries: Vec<(String, String)>,
}

impl KvSection {
    /// Look up `key` ASCII-case-insensitively; the last matching entry wins.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// A parsed profile source: the `[DEFAULT]` entries plus named sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    defaults: Vec<(String, String)>,
    sections: Vec<KvSection>,
}

impl IniDocument {
    /// Names of the non-default sections, in file order.
    #[must_use]
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.header.as_str()).collect()
    }

    /// Resolve a section with `[DEFAULT]` entries inherited.
    ///
    /// Section entries come after the inherited ones, so they win on
    /// lookup. Requesting [`DEFAULT_SECTION`] yields the default entries
    /// alone. Returns `None` for an unknown section.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<KvSection> {
        let own = if name == DEFAULT_SECTION {
            Vec::new()
        } else {
            self.sections
                .iter()
                .find(|s| s.header == name)?
                .entries
                .clone()
        };
        let mut entries = self.defaults.clone();
        entries.extend(own);
        Some(KvSection {
            header: name.to_string(),
            entries,
        })
    }
}

/// Parse a profile file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::InvalidSyntax`] if it cannot be parsed.
pub fn parse_kv_sections(path: &Path) -> Result<IniDocument, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_kv_sections_from_str(&content, &path.display().to_string())
}

/// Parse profile content from a string.
///
/// `source` names the content in error messages.
///
/// # Examples
///
/// ```
/// use jsobf_cli::config::ini::parse_kv_sections_from_str;
///
/// let doc = parse_kv_sections_from_str(
///     "[DEFAULT]\ncompact = true\n\n[MINIMAL]\nstringArray: false ; off\n",
///     "profiles.ini",
/// ).unwrap();
/// assert_eq!(doc.section_names(), ["MINIMAL"]);
///
/// let minimal = doc.section("MINIMAL").unwrap();
/// assert_eq!(minimal.get("compact"), Some("true"));
/// assert_eq!(minimal.get("stringArray"), Some("false"));
/// ```
///
/// # Errors
///
/// Returns [`ConfigError::InvalidSyntax`] if:
/// - A line is neither a header nor a `key = value` / `key: value` pair
/// - An entry appears outside of a section header
pub fn parse_kv_sections_from_str(content: &str, source: &str) -> Result<IniDocument, ConfigError> {
    let syntax_error = |message: String| ConfigError::InvalidSyntax {
        file: source.to_string(),
        message,
    };

    let mut doc = IniDocument::default();
    let mut current: Option<KvSection> = None;

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if let Some(header) = parse_raw_header(trimmed) {
            if let Some(section) = current.take() {
                doc.push(section);
            }
            current = Some(KvSection {
                header,
                entries: Vec::new(),
            });
        } else if let Some(ref mut section) = current {
            let Some(entry) = parse_kv_line(trimmed) else {
                return Err(syntax_error(format!(
                    "invalid key-value pair at line {}: {}",
                    line_num + 1,
                    trimmed
                )));
            };
            section.entries.push(entry);
        } else {
            return Err(syntax_error(format!(
                "entry outside of section at line {}: {}",
                line_num + 1,
                trimmed
            )));
        }
    }

    if let Some(section) = current {
        doc.push(section);
    }

    Ok(doc)
}

impl IniDocument {
    /// Add a parsed section; a repeated header extends the earlier one.
    fn push(&mut self, section: KvSection) {
        if section.header == DEFAULT_SECTION {
            self.defaults.extend(section.entries);
        } else if let Some(existing) = self
            .sections
            .iter_mut()
            .find(|s| s.header == section.header)
        {
            existing.entries.extend(section.entries);
        } else {
            self.sections.push(section);
        }
    }
}

/// Parse a `[header]` line preserving original case.
fn parse_raw_header(line: &str) -> Option<String> {
    let inner = line.trim().strip_prefix('[')?.strip_suffix(']')?;
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

/// Parse a `key = value` or `key: value` line, stripping inline comments.
///
/// The first `=` or `:` separates key from value, so either may appear in
/// the value.
///
/// # Examples
///
/// - `"compact = true # keep"` → `("compact", "true")`
/// - `"stringArrayEncoding: rc4,base64"` → `("stringArrayEncoding", "rc4,base64")`
fn parse_kv_line(line: &str) -> Option<(String, String)> {
    let idx = line.find(['=', ':'])?;
    let key = line.get(..idx)?.trim();
    let value = line.get(idx + 1..)?.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), strip_inline_comment(value).to_string()))
}

/// Strip inline comments (`#` or `;` preceded by whitespace) from a value.
fn strip_inline_comment(value: &str) -> &str {
    [" #", "\t#", " ;", "\t;"]
        .iter()
        .filter_map(|marker| value.find(marker))
        .min()
        .map_or(value, |idx| value.get(..idx).unwrap_or(value).trim_end())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn parse(content: &str) -> IniDocument {
        parse_kv_sections_from_str(content, "test.ini").expect("test data should parse")
    }

    #[test]
    fn parse_kv_simple() {
        let doc = parse("[BALANCED]\ncompact = true\nstringArrayThreshold = 0.75\n");
        assert_eq!(doc.section_names(), vec!["BALANCED"]);
        assert_eq!(
            doc.section("BALANCED").expect("section should exist").entries,
            vec![
                ("compact".to_string(), "true".to_string()),
                ("stringArrayThreshold".to_string(), "0.75".to_string()),
            ]
        );
    }

    #[test]
    fn parse_kv_colon_separator() {
        let doc = parse("[s]\nidentifierNamesGenerator: mangled\n");
        let section = doc.section("s").expect("section should exist");
        assert_eq!(section.get("identifierNamesGenerator"), Some("mangled"));
    }

    #[test]
    fn parse_kv_first_separator_wins() {
        let doc = parse("[s]\nkey = val=ue:x\nother: a=b\n");
        let section = doc.section("s").expect("section should exist");
        assert_eq!(section.get("key"), Some("val=ue:x"));
        assert_eq!(section.get("other"), Some("a=b"));
    }

    #[test]
    fn parse_kv_preserves_header_case() {
        let doc = parse("[Aggressive]\ncompact = true\n");
        assert!(doc.section("Aggressive").is_some());
        assert!(doc.section("AGGRESSIVE").is_none());
    }

    #[test]
    fn parse_kv_strips_inline_comments() {
        let doc = parse("[s]\na = one # note\nb = two ; note\nc = #hex\n");
        let section = doc.section("s").expect("section should exist");
        assert_eq!(section.get("a"), Some("one"));
        assert_eq!(section.get("b"), Some("two"));
        // No whitespace before the marker: part of the value
        assert_eq!(section.get("c"), Some("#hex"));
    }

    #[test]
    fn full_line_comments_ignored() {
        let doc = parse("# header\n; also a comment\n[s]\n# inside\na = 1\n");
        assert_eq!(doc.section("s").expect("section").entries.len(), 1);
    }

    #[test]
    fn later_duplicate_key_wins() {
        let doc = parse("[s]\ncompact = true\ncompact = false\n");
        assert_eq!(doc.section("s").expect("section").get("compact"), Some("false"));
    }

    #[test]
    fn repeated_section_header_extends() {
        let doc = parse("[s]\na = 1\n[t]\nb = 2\n[s]\na = 3\n");
        assert_eq!(doc.section_names(), vec!["s", "t"]);
        assert_eq!(doc.section("s").expect("section").get("a"), Some("3"));
    }

    #[test]
    fn key_lookup_is_case_insensitive() {
        let doc = parse("[s]\nstringarraythreshold = 0.5\n");
        let section = doc.section("s").expect("section");
        assert_eq!(section.get("stringArrayThreshold"), Some("0.5"));
    }

    // -----------------------------------------------------------------------
    // [DEFAULT] inheritance
    // -----------------------------------------------------------------------

    #[test]
    fn default_entries_are_inherited() {
        let doc = parse("[DEFAULT]\ncompact = true\nlog = false\n[MINIMAL]\nlog = true\n");
        let minimal = doc.section("MINIMAL").expect("section");
        assert_eq!(minimal.get("compact"), Some("true"));
        assert_eq!(minimal.get("log"), Some("true"));
    }

    #[test]
    fn default_section_is_requestable_but_not_listed() {
        let doc = parse("[DEFAULT]\ncompact = false\n[MINIMAL]\n");
        assert_eq!(doc.section_names(), vec!["MINIMAL"]);
        let defaults = doc.section(DEFAULT_SECTION).expect("default section");
        assert_eq!(defaults.get("compact"), Some("false"));
    }

    #[test]
    fn default_section_exists_even_when_not_written() {
        let doc = parse("[MINIMAL]\ncompact = false\n");
        let defaults = doc.section(DEFAULT_SECTION).expect("default section");
        assert!(defaults.entries.is_empty());
    }

    #[test]
    fn unknown_section_is_none() {
        let doc = parse("[MINIMAL]\n");
        assert!(doc.section("STRICT").is_none());
    }

    // -----------------------------------------------------------------------
    // Syntax errors
    // -----------------------------------------------------------------------

    #[test]
    fn entry_outside_section_fails() {
        let err = parse_kv_sections_from_str("compact = true\n", "p.ini").unwrap_err();
        assert!(
            err.to_string().contains("entry outside of section at line 1"),
            "{err}"
        );
    }

    #[test]
    fn line_without_separator_fails() {
        let err = parse_kv_sections_from_str("[s]\njust some words\n", "p.ini").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSyntax { .. }));
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn empty_key_fails() {
        assert!(parse_kv_sections_from_str("[s]\n= value\n", "p.ini").is_err());
    }

    #[test]
    fn empty_input_returns_empty_document() {
        let doc = parse("");
        assert!(doc.section_names().is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = parse_kv_sections(&dir.path().join("absent.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn strip_inline_comment_no_comment() {
        assert_eq!(strip_inline_comment("value"), "value");
    }

    #[test]
    fn strip_inline_comment_picks_earliest_marker() {
        assert_eq!(strip_inline_comment("v ; a # b"), "v");
    }
}
