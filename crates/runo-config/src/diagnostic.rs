// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with fuzzy match suggestions.
//!
//! Turns Figment extraction errors into miette diagnostics carrying the
//! offending key, the keys valid at that point, and a Jaro-Winkler
//! "did you mean?" suggestion.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
/// Catches typos like `watchdog_timout_ms` and `tick_interval` while filtering noise.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}` in {section}")]
    #[diagnostic(
        code(runo::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// Dotted section the key was found in, or `top level`.
        section: String,
        /// Suggested correction via fuzzy matching, if any.
        suggestion: Option<String>,
        /// Comma-separated keys valid in the section.
        valid_keys: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid value for `{key}`: found {found}")]
    #[diagnostic(code(runo::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
    },

    /// A required configuration key is missing (e.g. `code` in a stage rule).
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(runo::config::missing_key),
        help("add `{key} = <value>` to your runo.toml")
    )]
    MissingKey { key: String },

    /// A semantic validation failure.
    #[error("validation error: {message}")]
    #[diagnostic(code(runo::config::validation))]
    Validation { message: String },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(runo::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` (which may hold several errors) into diagnostics.
///
/// `toml_sources` pairs a file path with its contents so unknown keys can be
/// pointed at in the source.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let section = section_path(&path, field);
                    let (span, src) = locate(&error, &section, field, toml_sources);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        section: if section.is_empty() {
                            "top level".to_string()
                        } else {
                            section.join(".")
                        },
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: dotted(&path, field),
                },
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key: path.join("."),
                    found: actual.to_string(),
                    expected: expected.to_string(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Figment reports the path including the offending key for some errors;
/// strip it so only the enclosing section remains.
fn section_path(path: &[String], field: &str) -> Vec<String> {
    match path.split_last() {
        Some((last, rest)) if last == field => rest.to_vec(),
        _ => path.to_vec(),
    }
}

fn dotted(path: &[String], field: &str) -> String {
    let mut parts = section_path(path, field);
    parts.push(field.to_string());
    parts.join(".")
}

fn locate(
    error: &figment::error::Error,
    section: &[String],
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let found = file.and_then(|file| toml_sources.iter().find(|(p, _)| *p == file));
    let Some((path, content)) = found else {
        return (None, None);
    };

    match find_key_offset(content, section, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(path, content.clone())),
        ),
        None => (None, None),
    }
}

/// Find the byte offset of `field` inside the given section of TOML `content`.
///
/// Numeric path segments (array indices) are skipped, so a key inside
/// `[[follow_up.stages]]` is found under the `follow_up.stages` header. Top-level
/// keys are searched from the start of the document.
pub fn find_key_offset(content: &str, section: &[String], field: &str) -> Option<usize> {
    let named: Vec<&str> = section
        .iter()
        .map(String::as_str)
        .filter(|s| s.parse::<usize>().is_err())
        .collect();

    let start = if named.is_empty() {
        0
    } else {
        let name = named.join(".");
        [format!("[{name}]"), format!("[[{name}]]")]
            .iter()
            .filter_map(|header| content.find(header.as_str()).map(|pos| pos + header.len()))
            .min()?
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix(field) {
            if rest.trim_start().starts_with('=') {
                return Some(offset + (line.len() - trimmed.len()));
            }
        }
        offset += line.len();
    }

    None
}

/// Suggest a similar key name using Jaro-Winkler string similarity.
///
/// Returns the best match above the similarity threshold, if any.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|&key| (key, strsim::jaro_winkler(unknown, key)))
        .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key.to_string())
}

/// Render a list of `ConfigError`s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_watchdog_timeout_for_typo() {
        let valid = &["watchdog_timeout_ms", "tick_interval_ms", "match_policy"];
        assert_eq!(
            suggest_key("watchdog_timout_ms", valid),
            Some("watchdog_timeout_ms".to_string())
        );
    }

    #[test]
    fn suggests_tick_interval_for_missing_suffix() {
        let valid = &["watchdog_timeout_ms", "tick_interval_ms", "match_policy"];
        assert_eq!(
            suggest_key("tick_interval", valid),
            Some("tick_interval_ms".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["enabled"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn finds_key_in_section() {
        let content = "[session]\ntick_intervl = 250\n";
        let section = vec!["session".to_string()];
        let o = find_key_offset(content, &section, "tick_intervl").unwrap();
        assert_eq!(&content[o..o + 12], "tick_intervl");
    }

    #[test]
    fn finds_key_in_array_of_tables() {
        let content = "[follow_up]\ndefault_hours = 24\n\n[[follow_up.stages]]\ncode = \"Hot\"\nmax_dayz = 3\n";
        let section = vec!["follow_up".to_string(), "stages".to_string(), "0".to_string()];
        let o = find_key_offset(content, &section, "max_dayz").unwrap();
        assert_eq!(&content[o..o + 8], "max_dayz");
    }

    #[test]
    fn missing_section_yields_no_offset() {
        let content = "[logging]\nlevel = \"info\"\n";
        let section = vec!["session".to_string()];
        assert!(find_key_offset(content, &section, "level").is_none());
    }

    #[test]
    fn section_path_drops_trailing_field() {
        let path = vec!["session".to_string(), "tick".to_string()];
        assert_eq!(section_path(&path, "tick"), vec!["session".to_string()]);
        assert_eq!(dotted(&path, "tick"), "session.tick");
    }
}
