// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with fuzzy match suggestions.
//!
//! Converts Figment deserialization errors into miette diagnostics with
//! source spans, valid key listings, and "did you mean?" hints based on
//! Jaro-Winkler similarity.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(wagate::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(wagate::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(wagate::config::missing_key),
        help("add `{key} = <value>` to your wagate.toml")
    )]
    MissingKey { key: String },

    /// A semantic validation failure.
    #[error("validation error: {message}")]
    #[diagnostic(code(wagate::config::validation))]
    Validation { message: String },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(wagate::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` (which may hold several errors) into diagnostics.
///
/// `toml_sources` are `(path, content)` pairs used to locate unknown keys.
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
                    let valid_keys: Vec<&str> = expected.to_vec();
                    let (span, src) = locate_key(&error, &path, field, toml_sources);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion: suggest_key(field, &valid_keys),
                        valid_keys: valid_keys.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: field.clone().into_owned(),
                },
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key: path.join("."),
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn locate_key(
    error: &figment::error::Error,
    path: &[String],
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    // Inline sources carry no file metadata; fall back to a single source.
    let source = match origin {
        Some(origin) => toml_sources.iter().find(|(p, _)| *p == origin),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };

    let Some((name, content)) = source else {
        return (None, None);
    };
    match find_key_offset(content, path, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(name, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field` inside the TOML section named by `path[0]`.
///
/// Matches both `[section]` and `[[section]]` headers. Top-level fields
/// are searched from the start of the document.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        None => 0,
        Some(section) => {
            let table = format!("[{section}]");
            let array = format!("[[{section}]]");
            content
                .find(&array)
                .map(|pos| pos + array.len())
                .or_else(|| content.find(&table).map(|pos| pos + table.len()))?
        }
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix(field) {
            if rest.starts_with([' ', '\t', '=']) {
                return Some(offset + (line.len() - trimmed.len()));
            }
        }
        offset += line.len();
    }
    None
}

/// Best valid key above the similarity threshold, if any.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics to stderr using miette's graphical handler.
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
