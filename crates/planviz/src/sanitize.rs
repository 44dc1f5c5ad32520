//! Text-safety transforms applied while emitting DOT documents.
//!
//! Pure functions for turning external issue ids into DOT identifiers,
//! escaping free text for HTML-like labels and quoted attribute values, and
//! normalizing category colors to the six-digit `#rrggbb` form.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Accepted color literals: `#rgb` or `#rrggbb`, hex digits in either case.
static COLOR_REGEX: OnceLock<Regex> = OnceLock::new();

fn color_regex() -> &'static Regex {
    COLOR_REGEX.get_or_init(|| {
        Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("Color regex should compile")
    })
}

/// DOT keywords, matched case-insensitively; they cannot be used as bare IDs.
const DOT_KEYWORDS: [&str; 6] = ["node", "edge", "graph", "digraph", "subgraph", "strict"];

/// A color literal that is neither `#rgb` nor `#rrggbb`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid color literal '{value}': expected '#rgb' or '#rrggbb'")]
pub struct ColorError {
    pub value: String,
}

/// Derive a DOT identifier from an external issue id.
///
/// A leading digit gets an underscore prefix, then every character outside
/// `[A-Za-z0-9_]` becomes an underscore.
///
/// # Examples
///
/// ```
/// use planviz::sanitize::identifier_for;
///
/// assert_eq!(identifier_for("XYZ-1"), "XYZ_1");
/// assert_eq!(identifier_for("42"), "_42");
/// ```
pub fn identifier_for(external_id: &str) -> String {
    let mut identifier = String::with_capacity(external_id.len() + 1);
    if external_id.is_empty() || external_id.starts_with(|c: char| c.is_ascii_digit()) {
        identifier.push('_');
    }
    identifier.extend(external_id.chars().map(|c| {
        if c.is_ascii_alphanumeric() || c == '_' {
            c
        } else {
            '_'
        }
    }));
    identifier
}

/// Whether `identifier` is a DOT keyword and so cannot name a node.
///
/// # Examples
///
/// ```
/// use planviz::sanitize::{identifier_for, is_reserved_identifier};
///
/// assert!(is_reserved_identifier(&identifier_for("Node")));
/// assert!(!is_reserved_identifier(&identifier_for("node-1")));
/// ```
pub fn is_reserved_identifier(identifier: &str) -> bool {
    DOT_KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(identifier))
}

/// Escape text for a double-quoted DOT attribute value.
///
/// Backslashes are doubled first, so a trailing `\` can never escape the
/// closing quote.
pub fn escape_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape text for embedding in an HTML-like DOT label.
///
/// Only `& < > " '` are replaced; everything else is copied verbatim.
pub fn escape_for_label(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Normalize a `#rgb` or `#rrggbb` color literal to `#rrggbb`.
///
/// # Examples
///
/// ```
/// use planviz::sanitize::normalize_color;
///
/// assert_eq!(normalize_color("#abc").unwrap(), "#aabbcc");
/// assert_eq!(normalize_color("#A0B1C2").unwrap(), "#A0B1C2");
/// assert!(normalize_color("#12").is_err());
/// ```
pub fn normalize_color(color: &str) -> Result<String, ColorError> {
    if !color_regex().is_match(color) {
        return Err(ColorError {
            value: color.to_string(),
        });
    }

    if color.len() == 4 {
        let mut expanded = String::with_capacity(7);
        expanded.push('#');
        for c in color[1..].chars() {
            expanded.push(c);
            expanded.push(c);
        }
        Ok(expanded)
    } else {
        Ok(color.to_string())
    }
}
