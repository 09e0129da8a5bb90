//! HTML escaping, legacy SQL literals, and typed SQL parameters.
//!
//! `sql_literal` reproduces the string-concatenation contract of older form
//! code (numbers bare, everything else single-quoted with backslash
//! escapes). New persistence code should bind [`SqlParam`]s instead.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
        .expect("static pattern")
});

/// Escapes `& < > " '` for inclusion in HTML text or attribute values.
#[must_use]
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// True if `s` is a plain decimal number (optional sign, fraction, exponent).
#[must_use]
pub fn is_numeric(s: &str) -> bool {
    NUMERIC_RE.is_match(s.trim())
}

/// Backslash-escapes quotes, backslashes and NUL.
#[must_use]
pub fn add_slashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '\'' | '"' => {
                out.push('\\');
                out.push(c);
            }
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out
}

/// Single-quotes a string for SQL.
#[must_use]
pub fn sql_quote(s: &str) -> String {
    format!("'{}'", add_slashes(s))
}

/// Renders a value as a SQL literal: numbers unquoted, anything else quoted.
#[must_use]
pub fn sql_literal(s: &str) -> String {
    match SqlParam::from_text(s) {
        SqlParam::Int(i) => i.to_string(),
        SqlParam::Float(f) => f.to_string(),
        _ => sql_quote(s),
    }
}

/// A typed value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlParam {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlParam {
    /// Classifies a string the way [`sql_literal`] does.
    #[must_use]
    pub fn from_text(s: &str) -> Self {
        let trimmed = s.trim();
        if is_numeric(trimmed) {
            if let Ok(i) = trimmed.trim_start_matches('+').parse::<i64>() {
                return Self::Int(i);
            }
            if let Ok(f) = trimmed.parse::<f64>() {
                if f.is_finite() {
                    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
                    if f.fract() == 0.0 && f.abs() < 9.0e15 {
                        return Self::Int(f as i64);
                    }
                    return Self::Float(f);
                }
            }
        }
        Self::Text(s.to_string())
    }

    /// Legacy literal form of this parameter.
    #[must_use]
    pub fn to_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => sql_quote(s),
        }
    }

    /// String form used when a stored value is read back as a submission.
    #[must_use]
    pub fn to_submitted_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Text(s) => Some(s.clone()),
        }
    }
}

impl fmt::Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

/// Backtick-quotes a column or table identifier.
#[must_use]
pub fn sql_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
