//! Content-type detection.
//!
//! The tag picked here only selects a boundary strategy. It is a
//! heuristic over the leading text, not a format validator: anything
//! unrecognized is treated as plain text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content types that have their own boundary strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// A single JSON object or array literal
    Json,
    /// Heading-structured markdown
    Markdown,
    /// Log records with a bracketed ISO date prefix
    Log,
    /// Source code
    Code,
    /// Anything else
    Text,
}

impl ContentType {
    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            ContentType::Json => "JSON",
            ContentType::Markdown => "Markdown",
            ContentType::Log => "Log",
            ContentType::Code => "Code",
            ContentType::Text => "Plain Text",
        }
    }

    /// Short machine name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "json",
            ContentType::Markdown => "markdown",
            ContentType::Log => "log",
            ContentType::Code => "code",
            ContentType::Text => "text",
        }
    }

    /// File extension used when chunks are written to disk
    pub fn extension(&self) -> &'static str {
        match self {
            ContentType::Json => "json",
            ContentType::Markdown => "md",
            ContentType::Log => "log",
            ContentType::Code | ContentType::Text => "txt",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s").expect("valid regex"));

/// `[2024-01-15]`, `[2024-01-15 10:00:00]`, `[2024-01-15T10:00:00.123Z]`
pub(crate) const LOG_PREFIX: &str = r"\[\d{4}-\d{2}-\d{2}(?:[T ][0-9:.,+\-Z]*)?\]";

static LOG_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{LOG_PREFIX}")).expect("valid regex"));

static CODE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^(?:import|from|def|class|function|const|let|var|interface|type|struct|enum|trait|impl|fn|use|mod|package|func|namespace|module)\s+",
        r"^(?:public|private|protected|static|async|await|export|pub)[\s(]",
        r"^(?:if|for|while|switch|try|catch|return)\s*\(",
        r"^#(?:include|define|pragma)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Classify text by its leading content.
///
/// Decision order is fixed: JSON, markdown heading, log prefix,
/// code keyword, plain text.
pub fn classify(text: &str) -> ContentType {
    let trimmed = text.trim();

    if is_json_container(trimmed) {
        return ContentType::Json;
    }

    if HEADING.is_match(trimmed) {
        return ContentType::Markdown;
    }

    if LOG_LINE.is_match(trimmed) {
        return ContentType::Log;
    }

    if CODE_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
        return ContentType::Code;
    }

    ContentType::Text
}

/// Whole text parses as a JSON object or array
fn is_json_container(trimmed: &str) -> bool {
    // Cheap rejection before a full parse
    let delimited = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if !delimited {
        return false;
    }

    matches!(
        serde_json::from_str::<serde_json::Value>(trimmed),
        Ok(serde_json::Value::Object(_)) | Ok(serde_json::Value::Array(_))
    )
}
