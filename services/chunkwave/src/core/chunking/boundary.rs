//! Candidate split points per content type.
//!
//! Every strategy returns byte offsets that sit on line or token
//! starts, so they are always valid UTF-8 character boundaries.
//! The result is sorted, de-duplicated and always contains `0` and
//! `text.len()`.

use super::classifier::{ContentType, LOG_PREFIX};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;

/// Fallback for unparseable JSON: lines opening an object or array
static JSON_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[\{\[]").expect("valid regex"));

/// Level 2-4 headings; level 1 is a super-section, not a split point
static SECTION_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{2,4}[ \t]").expect("valid regex"));

static LOG_RECORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("(?m)^{LOG_PREFIX}")).expect("valid regex"));

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?m)^(?:(?:pub(?:\([^)]*\))?|public|private|protected|internal|static|export|default|async|unsafe|abstract|final|extern)\s+)*",
        r"(?:def|class|function|fn|interface|type|struct|enum|trait|impl|func|object|namespace)\b",
    ))
    .expect("valid regex")
});

/// Lines that belong to the declaration below them
static ATTACHED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:@\w|#\[|(?:pub|public|private|protected|static|export|async)\s*$)")
        .expect("valid regex")
});

/// One or more blank lines
static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(?:[ \t]*\r?\n)+").expect("valid regex"));

/// Find natural split points for `text` given its content type.
pub fn find_boundaries(text: &str, content_type: ContentType) -> Vec<usize> {
    let mut boundaries = BTreeSet::new();
    boundaries.insert(0);
    boundaries.insert(text.len());

    match content_type {
        ContentType::Json => match json_element_offsets(text) {
            Some(offsets) => boundaries.extend(offsets),
            None => {
                tracing::debug!("JSON parse failed, falling back to line patterns");
                boundaries.extend(JSON_LINE.find_iter(text).map(|m| m.start()));
            }
        },
        ContentType::Markdown => {
            boundaries.extend(SECTION_HEADING.find_iter(text).map(|m| m.start()));
        }
        ContentType::Log => {
            boundaries.extend(LOG_RECORD.find_iter(text).map(|m| m.start()));
        }
        ContentType::Code => {
            boundaries.extend(
                DECLARATION
                    .find_iter(text)
                    .map(|m| attach_preceding_lines(text, m.start())),
            );
        }
        ContentType::Text => {
            boundaries.extend(PARAGRAPH_BREAK.find_iter(text).map(|m| m.end()));
        }
    }

    boundaries.into_iter().collect()
}

/// Offsets of every top-level element after the first.
///
/// Returns `None` unless the whole text is a JSON array or object.
/// Offsets point at the first byte of an array element or at the
/// opening quote of an object key.
fn json_element_offsets(text: &str) -> Option<Vec<usize>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(_)) | Ok(Value::Object(_)) => {}
        _ => return None,
    }

    let mut offsets = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut after_separator = false;

    for (i, &b) in text.as_bytes().iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        if after_separator && !b.is_ascii_whitespace() {
            offsets.push(i);
            after_separator = false;
        }

        match b {
            b'"' => in_string = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 1 => after_separator = true,
            _ => {}
        }
    }

    Some(offsets)
}

/// Move a declaration boundary up over attribute, decorator and
/// modifier-only lines directly above it.
fn attach_preceding_lines(text: &str, mut line_start: usize) -> usize {
    while line_start > 0 {
        let prev_end = line_start - 1;
        let prev_start = text[..prev_end].rfind('\n').map_or(0, |p| p + 1);
        let line = text[prev_start..prev_end].trim_end_matches('\r');

        if !ATTACHED_LINE.is_match(line) {
            break;
        }
        line_start = prev_start;
    }
    line_start
}
