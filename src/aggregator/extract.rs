//! Best-effort recovery of JSON sections embedded in free-form text
//!
//! Model replies often wrap structured data in prose or code fences. A
//! section is located by the first mention of its name; balanced `{...}` or
//! `[...]` blocks after that mention are tried in order until one parses as
//! JSON (and, for typed extraction, as the requested type). Nothing here
//! fails loudly: the caller gets `None` and falls back to an empty section.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::PlannerError;

/// Blocks tried per section before giving up
const MAX_CANDIDATES: usize = 8;

/// Byte offset just past the first mention of `name`, preferring quoted
/// mentions (`"name"` or `'name'`) over bare ones.
fn mention_end(text: &str, name: &str) -> Option<usize> {
    let quoted = [format!("\"{name}\""), format!("'{name}'")]
        .iter()
        .filter_map(|needle| text.find(needle.as_str()).map(|at| at + needle.len()))
        .min();
    quoted.or_else(|| text.find(name).map(|at| at + name.len()))
}

enum Scan {
    /// Byte range of a balanced block, closer included
    Balanced(usize, usize),
    /// A closer that does not match its opener, at this offset
    Mismatch(usize),
    /// Text ended inside a block
    Unterminated,
}

/// Scan the first object or array starting at or after `from`. Brackets
/// inside JSON strings are ignored.
fn scan_block(text: &str, from: usize) -> Option<Scan> {
    let tail = text.get(from..)?;
    let start = from + tail.find(['{', '['])?;

    let mut expected: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => expected.push('}'),
            '[' => expected.push(']'),
            '}' | ']' => {
                if expected.pop() != Some(ch) {
                    return Some(Scan::Mismatch(start + offset));
                }
                if expected.is_empty() {
                    return Some(Scan::Balanced(start, start + offset));
                }
            }
            _ => {}
        }
    }
    Some(Scan::Unterminated)
}

/// An object wrapping the whole reply as `{"name": ...}` yields the inner value
fn unwrap_section(value: Value, name: &str) -> Value {
    match value {
        Value::Object(mut map) => match map.remove(name) {
            Some(inner) => inner,
            None => Value::Object(map),
        },
        other => other,
    }
}

/// Valid JSON blocks following the mention of `name`, in text order
fn candidates<'a>(text: &'a str, name: &'a str) -> impl Iterator<Item = Value> + 'a {
    let mut from = mention_end(text, name);
    let mut scanned = 0;
    std::iter::from_fn(move || {
        while scanned < MAX_CANDIDATES {
            scanned += 1;
            match scan_block(text, from?)? {
                Scan::Balanced(start, end) => {
                    from = Some(end + 1);
                    match serde_json::from_str(&text[start..=end]) {
                        Ok(value) => return Some(unwrap_section(value, name)),
                        Err(err) => {
                            debug!(section = name, error = %err, "Embedded block is not valid JSON");
                        }
                    }
                }
                Scan::Mismatch(at) => from = Some(at + 1),
                Scan::Unterminated => return None,
            }
        }
        None
    })
}

/// Extract the value of section `name` from `text`: the first valid JSON
/// block after its mention.
///
/// If the block is an object that itself contains `name` as a key (the
/// whole reply was `{"name": ...}`), the inner value is returned.
#[must_use]
pub fn extract_section(text: &str, name: &str) -> Option<Value> {
    candidates(text, name).next()
}

/// Deserialize section `name`, skipping blocks of another shape
pub fn try_extract<T: DeserializeOwned>(text: &str, name: &str) -> crate::Result<T> {
    let mut last_error = None;
    for value in candidates(text, name) {
        match serde_json::from_value(value) {
            Ok(parsed) => return Ok(parsed),
            Err(err) => last_error = Some(err.to_string()),
        }
    }
    Err(PlannerError::extraction(
        name,
        last_error.unwrap_or_else(|| "no JSON block found".to_string()),
    ))
}

/// [`try_extract`] for callers that fall back to a default section
#[must_use]
pub fn extract_as<T: DeserializeOwned>(text: &str, name: &str) -> Option<T> {
    match try_extract(text, name) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            debug!(error = %err, "Falling back to an empty section");
            None
        }
    }
}
