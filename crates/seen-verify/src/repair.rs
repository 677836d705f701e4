//! Best-effort recovery of a JSON object from model response text
//!
//! Models wrap JSON in prose or markdown fences and occasionally emit
//! near-valid output (trailing commas, raw newlines inside strings). The
//! recovery ladder: take the first-`{`-to-last-`}` span, try a strict parse,
//! then apply textual repairs and reparse. Failure here is an ordinary
//! parse-failure outcome for the retry loop, not a special case.

use anyhow::{anyhow, Result};
use serde_json::Value;

/// Extract and parse the JSON object embedded in raw model output.
pub fn extract_json_object(raw: &str) -> Result<Value> {
    let span = brace_span(raw).ok_or_else(|| anyhow!("no JSON object in response text"))?;

    match serde_json::from_str(span) {
        Ok(value) => Ok(value),
        Err(strict_err) => {
            let repaired = repair_json_text(span);
            serde_json::from_str(&repaired)
                .map_err(|_| anyhow!("JSON unparseable after repair: {}", strict_err))
        }
    }
}

/// Greedy brace span: first `{` through last `}`.
fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Textual repair passes, applied together in one scan plus a comma pass:
/// markdown fence markers are dropped, literal newlines inside quoted
/// strings are escaped, and trailing commas before `}`/`]` are removed.
/// Valid JSON passes through unchanged.
pub fn repair_json_text(text: &str) -> String {
    let defenced = strip_code_fences(text);
    let escaped = escape_newlines_in_strings(&defenced);
    strip_trailing_commas(&escaped)
}

fn strip_code_fences(text: &str) -> String {
    if !text.contains("```") {
        return text.to_string();
    }
    text.replace("```json", "").replace("```", "")
}

fn escape_newlines_in_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            match c {
                '\\' if !escaped => {
                    escaped = true;
                    out.push(c);
                    continue;
                }
                '"' if !escaped => in_string = false,
                '\n' => {
                    out.push_str("\\n");
                    escaped = false;
                    continue;
                }
                '\r' => {
                    escaped = false;
                    continue;
                }
                _ => {}
            }
            escaped = false;
            out.push(c);
        } else {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
        }
    }

    out
}

fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let chars: Vec<char> = text.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => {
                    in_string = false;
                    escaped = false;
                }
                _ => escaped = false,
            }
            out.push(c);
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                // Drop the comma when the next non-whitespace closes a scope.
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                match next {
                    Some('}') | Some(']') => {}
                    _ => out.push(c),
                }
            }
            _ => out.push(c),
        }
    }

    out
}
