//! Strict JSON parsing with a single, narrowly scoped repair pass.
//!
//! Capture files are sometimes hand-edited or produced by generators that leave a dangling comma
//! before `]` or `}`. When strict parsing fails, those commas (and only those) are removed and the
//! document is parsed once more. Anything else is reported with the error from the first attempt.

use serde::de::DeserializeOwned;

use crate::foundation::error::{SpriteError, SpriteResult};

/// Parse `bytes` as JSON into `T`, retrying once after [`strip_trailing_commas`].
///
/// If the repair changes nothing, or the repaired text still fails, the error from the strict
/// attempt is returned.
pub fn parse_lenient<T: DeserializeOwned>(bytes: &[u8]) -> SpriteResult<T> {
    let original = match serde_json::from_slice::<T>(bytes) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let repaired = std::str::from_utf8(bytes)
        .ok()
        .and_then(strip_trailing_commas);
    let Some(repaired) = repaired else {
        return Err(SpriteError::document(original.to_string()));
    };

    match serde_json::from_str::<T>(&repaired) {
        Ok(value) => {
            tracing::debug!("parsed document after removing trailing commas");
            Ok(value)
        }
        Err(_) => Err(SpriteError::document(original.to_string())),
    }
}

/// Remove every comma that is followed, after optional JSON whitespace, by `]` or `}`.
///
/// Commas inside string literals are left alone. Returns `None` when no comma was removed.
pub fn strip_trailing_commas(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut changed = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            out.push(ch);
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            ',' if closes_next(&text[i + 1..]) => changed = true,
            _ => out.push(ch),
        }
    }

    changed.then_some(out)
}

fn closes_next(rest: &str) -> bool {
    matches!(
        rest.trim_start_matches([' ', '\t', '\n', '\r']).chars().next(),
        Some(']' | '}')
    )
}

#[cfg(test)]
#[path = "../../tests/unit/capture/lenient.rs"]
mod tests;
