//! Per-sprite transform corrections.
//!
//! An override maps a raw transform label to a replacement label for one sprite, selected either
//! by sprite id or by content hash. A small built-in table ships with the crate; an external JSON
//! file can be merged on top of it.
//!
//! Override file format (a JSON array, trailing commas tolerated):
//!
//! ```json
//! [
//!   { "sprite_id": 4101, "MIRROR_ROTATE_90": "MIRROR_ROTATE_270" },
//!   { "sprite_hash": "9f86d0...", "flip_h": "none" }
//! ]
//! ```
//!
//! Every key other than `sprite_id` / `sprite_hash` is a `FROM -> TO` pair; both sides are
//! uppercased.

use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

use anyhow::Context as _;

use crate::{
    capture::lenient::parse_lenient,
    foundation::error::{SpriteError, SpriteResult},
};

const SPRITE_ID_KEY: &str = "sprite_id";
const SPRITE_HASH_KEY: &str = "sprite_hash";

/// What an override entry applies to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Selector {
    /// Stringified sprite id.
    ById(String),
    /// Lowercase content hash.
    ByHash(String),
}

impl Selector {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::ById(id.into())
    }

    pub fn by_hash(hash: impl AsRef<str>) -> Self {
        Self::ByHash(hash.as_ref().to_ascii_lowercase())
    }
}

struct BuiltinOverride {
    sprite_id: &'static str,
    replacements: &'static [(&'static str, &'static str)],
}

/// Weapon sprites whose `MIRROR_ROTATE_180` must stay a vertical mirror regardless of how the
/// generic label is interpreted.
const BUILTIN_OVERRIDES: &[BuiltinOverride] = &[
    BuiltinOverride {
        sprite_id: "1187",
        replacements: &[("MIRROR_ROTATE_180", "FLIP_V")],
    },
    BuiltinOverride {
        sprite_id: "1188",
        replacements: &[("MIRROR_ROTATE_180", "FLIP_V")],
    },
];

/// Immutable-after-construction override rules.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverrideTable {
    rules: HashMap<Selector, BTreeMap<String, String>>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table shipped with the crate.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for entry in BUILTIN_OVERRIDES {
            for (from, to) in entry.replacements {
                table.insert(Selector::by_id(entry.sprite_id), from, to);
            }
        }
        table
    }

    /// Parse an override file. Entries naming the same selector merge label by label; the later
    /// entry wins a conflicting label.
    pub fn from_json_slice(bytes: &[u8]) -> SpriteResult<Self> {
        let entries: Vec<serde_json::Map<String, serde_json::Value>> = parse_lenient(bytes)?;
        let mut table = Self::new();
        for (idx, entry) in entries.iter().enumerate() {
            let selector = selector_of(idx, entry)?;
            let mut pairs = 0usize;
            for (from, to) in entry {
                if from == SPRITE_ID_KEY || from == SPRITE_HASH_KEY {
                    continue;
                }
                let serde_json::Value::String(to) = to else {
                    return Err(SpriteError::validation(format!(
                        "override entry {idx}: replacement for '{from}' must be a string"
                    )));
                };
                table.insert(selector.clone(), from, to);
                pairs += 1;
            }
            if pairs == 0 {
                return Err(SpriteError::validation(format!(
                    "override entry {idx} has no replacement pairs"
                )));
            }
        }
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> SpriteResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read transform overrides '{}'", path.display()))?;
        Self::from_json_slice(&bytes)
    }

    /// Add or replace one rule; labels are uppercased.
    pub fn insert(&mut self, selector: Selector, from: &str, to: &str) {
        self.rules
            .entry(selector)
            .or_default()
            .insert(normalize_label(from), normalize_label(to));
    }

    /// Merge `other` into `self`; on conflicting labels `other` wins.
    pub fn merge(&mut self, other: &OverrideTable) {
        for (selector, labels) in &other.rules {
            let slot = self.rules.entry(selector.clone()).or_default();
            for (from, to) in labels {
                slot.insert(from.clone(), to.clone());
            }
        }
    }

    /// Built-in rules with `external` merged on top.
    pub fn effective(external: Option<&OverrideTable>) -> Self {
        let mut table = Self::builtin();
        if let Some(external) = external {
            table.merge(external);
        }
        table
    }

    /// Replacement for an already-normalized `label` under `selector`.
    pub fn lookup(&self, selector: &Selector, label: &str) -> Option<&str> {
        self.rules
            .get(selector)
            .and_then(|labels| labels.get(label))
            .map(String::as_str)
    }

    /// Number of selectors with at least one rule.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().to_ascii_uppercase()
}

fn selector_of(
    idx: usize,
    entry: &serde_json::Map<String, serde_json::Value>,
) -> SpriteResult<Selector> {
    match entry.get(SPRITE_ID_KEY) {
        Some(serde_json::Value::Number(n)) => return Ok(Selector::by_id(n.to_string())),
        Some(serde_json::Value::String(s)) => return Ok(Selector::by_id(s.trim())),
        Some(serde_json::Value::Null) | None => {}
        Some(other) => {
            return Err(SpriteError::validation(format!(
                "override entry {idx}: sprite_id must be a number or string, got {other}"
            )));
        }
    }
    match entry.get(SPRITE_HASH_KEY) {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
            Ok(Selector::by_hash(s.trim()))
        }
        _ => Err(SpriteError::validation(format!(
            "override entry {idx} needs a sprite_id or a non-empty sprite_hash"
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/overrides.rs"]
mod tests;
