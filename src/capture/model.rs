use std::{collections::HashMap, fmt, path::Path};

use anyhow::Context as _;

use crate::{
    capture::lenient::parse_lenient,
    foundation::core::{Point, Rect, Size},
    foundation::error::{SpriteError, SpriteResult},
};

/// Frame duration used when a frame omits `duration_ms`.
pub const DEFAULT_DURATION_MS: i64 = 40;

/// A captured animation: ordered frame keys plus the frames they name.
///
/// `meta.frame_keys` is the export order and is never resorted.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Capture {
    pub meta: CaptureMeta,
    pub frames: HashMap<String, Frame>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CaptureMeta {
    pub frame_keys: Vec<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    /// Local canvas: `x`/`y` is the world-space origin, `width`/`height` the output size.
    pub bounds: Rect,
    #[serde(default)]
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Part {
    /// Z-order; higher values are drawn later.
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub sprite_hash: Option<SpriteHashRef>,
    #[serde(default)]
    pub sprite_id: Option<SpriteId>,
    /// Crop rectangle in sprite-local coordinates.
    pub source: Rect,
    #[serde(default)]
    pub size: Option<Size>,
    pub absolute_position: Point,
    #[serde(default)]
    pub transform: Option<TransformRef>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct SpriteHashRef {
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct TransformRef {
    #[serde(default)]
    pub name: Option<String>,
}

/// Sprite identifier as written by the capture tool. Only its string form is ever used.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum SpriteId {
    Int(i64),
    Text(String),
}

impl fmt::Display for SpriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl Capture {
    /// Parse (with trailing-comma repair) and validate a capture document.
    pub fn from_slice(bytes: &[u8]) -> SpriteResult<Self> {
        let capture: Self = parse_lenient(bytes)?;
        capture.validate()?;
        Ok(capture)
    }

    pub fn from_path(path: impl AsRef<Path>) -> SpriteResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read capture '{}'", path.display()))?;
        Self::from_slice(&bytes)
    }

    /// Every declared frame key must name a frame.
    pub fn validate(&self) -> SpriteResult<()> {
        for key in &self.meta.frame_keys {
            if !self.frames.contains_key(key) {
                return Err(SpriteError::validation(format!(
                    "frame key '{key}' is listed in meta.frame_keys but has no frame"
                )));
            }
        }
        Ok(())
    }

    pub fn frame(&self, key: &str) -> SpriteResult<&Frame> {
        self.frames
            .get(key)
            .ok_or_else(|| SpriteError::validation(format!("unknown frame key '{key}'")))
    }

    /// Frames in declared export order.
    pub fn ordered_frames(&self) -> SpriteResult<Vec<(&str, &Frame)>> {
        self.meta
            .frame_keys
            .iter()
            .map(|key| Ok((key.as_str(), self.frame(key)?)))
            .collect()
    }
}

impl Frame {
    pub fn duration_ms(&self) -> i64 {
        self.duration_ms.unwrap_or(DEFAULT_DURATION_MS)
    }

    /// Parts in ascending z-order; equal orders keep their document order.
    pub fn sorted_parts(&self) -> Vec<&Part> {
        let mut parts: Vec<&Part> = self.parts.iter().collect();
        parts.sort_by_key(|p| p.order);
        parts
    }
}

impl Part {
    /// Lowercased sprite hash, or `None` when absent or empty.
    pub fn hash(&self) -> Option<String> {
        self.sprite_hash
            .as_ref()
            .and_then(|h| h.value.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_ascii_lowercase)
    }

    /// Raw transform label; empty when absent.
    pub fn transform_label(&self) -> &str {
        self.transform
            .as_ref()
            .and_then(|t| t.name.as_deref())
            .unwrap_or("")
    }

    pub fn sprite_id_key(&self) -> Option<String> {
        self.sprite_id.as_ref().map(ToString::to_string)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/model.rs"]
mod tests;
