use std::path::Path;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::{
    encode::{encode_image, write_atomically},
    foundation::{
        core::{Rect, TrimBox},
        error::{SpriteError, SpriteResult},
    },
    render::composite::paste_with_alpha,
};

/// Transparent margin on every side of a frame inside its cell.
pub const DEFAULT_CELL_PADDING: u32 = 10;

#[derive(Clone, Debug)]
pub struct AtlasOpts {
    pub padding: u32,
}

impl Default for AtlasOpts {
    fn default() -> Self {
        Self {
            padding: DEFAULT_CELL_PADDING,
        }
    }
}

/// One frame handed to [`pack_row`].
#[derive(Clone, Copy, Debug)]
pub struct AtlasEntry<'a> {
    pub key: &'a str,
    pub image: &'a RgbaImage,
    /// Where `image` was cut from its untrimmed frame, if it was trimmed.
    pub trim_box: Option<TrimBox>,
    pub duration_ms: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtlasCell {
    pub key: String,
    /// The whole cell, padding included.
    pub cell: Rect,
    /// Where the frame pixels were drawn.
    pub placed: Rect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_box: Option<TrimBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
}

/// Machine-readable description of a packed sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtlasLayout {
    pub cell_width: u32,
    pub cell_height: u32,
    pub padding: u32,
    pub width: u32,
    pub height: u32,
    pub cells: Vec<AtlasCell>,
}

impl AtlasLayout {
    pub fn to_json(&self) -> SpriteResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SpriteError::serde(format!("atlas layout: {e}")))
    }
}

#[derive(Clone, Debug)]
pub struct Atlas {
    pub image: RgbaImage,
    pub layout: AtlasLayout,
}

/// Pack frames left to right into equal cells sized for the largest frame.
///
/// Each cell is `max_w + 2 * padding` by `max_h + 2 * padding`; a smaller frame is centered in
/// the area inside the padding, rounding toward the top-left.
#[tracing::instrument(skip(entries), fields(frames = entries.len()))]
pub fn pack_row(entries: &[AtlasEntry<'_>], opts: &AtlasOpts) -> SpriteResult<Atlas> {
    if entries.is_empty() {
        return Err(SpriteError::export("cannot build a spritesheet from zero frames"));
    }

    let max_w = entries.iter().map(|e| e.image.width()).max().unwrap_or(0);
    let max_h = entries.iter().map(|e| e.image.height()).max().unwrap_or(0);
    let too_large = || SpriteError::export("spritesheet dimensions overflow");
    let pad2 = opts.padding.checked_mul(2).ok_or_else(too_large)?;
    let cell_w = max_w.checked_add(pad2).ok_or_else(too_large)?;
    let cell_h = max_h.checked_add(pad2).ok_or_else(too_large)?;
    let count = u32::try_from(entries.len()).map_err(|_| too_large())?;
    let width = cell_w.checked_mul(count).ok_or_else(too_large)?;
    let cell_w_i = i32::try_from(cell_w).map_err(|_| too_large())?;
    i32::try_from(width).map_err(|_| too_large())?;

    let mut sheet = RgbaImage::new(width, cell_h);
    let mut cells = Vec::with_capacity(entries.len());
    let mut cell_x = 0i32;
    for entry in entries {
        let (w, h) = entry.image.dimensions();
        let off_x = opts.padding + (max_w - w) / 2;
        let off_y = opts.padding + (max_h - h) / 2;
        let x = i64::from(cell_x) + i64::from(off_x);
        let y = i64::from(off_y);
        paste_with_alpha(&mut sheet, entry.image, x, y);

        cells.push(AtlasCell {
            key: entry.key.to_string(),
            cell: Rect::new(cell_x, 0, cell_w, cell_h),
            placed: Rect::new(x as i32, y as i32, w, h),
            trim_box: entry.trim_box,
            duration_ms: entry.duration_ms,
        });
        cell_x += cell_w_i;
    }

    tracing::debug!(width, cell_w, cell_h, "spritesheet packed");
    Ok(Atlas {
        image: sheet,
        layout: AtlasLayout {
            cell_width: cell_w,
            cell_height: cell_h,
            padding: opts.padding,
            width,
            height: cell_h,
            cells,
        },
    })
}

/// Write the sheet as PNG.
pub fn export_atlas(atlas: &Atlas, path: &Path) -> SpriteResult<()> {
    let bytes = encode_image(&atlas.image, image::ImageFormat::Png)?;
    write_atomically(path, &bytes)
}

/// Write the layout sidecar as pretty JSON.
pub fn export_layout(layout: &AtlasLayout, path: &Path) -> SpriteResult<()> {
    write_atomically(path, layout.to_json()?.as_bytes())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/atlas.rs"]
mod tests;
