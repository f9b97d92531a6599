//! Per-frame layered composition.
//!
//! Every part is cropped from its sprite, transformed, offset by the frame origin and pasted onto
//! a transparent canvas in ascending z-order. A part that cannot be drawn is dropped and reported;
//! it never fails the frame.

use image::RgbaImage;

use crate::{
    assets::store::{SpriteMiss, SpriteStore},
    capture::model::{Frame, Part},
    foundation::core::Rect,
    transform::{overrides::OverrideTable, resolve::resolve_transform},
};

/// Why a part was left out of a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// The part has no sprite hash.
    EmptyHash,
    /// No indexed sprite has the part's hash.
    Unindexed,
    /// The sprite file exists in the index but could not be decoded.
    Unreadable(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DroppedPart {
    pub order: i64,
    pub sprite_hash: Option<String>,
    pub reason: DropReason,
}

/// A composited frame plus the parts that were skipped.
#[derive(Clone, Debug)]
pub struct ComposedFrame {
    /// `bounds.width x bounds.height` RGBA canvas.
    pub image: RgbaImage,
    pub dropped: Vec<DroppedPart>,
}

/// Composite all parts of `frame`.
#[tracing::instrument(skip(frame, sprites, overrides), fields(parts = frame.parts.len()))]
pub fn compose_frame(
    key: &str,
    frame: &Frame,
    sprites: &SpriteStore,
    overrides: &OverrideTable,
) -> ComposedFrame {
    let mut canvas = RgbaImage::new(frame.bounds.width, frame.bounds.height);
    let mut dropped = Vec::new();

    for part in frame.sorted_parts() {
        if let Err(reason) = draw_part(&mut canvas, frame.bounds, part, sprites, overrides) {
            let sprite_hash = part.hash();
            tracing::warn!(
                frame = key,
                order = part.order,
                hash = sprite_hash.as_deref().unwrap_or(""),
                ?reason,
                "part dropped"
            );
            dropped.push(DroppedPart {
                order: part.order,
                sprite_hash,
                reason,
            });
        }
    }

    ComposedFrame {
        image: canvas,
        dropped,
    }
}

fn draw_part(
    canvas: &mut RgbaImage,
    bounds: Rect,
    part: &Part,
    sprites: &SpriteStore,
    overrides: &OverrideTable,
) -> Result<(), DropReason> {
    let hash = part.hash().ok_or(DropReason::EmptyHash)?;
    let sprite = sprites.get(&hash).map_err(|miss| match miss {
        SpriteMiss::Unindexed => DropReason::Unindexed,
        miss @ SpriteMiss::Unreadable { .. } => DropReason::Unreadable(miss.to_string()),
    })?;

    let crop = crop_padded(&sprite, part.source);

    let sprite_id = part.sprite_id_key();
    let resolved = resolve_transform(
        part.transform_label(),
        sprite_id.as_deref(),
        Some(&hash),
        overrides,
    );
    if !resolved.recognized {
        tracing::warn!(label = %resolved.label, "unrecognized transform, drawing untransformed");
    }
    let placed = resolved.op.apply(&crop);

    // Captures are expected to describe the post-transform size exactly; a mismatch is reported
    // but not corrected.
    if let Some(size) = part.size
        && placed.dimensions() != (size.width, size.height)
    {
        tracing::debug!(
            transform = %resolved.op,
            actual = ?placed.dimensions(),
            expected = ?(size.width, size.height),
            "transformed part size differs from declared size"
        );
    }

    let (dx, dy) = part.absolute_position.offset_from(bounds);
    paste_with_alpha(canvas, &placed, dx, dy);
    Ok(())
}

/// Copy `rect` out of `src`. Pixels of `rect` outside `src` are transparent.
pub fn crop_padded(src: &RgbaImage, rect: Rect) -> RgbaImage {
    let mut out = RgbaImage::new(rect.width, rect.height);
    let x0 = i64::from(rect.x).max(0);
    let y0 = i64::from(rect.y).max(0);
    let x1 = rect.right().min(i64::from(src.width()));
    let y1 = rect.bottom().min(i64::from(src.height()));

    for sy in y0..y1 {
        for sx in x0..x1 {
            let px = *src.get_pixel(sx as u32, sy as u32);
            out.put_pixel(
                (sx - i64::from(rect.x)) as u32,
                (sy - i64::from(rect.y)) as u32,
                px,
            );
        }
    }
    out
}

/// Paste `src` onto `dst` at `(dx, dy)`, using the source alpha as the paste mask.
///
/// Every channel, alpha included, becomes `src * m + dst * (1 - m)` with `m = src.alpha / 255`:
/// transparent source pixels leave `dst` untouched and opaque ones replace it. Pixels falling
/// outside `dst` are clipped.
pub fn paste_with_alpha(dst: &mut RgbaImage, src: &RgbaImage, dx: i64, dy: i64) {
    let x0 = dx.max(0);
    let y0 = dy.max(0);
    let x1 = dx
        .saturating_add(i64::from(src.width()))
        .min(i64::from(dst.width()));
    let y1 = dy
        .saturating_add(i64::from(src.height()))
        .min(i64::from(dst.height()));

    for ty in y0..y1 {
        for tx in x0..x1 {
            let s = src.get_pixel((tx - dx) as u32, (ty - dy) as u32).0;
            let m = s[3];
            if m == 0 {
                continue;
            }
            let d = dst.get_pixel_mut(tx as u32, ty as u32);
            if m == 255 {
                d.0 = s;
                continue;
            }
            for i in 0..4 {
                d.0[i] = blend_channel(s[i], d.0[i], m);
            }
        }
    }
}

fn blend_channel(src: u8, dst: u8, mask: u8) -> u8 {
    let m = u32::from(mask);
    ((u32::from(src) * m + u32::from(dst) * (255 - m) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
