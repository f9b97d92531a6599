use std::path::{Path, PathBuf};

use super::*;
use crate::{
    assets::index::{ContentIndex, content_hash_rgba},
    foundation::core::TrimBox,
    render::trim::trim,
    transform::overrides::Selector,
};

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "spriteforge_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

/// Writes each sprite as PNG and returns a store over them plus their hashes.
fn store_with(dir: &Path, sprites: &[RgbaImage]) -> (SpriteStore, Vec<String>) {
    std::fs::create_dir_all(dir).unwrap();
    let mut entries = Vec::new();
    for (i, img) in sprites.iter().enumerate() {
        let path = dir.join(format!("s{i}.png"));
        img.save_with_format(&path, image::ImageFormat::Png).unwrap();
        entries.push((content_hash_rgba(img), path));
    }
    let hashes = entries.iter().map(|(h, _)| h.clone()).collect();
    (SpriteStore::new(entries.into_iter().collect::<ContentIndex>()), hashes)
}

fn frame(value: serde_json::Value) -> Frame {
    serde_json::from_value(value).unwrap()
}

fn part(order: i64, hash: &str, w: u32, h: u32, x: f64, y: f64, transform: &str) -> serde_json::Value {
    serde_json::json!({
        "order": order,
        "sprite_hash": { "value": hash },
        "source": { "x": 0, "y": 0, "width": w, "height": h },
        "size": { "width": w, "height": h },
        "absolute_position": { "x": x, "y": y },
        "transform": { "name": transform }
    })
}

#[test]
fn frame_without_drawable_parts_is_transparent_and_trims_to_full_canvas() {
    let f = frame(serde_json::json!({
        "bounds": { "x": 3, "y": 4, "width": 5, "height": 2 },
        "parts": [
            part(0, "", 1, 1, 3.0, 4.0, "NONE"),
            { "order": 1, "source": { "x": 0, "y": 0, "width": 1, "height": 1 },
              "absolute_position": { "x": 3, "y": 4 } }
        ]
    }));

    let out = compose_frame("empty", &f, &SpriteStore::default(), &OverrideTable::new());
    assert_eq!(out.image.dimensions(), (5, 2));
    assert!(out.image.pixels().all(|p| p.0 == CLEAR));
    assert_eq!(out.dropped.len(), 2);
    assert!(out.dropped.iter().all(|d| d.reason == DropReason::EmptyHash));

    let trimmed = trim(&out.image);
    assert_eq!(trimmed.bbox, TrimBox::full(5, 2));
    assert_eq!(trimmed.image.dimensions(), (5, 2));
}

#[test]
fn later_z_order_wins_on_overlap() {
    let dir = temp_dir("composite_z");
    let (store, hashes) = store_with(
        &dir,
        &[
            RgbaImage::from_pixel(3, 3, image::Rgba(RED)),
            RgbaImage::from_pixel(3, 3, image::Rgba(BLUE)),
        ],
    );

    // Blue is listed first but has the higher order.
    let f = frame(serde_json::json!({
        "bounds": { "x": 0, "y": 0, "width": 4, "height": 4 },
        "parts": [
            part(2, &hashes[1], 3, 3, 1.0, 1.0, "NONE"),
            part(1, &hashes[0], 3, 3, 0.0, 0.0, "NONE")
        ]
    }));

    let out = compose_frame("z", &f, &store, &OverrideTable::new());
    assert!(out.dropped.is_empty());
    assert_eq!(out.image.get_pixel(0, 0).0, RED);
    assert_eq!(out.image.get_pixel(1, 1).0, BLUE);
    assert_eq!(out.image.get_pixel(2, 2).0, BLUE);
    assert_eq!(out.image.get_pixel(3, 0).0, CLEAR);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn placement_is_relative_to_bounds_and_rounded() {
    let dir = temp_dir("composite_place");
    let (store, hashes) = store_with(&dir, &[RgbaImage::from_pixel(1, 1, image::Rgba(RED))]);

    let f = frame(serde_json::json!({
        "bounds": { "x": 100, "y": -50, "width": 4, "height": 4 },
        "parts": [ part(0, &hashes[0], 1, 1, 101.5, -48.4, "NONE") ]
    }));

    let out = compose_frame("place", &f, &store, &OverrideTable::new());
    assert_eq!(out.image.get_pixel(2, 2).0, RED);
    assert_eq!(out.image.pixels().filter(|p| p.0 == RED).count(), 1);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unresolvable_part_is_dropped_without_affecting_others() {
    let dir = temp_dir("composite_missing");
    let (store, hashes) = store_with(&dir, &[RgbaImage::from_pixel(2, 2, image::Rgba(BLUE))]);

    let f = frame(serde_json::json!({
        "bounds": { "x": 0, "y": 0, "width": 2, "height": 2 },
        "parts": [
            part(0, "0000000000000000000000000000000000000000000000000000000000000000", 2, 2, 0.0, 0.0, "NONE"),
            part(1, &hashes[0].to_uppercase(), 2, 2, 0.0, 0.0, "NONE")
        ]
    }));

    let out = compose_frame("missing", &f, &store, &OverrideTable::new());
    assert_eq!(out.dropped.len(), 1);
    assert_eq!(out.dropped[0].reason, DropReason::Unindexed);
    assert_eq!(out.dropped[0].order, 0);
    assert!(out.image.pixels().all(|p| p.0 == BLUE));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn transforms_and_overrides_apply_to_the_crop() {
    let dir = temp_dir("composite_transform");
    let sprite = RgbaImage::from_fn(3, 1, |x, _| {
        if x == 0 {
            image::Rgba(RED)
        } else {
            image::Rgba(BLUE)
        }
    });
    let (store, hashes) = store_with(&dir, &[sprite]);

    // Source crops the first two pixels: [RED, BLUE].
    let mut p = part(0, &hashes[0], 2, 1, 0.0, 0.0, "flip_h");
    let f = frame(serde_json::json!({
        "bounds": { "x": 0, "y": 0, "width": 2, "height": 1 },
        "parts": [ p.clone() ]
    }));
    let out = compose_frame("flip", &f, &store, &OverrideTable::new());
    assert_eq!(out.image.get_pixel(0, 0).0, BLUE);
    assert_eq!(out.image.get_pixel(1, 0).0, RED);

    // An unknown label draws the crop unmodified.
    p["transform"]["name"] = serde_json::json!("WOBBLE");
    let f = frame(serde_json::json!({
        "bounds": { "x": 0, "y": 0, "width": 2, "height": 1 },
        "parts": [ p.clone() ]
    }));
    let out = compose_frame("unknown", &f, &store, &OverrideTable::new());
    assert_eq!(out.image.get_pixel(0, 0).0, RED);
    assert_eq!(out.image.get_pixel(1, 0).0, BLUE);

    // An id override turns FLIP_H back into identity for this sprite.
    p["transform"]["name"] = serde_json::json!("FLIP_H");
    p["sprite_id"] = serde_json::json!(9);
    let f = frame(serde_json::json!({
        "bounds": { "x": 0, "y": 0, "width": 2, "height": 1 },
        "parts": [ p ]
    }));
    let mut overrides = OverrideTable::new();
    overrides.insert(Selector::by_id("9"), "FLIP_H", "NONE");
    let out = compose_frame("override", &f, &store, &overrides);
    assert_eq!(out.image.get_pixel(0, 0).0, RED);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn paste_uses_source_alpha_as_mask() {
    let mut dst = RgbaImage::from_pixel(2, 1, image::Rgba([10, 20, 30, 255]));
    let src = RgbaImage::from_fn(2, 1, |x, _| {
        if x == 0 {
            image::Rgba([200, 200, 200, 0])
        } else {
            image::Rgba([255, 0, 0, 128])
        }
    });

    paste_with_alpha(&mut dst, &src, 0, 0);
    assert_eq!(dst.get_pixel(0, 0).0, [10, 20, 30, 255]);
    assert_eq!(
        dst.get_pixel(1, 0).0,
        [
            ((255 * 128 + 10 * 127 + 127) / 255) as u8,
            ((20 * 127 + 127) / 255) as u8,
            ((30 * 127 + 127) / 255) as u8,
            ((128 * 128 + 255 * 127 + 127) / 255) as u8,
        ]
    );
}

#[test]
fn paste_clips_outside_the_canvas() {
    let mut dst = RgbaImage::new(2, 2);
    let src = RgbaImage::from_pixel(2, 2, image::Rgba(RED));

    paste_with_alpha(&mut dst, &src, -1, 1);
    assert_eq!(dst.get_pixel(0, 1).0, RED);
    assert_eq!(dst.get_pixel(0, 0).0, CLEAR);
    assert_eq!(dst.get_pixel(1, 1).0, CLEAR);

    paste_with_alpha(&mut dst, &src, 5, 5);
    assert_eq!(dst.pixels().filter(|p| p.0 == RED).count(), 1);
}

#[test]
fn paste_at_extreme_offsets_draws_nothing() {
    let mut dst = RgbaImage::new(2, 2);
    let src = RgbaImage::from_pixel(3, 3, image::Rgba(RED));
    paste_with_alpha(&mut dst, &src, i64::MAX, i64::MAX);
    paste_with_alpha(&mut dst, &src, i64::MIN, i64::MIN);
    paste_with_alpha(&mut dst, &src, i64::MAX, 0);
    assert!(dst.pixels().all(|p| p.0 == CLEAR));
}

#[test]
fn part_placed_far_outside_the_frame_is_clipped_away() {
    let dir = temp_dir("composite_far");
    let (store, hashes) = store_with(&dir, &[RgbaImage::from_pixel(2, 2, image::Rgba(RED))]);

    let f = frame(serde_json::json!({
        "bounds": { "x": 0, "y": 0, "width": 4, "height": 4 },
        "parts": [
            part(0, &hashes[0], 2, 2, 1e19, 0.0, "NONE"),
            part(1, &hashes[0], 2, 2, 0.0, -1e19, "NONE"),
            part(2, &hashes[0], 2, 2, 1.0, 1.0, "NONE")
        ]
    }));

    let out = compose_frame("far", &f, &store, &OverrideTable::new());
    assert!(out.dropped.is_empty());
    assert_eq!(out.image.pixels().filter(|p| p.0 == RED).count(), 4);
    assert_eq!(out.image.get_pixel(1, 1).0, RED);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn crop_outside_sprite_is_transparent() {
    let src = RgbaImage::from_pixel(2, 2, image::Rgba(BLUE));
    let out = crop_padded(&src, Rect::new(1, -1, 2, 2));
    assert_eq!(out.dimensions(), (2, 2));
    assert_eq!(out.get_pixel(0, 0).0, CLEAR);
    assert_eq!(out.get_pixel(0, 1).0, BLUE);
    assert_eq!(out.get_pixel(1, 1).0, CLEAR);
}
