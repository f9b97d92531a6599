//! Exporters. Every exporter encodes fully in memory before touching the filesystem, and files
//! are moved into place only once completely written.

use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::foundation::error::SpriteResult;

/// Single-row spritesheet.
pub mod atlas;
/// Per-frame image files.
pub mod frames;
/// Timed multi-frame sequence (animated GIF).
pub mod sequence;

pub fn ensure_parent_dir(path: &Path) -> SpriteResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Encode an RGBA image into `format`.
pub fn encode_image(img: &image::RgbaImage, format: image::ImageFormat) -> SpriteResult<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .with_context(|| format!("encode {format:?} image"))?;
    Ok(buf)
}

/// Write `bytes` to a sibling temp file, then rename it over `path`.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> SpriteResult<()> {
    ensure_parent_dir(path)?;

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    tmp_name.push(".partial");
    let tmp = path.with_file_name(tmp_name);

    let mut guard = TempFileGuard(Some(tmp.clone()));
    std::fs::write(&tmp, bytes).with_context(|| format!("write '{}'", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("move '{}' into place", path.display()))?;
    guard.0 = None;
    Ok(())
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/mod.rs"]
mod tests;
