use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::{
    encode::{encode_image, write_atomically},
    foundation::error::{SpriteError, SpriteResult},
};

/// `<key>.<ext>`, refusing keys that would escape the output directory.
pub fn frame_file_name(key: &str, format: ImageFormat) -> SpriteResult<String> {
    if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) || key.contains('\0')
    {
        return Err(SpriteError::validation(format!(
            "frame key {key:?} cannot be used as a file name"
        )));
    }
    let ext = format
        .extensions_str()
        .first()
        .ok_or_else(|| SpriteError::export(format!("{format:?} has no file extension")))?;
    Ok(format!("{key}.{ext}"))
}

/// Save one file per frame into `dir`.
///
/// Every name is checked and every frame encoded before anything is written, so bad keys and
/// encoder failures leave the directory untouched. Past that point the guarantee is per file:
/// each file is either complete or absent, but an IO error on a later frame does not remove the
/// frames already saved.
#[tracing::instrument(skip(frames))]
pub fn save_frames<'a>(
    frames: impl IntoIterator<Item = (&'a str, &'a RgbaImage)>,
    dir: &Path,
    format: ImageFormat,
) -> SpriteResult<Vec<PathBuf>> {
    let encoded = frames
        .into_iter()
        .map(|(key, img)| {
            let path = dir.join(frame_file_name(key, format)?);
            Ok((path, encode_image(img, format)?))
        })
        .collect::<SpriteResult<Vec<_>>>()?;

    let mut written = Vec::with_capacity(encoded.len());
    for (path, bytes) in encoded {
        write_atomically(&path, &bytes)?;
        written.push(path);
    }
    tracing::info!(count = written.len(), "frames saved");
    Ok(written)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/frames.rs"]
mod tests;
