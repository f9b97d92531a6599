use std::{io::Write, path::Path};

use anyhow::Context as _;
use image::RgbaImage;

use crate::{
    encode::write_atomically,
    foundation::error::{SpriteError, SpriteResult},
};

/// Options for [`encode_gif`].
#[derive(Clone, Debug)]
pub struct GifOpts {
    /// Palette quantizer speed, `1..=30` (1 is slowest and best).
    pub speed: i32,
}

impl Default for GifOpts {
    fn default() -> Self {
        Self { speed: 10 }
    }
}

/// Encode `frames` as a looping GIF.
///
/// Each frame is shown for its entry in `durations_ms`, frames are disposed to background, and
/// fully transparent pixels map to the frame's transparent palette index. The logical screen is
/// the largest frame width and height.
pub fn encode_gif<W: Write>(
    frames: &[&RgbaImage],
    durations_ms: &[i64],
    opts: &GifOpts,
    out: W,
) -> SpriteResult<()> {
    if frames.is_empty() {
        return Err(SpriteError::export("cannot encode a GIF with zero frames"));
    }
    if frames.len() != durations_ms.len() {
        return Err(SpriteError::export(format!(
            "got {} frames but {} durations",
            frames.len(),
            durations_ms.len()
        )));
    }
    if !(1..=30).contains(&opts.speed) {
        return Err(SpriteError::validation(format!(
            "GIF quantizer speed must be in 1..=30, got {}",
            opts.speed
        )));
    }

    let mut screen = (0u16, 0u16);
    for (idx, img) in frames.iter().enumerate() {
        let (w, h) = gif_dimensions(idx, img)?;
        screen = (screen.0.max(w), screen.1.max(h));
    }

    let mut encoder =
        gif::Encoder::new(out, screen.0, screen.1, &[]).context("start GIF stream")?;
    encoder
        .set_repeat(gif::Repeat::Infinite)
        .context("write GIF loop extension")?;

    for (idx, (img, &duration)) in frames.iter().zip(durations_ms).enumerate() {
        let (w, h) = gif_dimensions(idx, img)?;
        let mut pixels = img.as_raw().clone();
        let mut frame = gif::Frame::from_rgba_speed(w, h, &mut pixels, opts.speed);
        frame.delay = delay_centis(duration);
        frame.dispose = gif::DisposalMethod::Background;
        encoder
            .write_frame(&frame)
            .with_context(|| format!("write GIF frame {idx}"))?;
    }
    Ok(())
}

/// Encode and write a GIF to `path`. Nothing is written if encoding fails.
pub fn export_gif(
    frames: &[&RgbaImage],
    durations_ms: &[i64],
    opts: &GifOpts,
    path: &Path,
) -> SpriteResult<()> {
    let mut buf = Vec::new();
    encode_gif(frames, durations_ms, opts, &mut buf)?;
    write_atomically(path, &buf)
}

/// GIF delays are centiseconds; negative durations clamp to zero.
pub fn delay_centis(duration_ms: i64) -> u16 {
    u16::try_from(duration_ms.max(0) / 10).unwrap_or(u16::MAX)
}

fn gif_dimensions(idx: usize, img: &RgbaImage) -> SpriteResult<(u16, u16)> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(SpriteError::export(format!(
            "frame {idx} is empty ({w}x{h})"
        )));
    }
    match (u16::try_from(w), u16::try_from(h)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(SpriteError::export(format!(
            "frame {idx} is {w}x{h}, larger than GIF allows"
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sequence.rs"]
mod tests;
