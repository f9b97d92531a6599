//! End-to-end assembly: capture + sprite directory in, composited and trimmed frames out.

use std::{
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
};

use image::RgbaImage;
use rayon::prelude::*;

use crate::{
    assets::{
        index::{SkippedFile, scan_dir},
        store::SpriteStore,
    },
    capture::model::{Capture, Frame},
    encode::{
        atlas::{Atlas, AtlasEntry, AtlasOpts, pack_row},
        sequence::{GifOpts, export_gif},
    },
    foundation::{
        core::TrimBox,
        error::{SpriteError, SpriteResult},
    },
    render::{
        composite::{DroppedPart, compose_frame},
        trim::trim,
    },
    transform::overrides::OverrideTable,
};

/// One progress notification.
///
/// `total == 0` means the sprite directory is still being indexed. After each frame `key` names
/// the frame just finished; the final call has `done == total` and an empty `key`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress<'a> {
    pub done: usize,
    pub total: usize,
    pub key: &'a str,
}

/// Progress sink. May be invoked from worker threads when assembling in parallel.
pub type ProgressFn<'a> = dyn Fn(Progress<'_>) + Sync + 'a;

#[derive(Clone, Debug, Default)]
pub struct AssembleOpts {
    /// Compose frames on a rayon pool. Output order is unaffected.
    pub parallel: bool,
    /// Pool size; `None` lets rayon decide.
    pub threads: Option<usize>,
}

/// A composited frame ready for export.
#[derive(Clone, Debug)]
pub struct FrameResult {
    pub key: String,
    /// Untrimmed `bounds`-sized canvas.
    pub image: RgbaImage,
    pub trimmed: RgbaImage,
    pub trim_box: TrimBox,
    pub duration_ms: i64,
    pub dropped: Vec<DroppedPart>,
}

impl FrameResult {
    pub fn atlas_entry(&self) -> AtlasEntry<'_> {
        AtlasEntry {
            key: &self.key,
            image: &self.trimmed,
            trim_box: Some(self.trim_box),
            duration_ms: Some(self.duration_ms),
        }
    }
}

/// Output of [`assemble_from_paths`].
#[derive(Clone, Debug)]
pub struct Assembly {
    /// In declared export order.
    pub frames: Vec<FrameResult>,
    /// Sprite files the indexer could not read.
    pub skipped: Vec<SkippedFile>,
    /// Number of distinct sprite hashes indexed.
    pub indexed: usize,
}

impl Assembly {
    pub fn dropped_parts(&self) -> usize {
        self.frames.iter().map(|f| f.dropped.len()).sum()
    }

    /// Pack the trimmed frames into a single-row spritesheet.
    pub fn atlas(&self, opts: &AtlasOpts) -> SpriteResult<Atlas> {
        let entries: Vec<AtlasEntry<'_>> =
            self.frames.iter().map(FrameResult::atlas_entry).collect();
        pack_row(&entries, opts)
    }

    /// Write the untrimmed frames as a looping GIF.
    pub fn export_gif(&self, opts: &GifOpts, path: &Path) -> SpriteResult<()> {
        let images: Vec<&RgbaImage> = self.frames.iter().map(|f| &f.image).collect();
        let durations: Vec<i64> = self.frames.iter().map(|f| f.duration_ms).collect();
        export_gif(&images, &durations, opts, path)
    }
}

/// Compose and trim every frame of `capture` in declared key order.
#[tracing::instrument(skip_all, fields(frames = capture.meta.frame_keys.len()))]
pub fn assemble_frames(
    capture: &Capture,
    sprites: &SpriteStore,
    overrides: &OverrideTable,
    opts: &AssembleOpts,
    progress: Option<&ProgressFn<'_>>,
) -> SpriteResult<Vec<FrameResult>> {
    let ordered = capture.ordered_frames()?;
    let total = ordered.len();
    let done = AtomicUsize::new(0);

    let render_one = |&(key, frame): &(&str, &Frame)| {
        let result = assemble_one(key, frame, sprites, overrides);
        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(frame = key, done = n, total, "frame assembled");
        if let Some(progress) = progress {
            progress(Progress {
                done: n,
                total,
                key,
            });
        }
        result
    };

    let frames = if opts.parallel {
        let pool = build_thread_pool(opts.threads)?;
        pool.install(|| ordered.par_iter().map(render_one).collect::<Vec<_>>())
    } else {
        ordered.iter().map(render_one).collect()
    };

    if let Some(progress) = progress {
        progress(Progress {
            done: total,
            total,
            key: "",
        });
    }
    Ok(frames)
}

/// Read the capture, index `sprites_dir`, then assemble every frame.
///
/// `external_overrides` is merged over the built-in override table for this run only.
pub fn assemble_from_paths(
    capture_path: &Path,
    sprites_dir: &Path,
    external_overrides: Option<&OverrideTable>,
    opts: &AssembleOpts,
    progress: Option<&ProgressFn<'_>>,
) -> SpriteResult<Assembly> {
    let capture = Capture::from_path(capture_path)?;

    if let Some(progress) = progress {
        progress(Progress {
            done: 0,
            total: 0,
            key: "",
        });
    }
    let report = scan_dir(sprites_dir)?;
    let indexed = report.index.len();
    let store = SpriteStore::new(report.index);
    let overrides = OverrideTable::effective(external_overrides);

    let frames = assemble_frames(&capture, &store, &overrides, opts, progress)?;
    tracing::info!(
        frames = frames.len(),
        sprites_loaded = store.loaded(),
        "capture assembled"
    );
    Ok(Assembly {
        frames,
        skipped: report.skipped,
        indexed,
    })
}

fn assemble_one(
    key: &str,
    frame: &Frame,
    sprites: &SpriteStore,
    overrides: &OverrideTable,
) -> FrameResult {
    let composed = compose_frame(key, frame, sprites, overrides);
    let trimmed = trim(&composed.image);
    FrameResult {
        key: key.to_string(),
        image: composed.image,
        trimmed: trimmed.image,
        trim_box: trimmed.bbox,
        duration_ms: frame.duration_ms(),
        dropped: composed.dropped,
    }
}

fn build_thread_pool(threads: Option<usize>) -> SpriteResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SpriteError::validation(
            "assemble 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SpriteError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
