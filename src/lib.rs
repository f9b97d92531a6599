//! spriteforge turns captured sprite animations into concrete images.
//!
//! A capture is a JSON document that describes each animation frame as a stack of parts, where
//! every part references a shared sprite image by content hash, a source rectangle inside it, a
//! transform label and a placement. The pipeline is:
//!
//! 1. **Read**: parse the capture with trailing-comma repair ([`Capture::from_path`])
//! 2. **Index**: hash every image in the sprite directory ([`scan_dir`])
//! 3. **Compose**: crop, transform and paste parts in z-order ([`compose_frame`])
//! 4. **Trim**: crop each frame to its visible pixels ([`trim`])
//! 5. **Export**: per-frame files, a looping GIF and a single-row spritesheet
//!
//! [`assemble_from_paths`] runs steps 1 to 4; exporting is left to the caller.
//!
//! Problems with a single sprite file or part never abort a run. They are logged through
//! `tracing` and reported in [`ScanReport::skipped`] and [`ComposedFrame::dropped`].
#![forbid(unsafe_code)]

/// Sprite directory indexing and decoded sprite cache.
pub mod assets;
/// Capture document model and lenient JSON reader.
pub mod capture;
/// Frame, GIF and spritesheet exporters.
pub mod encode;
/// Geometry types and the error taxonomy.
pub mod foundation;
/// Orchestration of a full run.
pub mod pipeline;
/// Compositing and trimming.
pub mod render;
/// Transform operations, overrides and label resolution.
pub mod transform;

pub use crate::assets::index::{
    ContentIndex, ScanReport, SkippedFile, content_hash, content_hash_rgba, scan_dir,
};
pub use crate::assets::store::{SpriteMiss, SpriteStore};
pub use crate::capture::model::{Capture, DEFAULT_DURATION_MS, Frame, Part, SpriteId};
pub use crate::encode::atlas::{
    Atlas, AtlasCell, AtlasEntry, AtlasLayout, AtlasOpts, DEFAULT_CELL_PADDING, export_atlas,
    export_layout, pack_row,
};
pub use crate::encode::frames::{frame_file_name, save_frames};
pub use crate::encode::sequence::{GifOpts, encode_gif, export_gif};
pub use crate::foundation::core::{Point, Rect, Size, TrimBox};
pub use crate::foundation::error::{SpriteError, SpriteResult};
pub use crate::pipeline::{
    AssembleOpts, Assembly, FrameResult, Progress, ProgressFn, assemble_frames,
    assemble_from_paths,
};
pub use crate::render::composite::{ComposedFrame, DropReason, DroppedPart, compose_frame};
pub use crate::render::trim::{Trimmed, trim};
pub use crate::transform::op::TransformOp;
pub use crate::transform::overrides::{OverrideTable, Selector};
pub use crate::transform::resolve::{LabelSource, ResolvedTransform, resolve_transform};
