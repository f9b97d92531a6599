use std::fmt;

use image::{RgbaImage, imageops};

/// The canonical geometric operations a part transform can name.
///
/// Applied to the cropped source region before placement. Rotations are clockwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransformOp {
    /// `NONE`, `DEFAULT`, and any label that is not recognized.
    #[default]
    Identity,
    /// `FLIP_H`, `MIRROR`.
    FlipH,
    /// `FLIP_V`.
    FlipV,
    /// `ROTATE_90`.
    Rotate90,
    /// `ROTATE_180`.
    Rotate180,
    /// `ROTATE_270`.
    Rotate270,
    /// `MIRROR_ROTATE_90`: horizontal mirror, then rotate 90.
    MirrorRotate90,
    /// `MIRROR_ROTATE_180`: a vertical mirror and nothing else.
    ///
    /// The label does not describe the pixels the capture format expects. Sprites rendered with
    /// it only line up when treated as `FLIP_V`, so that is what this variant does.
    MirrorRotate180,
    /// `MIRROR_ROTATE_270`: horizontal mirror, then rotate 270.
    MirrorRotate270,
}

impl TransformOp {
    pub const ALL: [Self; 9] = [
        Self::Identity,
        Self::FlipH,
        Self::FlipV,
        Self::Rotate90,
        Self::Rotate180,
        Self::Rotate270,
        Self::MirrorRotate90,
        Self::MirrorRotate180,
        Self::MirrorRotate270,
    ];

    /// Parse a label (case-insensitive). `None` for labels outside the known set.
    pub fn from_label(label: &str) -> Option<Self> {
        let op = match label.trim().to_ascii_uppercase().as_str() {
            "" | "NONE" | "DEFAULT" => Self::Identity,
            "FLIP_H" | "MIRROR" => Self::FlipH,
            "FLIP_V" => Self::FlipV,
            "ROTATE_90" => Self::Rotate90,
            "ROTATE_180" => Self::Rotate180,
            "ROTATE_270" => Self::Rotate270,
            "MIRROR_ROTATE_90" => Self::MirrorRotate90,
            "MIRROR_ROTATE_180" => Self::MirrorRotate180,
            "MIRROR_ROTATE_270" => Self::MirrorRotate270,
            _ => return None,
        };
        Some(op)
    }

    /// Canonical label of this operation.
    pub fn label(self) -> &'static str {
        match self {
            Self::Identity => "NONE",
            Self::FlipH => "FLIP_H",
            Self::FlipV => "FLIP_V",
            Self::Rotate90 => "ROTATE_90",
            Self::Rotate180 => "ROTATE_180",
            Self::Rotate270 => "ROTATE_270",
            Self::MirrorRotate90 => "MIRROR_ROTATE_90",
            Self::MirrorRotate180 => "MIRROR_ROTATE_180",
            Self::MirrorRotate270 => "MIRROR_ROTATE_270",
        }
    }

    /// Whether the output has width and height swapped.
    pub fn swaps_axes(self) -> bool {
        matches!(
            self,
            Self::Rotate90 | Self::Rotate270 | Self::MirrorRotate90 | Self::MirrorRotate270
        )
    }

    /// Output dimensions for a `width x height` input.
    pub fn output_size(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_axes() {
            (height, width)
        } else {
            (width, height)
        }
    }

    pub fn apply(self, img: &RgbaImage) -> RgbaImage {
        match self {
            Self::Identity => img.clone(),
            Self::FlipH => imageops::flip_horizontal(img),
            Self::FlipV | Self::MirrorRotate180 => imageops::flip_vertical(img),
            Self::Rotate90 => imageops::rotate90(img),
            Self::Rotate180 => imageops::rotate180(img),
            Self::Rotate270 => imageops::rotate270(img),
            Self::MirrorRotate90 => imageops::rotate90(&imageops::flip_horizontal(img)),
            Self::MirrorRotate270 => imageops::rotate270(&imageops::flip_horizontal(img)),
        }
    }
}

impl fmt::Display for TransformOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/op.rs"]
mod tests;
