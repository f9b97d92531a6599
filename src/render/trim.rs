use image::{RgbaImage, imageops};

use crate::foundation::core::TrimBox;

/// A frame cropped to its visible pixels.
#[derive(Clone, Debug)]
pub struct Trimmed {
    pub image: RgbaImage,
    /// Crop rectangle in the source image's coordinates.
    pub bbox: TrimBox,
}

/// Bounding box of pixels with nonzero alpha, or `None` for a fully transparent image.
pub fn opaque_bbox(img: &RgbaImage) -> Option<TrimBox> {
    let mut bbox: Option<TrimBox> = None;
    for (x, y, px) in img.enumerate_pixels() {
        if px.0[3] == 0 {
            continue;
        }
        let b = bbox.get_or_insert(TrimBox::new(x, y, x + 1, y + 1));
        b.x0 = b.x0.min(x);
        b.y0 = b.y0.min(y);
        b.x1 = b.x1.max(x + 1);
        b.y1 = b.y1.max(y + 1);
    }
    bbox
}

/// Crop `img` to [`opaque_bbox`]; a fully transparent image is kept whole.
pub fn trim(img: &RgbaImage) -> Trimmed {
    let bbox = opaque_bbox(img).unwrap_or_else(|| TrimBox::full(img.width(), img.height()));
    let image = imageops::crop_imm(img, bbox.x0, bbox.y0, bbox.width(), bbox.height()).to_image();
    Trimmed { image, bbox }
}

#[cfg(test)]
#[path = "../../tests/unit/render/trim.rs"]
mod tests;
