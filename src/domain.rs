//! Domain types shared with the upstream bubble detector.
//!
//! The detector reports axis-aligned boxes in normalized `[0, 1]`
//! coordinates with a bottom-left origin (Y grows upward). Images use a
//! top-left origin, so callers convert through [`BubbleBox::to_pixel_rect`]
//! before handing a crop to the OCR pipeline.

use image::RgbImage;
use serde::{Deserialize, Serialize};

/// A detected speech-bubble bounding box in normalized, Y-flipped
/// coordinates as reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BubbleBox {
    /// Left edge in `[0, 1]`.
    pub x: f32,
    /// Bottom edge in `[0, 1]`, measured from the bottom of the page.
    pub y: f32,
    /// Width in `[0, 1]`.
    pub width: f32,
    /// Height in `[0, 1]`.
    pub height: f32,
}

/// An axis-aligned rectangle in top-left-origin pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels (at least 1 for non-degenerate boxes).
    pub width: u32,
    /// Height in pixels (at least 1 for non-degenerate boxes).
    pub height: u32,
}

impl BubbleBox {
    /// Converts the normalized bottom-left-origin box into top-left pixel
    /// coordinates for an image of the given size.
    ///
    /// Coordinates are clamped into the image bounds; a box that would
    /// collapse entirely still yields a 1x1 rectangle.
    pub fn to_pixel_rect(&self, image_width: u32, image_height: u32) -> PixelRect {
        if image_width == 0 || image_height == 0 {
            return PixelRect {
                x: 0,
                y: 0,
                width: 1,
                height: 1,
            };
        }
        let w = image_width as f32;
        let h = image_height as f32;

        let left = (self.x.clamp(0.0, 1.0) * w).floor() as u32;
        // Flip Y: the detector measures from the bottom edge.
        let top_norm = (1.0 - self.y - self.height).clamp(0.0, 1.0);
        let top = (top_norm * h).floor() as u32;

        let left = left.min(image_width.saturating_sub(1));
        let top = top.min(image_height.saturating_sub(1));

        let width = ((self.width.clamp(0.0, 1.0) * w).round() as u32)
            .clamp(1, image_width - left);
        let height = ((self.height.clamp(0.0, 1.0) * h).round() as u32)
            .clamp(1, image_height - top);

        PixelRect {
            x: left,
            y: top,
            width,
            height,
        }
    }

    /// Crops this bubble out of a page image.
    pub fn crop_from(&self, page: &RgbImage) -> RgbImage {
        let rect = self.to_pixel_rect(page.width(), page.height());
        image::imageops::crop_imm(page, rect.x, rect.y, rect.width, rect.height).to_image()
    }
}
