//! Cropping transforms applied before preprocessing.
//!
//! `autocrop` tightens a bubble crop to its ink bounding box so the fixed
//! stretch-resize wastes less resolution on background. `crop_inset`
//! removes a fixed border fraction and backs the crop-inset retry policy.

use image::RgbImage;

/// Margin in pixels kept around the detected ink bounding box.
pub const DEFAULT_AUTOCROP_MARGIN: u32 = 4;

/// Luma value below which a pixel counts as ink. Bubble interiors are
/// near-white, so anything darker than this is treated as text.
pub const DEFAULT_INK_THRESHOLD: u8 = 250;

/// Crops an image to the bounding box of its ink pixels plus a margin.
///
/// Pixels with luma below `ink_threshold` are treated as ink. If the image
/// contains no ink at all, the input is returned unchanged.
///
/// # Arguments
///
/// * `image` - The bubble crop to tighten.
/// * `margin` - Pixels of background kept around the ink bounding box.
/// * `ink_threshold` - Luma cutoff separating ink from background.
pub fn autocrop(image: &RgbImage, margin: u32, ink_threshold: u8) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        // ITU-R BT.601 luma, same weighting as `image::imageops::grayscale`.
        let luma = (0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32)
            .round() as u8;
        if luma < ink_threshold {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
            found = true;
        }
    }

    if !found {
        tracing::debug!("autocrop found no ink pixels, keeping full image");
        return image.clone();
    }

    let x = min_x.saturating_sub(margin);
    let y = min_y.saturating_sub(margin);
    let crop_w = (max_x + margin + 1).min(width) - x;
    let crop_h = (max_y + margin + 1).min(height) - y;

    image::imageops::crop_imm(image, x, y, crop_w, crop_h).to_image()
}

/// Crops a fixed fraction off every side of the image.
///
/// `inset` is clamped so that at least one pixel remains in each
/// dimension. An inset of `0.0` returns the image unchanged.
pub fn crop_inset(image: &RgbImage, inset: f32) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || inset <= 0.0 {
        return image.clone();
    }

    let inset = inset.min(0.45);
    let dx = (width as f32 * inset) as u32;
    let dy = (height as f32 * inset) as u32;
    let crop_w = (width - 2 * dx).max(1);
    let crop_h = (height - 2 * dy).max(1);

    image::imageops::crop_imm(image, dx, dy, crop_w, crop_h).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn autocrop_tightens_to_ink_plus_margin() {
        let mut img = RgbImage::from_pixel(40, 40, Rgb([255, 255, 255]));
        // Ink block at (10..20, 12..18)
        for y in 12..18 {
            for x in 10..20 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }

        let cropped = autocrop(&img, 2, DEFAULT_INK_THRESHOLD);
        assert_eq!(cropped.dimensions(), (10 + 4, 6 + 4));
        // Ink survives the crop.
        assert_eq!(*cropped.get_pixel(2, 2), Rgb([0, 0, 0]));
    }

    #[test]
    fn autocrop_without_ink_returns_full_image() {
        let img = RgbImage::from_pixel(16, 16, Rgb([255, 255, 255]));
        let cropped = autocrop(&img, DEFAULT_AUTOCROP_MARGIN, DEFAULT_INK_THRESHOLD);
        assert_eq!(cropped.dimensions(), (16, 16));
    }

    #[test]
    fn autocrop_margin_clamps_at_borders() {
        let mut img = RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]));
        img.put_pixel(0, 0, Rgb([0, 0, 0]));
        let cropped = autocrop(&img, 4, DEFAULT_INK_THRESHOLD);
        assert_eq!(cropped.dimensions(), (5, 5));
    }

    #[test]
    fn crop_inset_removes_border_fraction() {
        let img = RgbImage::from_pixel(100, 50, Rgb([10, 10, 10]));
        let cropped = crop_inset(&img, 0.1);
        assert_eq!(cropped.dimensions(), (80, 40));
    }

    #[test]
    fn crop_inset_never_collapses_to_zero() {
        let img = RgbImage::from_pixel(3, 3, Rgb([10, 10, 10]));
        let cropped = crop_inset(&img, 0.45);
        assert!(cropped.width() >= 1 && cropped.height() >= 1);
    }
}
