//! Utility functions for loading bubble images.

use crate::core::OcrError;
use image::{DynamicImage, RgbImage};
use std::path::Path;

/// Converts a DynamicImage to an RgbImage.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Arguments
///
/// * `path` - Path of the image file to load.
///
/// # Errors
///
/// Returns `OcrError::ImageLoad` if the image cannot be opened or
/// decoded.
pub fn load_image(path: &Path) -> Result<RgbImage, OcrError> {
    let img = image::open(path).map_err(OcrError::ImageLoad)?;
    Ok(dynamic_to_rgb(img))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_image_is_a_load_error() {
        let result = load_image(Path::new("/nonexistent/bubble.png"));
        assert!(matches!(result, Err(OcrError::ImageLoad(_))));
    }

    #[test]
    fn round_trips_a_saved_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bubble.png");
        let img = RgbImage::from_pixel(3, 5, image::Rgb([9, 8, 7]));
        img.save_with_format(&path, image::ImageFormat::Png).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.dimensions(), (3, 5));
        assert_eq!(*loaded.get_pixel(0, 0), image::Rgb([9, 8, 7]));
    }
}
