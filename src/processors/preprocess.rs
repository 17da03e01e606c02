//! Image-to-tensor preprocessing for the recognition model.
//!
//! The pretrained encoder requires an exact fixed input resolution, so the
//! bubble image is stretched to the target size without preserving aspect
//! ratio, then converted to a planar CHW f32 tensor under one of two
//! normalization conventions.

use crate::core::{OcrError, Tensor4D};
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Pixel normalization convention for the model input.
///
/// The pretrained weights behave measurably differently depending on which
/// convention feeds them; this is a property of how the model was trained,
/// not a defect. Both are supported and selectable per attempt, which is
/// what the orchestrator's retry policy exploits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    /// `pixel / 255`, values in `[0, 1]`.
    ZeroToOne,
    /// `pixel / 255 * 2 - 1`, values in `[-1, 1]`.
    MinusOneToOne,
}

impl Normalization {
    /// Returns the other convention, used by the retry policy.
    pub fn alternate(self) -> Self {
        match self {
            Normalization::ZeroToOne => Normalization::MinusOneToOne,
            Normalization::MinusOneToOne => Normalization::ZeroToOne,
        }
    }

    fn apply(self, value: f32) -> f32 {
        match self {
            Normalization::ZeroToOne => value,
            Normalization::MinusOneToOne => value * 2.0 - 1.0,
        }
    }
}

impl std::fmt::Display for Normalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Normalization::ZeroToOne => write!(f, "zero-to-one"),
            Normalization::MinusOneToOne => write!(f, "minus-one-to-one"),
        }
    }
}

/// Converts bubble images into model input tensors.
///
/// Output layout is `[1, 3, H, W]`: all of the red plane, then green, then
/// blue, each plane row-major top-to-bottom.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    target_size: (u32, u32),
}

impl ImagePreprocessor {
    /// Creates a preprocessor for the given target size `(width, height)`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either dimension is zero.
    pub fn new(target_size: (u32, u32)) -> Result<Self, OcrError> {
        if target_size.0 == 0 || target_size.1 == 0 {
            return Err(OcrError::config_error(format!(
                "target size must be non-zero, got {}x{}",
                target_size.0, target_size.1
            )));
        }
        Ok(Self { target_size })
    }

    /// Returns the target size `(width, height)`.
    pub fn target_size(&self) -> (u32, u32) {
        self.target_size
    }

    /// Preprocesses a bubble image into a normalized pixel tensor.
    ///
    /// The source is stretched to the target size with Catmull-Rom
    /// interpolation (the closest match to the bicubic resize the model
    /// was trained with), then each channel byte is scaled according to
    /// `normalization` and written into the planar output buffer.
    ///
    /// # Errors
    ///
    /// Fails with a processing error if the source image is empty or the
    /// tensor cannot be constructed; no partial tensor is returned.
    pub fn preprocess(
        &self,
        image: &RgbImage,
        normalization: Normalization,
    ) -> Result<Tensor4D, OcrError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(OcrError::resize_error(
                "cannot preprocess an empty image",
                crate::core::errors::SimpleError::new(format!(
                    "source dimensions {}x{}",
                    image.width(),
                    image.height()
                )),
            ));
        }

        let (width, height) = self.target_size;
        let resized =
            image::imageops::resize(image, width, height, image::imageops::FilterType::CatmullRom);

        let (width, height) = (width as usize, height as usize);
        let mut data = Vec::with_capacity(3 * height * width);

        for c in 0..3 {
            for y in 0..height {
                for x in 0..width {
                    let pixel = resized.get_pixel(x as u32, y as u32);
                    let value = pixel[c] as f32 / 255.0;
                    data.push(normalization.apply(value));
                }
            }
        }

        ndarray::Array4::from_shape_vec((1, 3, height, width), data).map_err(|e| {
            OcrError::tensor_operation(
                &format!(
                    "failed to create {}x{} pixel tensor in CHW layout",
                    width, height
                ),
                e,
            )
        })
    }
}
