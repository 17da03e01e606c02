//! Image processing utilities for the recognition pipeline.
//!
//! This module contains the image-to-tensor preprocessor and the cropping
//! transforms used before preprocessing and by the crop-inset retry
//! policy.

pub mod crop;
pub mod preprocess;

pub use crop::{DEFAULT_AUTOCROP_MARGIN, DEFAULT_INK_THRESHOLD, autocrop, crop_inset};
pub use preprocess::{ImagePreprocessor, Normalization};
