//! The core module of the bubble OCR pipeline.
//!
//! This module contains the fundamental components of the pipeline:
//! - Error handling
//! - The inference adapter boundary and its ONNX Runtime implementation
//! - Tensor type aliases
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod errors;
pub mod inference;

pub use errors::{OcrError, OcrResult, ProcessingStage};
pub use inference::{InferenceBackend, OrtSeq2SeqInfer, load_session};

/// A 4-dimensional f32 tensor in `[batch, channel, height, width]` layout.
pub type Tensor4D = ndarray::Array4<f32>;

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and
/// formatting layer. It's typically called at the start of an application
/// to enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
