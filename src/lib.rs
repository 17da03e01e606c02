//! # Bubble OCR
//!
//! A Rust library that decodes Japanese text from manga speech-bubble
//! crops using a pretrained ONNX encoder-decoder recognition model.
//!
//! ## Features
//!
//! - Image preprocessing with two selectable normalization conventions
//! - Autoregressive greedy token generation with a bounded loop
//! - Subword vocabulary decoding with `##` continuation-marker merging
//! - Two-tier retry policy recovering empty recognitions
//! - ONNX Runtime integration behind a swappable inference trait
//!
//! ## Modules
//!
//! * [`core`] - Error handling, tensor aliases, and the inference boundary
//! * [`decoder`] - Token generation loop and vocabulary decoding
//! * [`domain`] - Bubble bounding-box types shared with the detector
//! * [`pipeline`] - The recognition engine and its retry policy
//! * [`processors`] - Image preprocessing and cropping
//! * [`vocab`] - Vocabulary table loading
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bubble_ocr::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let vocabulary = Vocabulary::from_file(Path::new("models/vocab.txt"))?;
//! let backend = OrtSeq2SeqInfer::new("models/manga_ocr.onnx")?;
//! let engine = OcrEngine::new(backend, vocabulary, OcrEngineConfig::default())?;
//!
//! let bubble = load_image(Path::new("bubble.png"))?;
//! match engine.recognize(&bubble, "page-001-bubble-03") {
//!     OcrOutcome::Success { text, engine } => println!("[{engine}] {text}"),
//!     OcrOutcome::Failure { reason } => eprintln!("recognition failed: {reason}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod decoder;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod utils;
pub mod vocab;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use bubble_ocr::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{InferenceBackend, OcrError, OcrResult, OrtSeq2SeqInfer};
    pub use crate::pipeline::{EngineKind, OcrEngine, OcrEngineConfig, OcrOutcome, RetryPolicy};
    pub use crate::processors::Normalization;
    pub use crate::utils::load_image;
    pub use crate::vocab::Vocabulary;
}
