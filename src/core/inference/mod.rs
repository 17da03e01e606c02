//! The inference adapter boundary of the OCR pipeline.
//!
//! The token generation loop is written against the [`InferenceBackend`]
//! trait rather than a concrete model runtime. [`OrtSeq2SeqInfer`] binds
//! the trait to an ONNX Runtime export of the pretrained encoder-decoder;
//! tests substitute scripted backends.

mod seq2seq;
mod session;

pub use seq2seq::OrtSeq2SeqInfer;
pub use session::load_session;

use crate::core::{OcrError, Tensor4D};

/// The external collaborator contract wrapped by the token decoder.
///
/// Given the preprocessed pixel tensor and the full token-id prefix
/// generated so far, an implementation returns the logit vector for the
/// position immediately following the prefix. The vector length equals
/// the vocabulary size.
///
/// The prefix grows by one element per generation step and is passed in
/// full each call; no incremental state is assumed at this boundary.
/// Implementations must either be safe to call from one generation loop
/// at a time or provide their own internal synchronization.
pub trait InferenceBackend {
    /// Predicts the next-token logits for the given prefix.
    ///
    /// # Arguments
    ///
    /// * `pixel_values` - Preprocessed image tensor `[1, 3, H, W]`.
    /// * `token_prefix` - The token-id sequence generated so far, starting
    ///   with the begin-of-sequence token. Never empty.
    ///
    /// # Errors
    ///
    /// Returns `OcrError::Inference` (or a session error) if the model
    /// invocation fails; the caller aborts the current attempt.
    fn predict_next(
        &self,
        pixel_values: &Tensor4D,
        token_prefix: &[i32],
    ) -> Result<Vec<f32>, OcrError>;
}
