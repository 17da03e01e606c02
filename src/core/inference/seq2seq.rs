//! ONNX Runtime implementation of the sequence-to-sequence inference
//! boundary, with support for session pooling.

use super::InferenceBackend;
use super::session::load_session;
use crate::core::errors::{OcrError, SimpleError};
use crate::core::Tensor4D;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Name of the pixel tensor input in the exported model.
const PIXEL_VALUES_INPUT: &str = "pixel_values";
/// Name of the token-prefix input in the exported model.
const DECODER_INPUT_IDS_INPUT: &str = "decoder_input_ids";

/// ONNX Runtime backend for the pretrained encoder-decoder model.
///
/// The exported model takes two inputs per call: the full pixel tensor
/// `[1, 3, H, W]` and the complete decoder token prefix `[1, N]`. It
/// returns logits either as `[1, N, vocab]` (one row per prefix position,
/// the last row is the next-token distribution) or as `[1, vocab]`.
///
/// Sessions are pooled behind `Mutex` and picked round-robin, so one
/// instance can serve concurrent recognition calls.
pub struct OrtSeq2SeqInfer {
    sessions: Vec<Mutex<Session>>,
    next_idx: AtomicUsize,
    output_name: String,
    model_path: PathBuf,
}

impl std::fmt::Debug for OrtSeq2SeqInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtSeq2SeqInfer")
            .field("sessions", &self.sessions.len())
            .field("output_name", &self.output_name)
            .field("model_path", &self.model_path)
            .finish()
    }
}

impl OrtSeq2SeqInfer {
    /// Creates a backend with a single session.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path to the exported `.onnx` model.
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self, OcrError> {
        Self::with_pool(model_path, 1)
    }

    /// Creates a backend with a pool of identical sessions.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path to the exported `.onnx` model.
    /// * `pool_size` - Number of sessions to create (at least 1).
    pub fn with_pool(model_path: impl AsRef<Path>, pool_size: usize) -> Result<Self, OcrError> {
        let path = model_path.as_ref();
        if pool_size == 0 {
            return Err(OcrError::config_error(
                "session pool size must be at least 1",
            ));
        }

        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            sessions.push(Mutex::new(load_session(path)?));
        }

        let output_name = {
            let session = sessions[0].lock().map_err(|_| {
                OcrError::invalid_input("failed to acquire session lock during construction")
            })?;
            session
                .outputs
                .first()
                .map(|o| o.name.clone())
                .ok_or_else(|| {
                    OcrError::invalid_input(
                        "no outputs available in session - model may be invalid or corrupted",
                    )
                })?
        };

        tracing::debug!(
            model = %path.display(),
            pool_size,
            output = %output_name,
            "loaded seq2seq inference sessions"
        );

        Ok(Self {
            sessions,
            next_idx: AtomicUsize::new(0),
            output_name,
            model_path: path.to_path_buf(),
        })
    }

    /// Returns the model path associated with this backend.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl InferenceBackend for OrtSeq2SeqInfer {
    fn predict_next(
        &self,
        pixel_values: &Tensor4D,
        token_prefix: &[i32],
    ) -> Result<Vec<f32>, OcrError> {
        if token_prefix.is_empty() {
            return Err(OcrError::invalid_input(
                "token prefix must contain at least the begin-of-sequence token",
            ));
        }

        let prefix_len = token_prefix.len();
        let decoder_ids =
            ndarray::Array2::from_shape_vec((1, prefix_len), token_prefix.to_vec())?;

        let pixel_tensor = TensorRef::from_array_view(pixel_values.view()).map_err(|e| {
            OcrError::tensor_operation("failed to convert pixel tensor for inference", e)
        })?;
        let ids_tensor = TensorRef::from_array_view(decoder_ids.view()).map_err(|e| {
            OcrError::tensor_operation("failed to convert decoder input ids for inference", e)
        })?;

        let inputs = ort::inputs![
            PIXEL_VALUES_INPUT => pixel_tensor,
            DECODER_INPUT_IDS_INPUT => ids_tensor
        ];

        let idx = self.next_idx.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| {
            OcrError::inference_error(SimpleError::new(format!(
                "failed to acquire session lock for session {}/{}",
                idx,
                self.sessions.len()
            )))
        })?;

        let outputs = session_guard
            .run(inputs)
            .map_err(OcrError::inference_error)?;

        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                OcrError::inference_error(SimpleError::new(format!(
                    "failed to extract output tensor '{}' as f32: {}",
                    self.output_name, e
                )))
            })?;

        // The logit row for the position following the prefix is the last
        // row of a [1, N, vocab] output, or the whole row of a [1, vocab]
        // output.
        match output_shape.len() {
            3 => {
                let seq_len = output_shape[1] as usize;
                let vocab_size = output_shape[2] as usize;
                if seq_len == 0 || output_data.len() != seq_len * vocab_size {
                    return Err(OcrError::inference_error(SimpleError::new(format!(
                        "logit tensor shape {:?} does not match data length {}",
                        output_shape,
                        output_data.len()
                    ))));
                }
                let start = (seq_len - 1) * vocab_size;
                Ok(output_data[start..start + vocab_size].to_vec())
            }
            2 => {
                let vocab_size = output_shape[1] as usize;
                if output_data.len() != vocab_size {
                    return Err(OcrError::inference_error(SimpleError::new(format!(
                        "logit tensor shape {:?} does not match data length {}",
                        output_shape,
                        output_data.len()
                    ))));
                }
                Ok(output_data.to_vec())
            }
            dims => Err(OcrError::inference_error(SimpleError::new(format!(
                "expected 2D or 3D logit tensor, got {}D with shape {:?}",
                dims, output_shape
            )))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_file_is_a_config_error() {
        let result = OrtSeq2SeqInfer::new("no/such/model.onnx");
        assert!(matches!(result, Err(OcrError::ConfigError { .. })));
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let result = OrtSeq2SeqInfer::with_pool("no/such/model.onnx", 0);
        assert!(matches!(result, Err(OcrError::ConfigError { .. })));
    }
}
