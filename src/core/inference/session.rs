//! Helpers for working directly with ONNX Runtime sessions.

use crate::core::errors::OcrError;
use ort::session::Session;
use std::path::Path;

/// Loads an ONNX Runtime session from a model file.
///
/// # Arguments
///
/// * `model_path` - Path to the `.onnx` model file.
///
/// # Errors
///
/// Returns a configuration error if the file does not exist, or a session
/// error if ONNX Runtime rejects the model.
pub fn load_session(model_path: impl AsRef<Path>) -> Result<Session, OcrError> {
    let path = model_path.as_ref();
    if !path.exists() {
        return Err(OcrError::config_error(format!(
            "model file not found at '{}'",
            path.display()
        )));
    }
    let session = Session::builder()?.commit_from_file(path)?;
    Ok(session)
}
