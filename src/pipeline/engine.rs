//! The OCR orchestrator: bubble image in, tagged outcome out.
//!
//! One recognition call runs a first attempt with the primary
//! normalization, then at most one retry according to the configured
//! policy, and classifies the result for the caller. Processing and
//! inference errors are converted into retry/failure decisions here; they
//! never propagate out of [`OcrEngine::recognize`].

use crate::core::{InferenceBackend, OcrError};
use crate::decoder::{BOS_TOKEN_ID, EOS_TOKEN_ID, PAD_TOKEN_ID, TokenDecoder};
use crate::pipeline::config::{OcrEngineConfig, RetryPolicy};
use crate::pipeline::debug_sink::DebugSampleSink;
use crate::processors::{
    DEFAULT_AUTOCROP_MARGIN, DEFAULT_INK_THRESHOLD, ImagePreprocessor, autocrop, crop_inset,
};
use crate::vocab::Vocabulary;
use image::RgbImage;

/// Identifies which code path produced a successful recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// The first attempt, using the primary normalization.
    Primary,
    /// The single retry attempt.
    Retry,
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::Primary => write!(f, "primary"),
            EngineKind::Retry => write!(f, "retry"),
        }
    }
}

/// Tagged outcome of one recognition call.
///
/// Failure is always distinguishable from success; the pipeline never
/// substitutes garbage text for a failed recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrOutcome {
    /// Recognition produced non-empty text.
    Success {
        /// The decoded text.
        text: String,
        /// Which attempt produced it.
        engine: EngineKind,
    },
    /// Both attempts failed or produced empty text.
    Failure {
        /// Short diagnostic suitable for display or logging.
        reason: String,
    },
}

impl OcrOutcome {
    /// Returns true for `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, OcrOutcome::Success { .. })
    }

    /// Returns the recognized text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            OcrOutcome::Success { text, .. } => Some(text),
            OcrOutcome::Failure { .. } => None,
        }
    }
}

/// The top-level recognition engine.
///
/// Construct once (vocabulary load and backend setup are the expensive
/// parts) and share by reference; `recognize` takes `&self` and the
/// engine holds no per-call state.
pub struct OcrEngine<B: InferenceBackend> {
    backend: B,
    vocabulary: Vocabulary,
    preprocessor: ImagePreprocessor,
    decoder: TokenDecoder,
    config: OcrEngineConfig,
    debug_sink: Option<DebugSampleSink>,
}

impl<B: InferenceBackend> OcrEngine<B> {
    /// Creates an engine from a backend, a loaded vocabulary, and a
    /// configuration.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the vocabulary is empty.
    /// Construction errors are fatal for the caller; there is no runtime
    /// recovery from a missing token table.
    pub fn new(
        backend: B,
        vocabulary: Vocabulary,
        config: OcrEngineConfig,
    ) -> Result<Self, OcrError> {
        config.validate()?;
        if vocabulary.is_empty() {
            return Err(OcrError::config_error(
                "vocabulary has no entries; the pipeline cannot decode without a token table",
            ));
        }

        let preprocessor = ImagePreprocessor::new(config.target_size)?;
        let decoder =
            TokenDecoder::new(BOS_TOKEN_ID, EOS_TOKEN_ID, PAD_TOKEN_ID, config.max_tokens)?;
        let debug_sink = config.debug_dir.clone().map(DebugSampleSink::new);

        Ok(Self {
            backend,
            vocabulary,
            preprocessor,
            decoder,
            config,
            debug_sink,
        })
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &OcrEngineConfig {
        &self.config
    }

    /// Returns the loaded vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Recognizes the text in one speech-bubble crop.
    ///
    /// The first attempt uses the primary normalization convention. If it
    /// errors or decodes to an empty string, exactly one retry runs per
    /// the configured policy. On final failure the input image is written
    /// to the debug sink (best-effort) keyed by `sample_id`, and the
    /// returned outcome carries a diagnostic reason.
    ///
    /// This method never panics and never returns a raw pipeline error.
    pub fn recognize(&self, image: &RgbImage, sample_id: &str) -> OcrOutcome {
        let input = if self.config.autocrop {
            autocrop(image, DEFAULT_AUTOCROP_MARGIN, DEFAULT_INK_THRESHOLD)
        } else {
            image.clone()
        };

        let primary = self.config.primary_normalization;
        let first_failure = match self.attempt(&input, primary) {
            Ok(text) if !text.is_empty() => {
                tracing::debug!(sample_id, chars = text.chars().count(), "recognized on first attempt");
                return OcrOutcome::Success {
                    text,
                    engine: EngineKind::Primary,
                };
            }
            Ok(_) => {
                tracing::debug!(sample_id, normalization = %primary, "first attempt empty, retrying");
                "empty recognition result".to_string()
            }
            Err(e) => {
                tracing::warn!(sample_id, error = %e, "first attempt failed, retrying");
                e.to_string()
            }
        };

        let retry = match self.config.retry_policy {
            RetryPolicy::AlternateNormalization => self.attempt(&input, primary.alternate()),
            RetryPolicy::CropInset { inset } => {
                self.attempt(&crop_inset(&input, inset), primary)
            }
        };

        let retry_failure = match retry {
            Ok(text) if !text.is_empty() => {
                tracing::debug!(sample_id, chars = text.chars().count(), "recognized on retry attempt");
                return OcrOutcome::Success {
                    text,
                    engine: EngineKind::Retry,
                };
            }
            Ok(_) => "empty recognition result".to_string(),
            Err(e) => e.to_string(),
        };

        let reason = format!(
            "first attempt: {}; retry attempt: {}",
            first_failure, retry_failure
        );
        tracing::warn!(sample_id, %reason, "recognition failed");

        if let Some(sink) = &self.debug_sink {
            // The original input, not the retry crop, is what's useful for
            // offline inspection.
            sink.save(sample_id, image);
        }

        OcrOutcome::Failure { reason }
    }

    /// Runs one preprocess-generate-decode attempt.
    fn attempt(
        &self,
        image: &RgbImage,
        normalization: crate::processors::Normalization,
    ) -> Result<String, OcrError> {
        let pixel_values = self.preprocessor.preprocess(image, normalization)?;
        let tokens = self.decoder.generate(&self.backend, &pixel_values)?;
        Ok(self.decoder.decode(&tokens, &self.vocabulary))
    }
}
