//! Autoregressive token generation and vocabulary decoding.
//!
//! The generation loop feeds the model its own output one token at a
//! time: starting from the begin-of-sequence token, each step asks the
//! inference backend for next-token logits over the full prefix, picks the
//! argmax, and stops on end-of-sequence or at the length bound. Decoding
//! maps the resulting IDs back to text through the vocabulary table.

use crate::core::{InferenceBackend, OcrError, Tensor4D};
use crate::vocab::Vocabulary;

/// Padding token ID of the pretrained tokenizer.
pub const PAD_TOKEN_ID: i32 = 0;
/// Begin-of-sequence token ID of the pretrained tokenizer.
pub const BOS_TOKEN_ID: i32 = 2;
/// End-of-sequence token ID of the pretrained tokenizer.
pub const EOS_TOKEN_ID: i32 = 3;
/// Maximum number of generation steps per attempt.
pub const MAX_TOKEN_LENGTH: usize = 64;

/// Prefix marking a vocabulary entry that continues the previous word
/// without a space.
pub const SUBWORD_MARKER: &str = "##";

/// Greedy decoder for the encoder-decoder recognition model.
#[derive(Debug, Clone)]
pub struct TokenDecoder {
    bos_token_id: i32,
    eos_token_id: i32,
    pad_token_id: i32,
    max_tokens: usize,
}

impl Default for TokenDecoder {
    fn default() -> Self {
        Self {
            bos_token_id: BOS_TOKEN_ID,
            eos_token_id: EOS_TOKEN_ID,
            pad_token_id: PAD_TOKEN_ID,
            max_tokens: MAX_TOKEN_LENGTH,
        }
    }
}

impl TokenDecoder {
    /// Creates a token decoder with explicit special IDs and length bound.
    ///
    /// # Arguments
    ///
    /// * `bos_token_id` - Begin-of-sequence ID seeding each generation.
    /// * `eos_token_id` - End-of-sequence ID terminating generation.
    /// * `pad_token_id` - Padding ID filtered from decoded output.
    /// * `max_tokens` - Upper bound on generation steps (at least 1).
    pub fn new(
        bos_token_id: i32,
        eos_token_id: i32,
        pad_token_id: i32,
        max_tokens: usize,
    ) -> Result<Self, OcrError> {
        if max_tokens == 0 {
            return Err(OcrError::config_error(
                "max_tokens must be at least 1",
            ));
        }
        Ok(Self {
            bos_token_id,
            eos_token_id,
            pad_token_id,
            max_tokens,
        })
    }

    /// Runs the greedy generation loop against an inference backend.
    ///
    /// The returned sequence starts with BOS and includes EOS when the
    /// model produced one within the length bound; hitting the bound
    /// without EOS truncates the sequence and is not an error. The loop is
    /// inherently sequential: step N+1 depends on step N's output.
    ///
    /// # Errors
    ///
    /// A backend failure at any step aborts the whole generation; no
    /// partial sequence is returned.
    pub fn generate<B: InferenceBackend + ?Sized>(
        &self,
        backend: &B,
        pixel_values: &Tensor4D,
    ) -> Result<Vec<i32>, OcrError> {
        let mut tokens = Vec::with_capacity(self.max_tokens + 1);
        tokens.push(self.bos_token_id);

        for step in 0..self.max_tokens {
            let logits = backend.predict_next(pixel_values, &tokens)?;
            if logits.is_empty() {
                return Err(OcrError::invalid_input(
                    "inference backend returned an empty logit vector",
                ));
            }

            // Greedy argmax; strict greater-than keeps the lowest index on
            // ties.
            let mut best_index = 0usize;
            let mut best_value = logits[0];
            for (index, &value) in logits.iter().enumerate().skip(1) {
                if value > best_value {
                    best_value = value;
                    best_index = index;
                }
            }

            let next_token = best_index as i32;
            tokens.push(next_token);
            tracing::trace!(step, token = next_token, "generated token");

            if next_token == self.eos_token_id {
                break;
            }
        }

        Ok(tokens)
    }

    /// Decodes a token sequence into text through the vocabulary.
    ///
    /// BOS, EOS, and PAD are skipped; remaining IDs are looked up (absent
    /// IDs yield the unknown marker) and concatenated with no separator.
    /// Every `"##"` subword continuation marker is then removed, merging
    /// the subword onto its predecessor. An empty result is a value, not
    /// an error; the orchestrator treats it as a retry signal.
    pub fn decode(&self, tokens: &[i32], vocabulary: &Vocabulary) -> String {
        let mut text = String::new();
        for &id in tokens {
            if id == self.bos_token_id || id == self.eos_token_id || id == self.pad_token_id {
                continue;
            }
            text.push_str(vocabulary.lookup(id));
        }
        text.replace(SUBWORD_MARKER, "")
    }

    /// Returns the maximum number of generation steps.
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::SimpleError;
    use std::cell::RefCell;

    /// Backend that replays a scripted list of logit vectors.
    struct ScriptedBackend {
        steps: RefCell<Vec<Result<Vec<f32>, ()>>>,
        calls: RefCell<usize>,
    }

    impl ScriptedBackend {
        fn new(steps: Vec<Result<Vec<f32>, ()>>) -> Self {
            Self {
                steps: RefCell::new(steps),
                calls: RefCell::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.borrow()
        }
    }

    impl InferenceBackend for ScriptedBackend {
        fn predict_next(
            &self,
            _pixel_values: &Tensor4D,
            token_prefix: &[i32],
        ) -> Result<Vec<f32>, OcrError> {
            assert!(!token_prefix.is_empty());
            assert_eq!(token_prefix[0], BOS_TOKEN_ID);
            *self.calls.borrow_mut() += 1;
            let mut steps = self.steps.borrow_mut();
            if steps.is_empty() {
                // Past the script: keep emitting EOS.
                return Ok(one_hot(EOS_TOKEN_ID as usize, 8));
            }
            steps
                .remove(0)
                .map_err(|_| OcrError::inference_error(SimpleError::new("scripted failure")))
        }
    }

    fn one_hot(index: usize, len: usize) -> Vec<f32> {
        let mut logits = vec![0.0; len];
        logits[index] = 10.0;
        logits
    }

    fn dummy_tensor() -> Tensor4D {
        ndarray::Array4::zeros((1, 3, 4, 4))
    }

    #[test]
    fn generation_stops_on_eos_and_includes_it() {
        let backend = ScriptedBackend::new(vec![
            Ok(one_hot(5, 8)),
            Ok(one_hot(6, 8)),
            Ok(one_hot(EOS_TOKEN_ID as usize, 8)),
        ]);
        let decoder = TokenDecoder::default();
        let tokens = decoder.generate(&backend, &dummy_tensor()).unwrap();

        assert_eq!(tokens, vec![BOS_TOKEN_ID, 5, 6, EOS_TOKEN_ID]);
        assert_eq!(backend.calls(), 3);
    }

    #[test]
    fn generation_truncates_at_max_length_without_eos() {
        let steps: Vec<_> = (0..100).map(|_| Ok(one_hot(5, 8))).collect();
        let backend = ScriptedBackend::new(steps);
        let decoder = TokenDecoder::default();
        let tokens = decoder.generate(&backend, &dummy_tensor()).unwrap();

        assert_eq!(tokens.len(), MAX_TOKEN_LENGTH + 1);
        assert_eq!(backend.calls(), MAX_TOKEN_LENGTH);
        assert!(tokens[1..].iter().all(|&t| t == 5));
    }

    #[test]
    fn argmax_ties_break_to_lowest_index() {
        let backend = ScriptedBackend::new(vec![Ok(vec![1.0, 5.0, 5.0, 5.0])]);
        let decoder = TokenDecoder::new(BOS_TOKEN_ID, 1, PAD_TOKEN_ID, 4).unwrap();
        let tokens = decoder.generate(&backend, &dummy_tensor()).unwrap();

        // Index 1 wins the three-way tie and happens to be EOS here.
        assert_eq!(tokens, vec![BOS_TOKEN_ID, 1]);
    }

    #[test]
    fn backend_failure_aborts_generation() {
        let backend = ScriptedBackend::new(vec![Ok(one_hot(5, 8)), Err(())]);
        let decoder = TokenDecoder::default();
        let result = decoder.generate(&backend, &dummy_tensor());

        assert!(matches!(result, Err(OcrError::Inference(_))));
    }

    #[test]
    fn decode_filters_specials_and_merges_subwords() {
        let vocab = Vocabulary::from_content("[PAD]\n\n[BOS]\n[EOS]\n\nこん\n##にちは\n");
        let decoder = TokenDecoder::default();

        assert_eq!(
            decoder.decode(&[BOS_TOKEN_ID, 5, 6, EOS_TOKEN_ID], &vocab),
            "こんにちは"
        );
    }

    #[test]
    fn bos_eos_only_decodes_to_empty_string() {
        let vocab = Vocabulary::from_content("[PAD]\n\n[BOS]\n[EOS]\n");
        let decoder = TokenDecoder::default();
        assert_eq!(decoder.decode(&[BOS_TOKEN_ID, EOS_TOKEN_ID], &vocab), "");
    }

    #[test]
    fn decode_never_inserts_separators() {
        // Adjacent word-level tokens are concatenated without a space.
        // Only the explicit "##" marker affects adjacency.
        let vocab = Vocabulary::from_content("hello\nworld\nwor\n##ld\n");
        let decoder = TokenDecoder::new(98, 99, 97, 16).unwrap();

        assert_eq!(decoder.decode(&[0, 1], &vocab), "helloworld");
        assert_eq!(decoder.decode(&[2, 3], &vocab), "world");
    }

    #[test]
    fn decode_subword_merge_law() {
        let vocab = Vocabulary::from_content("skip0\nskip1\nskip2\nskip3\nwor\n##ld\n");
        let decoder = TokenDecoder::default();
        assert_eq!(decoder.decode(&[BOS_TOKEN_ID, 4, 5, EOS_TOKEN_ID], &vocab), "world");
    }

    #[test]
    fn unknown_id_decodes_to_marker() {
        let vocab = Vocabulary::from_content("a\nb\n");
        let decoder = TokenDecoder::default();
        assert_eq!(decoder.decode(&[99], &vocab), "\u{FFFD}");
    }

    #[test]
    fn pad_tokens_are_filtered() {
        let vocab = Vocabulary::from_content("[PAD]\nx\ny\nz\n");
        let decoder = TokenDecoder::default();
        assert_eq!(decoder.decode(&[PAD_TOKEN_ID, 1, PAD_TOKEN_ID], &vocab), "x");
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        assert!(TokenDecoder::new(2, 3, 0, 0).is_err());
    }
}
