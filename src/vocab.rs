//! Vocabulary table for subword token decoding.
//!
//! The pretrained tokenizer ships its vocabulary as a plain-text file, one
//! token per line, UTF-8 encoded. The 0-based line index is the token ID.
//! Blank lines produce no entry but do not shift the indices of later
//! lines, so the mapping can have holes.

use crate::core::OcrError;
use std::collections::HashMap;
use std::path::Path;

/// Placeholder returned when a token ID has no vocabulary entry.
pub const UNKNOWN_TOKEN: &str = "\u{FFFD}";

/// Index-to-token mapping loaded once at engine construction.
///
/// The table is immutable after load and can be shared across concurrent
/// recognition calls without synchronization.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    entries: HashMap<i32, String>,
    line_count: usize,
}

impl Vocabulary {
    /// Loads a vocabulary from a newline-separated token file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the vocabulary file.
    ///
    /// # Errors
    ///
    /// Returns `OcrError::VocabularyNotFound` if the file does not exist,
    /// or `OcrError::VocabularyRead` if it exists but cannot be read.
    /// Both are fatal for engine construction; there is no retry policy
    /// that can recover a missing token table.
    pub fn from_file(path: &Path) -> Result<Self, OcrError> {
        if !path.exists() {
            return Err(OcrError::VocabularyNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| OcrError::VocabularyRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::from_content(&content))
    }

    /// Builds a vocabulary from raw file content.
    ///
    /// Each line's 0-based index is its token ID. Lines that are empty
    /// after trimming produce no entry; their index is skipped, not
    /// shifted onto the next token.
    pub fn from_content(content: &str) -> Self {
        let mut entries = HashMap::new();
        let mut line_count = 0;

        for (index, line) in content.lines().enumerate() {
            line_count = index + 1;
            let token = line.trim();
            if token.is_empty() {
                continue;
            }
            entries.insert(index as i32, token.to_string());
        }

        Self {
            entries,
            line_count,
        }
    }

    /// Looks up the token string for an ID.
    ///
    /// IDs without an entry (negative, beyond the file, or pointing at a
    /// blank line) yield [`UNKNOWN_TOKEN`], never an error.
    pub fn lookup(&self, id: i32) -> &str {
        self.entries
            .get(&id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_TOKEN)
    }

    /// Returns the number of non-empty entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of lines in the source file, blank lines
    /// included. This equals the logit vector length the model produces.
    pub fn line_count(&self) -> usize {
        self.line_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn blank_lines_skip_indices_without_shifting() {
        let vocab = Vocabulary::from_content("[PAD]\n\n[BOS]\n[EOS]\n\nこん\n##にちは\n");
        assert_eq!(vocab.lookup(0), "[PAD]");
        assert_eq!(vocab.lookup(1), UNKNOWN_TOKEN);
        assert_eq!(vocab.lookup(2), "[BOS]");
        assert_eq!(vocab.lookup(3), "[EOS]");
        assert_eq!(vocab.lookup(5), "こん");
        assert_eq!(vocab.lookup(6), "##にちは");
        assert_eq!(vocab.len(), 5);
        assert_eq!(vocab.line_count(), 7);
    }

    #[test]
    fn out_of_range_lookup_yields_unknown_marker() {
        let vocab = Vocabulary::from_content("a\nb\n");
        assert_eq!(vocab.lookup(99), UNKNOWN_TOKEN);
        assert_eq!(vocab.lookup(-1), UNKNOWN_TOKEN);
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[PAD]").unwrap();
        writeln!(file, "token").unwrap();

        let vocab = Vocabulary::from_file(file.path()).unwrap();
        assert_eq!(vocab.lookup(1), "token");
    }

    #[test]
    fn missing_file_is_not_found() {
        let result = Vocabulary::from_file(Path::new("/nonexistent/vocab.txt"));
        assert!(matches!(result, Err(OcrError::VocabularyNotFound { .. })));
    }

    #[test]
    fn windows_line_endings_are_trimmed() {
        let vocab = Vocabulary::from_content("a\r\nb\r\n");
        assert_eq!(vocab.lookup(0), "a");
        assert_eq!(vocab.lookup(1), "b");
    }
}
