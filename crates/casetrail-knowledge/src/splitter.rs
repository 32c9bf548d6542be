//! Character-based text splitter with overlap.
//!
//! Splits documents into chunks of at most `chunk_size` characters,
//! preferring paragraph breaks, then line breaks, then whitespace, and
//! hard-cutting only when no boundary exists in the back half of the
//! window. Consecutive chunks overlap by `overlap` characters so that
//! statements spanning a boundary stay retrievable.

use crate::error::KnowledgeError;

/// Overlapping chunk splitter.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl TextSplitter {
    /// Create a splitter. The overlap must be strictly smaller than the
    /// chunk size or the split loop could not make progress.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, KnowledgeError> {
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(KnowledgeError::InvalidChunking {
                chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Split `text` into overlapping chunks. Whitespace-only fragments are
    /// dropped; a document shorter than the chunk size yields one chunk.
    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let window_end = (start + self.chunk_size).min(chars.len());
            let end = if window_end < chars.len() {
                self.break_point(&chars, start, window_end)
            } else {
                window_end
            };

            let chunk: String = chars[start..end].iter().collect();
            let chunk = chunk.trim();
            if !chunk.is_empty() {
                chunks.push(chunk.to_string());
            }

            if end >= chars.len() {
                break;
            }

            // Back up by the overlap, but always move forward.
            let next = end.saturating_sub(self.overlap);
            start = if next > start { next } else { end };
        }

        chunks
    }

    /// Pick a split position in `[start, window_end)`, scanning backward
    /// from the window end for the best boundary. Only the back half of
    /// the window is considered so chunks stay near the target size.
    fn break_point(&self, chars: &[char], start: usize, window_end: usize) -> usize {
        let floor = start + self.chunk_size / 2;

        // Paragraph break.
        for i in (floor..window_end).rev() {
            if chars[i] == '\n' && i > 0 && chars[i - 1] == '\n' {
                return i + 1;
            }
        }
        // Line break.
        for i in (floor..window_end).rev() {
            if chars[i] == '\n' {
                return i + 1;
            }
        }
        // Any whitespace.
        for i in (floor..window_end).rev() {
            if chars[i].is_whitespace() {
                return i + 1;
            }
        }

        window_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_document_is_one_chunk() {
        let splitter = TextSplitter::new(800, 100).unwrap();
        let chunks = splitter.split("Structuring involves breaking large transactions into smaller ones.");
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].starts_with("Structuring"));
    }

    #[test]
    fn long_document_yields_bounded_overlapping_chunks() {
        let splitter = TextSplitter::new(100, 20).unwrap();
        let sentence = "Transaction monitoring systems flag unusual account activity. ";
        let text = sentence.repeat(20);

        let chunks = splitter.split(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
            assert!(!chunk.is_empty());
        }

        // Overlap: the tail of one chunk reappears at the head of the next.
        for pair in chunks.windows(2) {
            let tail: String = pair[0]
                .chars()
                .rev()
                .take(10)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            assert!(
                pair[1].contains(tail.trim()),
                "expected overlap between consecutive chunks"
            );
        }
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let splitter = TextSplitter::new(60, 10).unwrap();
        let text = format!("{}\n\n{}", "a".repeat(45), "b".repeat(45));
        let chunks = splitter.split(&text);
        assert_eq!(chunks[0], "a".repeat(45));
    }

    #[test]
    fn whitespace_only_input_yields_nothing() {
        let splitter = TextSplitter::new(800, 100).unwrap();
        assert!(splitter.split("   \n\n   ").is_empty());
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        assert!(TextSplitter::new(100, 100).is_err());
        assert!(TextSplitter::new(0, 0).is_err());
        assert!(TextSplitter::new(100, 99).is_ok());
    }
}
