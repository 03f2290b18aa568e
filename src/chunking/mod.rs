//! Token-window chunking for place documents.
//!
//! Tokens are approximated by a word/punctuation regex; chunk text is sliced
//! from the source text so whitespace and formatting survive.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w+|[^\w\s]").expect("static token regex"))
}

/// A chunk of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Text content of this chunk.
    pub content: String,
    /// Approximate token count.
    pub tokens: usize,
    /// Order of this chunk in the document.
    pub order: i32,
}

/// Fixed-size token window chunker with overlap.
#[derive(Debug, Clone, Copy)]
pub struct TokenChunker {
    size: usize,
    overlap: usize,
}

impl TokenChunker {
    /// Create a chunker. Overlap is clamped below `size`.
    pub fn new(size: usize, overlap: usize) -> Self {
        let size = size.max(1);
        Self {
            size,
            overlap: overlap.min(size - 1),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into overlapping windows of at most `size` tokens.
    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        let spans: Vec<(usize, usize)> = token_pattern()
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect();

        if spans.is_empty() {
            return Vec::new();
        }

        // Short documents stay whole, untrimmed
        if spans.len() <= self.size {
            return vec![TextChunk {
                content: text.trim().to_string(),
                tokens: spans.len(),
                order: 0,
            }];
        }

        let step = self.size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut order = 0;

        loop {
            let end = (start + self.size).min(spans.len());
            let content = &text[spans[start].0..spans[end - 1].1];
            chunks.push(TextChunk {
                content: content.to_string(),
                tokens: end - start,
                order,
            });
            order += 1;

            if end == spans.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}

impl Default for TokenChunker {
    fn default() -> Self {
        Self::new(1200, 100)
    }
}
