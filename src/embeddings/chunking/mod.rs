
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{QaError, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_OVERLAP: usize = 50;

/// A window of words taken from a single document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The window's words joined by single spaces
    pub text: String,
    /// Identifier of the document the words came from
    pub source_document: String,
    /// Position of this chunk within its document
    pub ordinal: usize,
}

/// Configuration for word-window chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum number of words per chunk
    pub chunk_size: usize,
    /// Number of words shared by adjacent chunks
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    #[inline]
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        let config = Self {
            chunk_size,
            overlap,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would produce a zero stride
    #[inline]
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(QaError::InvalidConfiguration(
                "chunk size must be at least 1 word".to_string(),
            ));
        }

        if self.overlap >= self.chunk_size {
            return Err(QaError::InvalidConfiguration(format!(
                "overlap ({}) must be smaller than chunk size ({})",
                self.overlap, self.chunk_size
            )));
        }

        Ok(())
    }

    /// Number of words between the starts of adjacent windows
    #[inline]
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

/// Split `text` into overlapping word windows.
///
/// Windows start at word `0, stride, 2 * stride, ...` and hold up to
/// `chunk_size` words. Windowing stops at the first window that reaches the
/// end of the text, so no trailing chunk consists only of overlap.
#[inline]
pub fn chunk_text(text: &str, source_document: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    config.validate()?;

    let words = text.split_whitespace().collect::<Vec<_>>();
    let mut chunks = Vec::with_capacity(expected_chunk_count(words.len(), config));

    let mut start = 0;
    while start < words.len() {
        let end = (start + config.chunk_size).min(words.len());
        let joined = words[start..end].join(" ");

        if !joined.trim().is_empty() {
            chunks.push(Chunk {
                text: joined,
                source_document: source_document.to_string(),
                ordinal: chunks.len(),
            });
        }

        if end == words.len() {
            break;
        }
        start += config.stride();
    }

    debug!(
        "Chunked '{}' ({} words) into {} chunks",
        source_document,
        words.len(),
        chunks.len()
    );

    Ok(chunks)
}

/// Number of chunks `chunk_text` produces for `word_count` words
#[inline]
pub fn expected_chunk_count(word_count: usize, config: &ChunkingConfig) -> usize {
    if word_count == 0 || config.chunk_size == 0 || config.overlap >= config.chunk_size {
        return 0;
    }

    word_count
        .saturating_sub(config.overlap)
        .div_ceil(config.stride())
        .max(1)
}
