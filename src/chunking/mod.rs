//! Transcript chunking for retrieval.
//!
//! Splits a transcript into overlapping word windows so that retrieval near
//! chunk boundaries still sees surrounding context.

use crate::error::{LaereError, Result};
use serde::{Deserialize, Serialize};

/// A chunk of transcript text used as the atomic retrieval unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of this chunk in the chunk sequence (0-based).
    pub index: usize,
    /// Joined text of the chunk's words.
    pub text: String,
    /// Number of words in this chunk.
    pub word_count: usize,
}

/// Configuration for word-window chunking.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    /// Words per chunk.
    pub window_words: usize,
    /// Words shared between consecutive chunks.
    pub overlap_words: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            window_words: 500,
            overlap_words: 100,
        }
    }
}

/// Split text into overlapping word windows.
///
/// Words are whitespace-separated. Each chunk covers `window_words` words
/// (the last may be shorter) and consecutive chunks share `overlap_words`
/// words. Output is a pure function of the inputs.
pub fn chunk_words(text: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    if config.window_words == 0 {
        return Err(LaereError::InvalidInput(
            "chunk window must be at least 1 word".to_string(),
        ));
    }
    if config.overlap_words >= config.window_words {
        return Err(LaereError::InvalidInput(format!(
            "chunk overlap ({}) must be smaller than the window ({})",
            config.overlap_words, config.window_words
        )));
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let stride = config.window_words - config.overlap_words;

    let mut chunks = Vec::new();
    let mut offset = 0;
    while offset < words.len() {
        let end = (offset + config.window_words).min(words.len());
        let window = &words[offset..end];
        chunks.push(Chunk {
            index: chunks.len(),
            text: window.join(" "),
            word_count: window.len(),
        });
        offset += stride;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunks = chunk_words("", &ChunkingConfig::default()).unwrap();
        assert!(chunks.is_empty());

        let chunks = chunk_words("   \n\t  ", &ChunkingConfig::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_short_text_yields_single_chunk() {
        let text = numbered_words(10);
        let chunks = chunk_words(&text, &ChunkingConfig::default()).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].word_count, 10);
        assert_eq!(chunks[0].text, text);
    }

    #[test]
    fn test_default_config_stride() {
        // 600 words with window 500 / overlap 100 gives chunks at offsets
        // 0 and 400: words 0-499 and 400-599.
        let text = numbered_words(600);
        let chunks = chunk_words(&text, &ChunkingConfig::default()).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].word_count, 500);
        assert_eq!(chunks[1].word_count, 200);
        assert!(chunks[0].text.starts_with("w0 "));
        assert!(chunks[1].text.starts_with("w400 "));
        assert!(chunks[1].text.ends_with(" w599"));
    }

    #[test]
    fn test_overlap_invariant() {
        let config = ChunkingConfig {
            window_words: 10,
            overlap_words: 3,
        };
        let text = numbered_words(25);
        let chunks = chunk_words(&text, &config).unwrap();

        for pair in chunks.windows(2) {
            let prev: Vec<&str> = pair[0].text.split(' ').collect();
            let next: Vec<&str> = pair[1].text.split(' ').collect();
            let tail = &prev[prev.len() - config.overlap_words..];
            let head = &next[..config.overlap_words.min(next.len())];
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_every_word_covered() {
        let config = ChunkingConfig {
            window_words: 7,
            overlap_words: 2,
        };
        let n = 40;
        let text = numbered_words(n);
        let chunks = chunk_words(&text, &config).unwrap();

        let mut seen = vec![false; n];
        for chunk in &chunks {
            for word in chunk.text.split(' ') {
                let i: usize = word[1..].parse().unwrap();
                seen[i] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_no_empty_trailing_chunk() {
        // 20 words, window 10, overlap 0: exactly two chunks, no empty third.
        let config = ChunkingConfig {
            window_words: 10,
            overlap_words: 0,
        };
        let chunks = chunk_words(&numbered_words(20), &config).unwrap();
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.word_count > 0));
    }

    #[test]
    fn test_chunk_indices_are_sequential() {
        let config = ChunkingConfig {
            window_words: 5,
            overlap_words: 1,
        };
        let chunks = chunk_words(&numbered_words(23), &config).unwrap();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let zero_window = ChunkingConfig {
            window_words: 0,
            overlap_words: 0,
        };
        assert!(matches!(
            chunk_words("a b c", &zero_window),
            Err(LaereError::InvalidInput(_))
        ));

        let overlap_too_large = ChunkingConfig {
            window_words: 5,
            overlap_words: 5,
        };
        assert!(matches!(
            chunk_words("a b c", &overlap_too_large),
            Err(LaereError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_deterministic() {
        let text = numbered_words(137);
        let config = ChunkingConfig {
            window_words: 12,
            overlap_words: 4,
        };
        let a = chunk_words(&text, &config).unwrap();
        let b = chunk_words(&text, &config).unwrap();
        assert_eq!(a, b);
    }
}
