//! Error types for Lære.

use thiserror::Error;

/// Library-level error type for Lære operations.
#[derive(Error, Debug)]
pub enum LaereError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No transcript available for this video{}", format_languages(.available_languages))]
    TranscriptUnavailable {
        /// Languages that do have caption tracks, for diagnostics.
        available_languages: Vec<String>,
    },

    #[error("Transcript for '{0}' produced no chunks")]
    EmptyTranscript(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Cannot build an index from empty input")]
    EmptyIndex,

    #[error("Embedding count ({embeddings}) does not match chunk count ({chunks})")]
    IndexMismatch { embeddings: usize, chunks: usize },

    #[error("No index found for document '{0}'")]
    IndexNotFound(String),

    #[error("Document '{0}' has not been ingested yet")]
    NotIngested(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("Index storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),
}

fn format_languages(languages: &[String]) -> String {
    if languages.is_empty() {
        String::new()
    } else {
        format!(". Available languages: {}", languages.join(", "))
    }
}

/// Result type alias for Lære operations.
pub type Result<T> = std::result::Result<T, LaereError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_unavailable_lists_languages() {
        let err = LaereError::TranscriptUnavailable {
            available_languages: vec!["de (German)".to_string(), "fr (French)".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("de (German)"));
        assert!(msg.contains("fr (French)"));

        let bare = LaereError::TranscriptUnavailable {
            available_languages: vec![],
        };
        assert!(!bare.to_string().contains("Available languages"));
    }
}
