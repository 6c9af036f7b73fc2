//! Transcript source abstraction for Lære.
//!
//! A transcript source resolves a video identifier to its spoken-word
//! transcript and (best-effort) metadata. Entries are normalized into one
//! typed record at this boundary; the rest of the pipeline never sees
//! source-specific representations.

mod youtube;

pub use youtube::YoutubeSource;

use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// One timed caption entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Caption text.
    pub text: String,
    /// Start time in seconds.
    pub start_seconds: f64,
    /// Duration in seconds.
    pub duration_seconds: f64,
}

/// A fetched transcript: full text plus the timed entries it was joined from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptDocument {
    /// Entry texts joined with single spaces.
    pub text: String,
    /// Language code of the selected caption track.
    pub language: String,
    /// The normalized timed entries.
    pub entries: Vec<TranscriptEntry>,
}

/// Video metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub duration_seconds: u32,
    pub uploader: String,
}

impl VideoMetadata {
    /// Placeholder record substituted when metadata cannot be fetched.
    pub fn placeholder() -> Self {
        Self {
            title: "Unknown Title".to_string(),
            duration_seconds: 0,
            uploader: "Unknown".to_string(),
        }
    }
}

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for a video.
    async fn fetch(&self, video_id: &str) -> Result<TranscriptDocument>;

    /// Fetch video metadata. Best-effort: failures yield the placeholder
    /// record instead of an error, so metadata never aborts a pipeline.
    async fn metadata(&self, video_id: &str) -> VideoMetadata;
}

/// Extract a video id from a YouTube URL or a bare 11-character id.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    // Bare video ID (11 characters)
    let bare_id = Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("Invalid regex");
    if bare_id.is_match(input) {
        return Some(input.to_string());
    }

    let parsed = Url::parse(input).ok()?;
    let host = parsed.host_str()?.trim_start_matches("www.");

    let candidate = match host {
        "youtube.com" | "m.youtube.com" => {
            let path = parsed.path();
            if path == "/watch" {
                parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned())
            } else if let Some(rest) = path.strip_prefix("/embed/").or_else(|| path.strip_prefix("/v/")) {
                Some(rest.to_string())
            } else {
                None
            }
        }
        "youtu.be" => parsed.path_segments()?.next().map(|s| s.to_string()),
        _ => None,
    }?;

    bare_id.is_match(&candidate).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_video_id_rejects_other_input() {
        assert_eq!(extract_video_id("not-a-video-id"), None);
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("https://vimeo.com/123456"), None);
        assert_eq!(
            extract_video_id("https://www.youtube.com/playlist?list=PLtest"),
            None
        );
    }

    #[test]
    fn test_placeholder_metadata() {
        let meta = VideoMetadata::placeholder();
        assert_eq!(meta.title, "Unknown Title");
        assert_eq!(meta.duration_seconds, 0);
        assert_eq!(meta.uploader, "Unknown");
    }
}
