//! YouTube transcript source.
//!
//! Caption tracks are discovered with yt-dlp and fetched over HTTP in json3
//! format. Track selection follows a fixed fallback contract: manually
//! created captions in a preferred language, then auto-generated captions in
//! a preferred language, then any manual track, then any auto track. The
//! first track that yields entries wins; if the chain is exhausted the error
//! reports which languages were available.

use super::{TranscriptDocument, TranscriptEntry, TranscriptSource, VideoMetadata};
use crate::error::{LaereError, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Whether a caption track was authored or machine-generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackKind {
    Manual,
    Auto,
}

/// One caption track discovered for a video.
#[derive(Debug, Clone)]
struct CaptionTrack {
    kind: TrackKind,
    language: String,
    /// Human-readable language name, when yt-dlp reports one.
    name: Option<String>,
    /// URL of the json3 payload.
    url: String,
}

impl CaptionTrack {
    fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", self.language, name),
            None => self.language.clone(),
        }
    }
}

/// YouTube transcript source backed by yt-dlp.
pub struct YoutubeSource {
    http: reqwest::Client,
    preferred_languages: Vec<String>,
}

impl YoutubeSource {
    /// Create a source preferring English captions.
    pub fn new() -> Self {
        Self::with_languages(vec!["en".to_string()])
    }

    /// Create a source with a custom preferred-language list.
    pub fn with_languages(preferred_languages: Vec<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            preferred_languages,
        }
    }

    /// Dump video info (metadata + caption tracks) with yt-dlp.
    async fn dump_info(&self, video_id: &str) -> Result<serde_json::Value> {
        let url = format!("https://www.youtube.com/watch?v={}", video_id);

        let output = tokio::process::Command::new("yt-dlp")
            .args([
                "--dump-json",
                "--no-download",
                "--no-warnings",
                &url,
            ])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    LaereError::ToolNotFound("yt-dlp".to_string())
                } else {
                    LaereError::ToolFailed(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp failed for {}: {}", video_id, stderr);
            return Err(LaereError::TranscriptUnavailable {
                available_languages: vec![],
            });
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&json_str)
            .map_err(|e| LaereError::ToolFailed(format!("Failed to parse yt-dlp output: {}", e)))
    }

    /// Fetch and parse the json3 payload of one caption track.
    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<TranscriptEntry>> {
        let body = self
            .http
            .get(&track.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_json3(&body)
    }
}

impl Default for YoutubeSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptSource for YoutubeSource {
    async fn fetch(&self, video_id: &str) -> Result<TranscriptDocument> {
        let info = self.dump_info(video_id).await?;
        let tracks = collect_tracks(&info);

        for track in order_tracks(&tracks, &self.preferred_languages) {
            match self.fetch_track(track).await {
                Ok(entries) if !entries.is_empty() => {
                    debug!(
                        "Selected {:?} caption track '{}' for {}",
                        track.kind, track.language, video_id
                    );
                    let text = entries
                        .iter()
                        .map(|e| e.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" ");
                    return Ok(TranscriptDocument {
                        text,
                        language: track.language.clone(),
                        entries,
                    });
                }
                Ok(_) => continue,
                Err(e) => {
                    warn!("Caption track '{}' failed: {}", track.language, e);
                    continue;
                }
            }
        }

        Err(LaereError::TranscriptUnavailable {
            available_languages: tracks.iter().map(CaptionTrack::label).collect(),
        })
    }

    async fn metadata(&self, video_id: &str) -> VideoMetadata {
        match self.dump_info(video_id).await {
            Ok(info) => VideoMetadata {
                title: info["title"].as_str().unwrap_or("Unknown Title").to_string(),
                duration_seconds: info["duration"].as_f64().unwrap_or(0.0) as u32,
                uploader: info["uploader"]
                    .as_str()
                    .or_else(|| info["channel"].as_str())
                    .unwrap_or("Unknown")
                    .to_string(),
            },
            Err(e) => {
                warn!("Metadata fetch failed for {}: {}", video_id, e);
                VideoMetadata::placeholder()
            }
        }
    }
}

/// Collect caption tracks from a yt-dlp info dump, manual tracks first.
fn collect_tracks(info: &serde_json::Value) -> Vec<CaptionTrack> {
    let mut tracks = Vec::new();
    for (field, kind) in [
        ("subtitles", TrackKind::Manual),
        ("automatic_captions", TrackKind::Auto),
    ] {
        let Some(map) = info[field].as_object() else {
            continue;
        };
        for (language, formats) in map {
            let Some(formats) = formats.as_array() else {
                continue;
            };
            let Some(json3) = formats
                .iter()
                .find(|f| f["ext"].as_str() == Some("json3"))
            else {
                continue;
            };
            let Some(url) = json3["url"].as_str() else {
                continue;
            };
            tracks.push(CaptionTrack {
                kind,
                language: language.clone(),
                name: json3["name"]
                    .as_str()
                    .or_else(|| formats.first().and_then(|f| f["name"].as_str()))
                    .map(|s| s.to_string()),
                url: url.to_string(),
            });
        }
    }
    tracks
}

/// Order tracks by the fallback contract: preferred-manual, preferred-auto,
/// any-manual, any-auto. Within one tier, discovery order is kept.
fn order_tracks<'a>(tracks: &'a [CaptionTrack], preferred: &[String]) -> Vec<&'a CaptionTrack> {
    let matches_lang = |track: &CaptionTrack, lang: &str| {
        track.language == lang || track.language.starts_with(&format!("{}-", lang))
    };

    fn push<'t>(track: &'t CaptionTrack, ordered: &mut Vec<&'t CaptionTrack>) {
        if !ordered.iter().any(|t| std::ptr::eq(*t, track)) {
            ordered.push(track);
        }
    }

    let mut ordered: Vec<&CaptionTrack> = Vec::new();
    for kind in [TrackKind::Manual, TrackKind::Auto] {
        for lang in preferred {
            for track in tracks.iter().filter(|t| t.kind == kind) {
                if matches_lang(track, lang) {
                    push(track, &mut ordered);
                }
            }
        }
    }
    for kind in [TrackKind::Manual, TrackKind::Auto] {
        for track in tracks.iter().filter(|t| t.kind == kind) {
            push(track, &mut ordered);
        }
    }

    ordered
}

/// Parse a YouTube json3 caption payload into normalized entries.
fn parse_json3(body: &str) -> Result<Vec<TranscriptEntry>> {
    let payload: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| LaereError::ToolFailed(format!("Failed to parse caption payload: {}", e)))?;

    let mut entries = Vec::new();
    let Some(events) = payload["events"].as_array() else {
        return Ok(entries);
    };

    for event in events {
        let Some(segs) = event["segs"].as_array() else {
            continue;
        };
        let text: String = segs
            .iter()
            .filter_map(|seg| seg["utf8"].as_str())
            .collect::<Vec<_>>()
            .join("");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            continue;
        }

        entries.push(TranscriptEntry {
            text,
            start_seconds: event["tStartMs"].as_f64().unwrap_or(0.0) / 1000.0,
            duration_seconds: event["dDurationMs"].as_f64().unwrap_or(0.0) / 1000.0,
        });
    }

    Ok(entries)
}
