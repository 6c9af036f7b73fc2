//! Pipeline orchestrator for Lære.
//!
//! Coordinates the full process: transcript fetch, chunking + indexing, and
//! study-output generation, plus question answering over a built index.

use crate::chunking::ChunkingConfig;
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{LaereError, Result};
use crate::generation::{Generator, OpenAIGenerator, StudyGenerator};
use crate::index::{DocumentSummary, FsIndexStore, IndexStore, ScoredChunk};
use crate::retrieval::RetrievalService;
use crate::transcript::{extract_video_id, TranscriptSource, VideoMetadata, YoutubeSource};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Placeholder bodies when non-critical generation fails.
const NOTES_UNAVAILABLE: &str = "Notes could not be generated.";
const SUMMARY_UNAVAILABLE: &str = "Summary could not be generated.";

/// Answer body when retrieval finds nothing relevant.
const NO_RELEVANT_CONTENT: &str =
    "Sorry, couldn't find relevant content for this video and question.";

/// The main orchestrator for the Lære pipeline.
pub struct Orchestrator {
    settings: Settings,
    source: Arc<dyn TranscriptSource>,
    store: Arc<dyn IndexStore>,
    retrieval: RetrievalService,
    study: StudyGenerator,
}

impl Orchestrator {
    /// Create a new orchestrator with default components.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let source: Arc<dyn TranscriptSource> = Arc::new(YoutubeSource::with_languages(
            settings.transcript.preferred_languages.clone(),
        ));
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));
        let store: Arc<dyn IndexStore> = Arc::new(FsIndexStore::new(
            &settings.index_dir(),
            settings.embedding.dimensions as usize,
        )?);
        let generator: Arc<dyn Generator> = Arc::new(OpenAIGenerator::new(&settings.generation.model));

        Ok(Self::with_components(
            settings, prompts, source, embedder, store, generator,
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        source: Arc<dyn TranscriptSource>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn IndexStore>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        let chunking = ChunkingConfig {
            window_words: settings.chunking.window_words,
            overlap_words: settings.chunking.overlap_words,
        };
        let retrieval = RetrievalService::new(embedder, store.clone(), chunking);
        let study = StudyGenerator::new(generator, prompts, settings.generation.clone());

        Self {
            settings,
            source,
            store,
            retrieval,
            study,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Process a video: fetch transcript, chunk + embed + index, and generate
    /// study notes and a summary. An already-processed video is skipped
    /// unless `force` is set; re-processing replaces its index.
    #[instrument(skip(self), fields(input = %input))]
    pub async fn process(&self, input: &str, force: bool) -> Result<ProcessResult> {
        let video_id = extract_video_id(input).ok_or_else(|| {
            LaereError::InvalidInput(format!("Not a YouTube URL or video id: {}", input))
        })?;

        if !force && self.retrieval.is_ingested(&video_id).await? {
            info!("Video {} is already processed, skipping", video_id);
            return Ok(ProcessResult {
                source_url: format!("https://www.youtube.com/watch?v={}", video_id),
                video_id,
                video_info: VideoMetadata::placeholder(),
                transcript: String::new(),
                transcript_language: String::new(),
                notes: String::new(),
                summary: String::new(),
                chunks_indexed: 0,
                skipped: true,
            });
        }

        info!("Fetching transcript for {}", video_id);
        let transcript = self.source.fetch(&video_id).await?;

        let ingest = self.retrieval.ingest(&video_id, &transcript.text).await?;
        info!("Indexed {} chunks for {}", ingest.chunks_indexed, video_id);

        let video_info = self.source.metadata(&video_id).await;

        // Notes and summary are non-critical outputs: a generation failure
        // degrades to a placeholder instead of aborting the pipeline.
        let notes = match self.study.notes(&transcript.text, &video_info.title).await {
            Ok(notes) => notes,
            Err(e) => {
                warn!("Notes generation failed: {}", e);
                NOTES_UNAVAILABLE.to_string()
            }
        };
        let summary = match self.study.summary(&transcript.text).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Summary generation failed: {}", e);
                SUMMARY_UNAVAILABLE.to_string()
            }
        };

        Ok(ProcessResult {
            source_url: format!("https://www.youtube.com/watch?v={}", video_id),
            video_id,
            video_info,
            transcript: transcript.text,
            transcript_language: transcript.language,
            notes,
            summary,
            chunks_indexed: ingest.chunks_indexed,
            skipped: false,
        })
    }

    /// Answer a question about a processed video.
    ///
    /// Retrieval coming back empty is not an error: the answer body says no
    /// relevant content was found. A failing answer generation aborts, since
    /// the answer is the sole requested output.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, video: &str, question: &str, top_k: Option<usize>) -> Result<AskResult> {
        let video_id = extract_video_id(video).ok_or_else(|| {
            LaereError::InvalidInput(format!("Not a YouTube URL or video id: {}", video))
        })?;
        if question.trim().is_empty() {
            return Err(LaereError::InvalidInput("Question is empty".to_string()));
        }

        let k = top_k.unwrap_or(self.settings.generation.top_k);
        let context = self.retrieval.query(&video_id, question, k).await?;

        if context.is_empty() {
            return Ok(AskResult {
                video_id,
                answer: NO_RELEVANT_CONTENT.to_string(),
                context,
            });
        }

        let context_text = context
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let answer = self.study.answer(&context_text, question).await?;

        Ok(AskResult {
            video_id,
            answer,
            context,
        })
    }

    /// List all processed videos.
    pub async fn list(&self) -> Result<Vec<DocumentSummary>> {
        self.store.list().await
    }
}

/// Result of processing a video.
///
/// When processing was skipped, only `video_id`, `source_url` and `skipped`
/// are meaningful; the remaining fields are empty or placeholder values.
#[derive(Debug)]
pub struct ProcessResult {
    /// Video ID.
    pub video_id: String,
    /// Canonical watch URL.
    pub source_url: String,
    /// Best-effort video metadata.
    pub video_info: VideoMetadata,
    /// Full transcript text.
    pub transcript: String,
    /// Language of the selected caption track.
    pub transcript_language: String,
    /// Generated study notes.
    pub notes: String,
    /// Generated summary.
    pub summary: String,
    /// Number of chunks indexed.
    pub chunks_indexed: usize,
    /// Whether processing was skipped (already ingested).
    pub skipped: bool,
}

/// Result of answering a question.
#[derive(Debug)]
pub struct AskResult {
    /// Video ID.
    pub video_id: String,
    /// The generated answer.
    pub answer: String,
    /// Retrieved chunks the answer was grounded on.
    pub context: Vec<ScoredChunk>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::Generator;
    use crate::index::MemoryIndexStore;
    use crate::transcript::{TranscriptDocument, TranscriptEntry};
    use async_trait::async_trait;

    struct StubSource {
        text: String,
    }

    #[async_trait]
    impl TranscriptSource for StubSource {
        async fn fetch(&self, _video_id: &str) -> Result<TranscriptDocument> {
            if self.text.is_empty() {
                return Err(LaereError::TranscriptUnavailable {
                    available_languages: vec!["de (German)".to_string()],
                });
            }
            Ok(TranscriptDocument {
                text: self.text.clone(),
                language: "en".to_string(),
                entries: vec![TranscriptEntry {
                    text: self.text.clone(),
                    start_seconds: 0.0,
                    duration_seconds: 1.0,
                }],
            })
        }

        async fn metadata(&self, _video_id: &str) -> VideoMetadata {
            VideoMetadata {
                title: "Stub Lecture".to_string(),
                duration_seconds: 60,
                uploader: "Stub Channel".to_string(),
            }
        }
    }

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![
                text.len() as f32,
                text.split_whitespace().count() as f32,
            ])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    struct StubGenerator {
        fail: bool,
    }

    #[async_trait]
    impl Generator for StubGenerator {
        async fn complete(&self, _: &str, user: &str, _: u32, _: f32) -> Result<String> {
            if self.fail {
                Err(LaereError::Generation("backend down".to_string()))
            } else {
                Ok(format!("generated from: {}", &user[..user.len().min(40)]))
            }
        }
    }

    fn orchestrator(transcript: &str, generator_fails: bool) -> Orchestrator {
        Orchestrator::with_components(
            Settings::default(),
            Prompts::default(),
            Arc::new(StubSource {
                text: transcript.to_string(),
            }),
            Arc::new(StubEmbedder),
            Arc::new(MemoryIndexStore::new(2)),
            Arc::new(StubGenerator {
                fail: generator_fails,
            }),
        )
    }

    #[tokio::test]
    async fn test_process_happy_path() {
        let orch = orchestrator("the cat sat on the mat and the dog barked loudly", false);

        let result = orch.process("dQw4w9WgXcQ", false).await.unwrap();
        assert_eq!(result.video_id, "dQw4w9WgXcQ");
        assert_eq!(result.video_info.title, "Stub Lecture");
        assert_eq!(result.transcript_language, "en");
        assert_eq!(result.chunks_indexed, 1);
        assert!(!result.skipped);
        assert!(result.notes.starts_with("generated from:"));
        assert!(result.summary.starts_with("generated from:"));
    }

    #[tokio::test]
    async fn test_process_rejects_bad_input() {
        let orch = orchestrator("words", false);
        let err = orch.process("https://vimeo.com/42", false).await.unwrap_err();
        assert!(matches!(err, LaereError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_process_skips_already_ingested() {
        let orch = orchestrator("the cat sat on the mat", false);
        orch.process("dQw4w9WgXcQ", false).await.unwrap();

        let result = orch.process("dQw4w9WgXcQ", false).await.unwrap();
        assert!(result.skipped);
        assert_eq!(result.chunks_indexed, 0);
        assert_eq!(result.video_id, "dQw4w9WgXcQ");
        // The existing index stays queryable.
        let ask = orch.ask("dQw4w9WgXcQ", "what?", None).await.unwrap();
        assert!(!ask.context.is_empty());
    }

    #[tokio::test]
    async fn test_process_force_reprocesses() {
        let orch = orchestrator("the cat sat on the mat", false);
        orch.process("dQw4w9WgXcQ", false).await.unwrap();

        let result = orch.process("dQw4w9WgXcQ", true).await.unwrap();
        assert!(!result.skipped);
        assert_eq!(result.chunks_indexed, 1);
        assert!(result.notes.starts_with("generated from:"));
    }

    #[tokio::test]
    async fn test_process_degrades_notes_and_summary() {
        let orch = orchestrator("a transcript with enough words to index", true);

        let result = orch.process("dQw4w9WgXcQ", false).await.unwrap();
        assert_eq!(result.notes, NOTES_UNAVAILABLE);
        assert_eq!(result.summary, SUMMARY_UNAVAILABLE);
        // Indexing still succeeded.
        assert_eq!(result.chunks_indexed, 1);
    }

    #[tokio::test]
    async fn test_process_propagates_transcript_unavailable() {
        let orch = orchestrator("", false);
        let err = orch.process("dQw4w9WgXcQ", false).await.unwrap_err();
        assert!(matches!(err, LaereError::TranscriptUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_ask_round_trip() {
        let orch = orchestrator("the cat sat on the mat", false);
        orch.process("dQw4w9WgXcQ", false).await.unwrap();

        let result = orch
            .ask("dQw4w9WgXcQ", "what did the cat do?", None)
            .await
            .unwrap();
        assert!(result.answer.starts_with("generated from:"));
        assert!(!result.context.is_empty());
    }

    #[tokio::test]
    async fn test_ask_before_process_is_not_ingested() {
        let orch = orchestrator("words here", false);
        let err = orch.ask("dQw4w9WgXcQ", "anything?", None).await.unwrap_err();
        assert!(matches!(err, LaereError::NotIngested(_)));
    }

    #[tokio::test]
    async fn test_ask_aborts_when_generation_fails() {
        let orch = orchestrator("the cat sat on the mat", true);
        orch.process("dQw4w9WgXcQ", false).await.unwrap();

        let err = orch
            .ask("dQw4w9WgXcQ", "what did the cat do?", None)
            .await
            .unwrap_err();
        assert!(matches!(err, LaereError::Generation(_)));
    }

    #[tokio::test]
    async fn test_ask_rejects_empty_question() {
        let orch = orchestrator("words", false);
        let err = orch.ask("dQw4w9WgXcQ", "   ", None).await.unwrap_err();
        assert!(matches!(err, LaereError::InvalidInput(_)));
    }
}
