//! Text generation for notes, summaries and question answering.
//!
//! The generator itself is a capability boundary consuming prompts and
//! returning text; `StudyGenerator` layers the prompt templates and
//! transcript truncation limits on top of it.

mod openai;

pub use openai::OpenAIGenerator;

use crate::config::{GenerationSettings, Prompts};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// Transcripts are truncated before prompting to stay inside model context.
const NOTES_TRANSCRIPT_CHARS: usize = 8000;
const SUMMARY_TRANSCRIPT_CHARS: usize = 6000;

/// Trait for text generation backends.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Complete a prompt pair into generated text.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String>;
}

/// Produces study outputs (notes, summaries, answers) from transcripts.
pub struct StudyGenerator {
    generator: Arc<dyn Generator>,
    prompts: Prompts,
    settings: GenerationSettings,
}

impl StudyGenerator {
    /// Create a study generator over a generation backend.
    pub fn new(generator: Arc<dyn Generator>, prompts: Prompts, settings: GenerationSettings) -> Self {
        Self {
            generator,
            prompts,
            settings,
        }
    }

    /// Generate structured study notes for a transcript.
    #[instrument(skip(self, transcript))]
    pub async fn notes(&self, transcript: &str, title: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("title".to_string(), title.to_string());
        vars.insert(
            "transcript".to_string(),
            truncate_chars(transcript, NOTES_TRANSCRIPT_CHARS).to_string(),
        );

        let user = self.prompts.render_with_custom(&self.prompts.notes.user, &vars);
        self.generator
            .complete(
                &self.prompts.notes.system,
                &user,
                self.settings.notes_max_tokens,
                self.settings.temperature,
            )
            .await
    }

    /// Generate a concise summary of a transcript.
    #[instrument(skip(self, transcript))]
    pub async fn summary(&self, transcript: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert(
            "transcript".to_string(),
            truncate_chars(transcript, SUMMARY_TRANSCRIPT_CHARS).to_string(),
        );

        let user = self
            .prompts
            .render_with_custom(&self.prompts.summary.user, &vars);
        self.generator
            .complete(
                &self.prompts.summary.system,
                &user,
                self.settings.summary_max_tokens,
                self.settings.temperature,
            )
            .await
    }

    /// Answer a question from retrieved transcript segments.
    #[instrument(skip(self, context))]
    pub async fn answer(&self, context: &str, question: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), context.to_string());

        let user = self
            .prompts
            .render_with_custom(&self.prompts.answer.user, &vars);
        self.generator
            .complete(
                &self.prompts.answer.system,
                &user,
                self.settings.answer_max_tokens,
                self.settings.temperature,
            )
            .await
    }
}

/// Truncate to at most `max_chars` characters on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
