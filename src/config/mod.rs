//! Configuration module for Lære.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnswerPrompts, NotesPrompts, Prompts, SummaryPrompts};
pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, GenerationSettings, IndexSettings,
    PromptSettings, Settings, TranscriptSettings,
};
