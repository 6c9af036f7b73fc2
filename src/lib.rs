//! Lære - Video Transcripts as Queryable Knowledge
//!
//! A CLI tool and HTTP service that turns a video's spoken transcript into a
//! searchable knowledge base.
//!
//! The name "Lære" comes from the Norwegian word for "learn."
//!
//! # Overview
//!
//! Lære allows you to:
//! - Fetch transcripts for YouTube videos (with language fallback)
//! - Split transcripts into overlapping word-window chunks and index their
//!   embeddings for nearest-neighbor retrieval
//! - Generate study notes and summaries
//! - Ask questions answered from the most relevant transcript chunks
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and prompt templates
//! - `transcript` - Transcript source abstraction (YouTube)
//! - `chunking` - Word-window chunking
//! - `embedding` - Embedding generation
//! - `index` - Per-document vector index storage and search
//! - `retrieval` - Ingestion and query orchestration
//! - `generation` - Notes, summaries and answer generation
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use laere::config::Settings;
//! use laere::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let result = orchestrator.process("dQw4w9WgXcQ", false).await?;
//!     println!("Indexed {} chunks", result.chunks_indexed);
//!
//!     let answer = orchestrator.ask("dQw4w9WgXcQ", "What is this about?", None).await?;
//!     println!("{}", answer.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod openai;
pub mod orchestrator;
pub mod retrieval;
pub mod transcript;

pub use error::{LaereError, Result};
