//! CLI module for Lære.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Lære - Video Transcripts as Queryable Knowledge
///
/// Fetch a video's transcript, index it for semantic search, and ask
/// questions about it. The name "Lære" comes from the Norwegian word for
/// "learn."
#[derive(Parser, Debug)]
#[command(name = "laere")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a video: fetch transcript, index it, and generate study notes
    Process {
        /// YouTube URL or video ID
        input: String,

        /// Force re-processing even if already indexed
        #[arg(short, long)]
        force: bool,
    },

    /// Ask a question about a processed video
    Ask {
        /// YouTube URL or video ID
        video: String,

        /// The question to ask
        question: String,

        /// Number of transcript chunks to retrieve as context
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// List processed videos
    List,

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "5000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
