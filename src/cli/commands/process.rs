//! Process command implementation.

use crate::cli::output::format_duration;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the process command.
pub async fn run_process(input: &str, force: bool, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Fetching transcript and building the index...");

    match orchestrator.process(input, force).await {
        Ok(result) if result.skipped => {
            spinner.finish_and_clear();
            Output::info(&format!(
                "Video {} is already processed. Use --force to re-process it.",
                result.video_id
            ));
        }
        Ok(result) => {
            spinner.finish_and_clear();

            Output::header("Video");
            Output::kv("Title", &result.video_info.title);
            Output::kv("Uploader", &result.video_info.uploader);
            Output::kv(
                "Duration",
                &format_duration(result.video_info.duration_seconds),
            );
            Output::kv("Transcript language", &result.transcript_language);
            Output::kv("Chunks indexed", &result.chunks_indexed.to_string());
            Output::kv("URL", &result.source_url);

            Output::header("Summary");
            println!("{}", result.summary);

            Output::header("Study Notes");
            println!("{}", result.notes);

            println!();
            Output::success(&format!(
                "Processed {}. Ask questions with 'laere ask {} \"...\"'",
                result.video_id, result.video_id
            ));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to process video: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
