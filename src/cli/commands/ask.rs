//! Ask command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    video: &str,
    question: &str,
    top_k: Option<usize>,
    settings: Settings,
) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Searching the transcript...");

    match orchestrator.ask(video, question, top_k).await {
        Ok(result) => {
            spinner.finish_and_clear();

            println!("\n{}\n", result.answer);

            if !result.context.is_empty() {
                Output::header("Context");
                for chunk in &result.context {
                    Output::context_chunk(chunk.index, chunk.distance, &chunk.text);
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to answer question: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
