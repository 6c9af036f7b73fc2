//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    match orchestrator.list().await {
        Ok(documents) => {
            if documents.is_empty() {
                Output::info("No videos processed yet. Use 'laere process <url>' to add one.");
            } else {
                Output::header(&format!("Processed Videos ({})", documents.len()));
                println!();

                for doc in &documents {
                    Output::document_info(
                        &doc.document_id,
                        doc.chunk_count,
                        &doc.indexed_at.format("%Y-%m-%d %H:%M").to_string(),
                    );
                }

                let total_chunks: usize = documents.iter().map(|d| d.chunk_count).sum();
                println!();
                Output::kv("Total videos", &documents.len().to_string());
                Output::kv("Total chunks", &total_chunks.to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list videos: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
