//! Shared OpenAI API client construction.

use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Embedding and chat calls should not hang a pipeline indefinitely.
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Create an API client with a bounded request timeout.
///
/// Reads the API key from the `OPENAI_API_KEY` environment variable.
pub fn create_client() -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client");

    Client::with_config(OpenAIConfig::default()).with_http_client(http_client)
}
