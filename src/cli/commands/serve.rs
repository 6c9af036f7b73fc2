//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for processing videos and asking questions.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::LaereError;
use crate::orchestrator::Orchestrator;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let state = Arc::new(AppState { orchestrator });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/process-video", post(process_video))
        .route("/ask-question", post(ask_question))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Lære API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Process Video", "POST /process-video");
    Output::kv("Ask Question", "POST /ask-question");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ProcessVideoRequest {
    /// YouTube URL or video ID
    url: String,
    /// Force re-processing even if already indexed
    #[serde(default)]
    force: bool,
}

#[derive(Serialize)]
struct ProcessVideoResponse {
    success: bool,
    video_id: String,
    video_info: VideoInfo,
    transcript: String,
    transcript_language: String,
    notes: String,
    summary: String,
    chunks_indexed: usize,
    skipped: bool,
    source_url: String,
}

#[derive(Serialize)]
struct VideoInfo {
    title: String,
    duration: u32,
    uploader: String,
}

#[derive(Deserialize)]
struct AskQuestionRequest {
    video_id: String,
    question: String,
    #[serde(default)]
    top_k: Option<usize>,
}

#[derive(Serialize)]
struct AskQuestionResponse {
    success: bool,
    answer: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Map a pipeline error onto an HTTP status and user-visible message.
///
/// Validation errors carry their reason; anything internal is flattened to a
/// generic message so no internal detail leaks.
fn error_response(e: LaereError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, message) = match &e {
        LaereError::InvalidInput(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        LaereError::TranscriptUnavailable { .. } => (StatusCode::NOT_FOUND, e.to_string()),
        LaereError::NotIngested(_) => (StatusCode::NOT_FOUND, e.to_string()),
        LaereError::EmptyTranscript(_) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        _ => {
            error!("Internal error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred while handling the request.".to_string(),
            )
        }
    };

    (status, Json(ErrorResponse { error: message }))
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy", "message": "Laere API is running" }))
}

async fn process_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessVideoRequest>,
) -> impl IntoResponse {
    match state.orchestrator.process(&req.url, req.force).await {
        Ok(result) => Json(ProcessVideoResponse {
            success: true,
            video_id: result.video_id,
            video_info: VideoInfo {
                title: result.video_info.title,
                duration: result.video_info.duration_seconds,
                uploader: result.video_info.uploader,
            },
            transcript: result.transcript,
            transcript_language: result.transcript_language,
            notes: result.notes,
            summary: result.summary,
            chunks_indexed: result.chunks_indexed,
            skipped: result.skipped,
            source_url: result.source_url,
        })
        .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

async fn ask_question(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskQuestionRequest>,
) -> impl IntoResponse {
    match state
        .orchestrator
        .ask(&req.video_id, &req.question, req.top_k)
        .await
    {
        Ok(result) => Json(AskQuestionResponse {
            success: true,
            answer: result.answer,
        })
        .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let (status, _) = error_response(LaereError::InvalidInput("bad url".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = error_response(LaereError::TranscriptUnavailable {
            available_languages: vec![],
        });
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = error_response(LaereError::NotIngested("abc".to_string()));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = error_response(LaereError::EmptyTranscript("abc".to_string()));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = error_response(LaereError::Storage("index corrupt at /x".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        // Internal detail must not leak into the response body.
        assert!(!body.0.error.contains("/x"));
    }
}
