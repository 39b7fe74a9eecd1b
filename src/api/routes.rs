use axum::{
    body::Bytes,
    routing::post,
    Router,
    extract::State,
    response::{IntoResponse, Response},
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::services::ServeFile;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::{Result, AppError};
use crate::api::models::{AnalyzeRequest, AnswerResponse};
use crate::api::response;
use crate::extract::{truncate_chars, MAX_TEXT_CHARS};
use crate::fetcher::is_url;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    let static_dir = app_state.config.static_dir.clone();

    Router::new()
        .route("/api/analyze", post(analyze_handler))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route_service("/nozylot.ico", ServeFile::new(static_dir.join("nozylot.ico")))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn analyze_handler(State(state): State<AppState>, body: Bytes) -> Response {
    // Unreadable bodies fall through to validation as an empty request
    let req: AnalyzeRequest = serde_json::from_slice(&body).unwrap_or_default();
    let start_time = Instant::now();

    match process_analyze_request(&state, &req).await {
        Ok(answer) => {
            info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "analyze succeeded");
            response::success(answer).into_response()
        }
        Err(err) => {
            warn!(
                kind = err.kind(),
                status = err.status().as_u16(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "analyze failed: {}",
                err
            );
            err.into_response()
        }
    }
}

/// Validate the request, obtain content from exactly one source and ask the model.
pub async fn process_analyze_request(state: &AppState, req: &AnalyzeRequest) -> Result<AnswerResponse> {
    let req = req.normalized();

    if req.question.is_empty() {
        return Err(AppError::Validation("question is required".to_string()));
    }

    let content = match (req.url.is_empty(), req.text.is_empty()) {
        (false, false) => {
            return Err(AppError::Validation("provide either url or text, not both".to_string()));
        }
        (true, true) => {
            return Err(AppError::Validation("provide url or text".to_string()));
        }
        (false, true) => {
            if !is_url(&req.url) {
                return Err(AppError::Validation("invalid url".to_string()));
            }
            info!(url = %req.url, "analyzing page");
            state.fetcher.fetch_text(&req.url).await.map_err(|e| {
                warn!(url = %req.url, "page fetch failed: {}", e);
                AppError::from(e)
            })?
        }
        (true, false) => {
            info!(text_chars = req.text.chars().count(), "analyzing pasted text");
            truncate_chars(&req.text, MAX_TEXT_CHARS).to_string()
        }
    };

    if content.is_empty() {
        return Err(AppError::Extraction("no text could be extracted".to_string()));
    }

    let answer = state.answers.ask(&content, &req.question).await?;

    Ok(AnswerResponse { answer })
}
