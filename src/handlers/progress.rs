//! Assessment progress handlers

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;

use crate::{error::AppResult, models::ProgressRecord, state::AppState};

/// Recorded scores for one candidate
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub candidate_id: String,
    pub records: Vec<ProgressRecord>,
}

async fn get_progress(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
) -> AppResult<Json<ProgressResponse>> {
    let records = state.assessments().progress(&candidate_id).await?;
    Ok(Json(ProgressResponse {
        candidate_id,
        records,
    }))
}

/// Progress routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/{candidate_id}", get(get_progress))
}
