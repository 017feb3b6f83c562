//! Problem handler implementations

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::{error::AppResult, models::Verdict, state::AppState};

use super::{
    request::{RunTestsRequest, SubmitSolutionRequest},
    response::{ProblemResponse, ProblemSummary, ProblemsListResponse},
};

/// List all problems
pub async fn list_problems(State(state): State<AppState>) -> AppResult<Json<ProblemsListResponse>> {
    let problems: Vec<ProblemSummary> = state
        .assessments()
        .list_problems()
        .await?
        .iter()
        .map(|p| ProblemSummary::from(p.as_ref()))
        .collect();

    Ok(Json(ProblemsListResponse {
        total: problems.len(),
        problems,
    }))
}

/// Get a specific problem (visible test cases only)
pub async fn get_problem(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProblemResponse>> {
    let problem = state.assessments().get_problem(&id).await?;
    Ok(Json(ProblemResponse::from(problem.as_ref())))
}

/// Run code against the visible test cases
pub async fn run_tests(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RunTestsRequest>,
) -> AppResult<Json<Verdict>> {
    payload.validate()?;

    let verdict = state
        .assessments()
        .run_tests(&id, &payload.language, &payload.code)
        .await?;
    Ok(Json(verdict))
}

/// Submit code for scoring against every test case
pub async fn submit_solution(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SubmitSolutionRequest>,
) -> AppResult<Json<Verdict>> {
    payload.validate()?;

    let verdict = state
        .assessments()
        .submit_solution(&payload.candidate_id, &id, &payload.language, &payload.code)
        .await?;
    Ok(Json(verdict))
}
