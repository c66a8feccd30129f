//! Quiz API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::quiz::{self, OrchestratorError, QuizId};
use crate::resilience::{CircuitSnapshot, Outcome};

pub const CREATED_MESSAGE: &str = "Quiz Created Successfully";
pub const CREATE_DEGRADED_MESSAGE: &str = "QUESTION-SERVICE DOWN - Quiz cannot be created";

/// Body of `POST /quiz/create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    pub category_name: String,
    pub num_questions: u32,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn create_quiz(
    State(state): State<AppState>,
    Json(request): Json<CreateQuizRequest>,
) -> Response {
    let result = state
        .orchestrator
        .create_quiz(&request.category_name, request.num_questions, &request.title)
        .await;

    match result {
        Ok(Outcome::Success(())) => (StatusCode::CREATED, CREATED_MESSAGE).into_response(),
        Ok(Outcome::Degraded(())) => (StatusCode::SERVICE_UNAVAILABLE, CREATE_DEGRADED_MESSAGE).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_quiz_questions(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.orchestrator.get_quiz_questions(&QuizId::from(id)).await {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => error_response(e),
    }
}

pub async fn submit_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(responses): Json<Vec<quiz::Response>>,
) -> Response {
    match state.orchestrator.calculate_result(&QuizId::from(id), &responses).await {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => error_response(e),
    }
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn circuit_status(State(state): State<AppState>) -> Json<CircuitSnapshot> {
    Json(state.orchestrator.resilience().breaker().snapshot())
}

fn outcome_response<T: Serialize>(outcome: Outcome<T>) -> Response {
    match outcome {
        Outcome::Success(body) => (StatusCode::OK, Json(body)).into_response(),
        Outcome::Degraded(body) => (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response(),
    }
}

fn error_response(err: OrchestratorError) -> Response {
    match err {
        OrchestratorError::QuizNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()).into_response(),
        OrchestratorError::InvalidInput(_) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
        OrchestratorError::Store(e) => {
            tracing::error!(error = %e, "Quiz store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to access quiz store").into_response()
        }
    }
}
