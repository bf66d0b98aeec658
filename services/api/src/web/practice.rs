//! services/api/src/web/practice.rs

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query, State};
use interview_prep_core::domain::{AiFeedback, PracticeSession, PracticeStats};
use interview_prep_core::validation::PracticeInput;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::envelope::{json_body, query_params, ApiResult, Envelope};
use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PracticeRequest {
    pub question_id: String,
    pub answer: String,
    #[serde(alias = "duration")]
    pub duration_secs: i64,
    /// 1 to 5
    pub rating: Option<i64>,
    /// Feedback from `/ai/feedback`, stored with the session.
    #[schema(value_type = Option<Object>)]
    pub feedback: Option<AiFeedback>,
}

impl From<PracticeRequest> for PracticeInput {
    fn from(req: PracticeRequest) -> Self {
        PracticeInput {
            question_id: req.question_id,
            answer: req.answer,
            duration_secs: req.duration_secs,
            rating: req.rating,
            feedback: req.feedback,
        }
    }
}

#[derive(Serialize)]
pub struct SessionBody {
    pub session: PracticeSession,
}

#[derive(Serialize)]
pub struct HistoryBody {
    pub sessions: Vec<PracticeSession>,
}

#[derive(Serialize)]
pub struct StatsBody {
    pub stats: PracticeStats,
}

/// GET /practice - the caller's sessions, most recent first
#[utoipa::path(
    get,
    path = "/practice",
    tag = "practice",
    params(("limit" = Option<i64>, Query, description = "At most 100, defaults to 50")),
    responses(
        (status = 200, description = "Practice history"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn history_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult {
    let HistoryQuery { limit } = query_params(query)?;
    let sessions = state
        .actions
        .practice_history(user.identity(), limit)
        .await?;
    Ok(Envelope::ok(HistoryBody { sessions }))
}

/// POST /practice - record one answer attempt
#[utoipa::path(
    post,
    path = "/practice",
    tag = "practice",
    request_body = PracticeRequest,
    responses(
        (status = 201, description = "Session recorded"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Question not found")
    )
)]
pub async fn record_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<Json<PracticeRequest>, JsonRejection>,
) -> ApiResult {
    let input = PracticeInput::from(json_body(payload)?);
    let session = state.actions.record_practice(user.identity(), &input).await?;
    Ok(Envelope::created(SessionBody { session }))
}

/// GET /practice/stats
#[utoipa::path(
    get,
    path = "/practice/stats",
    tag = "practice",
    responses(
        (status = 200, description = "Totals across the caller's sessions"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn stats_handler(State(state): State<Arc<AppState>>, user: CurrentUser) -> ApiResult {
    let stats = state.actions.practice_stats(user.identity()).await?;
    Ok(Envelope::ok(StatsBody { stats }))
}
