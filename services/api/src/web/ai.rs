//! services/api/src/web/ai.rs
//!
//! AI-backed endpoints: answer review and question generation.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use interview_prep_core::domain::AiFeedback;
use interview_prep_core::validation::{FeedbackInput, GenerationInput};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::envelope::{json_body, ApiResult, Envelope};
use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct FeedbackRequest {
    pub question: String,
    pub answer: String,
}

impl From<FeedbackRequest> for FeedbackInput {
    fn from(req: FeedbackRequest) -> Self {
        FeedbackInput {
            question: req.question,
            answer: req.answer,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationRequest {
    pub topic: String,
    /// EASY, MEDIUM or HARD
    pub difficulty: String,
    /// 1 to 10, defaults to 5
    pub count: Option<i64>,
    /// Store every generated question in the caller's bank.
    pub auto_save: bool,
}

impl From<GenerationRequest> for GenerationInput {
    fn from(req: GenerationRequest) -> Self {
        GenerationInput {
            topic: req.topic,
            difficulty: req.difficulty,
            count: req.count,
            auto_save: req.auto_save,
        }
    }
}

#[derive(Serialize)]
pub struct FeedbackBody {
    pub feedback: AiFeedback,
}

/// POST /ai/feedback
#[utoipa::path(
    post,
    path = "/ai/feedback",
    tag = "ai",
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Structured feedback on the answer"),
        (status = 400, description = "Validation failed"),
        (status = 429, description = "Too many AI requests"),
        (status = 502, description = "The AI vendor failed or answered with garbage"),
        (status = 503, description = "AI is not configured or is rate limited upstream")
    )
)]
pub async fn feedback_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult {
    let input = FeedbackInput::from(json_body(payload)?);
    let feedback = state.actions.review_answer(user.identity(), &input).await?;
    Ok(Envelope::ok(FeedbackBody { feedback }))
}

/// POST /ai/questions
#[utoipa::path(
    post,
    path = "/ai/questions",
    tag = "ai",
    request_body = GenerationRequest,
    responses(
        (status = 200, description = "Generated questions, plus the ids saved when autoSave is set"),
        (status = 400, description = "Validation failed"),
        (status = 429, description = "Too many AI requests"),
        (status = 502, description = "The AI vendor failed or answered with garbage"),
        (status = 503, description = "AI is not configured or is rate limited upstream")
    )
)]
pub async fn generate_questions_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> ApiResult {
    let input = GenerationInput::from(json_body(payload)?);
    let outcome = state
        .actions
        .generate_questions(user.identity(), &input)
        .await?;
    Ok(Envelope::ok(outcome))
}
