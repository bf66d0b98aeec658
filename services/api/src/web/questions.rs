//! services/api/src/web/questions.rs
//!
//! Question endpoints. Every route acts for the signed-in user only.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use interview_prep_core::domain::{Page, Question, QuestionDetail};
use interview_prep_core::validation::{PaginationInput, QuestionInput, QuestionPatchInput};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::envelope::{json_body, path_param, query_params, ApiResult, Done, Envelope};
use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionRequest {
    pub title: String,
    pub description: String,
    /// EASY, MEDIUM or HARD
    pub difficulty: String,
    /// TECHNICAL, BEHAVIORAL, SYSTEM_DESIGN, CODING or OTHER
    pub category: String,
    pub tags: Vec<String>,
    pub company_name: Option<String>,
    pub company_id: Option<String>,
}

impl From<QuestionRequest> for QuestionInput {
    fn from(req: QuestionRequest) -> Self {
        QuestionInput {
            title: req.title,
            description: req.description,
            difficulty: req.difficulty,
            category: req.category,
            tags: req.tags,
            company_name: req.company_name,
            company_id: req.company_id,
        }
    }
}

/// Only the fields present are changed.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionPatchRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub company_name: Option<String>,
    pub company_id: Option<String>,
}

impl From<QuestionPatchRequest> for QuestionPatchInput {
    fn from(req: QuestionPatchRequest) -> Self {
        QuestionPatchInput {
            title: req.title,
            description: req.description,
            difficulty: req.difficulty,
            category: req.category,
            tags: req.tags,
            company_name: req.company_name,
            company_id: req.company_id,
        }
    }
}

#[derive(Serialize)]
pub struct QuestionBody {
    pub question: Question,
}

#[derive(Serialize)]
pub struct QuestionDetailBody {
    pub question: QuestionDetail,
}

#[derive(Serialize)]
pub struct QuestionPageBody {
    pub questions: Page<Question>,
}

/// GET /questions
#[utoipa::path(
    get,
    path = "/questions",
    tag = "questions",
    params(
        ("page" = Option<i64>, Query, description = "1-based page number"),
        ("limit" = Option<i64>, Query, description = "Items per page, at most 100")
    ),
    responses(
        (status = 200, description = "The caller's active questions, newest first"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_questions_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    query: Result<Query<PaginationInput>, QueryRejection>,
) -> ApiResult {
    let input = query_params(query)?;
    let questions = state.actions.list_questions(user.identity(), &input).await?;
    Ok(Envelope::ok(QuestionPageBody { questions }))
}

/// POST /questions
#[utoipa::path(
    post,
    path = "/questions",
    tag = "questions",
    request_body = QuestionRequest,
    responses(
        (status = 201, description = "Question created"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn create_question_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<Json<QuestionRequest>, JsonRejection>,
) -> ApiResult {
    let input = QuestionInput::from(json_body(payload)?);
    let question = state.actions.create_question(user.identity(), &input).await?;
    Ok(Envelope::created(QuestionBody { question }))
}

/// GET /questions/{id}
#[utoipa::path(
    get,
    path = "/questions/{id}",
    tag = "questions",
    params(("id" = Uuid, Path, description = "Question id")),
    responses(
        (status = 200, description = "The question with its latest practice sessions"),
        (status = 404, description = "Question not found")
    )
)]
pub async fn get_question_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult {
    let id = path_param(id, "id")?;
    let question = state.actions.get_question(user.identity(), id).await?;
    Ok(Envelope::ok(QuestionDetailBody { question }))
}

/// PUT /questions/{id}
#[utoipa::path(
    put,
    path = "/questions/{id}",
    tag = "questions",
    params(("id" = Uuid, Path, description = "Question id")),
    request_body = QuestionPatchRequest,
    responses(
        (status = 200, description = "Question updated"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Question not found")
    )
)]
pub async fn update_question_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<QuestionPatchRequest>, JsonRejection>,
) -> ApiResult {
    let id = path_param(id, "id")?;
    let input = QuestionPatchInput::from(json_body(payload)?);
    let question = state
        .actions
        .update_question(user.identity(), id, &input)
        .await?;
    Ok(Envelope::ok(QuestionBody { question }))
}

/// DELETE /questions/{id}
#[utoipa::path(
    delete,
    path = "/questions/{id}",
    tag = "questions",
    params(("id" = Uuid, Path, description = "Question id")),
    responses(
        (status = 200, description = "Question soft-deleted"),
        (status = 404, description = "Question not found")
    )
)]
pub async fn delete_question_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult {
    let id = path_param(id, "id")?;
    state.actions.delete_question(user.identity(), id).await?;
    Ok(Envelope::ok(Done {}))
}
