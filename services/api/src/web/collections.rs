//! services/api/src/web/collections.rs
//!
//! Collection endpoints, including membership edits.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use interview_prep_core::domain::{Collection, CollectionWithQuestions, Page};
use interview_prep_core::validation::{CollectionInput, CollectionPatchInput, PaginationInput};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::envelope::{
    json_body, parse_id, path_param, query_params, ApiResult, Done, Envelope,
};
use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CollectionRequest {
    pub name: String,
    pub description: Option<String>,
    /// `#RRGGBB`
    pub color: Option<String>,
}

impl From<CollectionRequest> for CollectionInput {
    fn from(req: CollectionRequest) -> Self {
        CollectionInput {
            name: req.name,
            description: req.description,
            color: req.color,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CollectionPatchRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl From<CollectionPatchRequest> for CollectionPatchInput {
    fn from(req: CollectionPatchRequest) -> Self {
        CollectionPatchInput {
            name: req.name,
            description: req.description,
            color: req.color,
        }
    }
}

#[derive(Serialize)]
pub struct CollectionBody {
    pub collection: Collection,
}

#[derive(Serialize)]
pub struct CollectionDetailBody {
    pub collection: CollectionWithQuestions,
}

#[derive(Serialize)]
pub struct CollectionPageBody {
    pub collections: Page<Collection>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub question_id: Uuid,
}

/// GET /collections
#[utoipa::path(
    get,
    path = "/collections",
    tag = "collections",
    params(
        ("page" = Option<i64>, Query, description = "1-based page number"),
        ("limit" = Option<i64>, Query, description = "Items per page, at most 100")
    ),
    responses(
        (status = 200, description = "The caller's active collections, newest first"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_collections_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    query: Result<Query<PaginationInput>, QueryRejection>,
) -> ApiResult {
    let input = query_params(query)?;
    let collections = state
        .actions
        .list_collections(user.identity(), &input)
        .await?;
    Ok(Envelope::ok(CollectionPageBody { collections }))
}

/// POST /collections
#[utoipa::path(
    post,
    path = "/collections",
    tag = "collections",
    request_body = CollectionRequest,
    responses(
        (status = 201, description = "Collection created with no questions"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn create_collection_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<Json<CollectionRequest>, JsonRejection>,
) -> ApiResult {
    let input = CollectionInput::from(json_body(payload)?);
    let collection = state
        .actions
        .create_collection(user.identity(), &input)
        .await?;
    Ok(Envelope::created(CollectionBody { collection }))
}

/// GET /collections/{id}
#[utoipa::path(
    get,
    path = "/collections/{id}",
    tag = "collections",
    params(("id" = Uuid, Path, description = "Collection id")),
    responses(
        (status = 200, description = "The collection with its questions in membership order"),
        (status = 404, description = "Collection not found")
    )
)]
pub async fn get_collection_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult {
    let id = path_param(id, "id")?;
    let collection = state.actions.get_collection(user.identity(), id).await?;
    Ok(Envelope::ok(CollectionDetailBody { collection }))
}

/// PUT /collections/{id}
#[utoipa::path(
    put,
    path = "/collections/{id}",
    tag = "collections",
    params(("id" = Uuid, Path, description = "Collection id")),
    request_body = CollectionPatchRequest,
    responses(
        (status = 200, description = "Collection updated"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Collection not found")
    )
)]
pub async fn update_collection_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CollectionPatchRequest>, JsonRejection>,
) -> ApiResult {
    let id = path_param(id, "id")?;
    let input = CollectionPatchInput::from(json_body(payload)?);
    let collection = state
        .actions
        .update_collection(user.identity(), id, &input)
        .await?;
    Ok(Envelope::ok(CollectionBody { collection }))
}

/// DELETE /collections/{id}
#[utoipa::path(
    delete,
    path = "/collections/{id}",
    tag = "collections",
    params(("id" = Uuid, Path, description = "Collection id")),
    responses(
        (status = 200, description = "Collection soft-deleted"),
        (status = 404, description = "Collection not found")
    )
)]
pub async fn delete_collection_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult {
    let id = path_param(id, "id")?;
    state.actions.delete_collection(user.identity(), id).await?;
    Ok(Envelope::ok(Done {}))
}

/// POST /collections/{id}/questions
#[utoipa::path(
    post,
    path = "/collections/{id}/questions",
    tag = "collections",
    params(("id" = Uuid, Path, description = "Collection id")),
    request_body = AddMemberRequest,
    responses(
        (status = 200, description = "Question appended to the collection"),
        (status = 404, description = "Collection or question not found"),
        (status = 409, description = "Question already in collection")
    )
)]
pub async fn add_member_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AddMemberRequest>, JsonRejection>,
) -> ApiResult {
    let collection_id = path_param(id, "id")?;
    let AddMemberRequest { question_id } = json_body(payload)?;
    let collection = state
        .actions
        .add_question_to_collection(user.identity(), collection_id, question_id)
        .await?;
    Ok(Envelope::ok(CollectionBody { collection }))
}

/// DELETE /collections/{id}/questions/{question_id}
#[utoipa::path(
    delete,
    path = "/collections/{id}/questions/{question_id}",
    tag = "collections",
    params(
        ("id" = Uuid, Path, description = "Collection id"),
        ("question_id" = Uuid, Path, description = "Question id")
    ),
    responses(
        (status = 200, description = "Question removed; removing a non-member is a no-op"),
        (status = 404, description = "Collection not found")
    )
)]
pub async fn remove_member_handler(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ids: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult {
    let (collection_id, question_id) = path_param(ids, "id")?;
    let collection_id = parse_id(&collection_id, "id")?;
    let question_id = parse_id(&question_id, "question_id")?;
    let collection = state
        .actions
        .remove_question_from_collection(user.identity(), collection_id, question_id)
        .await?;
    Ok(Envelope::ok(CollectionBody { collection }))
}
