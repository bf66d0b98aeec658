//! services/api/src/web/rest.rs
//!
//! Builds the HTTP router and holds the master definition for the OpenAPI
//! specification.

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ConfigError;
use crate::error::ApiError;
use crate::web::envelope::Envelope;
use crate::web::middleware::{limit_ai_requests, limit_auth_requests, resolve_identity};
use crate::web::state::AppState;
use crate::web::{ai, auth, collections, practice, questions};

const MAX_BODY_BYTES: usize = 1024 * 1024;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        questions::list_questions_handler,
        questions::create_question_handler,
        questions::get_question_handler,
        questions::update_question_handler,
        questions::delete_question_handler,
        collections::list_collections_handler,
        collections::create_collection_handler,
        collections::get_collection_handler,
        collections::update_collection_handler,
        collections::delete_collection_handler,
        collections::add_member_handler,
        collections::remove_member_handler,
        ai::feedback_handler,
        ai::generate_questions_handler,
        practice::history_handler,
        practice::record_handler,
        practice::stats_handler,
    ),
    components(
        schemas(
            HealthResponse,
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            questions::QuestionRequest,
            questions::QuestionPatchRequest,
            collections::CollectionRequest,
            collections::CollectionPatchRequest,
            collections::AddMemberRequest,
            ai::FeedbackRequest,
            ai::GenerationRequest,
            practice::PracticeRequest,
        )
    ),
    tags(
        (name = "auth", description = "Account signup and cookie sessions."),
        (name = "questions", description = "The caller's interview question bank."),
        (name = "collections", description = "Ordered groups of the caller's questions."),
        (name = "ai", description = "Answer feedback and question generation."),
        (name = "practice", description = "Recorded answer attempts and their totals.")
    )
)]
pub struct ApiDoc;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
}

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "The service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Response {
    Envelope::ok(HealthResponse { status: "ok" })
}

//=========================================================================================
// Router
//=========================================================================================

fn cors_layer(origin: &str) -> Result<CorsLayer, ApiError> {
    let origin = origin.parse::<HeaderValue>().map_err(|_| {
        ConfigError::InvalidValue("CORS_ORIGIN".to_string(), format!("'{origin}' is not a valid origin"))
    })?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]))
}

/// Assembles every route with its middleware, plus the Swagger UI.
pub fn build_router(state: Arc<AppState>) -> Result<Router, ApiError> {
    let cors = cors_layer(&state.config.cors_origin)?;

    let credential_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            limit_auth_requests,
        ));

    let ai_routes = Router::new()
        .route("/ai/feedback", post(ai::feedback_handler))
        .route("/ai/questions", post(ai::generate_questions_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            limit_ai_requests,
        ));

    let resource_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route(
            "/questions",
            get(questions::list_questions_handler).post(questions::create_question_handler),
        )
        .route(
            "/questions/{id}",
            get(questions::get_question_handler)
                .put(questions::update_question_handler)
                .delete(questions::delete_question_handler),
        )
        .route(
            "/collections",
            get(collections::list_collections_handler)
                .post(collections::create_collection_handler),
        )
        .route(
            "/collections/{id}",
            get(collections::get_collection_handler)
                .put(collections::update_collection_handler)
                .delete(collections::delete_collection_handler),
        )
        .route(
            "/collections/{id}/questions",
            post(collections::add_member_handler),
        )
        .route(
            "/collections/{id}/questions/{question_id}",
            delete(collections::remove_member_handler),
        )
        .route(
            "/practice",
            get(practice::history_handler).post(practice::record_handler),
        )
        .route("/practice/stats", get(practice::stats_handler));

    let api_router = Router::new()
        .merge(credential_routes)
        .merge(ai_routes)
        .merge(resource_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            resolve_identity,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state);

    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
