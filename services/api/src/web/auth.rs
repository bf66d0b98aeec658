//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, and logout.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue},
    response::Response,
    Json,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use interview_prep_core::domain::NewUser;
use interview_prep_core::error::ServiceError;
use interview_prep_core::ports::PortError;
use interview_prep_core::validation::{validate_sign_in, validate_sign_up, SignInInput, SignUpInput};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::envelope::{json_body, ApiFailure, ApiResult, Done, Envelope};
use crate::web::middleware::{session_cookie, SESSION_COOKIE};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<SignupRequest> for SignUpInput {
    fn from(req: SignupRequest) -> Self {
        SignUpInput {
            email: req.email,
            password: req.password,
            name: req.name,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl From<LoginRequest> for SignInInput {
    fn from(req: LoginRequest) -> Self {
        SignInInput {
            email: req.email,
            password: req.password,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn internal(context: &str) -> impl FnOnce(argon2::password_hash::Error) -> ApiFailure + '_ {
    move |e| {
        error!("{context}: {e}");
        ApiFailure(ServiceError::Store(PortError::Unexpected(context.to_string())))
    }
}

/// Creates a session row and the matching `Set-Cookie` value.
async fn open_session(state: &AppState, user_id: Uuid) -> Result<String, ApiFailure> {
    let ttl = Duration::days(state.config.session_ttl_days);
    let auth_session_id = Uuid::new_v4().to_string();
    state
        .db
        .create_auth_session(&auth_session_id, user_id, Utc::now() + ttl)
        .await
        .map_err(ServiceError::from)?;

    Ok(format!(
        "{SESSION_COOKIE}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        auth_session_id,
        ttl.num_seconds()
    ))
}

fn with_cookie(mut response: Response, cookie: String) -> Result<Response, ApiFailure> {
    let value = cookie
        .parse()
        .map_err(|_| ApiFailure(ServiceError::Store(PortError::Unexpected("bad cookie".to_string()))))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult {
    let sign_up = validate_sign_up(&json_body(payload)?.into())?;

    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let hashed_password = Argon2::default()
        .hash_password(sign_up.password.as_bytes(), &salt)
        .map_err(internal("Failed to hash password"))?
        .to_string();

    // 2. Create user in database
    let user = state
        .db
        .create_user(NewUser {
            email: sign_up.email,
            hashed_password,
            name: sign_up.name,
        })
        .await
        .map_err(ServiceError::from)?;
    info!(target: "audit", user_id = %user.id, action = "signup", "audit event");

    // 3. Open a session
    let cookie = open_session(&state, user.id).await?;
    let response = Envelope::created(AuthResponse {
        user_id: user.id,
        email: user.email,
    });
    with_cookie(response, cookie)
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult {
    let sign_in = validate_sign_in(&json_body(payload)?.into())?;

    // 1. Get user by email; an unknown email looks like a wrong password.
    let user_creds = match state.db.get_user_by_email(&sign_in.email).await {
        Ok(creds) => creds,
        Err(PortError::NotFound(_)) => return Err(ApiFailure(ServiceError::Auth)),
        Err(e) => return Err(ServiceError::from(e).into()),
    };

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&user_creds.hashed_password)
        .map_err(internal("Failed to parse password hash"))?;
    if Argon2::default()
        .verify_password(sign_in.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(ApiFailure(ServiceError::Auth));
    }
    info!(target: "audit", user_id = %user_creds.user_id, action = "login", "audit event");

    // 3. Open a session
    let cookie = open_session(&state, user_creds.user_id).await?;
    let response = Envelope::ok(AuthResponse {
        user_id: user_creds.user_id,
        email: user_creds.email,
    });
    with_cookie(response, cookie)
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logout successful")
    )
)]
pub async fn logout_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    // Logging out always succeeds; a failed delete only leaves a session to expire.
    if let Some(auth_session_id) = session_cookie(&headers) {
        if let Err(e) = state.db.delete_auth_session(auth_session_id).await {
            error!("Failed to delete auth session: {:?}", e);
        }
    }

    let mut response = Envelope::ok(Done {});
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_static("session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0"),
    );
    response
}
