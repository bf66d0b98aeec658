//! services/api/src/web/middleware.rs
//!
//! Session resolution and rate limiting.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use interview_prep_core::domain::Identity;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

use crate::web::envelope::ApiFailure;
use crate::web::state::AppState;

pub const SESSION_COOKIE: &str = "session";

/// Reads the session id out of the `Cookie` header.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            c.trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|id| !id.is_empty())
}

/// Resolves the session cookie into an `Identity` request extension.
///
/// Never rejects: a missing or stale session simply leaves the request
/// anonymous, and each action decides whether that is acceptable.
pub async fn resolve_identity(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(session_id) = session_cookie(req.headers()) {
        match state.db.validate_auth_session(session_id).await {
            Ok(user_id) => {
                req.extensions_mut().insert(Identity { user_id });
            }
            Err(e) => debug!(error = %e, "Ignoring invalid session cookie"),
        }
    }
    next.run(req).await
}

/// The caller as resolved by `resolve_identity`, if any.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Option<Identity>);

impl CurrentUser {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(parts.extensions.get::<Identity>().copied()))
    }
}

/// Per-user budget on AI routes. Anonymous requests pass through and are
/// rejected by the action itself.
pub async fn limit_ai_requests(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    if let Some(identity) = req.extensions().get::<Identity>() {
        if let Err(e) = state.ai_limiter.check(&identity.user_id.to_string()) {
            return ApiFailure(e).into_response();
        }
    }
    next.run(req).await
}

/// Per-address budget on sign-up and login.
pub async fn limit_auth_requests(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let client = client_address(req.headers());
    if let Err(e) = state.auth_limiter.check(&client) {
        return ApiFailure(e).into_response();
    }
    next.run(req).await
}

/// First hop of `x-forwarded-for`, or `unknown`.
fn client_address(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}
