//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use interview_prep_core::access::DataAccess;
use interview_prep_core::actions::Actions;
use interview_prep_core::ports::{DatabaseService, InterviewCoach};
use interview_prep_core::rate_limit::FixedWindowLimiter;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub actions: Actions,
    /// AI routes, keyed by user id.
    pub ai_limiter: FixedWindowLimiter,
    /// Sign-up and login, keyed by client address.
    pub auth_limiter: FixedWindowLimiter,
}

impl AppState {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        coach: Arc<dyn InterviewCoach>,
        config: Arc<Config>,
    ) -> Self {
        let actions = Actions::new(DataAccess::new(db.clone()), coach);
        let ai_limiter =
            FixedWindowLimiter::new(config.ai_rate_limit.limit, config.ai_rate_limit.window);
        let auth_limiter =
            FixedWindowLimiter::new(config.auth_rate_limit.limit, config.auth_rate_limit.window);
        Self {
            db,
            config,
            actions,
            ai_limiter,
            auth_limiter,
        }
    }
}
