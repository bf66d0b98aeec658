//! crates/interview_prep_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or AI vendors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    AiFeedback, Collection, Difficulty, GeneratedQuestion, MembershipChange, NewUser,
    PracticeSession, Question, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all store operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Failures of the AI coach.
///
/// `MissingCredential` and `UnsupportedProvider` are deployment problems;
/// `Vendor` and `Parse` come from the upstream call itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AiError {
    #[error("AI_API_KEY is not configured")]
    MissingCredential,

    #[error("Unsupported AI provider: {0}")]
    UnsupportedProvider(String),

    #[error("{vendor} API error: {message}")]
    Vendor {
        vendor: String,
        /// HTTP status when the vendor answered; `None` for transport failures and timeouts.
        status: Option<u16>,
        message: String,
    },

    #[error("Failed to parse AI response: {0}")]
    Parse(String),

    #[error("{0} must not be empty")]
    EmptyInput(&'static str),
}

impl AiError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AiError::Vendor { status: Some(429), .. })
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    /// Fails with `PortError::Conflict` when the email is already registered.
    async fn create_user(&self, new_user: NewUser) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the owning user id of an unexpired session.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Questions ---
    async fn insert_question(&self, question: Question) -> PortResult<Question>;

    /// Returns the question whatever its deletion state.
    async fn get_question_by_id(&self, question_id: Uuid) -> PortResult<Question>;

    /// Persists the mutable fields (content and `deleted_at`) of an existing question.
    async fn save_question(&self, question: &Question) -> PortResult<()>;

    /// Active questions of `user_id`, newest first. Callers re-check ownership.
    async fn list_questions_by_owner(&self, user_id: Uuid) -> PortResult<Vec<Question>>;

    /// Batch lookup that includes soft-deleted questions; unknown ids are skipped.
    async fn get_questions_by_ids(&self, question_ids: &[Uuid]) -> PortResult<Vec<Question>>;

    // --- Collections ---
    async fn insert_collection(&self, collection: Collection) -> PortResult<Collection>;

    async fn get_collection_by_id(&self, collection_id: Uuid) -> PortResult<Collection>;

    /// Persists name, description, color and `deleted_at`. Never writes the membership list.
    async fn save_collection(&self, collection: &Collection) -> PortResult<()>;

    async fn list_collections_by_owner(&self, user_id: Uuid) -> PortResult<Vec<Collection>>;

    /// Atomic add-to-set on the membership list. `Unchanged` means the id was already present.
    async fn append_collection_member(
        &self,
        collection_id: Uuid,
        question_id: Uuid,
    ) -> PortResult<MembershipChange>;

    /// `Unchanged` means the id was not a member.
    async fn remove_collection_member(
        &self,
        collection_id: Uuid,
        question_id: Uuid,
    ) -> PortResult<MembershipChange>;

    // --- Practice Sessions ---
    async fn insert_practice_session(&self, session: PracticeSession) -> PortResult<PracticeSession>;

    /// Newest first, at most `limit` rows when a limit is given.
    async fn list_practice_sessions_by_owner(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
    ) -> PortResult<Vec<PracticeSession>>;
}

/// The AI capability: exactly one vendor backs an instance, chosen at startup.
#[async_trait]
pub trait InterviewCoach: Send + Sync {
    /// Structured feedback on an answer to an interview question.
    async fn request_feedback(&self, question: &str, answer: &str) -> Result<AiFeedback, AiError>;

    /// Fresh interview questions on `topic`. All-or-nothing: a malformed
    /// element fails the whole call.
    async fn request_question_generation(
        &self,
        topic: &str,
        difficulty: Difficulty,
        count: u8,
    ) -> Result<Vec<GeneratedQuestion>, AiError>;
}
