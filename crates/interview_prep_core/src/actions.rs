//! crates/interview_prep_core/src/actions.rs
//!
//! The use-case façade the web layer calls. Each entry point resolves the
//! caller, validates its input, then delegates to `DataAccess` and/or the
//! `InterviewCoach`.

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::access::DataAccess;
use crate::domain::{
    AiFeedback, Collection, CollectionWithQuestions, GeneratedQuestion, Identity, Page,
    PracticeSession, PracticeStats, Question, QuestionDetail,
};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::InterviewCoach;
use crate::validation::{
    validate_collection_input, validate_collection_patch, validate_feedback_request,
    validate_generation_request, validate_pagination, validate_practice_input,
    validate_question_input, validate_question_patch, CollectionInput, CollectionPatchInput,
    FeedbackInput, GenerationInput, PaginationInput, PracticeInput, QuestionInput,
    QuestionPatchInput, ValidationErrors,
};

const MAX_HISTORY_LIMIT: i64 = 100;

/// Result of a generation request; `saved_ids` is empty unless auto-save was asked for.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub questions: Vec<GeneratedQuestion>,
    pub saved_ids: Vec<Uuid>,
}

fn require_identity(identity: Option<&Identity>) -> ServiceResult<Uuid> {
    identity.map(|i| i.user_id).ok_or(ServiceError::Auth)
}

#[derive(Clone)]
pub struct Actions {
    access: DataAccess,
    coach: Arc<dyn InterviewCoach>,
}

impl Actions {
    pub fn new(access: DataAccess, coach: Arc<dyn InterviewCoach>) -> Self {
        Self { access, coach }
    }

    pub fn access(&self) -> &DataAccess {
        &self.access
    }

    // --- Questions ---

    pub async fn create_question(
        &self,
        identity: Option<&Identity>,
        input: &QuestionInput,
    ) -> ServiceResult<Question> {
        let user_id = require_identity(identity)?;
        let new = validate_question_input(input)?;
        self.access.create_question(user_id, new).await
    }

    pub async fn update_question(
        &self,
        identity: Option<&Identity>,
        question_id: Uuid,
        input: &QuestionPatchInput,
    ) -> ServiceResult<Question> {
        let user_id = require_identity(identity)?;
        let changes = validate_question_patch(input)?;
        self.access.update_question(user_id, question_id, changes).await
    }

    pub async fn delete_question(
        &self,
        identity: Option<&Identity>,
        question_id: Uuid,
    ) -> ServiceResult<()> {
        let user_id = require_identity(identity)?;
        self.access.soft_delete_question(user_id, question_id).await
    }

    pub async fn get_question(
        &self,
        identity: Option<&Identity>,
        question_id: Uuid,
    ) -> ServiceResult<QuestionDetail> {
        let user_id = require_identity(identity)?;
        self.access.question_detail(user_id, question_id).await
    }

    pub async fn list_questions(
        &self,
        identity: Option<&Identity>,
        input: &PaginationInput,
    ) -> ServiceResult<Page<Question>> {
        let user_id = require_identity(identity)?;
        let request = validate_pagination(input)?;
        self.access.list_questions(user_id, request).await
    }

    // --- Collections ---

    pub async fn create_collection(
        &self,
        identity: Option<&Identity>,
        input: &CollectionInput,
    ) -> ServiceResult<Collection> {
        let user_id = require_identity(identity)?;
        let new = validate_collection_input(input)?;
        self.access.create_collection(user_id, new).await
    }

    pub async fn update_collection(
        &self,
        identity: Option<&Identity>,
        collection_id: Uuid,
        input: &CollectionPatchInput,
    ) -> ServiceResult<Collection> {
        let user_id = require_identity(identity)?;
        let changes = validate_collection_patch(input)?;
        self.access
            .update_collection(user_id, collection_id, changes)
            .await
    }

    pub async fn delete_collection(
        &self,
        identity: Option<&Identity>,
        collection_id: Uuid,
    ) -> ServiceResult<()> {
        let user_id = require_identity(identity)?;
        self.access.soft_delete_collection(user_id, collection_id).await
    }

    pub async fn get_collection(
        &self,
        identity: Option<&Identity>,
        collection_id: Uuid,
    ) -> ServiceResult<CollectionWithQuestions> {
        let user_id = require_identity(identity)?;
        self.access.get_with_members(user_id, collection_id).await
    }

    pub async fn list_collections(
        &self,
        identity: Option<&Identity>,
        input: &PaginationInput,
    ) -> ServiceResult<Page<Collection>> {
        let user_id = require_identity(identity)?;
        let request = validate_pagination(input)?;
        self.access.list_collections(user_id, request).await
    }

    pub async fn add_question_to_collection(
        &self,
        identity: Option<&Identity>,
        collection_id: Uuid,
        question_id: Uuid,
    ) -> ServiceResult<Collection> {
        let user_id = require_identity(identity)?;
        self.access
            .add_member(user_id, collection_id, question_id)
            .await
    }

    pub async fn remove_question_from_collection(
        &self,
        identity: Option<&Identity>,
        collection_id: Uuid,
        question_id: Uuid,
    ) -> ServiceResult<Collection> {
        let user_id = require_identity(identity)?;
        self.access
            .remove_member(user_id, collection_id, question_id)
            .await
    }

    // --- AI ---

    pub async fn review_answer(
        &self,
        identity: Option<&Identity>,
        input: &FeedbackInput,
    ) -> ServiceResult<AiFeedback> {
        let user_id = require_identity(identity)?;
        let request = validate_feedback_request(input)?;
        self.coach
            .request_feedback(&request.question, &request.answer)
            .await
            .map_err(|error| {
                tracing::error!(%user_id, error = %error, "AI feedback request failed");
                ServiceError::Ai(error)
            })
    }

    /// Generates questions and, when `auto_save` is set, stores each one for
    /// the caller. A question that fails to store is logged and skipped.
    pub async fn generate_questions(
        &self,
        identity: Option<&Identity>,
        input: &GenerationInput,
    ) -> ServiceResult<GenerationOutcome> {
        let user_id = require_identity(identity)?;
        let request = validate_generation_request(input)?;

        let questions = self
            .coach
            .request_question_generation(&request.topic, request.difficulty, request.count)
            .await
            .map_err(|error| {
                tracing::error!(%user_id, error = %error, topic = %request.topic, "AI question generation failed");
                ServiceError::Ai(error)
            })?;

        let mut saved_ids = Vec::new();
        if request.auto_save {
            for generated in &questions {
                match self
                    .access
                    .create_question(user_id, generated.to_new_question())
                    .await
                {
                    Ok(question) => saved_ids.push(question.id),
                    Err(error) => {
                        tracing::warn!(%user_id, title = %generated.title, error = %error, "Skipping generated question that failed to save");
                    }
                }
            }
        }

        tracing::info!(
            %user_id,
            generated = questions.len(),
            saved = saved_ids.len(),
            "Generated interview questions"
        );
        Ok(GenerationOutcome {
            questions,
            saved_ids,
        })
    }

    // --- Practice ---

    pub async fn record_practice(
        &self,
        identity: Option<&Identity>,
        input: &PracticeInput,
    ) -> ServiceResult<PracticeSession> {
        let user_id = require_identity(identity)?;
        let new = validate_practice_input(input)?;
        self.access.record_practice(user_id, new).await
    }

    pub async fn practice_history(
        &self,
        identity: Option<&Identity>,
        limit: Option<i64>,
    ) -> ServiceResult<Vec<PracticeSession>> {
        let user_id = require_identity(identity)?;
        let limit = match limit {
            None => None,
            Some(n @ 1..=MAX_HISTORY_LIMIT) => usize::try_from(n).ok(),
            Some(_) => {
                return Err(ValidationErrors::single(
                    "limit",
                    format!("Limit must be between 1 and {MAX_HISTORY_LIMIT}"),
                )
                .into())
            }
        };
        self.access.practice_history(user_id, limit).await
    }

    pub async fn practice_stats(&self, identity: Option<&Identity>) -> ServiceResult<PracticeStats> {
        let user_id = require_identity(identity)?;
        self.access.practice_stats(user_id).await
    }
}
