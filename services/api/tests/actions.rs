//! The action façade: identity checks, validation, and AI orchestration.

mod common;

use std::sync::Arc;

use api_lib::adapters::MemoryDb;
use common::{question_input, StubCoach};
use interview_prep_core::domain::Identity;
use interview_prep_core::validation::{
    FeedbackInput, GenerationInput, PaginationInput, PracticeInput, ValidationErrors,
};
use interview_prep_core::{Actions, AiError, DataAccess, ServiceError};
use uuid::Uuid;

fn actions_with(db: MemoryDb, coach: Arc<StubCoach>) -> Actions {
    Actions::new(DataAccess::new(Arc::new(db)), coach)
}

fn caller() -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
    }
}

fn validation_errors(err: ServiceError) -> ValidationErrors {
    match err {
        ServiceError::Validation(errors) => errors,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

fn generation(count: i64, auto_save: bool) -> GenerationInput {
    GenerationInput {
        topic: "distributed systems".to_string(),
        difficulty: "MEDIUM".to_string(),
        count: Some(count),
        auto_save,
    }
}

#[tokio::test]
async fn every_action_requires_an_identity() {
    let coach = Arc::new(StubCoach::new());
    let actions = actions_with(MemoryDb::new(), coach.clone());

    let err = actions
        .create_question(None, &question_input("Anonymous question"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Auth));

    let err = actions
        .list_questions(None, &PaginationInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Auth));

    let err = actions
        .review_answer(
            None,
            &FeedbackInput {
                question: "What is a mutex?".to_string(),
                answer: "A lock.".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Auth));
    assert_eq!(coach.calls(), 0, "the coach must not be called anonymously");
}

#[tokio::test]
async fn invalid_input_reports_every_field() {
    let actions = actions_with(MemoryDb::new(), Arc::new(StubCoach::new()));
    let me = caller();

    let mut input = question_input("Hi");
    input.difficulty = "TRIVIAL".to_string();
    let err = actions.create_question(Some(&me), &input).await.unwrap_err();
    let errors = validation_errors(err);
    assert!(errors.contains("title"));
    assert_eq!(errors.messages("difficulty"), ["Invalid difficulty level"]);

    let err = actions
        .list_questions(
            Some(&me),
            &PaginationInput {
                page: Some(0),
                limit: Some(500),
            },
        )
        .await
        .unwrap_err();
    let errors = validation_errors(err);
    assert_eq!(errors.messages("page"), ["Page must be positive"]);
    assert_eq!(errors.messages("limit"), ["Max 100 items per page"]);
}

#[tokio::test]
async fn feedback_is_passed_through_and_failures_are_typed() {
    let me = caller();
    let input = FeedbackInput {
        question: "  What is a mutex?  ".to_string(),
        answer: "A lock that guards shared state.".to_string(),
    };

    let actions = actions_with(MemoryDb::new(), Arc::new(StubCoach::new()));
    let feedback = actions.review_answer(Some(&me), &input).await.unwrap();
    assert_eq!(feedback.overall_score, 7);

    let failing = actions_with(
        MemoryDb::new(),
        Arc::new(StubCoach::failing(AiError::Parse("no JSON".to_string()))),
    );
    let err = failing.review_answer(Some(&me), &input).await.unwrap_err();
    assert!(matches!(err, ServiceError::Ai(AiError::Parse(_))));
    assert_eq!(err.code(), "AI_PARSE_ERROR");
}

#[tokio::test]
async fn generation_without_auto_save_stores_nothing() {
    let me = caller();
    let actions = actions_with(MemoryDb::new(), Arc::new(StubCoach::new()));

    let outcome = actions
        .generate_questions(Some(&me), &generation(2, false))
        .await
        .unwrap();
    assert_eq!(outcome.questions.len(), 2);
    assert!(outcome.saved_ids.is_empty());

    let page = actions
        .list_questions(Some(&me), &PaginationInput::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn auto_save_skips_questions_that_fail_to_store() {
    let me = caller();
    let actions = actions_with(
        MemoryDb::new().with_question_insert_quota(1),
        Arc::new(StubCoach::new()),
    );

    let outcome = actions
        .generate_questions(Some(&me), &generation(2, true))
        .await
        .unwrap();
    assert_eq!(outcome.questions.len(), 2);
    assert_eq!(outcome.saved_ids.len(), 1);

    let page = actions
        .list_questions(Some(&me), &PaginationInput::default())
        .await
        .unwrap();
    assert_eq!(page.items[0].id, outcome.saved_ids[0]);
}

#[tokio::test]
async fn generation_count_is_bounded() {
    let coach = Arc::new(StubCoach::new());
    let actions = actions_with(MemoryDb::new(), coach.clone());

    let err = actions
        .generate_questions(Some(&caller()), &generation(11, false))
        .await
        .unwrap_err();
    let errors = validation_errors(err);
    assert_eq!(errors.messages("count"), ["Count must be between 1 and 10"]);
    assert_eq!(coach.calls(), 0);
}

#[tokio::test]
async fn practice_history_limit_is_checked() {
    let me = caller();
    let actions = actions_with(MemoryDb::new(), Arc::new(StubCoach::new()));
    let q = actions
        .create_question(Some(&me), &question_input("Explain back-pressure"))
        .await
        .unwrap();

    for duration in [45, 90] {
        actions
            .record_practice(
                Some(&me),
                &PracticeInput {
                    question_id: q.id.to_string(),
                    answer: "Slow consumers signal producers to slow down.".to_string(),
                    duration_secs: duration,
                    rating: None,
                    feedback: None,
                },
            )
            .await
            .unwrap();
    }

    let history = actions.practice_history(Some(&me), Some(1)).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(matches!(
        actions.practice_history(Some(&me), Some(0)).await,
        Err(ServiceError::Validation(_))
    ));
    assert_eq!(actions.practice_stats(Some(&me)).await.unwrap().total_sessions, 2);
}
