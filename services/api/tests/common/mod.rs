//! Shared helpers for the `api` integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use api_lib::adapters::MemoryDb;
use api_lib::config::Config;
use api_lib::web::{build_router, state::AppState};
use interview_prep_core::domain::{AiFeedback, Category, Difficulty, GeneratedQuestion};
use interview_prep_core::ports::{AiError, DatabaseService, InterviewCoach};
use interview_prep_core::validation::QuestionInput;

//=========================================================================================
// Stub coach
//=========================================================================================

/// An `InterviewCoach` with canned answers that counts its calls.
pub struct StubCoach {
    pub feedback: Result<AiFeedback, AiError>,
    pub generated: Result<Vec<GeneratedQuestion>, AiError>,
    calls: AtomicUsize,
}

impl StubCoach {
    pub fn new() -> Self {
        Self {
            feedback: Ok(sample_feedback()),
            generated: Ok(vec![
                generated("Explain the CAP theorem"),
                generated("Design a rate limiter"),
            ]),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: AiError) -> Self {
        Self {
            feedback: Err(error.clone()),
            generated: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InterviewCoach for StubCoach {
    async fn request_feedback(&self, _question: &str, _answer: &str) -> Result<AiFeedback, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.feedback.clone()
    }

    async fn request_question_generation(
        &self,
        _topic: &str,
        _difficulty: Difficulty,
        count: u8,
    ) -> Result<Vec<GeneratedQuestion>, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.generated
            .clone()
            .map(|qs| qs.into_iter().take(usize::from(count)).collect())
    }
}

pub fn sample_feedback() -> AiFeedback {
    AiFeedback {
        summary: "Solid answer with a clear structure.".to_string(),
        strengths: vec!["Names the trade-offs".to_string()],
        improvements: vec!["Mention partition tolerance".to_string()],
        overall_score: 7,
    }
}

pub fn generated(title: &str) -> GeneratedQuestion {
    GeneratedQuestion {
        title: title.to_string(),
        description: format!("{title} to a senior interviewer."),
        difficulty: Difficulty::Medium,
        category: Category::SystemDesign,
        tags: vec!["distributed".to_string()],
        suggested_answer: None,
    }
}

//=========================================================================================
// Fixtures
//=========================================================================================

pub fn question_input(title: &str) -> QuestionInput {
    QuestionInput {
        title: title.to_string(),
        description: "Walk through how you would approach this problem.".to_string(),
        difficulty: "MEDIUM".to_string(),
        category: "TECHNICAL".to_string(),
        tags: vec!["rust".to_string()],
        company_name: None,
        company_id: None,
    }
}

pub fn question_json(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Walk through how you would approach this problem.",
        "difficulty": "EASY",
        "category": "CODING",
        "tags": ["arrays"],
    })
}

/// Defaults with no database and no AI key, as an empty environment gives.
pub fn test_config() -> Config {
    Config::from_lookup(|_| None).expect("the empty environment is a valid config")
}

//=========================================================================================
// App
//=========================================================================================

pub fn build_state(config: Config, coach: Arc<dyn InterviewCoach>) -> Arc<AppState> {
    let db: Arc<dyn DatabaseService> = Arc::new(MemoryDb::new());
    Arc::new(AppState::new(db, coach, Arc::new(config)))
}

/// The production router over a fresh in-memory store.
pub fn build_test_app(coach: Arc<dyn InterviewCoach>) -> Router {
    build_app_with(test_config(), coach)
}

pub fn build_app_with(config: Config, coach: Arc<dyn InterviewCoach>) -> Router {
    build_router(build_state(config, coach)).expect("router should build")
}

//=========================================================================================
// Requests
//=========================================================================================

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).expect("request should build"))
        .await
        .expect("router is infallible")
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, cookie, None).await
}

pub async fn post_json(app: &Router, uri: &str, cookie: Option<&str>, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, cookie, Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// The `session=...` pair from a `Set-Cookie` header, ready to send back.
pub fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("response should set a session cookie")
        .to_string()
}

/// Signs up `email` and returns the session cookie.
pub async fn sign_up(app: &Router, email: &str) -> String {
    let response = post_json(
        app,
        "/auth/signup",
        None,
        json!({ "email": email, "password": "CorrectHorse42", "name": "Test User" }),
    )
    .await;
    assert_eq!(response.status(), 201, "signup for {email} failed");
    session_cookie(&response)
}
