//! crates/interview_prep_core/src/validation.rs
//!
//! Input contracts for every mutating operation.
//!
//! Validators are pure: the same input always yields the same decision and the
//! same normalized output. Strings are normalized first (trimmed, inner runs of
//! whitespace collapsed to one space) and lengths are counted in characters on
//! the normalized value. Failures are reported per field so a form can show
//! every problem at once.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::domain::{
    AiFeedback, Category, CollectionChanges, Difficulty, NewCollection, NewPracticeSession,
    NewQuestion, PageRequest, QuestionChanges,
};

static OBJECT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").expect("object id pattern"));
static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color pattern"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

pub const MAX_TAGS: usize = 10;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_GENERATION_COUNT: u8 = 5;

//=========================================================================================
// Error map
//=========================================================================================

/// Field name → messages, keyed in lexicographic order: `tags.10` sorts
/// before `tags.2`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

//=========================================================================================
// Shared rules
//=========================================================================================

/// Trims and collapses every whitespace run to a single space.
pub fn normalize_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn check_length(
    errors: &mut ValidationErrors,
    field: &str,
    label: &str,
    value: &str,
    min: usize,
    max: usize,
) {
    let length = value.chars().count();
    if length < min {
        if min == 1 {
            errors.add(field, format!("{label} is required"));
        } else {
            errors.add(field, format!("{label} must be at least {min} characters"));
        }
    } else if length > max {
        errors.add(field, format!("{label} must be at most {max} characters"));
    }
}

/// Normalizes then length-checks a required text field.
fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    label: &str,
    raw: &str,
    min: usize,
    max: usize,
) -> String {
    let value = normalize_whitespace(raw);
    check_length(errors, field, label, &value, min, max);
    value
}

/// Normalizes an optional text field; blank input counts as absent.
fn optional_text(
    errors: &mut ValidationErrors,
    field: &str,
    label: &str,
    raw: Option<&str>,
    max: usize,
) -> Option<String> {
    let value = normalize_whitespace(raw?);
    if value.is_empty() {
        return None;
    }
    check_length(errors, field, label, &value, 0, max);
    Some(value)
}

fn enum_value<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &str,
    raw: &str,
    message: &str,
) -> Option<T> {
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.add(field, message);
            None
        }
    }
}

fn patterned(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<&str>,
    pattern: &Regex,
    message: &str,
) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }
    if !pattern.is_match(value) {
        errors.add(field, message);
    }
    Some(value.to_string())
}

fn tag_list(errors: &mut ValidationErrors, raw: &[String]) -> Vec<String> {
    if raw.len() > MAX_TAGS {
        errors.add("tags", format!("Maximum {MAX_TAGS} tags allowed"));
    }
    raw.iter()
        .enumerate()
        .map(|(index, tag)| {
            let tag = normalize_whitespace(tag);
            check_length(errors, &format!("tags.{index}"), "Tag", &tag, 1, 30);
            tag
        })
        .collect()
}

//=========================================================================================
// Questions
//=========================================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionInput {
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub category: String,
    pub tags: Vec<String>,
    pub company_name: Option<String>,
    pub company_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionPatchInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub company_name: Option<String>,
    pub company_id: Option<String>,
}

pub fn validate_question_input(input: &QuestionInput) -> Result<NewQuestion, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = required_text(&mut errors, "title", "Title", &input.title, 5, 200);
    let description = required_text(
        &mut errors,
        "description",
        "Description",
        &input.description,
        10,
        5000,
    );
    let difficulty: Option<Difficulty> =
        enum_value(&mut errors, "difficulty", &input.difficulty, "Invalid difficulty level");
    let category: Option<Category> =
        enum_value(&mut errors, "category", &input.category, "Invalid category");
    let tags = tag_list(&mut errors, &input.tags);
    let company_name = optional_text(
        &mut errors,
        "companyName",
        "Company name",
        input.company_name.as_deref(),
        100,
    );
    let company_id = patterned(
        &mut errors,
        "companyId",
        input.company_id.as_deref(),
        &OBJECT_ID,
        "Invalid company ID",
    );

    match (difficulty, category) {
        (Some(difficulty), Some(category)) => errors.into_result(NewQuestion {
            title,
            description,
            difficulty,
            category,
            tags,
            company_name,
            company_id,
        }),
        _ => Err(errors),
    }
}

pub fn validate_question_patch(
    input: &QuestionPatchInput,
) -> Result<QuestionChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let changes = QuestionChanges {
        title: input
            .title
            .as_deref()
            .map(|raw| required_text(&mut errors, "title", "Title", raw, 5, 200)),
        description: input
            .description
            .as_deref()
            .map(|raw| required_text(&mut errors, "description", "Description", raw, 10, 5000)),
        difficulty: input.difficulty.as_deref().and_then(|raw| {
            enum_value(&mut errors, "difficulty", raw, "Invalid difficulty level")
        }),
        category: input
            .category
            .as_deref()
            .and_then(|raw| enum_value(&mut errors, "category", raw, "Invalid category")),
        tags: input.tags.as_deref().map(|raw| tag_list(&mut errors, raw)),
        company_name: optional_text(
            &mut errors,
            "companyName",
            "Company name",
            input.company_name.as_deref(),
            100,
        ),
        company_id: patterned(
            &mut errors,
            "companyId",
            input.company_id.as_deref(),
            &OBJECT_ID,
            "Invalid company ID",
        ),
    };

    errors.into_result(changes)
}

//=========================================================================================
// Collections
//=========================================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectionInput {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectionPatchInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

const COLOR_MESSAGE: &str = "Invalid hex color (e.g., #3B82F6)";

pub fn validate_collection_input(
    input: &CollectionInput,
) -> Result<NewCollection, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = required_text(&mut errors, "name", "Name", &input.name, 3, 100);
    let description = optional_text(
        &mut errors,
        "description",
        "Description",
        input.description.as_deref(),
        500,
    );
    let color = patterned(
        &mut errors,
        "color",
        input.color.as_deref(),
        &HEX_COLOR,
        COLOR_MESSAGE,
    );

    errors.into_result(NewCollection {
        name,
        description,
        color,
    })
}

pub fn validate_collection_patch(
    input: &CollectionPatchInput,
) -> Result<CollectionChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let changes = CollectionChanges {
        name: input
            .name
            .as_deref()
            .map(|raw| required_text(&mut errors, "name", "Name", raw, 3, 100)),
        description: optional_text(
            &mut errors,
            "description",
            "Description",
            input.description.as_deref(),
            500,
        ),
        color: patterned(
            &mut errors,
            "color",
            input.color.as_deref(),
            &HEX_COLOR,
            COLOR_MESSAGE,
        ),
    };

    errors.into_result(changes)
}

//=========================================================================================
// Accounts
//=========================================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// A validated sign-up. The email is trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignIn {
    pub email: String,
    pub password: String,
}

fn email_address(errors: &mut ValidationErrors, raw: &str) -> String {
    let email = raw.trim().to_lowercase();
    if !EMAIL.is_match(&email) {
        errors.add("email", "Invalid email address");
    } else if email.chars().count() > 255 {
        errors.add("email", "Email must be at most 255 characters");
    }
    email
}

pub fn validate_sign_up(input: &SignUpInput) -> Result<SignUp, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let email = email_address(&mut errors, &input.email);

    let password = &input.password;
    let length = password.chars().count();
    if length < 8 {
        errors.add("password", "Password must be at least 8 characters");
    } else if length > 128 {
        errors.add("password", "Password too long");
    }
    if !password.chars().any(char::is_uppercase) {
        errors.add("password", "Password must contain uppercase letter");
    }
    if !password.chars().any(char::is_lowercase) {
        errors.add("password", "Password must contain lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.add("password", "Password must contain number");
    }

    let name = input.name.as_deref().map(normalize_whitespace).filter(|n| !n.is_empty());
    if let Some(name) = &name {
        check_length(&mut errors, "name", "Name", name, 2, 100);
    }

    errors.into_result(SignUp {
        email,
        password: password.clone(),
        name,
    })
}

pub fn validate_sign_in(input: &SignInInput) -> Result<SignIn, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let email = email_address(&mut errors, &input.email);
    if input.password.is_empty() {
        errors.add("password", "Password required");
    }
    errors.into_result(SignIn {
        email,
        password: input.password.clone(),
    })
}

//=========================================================================================
// Pagination
//=========================================================================================

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct PaginationInput {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub fn validate_pagination(input: &PaginationInput) -> Result<PageRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let page = input.page.unwrap_or(1);
    if page < 1 {
        errors.add("page", "Page must be positive");
    }
    let limit = input.limit.unwrap_or(i64::from(DEFAULT_PAGE_SIZE));
    if limit < 1 {
        errors.add("limit", "Limit must be positive");
    } else if limit > MAX_PAGE_SIZE {
        errors.add("limit", format!("Max {MAX_PAGE_SIZE} items per page"));
    }

    match (u32::try_from(page), u32::try_from(limit)) {
        (Ok(page), Ok(limit)) => errors.into_result(PageRequest { page, limit }),
        _ => {
            if errors.is_empty() {
                errors.add("page", "Page is out of range");
            }
            Err(errors)
        }
    }
}

//=========================================================================================
// AI requests
//=========================================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedbackInput {
    pub question: String,
    pub answer: String,
}

/// Trimmed only: answers often carry code whose line breaks matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRequest {
    pub question: String,
    pub answer: String,
}

pub fn validate_feedback_request(input: &FeedbackInput) -> Result<FeedbackRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let question = input.question.trim().to_string();
    let answer = input.answer.trim().to_string();
    check_length(&mut errors, "question", "Question", &question, 1, 2000);
    check_length(&mut errors, "answer", "Answer", &answer, 1, 5000);
    errors.into_result(FeedbackRequest { question, answer })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationInput {
    pub topic: String,
    pub difficulty: String,
    pub count: Option<i64>,
    pub auto_save: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub topic: String,
    pub difficulty: Difficulty,
    pub count: u8,
    pub auto_save: bool,
}

pub fn validate_generation_request(
    input: &GenerationInput,
) -> Result<GenerationRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let topic = required_text(&mut errors, "topic", "Topic", &input.topic, 1, 200);
    let difficulty: Option<Difficulty> =
        enum_value(&mut errors, "difficulty", &input.difficulty, "Invalid difficulty level");
    let count = input.count.unwrap_or(i64::from(DEFAULT_GENERATION_COUNT));
    let count = match u8::try_from(count) {
        Ok(count @ 1..=10) => Some(count),
        _ => {
            errors.add("count", "Count must be between 1 and 10");
            None
        }
    };

    match (difficulty, count) {
        (Some(difficulty), Some(count)) => errors.into_result(GenerationRequest {
            topic,
            difficulty,
            count,
            auto_save: input.auto_save,
        }),
        _ => Err(errors),
    }
}

//=========================================================================================
// Practice sessions
//=========================================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PracticeInput {
    pub question_id: String,
    pub answer: String,
    #[serde(alias = "duration")]
    pub duration_secs: i64,
    pub rating: Option<i64>,
    pub feedback: Option<AiFeedback>,
}

pub fn validate_practice_input(
    input: &PracticeInput,
) -> Result<NewPracticeSession, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let question_id = match Uuid::parse_str(input.question_id.trim()) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add("questionId", "Invalid question ID");
            None
        }
    };
    let answer = required_text(&mut errors, "answer", "Answer", &input.answer, 10, 5000);

    let duration_secs = match u32::try_from(input.duration_secs) {
        Ok(secs @ 1..=3600) => secs,
        Ok(0) | Err(_) => {
            errors.add("durationSecs", "Duration must be positive");
            0
        }
        Ok(_) => {
            errors.add("durationSecs", "Duration too long");
            0
        }
    };

    let rating = match input.rating {
        None => None,
        Some(rating @ 1..=5) => u8::try_from(rating).ok(),
        Some(_) => {
            errors.add("rating", "Rating must be between 1 and 5");
            None
        }
    };

    if let Some(feedback) = &input.feedback {
        if feedback.overall_score > 10 {
            errors.add("feedback", "Feedback score must be between 0 and 10");
        }
    }

    match question_id {
        Some(question_id) => errors.into_result(NewPracticeSession {
            question_id,
            answer,
            duration_secs,
            rating,
            feedback: input.feedback.clone(),
        }),
        None => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question_input() -> QuestionInput {
        QuestionInput {
            title: "  Design a   URL shortener ".to_string(),
            description: "Walk through\n\nthe storage and   hashing choices.".to_string(),
            difficulty: "MEDIUM".to_string(),
            category: "SYSTEM_DESIGN".to_string(),
            tags: vec![" distributed   systems ".to_string(), "hashing".to_string()],
            company_name: Some("  Acme   Corp ".to_string()),
            company_id: Some("507f1f77bcf86cd799439011".to_string()),
        }
    }

    #[test]
    fn error_fields_are_listed_lexicographically() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "Title is required");
        errors.add("tags.2", "Tag is too long");
        errors.add("tags.10", "Tag is too long");
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["tags.10", "tags.2", "title"]);
    }

    #[test]
    fn valid_question_is_normalized() {
        let question = validate_question_input(&question_input()).unwrap();
        assert_eq!(question.title, "Design a URL shortener");
        assert_eq!(question.description, "Walk through the storage and hashing choices.");
        assert_eq!(question.difficulty, Difficulty::Medium);
        assert_eq!(question.category, Category::SystemDesign);
        assert_eq!(question.tags, vec!["distributed systems", "hashing"]);
        assert_eq!(question.company_name.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn validation_is_deterministic() {
        let input = question_input();
        assert_eq!(
            validate_question_input(&input).unwrap(),
            validate_question_input(&input).unwrap()
        );
    }

    #[test]
    fn title_length_bounds_are_enforced() {
        for title in ["", "abcd", "x".repeat(201).as_str()] {
            let input = QuestionInput {
                title: title.to_string(),
                ..question_input()
            };
            let errors = validate_question_input(&input).unwrap_err();
            assert!(errors.contains("title"), "title {title:?} should be rejected");
            assert!(errors.messages("title")[0].starts_with("Title"));
        }
        for title in ["abcde", "x".repeat(200).as_str()] {
            let input = QuestionInput {
                title: title.to_string(),
                ..question_input()
            };
            assert!(validate_question_input(&input).is_ok());
        }
    }

    #[test]
    fn whitespace_only_title_counts_as_empty() {
        let input = QuestionInput {
            title: "          ".to_string(),
            ..question_input()
        };
        assert!(validate_question_input(&input).unwrap_err().contains("title"));
    }

    #[test]
    fn enums_and_tags_are_checked() {
        let input = QuestionInput {
            difficulty: "medium".to_string(),
            category: "ARCHITECTURE".to_string(),
            tags: (0..11).map(|i| format!("tag{i}")).collect(),
            ..question_input()
        };
        let errors = validate_question_input(&input).unwrap_err();
        assert_eq!(errors.messages("difficulty"), ["Invalid difficulty level"]);
        assert_eq!(errors.messages("category"), ["Invalid category"]);
        assert_eq!(errors.messages("tags"), ["Maximum 10 tags allowed"]);

        let input = QuestionInput {
            tags: vec!["ok".to_string(), "   ".to_string(), "y".repeat(31)],
            ..question_input()
        };
        let errors = validate_question_input(&input).unwrap_err();
        assert!(errors.contains("tags.1"));
        assert!(errors.contains("tags.2"));
        assert!(!errors.contains("tags.0"));
    }

    #[test]
    fn company_id_must_look_like_an_object_id() {
        let input = QuestionInput {
            company_id: Some("not-an-id".to_string()),
            ..question_input()
        };
        assert_eq!(
            validate_question_input(&input).unwrap_err().messages("companyId"),
            ["Invalid company ID"]
        );
    }

    #[test]
    fn question_patch_only_checks_present_fields() {
        let changes = validate_question_patch(&QuestionPatchInput {
            title: Some(" New   title ".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(changes.title.as_deref(), Some("New title"));
        assert!(changes.description.is_none());

        let errors = validate_question_patch(&QuestionPatchInput {
            description: Some("short".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(errors.contains("description"));
    }

    #[test]
    fn collection_rules() {
        let collection = validate_collection_input(&CollectionInput {
            name: " FAANG   Prep ".to_string(),
            description: Some("   ".to_string()),
            color: Some("#3b82F6".to_string()),
        })
        .unwrap();
        assert_eq!(collection.name, "FAANG Prep");
        assert_eq!(collection.description, None);
        assert_eq!(collection.color.as_deref(), Some("#3b82F6"));

        let errors = validate_collection_input(&CollectionInput {
            name: "ab".to_string(),
            description: Some("d".repeat(501)),
            color: Some("3B82F6".to_string()),
        })
        .unwrap_err();
        assert!(errors.contains("name"));
        assert!(errors.contains("description"));
        assert_eq!(errors.messages("color"), [COLOR_MESSAGE]);
    }

    #[test]
    fn sign_up_password_rules() {
        let ok = validate_sign_up(&SignUpInput {
            email: " Ada@Example.com ".to_string(),
            password: "Secret123".to_string(),
            name: Some("Ada".to_string()),
        })
        .unwrap();
        assert_eq!(ok.email, "ada@example.com");

        let errors = validate_sign_up(&SignUpInput {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            name: Some("A".to_string()),
        })
        .unwrap_err();
        assert!(errors.contains("email"));
        assert!(errors.contains("name"));
        let password = errors.messages("password");
        assert!(password.contains(&"Password must be at least 8 characters".to_string()));
        assert!(password.contains(&"Password must contain uppercase letter".to_string()));
        assert!(password.contains(&"Password must contain number".to_string()));
    }

    #[test]
    fn pagination_defaults_and_bounds() {
        assert_eq!(
            validate_pagination(&PaginationInput::default()).unwrap(),
            PageRequest { page: 1, limit: 20 }
        );
        let errors = validate_pagination(&PaginationInput {
            page: Some(0),
            limit: Some(101),
        })
        .unwrap_err();
        assert!(errors.contains("page"));
        assert_eq!(errors.messages("limit"), ["Max 100 items per page"]);
    }

    #[test]
    fn generation_request_bounds() {
        let request = validate_generation_request(&GenerationInput {
            topic: "Graphs".to_string(),
            difficulty: "MEDIUM".to_string(),
            count: Some(3),
            auto_save: true,
        })
        .unwrap();
        assert_eq!(request.count, 3);
        assert!(request.auto_save);

        let errors = validate_generation_request(&GenerationInput {
            topic: " ".to_string(),
            difficulty: "MEDIUM".to_string(),
            count: Some(11),
            auto_save: false,
        })
        .unwrap_err();
        assert_eq!(errors.messages("topic"), ["Topic is required"]);
        assert!(errors.contains("count"));
    }

    #[test]
    fn feedback_request_rejects_blank_and_oversized_text() {
        let errors = validate_feedback_request(&FeedbackInput {
            question: "   ".to_string(),
            answer: "a".repeat(5001),
        })
        .unwrap_err();
        assert_eq!(errors.messages("question"), ["Question is required"]);
        assert_eq!(errors.messages("answer"), ["Answer must be at most 5000 characters"]);
    }

    #[test]
    fn practice_input_rules() {
        let id = Uuid::new_v4();
        let session = validate_practice_input(&PracticeInput {
            question_id: id.to_string(),
            answer: "I would use a hash map keyed by".to_string(),
            duration_secs: 120,
            rating: Some(4),
            feedback: None,
        })
        .unwrap();
        assert_eq!(session.question_id, id);
        assert_eq!(session.rating, Some(4));

        let errors = validate_practice_input(&PracticeInput {
            question_id: "nope".to_string(),
            answer: "short".to_string(),
            duration_secs: 4000,
            rating: Some(9),
            feedback: None,
        })
        .unwrap_err();
        for field in ["questionId", "answer", "durationSecs", "rating"] {
            assert!(errors.contains(field), "{field} should be rejected");
        }
    }

    #[test]
    fn errors_render_as_field_message_pairs() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Name is required");
        errors.add("color", "bad");
        assert_eq!(errors.to_string(), "color: bad; name: Name is required");
    }
}
