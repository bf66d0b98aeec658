//! crates/interview_prep_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! These structs are independent of any database; they serialize to the
//! camelCase JSON shape the web layer sends to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Enumerations
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = UnknownVariant;

    /// Strict: only the exact upper-case names are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Technical,
    Behavioral,
    SystemDesign,
    Coding,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Technical,
        Category::Behavioral,
        Category::SystemDesign,
        Category::Coding,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Technical => "TECHNICAL",
            Category::Behavioral => "BEHAVIORAL",
            Category::SystemDesign => "SYSTEM_DESIGN",
            Category::Coding => "CODING",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Returned when a string names no known `Difficulty` or `Category`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);

//=========================================================================================
// Users
//=========================================================================================

/// Represents a user - used throughout the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// A user row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
    pub name: Option<String>,
}

/// The acting user as resolved from the session cookie.
/// Only the id is ever consulted by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
}

//=========================================================================================
// Questions
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub category: Category,
    pub tags: Vec<String>,
    pub company_name: Option<String>,
    pub company_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Question {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn summary(&self) -> QuestionSummary {
        QuestionSummary {
            id: self.id,
            title: self.title.clone(),
            difficulty: self.difficulty,
            category: self.category,
            company_name: self.company_name.clone(),
            tags: self.tags.clone(),
            deleted_at: self.deleted_at,
        }
    }
}

/// Validated, normalized fields for a new question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub category: Category,
    pub tags: Vec<String>,
    pub company_name: Option<String>,
    pub company_id: Option<String>,
}

/// Validated partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub category: Option<Category>,
    pub tags: Option<Vec<String>>,
    pub company_name: Option<String>,
    pub company_id: Option<String>,
}

impl QuestionChanges {
    pub fn apply_to(self, question: &mut Question) {
        if let Some(title) = self.title {
            question.title = title;
        }
        if let Some(description) = self.description {
            question.description = description;
        }
        if let Some(difficulty) = self.difficulty {
            question.difficulty = difficulty;
        }
        if let Some(category) = self.category {
            question.category = category;
        }
        if let Some(tags) = self.tags {
            question.tags = tags;
        }
        if let Some(company_name) = self.company_name {
            question.company_name = Some(company_name);
        }
        if let Some(company_id) = self.company_id {
            question.company_id = Some(company_id);
        }
    }
}

/// The slice of a question shown inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSummary {
    pub id: Uuid,
    pub title: String,
    pub difficulty: Difficulty,
    pub category: Category,
    pub company_name: Option<String>,
    pub tags: Vec<String>,
    pub deleted_at: Option<DateTime<Utc>>,
}

//=========================================================================================
// Collections
//=========================================================================================

/// Ordered, duplicate-free list of question ids stored on a collection.
///
/// Holds ids only; the questions themselves are owned by their author and
/// may be soft-deleted while still listed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MembershipList(Vec<Uuid>);

impl MembershipList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a list from stored ids, dropping any repeated id after its
    /// first occurrence.
    pub fn from_ids(ids: impl IntoIterator<Item = Uuid>) -> Self {
        let mut list = Self::new();
        for id in ids {
            list.append(id);
        }
        list
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.0.contains(&id)
    }

    /// Appends `id` at the end. Returns `false` (and leaves the list as is)
    /// when the id is already present.
    pub fn append(&mut self, id: Uuid) -> bool {
        if self.contains(id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Removes `id`, keeping the order of the remaining ids.
    /// Returns `false` when the id was not a member.
    pub fn remove(&mut self, id: Uuid) -> bool {
        match self.0.iter().position(|member| *member == id) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Uuid] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of a single membership mutation in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    Changed,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub question_ids: MembershipList,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Collection {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCollection {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl CollectionChanges {
    pub fn apply_to(self, collection: &mut Collection) {
        if let Some(name) = self.name {
            collection.name = name;
        }
        if let Some(description) = self.description {
            collection.description = Some(description);
        }
        if let Some(color) = self.color {
            collection.color = Some(color);
        }
    }
}

/// A collection together with the questions its membership list resolves to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionWithQuestions {
    #[serde(flatten)]
    pub collection: Collection,
    pub questions: Vec<QuestionSummary>,
}

//=========================================================================================
// AI value objects
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiFeedback {
    pub summary: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    /// 0 to 10 inclusive.
    pub overall_score: u8,
}

/// A question proposed by the AI; shaped so it can be persisted as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub category: Category,
    pub tags: Vec<String>,
    pub suggested_answer: Option<String>,
}

impl GeneratedQuestion {
    pub fn to_new_question(&self) -> NewQuestion {
        NewQuestion {
            title: self.title.clone(),
            description: self.description.clone(),
            difficulty: self.difficulty,
            category: self.category,
            tags: self.tags.clone(),
            company_name: None,
            company_id: None,
        }
    }
}

//=========================================================================================
// Practice sessions
//=========================================================================================

/// A single answer attempt against a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question_id: Uuid,
    pub answer: String,
    pub duration_secs: u32,
    pub rating: Option<u8>,
    pub feedback: Option<AiFeedback>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPracticeSession {
    pub question_id: Uuid,
    pub answer: String,
    pub duration_secs: u32,
    pub rating: Option<u8>,
    pub feedback: Option<AiFeedback>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeStats {
    pub total_sessions: usize,
    pub avg_duration_secs: u32,
    pub by_difficulty: BTreeMap<Difficulty, usize>,
}

/// A question with its owner's most recent practice attempts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: Question,
    pub recent_sessions: Vec<PracticeSession>,
}

//=========================================================================================
// Pagination
//=========================================================================================

/// A validated page request; `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl PageRequest {
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub pages: usize,
}

impl<T> Page<T> {
    /// Slices an already filtered and ordered result set to the requested page.
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len();
        let limit = request.limit.max(1) as usize;
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(limit)
            .collect();
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
            pages: total.div_ceil(limit),
        }
    }
}
