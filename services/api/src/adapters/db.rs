//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use interview_prep_core::domain::{
    AiFeedback, Collection, MembershipChange, MembershipList, NewUser, PracticeSession, Question,
    User, UserCredentials,
};
use interview_prep_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";

const QUESTION_COLUMNS: &str = "id, user_id, title, description, difficulty, category, tags, \
     company_name, company_id, created_at, updated_at, deleted_at";
const COLLECTION_COLUMNS: &str =
    "id, user_id, name, description, color, question_ids, created_at, updated_at, deleted_at";
const PRACTICE_COLUMNS: &str =
    "id, user_id, question_id, answer, duration_secs, rating, feedback, completed_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn missing_or_unexpected(what: impl FnOnce() -> String) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what()),
        _ => unexpected(e),
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION))
}

fn changed_if(rows_affected: u64) -> MembershipChange {
    if rows_affected > 0 {
        MembershipChange::Changed
    } else {
        MembershipChange::Unchanged
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    name: Option<String>,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct QuestionRecord {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    difficulty: String,
    category: String,
    tags: Vec<String>,
    company_name: Option<String>,
    company_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}
impl QuestionRecord {
    fn to_domain(self) -> PortResult<Question> {
        Ok(Question {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            difficulty: self
                .difficulty
                .parse()
                .map_err(|e| PortError::Unexpected(format!("question {}: {e}", self.id)))?,
            category: self
                .category
                .parse()
                .map_err(|e| PortError::Unexpected(format!("question {}: {e}", self.id)))?,
            tags: self.tags,
            company_name: self.company_name,
            company_id: self.company_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

#[derive(FromRow)]
struct CollectionRecord {
    id: Uuid,
    user_id: Uuid,
    name: String,
    description: Option<String>,
    color: Option<String>,
    question_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}
impl CollectionRecord {
    fn to_domain(self) -> Collection {
        Collection {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            description: self.description,
            color: self.color,
            question_ids: MembershipList::from_ids(self.question_ids),
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

#[derive(FromRow)]
struct PracticeRecord {
    id: Uuid,
    user_id: Uuid,
    question_id: Uuid,
    answer: String,
    duration_secs: i32,
    rating: Option<i16>,
    feedback: Option<Json<AiFeedback>>,
    completed_at: DateTime<Utc>,
}
impl PracticeRecord {
    fn to_domain(self) -> PracticeSession {
        PracticeSession {
            id: self.id,
            user_id: self.user_id,
            question_id: self.question_id,
            answer: self.answer,
            duration_secs: u32::try_from(self.duration_secs).unwrap_or(0),
            rating: self.rating.and_then(|r| u8::try_from(r).ok()),
            feedback: self.feedback.map(|Json(f)| f),
            completed_at: self.completed_at,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    // --- User Management ---

    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, email, hashed_password, name) VALUES ($1, $2, $3, $4) \
             RETURNING id, email, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.email)
        .bind(&new_user.hashed_password)
        .bind(&new_user.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::Conflict("Email already registered".to_string())
            } else {
                unexpected(e)
            }
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(missing_or_unexpected(|| format!("User {email} not found")))?;
        Ok(record.to_domain())
    }

    // --- Auth Sessions ---

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    // --- Questions ---

    async fn insert_question(&self, question: Question) -> PortResult<Question> {
        sqlx::query(
            "INSERT INTO questions (id, user_id, title, description, difficulty, category, tags, \
             company_name, company_id, created_at, updated_at, deleted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(question.id)
        .bind(question.user_id)
        .bind(&question.title)
        .bind(&question.description)
        .bind(question.difficulty.as_str())
        .bind(question.category.as_str())
        .bind(&question.tags)
        .bind(&question.company_name)
        .bind(&question.company_id)
        .bind(question.created_at)
        .bind(question.updated_at)
        .bind(question.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(question)
    }

    async fn get_question_by_id(&self, question_id: Uuid) -> PortResult<Question> {
        let record = sqlx::query_as::<_, QuestionRecord>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1"
        ))
        .bind(question_id)
        .fetch_one(&self.pool)
        .await
        .map_err(missing_or_unexpected(|| format!("Question {question_id} not found")))?;
        record.to_domain()
    }

    async fn save_question(&self, question: &Question) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE questions SET title = $2, description = $3, difficulty = $4, category = $5, \
             tags = $6, company_name = $7, company_id = $8, updated_at = $9, deleted_at = $10 \
             WHERE id = $1",
        )
        .bind(question.id)
        .bind(&question.title)
        .bind(&question.description)
        .bind(question.difficulty.as_str())
        .bind(question.category.as_str())
        .bind(&question.tags)
        .bind(&question.company_name)
        .bind(&question.company_id)
        .bind(question.updated_at)
        .bind(question.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Question {} not found", question.id)));
        }
        Ok(())
    }

    async fn list_questions_by_owner(&self, user_id: Uuid) -> PortResult<Vec<Question>> {
        let records = sqlx::query_as::<_, QuestionRecord>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions \
             WHERE user_id = $1 AND deleted_at IS NULL ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(QuestionRecord::to_domain).collect()
    }

    async fn get_questions_by_ids(&self, question_ids: &[Uuid]) -> PortResult<Vec<Question>> {
        let records = sqlx::query_as::<_, QuestionRecord>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ANY($1)"
        ))
        .bind(question_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(QuestionRecord::to_domain).collect()
    }

    // --- Collections ---

    async fn insert_collection(&self, collection: Collection) -> PortResult<Collection> {
        sqlx::query(
            "INSERT INTO collections (id, user_id, name, description, color, question_ids, \
             created_at, updated_at, deleted_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(collection.id)
        .bind(collection.user_id)
        .bind(&collection.name)
        .bind(&collection.description)
        .bind(&collection.color)
        .bind(collection.question_ids.as_slice())
        .bind(collection.created_at)
        .bind(collection.updated_at)
        .bind(collection.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(collection)
    }

    async fn get_collection_by_id(&self, collection_id: Uuid) -> PortResult<Collection> {
        let record = sqlx::query_as::<_, CollectionRecord>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections WHERE id = $1"
        ))
        .bind(collection_id)
        .fetch_one(&self.pool)
        .await
        .map_err(missing_or_unexpected(|| format!("Collection {collection_id} not found")))?;
        Ok(record.to_domain())
    }

    async fn save_collection(&self, collection: &Collection) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE collections SET name = $2, description = $3, color = $4, updated_at = $5, \
             deleted_at = $6 WHERE id = $1",
        )
        .bind(collection.id)
        .bind(&collection.name)
        .bind(&collection.description)
        .bind(&collection.color)
        .bind(collection.updated_at)
        .bind(collection.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Collection {} not found", collection.id)));
        }
        Ok(())
    }

    async fn list_collections_by_owner(&self, user_id: Uuid) -> PortResult<Vec<Collection>> {
        let records = sqlx::query_as::<_, CollectionRecord>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collections \
             WHERE user_id = $1 AND deleted_at IS NULL ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(CollectionRecord::to_domain).collect())
    }

    async fn append_collection_member(
        &self,
        collection_id: Uuid,
        question_id: Uuid,
    ) -> PortResult<MembershipChange> {
        // The guard makes the append an atomic add-to-set.
        let result = sqlx::query(
            "UPDATE collections SET question_ids = array_append(question_ids, $2), \
             updated_at = now() WHERE id = $1 AND NOT ($2 = ANY(question_ids))",
        )
        .bind(collection_id)
        .bind(question_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(changed_if(result.rows_affected()))
    }

    async fn remove_collection_member(
        &self,
        collection_id: Uuid,
        question_id: Uuid,
    ) -> PortResult<MembershipChange> {
        let result = sqlx::query(
            "UPDATE collections SET question_ids = array_remove(question_ids, $2), \
             updated_at = now() WHERE id = $1 AND $2 = ANY(question_ids)",
        )
        .bind(collection_id)
        .bind(question_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(changed_if(result.rows_affected()))
    }

    // --- Practice Sessions ---

    async fn insert_practice_session(&self, session: PracticeSession) -> PortResult<PracticeSession> {
        sqlx::query(
            "INSERT INTO practice_sessions (id, user_id, question_id, answer, duration_secs, \
             rating, feedback, completed_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.question_id)
        .bind(&session.answer)
        .bind(i32::try_from(session.duration_secs).unwrap_or(i32::MAX))
        .bind(session.rating.map(i16::from))
        .bind(session.feedback.clone().map(Json))
        .bind(session.completed_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(session)
    }

    async fn list_practice_sessions_by_owner(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
    ) -> PortResult<Vec<PracticeSession>> {
        let limit = limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX));
        let records = sqlx::query_as::<_, PracticeRecord>(&format!(
            "SELECT {PRACTICE_COLUMNS} FROM practice_sessions \
             WHERE user_id = $1 ORDER BY completed_at DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(PracticeRecord::to_domain).collect())
    }
}
