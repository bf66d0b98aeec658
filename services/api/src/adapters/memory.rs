//! services/api/src/adapters/memory.rs
//!
//! An in-process `DatabaseService` used when no `DATABASE_URL` is configured
//! and by the test suites. All tables live behind one `RwLock`, so each port
//! call is atomic with respect to the others.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use interview_prep_core::domain::{
    Collection, MembershipChange, NewUser, PracticeSession, Question, User, UserCredentials,
};
use interview_prep_core::ports::{DatabaseService, PortError, PortResult};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, (User, String)>,
    auth_sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    questions: HashMap<Uuid, Question>,
    collections: HashMap<Uuid, Collection>,
    practice_sessions: Vec<PracticeSession>,
}

#[derive(Default)]
pub struct MemoryDb {
    tables: RwLock<Tables>,
    unfiltered_listing: bool,
    question_insert_quota: Option<usize>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Owner listings return every row regardless of owner or deletion state.
    pub fn with_unfiltered_listing(mut self) -> Self {
        self.unfiltered_listing = true;
        self
    }

    /// Question inserts fail once `quota` questions exist.
    pub fn with_question_insert_quota(mut self, quota: usize) -> Self {
        self.question_insert_quota = Some(quota);
        self
    }

    fn newest_first<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
        rows.sort_by(|a, b| key(b).cmp(&key(a)));
        rows
    }
}

#[async_trait]
impl DatabaseService for MemoryDb {
    // --- User Management ---

    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|(u, _)| u.email == new_user.email) {
            return Err(PortError::Conflict("Email already registered".to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            name: new_user.name,
            created_at: Utc::now(),
        };
        tables
            .users
            .insert(user.id, (user.clone(), new_user.hashed_password));
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let tables = self.tables.read().await;
        tables
            .users
            .values()
            .find(|(u, _)| u.email == email)
            .map(|(u, hash)| UserCredentials {
                user_id: u.id,
                email: u.email.clone(),
                hashed_password: hash.clone(),
            })
            .ok_or_else(|| PortError::NotFound(format!("User {email} not found")))
    }

    // --- Auth Sessions ---

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.tables
            .write()
            .await
            .auth_sessions
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let tables = self.tables.read().await;
        match tables.auth_sessions.get(session_id) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(*user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.tables.write().await.auth_sessions.remove(session_id);
        Ok(())
    }

    // --- Questions ---

    async fn insert_question(&self, question: Question) -> PortResult<Question> {
        let mut tables = self.tables.write().await;
        if let Some(quota) = self.question_insert_quota {
            if tables.questions.len() >= quota {
                return Err(PortError::Unexpected("question storage is full".to_string()));
            }
        }
        if tables.questions.contains_key(&question.id) {
            return Err(PortError::Conflict(format!("Question {} exists", question.id)));
        }
        tables.questions.insert(question.id, question.clone());
        Ok(question)
    }

    async fn get_question_by_id(&self, question_id: Uuid) -> PortResult<Question> {
        self.tables
            .read()
            .await
            .questions
            .get(&question_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Question {question_id} not found")))
    }

    async fn save_question(&self, question: &Question) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        match tables.questions.get_mut(&question.id) {
            Some(stored) => {
                *stored = question.clone();
                Ok(())
            }
            None => Err(PortError::NotFound(format!("Question {} not found", question.id))),
        }
    }

    async fn list_questions_by_owner(&self, user_id: Uuid) -> PortResult<Vec<Question>> {
        let tables = self.tables.read().await;
        let rows = tables
            .questions
            .values()
            .filter(|q| self.unfiltered_listing || (q.user_id == user_id && !q.is_deleted()))
            .cloned()
            .collect();
        Ok(Self::newest_first(rows, |q: &Question| q.created_at))
    }

    async fn get_questions_by_ids(&self, question_ids: &[Uuid]) -> PortResult<Vec<Question>> {
        let tables = self.tables.read().await;
        Ok(question_ids
            .iter()
            .filter_map(|id| tables.questions.get(id).cloned())
            .collect())
    }

    // --- Collections ---

    async fn insert_collection(&self, collection: Collection) -> PortResult<Collection> {
        let mut tables = self.tables.write().await;
        if tables.collections.contains_key(&collection.id) {
            return Err(PortError::Conflict(format!("Collection {} exists", collection.id)));
        }
        tables.collections.insert(collection.id, collection.clone());
        Ok(collection)
    }

    async fn get_collection_by_id(&self, collection_id: Uuid) -> PortResult<Collection> {
        self.tables
            .read()
            .await
            .collections
            .get(&collection_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Collection {collection_id} not found")))
    }

    async fn save_collection(&self, collection: &Collection) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        match tables.collections.get_mut(&collection.id) {
            Some(stored) => {
                // Membership is only ever written by the append/remove calls.
                let question_ids = std::mem::take(&mut stored.question_ids);
                *stored = collection.clone();
                stored.question_ids = question_ids;
                Ok(())
            }
            None => Err(PortError::NotFound(format!(
                "Collection {} not found",
                collection.id
            ))),
        }
    }

    async fn list_collections_by_owner(&self, user_id: Uuid) -> PortResult<Vec<Collection>> {
        let tables = self.tables.read().await;
        let rows = tables
            .collections
            .values()
            .filter(|c| self.unfiltered_listing || (c.user_id == user_id && !c.is_deleted()))
            .cloned()
            .collect();
        Ok(Self::newest_first(rows, |c: &Collection| c.created_at))
    }

    async fn append_collection_member(
        &self,
        collection_id: Uuid,
        question_id: Uuid,
    ) -> PortResult<MembershipChange> {
        let mut tables = self.tables.write().await;
        let collection = tables
            .collections
            .get_mut(&collection_id)
            .ok_or_else(|| PortError::NotFound(format!("Collection {collection_id} not found")))?;
        if collection.question_ids.append(question_id) {
            collection.updated_at = Utc::now();
            Ok(MembershipChange::Changed)
        } else {
            Ok(MembershipChange::Unchanged)
        }
    }

    async fn remove_collection_member(
        &self,
        collection_id: Uuid,
        question_id: Uuid,
    ) -> PortResult<MembershipChange> {
        let mut tables = self.tables.write().await;
        let collection = tables
            .collections
            .get_mut(&collection_id)
            .ok_or_else(|| PortError::NotFound(format!("Collection {collection_id} not found")))?;
        if collection.question_ids.remove(question_id) {
            collection.updated_at = Utc::now();
            Ok(MembershipChange::Changed)
        } else {
            Ok(MembershipChange::Unchanged)
        }
    }

    // --- Practice Sessions ---

    async fn insert_practice_session(&self, session: PracticeSession) -> PortResult<PracticeSession> {
        self.tables
            .write()
            .await
            .practice_sessions
            .push(session.clone());
        Ok(session)
    }

    async fn list_practice_sessions_by_owner(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
    ) -> PortResult<Vec<PracticeSession>> {
        let tables = self.tables.read().await;
        let rows = tables
            .practice_sessions
            .iter()
            .filter(|s| self.unfiltered_listing || s.user_id == user_id)
            .cloned()
            .collect();
        let mut rows = Self::newest_first(rows, |s: &PracticeSession| s.completed_at);
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }
}
