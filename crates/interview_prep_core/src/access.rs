//! crates/interview_prep_core/src/access.rs
//!
//! Ownership-scoped reads and writes over the store port.
//!
//! Every operation takes the acting owner's id. Entities are checked in a
//! fixed order: missing is `NotFound`, owned by someone else is `Forbidden`,
//! soft-deleted is `NotFound`. Listings re-filter whatever the store returns,
//! so a store that forgets its `WHERE` clause still cannot leak rows.

use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    Collection, CollectionChanges, CollectionWithQuestions, MembershipChange, MembershipList,
    NewCollection, NewPracticeSession, NewQuestion, Page, PageRequest, PracticeSession,
    PracticeStats, Question, QuestionChanges, QuestionDetail,
};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{DatabaseService, PortError};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const RECENT_SESSIONS_PER_QUESTION: usize = 5;

/// An entity with an owner and a soft-delete marker.
pub trait Owned {
    const ENTITY: &'static str;

    fn entity_id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;
    fn is_deleted(&self) -> bool;
}

impl Owned for Question {
    const ENTITY: &'static str = "Question";

    fn entity_id(&self) -> Uuid {
        self.id
    }
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Owned for Collection {
    const ENTITY: &'static str = "Collection";

    fn entity_id(&self) -> Uuid {
        self.id
    }
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Passes `entity` through when `caller` owns it.
pub fn require_owner<T: Owned>(entity: T, caller: Uuid) -> ServiceResult<T> {
    if entity.owner_id() == caller {
        Ok(entity)
    } else {
        tracing::warn!(
            user_id = %caller,
            entity = T::ENTITY,
            entity_id = %entity.entity_id(),
            "Access to an entity owned by another user"
        );
        Err(ServiceError::Forbidden {
            entity: T::ENTITY,
            id: entity.entity_id(),
        })
    }
}

fn require_active<T: Owned>(entity: T) -> ServiceResult<T> {
    if entity.is_deleted() {
        Err(ServiceError::not_found(T::ENTITY, entity.entity_id()))
    } else {
        Ok(entity)
    }
}

fn visible_to<T: Owned>(entity: &T, owner: Uuid) -> bool {
    entity.owner_id() == owner && !entity.is_deleted()
}

fn audit(user_id: Uuid, action: &str, entity: &str, entity_id: Uuid) {
    tracing::info!(target: "audit", %user_id, action, entity, %entity_id, "audit event");
}

fn missing_as_not_found(entity: &'static str, id: Uuid) -> impl FnOnce(PortError) -> ServiceError {
    move |error| match error {
        PortError::NotFound(_) => ServiceError::not_found(entity, id),
        other => ServiceError::from(other),
    }
}

#[derive(Clone)]
pub struct DataAccess {
    store: Arc<dyn DatabaseService>,
}

impl DataAccess {
    pub fn new(store: Arc<dyn DatabaseService>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DatabaseService> {
        &self.store
    }

    //=====================================================================================
    // Loading
    //=====================================================================================

    async fn load_question(&self, id: Uuid) -> ServiceResult<Question> {
        self.store
            .get_question_by_id(id)
            .await
            .map_err(missing_as_not_found(Question::ENTITY, id))
    }

    async fn load_collection(&self, id: Uuid) -> ServiceResult<Collection> {
        self.store
            .get_collection_by_id(id)
            .await
            .map_err(missing_as_not_found(Collection::ENTITY, id))
    }

    async fn active_question(&self, owner: Uuid, id: Uuid) -> ServiceResult<Question> {
        let question = self.load_question(id).await?;
        require_active(require_owner(question, owner)?)
    }

    async fn active_collection(&self, owner: Uuid, id: Uuid) -> ServiceResult<Collection> {
        let collection = self.load_collection(id).await?;
        require_active(require_owner(collection, owner)?)
    }

    //=====================================================================================
    // Questions
    //=====================================================================================

    pub async fn create_question(&self, owner: Uuid, new: NewQuestion) -> ServiceResult<Question> {
        let now = Utc::now();
        let question = Question {
            id: Uuid::new_v4(),
            user_id: owner,
            title: new.title,
            description: new.description,
            difficulty: new.difficulty,
            category: new.category,
            tags: new.tags,
            company_name: new.company_name,
            company_id: new.company_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let question = self.store.insert_question(question).await?;
        audit(owner, "create", Question::ENTITY, question.id);
        Ok(question)
    }

    pub async fn get_question(&self, owner: Uuid, id: Uuid) -> ServiceResult<Question> {
        self.active_question(owner, id).await
    }

    /// The question plus its owner's latest attempts at it.
    pub async fn question_detail(&self, owner: Uuid, id: Uuid) -> ServiceResult<QuestionDetail> {
        let question = self.active_question(owner, id).await?;
        let recent_sessions = self
            .recent_practice_for_question(owner, id, RECENT_SESSIONS_PER_QUESTION)
            .await?;
        Ok(QuestionDetail {
            question,
            recent_sessions,
        })
    }

    pub async fn update_question(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: QuestionChanges,
    ) -> ServiceResult<Question> {
        let mut question = self.active_question(owner, id).await?;
        changes.apply_to(&mut question);
        question.updated_at = Utc::now();
        self.store.save_question(&question).await?;
        audit(owner, "update", Question::ENTITY, id);
        Ok(question)
    }

    /// Marks the question deleted. Collections that list it keep their ids.
    pub async fn soft_delete_question(&self, owner: Uuid, id: Uuid) -> ServiceResult<()> {
        let mut question = self.active_question(owner, id).await?;
        let now = Utc::now();
        question.deleted_at = Some(now);
        question.updated_at = now;
        self.store.save_question(&question).await?;
        audit(owner, "delete", Question::ENTITY, id);
        Ok(())
    }

    pub async fn list_questions(
        &self,
        owner: Uuid,
        request: PageRequest,
    ) -> ServiceResult<Page<Question>> {
        let mut questions: Vec<Question> = self
            .store
            .list_questions_by_owner(owner)
            .await?
            .into_iter()
            .filter(|q| visible_to(q, owner))
            .collect();
        questions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(Page::slice(questions, request))
    }

    //=====================================================================================
    // Collections
    //=====================================================================================

    pub async fn create_collection(
        &self,
        owner: Uuid,
        new: NewCollection,
    ) -> ServiceResult<Collection> {
        let now = Utc::now();
        let collection = Collection {
            id: Uuid::new_v4(),
            user_id: owner,
            name: new.name,
            description: new.description,
            color: new.color,
            question_ids: MembershipList::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let collection = self.store.insert_collection(collection).await?;
        audit(owner, "create", Collection::ENTITY, collection.id);
        Ok(collection)
    }

    pub async fn get_collection(&self, owner: Uuid, id: Uuid) -> ServiceResult<Collection> {
        self.active_collection(owner, id).await
    }

    pub async fn update_collection(
        &self,
        owner: Uuid,
        id: Uuid,
        changes: CollectionChanges,
    ) -> ServiceResult<Collection> {
        let mut collection = self.active_collection(owner, id).await?;
        changes.apply_to(&mut collection);
        collection.updated_at = Utc::now();
        self.store.save_collection(&collection).await?;
        audit(owner, "update", Collection::ENTITY, id);
        Ok(collection)
    }

    pub async fn soft_delete_collection(&self, owner: Uuid, id: Uuid) -> ServiceResult<()> {
        let mut collection = self.active_collection(owner, id).await?;
        let now = Utc::now();
        collection.deleted_at = Some(now);
        collection.updated_at = now;
        self.store.save_collection(&collection).await?;
        audit(owner, "delete", Collection::ENTITY, id);
        Ok(())
    }

    pub async fn list_collections(
        &self,
        owner: Uuid,
        request: PageRequest,
    ) -> ServiceResult<Page<Collection>> {
        let mut collections: Vec<Collection> = self
            .store
            .list_collections_by_owner(owner)
            .await?
            .into_iter()
            .filter(|c| visible_to(c, owner))
            .collect();
        collections.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(Page::slice(collections, request))
    }

    //=====================================================================================
    // Membership
    //=====================================================================================

    /// Appends the question to the end of the collection's membership list.
    pub async fn add_member(
        &self,
        owner: Uuid,
        collection_id: Uuid,
        question_id: Uuid,
    ) -> ServiceResult<Collection> {
        let mut collection = self.active_collection(owner, collection_id).await?;

        // Someone else's question is reported as missing, not forbidden.
        let question = self.load_question(question_id).await?;
        if !visible_to(&question, owner) {
            tracing::warn!(
                user_id = %owner,
                %collection_id,
                %question_id,
                "Question is not addable by this user"
            );
            return Err(ServiceError::not_found(Question::ENTITY, question_id));
        }

        if collection.question_ids.contains(question_id) {
            return Err(ServiceError::Conflict(
                "Question already in collection".to_string(),
            ));
        }

        match self
            .store
            .append_collection_member(collection_id, question_id)
            .await?
        {
            MembershipChange::Changed => {
                audit(owner, "add_question", Collection::ENTITY, collection_id);
            }
            MembershipChange::Unchanged => {
                tracing::debug!(%collection_id, %question_id, "Concurrent add already applied");
            }
        }

        collection.question_ids.append(question_id);
        collection.updated_at = Utc::now();
        Ok(collection)
    }

    /// Removing a question that is not a member succeeds without change.
    pub async fn remove_member(
        &self,
        owner: Uuid,
        collection_id: Uuid,
        question_id: Uuid,
    ) -> ServiceResult<Collection> {
        let mut collection = self.active_collection(owner, collection_id).await?;

        if self
            .store
            .remove_collection_member(collection_id, question_id)
            .await?
            == MembershipChange::Changed
        {
            audit(owner, "remove_question", Collection::ENTITY, collection_id);
            collection.updated_at = Utc::now();
        }
        collection.question_ids.remove(question_id);
        Ok(collection)
    }

    /// Resolves the membership list in its stored order. Soft-deleted
    /// questions are included and carry their `deleted_at`.
    pub async fn get_with_members(
        &self,
        owner: Uuid,
        collection_id: Uuid,
    ) -> ServiceResult<CollectionWithQuestions> {
        let collection = self.active_collection(owner, collection_id).await?;
        if collection.question_ids.is_empty() {
            return Ok(CollectionWithQuestions {
                collection,
                questions: Vec::new(),
            });
        }

        let mut by_id: HashMap<Uuid, Question> = self
            .store
            .get_questions_by_ids(collection.question_ids.as_slice())
            .await?
            .into_iter()
            .map(|q| (q.id, q))
            .collect();

        let questions = collection
            .question_ids
            .iter()
            .filter_map(|id| by_id.remove(&id))
            .map(|q| q.summary())
            .collect();

        Ok(CollectionWithQuestions {
            collection,
            questions,
        })
    }

    //=====================================================================================
    // Practice
    //=====================================================================================

    pub async fn record_practice(
        &self,
        owner: Uuid,
        new: NewPracticeSession,
    ) -> ServiceResult<PracticeSession> {
        self.active_question(owner, new.question_id).await?;
        let session = PracticeSession {
            id: Uuid::new_v4(),
            user_id: owner,
            question_id: new.question_id,
            answer: new.answer,
            duration_secs: new.duration_secs,
            rating: new.rating,
            feedback: new.feedback,
            completed_at: Utc::now(),
        };
        let session = self.store.insert_practice_session(session).await?;
        audit(owner, "practice", "PracticeSession", session.id);
        Ok(session)
    }

    /// Newest first; `None` means the default history length.
    pub async fn practice_history(
        &self,
        owner: Uuid,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<PracticeSession>> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        let mut sessions = self.owned_sessions(owner, Some(limit)).await?;
        sessions.truncate(limit);
        Ok(sessions)
    }

    pub async fn recent_practice_for_question(
        &self,
        owner: Uuid,
        question_id: Uuid,
        limit: usize,
    ) -> ServiceResult<Vec<PracticeSession>> {
        Ok(self
            .owned_sessions(owner, None)
            .await?
            .into_iter()
            .filter(|s| s.question_id == question_id)
            .take(limit)
            .collect())
    }

    pub async fn practice_stats(&self, owner: Uuid) -> ServiceResult<PracticeStats> {
        let sessions = self.owned_sessions(owner, None).await?;
        if sessions.is_empty() {
            return Ok(PracticeStats::default());
        }

        let total_duration: u64 = sessions.iter().map(|s| u64::from(s.duration_secs)).sum();
        let total = sessions.len() as u64;
        let avg_duration_secs = u32::try_from((total_duration + total / 2) / total).unwrap_or(u32::MAX);

        let question_ids: Vec<Uuid> = sessions
            .iter()
            .map(|s| s.question_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let difficulty_of: HashMap<Uuid, _> = self
            .store
            .get_questions_by_ids(&question_ids)
            .await?
            .into_iter()
            .map(|q| (q.id, q.difficulty))
            .collect();

        let mut by_difficulty = BTreeMap::new();
        for session in &sessions {
            if let Some(difficulty) = difficulty_of.get(&session.question_id) {
                *by_difficulty.entry(*difficulty).or_insert(0) += 1;
            }
        }

        Ok(PracticeStats {
            total_sessions: sessions.len(),
            avg_duration_secs,
            by_difficulty,
        })
    }

    async fn owned_sessions(
        &self,
        owner: Uuid,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<PracticeSession>> {
        let mut sessions: Vec<PracticeSession> = self
            .store
            .list_practice_sessions_by_owner(owner, limit)
            .await?
            .into_iter()
            .filter(|s| s.user_id == owner)
            .collect();
        sessions.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Difficulty};

    fn question(owner: Uuid) -> Question {
        let now = Utc::now();
        Question {
            id: Uuid::new_v4(),
            user_id: owner,
            title: "Explain ownership".to_string(),
            description: "Describe how moves and borrows interact.".to_string(),
            difficulty: Difficulty::Easy,
            category: Category::Technical,
            tags: vec![],
            company_name: None,
            company_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn owner_passes_the_guard() {
        let owner = Uuid::new_v4();
        let q = question(owner);
        assert_eq!(require_owner(q.clone(), owner).unwrap(), q);
    }

    #[test]
    fn other_user_is_forbidden() {
        let q = question(Uuid::new_v4());
        let id = q.id;
        match require_owner(q, Uuid::new_v4()) {
            Err(ServiceError::Forbidden { entity, id: got }) => {
                assert_eq!(entity, "Question");
                assert_eq!(got, id);
            }
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[test]
    fn deleted_entity_is_not_found() {
        let owner = Uuid::new_v4();
        let mut q = question(owner);
        q.deleted_at = Some(Utc::now());
        assert!(matches!(
            require_active(q),
            Err(ServiceError::NotFound { entity: "Question", .. })
        ));
    }

    #[test]
    fn visibility_requires_owner_and_active() {
        let owner = Uuid::new_v4();
        let mut q = question(owner);
        assert!(visible_to(&q, owner));
        assert!(!visible_to(&q, Uuid::new_v4()));
        q.deleted_at = Some(Utc::now());
        assert!(!visible_to(&q, owner));
    }
}
