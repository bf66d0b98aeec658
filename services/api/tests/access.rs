//! Ownership-scoped data access over the in-memory store.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use api_lib::adapters::MemoryDb;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::question_input;
use interview_prep_core::domain::{
    Collection, Difficulty, MembershipChange, NewCollection, NewPracticeSession, NewUser,
    PageRequest, PracticeSession, Question, QuestionChanges, User, UserCredentials,
};
use interview_prep_core::ports::{DatabaseService, PortResult};
use interview_prep_core::validation::validate_question_input;
use interview_prep_core::{DataAccess, ServiceError};
use uuid::Uuid;

fn access_over(db: MemoryDb) -> DataAccess {
    DataAccess::new(Arc::new(db))
}

async fn question(access: &DataAccess, owner: Uuid, title: &str) -> Question {
    let new = validate_question_input(&question_input(title)).expect("fixture is valid");
    access.create_question(owner, new).await.expect("create question")
}

fn collection(name: &str) -> NewCollection {
    NewCollection {
        name: name.to_string(),
        description: None,
        color: Some("#3B82F6".to_string()),
    }
}

fn practice(question_id: Uuid, duration_secs: u32) -> NewPracticeSession {
    NewPracticeSession {
        question_id,
        answer: "I would start by clarifying the requirements.".to_string(),
        duration_secs,
        rating: Some(4),
        feedback: None,
    }
}

/// Wraps `MemoryDb`, counting batch lookups. With `lose_append_race` set,
/// every append lands as if a concurrent request had just made it.
struct ObservedDb {
    inner: MemoryDb,
    lose_append_race: bool,
    batch_lookups: AtomicUsize,
}

impl ObservedDb {
    fn new(lose_append_race: bool) -> Self {
        Self {
            inner: MemoryDb::new(),
            lose_append_race,
            batch_lookups: AtomicUsize::new(0),
        }
    }

    fn batch_lookups(&self) -> usize {
        self.batch_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseService for ObservedDb {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        self.inner.create_user(new_user).await
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.inner.get_user_by_email(email).await
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.inner.create_auth_session(session_id, user_id, expires_at).await
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        self.inner.validate_auth_session(session_id).await
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.inner.delete_auth_session(session_id).await
    }

    async fn insert_question(&self, question: Question) -> PortResult<Question> {
        self.inner.insert_question(question).await
    }

    async fn get_question_by_id(&self, question_id: Uuid) -> PortResult<Question> {
        self.inner.get_question_by_id(question_id).await
    }

    async fn save_question(&self, question: &Question) -> PortResult<()> {
        self.inner.save_question(question).await
    }

    async fn list_questions_by_owner(&self, user_id: Uuid) -> PortResult<Vec<Question>> {
        self.inner.list_questions_by_owner(user_id).await
    }

    async fn get_questions_by_ids(&self, question_ids: &[Uuid]) -> PortResult<Vec<Question>> {
        self.batch_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_questions_by_ids(question_ids).await
    }

    async fn insert_collection(&self, collection: Collection) -> PortResult<Collection> {
        self.inner.insert_collection(collection).await
    }

    async fn get_collection_by_id(&self, collection_id: Uuid) -> PortResult<Collection> {
        self.inner.get_collection_by_id(collection_id).await
    }

    async fn save_collection(&self, collection: &Collection) -> PortResult<()> {
        self.inner.save_collection(collection).await
    }

    async fn list_collections_by_owner(&self, user_id: Uuid) -> PortResult<Vec<Collection>> {
        self.inner.list_collections_by_owner(user_id).await
    }

    async fn append_collection_member(
        &self,
        collection_id: Uuid,
        question_id: Uuid,
    ) -> PortResult<MembershipChange> {
        if self.lose_append_race {
            self.inner
                .append_collection_member(collection_id, question_id)
                .await?;
        }
        self.inner
            .append_collection_member(collection_id, question_id)
            .await
    }

    async fn remove_collection_member(
        &self,
        collection_id: Uuid,
        question_id: Uuid,
    ) -> PortResult<MembershipChange> {
        self.inner
            .remove_collection_member(collection_id, question_id)
            .await
    }

    async fn insert_practice_session(&self, session: PracticeSession) -> PortResult<PracticeSession> {
        self.inner.insert_practice_session(session).await
    }

    async fn list_practice_sessions_by_owner(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
    ) -> PortResult<Vec<PracticeSession>> {
        self.inner.list_practice_sessions_by_owner(user_id, limit).await
    }
}

#[tokio::test]
async fn members_keep_insertion_order_and_remove_cleanly() {
    let access = access_over(MemoryDb::new());
    let owner = Uuid::new_v4();
    let first = question(&access, owner, "Reverse a linked list").await;
    let second = question(&access, owner, "Explain Rust ownership").await;
    let set = access.create_collection(owner, collection("Warmups")).await.unwrap();

    access.add_member(owner, set.id, second.id).await.unwrap();
    let updated = access.add_member(owner, set.id, first.id).await.unwrap();
    assert_eq!(updated.question_ids.as_slice(), &[second.id, first.id]);

    let resolved = access.get_with_members(owner, set.id).await.unwrap();
    let titles: Vec<_> = resolved.questions.iter().map(|q| q.title.as_str()).collect();
    assert_eq!(titles, ["Explain Rust ownership", "Reverse a linked list"]);

    let after = access.remove_member(owner, set.id, second.id).await.unwrap();
    assert_eq!(after.question_ids.as_slice(), &[first.id]);

    // Removing again is a quiet no-op.
    let again = access.remove_member(owner, set.id, second.id).await.unwrap();
    assert_eq!(again.question_ids.as_slice(), &[first.id]);
}

#[tokio::test]
async fn duplicate_add_conflicts_and_stores_one_copy() {
    let access = access_over(MemoryDb::new());
    let owner = Uuid::new_v4();
    let q = question(&access, owner, "Design a URL shortener").await;
    let set = access.create_collection(owner, collection("System design")).await.unwrap();

    access.add_member(owner, set.id, q.id).await.unwrap();
    let err = access.add_member(owner, set.id, q.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(ref m) if m == "Question already in collection"));

    let stored = access.get_collection(owner, set.id).await.unwrap();
    assert_eq!(stored.question_ids.len(), 1);
}

#[tokio::test]
async fn listing_never_leaks_other_owners_or_deleted_rows() {
    // The store returns every row; the access layer must still filter.
    let access = access_over(MemoryDb::new().with_unfiltered_listing());
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let kept = question(&access, alice, "Alice keeps this one").await;
    let dropped = question(&access, alice, "Alice deletes this one").await;
    question(&access, bob, "Bob's private question").await;
    access.soft_delete_question(alice, dropped.id).await.unwrap();
    access.create_collection(bob, collection("Bob's set")).await.unwrap();

    let page = access.list_questions(alice, PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, kept.id);

    let collections = access.list_collections(alice, PageRequest::default()).await.unwrap();
    assert_eq!(collections.total, 0);
}

#[tokio::test]
async fn soft_deleted_members_stay_visible_in_their_collection() {
    let access = access_over(MemoryDb::new());
    let owner = Uuid::new_v4();
    let q = question(&access, owner, "Implement an LRU cache").await;
    let set = access.create_collection(owner, collection("Caches")).await.unwrap();
    access.add_member(owner, set.id, q.id).await.unwrap();

    access.soft_delete_question(owner, q.id).await.unwrap();

    let page = access.list_questions(owner, PageRequest::default()).await.unwrap();
    assert!(page.items.is_empty());

    let resolved = access.get_with_members(owner, set.id).await.unwrap();
    assert_eq!(resolved.questions.len(), 1);
    assert!(resolved.questions[0].deleted_at.is_some());

    let err = access
        .update_question(owner, q.id, QuestionChanges::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "Question", .. }));
}

#[tokio::test]
async fn foreign_questions_cannot_be_added() {
    let access = access_over(MemoryDb::new());
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let bobs = question(&access, bob, "Bob's question text").await;
    let set = access.create_collection(alice, collection("Alice's set")).await.unwrap();

    let err = access.add_member(alice, set.id, bobs.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "Question", id } if id == bobs.id));

    let err = access.get_collection(bob, set.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { entity: "Collection", .. }));
}

#[tokio::test]
async fn pages_slice_the_filtered_listing() {
    let access = access_over(MemoryDb::new());
    let owner = Uuid::new_v4();
    for i in 0..25 {
        question(&access, owner, &format!("Question number {i}")).await;
    }

    let page = access
        .list_questions(owner, PageRequest { page: 3, limit: 10 })
        .await
        .unwrap();
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total, 25);
    assert_eq!(page.pages, 3);

    let past_end = access
        .list_questions(owner, PageRequest { page: 4, limit: 10 })
        .await
        .unwrap();
    assert!(past_end.items.is_empty());
}

#[tokio::test]
async fn practice_stats_round_the_average_and_group_by_difficulty() {
    let access = access_over(MemoryDb::new());
    let owner = Uuid::new_v4();
    let medium = question(&access, owner, "Medium difficulty question").await;
    let mut hard_input = question_input("Hard difficulty question");
    hard_input.difficulty = "HARD".to_string();
    let hard = access
        .create_question(owner, validate_question_input(&hard_input).unwrap())
        .await
        .unwrap();

    access.record_practice(owner, practice(medium.id, 60)).await.unwrap();
    access.record_practice(owner, practice(medium.id, 121)).await.unwrap();
    access.record_practice(owner, practice(hard.id, 30)).await.unwrap();

    let stats = access.practice_stats(owner).await.unwrap();
    assert_eq!(stats.total_sessions, 3);
    assert_eq!(stats.avg_duration_secs, 70);
    assert_eq!(stats.by_difficulty.get(&Difficulty::Medium), Some(&2));
    assert_eq!(stats.by_difficulty.get(&Difficulty::Hard), Some(&1));

    let detail = access.question_detail(owner, medium.id).await.unwrap();
    assert_eq!(detail.recent_sessions.len(), 2);

    let empty = access.practice_stats(Uuid::new_v4()).await.unwrap();
    assert_eq!(empty.total_sessions, 0);
}

#[tokio::test]
async fn practice_on_someone_elses_question_is_refused() {
    let access = access_over(MemoryDb::new());
    let owner = Uuid::new_v4();
    let q = question(&access, owner, "Owner-only question").await;

    let err = access
        .record_practice(Uuid::new_v4(), practice(q.id, 90))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { .. }));
}

#[tokio::test]
async fn add_that_loses_a_race_to_the_same_add_still_succeeds() {
    let db = Arc::new(ObservedDb::new(true));
    let access = DataAccess::new(db.clone());
    let owner = Uuid::new_v4();
    let q = question(&access, owner, "Find the median of two arrays").await;
    let set = access.create_collection(owner, collection("Hard ones")).await.unwrap();

    let added = access.add_member(owner, set.id, q.id).await.unwrap();
    assert_eq!(added.question_ids.as_slice(), &[q.id]);

    let stored = db.get_collection_by_id(set.id).await.unwrap();
    assert_eq!(stored.question_ids.as_slice(), &[q.id]);

    let again = access.add_member(owner, set.id, q.id).await.unwrap_err();
    assert!(matches!(again, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn empty_collection_resolves_without_a_batch_lookup() {
    let db = Arc::new(ObservedDb::new(false));
    let access = DataAccess::new(db.clone());
    let owner = Uuid::new_v4();
    let set = access.create_collection(owner, collection("Nothing yet")).await.unwrap();

    let resolved = access.get_with_members(owner, set.id).await.unwrap();
    assert!(resolved.questions.is_empty());
    assert_eq!(db.batch_lookups(), 0);

    let q = question(&access, owner, "Explain CAP theorem").await;
    access.add_member(owner, set.id, q.id).await.unwrap();
    let resolved = access.get_with_members(owner, set.id).await.unwrap();
    assert_eq!(resolved.questions.len(), 1);
    assert_eq!(db.batch_lookups(), 1);
}
