pub mod access;
pub mod actions;
pub mod domain;
pub mod error;
pub mod ports;
pub mod rate_limit;
pub mod validation;

pub use access::DataAccess;
pub use actions::{Actions, GenerationOutcome};
pub use domain::{
    AiFeedback, Category, Collection, CollectionWithQuestions, Difficulty, GeneratedQuestion,
    Identity, MembershipList, Page, PageRequest, PracticeSession, PracticeStats, Question,
    QuestionDetail, QuestionSummary, User, UserCredentials,
};
pub use error::{ServiceError, ServiceResult};
pub use ports::{AiError, DatabaseService, InterviewCoach, PortError, PortResult};
pub use rate_limit::FixedWindowLimiter;
