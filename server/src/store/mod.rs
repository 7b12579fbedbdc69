//! Persistence seam. Handlers only see [`Store`]; PostgreSQL backs it in
//! production and [`memory::MemoryStore`] backs it in development and tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::participation::Rejection;
use crate::models::{Article, EventRow, NewEvent, NewParticipation, NewUser, Participation, UserRow};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email is already registered")]
    EmailTaken,

    #[error("event not found")]
    EventNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("user is already registered for this event")]
    AlreadyRegistered,

    #[error("event has reached its volunteer target")]
    EventFull,

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl From<Rejection> for StoreError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::AlreadyRegistered => StoreError::AlreadyRegistered,
            Rejection::EventFull => StoreError::EventFull,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round trip used by the health check.
    async fn ping(&self) -> StoreResult<()>;

    /// Fails with [`StoreError::EmailTaken`] without writing anything when
    /// the email already exists.
    async fn create_user(&self, user: NewUser) -> StoreResult<UserRow>;
    async fn find_user(&self, id: &str) -> StoreResult<Option<UserRow>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRow>>;

    async fn create_event(&self, event: NewEvent) -> StoreResult<EventRow>;
    async fn list_active_events(&self) -> StoreResult<Vec<EventRow>>;
    async fn find_active_event(&self, id: &str) -> StoreResult<Option<EventRow>>;
    async fn search_active_events(&self, title: &str) -> StoreResult<Vec<EventRow>>;
    async fn list_events_by_organizer(&self, organizer_id: &str) -> StoreResult<Vec<EventRow>>;

    /// Registers a volunteer for an event exactly once, subject to capacity.
    /// The participation row and the event's volunteer projection are written
    /// together or not at all.
    async fn register_participation(
        &self,
        participation: NewParticipation,
    ) -> StoreResult<Participation>;
    async fn list_participations_for_user(&self, user_id: &str) -> StoreResult<Vec<Participation>>;

    async fn list_articles(&self) -> StoreResult<Vec<Article>>;
    async fn list_featured_articles(&self, limit: i64) -> StoreResult<Vec<Article>>;
    /// Returns the article with its view counter already bumped by one.
    async fn view_article(&self, id: &str) -> StoreResult<Option<Article>>;
    async fn search_articles(&self, term: &str) -> StoreResult<Vec<Article>>;
    async fn list_articles_by_category(&self, category: &str) -> StoreResult<Vec<Article>>;
}
