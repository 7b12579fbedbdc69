use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{Store, StoreError, StoreResult};
use crate::models::participation::admit;
use crate::models::{
    Article, EventCapacity, EventRow, NewEvent, NewParticipation, NewUser, Participation, UserRow,
};

#[derive(Default)]
struct Tables {
    users: Vec<UserRow>,
    events: Vec<EventRow>,
    participations: Vec<Participation>,
    articles: Vec<Article>,
}

/// In-process store. Every operation runs under one lock, which gives the
/// same all-or-nothing registration the PostgreSQL transaction gives.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Newest first; rows created in the same instant keep reverse insertion order.
fn newest_events(rows: impl DoubleEndedIterator<Item = EventRow>) -> Vec<EventRow> {
    let mut rows: Vec<EventRow> = rows.rev().collect();
    rows.sort_by_key(|row| Reverse(row.created_at));
    rows
}

fn newest_articles(rows: impl DoubleEndedIterator<Item = Article>) -> Vec<Article> {
    let mut rows: Vec<Article> = rows.rev().collect();
    rows.sort_by_key(|row| Reverse(row.published_date));
    rows
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a fully formed event, bypassing organizer checks.
    pub async fn insert_event(&self, row: EventRow) {
        self.tables.lock().await.events.push(row);
    }

    pub async fn insert_article(&self, article: Article) {
        self.tables.lock().await.articles.push(article);
    }

    /// Event by id regardless of its active flag.
    pub async fn event(&self, id: &str) -> Option<EventRow> {
        let tables = self.tables.lock().await;
        tables.events.iter().find(|e| e.id == id).cloned()
    }

    pub async fn participation_count(&self, event_id: &str) -> usize {
        let tables = self.tables.lock().await;
        tables
            .participations
            .iter()
            .filter(|p| p.event_id == event_id)
            .count()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<UserRow> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::EmailTaken);
        }

        let row = UserRow {
            id: user.id,
            email: user.email,
            password_hash: user.password_hash,
            user_type: user.user_type.as_str().to_string(),
            full_name: user.full_name,
            nik: user.nik,
            organization_name: user.organization_name,
            npwp: user.npwp,
            phone_number: None,
            profile_image_path: None,
            created_at: Utc::now(),
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<UserRow>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRow>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_event(&self, event: NewEvent) -> StoreResult<EventRow> {
        let row = event.into_row(Utc::now());
        self.tables.lock().await.events.push(row.clone());
        Ok(row)
    }

    async fn list_active_events(&self) -> StoreResult<Vec<EventRow>> {
        let tables = self.tables.lock().await;
        Ok(newest_events(
            tables.events.iter().filter(|e| e.is_active).cloned(),
        ))
    }

    async fn find_active_event(&self, id: &str) -> StoreResult<Option<EventRow>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .events
            .iter()
            .find(|e| e.id == id && e.is_active)
            .cloned())
    }

    async fn search_active_events(&self, title: &str) -> StoreResult<Vec<EventRow>> {
        let tables = self.tables.lock().await;
        Ok(newest_events(
            tables
                .events
                .iter()
                .filter(|e| e.is_active && contains_ignore_case(&e.title, title))
                .cloned(),
        ))
    }

    async fn list_events_by_organizer(&self, organizer_id: &str) -> StoreResult<Vec<EventRow>> {
        let tables = self.tables.lock().await;
        Ok(newest_events(
            tables
                .events
                .iter()
                .filter(|e| e.organizer_id == organizer_id)
                .cloned(),
        ))
    }

    async fn register_participation(
        &self,
        participation: NewParticipation,
    ) -> StoreResult<Participation> {
        let mut tables = self.tables.lock().await;

        let event_idx = tables
            .events
            .iter()
            .position(|e| e.id == participation.event_id && e.is_active)
            .ok_or(StoreError::EventNotFound)?;

        if !tables.users.iter().any(|u| u.id == participation.user_id) {
            return Err(StoreError::UserNotFound);
        }

        let already_registered = tables
            .participations
            .iter()
            .any(|p| p.user_id == participation.user_id && p.event_id == participation.event_id);

        let event = &tables.events[event_idx];
        let capacity = EventCapacity {
            id: event.id.clone(),
            target_volunteer_count: event.target_volunteer_count,
            current_volunteer_count: event.current_volunteer_count,
        };
        admit(&capacity, already_registered)?;

        let row = Participation {
            id: participation.id,
            user_id: participation.user_id,
            event_id: participation.event_id,
            donation_amount: participation.donation_amount,
            registration_date: Utc::now(),
        };

        let event = &mut tables.events[event_idx];
        event.current_volunteer_count += 1;
        event.registered_volunteer_ids.push(row.user_id.clone());
        tables.participations.push(row.clone());

        Ok(row)
    }

    async fn list_participations_for_user(&self, user_id: &str) -> StoreResult<Vec<Participation>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Participation> = tables
            .participations
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|p| Reverse(p.registration_date));
        Ok(rows)
    }

    async fn list_articles(&self) -> StoreResult<Vec<Article>> {
        let tables = self.tables.lock().await;
        let mut rows = newest_articles(tables.articles.iter().filter(|a| a.is_active).cloned());
        rows.sort_by_key(|a| Reverse(a.is_featured));
        Ok(rows)
    }

    async fn list_featured_articles(&self, limit: i64) -> StoreResult<Vec<Article>> {
        let tables = self.tables.lock().await;
        let mut rows = newest_articles(
            tables
                .articles
                .iter()
                .filter(|a| a.is_active && a.is_featured)
                .cloned(),
        );
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn view_article(&self, id: &str) -> StoreResult<Option<Article>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .articles
            .iter_mut()
            .find(|a| a.id == id && a.is_active)
            .map(|article| {
                article.views += 1;
                article.clone()
            }))
    }

    async fn search_articles(&self, term: &str) -> StoreResult<Vec<Article>> {
        let tables = self.tables.lock().await;
        Ok(newest_articles(
            tables
                .articles
                .iter()
                .filter(|a| {
                    a.is_active
                        && (contains_ignore_case(&a.title, term)
                            || a.description
                                .as_deref()
                                .is_some_and(|d| contains_ignore_case(d, term)))
                })
                .cloned(),
        ))
    }

    async fn list_articles_by_category(&self, category: &str) -> StoreResult<Vec<Article>> {
        let tables = self.tables.lock().await;
        Ok(newest_articles(
            tables
                .articles
                .iter()
                .filter(|a| a.is_active && a.category == category)
                .cloned(),
        ))
    }
}
