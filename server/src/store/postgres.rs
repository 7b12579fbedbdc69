use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{debug, info};

use super::{Store, StoreError, StoreResult};
use crate::models::participation::admit;
use crate::models::{
    Article, EventCapacity, EventRow, NewEvent, NewParticipation, NewUser, Participation, UserRow,
};

const SQL_PING: &str = "SELECT 1";

const SQL_INSERT_USER: &str = r#"
INSERT INTO users (
    id, email, password_hash, user_type, full_name, nik, organization_name, npwp
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
RETURNING *
"#;

const SQL_USER_BY_ID: &str = "SELECT * FROM users WHERE id = $1";

const SQL_USER_BY_EMAIL: &str = "SELECT * FROM users WHERE email = $1";

const SQL_USER_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)";

const SQL_INSERT_EVENT: &str = r#"
INSERT INTO events (
    id, title, description, image_url, organizer_id, organizer_name,
    event_start_time, event_end_time, target_volunteer_count,
    participation_fee_idr, category, is_active,
    location_country, location_province, location_city,
    location_district, location_village, location_rt_rw,
    location_latitude, location_longitude
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE, $12, $13, $14, $15, $16, $17, $18, $19)
RETURNING *
"#;

const SQL_ACTIVE_EVENTS: &str = r#"
SELECT * FROM events
WHERE is_active = TRUE
ORDER BY created_at DESC
"#;

const SQL_ACTIVE_EVENT_BY_ID: &str = "SELECT * FROM events WHERE id = $1 AND is_active = TRUE";

const SQL_SEARCH_ACTIVE_EVENTS: &str = r#"
SELECT * FROM events
WHERE is_active = TRUE AND title ILIKE $1
ORDER BY created_at DESC
"#;

const SQL_EVENTS_BY_ORGANIZER: &str = r#"
SELECT * FROM events
WHERE organizer_id = $1
ORDER BY created_at DESC
"#;

const SQL_LOCK_EVENT_CAPACITY: &str = r#"
SELECT id, target_volunteer_count, current_volunteer_count
FROM events
WHERE id = $1 AND is_active = TRUE
FOR UPDATE
"#;

const SQL_PARTICIPATION_EXISTS: &str = r#"
SELECT EXISTS (SELECT 1 FROM participations WHERE user_id = $1 AND event_id = $2)
"#;

const SQL_INSERT_PARTICIPATION: &str = r#"
INSERT INTO participations (id, user_id, event_id, donation_amount)
VALUES ($1, $2, $3, $4)
RETURNING id, user_id, event_id, donation_amount, registration_date
"#;

const SQL_RECORD_VOLUNTEER: &str = r#"
UPDATE events SET
    current_volunteer_count = current_volunteer_count + 1,
    registered_volunteer_ids = array_append(registered_volunteer_ids, $1)
WHERE id = $2
"#;

const SQL_PARTICIPATIONS_BY_USER: &str = r#"
SELECT id, user_id, event_id, donation_amount, registration_date
FROM participations
WHERE user_id = $1
ORDER BY registration_date DESC
"#;

const SQL_ACTIVE_ARTICLES: &str = r#"
SELECT id, title, description, image_url, category, author_name,
       published_date, is_featured, views, is_active
FROM articles
WHERE is_active = TRUE
ORDER BY is_featured DESC, published_date DESC
"#;

const SQL_FEATURED_ARTICLES: &str = r#"
SELECT id, title, description, image_url, category, author_name,
       published_date, is_featured, views, is_active
FROM articles
WHERE is_active = TRUE AND is_featured = TRUE
ORDER BY published_date DESC
LIMIT $1
"#;

const SQL_VIEW_ARTICLE: &str = r#"
UPDATE articles SET views = views + 1
WHERE id = $1 AND is_active = TRUE
RETURNING id, title, description, image_url, category, author_name,
          published_date, is_featured, views, is_active
"#;

const SQL_SEARCH_ARTICLES: &str = r#"
SELECT id, title, description, image_url, category, author_name,
       published_date, is_featured, views, is_active
FROM articles
WHERE is_active = TRUE AND (title ILIKE $1 OR description ILIKE $1)
ORDER BY published_date DESC
"#;

const SQL_ARTICLES_BY_CATEGORY: &str = r#"
SELECT id, title, description, image_url, category, author_name,
       published_date, is_featured, views, is_active
FROM articles
WHERE is_active = TRUE AND category = $1
ORDER BY published_date DESC
"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(
        options: PgConnectOptions,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await?;

        info!(max_connections, "Connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await?;
        info!("Migrations run successfully");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// `ILIKE` pattern matching `term` anywhere, with wildcards in the term
/// taken literally.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query(SQL_PING).execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<UserRow> {
        sqlx::query_as::<_, UserRow>(SQL_INSERT_USER)
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.user_type.as_str())
            .bind(&user.full_name)
            .bind(&user.nik)
            .bind(&user.organization_name)
            .bind(&user.npwp)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::EmailTaken
                } else {
                    StoreError::Database(e)
                }
            })
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(SQL_USER_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(SQL_USER_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_event(&self, event: NewEvent) -> StoreResult<EventRow> {
        let location = &event.location;
        let row = sqlx::query_as::<_, EventRow>(SQL_INSERT_EVENT)
            .bind(&event.id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.image_url)
            .bind(&event.organizer_id)
            .bind(&event.organizer_name)
            .bind(event.event_start_time)
            .bind(event.event_end_time)
            .bind(event.target_volunteer_count)
            .bind(event.participation_fee_idr)
            .bind(&event.category)
            .bind(&location.country)
            .bind(&location.province)
            .bind(&location.city)
            .bind(&location.district)
            .bind(&location.village)
            .bind(&location.rt_rw)
            .bind(location.latitude)
            .bind(location.longitude)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_active_events(&self) -> StoreResult<Vec<EventRow>> {
        let rows = sqlx::query_as::<_, EventRow>(SQL_ACTIVE_EVENTS)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_active_event(&self, id: &str) -> StoreResult<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(SQL_ACTIVE_EVENT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn search_active_events(&self, title: &str) -> StoreResult<Vec<EventRow>> {
        let rows = sqlx::query_as::<_, EventRow>(SQL_SEARCH_ACTIVE_EVENTS)
            .bind(contains_pattern(title))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_events_by_organizer(&self, organizer_id: &str) -> StoreResult<Vec<EventRow>> {
        let rows = sqlx::query_as::<_, EventRow>(SQL_EVENTS_BY_ORGANIZER)
            .bind(organizer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn register_participation(
        &self,
        participation: NewParticipation,
    ) -> StoreResult<Participation> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the event serializes concurrent registrations for it.
        let capacity = sqlx::query_as::<_, EventCapacity>(SQL_LOCK_EVENT_CAPACITY)
            .bind(&participation.event_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::EventNotFound)?;

        let user_exists: bool = sqlx::query_scalar(SQL_USER_EXISTS)
            .bind(&participation.user_id)
            .fetch_one(&mut *tx)
            .await?;
        if !user_exists {
            return Err(StoreError::UserNotFound);
        }

        let already_registered: bool = sqlx::query_scalar(SQL_PARTICIPATION_EXISTS)
            .bind(&participation.user_id)
            .bind(&participation.event_id)
            .fetch_one(&mut *tx)
            .await?;

        admit(&capacity, already_registered)?;

        let row = sqlx::query_as::<_, Participation>(SQL_INSERT_PARTICIPATION)
            .bind(&participation.id)
            .bind(&participation.user_id)
            .bind(&participation.event_id)
            .bind(participation.donation_amount)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::AlreadyRegistered
                } else {
                    StoreError::Database(e)
                }
            })?;

        sqlx::query(SQL_RECORD_VOLUNTEER)
            .bind(&participation.user_id)
            .bind(&participation.event_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            event_id = %row.event_id,
            volunteers = capacity.current_volunteer_count + 1,
            target = capacity.target_volunteer_count,
            "Volunteer count updated"
        );
        Ok(row)
    }

    async fn list_participations_for_user(&self, user_id: &str) -> StoreResult<Vec<Participation>> {
        let rows = sqlx::query_as::<_, Participation>(SQL_PARTICIPATIONS_BY_USER)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_articles(&self) -> StoreResult<Vec<Article>> {
        let rows = sqlx::query_as::<_, Article>(SQL_ACTIVE_ARTICLES)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_featured_articles(&self, limit: i64) -> StoreResult<Vec<Article>> {
        let rows = sqlx::query_as::<_, Article>(SQL_FEATURED_ARTICLES)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn view_article(&self, id: &str) -> StoreResult<Option<Article>> {
        let row = sqlx::query_as::<_, Article>(SQL_VIEW_ARTICLE)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn search_articles(&self, term: &str) -> StoreResult<Vec<Article>> {
        let rows = sqlx::query_as::<_, Article>(SQL_SEARCH_ARTICLES)
            .bind(contains_pattern(term))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_articles_by_category(&self, category: &str) -> StoreResult<Vec<Article>> {
        let rows = sqlx::query_as::<_, Article>(SQL_ARTICLES_BY_CATEGORY)
            .bind(category)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_wraps_term() {
        assert_eq!(contains_pattern("pantai"), "%pantai%");
        assert_eq!(contains_pattern(""), "%%");
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }
}
